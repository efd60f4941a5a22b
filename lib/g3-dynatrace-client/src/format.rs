/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::fmt::Write;

use log::debug;

use crate::value::DisplayLineValue;
use crate::{Measurement, Meter, MeterId, MeterKind, Statistic};

/// Formats all measurements of `meter` as ingest protocol lines, or returns
/// `None` if the meter type has no line representation.
pub fn metric_lines<M: Meter + ?Sized>(meter: &M, timestamp_millis: i64) -> Option<Vec<String>> {
    match meter.kind() {
        MeterKind::Gauge | MeterKind::Counter => {
            let id = meter.id();
            let lines = meter
                .measure()
                .iter()
                .filter_map(|m| metric_line(id, m, timestamp_millis))
                .collect();
            Some(lines)
        }
        MeterKind::Unsupported => None,
    }
}

/// `name[.statistic][,k1=v1,k2=v2] value timestamp`
///
/// Returns `None` for NaN and infinite values, which the ingest API rejects.
pub fn metric_line(id: &MeterId, measurement: &Measurement, timestamp_millis: i64) -> Option<String> {
    if !measurement.value.is_finite() {
        debug!(
            "skip non-finite value {} of meter {}",
            measurement.value,
            id.name()
        );
        return None;
    }

    let mut line = String::with_capacity(64);
    line.push_str(id.name());
    if measurement.statistic != Statistic::Value {
        line.push('.');
        line.push_str(measurement.statistic.as_str());
    }
    if !id.tags().is_empty() {
        let _ = write!(line, ",{}", id.tags().display_line_protocol());
    }
    let _ = write!(line, " {}", DisplayLineValue(measurement.value));
    line.push(' ');
    line.push_str(itoa::Buffer::new().format(timestamp_millis));
    Some(line)
}
