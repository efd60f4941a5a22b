/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::rc::Rc;
use std::sync::Arc;

use crate::MetricTagMap;

/// The meter types known to the exporter. Only gauges and counters can be
/// expressed in the ingest line protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeterKind {
    Gauge,
    Counter,
    Unsupported,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Statistic {
    Total,
    TotalTime,
    Count,
    Max,
    Value,
    Unknown,
    ActiveTasks,
    Duration,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Total | Statistic::TotalTime => "total",
            Statistic::Count => "count",
            Statistic::Max => "max",
            Statistic::Value => "value",
            Statistic::Unknown => "unknown",
            Statistic::ActiveTasks => "active",
            Statistic::Duration => "duration",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub statistic: Statistic,
    pub value: f64,
}

impl Measurement {
    pub fn new(statistic: Statistic, value: f64) -> Self {
        Measurement { statistic, value }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeterId {
    name: String,
    tags: MetricTagMap,
}

impl MeterId {
    pub fn new<T: Into<String>>(name: T) -> Self {
        MeterId {
            name: name.into(),
            tags: MetricTagMap::default(),
        }
    }

    pub fn with_tags<T: Into<String>>(name: T, tags: MetricTagMap) -> Self {
        MeterId {
            name: name.into(),
            tags,
        }
    }

    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.tags.insert(key, value);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tags(&self) -> &MetricTagMap {
        &self.tags
    }
}

/// A meter as seen by the exporter at the time of one export cycle.
pub trait Meter {
    fn id(&self) -> &MeterId;
    fn kind(&self) -> MeterKind;
    fn measure(&self) -> Vec<Measurement>;
}

macro_rules! impl_meter_for_pointer {
    ($ptr:ty) => {
        impl<T: Meter + ?Sized> Meter for $ptr {
            fn id(&self) -> &MeterId {
                (**self).id()
            }

            fn kind(&self) -> MeterKind {
                (**self).kind()
            }

            fn measure(&self) -> Vec<Measurement> {
                (**self).measure()
            }
        }
    };
}

impl_meter_for_pointer!(&T);
impl_meter_for_pointer!(Box<T>);
impl_meter_for_pointer!(Rc<T>);
impl_meter_for_pointer!(Arc<T>);

/// An owned copy of a meter and the measurements it had when it was sampled.
#[derive(Clone, Debug)]
pub struct MeterSnapshot {
    id: MeterId,
    kind: MeterKind,
    measurements: Vec<Measurement>,
}

impl MeterSnapshot {
    pub fn new(id: MeterId, kind: MeterKind, measurements: Vec<Measurement>) -> Self {
        MeterSnapshot {
            id,
            kind,
            measurements,
        }
    }

    pub fn gauge(id: MeterId, value: f64) -> Self {
        MeterSnapshot::new(
            id,
            MeterKind::Gauge,
            vec![Measurement::new(Statistic::Value, value)],
        )
    }

    pub fn counter(id: MeterId, count: f64) -> Self {
        MeterSnapshot::new(
            id,
            MeterKind::Counter,
            vec![Measurement::new(Statistic::Count, count)],
        )
    }
}

impl Meter for MeterSnapshot {
    fn id(&self) -> &MeterId {
        &self.id
    }

    fn kind(&self) -> MeterKind {
        self.kind
    }

    fn measure(&self) -> Vec<Measurement> {
        self.measurements.clone()
    }
}
