/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use crate::{DiscardedMeters, Meter};

#[derive(Debug, Default)]
pub struct SnapshotTranslator {
    discarded: DiscardedMeters,
}

impl SnapshotTranslator {
    /// Converts the meters to metric lines, keeping meter order and then
    /// measurement order. Meters of unsupported type are discarded by name
    /// the first time they are seen and skipped afterwards.
    pub fn translate<'a, I, M>(&mut self, meters: I, timestamp_millis: i64) -> Vec<String>
    where
        I: IntoIterator<Item = &'a M>,
        M: Meter + ?Sized + 'a,
    {
        let mut lines = Vec::new();
        for meter in meters {
            let name = meter.id().name();
            if self.discarded.is_discarded(name) {
                continue;
            }

            match crate::metric_lines(meter, timestamp_millis) {
                Some(meter_lines) => lines.extend(meter_lines),
                None => {
                    self.discarded.discard(name);
                }
            }
        }
        lines
    }

    pub fn discarded(&self) -> &DiscardedMeters {
        &self.discarded
    }
}
