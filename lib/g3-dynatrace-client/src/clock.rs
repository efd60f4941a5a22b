/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use chrono::Utc;

/// Wall clock used to timestamp all lines of one export cycle.
pub trait Clock {
    fn wall_time_millis(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn wall_time_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

impl<F> Clock for F
where
    F: Fn() -> i64,
{
    fn wall_time_millis(&self) -> i64 {
        self()
    }
}
