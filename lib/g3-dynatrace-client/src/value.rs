/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::fmt;

// 2^53, above which not every integer is representable as f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Integral values are written without a fractional part, everything else
/// uses the shortest representation that parses back to the same f64.
pub(crate) struct DisplayLineValue(pub(crate) f64);

impl fmt::Display for DisplayLineValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER {
            f.write_str(itoa::Buffer::new().format(v as i64))
        } else {
            f.write_str(ryu::Buffer::new().format(v))
        }
    }
}
