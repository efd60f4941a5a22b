/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use ahash::AHashSet;
use log::warn;

/// Names of meters that can never be exported. The set only grows.
#[derive(Debug, Default)]
pub struct DiscardedMeters {
    names: AHashSet<String>,
}

impl DiscardedMeters {
    #[inline]
    pub fn is_discarded(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns `true` if the name was not discarded before.
    pub fn discard(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        warn!("meter '{name}' has been discarded as it is not supported by dynatrace metrics api v2");
        self.names.insert(name.to_string())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discard_once() {
        let mut discarded = DiscardedMeters::default();
        assert!(discarded.is_empty());
        assert!(!discarded.is_discarded("timer"));

        assert!(discarded.discard("timer"));
        assert!(discarded.is_discarded("timer"));
        assert!(!discarded.discard("timer"));
        assert_eq!(discarded.len(), 1);

        assert!(!discarded.is_discarded("other"));
    }
}
