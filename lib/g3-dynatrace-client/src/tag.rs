/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// Meter tags, always iterated in ascending key order.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricTagMap {
    inner: BTreeMap<String, String>,
}

impl MetricTagMap {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.insert(key.into(), value.into())
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn display_line_protocol(&self) -> DisplayTagMap<'_> {
        DisplayTagMap {
            inner: self,
            assign_delimiter: '=',
            next_delimiter: ',',
        }
    }
}

impl<K, V> FromIterator<(K, V)> for MetricTagMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        MetricTagMap {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

pub struct DisplayTagMap<'a> {
    inner: &'a MetricTagMap,
    assign_delimiter: char,
    next_delimiter: char,
}

// characters that would end a tag key or value in a metric line
fn need_escape(c: char) -> bool {
    matches!(c, ' ' | ',' | '=' | '"' | '\\')
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if !s.contains(need_escape) {
        return f.write_str(s);
    }
    for c in s.chars() {
        if need_escape(c) {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    Ok(())
}

impl fmt::Display for DisplayTagMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.inner.iter().enumerate() {
            if i > 0 {
                f.write_char(self.next_delimiter)?;
            }
            write_escaped(f, name)?;
            f.write_char(self.assign_delimiter)?;
            write_escaped(f, value)?;
        }
        Ok(())
    }
}
