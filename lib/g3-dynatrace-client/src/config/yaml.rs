/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::{Yaml, yaml};

use super::DynatraceConfig;

impl DynatraceConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = v {
            let mut config = DynatraceConfig::default();
            foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v))?;
            config.check().context("invalid dynatrace config")?;
            Ok(config)
        } else {
            Err(anyhow!(
                "yaml value type for 'dynatrace config' should be 'map'"
            ))
        }
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match normalize_key(k).as_str() {
            "uri" | "url" => {
                self.uri = as_string(v).context(format!("invalid string value for key {k}"))?;
            }
            "tenant" => {
                self.tenant = as_string(v).context(format!("invalid string value for key {k}"))?;
            }
            "api_token" | "token" => {
                self.api_token =
                    as_string(v).context(format!("invalid string value for key {k}"))?;
            }
            "batch_size" => {
                self.batch_size = as_usize(v).context(format!("invalid usize value for key {k}"))?;
            }
            "step" | "emit_interval" => {
                self.step = as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
            }
            "connect_timeout" => {
                self.connect_timeout = as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
            }
            "read_timeout" => {
                self.read_timeout = as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
            }
            _ => return Err(anyhow!("invalid key {k}")),
        }
        Ok(())
    }
}

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        _ => Err(anyhow!("yaml value type for 'string' should be 'string' or 'integer'")),
    }
}

fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!("yaml value type for 'usize' should be 'string' or 'integer'")),
    }
}

/// A humanized string like `10s` or `1m`, or a number of seconds.
fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(d) => Ok(d),
            Err(ParseError::MissingUnit) => {
                let secs = u64::from_str(value).map_err(|_| anyhow!("invalid duration string"))?;
                Ok(Duration::from_secs(secs))
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let secs = u64::try_from(*value).map_err(|_| anyhow!("negative duration"))?;
            Ok(Duration::from_secs(secs))
        }
        _ => Err(anyhow!(
            "yaml value type for duration should be 'string' or 'integer'"
        )),
    }
}
