/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use http::{HeaderValue, Uri};
use http::uri::InvalidUri;
use thiserror::Error;

use crate::METRICS_INGEST_PATH;

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("api token is not set")]
    MissingApiToken,
    #[error("api token contains invalid characters")]
    InvalidApiToken,
    #[error("neither uri nor tenant is set")]
    MissingUri,
    #[error("invalid uri {0}: {1}")]
    InvalidUri(String, InvalidUri),
    #[error("uri {0} has no scheme or host")]
    IncompleteUri(String),
    #[error("batch size should not be zero")]
    InvalidBatchSize,
    #[error("step should not be zero")]
    InvalidStep,
    #[error("failed to build http client: {0}")]
    HttpClient(reqwest::Error),
}

#[derive(Clone, PartialEq, Eq)]
pub struct DynatraceConfig {
    uri: String,
    tenant: String,
    api_token: String,
    pub batch_size: usize,
    pub step: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for DynatraceConfig {
    fn default() -> Self {
        DynatraceConfig {
            uri: String::new(),
            tenant: String::new(),
            api_token: String::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            step: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_secs(10),
        }
    }
}

impl DynatraceConfig {
    pub fn new<U: Into<String>, T: Into<String>>(uri: U, api_token: T) -> Self {
        DynatraceConfig {
            uri: uri.into(),
            api_token: api_token.into(),
            ..Default::default()
        }
    }

    pub fn set_uri<T: Into<String>>(&mut self, uri: T) {
        self.uri = uri.into();
    }

    /// Used to build the SaaS uri when no explicit uri is set.
    pub fn set_tenant<T: Into<String>>(&mut self, tenant: T) {
        self.tenant = tenant.into();
    }

    pub fn set_api_token<T: Into<String>>(&mut self, api_token: T) {
        self.api_token = api_token.into();
    }

    #[inline]
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// The environment base uri, either set directly or derived from the tenant.
    pub fn uri(&self) -> Result<String, ConfigError> {
        if !self.uri.is_empty() {
            return Ok(self.uri.clone());
        }
        if !self.tenant.is_empty() {
            return Ok(format!("https://{}.live.dynatrace.com", self.tenant));
        }
        Err(ConfigError::MissingUri)
    }

    pub(crate) fn ingest_uri(&self) -> Result<Uri, ConfigError> {
        let base = self.uri()?;
        let s = format!("{}{METRICS_INGEST_PATH}", base.trim_end_matches('/'));
        let uri = Uri::from_str(&s).map_err(|e| ConfigError::InvalidUri(base.clone(), e))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(ConfigError::IncompleteUri(base));
        }
        Ok(uri)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.api_token.is_empty() {
            return Err(ConfigError::MissingApiToken);
        }
        if HeaderValue::from_str(&self.api_token).is_err() {
            return Err(ConfigError::InvalidApiToken);
        }
        self.ingest_uri()?;
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        if self.step.is_zero() {
            return Err(ConfigError::InvalidStep);
        }
        Ok(())
    }
}

impl fmt::Debug for DynatraceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynatraceConfig")
            .field("uri", &self.uri)
            .field("tenant", &self.tenant)
            .field("api_token", &"******")
            .field("batch_size", &self.batch_size)
            .field("step", &self.step)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}
