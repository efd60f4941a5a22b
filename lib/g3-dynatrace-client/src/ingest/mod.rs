/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::io;

use http::{HeaderValue, Method, Request, Response, StatusCode, Uri, header};
use log::{debug, warn};
use thiserror::Error;

use crate::{ConfigError, DynatraceConfig};

mod blocking;
pub use blocking::BlockingHttpTransport;

#[cfg(test)]
mod recording;
#[cfg(test)]
pub(crate) use recording::RecordingTransport;

pub const METRICS_INGEST_PATH: &str = "/api/v2/metrics/ingest";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),
    #[error("connect failed: {0}")]
    ConnectFailed(reqwest::Error),
    #[error("timed out")]
    Timeout,
    #[error("request failed: {0}")]
    RequestFailed(reqwest::Error),
    #[error("io failed: {0:?}")]
    IoFailed(io::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(&'static str),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectFailed(e)
        } else {
            TransportError::RequestFailed(e)
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout,
            _ => TransportError::IoFailed(e),
        }
    }
}

/// Sends one HTTP request and waits for the complete response.
pub trait IngestTransport {
    fn send(&mut self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError>;
}

impl<T: IngestTransport + ?Sized> IngestTransport for Box<T> {
    fn send(&mut self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError> {
        (**self).send(request)
    }
}

#[derive(Debug)]
pub enum BatchOutcome {
    Ingested { code: StatusCode, lines: usize },
    Rejected { code: StatusCode, body: String },
    TransportFailed(TransportError),
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Ingested { .. })
    }
}

pub struct MetricsIngestion<T> {
    transport: T,
    ingest_uri: Uri,
    authorization: HeaderValue,
    batch_size: usize,
}

impl<T: IngestTransport> MetricsIngestion<T> {
    pub fn new(config: &DynatraceConfig, transport: T) -> Result<Self, ConfigError> {
        config.check()?;
        let ingest_uri = config.ingest_uri()?;
        let mut authorization = HeaderValue::from_str(&format!("Api-Token {}", config.api_token()))
            .map_err(|_| ConfigError::InvalidApiToken)?;
        authorization.set_sensitive(true);
        Ok(MetricsIngestion {
            transport,
            ingest_uri,
            authorization,
            batch_size: config.batch_size,
        })
    }

    #[inline]
    pub fn ingest_uri(&self) -> &Uri {
        &self.ingest_uri
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends the lines in order, `batch_size` lines per request.
    ///
    /// A rejected batch does not stop the following ones, but a transport
    /// error does, and it will be the last outcome returned.
    pub fn send_in_batches<S: AsRef<str>>(&mut self, lines: &[S]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(lines.len().div_ceil(self.batch_size));
        for batch in lines.chunks(self.batch_size) {
            let outcome = self.send_batch(batch);
            let abort = matches!(outcome, BatchOutcome::TransportFailed(_));
            outcomes.push(outcome);
            if abort {
                break;
            }
        }
        outcomes
    }

    fn build_request<S: AsRef<str>>(&self, batch: &[S]) -> Result<Request<Vec<u8>>, http::Error> {
        let body_len = batch.iter().map(|l| l.as_ref().len() + 1).sum();
        let mut body = Vec::with_capacity(body_len);
        for (i, line) in batch.iter().enumerate() {
            if i > 0 {
                body.push(b'\n');
            }
            body.extend_from_slice(line.as_ref().as_bytes());
        }

        Request::builder()
            .method(Method::POST)
            .uri(self.ingest_uri.clone())
            .header(header::AUTHORIZATION, self.authorization.clone())
            .header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .body(body)
    }

    fn send_batch<S: AsRef<str>>(&mut self, batch: &[S]) -> BatchOutcome {
        let rsp = match self.build_request(batch) {
            Ok(req) => self.transport.send(req),
            Err(e) => Err(TransportError::from(e)),
        };
        match rsp {
            Ok(rsp) => {
                let code = rsp.status();
                if code.is_success() {
                    debug!("ingested {} metric lines: {code}", batch.len());
                    BatchOutcome::Ingested {
                        code,
                        lines: batch.len(),
                    }
                } else {
                    let body = String::from_utf8_lossy(rsp.body()).into_owned();
                    warn!("failed to ingest metrics to {}: {code} {body}", self.ingest_uri);
                    BatchOutcome::Rejected { code, body }
                }
            }
            Err(e) => {
                warn!("failed to send metrics to {}: {e}", self.ingest_uri);
                BatchOutcome::TransportFailed(e)
            }
        }
    }
}
