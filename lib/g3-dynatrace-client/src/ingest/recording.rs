/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use http::{HeaderMap, Method, Request, Response, Uri};

use super::{IngestTransport, TransportError};

#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
}

#[derive(Default)]
struct RecordingState {
    requests: Vec<RecordedRequest>,
    responses: VecDeque<Result<(u16, String), TransportError>>,
}

/// Keeps every request and answers with the queued responses, or with
/// `202 Accepted` once the queue is empty.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingTransport {
    pub(crate) fn push_response(&self, rsp: Result<(u16, &str), TransportError>) {
        let mut state = self.state.lock().unwrap();
        state
            .responses
            .push_back(rsp.map(|(code, body)| (code, body.to_string())));
    }

    pub(crate) fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn bodies(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .map(|r| String::from_utf8(r.body.clone()).unwrap())
            .collect()
    }
}

impl IngestTransport for RecordingTransport {
    fn send(&mut self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError> {
        let (parts, body) = request.into_parts();
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });
        let (code, body) = state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok((202, String::new())))?;
        let rsp = Response::builder()
            .status(code)
            .body(body.into_bytes())
            .unwrap();
        Ok(rsp)
    }
}
