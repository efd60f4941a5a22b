/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::io::Read;
use std::time::Duration;

use http::{Request, Response};
use reqwest::blocking::Client;

use super::{IngestTransport, TransportError};
use crate::{ConfigError, DynatraceConfig};

const DEFAULT_RSP_BODY_MAX_SIZE: usize = 64 * 1024;

/// Blocking HTTP(S) transport backed by a pooled `reqwest` client.
#[derive(Clone, Debug)]
pub struct BlockingHttpTransport {
    client: Client,
    rsp_body_max_size: usize,
}

impl BlockingHttpTransport {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(BlockingHttpTransport {
            client,
            rsp_body_max_size: DEFAULT_RSP_BODY_MAX_SIZE,
        })
    }

    pub fn from_config(config: &DynatraceConfig) -> Result<Self, ConfigError> {
        BlockingHttpTransport::new(config.connect_timeout, config.read_timeout)
    }

    /// Responses with a larger body fail with [`TransportError::InvalidResponse`].
    pub fn set_rsp_body_max_size(&mut self, size: usize) {
        self.rsp_body_max_size = size;
    }
}

impl IngestTransport for BlockingHttpTransport {
    fn send(&mut self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError> {
        let (parts, body) = request.into_parts();
        let mut rsp = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()?;

        let max_size = self.rsp_body_max_size as u64;
        if rsp.content_length().is_some_and(|len| len > max_size) {
            return Err(TransportError::InvalidResponse("too large body"));
        }

        let mut builder = Response::builder()
            .status(rsp.status())
            .version(rsp.version());
        if let Some(headers) = builder.headers_mut() {
            *headers = rsp.headers().clone();
        }

        let mut body = Vec::new();
        rsp.by_ref()
            .take(max_size.saturating_add(1))
            .read_to_end(&mut body)?;
        if body.len() > self.rsp_body_max_size {
            return Err(TransportError::InvalidResponse("too large body"));
        }

        builder
            .body(body)
            .map_err(|_| TransportError::InvalidResponse("invalid header"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::{SocketAddr, TcpListener};
    use std::thread::{self, JoinHandle};

    use http::{Method, StatusCode, header};

    use super::*;
    use crate::{DynatraceExporter, MeterId, MeterSnapshot};

    /// Accepts one connection, reads one request and answers with `response`.
    fn serve_once(response: &'static [u8]) -> (SocketAddr, JoinHandle<(String, Vec<u8>)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let lower = line.to_ascii_lowercase();
                if let Some(v) = lower.strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
                head.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();

            let mut stream = reader.into_inner();
            stream.write_all(response).unwrap();
            stream.flush().unwrap();
            (head, body)
        });
        (addr, handle)
    }

    fn ingest_request(addr: SocketAddr) -> Request<Vec<u8>> {
        Request::builder()
            .method(Method::POST)
            .uri(format!("http://{addr}/api/v2/metrics/ingest"))
            .header(header::AUTHORIZATION, "Api-Token my-token")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(b"first\nsecond".to_vec())
            .unwrap()
    }

    fn transport() -> BlockingHttpTransport {
        BlockingHttpTransport::new(Duration::from_secs(1), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn send_to_server() {
        let (addr, server) = serve_once(
            b"HTTP/1.1 202 Accepted\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
        );

        let rsp = transport().send(ingest_request(addr)).unwrap();
        assert_eq!(rsp.status(), StatusCode::ACCEPTED);
        assert_eq!(rsp.body().as_slice(), b"{}");

        let (head, body) = server.join().unwrap();
        assert!(head.starts_with("POST /api/v2/metrics/ingest HTTP/1.1\r\n"));
        assert!(head.contains("authorization: Api-Token my-token\r\n"));
        assert!(head.contains("content-type: text/plain\r\n"));
        assert_eq!(body.as_slice(), b"first\nsecond");
    }

    #[test]
    fn chunked_response() {
        let (addr, server) = serve_once(
            b"HTTP/1.1 400 Bad Request\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n\
              5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
        );

        let rsp = transport().send(ingest_request(addr)).unwrap();
        assert_eq!(rsp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(rsp.body().as_slice(), b"hello world");
        server.join().unwrap();
    }

    #[test]
    fn huge_content_length() {
        let (addr, server) = serve_once(
            b"HTTP/1.1 400 Bad Request\r\nContent-Length: 18446744073709551615\r\nConnection: close\r\n\r\nshort",
        );

        let r = transport().send(ingest_request(addr));
        assert!(r.is_err());
        server.join().unwrap();
    }

    #[test]
    fn overflowing_chunk_size() {
        let (addr, server) = serve_once(
            b"HTTP/1.1 400 Bad Request\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n\
              1\r\na\r\nffffffffffffffff\r\n",
        );

        let r = transport().send(ingest_request(addr));
        assert!(r.is_err());
        server.join().unwrap();
    }

    #[test]
    fn too_large_chunked_body() {
        let (addr, server) = serve_once(
            b"HTTP/1.1 400 Bad Request\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n\
              10\r\n0123456789abcdef\r\n10\r\n0123456789abcdef\r\n0\r\n\r\n",
        );

        let mut transport = transport();
        transport.set_rsp_body_max_size(20);
        assert!(matches!(
            transport.send(ingest_request(addr)),
            Err(TransportError::InvalidResponse(_))
        ));
        server.join().unwrap();
    }

    #[test]
    fn bad_chunk_does_not_escape_publish() {
        let (addr, server) = serve_once(
            b"HTTP/1.1 202 Accepted\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n\
              1\r\na\r\nffffffffffffffff\r\n",
        );

        let config = DynatraceConfig::new(format!("http://{addr}"), "my-token");
        let mut exporter = DynatraceExporter::with_http_transport(&config).unwrap();
        let meters = vec![MeterSnapshot::gauge(MeterId::new("cpu.temperature"), 55.0)];
        let summary = exporter.publish(&meters);
        assert_eq!(summary.lines, 1);
        assert_eq!(summary.ingested_batches, 0);
        assert!(summary.aborted);
        server.join().unwrap();
    }

    #[test]
    fn connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(matches!(
            transport().send(ingest_request(addr)),
            Err(TransportError::ConnectFailed(_) | TransportError::Timeout)
        ));
    }

    #[test]
    fn https_is_attempted() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("https://{addr}/api/v2/metrics/ingest"))
            .body(Vec::new())
            .unwrap();
        assert!(matches!(
            transport().send(request),
            Err(TransportError::ConnectFailed(_) | TransportError::Timeout)
        ));
    }
}
