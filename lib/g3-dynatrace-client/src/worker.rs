/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::{Clock, DynatraceExporter, IngestTransport, Meter};

const THREAD_NAME: &str = "dynatrace-metrics-publisher";

/// Background thread that publishes one snapshot per step.
pub struct ExportWorker {
    quit: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ExportWorker {
    /// `source` is called at the start of every cycle to get the meters to
    /// export.
    pub fn spawn<T, C, F, M>(
        mut exporter: DynatraceExporter<T, C>,
        step: Duration,
        mut source: F,
    ) -> io::Result<Self>
    where
        T: IngestTransport + Send + 'static,
        C: Clock + Send + 'static,
        F: FnMut() -> Vec<M> + Send + 'static,
        M: Meter + 'static,
    {
        let quit = Arc::new(AtomicBool::new(false));
        let thread_quit = quit.clone();
        let handle = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                loop {
                    let instant_start = Instant::now();

                    let r = panic::catch_unwind(AssertUnwindSafe(|| {
                        let meters = source();
                        exporter.publish(&meters);
                    }));
                    if r.is_err() {
                        warn!("{THREAD_NAME}: export cycle panicked, will retry at next step");
                    }

                    if thread_quit.load(Ordering::Relaxed) {
                        break;
                    }
                    wait_step(step, instant_start, &thread_quit);
                    if thread_quit.load(Ordering::Relaxed) {
                        break;
                    }
                }
                debug!("{THREAD_NAME} quit");
            })?;
        Ok(ExportWorker {
            quit,
            handle: Some(handle),
        })
    }

    /// Stops the worker and waits for the running cycle, if any, to finish.
    pub fn stop(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.quit.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("{THREAD_NAME} panicked");
            }
        }
    }
}

impl Drop for ExportWorker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn wait_step(step: Duration, instant_start: Instant, quit: &AtomicBool) {
    let Some(instant_next) = instant_start.checked_add(step) else {
        std::thread::park_timeout(step);
        return;
    };
    while !quit.load(Ordering::Relaxed) {
        let Some(dur) = instant_next.checked_duration_since(Instant::now()) else {
            return;
        };
        if dur.is_zero() {
            return;
        }
        std::thread::park_timeout(dur);
    }
}
