/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

mod meter;
pub use meter::{Measurement, Meter, MeterId, MeterKind, MeterSnapshot, Statistic};

mod tag;
pub use tag::{DisplayTagMap, MetricTagMap};

mod value;

mod format;
pub use format::{metric_line, metric_lines};

mod discard;
pub use discard::DiscardedMeters;

mod translate;
pub use translate::SnapshotTranslator;

mod clock;
pub use clock::{Clock, SystemClock};

mod config;
pub use config::{ConfigError, DynatraceConfig};

mod ingest;
pub use ingest::{
    BatchOutcome, BlockingHttpTransport, IngestTransport, METRICS_INGEST_PATH, MetricsIngestion,
    TransportError,
};

mod export;
pub use export::{DynatraceExporter, PublishSummary};

mod worker;
pub use worker::ExportWorker;
