/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use log::{debug, warn};

use crate::{
    BatchOutcome, BlockingHttpTransport, Clock, ConfigError, DynatraceConfig, IngestTransport,
    Meter, MetricsIngestion, SnapshotTranslator, SystemClock,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub lines: usize,
    pub ingested_batches: usize,
    pub rejected_batches: usize,
    /// set if a transport error stopped the remaining batches
    pub aborted: bool,
}

/// Exports meter snapshots to the dynatrace metrics ingest api.
///
/// Each call to [`publish`](Self::publish) is one export cycle. Errors are
/// logged and counted in the returned summary, never propagated.
pub struct DynatraceExporter<T, C = SystemClock> {
    translator: SnapshotTranslator,
    ingestion: MetricsIngestion<T>,
    clock: C,
}

impl DynatraceExporter<BlockingHttpTransport> {
    pub fn with_http_transport(config: &DynatraceConfig) -> Result<Self, ConfigError> {
        config.check()?;
        DynatraceExporter::new(config, BlockingHttpTransport::from_config(config)?)
    }
}

impl<T: IngestTransport> DynatraceExporter<T> {
    pub fn new(config: &DynatraceConfig, transport: T) -> Result<Self, ConfigError> {
        DynatraceExporter::with_clock(config, transport, SystemClock)
    }
}

impl<T: IngestTransport, C: Clock> DynatraceExporter<T, C> {
    pub fn with_clock(
        config: &DynatraceConfig,
        transport: T,
        clock: C,
    ) -> Result<Self, ConfigError> {
        let ingestion = MetricsIngestion::new(config, transport)?;
        Ok(DynatraceExporter {
            translator: SnapshotTranslator::default(),
            ingestion,
            clock,
        })
    }

    #[inline]
    pub fn translator(&self) -> &SnapshotTranslator {
        &self.translator
    }

    #[inline]
    pub fn ingestion(&self) -> &MetricsIngestion<T> {
        &self.ingestion
    }

    pub fn publish<'a, I, M>(&mut self, meters: I) -> PublishSummary
    where
        I: IntoIterator<Item = &'a M>,
        M: Meter + ?Sized + 'a,
    {
        let timestamp = self.clock.wall_time_millis();
        let lines = self.translator.translate(meters, timestamp);

        let mut summary = PublishSummary {
            lines: lines.len(),
            ..Default::default()
        };
        for outcome in self.ingestion.send_in_batches(&lines) {
            match outcome {
                BatchOutcome::Ingested { .. } => summary.ingested_batches += 1,
                BatchOutcome::Rejected { .. } => summary.rejected_batches += 1,
                BatchOutcome::TransportFailed(_) => summary.aborted = true,
            }
        }

        if summary.aborted {
            warn!(
                "metrics export to {} aborted after {} batches",
                self.ingestion.ingest_uri(),
                summary.ingested_batches + summary.rejected_batches
            );
        } else {
            debug!(
                "exported {} metric lines: {} batches ingested, {} rejected",
                summary.lines, summary.ingested_batches, summary.rejected_batches
            );
        }
        summary
    }
}
