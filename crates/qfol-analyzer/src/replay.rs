//! Replay of newline-delimited JSON event logs into an analyzer.
//!
//! Each non-blank line is one [`EventRequest`]. Lines that fail to parse or
//! validate are skipped and counted; the replay itself only fails on I/O.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::error::Result;
use crate::heuristics::HeuristicProvider;
use crate::report::{EventRequest, IngestReceipt};
use crate::store::EventStore;
use crate::QfolAnalyzer;

/// Outcome of a replay.
#[derive(Debug, Default)]
pub struct ReplaySummary {
    pub receipts: Vec<IngestReceipt>,
    pub skipped: usize,
}

impl ReplaySummary {
    pub fn ingested(&self) -> usize {
        self.receipts.len()
    }
}

/// Ingest every event line read from `reader`.
pub async fn replay_reader<R, S, H>(
    analyzer: &QfolAnalyzer<S, H>,
    reader: R,
) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
    S: EventStore,
    H: HeuristicProvider,
{
    let mut summary = ReplaySummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = serde_json::from_str::<EventRequest>(line)
            .map_err(Into::into)
            .and_then(|request| analyzer.ingest(request));

        match outcome {
            Ok(receipt) => summary.receipts.push(receipt),
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Skipping event line");
                summary.skipped += 1;
            }
        }
    }

    tracing::info!(
        ingested = summary.ingested(),
        skipped = summary.skipped,
        "Replay complete"
    );

    Ok(summary)
}

/// Ingest every event line of the file at `path`.
pub async fn replay_file<S, H>(analyzer: &QfolAnalyzer<S, H>, path: &Path) -> Result<ReplaySummary>
where
    S: EventStore,
    H: HeuristicProvider,
{
    let file = File::open(path).await?;
    tracing::debug!(path = %path.display(), "Replaying event log");
    replay_reader(analyzer, BufReader::new(file)).await
}
