//! Batch emission
//!
//! Records are composed concurrently, bounded by a semaphore, and each
//! result lands in the slot of its input index. Assembly walks the slots
//! in order, so the artifact never depends on task completion order.

use crate::composer::{ComposeStage, ComposedTicket, DocumentComposer, WarningKind};
use crate::record::{RawRecord, ValidationError};
use crate::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use ticket_pdf::{Page, PageSize, PdfDocument};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const PRODUCER: &str = "hallticket";
const TASK_FAILED: &str = "composition task failed";

type Outcome = std::result::Result<ComposedTicket, ValidationError>;

/// A record that produced no pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    /// Position in the input
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// A composed record that degraded somewhere
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWarning {
    pub index: usize,
    pub id: String,
    pub kind: WarningKind,
    pub stage: ComposeStage,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub page_count: usize,
    pub failures: Vec<RecordFailure>,
    pub warnings: Vec<RecordWarning>,
}

/// Pages belonging to one composed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSpan {
    pub index: usize,
    pub id: String,
    /// 0-based index of the record's first page in the artifact
    pub first_page: usize,
    pub page_count: usize,
}

/// Ordered pages of a whole batch, with its summary
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub page_size: PageSize,
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub pages: Vec<Page>,
    pub records: Vec<RecordSpan>,
    pub summary: BatchSummary,
}

impl Artifact {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages of the record at input position `index`
    pub fn pages_for(&self, index: usize) -> Option<&[Page]> {
        self.records
            .iter()
            .find(|span| span.index == index)
            .map(|span| &self.pages[span.first_page..span.first_page + span.page_count])
    }

    /// Render the whole batch as one PDF
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new(self.page_size);
        doc.set_title(&self.title);
        doc.set_producer(PRODUCER);
        doc.set_creation_date(&format!("D:{}", self.generated_at.format("%Y%m%d%H%M%S")));

        for page in &self.pages {
            doc.add_page(page)?;
        }

        Ok(doc.to_bytes()?)
    }

    pub fn save_pdf<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_pdf()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Summary as pretty-printed JSON
    pub fn summary_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summary)?)
    }
}

/// Composes many records into one artifact
pub struct BatchEmitter {
    composer: Arc<DocumentComposer>,
    max_parallel: usize,
}

impl BatchEmitter {
    /// Parallelism defaults to the composer's `maxParallel` setting
    pub fn new(composer: DocumentComposer) -> Self {
        let max_parallel = composer.config().max_parallel.max(1);
        Self {
            composer: Arc::new(composer),
            max_parallel,
        }
    }

    pub fn with_parallelism(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    pub fn composer(&self) -> &DocumentComposer {
        &self.composer
    }

    /// Compose a single record as its own artifact
    pub async fn emit_one(&self, record: RawRecord) -> Artifact {
        self.emit(vec![record]).await
    }

    /// Compose every record, in input order
    ///
    /// Invalid records are skipped and listed in the summary; they never
    /// stop the batch.
    pub async fn emit(&self, records: Vec<RawRecord>) -> Artifact {
        let ids: Vec<Option<String>> = records.iter().map(RawRecord::identifier).collect();
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut tasks = JoinSet::new();

        for (index, record) in records.into_iter().enumerate() {
            let composer = Arc::clone(&self.composer);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring only waits
                let _permit = semaphore.acquire_owned().await;
                (index, composer.compose(&record).await)
            });
        }

        let mut slots: Vec<Option<Outcome>> = ids.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => log::error!("{TASK_FAILED}: {e}"),
            }
        }

        self.assemble(ids, slots)
    }

    fn assemble(&self, ids: Vec<Option<String>>, slots: Vec<Option<Outcome>>) -> Artifact {
        let config = self.composer.config();
        let mut pages = Vec::new();
        let mut records = Vec::new();
        let mut summary = BatchSummary {
            total: slots.len(),
            ..BatchSummary::default()
        };

        for (index, (id, slot)) in ids.into_iter().zip(slots).enumerate() {
            let ticket = match slot {
                Some(Ok(ticket)) => ticket,
                Some(Err(e)) => {
                    log::warn!(
                        "skipping record {} ({}): {}",
                        index,
                        id.as_deref().unwrap_or("no id"),
                        e
                    );
                    summary.failures.push(RecordFailure {
                        index,
                        id,
                        reason: e.to_string(),
                    });
                    continue;
                }
                None => {
                    summary.failures.push(RecordFailure {
                        index,
                        id,
                        reason: TASK_FAILED.to_string(),
                    });
                    continue;
                }
            };

            summary
                .warnings
                .extend(ticket.warnings.iter().map(|w| RecordWarning {
                    index,
                    id: ticket.record_id.clone(),
                    kind: w.kind,
                    stage: w.stage,
                    detail: w.detail.clone(),
                }));
            records.push(RecordSpan {
                index,
                id: ticket.record_id,
                first_page: pages.len(),
                page_count: ticket.pages.len(),
            });
            pages.extend(ticket.pages);
            summary.succeeded += 1;
        }
        summary.page_count = pages.len();

        log::info!(
            "batch complete: {} of {} records composed, {} skipped, {} pages",
            summary.succeeded,
            summary.total,
            summary.failures.len(),
            summary.page_count
        );

        Artifact {
            page_size: self.composer.page_size(),
            title: config.document_title.clone(),
            generated_at: self.composer.generated_at(),
            pages,
            records,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TicketConfig;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn generated_at() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap()
    }

    fn emitter() -> BatchEmitter {
        BatchEmitter::new(DocumentComposer::new(TicketConfig::default(), generated_at()).unwrap())
    }

    fn record(id: &str, name: &str) -> RawRecord {
        RawRecord(json!({"id": id, "name": name, "examName": "Diploma Final"}))
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let artifact = emitter().emit(Vec::new()).await;
        assert_eq!(artifact.page_count(), 0);
        assert_eq!(artifact.summary, BatchSummary::default());
    }

    #[tokio::test]
    async fn test_artifact_uses_configured_page_size() {
        let mut config = TicketConfig::default();
        config.page.width = PageSize::LETTER.width;
        config.page.height = PageSize::LETTER.height;
        let composer = DocumentComposer::new(config, generated_at()).unwrap();

        let artifact = BatchEmitter::new(composer)
            .emit(vec![record("S-1", "Asha")])
            .await;
        assert_eq!(artifact.page_size, PageSize::LETTER);

        let doc = lopdf::Document::load_mem(&artifact.to_pdf().unwrap()).unwrap();
        assert_eq!(doc.get_pages().len(), artifact.page_count());
    }

    #[tokio::test]
    async fn test_spans_follow_input_order() {
        let records = (0..6).map(|i| record(&format!("S-{i}"), "Asha")).collect();
        let artifact = emitter().with_parallelism(3).emit(records).await;

        let ids: Vec<&str> = artifact.records.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["S-0", "S-1", "S-2", "S-3", "S-4", "S-5"]);

        let mut next_page = 0;
        for span in &artifact.records {
            assert_eq!(span.first_page, next_page);
            next_page += span.page_count;
        }
        assert_eq!(next_page, artifact.page_count());
        assert_eq!(artifact.summary.page_count, artifact.page_count());
    }

    #[tokio::test]
    async fn test_failure_keeps_index_and_id() {
        let records = vec![
            record("S-1", "Asha"),
            RawRecord(json!({"id": "S-2", "examName": "Diploma Final"})),
            RawRecord(json!({"name": "Nameless Id"})),
        ];
        let artifact = emitter().emit(records).await;

        assert_eq!(artifact.summary.succeeded, 1);
        assert_eq!(
            artifact.summary.failures,
            vec![
                RecordFailure {
                    index: 1,
                    id: Some("S-2".to_string()),
                    reason: "missing required field: name".to_string(),
                },
                RecordFailure {
                    index: 2,
                    id: None,
                    reason: "missing required field: id".to_string(),
                },
            ]
        );
        assert!(artifact.pages_for(0).is_some());
        assert!(artifact.pages_for(1).is_none());
    }

    #[tokio::test]
    async fn test_summary_json_shape() {
        let artifact = emitter()
            .emit(vec![RawRecord(json!({"id": "S-9", "examName": "E"}))])
            .await;
        let value: serde_json::Value =
            serde_json::from_str(&artifact.summary_json().unwrap()).unwrap();

        assert_eq!(value["total"], 1);
        assert_eq!(value["succeeded"], 0);
        assert_eq!(value["pageCount"], 0);
        assert_eq!(value["failures"][0]["id"], "S-9");
        assert_eq!(
            value["failures"][0]["reason"],
            "missing required field: name"
        );
        assert_eq!(value["warnings"], json!([]));
    }
}
