//! Outbox delivery: one directory per run with the report and attachments

use super::{Notifier, RunReport};
use crate::error::NotifyError;
use crate::render::{render_results_csv, render_text_report, report_subject, results_file_name};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const DIGEST_PREFIX_LEN: usize = 12;

pub struct OutboxNotifier {
    root: PathBuf,
}

impl OutboxNotifier {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/<timestamp>-<digest prefix>` for a report.
    pub fn run_dir(&self, report: &RunReport) -> PathBuf {
        let digest: String = report.meta.input_digest.chars().take(DIGEST_PREFIX_LEN).collect();
        self.root.join(format!("{}-{}", report.meta.finished_at.format("%Y%m%dT%H%M%SZ"), digest))
    }
}

/// Keep only the final path component of an uploaded file name.
fn attachment_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("input.csv")
        .to_string()
}

#[async_trait]
impl Notifier for OutboxNotifier {
    fn name(&self) -> &'static str {
        "outbox"
    }

    async fn notify(&self, report: &RunReport) -> Result<(), NotifyError> {
        let dir = self.run_dir(report);
        tokio::fs::create_dir_all(&dir).await?;

        tokio::fs::write(dir.join(attachment_name(&report.input.name)), &report.input.bytes)
            .await?;
        tokio::fs::write(
            dir.join(results_file_name(report.meta.finished_at.date_naive())),
            render_results_csv(&report.records),
        )
        .await?;

        let subject = report_subject(&report.summary, report.meta.dry_run);
        let body = render_text_report(&report.summary, &report.meta);
        tokio::fs::write(dir.join("report.txt"), format!("{subject}\n\n{body}\n")).await?;

        tracing::debug!(dir = %dir.display(), "run report written to outbox");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_name_strips_directories() {
        assert_eq!(attachment_name("/tmp/uploads/stock.csv"), "stock.csv");
        assert_eq!(attachment_name("../../etc/passwd"), "passwd");
        assert_eq!(attachment_name(""), "input.csv");
        assert_eq!(attachment_name("/"), "input.csv");
    }

    #[tokio::test]
    async fn writes_report_and_attachments() {
        use crate::domain::{InputFile, ResultRecord, RunMetadata, Status, Summary, VariantId};
        use chrono::{TimeZone, Utc};

        let tmp = tempfile::TempDir::new().expect("tmp");
        let records = vec![ResultRecord::new(
            VariantId::parse("7").expect("id"),
            2,
            Status::Success,
            "Stock updated from 0 to 2",
        )];
        let report = RunReport {
            summary: Summary::from_records(&records),
            records,
            input: InputFile::new("uploads/count.csv", b"variant_id\n7\n7\n".to_vec()),
            meta: RunMetadata {
                shop: "demo.myshopify.com".to_string(),
                location_name: "Main".to_string(),
                dry_run: false,
                input_digest: "0123456789abcdef".to_string(),
                finished_at: Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).single().expect("time"),
            },
        };

        let outbox = OutboxNotifier::new(tmp.path());
        outbox.notify(&report).await.expect("notify");

        let dir = tmp.path().join("20260304T050607Z-0123456789ab");
        assert_eq!(outbox.run_dir(&report), dir);
        assert_eq!(std::fs::read(dir.join("count.csv")).expect("input"), report.input.bytes);
        let results = std::fs::read_to_string(dir.join("results_2026-03-04.csv")).expect("csv");
        assert!(results.ends_with("7,2,success,\"Stock updated from 0 to 2\""));
        let text = std::fs::read_to_string(dir.join("report.txt")).expect("report");
        assert!(text.starts_with("Stock Update Complete - 1/1 successful"));
    }
}
