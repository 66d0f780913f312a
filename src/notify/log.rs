//! Development notifier: logs the report instead of sending it

use super::{Notifier, RunReport};
use crate::error::NotifyError;
use crate::render::{render_text_report, report_subject};
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, report: &RunReport) -> Result<(), NotifyError> {
        let subject = report_subject(&report.summary, report.meta.dry_run);
        let body = render_text_report(&report.summary, &report.meta);
        tracing::info!(
            %subject,
            attachments = 2,
            input = %report.input.name,
            "run report (not delivered)\n{body}"
        );
        Ok(())
    }
}
