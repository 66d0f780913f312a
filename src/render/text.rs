//! Plain-text run reports

use crate::domain::{ResultRecord, RunMetadata, Summary};
use std::fmt::Write;

/// Errors listed inline before pointing at the results CSV.
const MAX_LISTED_ERRORS: usize = 5;

pub fn report_subject(summary: &Summary, dry_run: bool) -> String {
    format!(
        "{}Stock Update Complete - {}/{} successful",
        if dry_run { "[DRY-RUN] " } else { "" },
        summary.success,
        summary.total
    )
}

fn mode_label(dry_run: bool) -> &'static str {
    if dry_run {
        "Dry-run (No changes made)"
    } else {
        "Production (Changes applied)"
    }
}

/// Report body delivered to notification targets.
pub fn render_text_report(summary: &Summary, meta: &RunMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Stock Update Report");
    let _ = writeln!(out, "===================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Shop: {}", meta.shop);
    let _ = writeln!(out, "Location: {}", meta.location_name);
    let _ = writeln!(out, "Mode: {}", mode_label(meta.dry_run));
    let _ = writeln!(out, "Date: {}", meta.finished_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "Input SHA-256: {}", meta.input_digest);
    let _ = writeln!(out);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "--------");
    let _ = writeln!(out, "Successful: {}", summary.success);
    let _ = writeln!(out, "Failed: {}", summary.failed);
    let _ = writeln!(out, "Skipped: {}", summary.skipped);
    let _ = writeln!(out, "Total: {}", summary.total);
    let _ = writeln!(out, "Success Rate: {}%", summary.success_rate());
    if summary.failed > 0 || summary.skipped > 0 {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Some variants could not be updated. See the attached results CSV for details."
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Attachments:");
    let _ = writeln!(out, "- input file: original CSV as uploaded");
    let _ = write!(out, "- results CSV: status for each variant");
    out
}

/// Short summary printed by the CLI after a run.
pub fn render_console_summary(summary: &Summary, records: &[ResultRecord], dry_run: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        if summary.all_succeeded() { "Success!" } else { "Completed with errors" }
    );
    let _ = write!(
        out,
        "{} variants processed: {} successful, {} failed, {} skipped",
        summary.total, summary.success, summary.failed, summary.skipped
    );
    if dry_run {
        out.push_str(" (Dry-run mode - no changes made)");
    }

    let errors: Vec<&ResultRecord> = records.iter().filter(|r| r.status.is_error()).collect();
    if !errors.is_empty() {
        let _ = write!(out, "\nErrors:");
        for record in errors.iter().take(MAX_LISTED_ERRORS) {
            let _ = write!(out, "\n  - Variant {}: {}", record.variant_id, record.message);
        }
        if errors.len() > MAX_LISTED_ERRORS {
            let _ = write!(
                out,
                "\n  ... and {} more errors. Check the results CSV for details.",
                errors.len() - MAX_LISTED_ERRORS
            );
        }
    }
    out
}
