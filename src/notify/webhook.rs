//! JSON webhook delivery

use super::{Notifier, RunReport};
use crate::error::NotifyError;
use crate::render::{render_results_csv, render_text_report, report_subject, results_file_name};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
struct Attachment {
    filename: String,
    content: String,
}

const SHOP_DOMAIN_SUFFIX: &str = ".myshopify.com";

/// Address used when the shop reports no email: `<handle>@shopify.com`.
pub fn fallback_recipient(shop: &str) -> Option<String> {
    let handle = shop.trim().trim_start_matches("https://").trim_end_matches('/');
    let handle = handle.strip_suffix(SHOP_DOMAIN_SUFFIX).unwrap_or(handle);
    (!handle.is_empty()).then(|| format!("{handle}@shopify.com"))
}

/// POSTs the report, with the input and results CSV inlined as attachments.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    recipient: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, recipient: Option<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("stock-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self { client, url: url.into(), recipient })
    }

    fn payload(&self, report: &RunReport) -> serde_json::Value {
        let attachments = vec![
            Attachment {
                filename: report.input.name.clone(),
                content: String::from_utf8_lossy(&report.input.bytes).into_owned(),
            },
            Attachment {
                filename: results_file_name(report.meta.finished_at.date_naive()),
                content: render_results_csv(&report.records),
            },
        ];
        json!({
            "to": self.recipient,
            "subject": report_subject(&report.summary, report.meta.dry_run),
            "text": render_text_report(&report.summary, &report.meta),
            "meta": report.meta,
            "summary": report.summary,
            "results": report.records,
            "attachments": attachments,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, report: &RunReport) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.payload(report))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Http(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InputFile, ResultRecord, RunMetadata, Status, Summary, VariantId};
    use chrono::{TimeZone, Utc};
    use tiny_http::{Response, Server};

    fn report() -> RunReport {
        let records = vec![ResultRecord::new(
            VariantId::parse("12").expect("id"),
            3,
            Status::DryRun,
            "Would be updated from 1 to 3",
        )];
        RunReport {
            summary: Summary::from_records(&records),
            records,
            input: InputFile::new("count.csv", b"variant_id\n12\n12\n12\n".to_vec()),
            meta: RunMetadata {
                shop: "demo.myshopify.com".to_string(),
                location_name: "Main".to_string(),
                dry_run: true,
                input_digest: "abc".to_string(),
                finished_at: Utc.with_ymd_and_hms(2026, 5, 6, 7, 8, 9).single().expect("time"),
            },
        }
    }

    #[test]
    fn fallback_recipient_uses_shop_handle() {
        assert_eq!(
            fallback_recipient("demo-store.myshopify.com"),
            Some("demo-store@shopify.com".to_string())
        );
        assert_eq!(
            fallback_recipient("https://demo-store.myshopify.com/"),
            Some("demo-store@shopify.com".to_string())
        );
        assert_eq!(fallback_recipient(""), None);
    }

    #[test]
    fn payload_carries_subject_and_attachments() {
        let notifier =
            WebhookNotifier::new("http://127.0.0.1:9/hook", Some("ops@example.com".into()))
                .expect("notifier");
        let payload = notifier.payload(&report());

        assert_eq!(payload["to"], "ops@example.com");
        assert_eq!(payload["subject"], "[DRY-RUN] Stock Update Complete - 1/1 successful");
        assert_eq!(payload["results"][0]["status"], "dry_run");
        assert_eq!(payload["attachments"][0]["filename"], "count.csv");
        assert_eq!(payload["attachments"][1]["filename"], "results_2026-05-06.csv");
    }

    #[tokio::test]
    async fn non_success_status_is_a_delivery_failure() {
        let server = Server::http("127.0.0.1:0").expect("server");
        let addr = server.server_addr().to_ip().expect("ip");
        let handle = std::thread::spawn(move || {
            let mut request = server.recv().expect("request");
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).expect("body");
            let _ = request.respond(Response::from_string("nope").with_status_code(502));
            body
        });

        let notifier =
            WebhookNotifier::new(format!("http://{addr}/hook"), None).expect("notifier");
        let err = notifier.notify(&report()).await.expect_err("502");
        let body = handle.join().expect("server");

        assert!(matches!(err, NotifyError::Http(502)));
        assert!(body.contains("\"to\":null"));
    }
}
