//! Downloadable results CSV

use crate::domain::ResultRecord;
use chrono::NaiveDate;

pub const RESULTS_HEADER: &str = "variant_id,count,status,message";

/// One row per record; the message is always quoted with inner quotes doubled.
pub fn render_results_csv(records: &[ResultRecord]) -> String {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(RESULTS_HEADER.to_string());
    for record in records {
        rows.push(format!(
            "{},{},{},{}",
            record.variant_id,
            record.count,
            record.status,
            quote(&record.message)
        ));
    }
    rows.join("\n")
}

/// `results_<date>.csv`, as attached to notifications.
pub fn results_file_name(date: NaiveDate) -> String {
    format!("results_{}.csv", date.format("%Y-%m-%d"))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Status, VariantId};

    fn record(id: &str, count: u32, status: Status, message: &str) -> ResultRecord {
        ResultRecord::new(VariantId::parse(id).expect("id"), count, status, message)
    }

    #[test]
    fn renders_header_and_rows() {
        let csv = render_results_csv(&[
            record("111", 2, Status::Success, "Stock updated from 0 to 2"),
            record("222", 1, Status::NotFound, "Variant ID not found in catalog"),
        ]);
        assert_eq!(
            csv,
            "variant_id,count,status,message\n\
             111,2,success,\"Stock updated from 0 to 2\"\n\
             222,1,not_found,\"Variant ID not found in catalog\""
        );
    }

    #[test]
    fn quotes_are_doubled_and_commas_preserved() {
        let csv = render_results_csv(&[record("1", 1, Status::Failed, "bad \"qty\", try again")]);
        assert!(csv.ends_with("1,1,failed,\"bad \"\"qty\"\", try again\""));
    }

    #[test]
    fn empty_message_is_an_empty_quoted_field() {
        let csv = render_results_csv(&[record("1", 1, Status::Success, "")]);
        assert!(csv.ends_with("1,1,success,\"\""));
    }

    #[test]
    fn header_only_for_no_records() {
        assert_eq!(render_results_csv(&[]), RESULTS_HEADER);
    }

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).expect("date");
        assert_eq!(results_file_name(date), "results_2026-03-07.csv");
    }
}
