//! Output rendering (results CSV, text reports)

pub mod results_csv;
pub mod text;

pub use results_csv::{render_results_csv, results_file_name};
pub use text::{render_console_summary, render_text_report, report_subject};
