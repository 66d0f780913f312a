//! stock-sync: reconcile per-location inventory from scanned variant IDs
//!
//! An upload lists one variant ID per physical unit counted. The engine
//! aggregates the IDs into target quantities, resolves them against the
//! catalog, writes the targets back in paced batches and reports one
//! result per distinct variant.

pub mod aggregate;
pub mod catalog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod notify;
pub mod parse;
pub mod render;
pub mod resolve;
pub mod utils;
pub mod writeback;

pub use engine::{Engine, EngineSettings, NotificationState, RunOutcome, RunRequest};
