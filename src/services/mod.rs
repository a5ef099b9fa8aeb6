//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `nominations.rs` — `NominationManager`: validation and the status lifecycle.
//! - `storage.rs` — `NominationStore` trait, JSON ledger and in-memory stores, audit log.
//! - `kobo.rs` — KoBo v2 client, field mapping, paged import, attachments.
//! - `config.rs` — TOML config loading and KoBo token lookup.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod config;
pub mod kobo;
pub mod nominations;
pub mod output;
pub mod storage;
