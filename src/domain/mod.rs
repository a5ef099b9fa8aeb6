//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs` — nomination record, lifecycle enums, config and report structs.
//! - `constants.rs` — KoBo endpoint defaults and the form field/attachment maps.
//! - `errors.rs` — `NominationError`, the error taxonomy surfaced to callers.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! `NominationRecord` is the on-disk ledger schema and the `--json` output of
//! most commands. Keep it in sync with `docs/contracts/nomination.schema.json`.

pub mod constants;
pub mod errors;
pub mod models;
