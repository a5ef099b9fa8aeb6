//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `nominations.rs` — create/edit/submit/review/vote/show/list.
//! - `kobo.rs` — KoBo pulls and config inspection.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod kobo;
pub mod nominations;

pub use kobo::{handle_config_commands, handle_kobo_commands};
pub use nominations::handle_nomination_commands;
