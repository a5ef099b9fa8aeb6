use crate::domain::errors::NominationError;
use crate::domain::models::{JsonOut, NominationRecord};
use serde::Serialize;

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

pub fn record_row(r: &NominationRecord) -> String {
    format!(
        "{}\t{}\t{}\t{} -> {}",
        r.id, r.status, r.award_cycle, r.nominator, r.nominee
    )
}

/// Stable machine-readable name for the failure class of `err`.
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<NominationError>() {
        Some(NominationError::Validation(_)) => "validation",
        Some(NominationError::State { .. }) => "state",
        Some(NominationError::NotFound(_)) => "not_found",
        Some(NominationError::Conflict { .. }) => "conflict",
        Some(NominationError::Forbidden { .. }) => "forbidden",
        Some(NominationError::Io(_)) | Some(NominationError::Json(_)) => "storage",
        None => "error",
    }
}

pub fn print_error(json: bool, err: &anyhow::Error) {
    if json {
        let body = serde_json::json!({
            "ok": false,
            "error": {"kind": error_kind(err), "message": err.to_string()}
        });
        println!("{}", body);
    }
    eprintln!("error: {:#}", err);
}
