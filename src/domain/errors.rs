use crate::domain::models::Status;

#[derive(thiserror::Error, Debug)]
pub enum NominationError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("illegal transition: nomination {id} is {status}, {action} not allowed")]
    State {
        id: String,
        status: Status,
        action: &'static str,
    },
    #[error("nomination not found: {0}")]
    NotFound(String),
    #[error("nomination {id} was modified concurrently (expected version {expected}, found {found})")]
    Conflict {
        id: String,
        expected: u64,
        found: u64,
    },
    #[error("{actor} may not {action} nomination {id}")]
    Forbidden {
        id: String,
        actor: String,
        action: &'static str,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl NominationError {
    pub fn state(id: &str, status: Status, action: &'static str) -> Self {
        NominationError::State {
            id: id.to_string(),
            status,
            action,
        }
    }
}
