use thiserror::Error;
use uuid::Uuid;

use crate::label::ParseError;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("invalid label expression: {0}")]
    Parse(#[from] ParseError),

    #[error("item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("item not assigned yet: {0}")]
    ItemNotAssigned(Uuid),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node already registered: {0}")]
    DuplicateNode(String),

    #[error("queue at capacity ({0} pending items)")]
    QueueFull(usize),

    #[error("item was cancelled before assignment")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
