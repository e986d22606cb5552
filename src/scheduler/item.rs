use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::label::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemStatus {
    Pending,
    Assigned,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "pending"),
            ItemStatus::Assigned => write!(f, "assigned"),
        }
    }
}

/// What a caller submits: an optional eligibility expression and an optional
/// upstream item that must finish first.
#[derive(Debug, Clone, Default)]
pub struct ItemSpec {
    pub expr: Option<Expr>,
    pub blocked_by: Option<Uuid>,
}

impl ItemSpec {
    /// An item any node may run.
    pub fn any() -> Self {
        Self::default()
    }

    /// An item restricted to nodes satisfying `expr`.
    pub fn labeled(expr: Expr) -> Self {
        Self {
            expr: Some(expr),
            blocked_by: None,
        }
    }

    /// Hold this item back while the upstream item is still in the queue
    /// or running.
    pub fn blocked_by(mut self, upstream: Uuid) -> Self {
        self.blocked_by = Some(upstream);
        self
    }
}

/// A unit of pending work.
///
/// `seq` is the submission order key; wall-clock `submitted_at` is kept for
/// observability but ties are possible, so ordering never relies on it.
/// The expression is fixed at submission and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct WorkItem {
    pub id: Uuid,
    pub expr: Option<Expr>,
    pub seq: u64,
    pub submitted_at: DateTime<Utc>,
    pub status: ItemStatus,
    pub assigned_node: Option<String>,
    pub blocked_by: Option<Uuid>,
}

impl WorkItem {
    pub(crate) fn new(seq: u64, spec: ItemSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            expr: spec.expr,
            seq,
            submitted_at: Utc::now(),
            status: ItemStatus::Pending,
            assigned_node: None,
            blocked_by: spec.blocked_by,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ItemStatus::Pending
    }
}
