//! Queueing and assignment: pending items, the node pool, and the match
//! pass that pairs them.
//!
//! This layer is synchronous and lock-free; [`crate::engine::Scheduler`]
//! owns it behind a single mutex and drives a match pass on every trigger
//! (submission, a node going idle, completion).

pub mod item;
pub mod matching;
pub mod pool;
pub mod queue;

pub use item::{ItemSpec, ItemStatus, WorkItem};
pub use matching::{run_match_pass, Assignment};
pub use pool::{Node, NodePool, NodeState};
pub use queue::ItemQueue;
