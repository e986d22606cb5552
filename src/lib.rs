//! Label-expression driven work queue.
//!
//! Items of pending work declare eligibility as a boolean formula over
//! named tags; nodes advertise tag sets. The scheduler matches pending
//! items to idle nodes, one item per node at a time, FIFO among matches.

pub mod config;
pub mod engine;
pub mod error;
pub mod label;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use engine::{Scheduler, SubmitHandle};
pub use error::{Result, SchedulerError};
pub use label::{Atom, Expr, LabelRegistry, ParseError};
pub use scheduler::{Assignment, ItemSpec, ItemStatus, NodeState, WorkItem};
