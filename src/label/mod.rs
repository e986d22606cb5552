//! Label atoms, boolean label expressions, and the expression parser.
//!
//! Nodes advertise a set of named tags (atoms); items declare eligibility as
//! a boolean formula over those tags. The queue only ever sees parsed trees,
//! never raw text.

pub mod atom;
pub mod expr;
pub mod parse;

pub use atom::{Atom, LabelRegistry};
pub use expr::{Expr, ExprKind};
pub use parse::ParseError;

/// A node's advertised tag set.
pub type AtomSet = std::collections::HashSet<Atom>;
