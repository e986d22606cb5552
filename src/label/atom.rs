use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::label::expr::Expr;
use crate::label::parse::{parse_expression, ParseError};

/// A single named tag attached to a node.
///
/// Identity is the name: two atoms with the same name are the same label,
/// wherever they came from. Clones are cheap (shared `Arc<str>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    name: Arc<str>,
}

impl Atom {
    pub(crate) fn new(name: &str) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lift this atom into an expression tree leaf.
    pub fn expr(&self) -> Expr {
        Expr::atom(self.clone())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Canonical atom registry: one `Atom` per name, created on first use and
/// kept for the registry's lifetime.
///
/// This is an explicit object rather than a process-wide singleton so that
/// independent schedulers (and tests) can each own their own label universe.
#[derive(Debug, Default)]
pub struct LabelRegistry {
    atoms: Mutex<HashMap<String, Atom>>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the canonical atom for `name`, creating it on first reference.
    pub fn atom(&self, name: &str) -> Atom {
        let mut atoms = self.atoms.lock().expect("label registry poisoned");
        atoms
            .entry(name.to_string())
            .or_insert_with(|| Atom::new(name))
            .clone()
    }

    /// Parse a label expression, interning every identifier through this
    /// registry.
    pub fn parse(&self, text: &str) -> Result<Expr, ParseError> {
        parse_expression(self, text)
    }

    /// Number of distinct atoms seen so far.
    pub fn len(&self) -> usize {
        self.atoms.lock().expect("label registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_identity_is_by_name() {
        let reg = LabelRegistry::new();
        let a = reg.atom("linux");
        let b = reg.atom("linux");
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn registries_are_independent() {
        let r1 = LabelRegistry::new();
        let r2 = LabelRegistry::new();
        let a = r1.atom("win");
        let b = r2.atom("win");
        // still equal by name even across registries
        assert_eq!(a, b);
        assert_eq!(r1.len(), 1);
        assert_eq!(r2.len(), 1);
    }

    #[test]
    fn dashes_and_dots_are_plain_names() {
        let reg = LabelRegistry::new();
        assert_eq!(reg.atom("solaris-x86").name(), "solaris-x86");
        assert_eq!(reg.atom("32bit.dot").name(), "32bit.dot");
    }
}
