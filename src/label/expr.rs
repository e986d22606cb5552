use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::label::atom::Atom;

/// Operator precedence, tightest-binding first.
///
/// Rendering wraps an operand in parentheses exactly when the operand binds
/// looser than the operator it sits under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Atom,
    Not,
    And,
    Or,
    Implies,
    Iff,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Atom(Atom),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Implies(Box<Expr>, Box<Expr>),
    Iff(Box<Expr>, Box<Expr>),
}

/// An immutable label expression tree.
///
/// `grouped` records that the user wrapped this node in explicit parentheses.
/// It is metadata for rendering only: a grouped node prints inside `(...)`
/// and is treated as tightest-binding so no second layer is ever added,
/// which also collapses `((x))` to a single preserved layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    kind: ExprKind,
    grouped: bool,
}

impl Expr {
    pub fn atom(atom: Atom) -> Self {
        Self {
            kind: ExprKind::Atom(atom),
            grouped: false,
        }
    }

    fn binary(kind: ExprKind) -> Self {
        Self {
            kind,
            grouped: false,
        }
    }

    pub fn not(self) -> Self {
        Self::binary(ExprKind::Not(Box::new(self)))
    }

    pub fn and(self, other: Expr) -> Self {
        Self::binary(ExprKind::And(Box::new(self), Box::new(other)))
    }

    pub fn or(self, other: Expr) -> Self {
        Self::binary(ExprKind::Or(Box::new(self), Box::new(other)))
    }

    pub fn implies(self, other: Expr) -> Self {
        Self::binary(ExprKind::Implies(Box::new(self), Box::new(other)))
    }

    pub fn iff(self, other: Expr) -> Self {
        Self::binary(ExprKind::Iff(Box::new(self), Box::new(other)))
    }

    /// Mark this node as explicitly parenthesized. Idempotent.
    pub fn grouped(mut self) -> Self {
        self.grouped = true;
        self
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// True iff this expression is satisfied by the given atom set.
    ///
    /// Pure and total: every operand is evaluated, there are no side effects
    /// and no failure modes on a well-formed tree.
    pub fn matches(&self, atoms: &HashSet<Atom>) -> bool {
        match &self.kind {
            ExprKind::Atom(a) => atoms.contains(a),
            ExprKind::Not(e) => !e.matches(atoms),
            ExprKind::And(l, r) => l.matches(atoms) && r.matches(atoms),
            ExprKind::Or(l, r) => l.matches(atoms) || r.matches(atoms),
            ExprKind::Implies(l, r) => !l.matches(atoms) || r.matches(atoms),
            ExprKind::Iff(l, r) => l.matches(atoms) == r.matches(atoms),
        }
    }

    /// The canonical rendered form; `Display` delegates here.
    pub fn name(&self) -> String {
        self.to_string()
    }

    fn precedence(&self) -> Precedence {
        if self.grouped {
            return Precedence::Atom;
        }
        match &self.kind {
            ExprKind::Atom(_) => Precedence::Atom,
            ExprKind::Not(_) => Precedence::Not,
            ExprKind::And(..) => Precedence::And,
            ExprKind::Or(..) => Precedence::Or,
            ExprKind::Implies(..) => Precedence::Implies,
            ExprKind::Iff(..) => Precedence::Iff,
        }
    }

    /// Write an operand of an operator with precedence `op`, adding the
    /// parentheses required to keep the tree structure readable back.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, op: Precedence) -> fmt::Result {
        if self.precedence() > op {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }

    fn fmt_bare(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Atom(a) => write!(f, "{a}"),
            ExprKind::Not(e) => {
                f.write_str("!")?;
                e.fmt_operand(f, Precedence::Not)
            }
            ExprKind::And(l, r) => {
                l.fmt_operand(f, Precedence::And)?;
                f.write_str("&&")?;
                r.fmt_operand(f, Precedence::And)
            }
            ExprKind::Or(l, r) => {
                l.fmt_operand(f, Precedence::Or)?;
                f.write_str("||")?;
                r.fmt_operand(f, Precedence::Or)
            }
            ExprKind::Implies(l, r) => {
                l.fmt_operand(f, Precedence::Implies)?;
                f.write_str("->")?;
                r.fmt_operand(f, Precedence::Implies)
            }
            ExprKind::Iff(l, r) => {
                l.fmt_operand(f, Precedence::Iff)?;
                f.write_str("<->")?;
                r.fmt_operand(f, Precedence::Iff)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.grouped {
            f.write_str("(")?;
            self.fmt_bare(f)?;
            f.write_str(")")
        } else {
            self.fmt_bare(f)
        }
    }
}

/// Expressions serialize as their canonical text, the stable interchange
/// form shared with configuration storage.
impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::atom::LabelRegistry;

    fn atoms(reg: &LabelRegistry, names: &[&str]) -> HashSet<Atom> {
        names.iter().map(|n| reg.atom(n)).collect()
    }

    #[test]
    fn double_negation_renders_flat() {
        let reg = LabelRegistry::new();
        let x = reg.atom("x").expr();
        assert_eq!(x.not().not().name(), "!!x");
    }

    #[test]
    fn parens_added_only_where_structure_requires() {
        let reg = LabelRegistry::new();
        let x = || reg.atom("x").expr();
        assert_eq!(x().or(x()).and(x()).name(), "(x||x)&&x");
        assert_eq!(x().and(x()).or(x()).name(), "x&&x||x");
    }

    #[test]
    fn grouping_is_idempotent() {
        let reg = LabelRegistry::new();
        let e = reg.atom("a").expr().and(reg.atom("b").expr());
        assert_eq!(e.clone().grouped().name(), "(a&&b)");
        assert_eq!(e.grouped().grouped().name(), "(a&&b)");
    }

    #[test]
    fn evaluation_over_atom_sets() {
        let reg = LabelRegistry::new();
        let win32 = atoms(&reg, &["win", "32bit"]);
        let win64 = atoms(&reg, &["win", "64bit"]);
        let linux32 = atoms(&reg, &["linux", "32bit"]);

        let e = reg.atom("win").expr().and(reg.atom("32bit").expr());
        assert!(e.matches(&win32));
        assert!(!e.matches(&win64));
        assert!(!e.matches(&linux32));

        let w = reg.atom("win").expr();
        assert!(w.matches(&win32));
        assert!(w.matches(&win64));
        assert!(!w.matches(&linux32));

        let nw = reg.atom("win").expr().not();
        assert!(!nw.matches(&win32));
        assert!(nw.matches(&linux32));
    }

    #[test]
    fn implies_and_iff_truth_tables() {
        let reg = LabelRegistry::new();
        let a = || reg.atom("a").expr();
        let b = || reg.atom("b").expr();
        let both = atoms(&reg, &["a", "b"]);
        let only_a = atoms(&reg, &["a"]);
        let neither = HashSet::new();

        let imp = a().implies(b());
        assert!(imp.matches(&both));
        assert!(!imp.matches(&only_a));
        assert!(imp.matches(&neither));

        let iff = a().iff(b());
        assert!(iff.matches(&both));
        assert!(!iff.matches(&only_a));
        assert!(iff.matches(&neither));
    }

    #[test]
    fn serializes_as_canonical_text() {
        let reg = LabelRegistry::new();
        let e = reg.atom("a").expr().or(reg.atom("b").expr());
        assert_eq!(serde_json::to_string(&e).unwrap(), "\"a||b\"");
    }
}
