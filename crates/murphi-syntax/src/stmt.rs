//! Statements.

use crate::expr::{Expr, Quantifier};
use crate::location::Location;
use crate::{NodeId, NODE_ID_UNASSIGNED};

/// A statement.
///
/// Equality is structural: locations and unique ids are ignored.
#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind of statement.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// `lhs := rhs`. The lhs must satisfy `is_lvalue()`.
    Assignment { lhs: Box<Expr>, rhs: Box<Expr> },
    /// `if ... elsif ... else ... end`. The final clause may have no
    /// condition.
    If { clauses: Vec<IfClause> },
    /// `switch expr ... end`.
    Switch {
        expr: Box<Expr>,
        cases: Vec<SwitchCase>,
    },
    /// `for q do ... end`.
    For {
        quantifier: Box<Quantifier>,
        body: Vec<Stmt>,
    },
    /// `while condition do ... end`.
    While { condition: Box<Expr>, body: Vec<Stmt> },
    /// `return` with an optional value.
    Return { value: Option<Box<Expr>> },
    /// Call of a procedure (a function used as a statement).
    ProcedureCall { name: String, args: Vec<Expr> },
    /// `put` of an expression or a raw string.
    Put {
        value: Option<Box<Expr>>,
        text: Option<String>,
    },
    /// `error "message"`.
    ErrorStmt { message: String },
}

/// One arm of an `if` statement.
#[derive(Clone, Debug)]
pub struct IfClause {
    /// Guard of this arm; `None` for a trailing `else`.
    pub condition: Option<Box<Expr>>,
    pub body: Vec<Stmt>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for IfClause {
    fn eq(&self, other: &Self) -> bool {
        self.condition == other.condition && self.body == other.body
    }
}

impl IfClause {
    pub fn new(condition: Option<Expr>, body: Vec<Stmt>, loc: Location) -> Self {
        Self {
            condition: condition.map(Box::new),
            body,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}

/// One arm of a `switch` statement.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    /// Values this arm matches; empty for a trailing `else`.
    pub matches: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for SwitchCase {
    fn eq(&self, other: &Self) -> bool {
        self.matches == other.matches && self.body == other.body
    }
}

impl SwitchCase {
    pub fn new(matches: Vec<Expr>, body: Vec<Stmt>, loc: Location) -> Self {
        Self {
            matches,
            body,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, loc: Location) -> Self {
        Self {
            kind,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }

    /// `lhs := rhs`.
    pub fn assignment(lhs: Expr, rhs: Expr, loc: Location) -> Self {
        Self::new(
            StmtKind::Assignment {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            loc,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinOp, Expr};

    #[test]
    fn equality_is_structural() {
        let mk = |line| {
            Stmt::assignment(
                Expr::id("x", Location::new(None, line, 1)),
                Expr::binary(
                    BinOp::Add,
                    Expr::id("x", Location::new(None, line, 6)),
                    Expr::number(1, Location::new(None, line, 10)),
                    Location::new(None, line, 6),
                ),
                Location::new(None, line, 1),
            )
        };
        assert_eq!(mk(1), mk(99));
    }
}
