//! Rules: guarded commands, start states, invariants, and quantified
//! rulesets.

use crate::decl::Decl;
use crate::expr::{Expr, Quantifier};
use crate::location::Location;
use crate::stmt::Stmt;
use crate::{NodeId, NODE_ID_UNASSIGNED};

/// A rule.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    Simple(SimpleRule),
    Start(StartState),
    Invariant(Invariant),
    Ruleset(Ruleset),
}

impl Rule {
    /// The rule's name ("" for anonymous rulesets).
    pub fn name(&self) -> &str {
        match self {
            Rule::Simple(r) => &r.name,
            Rule::Start(r) => &r.name,
            Rule::Invariant(r) => &r.name,
            Rule::Ruleset(_) => "",
        }
    }

    pub fn loc(&self) -> &Location {
        match self {
            Rule::Simple(r) => &r.loc,
            Rule::Start(r) => &r.loc,
            Rule::Invariant(r) => &r.loc,
            Rule::Ruleset(r) => &r.loc,
        }
    }

    /// Expand rulesets into their child rules, hoisting the ruleset's
    /// quantifiers onto each child. Leaf rules flatten to themselves.
    pub fn flatten(&self) -> Vec<Rule> {
        match self {
            Rule::Ruleset(rs) => {
                let mut out = Vec::new();
                for child in &rs.rules {
                    for mut flat in child.flatten() {
                        let qs = match &mut flat {
                            Rule::Simple(r) => &mut r.quantifiers,
                            Rule::Start(r) => &mut r.quantifiers,
                            Rule::Invariant(r) => &mut r.quantifiers,
                            Rule::Ruleset(_) => unreachable!("flatten returned a ruleset"),
                        };
                        qs.splice(0..0, rs.quantifiers.iter().cloned());
                        out.push(flat);
                    }
                }
                out
            }
            _ => vec![self.clone()],
        }
    }
}

/// A guarded command: `rule "name" guard ==> decls begin body end`.
#[derive(Clone, Debug)]
pub struct SimpleRule {
    pub name: String,
    pub quantifiers: Vec<Quantifier>,
    /// Optional guard; an absent guard is always enabled.
    pub guard: Option<Box<Expr>>,
    pub decls: Vec<Decl>,
    pub body: Vec<Stmt>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for SimpleRule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.quantifiers == other.quantifiers
            && self.guard == other.guard
            && self.decls == other.decls
            && self.body == other.body
    }
}

impl SimpleRule {
    pub fn new(
        name: impl Into<String>,
        guard: Option<Expr>,
        decls: Vec<Decl>,
        body: Vec<Stmt>,
        loc: Location,
    ) -> Self {
        Self {
            name: name.into(),
            quantifiers: Vec::new(),
            guard: guard.map(Box::new),
            decls,
            body,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}

/// `startstate "name" decls begin body end`.
#[derive(Clone, Debug)]
pub struct StartState {
    pub name: String,
    pub quantifiers: Vec<Quantifier>,
    pub decls: Vec<Decl>,
    pub body: Vec<Stmt>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for StartState {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.quantifiers == other.quantifiers
            && self.decls == other.decls
            && self.body == other.body
    }
}

impl StartState {
    pub fn new(name: impl Into<String>, decls: Vec<Decl>, body: Vec<Stmt>, loc: Location) -> Self {
        Self {
            name: name.into(),
            quantifiers: Vec::new(),
            decls,
            body,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}

/// `invariant "name" guard`.
#[derive(Clone, Debug)]
pub struct Invariant {
    pub name: String,
    pub quantifiers: Vec<Quantifier>,
    pub guard: Box<Expr>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for Invariant {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.quantifiers == other.quantifiers
            && self.guard == other.guard
    }
}

impl Invariant {
    pub fn new(name: impl Into<String>, guard: Expr, loc: Location) -> Self {
        Self {
            name: name.into(),
            quantifiers: Vec::new(),
            guard: Box::new(guard),
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}

/// `ruleset q do rules end` — a family of rules, one per binding of the
/// quantifiers.
#[derive(Clone, Debug)]
pub struct Ruleset {
    pub quantifiers: Vec<Quantifier>,
    pub rules: Vec<Rule>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for Ruleset {
    fn eq(&self, other: &Self) -> bool {
        self.quantifiers == other.quantifiers && self.rules == other.rules
    }
}

impl Ruleset {
    pub fn new(quantifiers: Vec<Quantifier>, rules: Vec<Rule>, loc: Location) -> Self {
        Self {
            quantifiers,
            rules,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}
