//! Assignment of unique ids to AST nodes.

use crate::decl::{Decl, VarDecl};
use crate::error::Result;
use crate::expr::{Expr, Quantifier};
use crate::model::{Function, Model};
use crate::rule::Rule;
use crate::stmt::{IfClause, Stmt, SwitchCase};
use crate::traverse::{self, VisitorMut};
use crate::type_expr::TypeExpr;
use crate::NodeId;

/// Assigns every node a `NodeId` unique within this indexer, in traversal
/// order.
///
/// Ids are used as keys into symbolic environments; they carry no other
/// meaning. Re-running an indexer over a mutated model re-establishes
/// uniqueness, after which resolution must be re-run to refresh the ids
/// embedded in `ExprID`/`TypeExprID` annotations.
#[derive(Default)]
pub struct Indexer {
    next: NodeId,
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an entire model.
    pub fn index(model: &mut Model) -> Result<()> {
        let mut indexer = Indexer::new();
        indexer.visit_model(model)
    }

    fn assign(&mut self, id: &mut NodeId) {
        *id = self.next;
        self.next += 1;
    }
}

impl VisitorMut for Indexer {
    fn visit_model(&mut self, n: &mut Model) -> Result<()> {
        self.assign(&mut n.id);
        traverse::walk_model_mut(self, n)
    }

    fn visit_decl(&mut self, n: &mut Decl) -> Result<()> {
        match n {
            Decl::Const(d) => self.assign(&mut d.id),
            Decl::Type(d) => self.assign(&mut d.id),
            // VarDecls are assigned in visit_var_decl
            Decl::Var(_) => {}
            Decl::Alias(d) => self.assign(&mut d.id),
        }
        traverse::walk_decl_mut(self, n)
    }

    fn visit_var_decl(&mut self, n: &mut VarDecl) -> Result<()> {
        self.assign(&mut n.id);
        traverse::walk_var_decl_mut(self, n)
    }

    fn visit_type_expr(&mut self, n: &mut TypeExpr) -> Result<()> {
        self.assign(&mut n.id);
        traverse::walk_type_expr_mut(self, n)
    }

    fn visit_expr(&mut self, n: &mut Expr) -> Result<()> {
        self.assign(&mut n.id);
        traverse::walk_expr_mut(self, n)
    }

    fn visit_stmt(&mut self, n: &mut Stmt) -> Result<()> {
        self.assign(&mut n.id);
        traverse::walk_stmt_mut(self, n)
    }

    fn visit_if_clause(&mut self, n: &mut IfClause) -> Result<()> {
        self.assign(&mut n.id);
        traverse::walk_if_clause_mut(self, n)
    }

    fn visit_switch_case(&mut self, n: &mut SwitchCase) -> Result<()> {
        self.assign(&mut n.id);
        traverse::walk_switch_case_mut(self, n)
    }

    fn visit_rule(&mut self, n: &mut Rule) -> Result<()> {
        match n {
            Rule::Simple(r) => self.assign(&mut r.id),
            Rule::Start(r) => self.assign(&mut r.id),
            Rule::Invariant(r) => self.assign(&mut r.id),
            Rule::Ruleset(r) => self.assign(&mut r.id),
        }
        traverse::walk_rule_mut(self, n)
    }

    fn visit_function(&mut self, n: &mut Function) -> Result<()> {
        self.assign(&mut n.id);
        traverse::walk_function_mut(self, n)
    }

    fn visit_quantifier(&mut self, n: &mut Quantifier) -> Result<()> {
        self.assign(&mut n.id);
        traverse::walk_quantifier_mut(self, n)
    }
}
