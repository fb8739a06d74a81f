//! Traversal framework.
//!
//! Passes implement [`Visitor`] (read-only) or [`VisitorMut`] (rewriting)
//! and override only the hooks they care about; every hook defaults to the
//! matching `walk_*` function, which recurses into children in declared
//! order by exhaustive pattern match.
//!
//! Traversals do not descend into resolution annotations (`ExprID::value`,
//! `TypeExprID::referent`): those are owned clones of nodes visited
//! elsewhere, refreshed by re-running resolution.

use crate::decl::{Decl, VarDecl};
use crate::error::Result;
use crate::expr::{Expr, ExprKind, Quantifier};
use crate::model::{Function, Model};
use crate::rule::Rule;
use crate::stmt::{IfClause, Stmt, StmtKind, SwitchCase};
use crate::type_expr::{TypeExpr, TypeExprKind};

/// A read-only traversal.
pub trait Visitor {
    fn visit_model(&mut self, n: &Model) -> Result<()> {
        walk_model(self, n)
    }
    fn visit_decl(&mut self, n: &Decl) -> Result<()> {
        walk_decl(self, n)
    }
    fn visit_var_decl(&mut self, n: &VarDecl) -> Result<()> {
        walk_var_decl(self, n)
    }
    fn visit_type_expr(&mut self, n: &TypeExpr) -> Result<()> {
        walk_type_expr(self, n)
    }
    fn visit_expr(&mut self, n: &Expr) -> Result<()> {
        walk_expr(self, n)
    }
    fn visit_stmt(&mut self, n: &Stmt) -> Result<()> {
        walk_stmt(self, n)
    }
    fn visit_if_clause(&mut self, n: &IfClause) -> Result<()> {
        walk_if_clause(self, n)
    }
    fn visit_switch_case(&mut self, n: &SwitchCase) -> Result<()> {
        walk_switch_case(self, n)
    }
    fn visit_rule(&mut self, n: &Rule) -> Result<()> {
        walk_rule(self, n)
    }
    fn visit_function(&mut self, n: &Function) -> Result<()> {
        walk_function(self, n)
    }
    fn visit_quantifier(&mut self, n: &Quantifier) -> Result<()> {
        walk_quantifier(self, n)
    }
}

pub fn walk_model<V: Visitor + ?Sized>(v: &mut V, n: &Model) -> Result<()> {
    for d in &n.decls {
        v.visit_decl(d)?;
    }
    for f in &n.functions {
        v.visit_function(f)?;
    }
    for r in &n.rules {
        v.visit_rule(r)?;
    }
    Ok(())
}

pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, n: &Decl) -> Result<()> {
    match n {
        Decl::Const(d) => {
            v.visit_expr(&d.value)?;
            if let Some(ty) = &d.ty {
                v.visit_type_expr(ty)?;
            }
            Ok(())
        }
        Decl::Type(d) => v.visit_type_expr(&d.value),
        Decl::Var(d) => v.visit_var_decl(d),
        Decl::Alias(d) => v.visit_expr(&d.value),
    }
}

pub fn walk_var_decl<V: Visitor + ?Sized>(v: &mut V, n: &VarDecl) -> Result<()> {
    v.visit_type_expr(&n.ty)
}

pub fn walk_type_expr<V: Visitor + ?Sized>(v: &mut V, n: &TypeExpr) -> Result<()> {
    match &n.kind {
        TypeExprKind::Range { min, max } => {
            v.visit_expr(min)?;
            v.visit_expr(max)
        }
        TypeExprKind::Enum { .. } => Ok(()),
        TypeExprKind::Scalarset { bound } => v.visit_expr(bound),
        TypeExprKind::Record { fields } => {
            for f in fields {
                v.visit_var_decl(f)?;
            }
            Ok(())
        }
        TypeExprKind::Array {
            index_type,
            element_type,
        } => {
            v.visit_type_expr(index_type)?;
            v.visit_type_expr(element_type)
        }
        TypeExprKind::TypeExprID { .. } => Ok(()),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, n: &Expr) -> Result<()> {
    match &n.kind {
        ExprKind::Number(_) => Ok(()),
        ExprKind::ExprID { .. } => Ok(()),
        ExprKind::Field { record, .. } => v.visit_expr(record),
        ExprKind::Element { array, index } => {
            v.visit_expr(array)?;
            v.visit_expr(index)
        }
        ExprKind::FunctionCall { args, .. } => {
            for a in args {
                v.visit_expr(a)?;
            }
            Ok(())
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs)?;
            v.visit_expr(rhs)
        }
        ExprKind::Unary { rhs, .. } => v.visit_expr(rhs),
        ExprKind::Ternary { cond, lhs, rhs } => {
            v.visit_expr(cond)?;
            v.visit_expr(lhs)?;
            v.visit_expr(rhs)
        }
        ExprKind::Forall { quantifier, expr } | ExprKind::Exists { quantifier, expr } => {
            v.visit_quantifier(quantifier)?;
            v.visit_expr(expr)
        }
        ExprKind::IsUndefined(rhs) => v.visit_expr(rhs),
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, n: &Stmt) -> Result<()> {
    match &n.kind {
        StmtKind::Assignment { lhs, rhs } => {
            v.visit_expr(lhs)?;
            v.visit_expr(rhs)
        }
        StmtKind::If { clauses } => {
            for c in clauses {
                v.visit_if_clause(c)?;
            }
            Ok(())
        }
        StmtKind::Switch { expr, cases } => {
            v.visit_expr(expr)?;
            for c in cases {
                v.visit_switch_case(c)?;
            }
            Ok(())
        }
        StmtKind::For { quantifier, body } => {
            v.visit_quantifier(quantifier)?;
            for s in body {
                v.visit_stmt(s)?;
            }
            Ok(())
        }
        StmtKind::While { condition, body } => {
            v.visit_expr(condition)?;
            for s in body {
                v.visit_stmt(s)?;
            }
            Ok(())
        }
        StmtKind::Return { value } => {
            if let Some(e) = value {
                v.visit_expr(e)?;
            }
            Ok(())
        }
        StmtKind::ProcedureCall { args, .. } => {
            for a in args {
                v.visit_expr(a)?;
            }
            Ok(())
        }
        StmtKind::Put { value, .. } => {
            if let Some(e) = value {
                v.visit_expr(e)?;
            }
            Ok(())
        }
        StmtKind::ErrorStmt { .. } => Ok(()),
    }
}

pub fn walk_if_clause<V: Visitor + ?Sized>(v: &mut V, n: &IfClause) -> Result<()> {
    if let Some(c) = &n.condition {
        v.visit_expr(c)?;
    }
    for s in &n.body {
        v.visit_stmt(s)?;
    }
    Ok(())
}

pub fn walk_switch_case<V: Visitor + ?Sized>(v: &mut V, n: &SwitchCase) -> Result<()> {
    for m in &n.matches {
        v.visit_expr(m)?;
    }
    for s in &n.body {
        v.visit_stmt(s)?;
    }
    Ok(())
}

pub fn walk_rule<V: Visitor + ?Sized>(v: &mut V, n: &Rule) -> Result<()> {
    match n {
        Rule::Simple(r) => {
            for q in &r.quantifiers {
                v.visit_quantifier(q)?;
            }
            if let Some(g) = &r.guard {
                v.visit_expr(g)?;
            }
            for d in &r.decls {
                v.visit_decl(d)?;
            }
            for s in &r.body {
                v.visit_stmt(s)?;
            }
            Ok(())
        }
        Rule::Start(r) => {
            for q in &r.quantifiers {
                v.visit_quantifier(q)?;
            }
            for d in &r.decls {
                v.visit_decl(d)?;
            }
            for s in &r.body {
                v.visit_stmt(s)?;
            }
            Ok(())
        }
        Rule::Invariant(r) => {
            for q in &r.quantifiers {
                v.visit_quantifier(q)?;
            }
            v.visit_expr(&r.guard)
        }
        Rule::Ruleset(r) => {
            for q in &r.quantifiers {
                v.visit_quantifier(q)?;
            }
            for child in &r.rules {
                v.visit_rule(child)?;
            }
            Ok(())
        }
    }
}

pub fn walk_function<V: Visitor + ?Sized>(v: &mut V, n: &Function) -> Result<()> {
    for p in &n.parameters {
        v.visit_var_decl(p)?;
    }
    if let Some(rt) = &n.return_type {
        v.visit_type_expr(rt)?;
    }
    for d in &n.decls {
        v.visit_decl(d)?;
    }
    for s in &n.body {
        v.visit_stmt(s)?;
    }
    Ok(())
}

pub fn walk_quantifier<V: Visitor + ?Sized>(v: &mut V, n: &Quantifier) -> Result<()> {
    v.visit_var_decl(&n.var)
}

/// A rewriting traversal.
///
/// A mutating pass must re-establish the structural invariants of the AST
/// before returning successfully.
pub trait VisitorMut {
    fn visit_model(&mut self, n: &mut Model) -> Result<()> {
        walk_model_mut(self, n)
    }
    fn visit_decl(&mut self, n: &mut Decl) -> Result<()> {
        walk_decl_mut(self, n)
    }
    fn visit_var_decl(&mut self, n: &mut VarDecl) -> Result<()> {
        walk_var_decl_mut(self, n)
    }
    fn visit_type_expr(&mut self, n: &mut TypeExpr) -> Result<()> {
        walk_type_expr_mut(self, n)
    }
    fn visit_expr(&mut self, n: &mut Expr) -> Result<()> {
        walk_expr_mut(self, n)
    }
    fn visit_stmt(&mut self, n: &mut Stmt) -> Result<()> {
        walk_stmt_mut(self, n)
    }
    fn visit_if_clause(&mut self, n: &mut IfClause) -> Result<()> {
        walk_if_clause_mut(self, n)
    }
    fn visit_switch_case(&mut self, n: &mut SwitchCase) -> Result<()> {
        walk_switch_case_mut(self, n)
    }
    fn visit_rule(&mut self, n: &mut Rule) -> Result<()> {
        walk_rule_mut(self, n)
    }
    fn visit_function(&mut self, n: &mut Function) -> Result<()> {
        walk_function_mut(self, n)
    }
    fn visit_quantifier(&mut self, n: &mut Quantifier) -> Result<()> {
        walk_quantifier_mut(self, n)
    }
}

pub fn walk_model_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Model) -> Result<()> {
    for d in &mut n.decls {
        v.visit_decl(d)?;
    }
    for f in &mut n.functions {
        v.visit_function(f)?;
    }
    for r in &mut n.rules {
        v.visit_rule(r)?;
    }
    Ok(())
}

pub fn walk_decl_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Decl) -> Result<()> {
    match n {
        Decl::Const(d) => {
            v.visit_expr(&mut d.value)?;
            if let Some(ty) = &mut d.ty {
                v.visit_type_expr(ty)?;
            }
            Ok(())
        }
        Decl::Type(d) => v.visit_type_expr(&mut d.value),
        Decl::Var(d) => v.visit_var_decl(d),
        Decl::Alias(d) => v.visit_expr(&mut d.value),
    }
}

pub fn walk_var_decl_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut VarDecl) -> Result<()> {
    v.visit_type_expr(&mut n.ty)
}

pub fn walk_type_expr_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut TypeExpr) -> Result<()> {
    match &mut n.kind {
        TypeExprKind::Range { min, max } => {
            v.visit_expr(min)?;
            v.visit_expr(max)
        }
        TypeExprKind::Enum { .. } => Ok(()),
        TypeExprKind::Scalarset { bound } => v.visit_expr(bound),
        TypeExprKind::Record { fields } => {
            for f in fields {
                v.visit_var_decl(f)?;
            }
            Ok(())
        }
        TypeExprKind::Array {
            index_type,
            element_type,
        } => {
            v.visit_type_expr(index_type)?;
            v.visit_type_expr(element_type)
        }
        TypeExprKind::TypeExprID { .. } => Ok(()),
    }
}

pub fn walk_expr_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Expr) -> Result<()> {
    match &mut n.kind {
        ExprKind::Number(_) => Ok(()),
        ExprKind::ExprID { .. } => Ok(()),
        ExprKind::Field { record, .. } => v.visit_expr(record),
        ExprKind::Element { array, index } => {
            v.visit_expr(array)?;
            v.visit_expr(index)
        }
        ExprKind::FunctionCall { args, .. } => {
            for a in args {
                v.visit_expr(a)?;
            }
            Ok(())
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs)?;
            v.visit_expr(rhs)
        }
        ExprKind::Unary { rhs, .. } => v.visit_expr(rhs),
        ExprKind::Ternary { cond, lhs, rhs } => {
            v.visit_expr(cond)?;
            v.visit_expr(lhs)?;
            v.visit_expr(rhs)
        }
        ExprKind::Forall { quantifier, expr } | ExprKind::Exists { quantifier, expr } => {
            v.visit_quantifier(quantifier)?;
            v.visit_expr(expr)
        }
        ExprKind::IsUndefined(rhs) => v.visit_expr(rhs),
    }
}

pub fn walk_stmt_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Stmt) -> Result<()> {
    match &mut n.kind {
        StmtKind::Assignment { lhs, rhs } => {
            v.visit_expr(lhs)?;
            v.visit_expr(rhs)
        }
        StmtKind::If { clauses } => {
            for c in clauses {
                v.visit_if_clause(c)?;
            }
            Ok(())
        }
        StmtKind::Switch { expr, cases } => {
            v.visit_expr(expr)?;
            for c in cases {
                v.visit_switch_case(c)?;
            }
            Ok(())
        }
        StmtKind::For { quantifier, body } => {
            v.visit_quantifier(quantifier)?;
            for s in body {
                v.visit_stmt(s)?;
            }
            Ok(())
        }
        StmtKind::While { condition, body } => {
            v.visit_expr(condition)?;
            for s in body {
                v.visit_stmt(s)?;
            }
            Ok(())
        }
        StmtKind::Return { value } => {
            if let Some(e) = value {
                v.visit_expr(e)?;
            }
            Ok(())
        }
        StmtKind::ProcedureCall { args, .. } => {
            for a in args {
                v.visit_expr(a)?;
            }
            Ok(())
        }
        StmtKind::Put { value, .. } => {
            if let Some(e) = value {
                v.visit_expr(e)?;
            }
            Ok(())
        }
        StmtKind::ErrorStmt { .. } => Ok(()),
    }
}

pub fn walk_if_clause_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut IfClause) -> Result<()> {
    if let Some(c) = &mut n.condition {
        v.visit_expr(c)?;
    }
    for s in &mut n.body {
        v.visit_stmt(s)?;
    }
    Ok(())
}

pub fn walk_switch_case_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut SwitchCase) -> Result<()> {
    for m in &mut n.matches {
        v.visit_expr(m)?;
    }
    for s in &mut n.body {
        v.visit_stmt(s)?;
    }
    Ok(())
}

pub fn walk_rule_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Rule) -> Result<()> {
    match n {
        Rule::Simple(r) => {
            for q in &mut r.quantifiers {
                v.visit_quantifier(q)?;
            }
            if let Some(g) = &mut r.guard {
                v.visit_expr(g)?;
            }
            for d in &mut r.decls {
                v.visit_decl(d)?;
            }
            for s in &mut r.body {
                v.visit_stmt(s)?;
            }
            Ok(())
        }
        Rule::Start(r) => {
            for q in &mut r.quantifiers {
                v.visit_quantifier(q)?;
            }
            for d in &mut r.decls {
                v.visit_decl(d)?;
            }
            for s in &mut r.body {
                v.visit_stmt(s)?;
            }
            Ok(())
        }
        Rule::Invariant(r) => {
            for q in &mut r.quantifiers {
                v.visit_quantifier(q)?;
            }
            v.visit_expr(&mut r.guard)
        }
        Rule::Ruleset(r) => {
            for q in &mut r.quantifiers {
                v.visit_quantifier(q)?;
            }
            for child in &mut r.rules {
                v.visit_rule(child)?;
            }
            Ok(())
        }
    }
}

pub fn walk_function_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Function) -> Result<()> {
    for p in &mut n.parameters {
        v.visit_var_decl(p)?;
    }
    if let Some(rt) = &mut n.return_type {
        v.visit_type_expr(rt)?;
    }
    for d in &mut n.decls {
        v.visit_decl(d)?;
    }
    for s in &mut n.body {
        v.visit_stmt(s)?;
    }
    Ok(())
}

pub fn walk_quantifier_mut<V: VisitorMut + ?Sized>(v: &mut V, n: &mut Quantifier) -> Result<()> {
    v.visit_var_decl(&mut n.var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinOp;
    use crate::location::Location;

    /// Counts expression nodes without overriding anything else.
    struct ExprCounter {
        seen: usize,
    }

    impl Visitor for ExprCounter {
        fn visit_expr(&mut self, n: &Expr) -> Result<()> {
            self.seen += 1;
            walk_expr(self, n)
        }
    }

    #[test]
    fn default_hooks_reach_every_expression() {
        let e = Expr::binary(
            BinOp::Add,
            Expr::number(1, Location::dummy()),
            Expr::binary(
                BinOp::Mul,
                Expr::number(2, Location::dummy()),
                Expr::number(3, Location::dummy()),
                Location::dummy(),
            ),
            Location::dummy(),
        );
        let stmt = Stmt::assignment(Expr::id("x", Location::dummy()), e, Location::dummy());

        let mut counter = ExprCounter { seen: 0 };
        counter.visit_stmt(&stmt).unwrap();
        // x, 1+2*3, 1, 2*3, 2, 3
        assert_eq!(counter.seen, 6);
    }
}
