//! Name resolution and layout finalisation.
//!
//! Walks the model with a stack of lexical scopes, filling in
//! `ExprID::value` and `TypeExprID::referent` with owned clones of their
//! referents. The clones share the referent's unique id, which is what the
//! SMT translation keys its symbolic environment on. Along the way, every
//! state variable and record field receives its bit offset: the running
//! sum of the widths preceding it in declaration order.
//!
//! Resolution is idempotent and must be re-run after any pass that mutates
//! declarations (reindexing, field reordering) so the embedded clones and
//! offsets stay in sync.

use crate::decl::{ConstDecl, Decl, VarDecl};
use crate::error::{Error, Result};
use crate::expr::{Expr, ExprKind, Quantifier};
use crate::model::{Function, Model};
use crate::rule::Rule;
use crate::stmt::{Stmt, StmtKind};
use crate::type_expr::{TypeExpr, TypeExprKind};
use crate::NODE_ID_UNASSIGNED;
use num_bigint::BigInt;
use num_traits::Zero;
use std::collections::{HashMap, HashSet};

/// Resolve every name in a model.
pub fn resolve(model: &mut Model) -> Result<()> {
    let mut r = Resolver::new();
    r.functions = model.functions.iter().map(|f| f.name.clone()).collect();

    for d in &mut model.decls {
        r.resolve_decl(d)?;
    }
    for f in &mut model.functions {
        r.resolve_function(f)?;
    }
    for rule in &mut model.rules {
        r.resolve_rule(rule)?;
    }
    Ok(())
}

struct Resolver {
    /// Stack of scopes, innermost last.
    scopes: Vec<HashMap<String, Decl>>,
    /// Names of user-defined functions, for call checking.
    functions: HashSet<String>,
    /// Running bit offset of the next state variable.
    state_offset: BigInt,
}

impl Resolver {
    fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            functions: HashSet::new(),
            state_offset: BigInt::zero(),
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn bind(&mut self, decl: Decl) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(decl.name().to_string(), decl);
        }
    }

    /// Look up a name, searching from innermost scope outward.
    fn lookup(&self, name: &str) -> Option<&Decl> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    /// Resolve a declaration's contents, then bind it in the current scope.
    fn resolve_decl(&mut self, d: &mut Decl) -> Result<()> {
        match d {
            Decl::Const(c) => {
                self.resolve_expr(&mut c.value)?;
                if let Some(ty) = &mut c.ty {
                    self.resolve_type(ty)?;
                }
            }
            Decl::Type(t) => self.resolve_type(&mut t.value)?,
            Decl::Var(v) => {
                self.resolve_type(&mut v.ty)?;
                if v.state_variable {
                    v.offset = self.state_offset.clone();
                    self.state_offset += v.ty.width()?;
                }
            }
            Decl::Alias(a) => self.resolve_expr(&mut a.value)?,
        }
        self.bind(d.clone());
        Ok(())
    }

    fn resolve_type(&mut self, t: &mut TypeExpr) -> Result<()> {
        match &mut t.kind {
            TypeExprKind::Range { min, max } => {
                self.resolve_expr(min)?;
                self.resolve_expr(max)
            }
            TypeExprKind::Scalarset { bound } => self.resolve_expr(bound),
            TypeExprKind::Enum { .. } => {
                self.bind_enum_members(t);
                Ok(())
            }
            TypeExprKind::Record { fields } => {
                let mut offset = BigInt::zero();
                for f in fields {
                    self.resolve_type(&mut f.ty)?;
                    f.offset = offset.clone();
                    offset += f.ty.width()?;
                }
                Ok(())
            }
            TypeExprKind::Array {
                index_type,
                element_type,
            } => {
                self.resolve_type(index_type)?;
                self.resolve_type(element_type)
            }
            TypeExprKind::TypeExprID { name, referent } => {
                match self.lookup(name) {
                    Some(Decl::Type(td)) => {
                        *referent = Some(td.value.clone());
                        Ok(())
                    }
                    Some(_) => Err(Error::TypeResolution {
                        message: format!("{} is not a type", name),
                        loc: t.loc.clone(),
                    }),
                    None => Err(Error::TypeResolution {
                        message: format!("unknown type {}", name),
                        loc: t.loc.clone(),
                    }),
                }
            }
        }
    }

    /// Make each member of an enum usable as a constant of the enum type.
    fn bind_enum_members(&mut self, enum_ty: &TypeExpr) {
        let TypeExprKind::Enum { members } = &enum_ty.kind else {
            return;
        };
        for (i, member) in members.iter().enumerate() {
            let mut c = ConstDecl::new(
                member.clone(),
                Expr::number(BigInt::from(i), enum_ty.loc.clone()),
                enum_ty.loc.clone(),
            );
            c.ty = Some(Box::new(enum_ty.clone()));
            c.id = NODE_ID_UNASSIGNED;
            self.bind(Decl::Const(c));
        }
    }

    fn resolve_expr(&mut self, e: &mut Expr) -> Result<()> {
        match &mut e.kind {
            ExprKind::Number(_) => Ok(()),
            ExprKind::ExprID { name, value } => match self.lookup(name) {
                Some(d) => {
                    *value = Some(Box::new(d.clone()));
                    Ok(())
                }
                None => Err(Error::UnknownSymbol {
                    message: format!("unknown symbol {}", name),
                    loc: e.loc.clone(),
                }),
            },
            ExprKind::Field { record, .. } => self.resolve_expr(record),
            ExprKind::Element { array, index } => {
                self.resolve_expr(array)?;
                self.resolve_expr(index)
            }
            ExprKind::FunctionCall { name, args } => {
                if !self.functions.contains(name.as_str()) {
                    return Err(Error::UnknownSymbol {
                        message: format!("call of unknown function {}", name),
                        loc: e.loc.clone(),
                    });
                }
                for a in args {
                    self.resolve_expr(a)?;
                }
                Ok(())
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)
            }
            ExprKind::Unary { rhs, .. } => self.resolve_expr(rhs),
            ExprKind::Ternary { cond, lhs, rhs } => {
                self.resolve_expr(cond)?;
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)
            }
            ExprKind::Forall { quantifier, expr } | ExprKind::Exists { quantifier, expr } => {
                self.resolve_quantifier(quantifier)?;
                self.push_scope();
                self.bind(Decl::Var((*quantifier.var).clone()));
                let result = self.resolve_expr(expr);
                self.pop_scope();
                result
            }
            ExprKind::IsUndefined(rhs) => self.resolve_expr(rhs),
        }
    }

    fn resolve_quantifier(&mut self, q: &mut Quantifier) -> Result<()> {
        self.resolve_type(&mut q.var.ty)
    }

    fn resolve_stmt(&mut self, s: &mut Stmt) -> Result<()> {
        match &mut s.kind {
            StmtKind::Assignment { lhs, rhs } => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)
            }
            StmtKind::If { clauses } => {
                for c in clauses {
                    if let Some(cond) = &mut c.condition {
                        self.resolve_expr(cond)?;
                    }
                    for s in &mut c.body {
                        self.resolve_stmt(s)?;
                    }
                }
                Ok(())
            }
            StmtKind::Switch { expr, cases } => {
                self.resolve_expr(expr)?;
                for case in cases {
                    for m in &mut case.matches {
                        self.resolve_expr(m)?;
                    }
                    for s in &mut case.body {
                        self.resolve_stmt(s)?;
                    }
                }
                Ok(())
            }
            StmtKind::For { quantifier, body } => {
                self.resolve_quantifier(quantifier)?;
                self.push_scope();
                self.bind(Decl::Var((*quantifier.var).clone()));
                let result = body.iter_mut().try_for_each(|s| self.resolve_stmt(s));
                self.pop_scope();
                result
            }
            StmtKind::While { condition, body } => {
                self.resolve_expr(condition)?;
                for s in body {
                    self.resolve_stmt(s)?;
                }
                Ok(())
            }
            StmtKind::Return { value } => {
                if let Some(e) = value {
                    self.resolve_expr(e)?;
                }
                Ok(())
            }
            StmtKind::ProcedureCall { name, args } => {
                if !self.functions.contains(name.as_str()) {
                    return Err(Error::UnknownSymbol {
                        message: format!("call of unknown procedure {}", name),
                        loc: s.loc.clone(),
                    });
                }
                for a in args {
                    self.resolve_expr(a)?;
                }
                Ok(())
            }
            StmtKind::Put { value, .. } => {
                if let Some(e) = value {
                    self.resolve_expr(e)?;
                }
                Ok(())
            }
            StmtKind::ErrorStmt { .. } => Ok(()),
        }
    }

    fn resolve_function(&mut self, f: &mut Function) -> Result<()> {
        self.push_scope();
        for p in &mut f.parameters {
            self.resolve_type(&mut p.ty)?;
            self.bind(Decl::Var(p.clone()));
        }
        if let Some(rt) = &mut f.return_type {
            self.resolve_type(rt)?;
        }
        let result = (|| {
            for d in &mut f.decls {
                self.resolve_decl(d)?;
            }
            for s in &mut f.body {
                self.resolve_stmt(s)?;
            }
            Ok(())
        })();
        self.pop_scope();
        result
    }

    fn resolve_rule(&mut self, rule: &mut Rule) -> Result<()> {
        self.push_scope();
        let result = (|| {
            match rule {
                Rule::Simple(r) => {
                    for q in &mut r.quantifiers {
                        self.resolve_quantifier(q)?;
                        self.bind(Decl::Var((*q.var).clone()));
                    }
                    if let Some(g) = &mut r.guard {
                        self.resolve_expr(g)?;
                    }
                    for d in &mut r.decls {
                        self.resolve_decl(d)?;
                    }
                    for s in &mut r.body {
                        self.resolve_stmt(s)?;
                    }
                }
                Rule::Start(r) => {
                    for q in &mut r.quantifiers {
                        self.resolve_quantifier(q)?;
                        self.bind(Decl::Var((*q.var).clone()));
                    }
                    for d in &mut r.decls {
                        self.resolve_decl(d)?;
                    }
                    for s in &mut r.body {
                        self.resolve_stmt(s)?;
                    }
                }
                Rule::Invariant(r) => {
                    for q in &mut r.quantifiers {
                        self.resolve_quantifier(q)?;
                        self.bind(Decl::Var((*q.var).clone()));
                    }
                    self.resolve_expr(&mut r.guard)?;
                }
                Rule::Ruleset(r) => {
                    for q in &mut r.quantifiers {
                        self.resolve_quantifier(q)?;
                        self.bind(Decl::Var((*q.var).clone()));
                    }
                    for child in &mut r.rules {
                        self.resolve_rule(child)?;
                    }
                }
            }
            Ok(())
        })();
        self.pop_scope();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::TypeDecl;
    use crate::expr::BinOp;
    use crate::indexer::Indexer;
    use crate::location::Location;
    use crate::rule::SimpleRule;

    fn range(lo: i64, hi: i64) -> TypeExpr {
        TypeExpr::new(
            TypeExprKind::Range {
                min: Box::new(Expr::number(lo, Location::dummy())),
                max: Box::new(Expr::number(hi, Location::dummy())),
            },
            Location::dummy(),
        )
    }

    #[test]
    fn exprid_resolves_to_declaration_id() {
        let mut model = Model::new(
            vec![Decl::Var(VarDecl::state("x", range(0, 7), Location::dummy()))],
            vec![],
            vec![Rule::Simple(SimpleRule::new(
                "bump",
                Some(Expr::binary(
                    BinOp::Lt,
                    Expr::id("x", Location::dummy()),
                    Expr::number(7, Location::dummy()),
                    Location::dummy(),
                )),
                vec![],
                vec![],
                Location::dummy(),
            ))],
            Location::dummy(),
        );
        Indexer::index(&mut model).unwrap();
        resolve(&mut model).unwrap();

        let decl_id = model.decls[0].unique_id();
        let Rule::Simple(r) = &model.rules[0] else {
            unreachable!()
        };
        let guard = r.guard.as_deref().unwrap();
        let ExprKind::Binary { lhs, .. } = &guard.kind else {
            unreachable!()
        };
        let ExprKind::ExprID { value, .. } = &lhs.kind else {
            unreachable!()
        };
        assert_eq!(value.as_deref().unwrap().unique_id(), decl_id);
        assert!(lhs.is_lvalue());
    }

    #[test]
    fn named_types_resolve_through_typedecls() {
        let mut model = Model::new(
            vec![
                Decl::Type(TypeDecl::new("octet", range(0, 255), Location::dummy())),
                Decl::Var(VarDecl::state(
                    "b",
                    TypeExpr::named("octet", Location::dummy()),
                    Location::dummy(),
                )),
            ],
            vec![],
            vec![],
            Location::dummy(),
        );
        Indexer::index(&mut model).unwrap();
        resolve(&mut model).unwrap();

        assert_eq!(model.size_bits().unwrap(), BigInt::from(8));
    }

    #[test]
    fn state_offsets_are_running_sums() {
        let mut model = Model::new(
            vec![
                Decl::Var(VarDecl::state("a", range(0, 7), Location::dummy())), // 3 bits
                Decl::Var(VarDecl::state("b", range(0, 1), Location::dummy())), // 1 bit
                Decl::Var(VarDecl::state("c", range(0, 3), Location::dummy())), // 2 bits
            ],
            vec![],
            vec![],
            Location::dummy(),
        );
        Indexer::index(&mut model).unwrap();
        resolve(&mut model).unwrap();

        let offsets: Vec<BigInt> = model.state_variables().map(|v| v.offset.clone()).collect();
        assert_eq!(
            offsets,
            vec![BigInt::from(0), BigInt::from(3), BigInt::from(4)]
        );
    }

    #[test]
    fn unknown_symbol_reports_use_site() {
        let mut model = Model::new(
            vec![],
            vec![],
            vec![Rule::Invariant(crate::rule::Invariant::new(
                "ghost",
                Expr::id("nonexistent", Location::new(None, 4, 2)),
                Location::dummy(),
            ))],
            Location::dummy(),
        );
        Indexer::index(&mut model).unwrap();
        let err = resolve(&mut model).unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol { .. }));
        assert_eq!(err.loc().line, 4);
    }

    #[test]
    fn enum_members_fold_to_their_ordinal() {
        let enum_ty = TypeExpr::new(
            TypeExprKind::Enum {
                members: vec!["idle".into(), "busy".into()],
            },
            Location::dummy(),
        );
        let mut model = Model::new(
            vec![
                Decl::Type(TypeDecl::new("status", enum_ty, Location::dummy())),
                Decl::Const(ConstDecl::new(
                    "initial",
                    Expr::id("busy", Location::dummy()),
                    Location::dummy(),
                )),
            ],
            vec![],
            vec![],
            Location::dummy(),
        );
        Indexer::index(&mut model).unwrap();
        resolve(&mut model).unwrap();

        let Decl::Const(c) = &model.decls[1] else {
            unreachable!()
        };
        assert_eq!(c.value.constant_fold().unwrap(), BigInt::from(1));
        assert!(c.value.constant());
    }

    #[test]
    fn quantifier_binding_scopes_to_the_body() {
        let mut model = Model::new(
            vec![],
            vec![],
            vec![Rule::Invariant(crate::rule::Invariant::new(
                "all_small",
                Expr::new(
                    ExprKind::Forall {
                        quantifier: Box::new(Quantifier::over_range(
                            "i",
                            Expr::number(0, Location::dummy()),
                            Expr::number(3, Location::dummy()),
                            Location::dummy(),
                        )),
                        expr: Box::new(Expr::binary(
                            BinOp::Leq,
                            Expr::id("i", Location::dummy()),
                            Expr::number(3, Location::dummy()),
                            Location::dummy(),
                        )),
                    },
                    Location::dummy(),
                ),
                Location::dummy(),
            ))],
            Location::dummy(),
        );
        Indexer::index(&mut model).unwrap();
        resolve(&mut model).unwrap();
    }
}
