//! Semantic validation.
//!
//! Checks the structural invariants that later passes rely on: constants
//! are constant, ranges have constant bounds, array indices are simple
//! types, assignment targets are writable lvalues, and every name has been
//! resolved.

use crate::decl::Decl;
use crate::error::{Error, Result};
use crate::expr::{Expr, ExprKind};
use crate::model::Model;
use crate::stmt::{Stmt, StmtKind};
use crate::traverse::{self, Visitor};
use crate::type_expr::{TypeExpr, TypeExprKind};
use num_traits::Signed;

/// Validate a resolved model.
pub fn validate(model: &Model) -> Result<()> {
    let mut v = Validator;
    v.visit_model(model)
}

struct Validator;

impl Visitor for Validator {
    fn visit_decl(&mut self, n: &Decl) -> Result<()> {
        if let Decl::Const(c) = n {
            if !c.value.constant() {
                return Err(Error::NotConstant {
                    message: "const definition is not a constant".to_string(),
                    loc: c.value.loc.clone(),
                });
            }
        }
        traverse::walk_decl(self, n)
    }

    fn visit_type_expr(&mut self, n: &TypeExpr) -> Result<()> {
        match &n.kind {
            TypeExprKind::Range { min, max } => {
                min.constant_fold()?;
                max.constant_fold()?;
            }
            TypeExprKind::Scalarset { bound } => {
                let b = bound.constant_fold()?;
                if !b.is_positive() {
                    return Err(Error::NotConstant {
                        message: "scalarset bound must be a positive constant".to_string(),
                        loc: bound.loc.clone(),
                    });
                }
            }
            TypeExprKind::Array { index_type, .. } => {
                if !index_type.resolve()?.is_simple() {
                    return Err(Error::TypeResolution {
                        message: "array index type is not a simple type".to_string(),
                        loc: index_type.loc.clone(),
                    });
                }
            }
            TypeExprKind::TypeExprID { name, referent } => {
                if referent.is_none() {
                    return Err(Error::TypeResolution {
                        message: format!("unresolved type {}", name),
                        loc: n.loc.clone(),
                    });
                }
            }
            TypeExprKind::Enum { .. } | TypeExprKind::Record { .. } => {}
        }
        traverse::walk_type_expr(self, n)
    }

    fn visit_expr(&mut self, n: &Expr) -> Result<()> {
        if let ExprKind::ExprID { name, value } = &n.kind {
            if value.is_none() {
                return Err(Error::UnknownSymbol {
                    message: format!("unresolved identifier {}", name),
                    loc: n.loc.clone(),
                });
            }
        }
        traverse::walk_expr(self, n)
    }

    fn visit_stmt(&mut self, n: &Stmt) -> Result<()> {
        if let StmtKind::Assignment { lhs, .. } = &n.kind {
            if !lhs.is_lvalue() {
                return Err(Error::MalformedLvalue {
                    message: "assignment target is not an lvalue".to_string(),
                    loc: lhs.loc.clone(),
                });
            }
            if lhs.is_readonly() {
                return Err(Error::MalformedLvalue {
                    message: "assignment to a read-only expression".to_string(),
                    loc: lhs.loc.clone(),
                });
            }
        }
        traverse::walk_stmt(self, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{ConstDecl, VarDecl};
    use crate::indexer::Indexer;
    use crate::location::Location;
    use crate::resolve::resolve;
    use crate::rule::{Rule, SimpleRule};

    fn range(lo: i64, hi: i64) -> TypeExpr {
        TypeExpr::new(
            TypeExprKind::Range {
                min: Box::new(Expr::number(lo, Location::dummy())),
                max: Box::new(Expr::number(hi, Location::dummy())),
            },
            Location::dummy(),
        )
    }

    fn prepare(mut model: Model) -> (Model, Result<()>) {
        Indexer::index(&mut model).unwrap();
        let r = resolve(&mut model);
        if let Err(e) = r {
            return (model, Err(e));
        }
        let v = validate(&model);
        (model, v)
    }

    #[test]
    fn accepts_a_well_formed_model() {
        let model = Model::new(
            vec![
                Decl::Const(ConstDecl::new(
                    "N",
                    Expr::number(3, Location::dummy()),
                    Location::dummy(),
                )),
                Decl::Var(VarDecl::state("x", range(0, 3), Location::dummy())),
            ],
            vec![],
            vec![],
            Location::dummy(),
        );
        let (_, result) = prepare(model);
        result.unwrap();
    }

    #[test]
    fn rejects_nonconstant_const() {
        let model = Model::new(
            vec![
                Decl::Var(VarDecl::state("x", range(0, 3), Location::dummy())),
                Decl::Const(ConstDecl::new(
                    "bad",
                    Expr::id("x", Location::dummy()),
                    Location::dummy(),
                )),
            ],
            vec![],
            vec![],
            Location::dummy(),
        );
        let (_, result) = prepare(model);
        assert!(matches!(result, Err(Error::NotConstant { .. })));
    }

    #[test]
    fn rejects_assignment_to_constant() {
        let model = Model::new(
            vec![Decl::Const(ConstDecl::new(
                "N",
                Expr::number(3, Location::dummy()),
                Location::dummy(),
            ))],
            vec![],
            vec![Rule::Simple(SimpleRule::new(
                "clobber",
                None,
                vec![],
                vec![Stmt::assignment(
                    Expr::id("N", Location::dummy()),
                    Expr::number(4, Location::dummy()),
                    Location::dummy(),
                )],
                Location::dummy(),
            ))],
            Location::dummy(),
        );
        let (_, result) = prepare(model);
        assert!(matches!(result, Err(Error::MalformedLvalue { .. })));
    }

    #[test]
    fn rejects_array_indexed_by_record() {
        let record = TypeExpr::new(
            TypeExprKind::Record {
                fields: vec![VarDecl::new("f", range(0, 1), Location::dummy())],
            },
            Location::dummy(),
        );
        let arr = TypeExpr::new(
            TypeExprKind::Array {
                index_type: Box::new(record),
                element_type: Box::new(range(0, 1)),
            },
            Location::dummy(),
        );
        let model = Model::new(
            vec![Decl::Var(VarDecl::state("a", arr, Location::dummy()))],
            vec![],
            vec![],
            Location::dummy(),
        );
        let (_, result) = prepare(model);
        assert!(matches!(result, Err(Error::TypeResolution { .. })));
    }
}
