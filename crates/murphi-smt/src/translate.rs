//! Translation of expressions and assignments to SMT-LIB v2 text.

use crate::context::SymContext;
use crate::SmtConfig;
use murphi_syntax::expr::{BinOp, UnaryOp};
use murphi_syntax::type_expr::TypeExprKind;
use murphi_syntax::{Error, Expr, ExprKind, Result, Stmt, StmtKind, TypeExpr};

/// Translate an expression, appending to `out`.
pub fn to_smt_expr(
    out: &mut String,
    e: &Expr,
    ctx: &mut SymContext,
    cfg: &SmtConfig,
) -> Result<()> {
    Translator { out, ctx, cfg }.expr(e)
}

/// Translate an expression to a fresh string.
pub fn expr_to_smt(e: &Expr, ctx: &mut SymContext, cfg: &SmtConfig) -> Result<String> {
    let mut out = String::new();
    to_smt_expr(&mut out, e, ctx, cfg)?;
    Ok(out)
}

/// Translate a statement, appending to `out`. Only assignments have an
/// SMT rendering.
pub fn to_smt_stmt(
    out: &mut String,
    s: &Stmt,
    ctx: &mut SymContext,
    cfg: &SmtConfig,
) -> Result<()> {
    Translator { out, ctx, cfg }.stmt(s)
}

/// Translate an assignment statement to a fresh string.
pub fn assignment_to_smt(s: &Stmt, ctx: &mut SymContext, cfg: &SmtConfig) -> Result<String> {
    let mut out = String::new();
    to_smt_stmt(&mut out, s, ctx, cfg)?;
    Ok(out)
}

struct Translator<'a> {
    out: &'a mut String,
    ctx: &'a mut SymContext,
    cfg: &'a SmtConfig,
}

impl Translator<'_> {
    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn expr(&mut self, e: &Expr) -> Result<()> {
        match &e.kind {
            ExprKind::Number(v) => {
                let lit = self.cfg.numeric_literal(v);
                self.push(&lit);
                Ok(())
            }

            ExprKind::ExprID { name, value } => {
                let decl = value.as_deref().ok_or_else(|| Error::UnknownSymbol {
                    message: format!("unresolved identifier {}", name),
                    loc: e.loc.clone(),
                })?;
                let symbol = self.ctx.lookup_symbol(decl.unique_id(), &e.loc)?;
                self.push(&symbol);
                Ok(())
            }

            ExprKind::Element { array, index } => {
                self.push("(select ");
                self.expr(array)?;
                self.push(" ");
                self.expr(index)?;
                self.push(")");
                Ok(())
            }

            ExprKind::Field { record, field } => {
                self.push(&format!("(rec_{} ", field));
                self.expr(record)?;
                self.push(")");
                Ok(())
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let op_str: String = match op {
                    BinOp::Add => self.cfg.add().to_string(),
                    BinOp::Sub => self.cfg.sub().to_string(),
                    BinOp::Mul => self.cfg.mul().to_string(),
                    BinOp::Div => self.cfg.div().to_string(),
                    BinOp::Mod => self.cfg.modulo().to_string(),
                    BinOp::Band => self.cfg.band(&e.loc)?.to_string(),
                    BinOp::Bor => self.cfg.bor(&e.loc)?.to_string(),
                    BinOp::Bxor => self.cfg.bxor(&e.loc)?.to_string(),
                    BinOp::Lsh => self.cfg.lsh(&e.loc)?.to_string(),
                    BinOp::Rsh => self.cfg.rsh(&e.loc)?.to_string(),
                    BinOp::Lt => self.cfg.lt().to_string(),
                    BinOp::Leq => self.cfg.leq().to_string(),
                    BinOp::Gt => self.cfg.gt().to_string(),
                    BinOp::Geq => self.cfg.geq().to_string(),
                    // theory-independent operators
                    BinOp::Eq => "=".to_string(),
                    BinOp::And => "and".to_string(),
                    BinOp::Or => "or".to_string(),
                    BinOp::Implication => "=>".to_string(),
                    BinOp::Neq => {
                        // no primitive disequality; negate an equality
                        self.push("(not (= ");
                        self.expr(lhs)?;
                        self.push(" ");
                        self.expr(rhs)?;
                        self.push("))");
                        return Ok(());
                    }
                };
                self.push(&format!("({} ", op_str));
                self.expr(lhs)?;
                self.push(" ");
                self.expr(rhs)?;
                self.push(")");
                Ok(())
            }

            ExprKind::Unary { op, rhs } => {
                let op_str = match op {
                    UnaryOp::Not => "not",
                    UnaryOp::Negative => self.cfg.neg(),
                    UnaryOp::Bnot => self.cfg.bnot(&e.loc)?,
                };
                self.push(&format!("({} ", op_str));
                self.expr(rhs)?;
                self.push(")");
                Ok(())
            }

            ExprKind::Ternary { cond, lhs, rhs } => {
                self.push("(ite ");
                self.expr(cond)?;
                self.push(" ");
                self.expr(lhs)?;
                self.push(" ");
                self.expr(rhs)?;
                self.push(")");
                Ok(())
            }

            ExprKind::IsUndefined(_) => Err(Error::UnsupportedConstruct {
                message: "translation of isundefined expressions is not supported".to_string(),
                loc: e.loc.clone(),
            }),

            ExprKind::Forall { .. } | ExprKind::Exists { .. } => {
                Err(Error::UnsupportedConstruct {
                    message: "translation of quantified expressions is not supported".to_string(),
                    loc: e.loc.clone(),
                })
            }

            ExprKind::FunctionCall { name, .. } => Err(Error::UnsupportedConstruct {
                message: format!("translation of calls ({}) is not supported", name),
                loc: e.loc.clone(),
            }),
        }
    }

    fn stmt(&mut self, s: &Stmt) -> Result<()> {
        match &s.kind {
            StmtKind::Assignment { lhs, rhs } => self.assignment(lhs, rhs),
            _ => Err(Error::UnsupportedConstruct {
                message: "only assignments have an SMT translation".to_string(),
                loc: s.loc.clone(),
            }),
        }
    }

    fn assignment(&mut self, lhs: &Expr, rhs: &Expr) -> Result<()> {
        // Translate the rhs first: it may read the entity being assigned,
        // and those reads must see the pre-assignment symbol.
        let rhs_smt = expr_to_smt(rhs, self.ctx, self.cfg)?;

        let update = self.update_value(lhs, rhs_smt)?;

        // rebind the root under a fresh name; later reads resolve to it
        let root = get_root(lhs)?;
        let ExprKind::ExprID { name, value } = &root.kind else {
            unreachable!("get_root returned a non-identifier");
        };
        let decl = value.as_deref().ok_or_else(|| Error::UnknownSymbol {
            message: format!("unresolved identifier {}", name),
            loc: root.loc.clone(),
        })?;
        let fresh = self.ctx.register_symbol(decl.unique_id());

        self.push(&format!("(assert (= {} {}))", fresh, update));
        Ok(())
    }

    /// Build the expression describing the post-assignment value of the
    /// root of `lvalue`, given that the location `lvalue` designates takes
    /// the value rendered by `new_value`.
    ///
    /// Peeling one access layer per step, an element access wraps the new
    /// value in a `store` of the pre-assignment array, and a field access
    /// wraps it in the record constructor applied to projections of the
    /// pre-assignment record. The recursion bottoms out at the identifier
    /// at the base of the chain.
    fn update_value(&mut self, lvalue: &Expr, new_value: String) -> Result<String> {
        match &lvalue.kind {
            ExprKind::ExprID { .. } => Ok(new_value),

            ExprKind::Element { array, index } => {
                let array_smt = expr_to_smt(array, self.ctx, self.cfg)?;
                let index_smt = expr_to_smt(index, self.ctx, self.cfg)?;
                let stored = format!("(store {} {} {})", array_smt, index_smt, new_value);
                self.update_value(array, stored)
            }

            ExprKind::Field { record, field } => {
                let built = self.field_update(record, field, &new_value)?;
                self.update_value(record, built)
            }

            _ => Err(Error::MalformedLvalue {
                message: "expression in lvalue is not an identifier, record field, or array \
                          element"
                    .to_string(),
                loc: lvalue.loc.clone(),
            }),
        }
    }

    /// Build the record-update expression for an assignment through a
    /// field: the record constructor applied to projections of the
    /// pre-assignment value, with the assigned field replaced.
    fn field_update(&mut self, record: &Expr, field: &str, rhs_smt: &str) -> Result<String> {
        let fields = record_fields(record)?;
        let record_smt = expr_to_smt(record, self.ctx, self.cfg)?;

        let mut update = String::from("(mk_rec");
        for f in &fields {
            update.push('_');
            update.push_str(f);
        }
        for f in &fields {
            update.push(' ');
            if f == field {
                update.push_str(rhs_smt);
            } else {
                update.push_str(&format!("(rec_{} {})", f, record_smt));
            }
        }
        update.push(')');
        Ok(update)
    }
}

/// The field names of the record type of `record`, in declaration order.
fn record_fields(record: &Expr) -> Result<Vec<String>> {
    let ty: TypeExpr = record.type_of().ok_or_else(|| Error::TypeResolution {
        message: "cannot determine the record type of an assignment target".to_string(),
        loc: record.loc.clone(),
    })?;
    let resolved = ty.resolve()?;
    match &resolved.kind {
        TypeExprKind::Record { fields } => Ok(fields.iter().map(|f| f.name.clone()).collect()),
        _ => Err(Error::TypeResolution {
            message: "field access on a non-record type".to_string(),
            loc: record.loc.clone(),
        }),
    }
}

/// Retrieve the originating identifier of an lvalue.
fn get_root(lvalue: &Expr) -> Result<&Expr> {
    match &lvalue.kind {
        ExprKind::ExprID { .. } => Ok(lvalue),
        ExprKind::Field { record, .. } => get_root(record),
        ExprKind::Element { array, .. } => get_root(array),
        _ => Err(Error::MalformedLvalue {
            message: "expression in lvalue is not an identifier, record field, or array \
                      element"
                .to_string(),
            loc: lvalue.loc.clone(),
        }),
    }
}
