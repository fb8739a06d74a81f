//! Expression trees.

use crate::decl::{Decl, VarDecl};
use crate::error::{Error, Result};
use crate::location::Location;
use crate::type_expr::{TypeExpr, TypeExprKind};
use crate::{NodeId, NODE_ID_UNASSIGNED};
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// An expression.
///
/// Equality is structural: locations and unique ids are ignored.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind of expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Numeric literal.
    Number(BigInt),
    /// Identifier reference. `value` is filled in by resolution with an
    /// owned clone of the referent declaration; the clone shares the
    /// referent's unique id.
    ExprID {
        name: String,
        value: Option<Box<Decl>>,
    },
    /// Record field access `record.field`.
    Field { record: Box<Expr>, field: String },
    /// Array element access `array[index]`.
    Element { array: Box<Expr>, index: Box<Expr> },
    /// Call of a user-defined function.
    FunctionCall { name: String, args: Vec<Expr> },
    /// Binary operation.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Unary operation.
    Unary { op: UnaryOp, rhs: Box<Expr> },
    /// `cond ? lhs : rhs`.
    Ternary {
        cond: Box<Expr>,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `forall q do expr`.
    Forall {
        quantifier: Box<Quantifier>,
        expr: Box<Expr>,
    },
    /// `exists q do expr`.
    Exists {
        quantifier: Box<Quantifier>,
        expr: Box<Expr>,
    },
    /// `isundefined(rhs)`.
    IsUndefined(Box<Expr>),
}

/// Binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Bit-vector
    Band,
    Bor,
    Bxor,
    Lsh,
    Rsh,
    // Relational
    Lt,
    Leq,
    Gt,
    Geq,
    Eq,
    Neq,
    // Logical
    And,
    Or,
    Implication,
}

impl BinOp {
    /// Whether this operator yields a boolean.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            BinOp::Lt
                | BinOp::Leq
                | BinOp::Gt
                | BinOp::Geq
                | BinOp::Eq
                | BinOp::Neq
                | BinOp::And
                | BinOp::Or
                | BinOp::Implication
        )
    }
}

/// Unary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negative,
    Bnot,
}

/// A quantified binding, `name: type` or `name := from to to`, used by
/// `forall`/`exists` expressions, `for` statements, and rulesets.
///
/// The bound variable is materialised as a `VarDecl` so that identifier
/// references inside the quantified body resolve to it like any other
/// declaration.
#[derive(Clone, Debug)]
pub struct Quantifier {
    pub var: Box<VarDecl>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for Quantifier {
    fn eq(&self, other: &Self) -> bool {
        self.var == other.var
    }
}

impl Quantifier {
    /// Quantify over all values of a type.
    pub fn over_type(name: impl Into<String>, ty: TypeExpr, loc: Location) -> Self {
        Self {
            var: Box::new(VarDecl::new(name, ty, loc.clone())),
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }

    /// Quantify over an inclusive integer range.
    pub fn over_range(name: impl Into<String>, from: Expr, to: Expr, loc: Location) -> Self {
        let ty = TypeExpr::new(
            TypeExprKind::Range {
                min: Box::new(from),
                max: Box::new(to),
            },
            loc.clone(),
        );
        Self::over_type(name, ty, loc)
    }
}

impl Expr {
    pub fn new(kind: ExprKind, loc: Location) -> Self {
        Self {
            kind,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }

    /// A numeric literal.
    pub fn number(value: impl Into<BigInt>, loc: Location) -> Self {
        Self::new(ExprKind::Number(value.into()), loc)
    }

    /// An unresolved identifier reference.
    pub fn id(name: impl Into<String>, loc: Location) -> Self {
        Self::new(
            ExprKind::ExprID {
                name: name.into(),
                value: None,
            },
            loc,
        )
    }

    /// A binary operation.
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr, loc: Location) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            loc,
        )
    }

    /// A unary operation.
    pub fn unary(op: UnaryOp, rhs: Expr, loc: Location) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                rhs: Box::new(rhs),
            },
            loc,
        )
    }

    /// Whether this expression is evaluable without any state.
    pub fn constant(&self) -> bool {
        match &self.kind {
            ExprKind::Number(_) => true,
            ExprKind::ExprID { value, .. } => match value.as_deref() {
                Some(Decl::Const(_)) => true,
                Some(Decl::Alias(a)) => a.value.constant(),
                _ => false,
            },
            ExprKind::Field { record, .. } => record.constant(),
            ExprKind::Element { array, index } => array.constant() && index.constant(),
            ExprKind::FunctionCall { .. } => false,
            ExprKind::Binary { lhs, rhs, .. } => lhs.constant() && rhs.constant(),
            ExprKind::Unary { rhs, .. } => rhs.constant(),
            ExprKind::Ternary { cond, lhs, rhs } => {
                cond.constant() && lhs.constant() && rhs.constant()
            }
            ExprKind::Forall { expr, .. } | ExprKind::Exists { expr, .. } => expr.constant(),
            ExprKind::IsUndefined(_) => false,
        }
    }

    /// The static type of this expression, or `None` for polymorphic
    /// numeric expressions.
    pub fn type_of(&self) -> Option<TypeExpr> {
        match &self.kind {
            ExprKind::Number(_) => None,
            ExprKind::ExprID { value, .. } => match value.as_deref() {
                Some(Decl::Const(c)) => c.ty.as_deref().cloned(),
                Some(Decl::Var(v)) => Some((*v.ty).clone()),
                Some(Decl::Alias(a)) => a.value.type_of(),
                _ => None,
            },
            ExprKind::Field { record, field } => {
                let ty = record.type_of()?;
                let resolved = ty.resolve().ok()?.clone();
                if let TypeExprKind::Record { fields } = &resolved.kind {
                    fields
                        .iter()
                        .find(|f| f.name == *field)
                        .map(|f| (*f.ty).clone())
                } else {
                    None
                }
            }
            ExprKind::Element { array, .. } => {
                let ty = array.type_of()?;
                let resolved = ty.resolve().ok()?.clone();
                if let TypeExprKind::Array { element_type, .. } = resolved.kind {
                    Some(*element_type)
                } else {
                    None
                }
            }
            ExprKind::FunctionCall { .. } => None,
            ExprKind::Binary { op, .. } => {
                if op.is_boolean() {
                    Some(TypeExpr::boolean())
                } else {
                    None
                }
            }
            ExprKind::Unary { op, rhs } => match op {
                UnaryOp::Not => Some(TypeExpr::boolean()),
                UnaryOp::Negative => rhs.type_of(),
                UnaryOp::Bnot => None,
            },
            ExprKind::Ternary { lhs, .. } => lhs.type_of(),
            ExprKind::Forall { .. } | ExprKind::Exists { .. } => Some(TypeExpr::boolean()),
            ExprKind::IsUndefined(_) => Some(TypeExpr::boolean()),
        }
    }

    /// Whether this expression designates a storage location.
    pub fn is_lvalue(&self) -> bool {
        match &self.kind {
            ExprKind::ExprID { value, .. } => match value.as_deref() {
                Some(Decl::Var(_)) => true,
                Some(Decl::Alias(a)) => a.value.is_lvalue(),
                _ => false,
            },
            ExprKind::Field { record, .. } => record.is_lvalue(),
            ExprKind::Element { array, .. } => array.is_lvalue(),
            _ => false,
        }
    }

    /// Whether assignment through this expression would be illegal.
    pub fn is_readonly(&self) -> bool {
        match &self.kind {
            ExprKind::ExprID { value, .. } => match value.as_deref() {
                Some(Decl::Var(_)) => false,
                Some(Decl::Alias(a)) => a.value.is_readonly(),
                _ => true,
            },
            ExprKind::Field { record, .. } => record.is_readonly(),
            ExprKind::Element { array, .. } => array.is_readonly(),
            _ => true,
        }
    }

    /// Evaluate a constant expression to its numeric value.
    ///
    /// Boolean-valued subexpressions fold to 0 or 1.
    pub fn constant_fold(&self) -> Result<BigInt> {
        match &self.kind {
            ExprKind::Number(v) => Ok(v.clone()),

            ExprKind::ExprID { name, value } => match value.as_deref() {
                Some(Decl::Const(c)) => c.value.constant_fold(),
                Some(Decl::Alias(a)) => a.value.constant_fold(),
                Some(_) => Err(Error::NotConstant {
                    message: format!("{} is not a constant", name),
                    loc: self.loc.clone(),
                }),
                None => Err(Error::TypeResolution {
                    message: format!("unresolved identifier {}", name),
                    loc: self.loc.clone(),
                }),
            },

            ExprKind::Binary { op, lhs, rhs } => {
                let l = lhs.constant_fold()?;
                let r = rhs.constant_fold()?;
                self.fold_binary(*op, l, r)
            }

            ExprKind::Unary { op, rhs } => {
                let v = rhs.constant_fold()?;
                match op {
                    UnaryOp::Negative => Ok(-v),
                    UnaryOp::Bnot => Ok(-(v + BigInt::one())),
                    UnaryOp::Not => Ok(if v.is_zero() {
                        BigInt::one()
                    } else {
                        BigInt::zero()
                    }),
                }
            }

            ExprKind::Ternary { cond, lhs, rhs } => {
                if cond.constant_fold()?.is_zero() {
                    rhs.constant_fold()
                } else {
                    lhs.constant_fold()
                }
            }

            _ => Err(Error::NotConstant {
                message: "expression cannot be constant folded".to_string(),
                loc: self.loc.clone(),
            }),
        }
    }

    fn fold_binary(&self, op: BinOp, l: BigInt, r: BigInt) -> Result<BigInt> {
        let bool_result = |b: bool| if b { BigInt::one() } else { BigInt::zero() };
        match op {
            BinOp::Add => Ok(l + r),
            BinOp::Sub => Ok(l - r),
            BinOp::Mul => Ok(l * r),
            BinOp::Div => {
                if r.is_zero() {
                    return Err(Error::NotConstant {
                        message: "division by zero".to_string(),
                        loc: self.loc.clone(),
                    });
                }
                // BigInt division truncates toward zero
                Ok(l / r)
            }
            BinOp::Mod => {
                if r.is_zero() {
                    return Err(Error::NotConstant {
                        message: "modulus by zero".to_string(),
                        loc: self.loc.clone(),
                    });
                }
                Ok(l % r)
            }
            BinOp::Band => Ok(l & r),
            BinOp::Bor => Ok(l | r),
            BinOp::Bxor => Ok(l ^ r),
            BinOp::Lsh | BinOp::Rsh => {
                let shift = if r.is_negative() { None } else { r.to_u64() };
                let shift = shift.ok_or_else(|| Error::NotConstant {
                    message: "shift amount out of range".to_string(),
                    loc: self.loc.clone(),
                })?;
                Ok(match op {
                    BinOp::Lsh => l << shift,
                    _ => l >> shift,
                })
            }
            BinOp::Lt => Ok(bool_result(l < r)),
            BinOp::Leq => Ok(bool_result(l <= r)),
            BinOp::Gt => Ok(bool_result(l > r)),
            BinOp::Geq => Ok(bool_result(l >= r)),
            BinOp::Eq => Ok(bool_result(l == r)),
            BinOp::Neq => Ok(bool_result(l != r)),
            BinOp::And => Ok(bool_result(!l.is_zero() && !r.is_zero())),
            BinOp::Or => Ok(bool_result(!l.is_zero() || !r.is_zero())),
            BinOp::Implication => Ok(bool_result(l.is_zero() || !r.is_zero())),
        }
    }
}
