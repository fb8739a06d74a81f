//! Type expressions and their width/count arithmetic.

use crate::decl::VarDecl;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::location::Location;
use crate::number::bits_for;
use crate::{NodeId, NODE_ID_UNASSIGNED};
use num_bigint::BigInt;
use num_traits::{One, Zero};

/// A type expression.
///
/// Equality is structural: locations and unique ids are ignored.
#[derive(Clone, Debug)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for TypeExpr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind of type expression.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExprKind {
    /// Integer interval `min .. max`, bounds inclusive and constant.
    Range { min: Box<Expr>, max: Box<Expr> },
    /// Enumeration of named members.
    Enum { members: Vec<String> },
    /// A symmetry-bearing finite type of `bound` interchangeable values.
    Scalarset { bound: Box<Expr> },
    /// Ordered aggregate of named fields.
    Record { fields: Vec<VarDecl> },
    /// Fixed-size mapping from a simple index type to an element type.
    Array {
        index_type: Box<TypeExpr>,
        element_type: Box<TypeExpr>,
    },
    /// Reference to a named type. `referent` is filled in by resolution
    /// with an owned clone of the named type's definition.
    TypeExprID {
        name: String,
        referent: Option<Box<TypeExpr>>,
    },
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, loc: Location) -> Self {
        Self {
            kind,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }

    /// The built-in boolean type.
    pub fn boolean() -> Self {
        Self::new(
            TypeExprKind::Enum {
                members: vec!["false".to_string(), "true".to_string()],
            },
            Location::dummy(),
        )
    }

    /// An unresolved reference to a named type.
    pub fn named(name: impl Into<String>, loc: Location) -> Self {
        Self::new(
            TypeExprKind::TypeExprID {
                name: name.into(),
                referent: None,
            },
            loc,
        )
    }

    /// Whether this is a primitive integer-like type.
    pub fn is_simple(&self) -> bool {
        match &self.kind {
            TypeExprKind::Range { .. }
            | TypeExprKind::Enum { .. }
            | TypeExprKind::Scalarset { .. } => true,
            TypeExprKind::Record { .. } | TypeExprKind::Array { .. } => false,
            TypeExprKind::TypeExprID { referent, .. } => {
                referent.as_deref().is_some_and(TypeExpr::is_simple)
            }
        }
    }

    /// Follow named references until a structural type is reached.
    ///
    /// Resolution is idempotent: a structural type resolves to itself.
    pub fn resolve(&self) -> Result<&TypeExpr> {
        match &self.kind {
            TypeExprKind::TypeExprID { name, referent } => match referent.as_deref() {
                Some(t) => t.resolve(),
                None => Err(Error::TypeResolution {
                    message: format!("unresolved type {}", name),
                    loc: self.loc.clone(),
                }),
            },
            _ => Ok(self),
        }
    }

    /// The number of distinct values of this type.
    ///
    /// Only defined for simple types; asking for the count of a record or
    /// array is a bug in the caller.
    pub fn count(&self) -> Result<BigInt> {
        match &self.kind {
            TypeExprKind::Range { min, max } => {
                let lo = min.constant_fold()?;
                let hi = max.constant_fold()?;
                Ok(hi - lo + BigInt::one())
            }
            TypeExprKind::Enum { members } => Ok(BigInt::from(members.len())),
            TypeExprKind::Scalarset { bound } => bound.constant_fold(),
            TypeExprKind::Record { .. } | TypeExprKind::Array { .. } => {
                Err(Error::InternalInvariant {
                    message: "count of a non-simple type".to_string(),
                    loc: self.loc.clone(),
                })
            }
            TypeExprKind::TypeExprID { .. } => self.resolve()?.count(),
        }
    }

    /// The width of this type in state bits.
    pub fn width(&self) -> Result<BigInt> {
        match &self.kind {
            TypeExprKind::Range { .. }
            | TypeExprKind::Enum { .. }
            | TypeExprKind::Scalarset { .. } => Ok(bits_for(&self.count()?)),
            TypeExprKind::Record { fields } => {
                let mut total = BigInt::zero();
                for f in fields {
                    total += f.width()?;
                }
                Ok(total)
            }
            TypeExprKind::Array {
                index_type,
                element_type,
            } => Ok(index_type.count()? * element_type.width()?),
            TypeExprKind::TypeExprID { .. } => self.resolve()?.width(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

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
    fn range_width_and_count() {
        assert_eq!(range(0, 1).count().unwrap(), BigInt::from(2));
        assert_eq!(range(0, 1).width().unwrap(), BigInt::from(1));
        assert_eq!(range(0, 0).width().unwrap(), BigInt::from(0));
        assert_eq!(range(1, 256).width().unwrap(), BigInt::from(8));
        assert_eq!(range(-4, 3).width().unwrap(), BigInt::from(3));
    }

    #[test]
    fn enum_as_range_from_zero() {
        let t = TypeExpr::new(
            TypeExprKind::Enum {
                members: vec!["a".into(), "b".into(), "c".into()],
            },
            Location::dummy(),
        );
        assert_eq!(t.count().unwrap(), BigInt::from(3));
        assert_eq!(t.width().unwrap(), BigInt::from(2));
        assert!(t.is_simple());
    }

    #[test]
    fn scalarset_as_range_from_zero() {
        let t = TypeExpr::new(
            TypeExprKind::Scalarset {
                bound: Box::new(Expr::number(4, Location::dummy())),
            },
            Location::dummy(),
        );
        assert_eq!(t.count().unwrap(), BigInt::from(4));
        assert_eq!(t.width().unwrap(), BigInt::from(2));
    }

    #[test]
    fn array_width_multiplies() {
        let t = TypeExpr::new(
            TypeExprKind::Array {
                index_type: Box::new(range(0, 255)),
                element_type: Box::new(range(0, 1)),
            },
            Location::dummy(),
        );
        assert_eq!(t.width().unwrap(), BigInt::from(256));
        assert!(!t.is_simple());
    }

    #[test]
    fn unresolved_reference_fails_width() {
        let t = TypeExpr::named("node_t", Location::dummy());
        assert!(matches!(t.width(), Err(Error::TypeResolution { .. })));
    }

    #[test]
    fn resolution_is_idempotent() {
        let inner = range(0, 7);
        let t = TypeExpr::new(
            TypeExprKind::TypeExprID {
                name: "octet".to_string(),
                referent: Some(Box::new(inner.clone())),
            },
            Location::dummy(),
        );
        let once = t.resolve().unwrap();
        let twice = once.resolve().unwrap();
        assert_eq!(once, twice);
        assert_eq!(*twice, inner);
    }
}
