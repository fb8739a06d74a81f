//! Declarations: constants, named types, variables, and aliases.

use crate::error::Result;
use crate::expr::Expr;
use crate::location::Location;
use crate::type_expr::TypeExpr;
use crate::{NodeId, NODE_ID_UNASSIGNED};
use num_bigint::BigInt;
use num_traits::Zero;

/// A declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Const(ConstDecl),
    Type(TypeDecl),
    Var(VarDecl),
    Alias(AliasDecl),
}

impl Decl {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            Decl::Const(d) => &d.name,
            Decl::Type(d) => &d.name,
            Decl::Var(d) => &d.name,
            Decl::Alias(d) => &d.name,
        }
    }

    /// The source location of the declaration.
    pub fn loc(&self) -> &Location {
        match self {
            Decl::Const(d) => &d.loc,
            Decl::Type(d) => &d.loc,
            Decl::Var(d) => &d.loc,
            Decl::Alias(d) => &d.loc,
        }
    }

    /// The unique id of the declaration node.
    pub fn unique_id(&self) -> NodeId {
        match self {
            Decl::Const(d) => d.id,
            Decl::Type(d) => d.id,
            Decl::Var(d) => d.id,
            Decl::Alias(d) => d.id,
        }
    }
}

/// `const name: value`.
#[derive(Clone, Debug)]
pub struct ConstDecl {
    pub name: String,
    /// The defining expression; must satisfy `value.constant()`.
    pub value: Box<Expr>,
    /// Optional explicit type annotation.
    pub ty: Option<Box<TypeExpr>>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for ConstDecl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value && self.ty == other.ty
    }
}

impl ConstDecl {
    pub fn new(name: impl Into<String>, value: Expr, loc: Location) -> Self {
        Self {
            name: name.into(),
            value: Box::new(value),
            ty: None,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}

/// `type name: value`.
#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: String,
    pub value: Box<TypeExpr>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for TypeDecl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, value: TypeExpr, loc: Location) -> Self {
        Self {
            name: name.into(),
            value: Box::new(value),
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}

/// `var name: ty`, either a state variable or a rule/function local.
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub name: String,
    pub ty: Box<TypeExpr>,
    /// Whether this variable is part of the model state.
    pub state_variable: bool,
    /// Bit offset within the enclosing state or record. Valid only once
    /// the enclosing structure has been finalised.
    pub offset: BigInt,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for VarDecl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.state_variable == other.state_variable
            && self.offset == other.offset
    }
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr, loc: Location) -> Self {
        Self {
            name: name.into(),
            ty: Box::new(ty),
            state_variable: false,
            offset: BigInt::zero(),
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }

    /// A state variable.
    pub fn state(name: impl Into<String>, ty: TypeExpr, loc: Location) -> Self {
        Self {
            state_variable: true,
            ..Self::new(name, ty, loc)
        }
    }

    /// Width of this variable in state bits.
    pub fn width(&self) -> Result<BigInt> {
        self.ty.width()
    }

    /// Number of values of this variable's type.
    pub fn count(&self) -> Result<BigInt> {
        self.ty.count()
    }
}

/// `alias name: value` — binds a name to an expression.
#[derive(Clone, Debug)]
pub struct AliasDecl {
    pub name: String,
    pub value: Box<Expr>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for AliasDecl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl AliasDecl {
    pub fn new(name: impl Into<String>, value: Expr, loc: Location) -> Self {
        Self {
            name: name.into(),
            value: Box::new(value),
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}
