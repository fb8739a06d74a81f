//! The top-level model: declarations, functions, and rules.

use crate::decl::{Decl, VarDecl};
use crate::error::Result;
use crate::location::Location;
use crate::rule::Rule;
use crate::stmt::Stmt;
use crate::type_expr::TypeExpr;
use crate::{NodeId, NODE_ID_UNASSIGNED};
use num_bigint::BigInt;
use num_traits::Zero;

/// A complete Murphi model as delivered by the parser.
#[derive(Clone, Debug)]
pub struct Model {
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
    /// Functions and procedures in source order.
    pub functions: Vec<Function>,
    /// Rules in source order.
    pub rules: Vec<Rule>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.decls == other.decls
            && self.functions == other.functions
            && self.rules == other.rules
    }
}

impl Model {
    pub fn new(decls: Vec<Decl>, functions: Vec<Function>, rules: Vec<Rule>, loc: Location) -> Self {
        Self {
            decls,
            functions,
            rules,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }

    /// The size of the model state in bits: the sum of the widths of all
    /// state variables.
    pub fn size_bits(&self) -> Result<BigInt> {
        let mut total = BigInt::zero();
        for d in &self.decls {
            if let Decl::Var(v) = d {
                if v.state_variable {
                    total += v.width()?;
                }
            }
        }
        Ok(total)
    }

    /// Iterate over the state variables in declaration order.
    pub fn state_variables(&self) -> impl Iterator<Item = &VarDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Var(v) if v.state_variable => Some(v),
            _ => None,
        })
    }
}

/// A user-defined function or procedure.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<VarDecl>,
    /// `None` for procedures.
    pub return_type: Option<Box<TypeExpr>>,
    pub decls: Vec<Decl>,
    pub body: Vec<Stmt>,
    pub loc: Location,
    pub id: NodeId,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.parameters == other.parameters
            && self.return_type == other.return_type
            && self.decls == other.decls
            && self.body == other.body
    }
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<VarDecl>,
        return_type: Option<TypeExpr>,
        decls: Vec<Decl>,
        body: Vec<Stmt>,
        loc: Location,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type: return_type.map(Box::new),
            decls,
            body,
            loc,
            id: NODE_ID_UNASSIGNED,
        }
    }
}
