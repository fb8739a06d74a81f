//! SMT-LIB v2 translation of Murphi expressions and assignments.
//!
//! Expressions translate to fully parenthesised s-expressions; assignments
//! translate to `(assert (= fresh update))` lines, minting a fresh symbol
//! for the assigned root on every write (SSA-on-write, see
//! [`context::SymContext`]).

pub mod context;
pub mod translate;

pub use context::SymContext;
pub use translate::{assignment_to_smt, expr_to_smt, to_smt_expr, to_smt_stmt};

use murphi_syntax::{Error, Location, Result};
use num_bigint::BigInt;
use num_traits::Signed;

/// Translation configuration: which SMT theory numeric values live in.
///
/// Integer mode uses unbounded integer arithmetic; bitvector mode uses
/// fixed-width bitvectors of `bitvector_width` bits. Bit operations are
/// only expressible in bitvector mode.
#[derive(Debug, Clone)]
pub struct SmtConfig {
    /// Use bitvectors instead of unbounded integers for numeric values.
    pub prefer_bitvectors: bool,
    /// Bit width of numeric values when using bitvectors.
    pub bitvector_width: u32,
}

impl Default for SmtConfig {
    fn default() -> Self {
        Self {
            prefer_bitvectors: false,
            bitvector_width: 64,
        }
    }
}

impl SmtConfig {
    pub fn add(&self) -> &'static str {
        if self.prefer_bitvectors {
            "bvadd"
        } else {
            "+"
        }
    }

    pub fn sub(&self) -> &'static str {
        if self.prefer_bitvectors {
            "bvsub"
        } else {
            "-"
        }
    }

    pub fn neg(&self) -> &'static str {
        if self.prefer_bitvectors {
            "bvneg"
        } else {
            "-"
        }
    }

    pub fn mul(&self) -> &'static str {
        if self.prefer_bitvectors {
            "bvmul"
        } else {
            "*"
        }
    }

    pub fn div(&self) -> &'static str {
        // solvers may differ on "div" for non-linear arithmetic; emit it
        // regardless and let the consumer decide what to do with failures
        if self.prefer_bitvectors {
            "bvsdiv"
        } else {
            "div"
        }
    }

    pub fn modulo(&self) -> &'static str {
        if self.prefer_bitvectors {
            "bvsmod"
        } else {
            "mod"
        }
    }

    pub fn lt(&self) -> &'static str {
        if self.prefer_bitvectors {
            "bvslt"
        } else {
            "<"
        }
    }

    pub fn leq(&self) -> &'static str {
        if self.prefer_bitvectors {
            "bvsle"
        } else {
            "<="
        }
    }

    pub fn gt(&self) -> &'static str {
        if self.prefer_bitvectors {
            "bvsgt"
        } else {
            ">"
        }
    }

    pub fn geq(&self) -> &'static str {
        if self.prefer_bitvectors {
            "bvsge"
        } else {
            ">="
        }
    }

    pub fn band(&self, origin: &Location) -> Result<&'static str> {
        self.bit_op("bvand", "bitwise AND", origin)
    }

    pub fn bor(&self, origin: &Location) -> Result<&'static str> {
        self.bit_op("bvor", "bitwise OR", origin)
    }

    pub fn bxor(&self, origin: &Location) -> Result<&'static str> {
        self.bit_op("bvxor", "bitwise XOR", origin)
    }

    pub fn bnot(&self, origin: &Location) -> Result<&'static str> {
        self.bit_op("bvnot", "bitwise NOT", origin)
    }

    pub fn lsh(&self, origin: &Location) -> Result<&'static str> {
        self.bit_op("bvshl", "left shift", origin)
    }

    pub fn rsh(&self, origin: &Location) -> Result<&'static str> {
        self.bit_op("bvashr", "right shift", origin)
    }

    fn bit_op(
        &self,
        op: &'static str,
        description: &str,
        origin: &Location,
    ) -> Result<&'static str> {
        if self.prefer_bitvectors {
            return Ok(op);
        }
        Err(Error::BitOpWithoutBitvectors {
            message: format!(
                "translation involving {} is only supported when using bitvector \
                 representations",
                description
            ),
            loc: origin.clone(),
        })
    }

    /// Render a numeric literal in the configured theory.
    pub fn numeric_literal(&self, value: &BigInt) -> String {
        if value.is_negative() {
            return format!("({} {})", self.neg(), self.numeric_literal(&-value));
        }
        if self.prefer_bitvectors {
            format!("(_ bv{} {})", value, self.bitvector_width)
        } else {
            value.to_string()
        }
    }
}
