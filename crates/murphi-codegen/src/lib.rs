//! Code-generating backends over the Murphi AST: symmetry-reduction
//! routine emission and state layout optimisation.
//!
//! The layout optimiser runs first and mutates the model; the emitters
//! then consume the settled model and write C source fragments addressed
//! to the runtime library's state-handle primitives.

pub mod field_order;
pub mod symmetry;

pub use field_order::optimise_field_ordering;
pub use symmetry::generate_canonicalise;
