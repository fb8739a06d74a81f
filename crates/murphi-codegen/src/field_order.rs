//! State layout optimisation: reorder record fields and state variables
//! to improve memory locality, then rewrite offsets.
//!
//! The ordering puts zero-width fields first, then power-of-two-width
//! fields, then the rest by decreasing width; ties keep their source
//! order. The model is semantically unchanged: only storage order and
//! offsets move.

use murphi_syntax::number::is_onehot;
use murphi_syntax::traverse::{self, VisitorMut};
use murphi_syntax::type_expr::{TypeExpr, TypeExprKind};
use murphi_syntax::{resolve, Decl, Model, Result, VarDecl};
use num_bigint::BigInt;
use num_traits::Zero;
use std::cmp::Reverse;
use tracing::debug;

/// Reorder record fields and top-level state variables, recomputing every
/// offset.
///
/// Restructuring happens in local buffers and is committed only on
/// success: on error the model is unchanged. On success, resolution is
/// re-run so reference annotations see the new offsets.
pub fn optimise_field_ordering(model: &mut Model) -> Result<()> {
    let mut reordered = model.clone();
    let mut pass = Reorderer;
    pass.visit_model(&mut reordered)?;
    reorder_state_variables(&mut reordered)?;
    resolve(&mut reordered)?;
    *model = reordered;
    Ok(())
}

/// Sort rank of a field: zero-width first, then power-of-two widths, then
/// the rest; within a rank, wider fields first, ties stable.
fn sort_key(width: &BigInt) -> (u8, Reverse<BigInt>) {
    let rank = if width.is_zero() {
        0
    } else if is_onehot(width) {
        1
    } else {
        2
    };
    (rank, Reverse(width.clone()))
}

/// Sort `fields` by the layout order and rewrite their offsets to the
/// running sum of preceding widths. Returns the new sequence without
/// touching the input.
fn layout(fields: &[VarDecl]) -> Result<Vec<VarDecl>> {
    let mut keyed: Vec<(VarDecl, BigInt)> = fields
        .iter()
        .map(|f| Ok((f.clone(), f.width()?)))
        .collect::<Result<_>>()?;

    keyed.sort_by_key(|(_, w)| sort_key(w));

    let mut offset = BigInt::zero();
    let mut out = Vec::with_capacity(keyed.len());
    for (mut f, w) in keyed {
        f.offset = offset.clone();
        offset += w;
        out.push(f);
    }
    Ok(out)
}

struct Reorderer;

impl VisitorMut for Reorderer {
    fn visit_type_expr(&mut self, n: &mut TypeExpr) -> Result<()> {
        // act on children first so nested records settle before this one
        traverse::walk_type_expr_mut(self, n)?;

        if let TypeExprKind::Record { fields } = &mut n.kind {
            let reordered = layout(fields)?;
            *fields = reordered;
        }
        Ok(())
    }
}

/// Reorder the model's top-level declarations: non-variables keep their
/// relative order, variables follow them in layout order with fresh
/// offsets.
fn reorder_state_variables(model: &mut Model) -> Result<()> {
    let mut other = Vec::new();
    let mut vars = Vec::new();
    for d in &model.decls {
        match d {
            Decl::Var(v) => vars.push(v.clone()),
            _ => other.push(d.clone()),
        }
    }

    let vars = layout(&vars)?;
    debug!(
        variables = vars.len(),
        declarations = other.len(),
        "reordered state variables"
    );

    other.extend(vars.into_iter().map(Decl::Var));
    model.decls = other;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use murphi_syntax::{Expr, Indexer, Location, TypeDecl};

    fn loc() -> Location {
        Location::dummy()
    }

    fn range(lo: i64, hi: i64) -> TypeExpr {
        TypeExpr::new(
            TypeExprKind::Range {
                min: Box::new(Expr::number(lo, loc())),
                max: Box::new(Expr::number(hi, loc())),
            },
            loc(),
        )
    }

    #[test]
    fn record_fields_sort_zero_then_onehot_then_decreasing() {
        // a: 1 bit (power of two), b: 256-bit array (power of two, wider),
        // c: 0 bits. Expected order c, b, a with offsets 0, 0, 256.
        let record = TypeExpr::new(
            TypeExprKind::Record {
                fields: vec![
                    VarDecl::new("a", range(0, 1), loc()),
                    VarDecl::new(
                        "b",
                        TypeExpr::new(
                            TypeExprKind::Array {
                                index_type: Box::new(range(0, 255)),
                                element_type: Box::new(range(0, 1)),
                            },
                            loc(),
                        ),
                        loc(),
                    ),
                    VarDecl::new("c", range(0, 0), loc()),
                ],
            },
            loc(),
        );
        let mut model = Model::new(
            vec![Decl::Type(TypeDecl::new("r", record, loc()))],
            vec![],
            vec![],
            loc(),
        );
        Indexer::index(&mut model).unwrap();
        resolve(&mut model).unwrap();

        optimise_field_ordering(&mut model).unwrap();

        let Decl::Type(td) = &model.decls[0] else {
            unreachable!()
        };
        let TypeExprKind::Record { fields } = &td.value.kind else {
            unreachable!()
        };
        let order: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
        let offsets: Vec<_> = fields.iter().map(|f| f.offset.clone()).collect();
        assert_eq!(
            offsets,
            vec![BigInt::from(0), BigInt::from(0), BigInt::from(256)]
        );
    }

    #[test]
    fn state_size_is_preserved_and_offsets_are_cumulative() {
        let mut model = Model::new(
            vec![
                Decl::Var(VarDecl::state("x", range(0, 6), loc())), // 3 bits
                Decl::Var(VarDecl::state("y", range(0, 15), loc())), // 4 bits
                Decl::Var(VarDecl::state("z", range(0, 0), loc())), // 0 bits
            ],
            vec![],
            vec![],
            loc(),
        );
        Indexer::index(&mut model).unwrap();
        resolve(&mut model).unwrap();

        let before = model.size_bits().unwrap();
        optimise_field_ordering(&mut model).unwrap();
        assert_eq!(model.size_bits().unwrap(), before);

        // z (0, zero-width), y (4, power of two), x (3, remainder)
        let names: Vec<_> = model.state_variables().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["z", "y", "x"]);

        let mut expected = BigInt::zero();
        for v in model.state_variables() {
            assert_eq!(v.offset, expected);
            expected += v.width().unwrap();
        }
    }

    #[test]
    fn non_variable_declarations_keep_their_order() {
        let mut model = Model::new(
            vec![
                Decl::Type(TypeDecl::new("t1", range(0, 1), loc())),
                Decl::Var(VarDecl::state("v", range(0, 1), loc())),
                Decl::Type(TypeDecl::new("t2", range(0, 3), loc())),
            ],
            vec![],
            vec![],
            loc(),
        );
        Indexer::index(&mut model).unwrap();
        resolve(&mut model).unwrap();

        optimise_field_ordering(&mut model).unwrap();

        let names: Vec<_> = model.decls.iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, vec!["t1", "t2", "v"]);
    }
}
