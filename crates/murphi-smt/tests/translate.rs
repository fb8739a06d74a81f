//! End-to-end translation scenarios: literals, operators, the symbolic
//! environment, and SSA renaming on assignment.

use murphi_smt::{assignment_to_smt, expr_to_smt, SmtConfig, SymContext};
use murphi_syntax::expr::{BinOp, ExprKind};
use murphi_syntax::type_expr::TypeExprKind;
use murphi_syntax::{Decl, Error, Expr, Location, NodeId, Stmt, TypeExpr, VarDecl};

fn loc() -> Location {
    Location::dummy()
}

fn int_mode() -> SmtConfig {
    SmtConfig::default()
}

fn bv_mode(width: u32) -> SmtConfig {
    SmtConfig {
        prefer_bitvectors: true,
        bitvector_width: width,
    }
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

/// A state variable declaration with a chosen unique id.
fn var(name: &str, ty: TypeExpr, id: NodeId) -> Decl {
    let mut v = VarDecl::state(name, ty, loc());
    v.id = id;
    Decl::Var(v)
}

/// An identifier expression resolved against `decl`.
fn resolved(decl: &Decl) -> Expr {
    Expr::new(
        ExprKind::ExprID {
            name: decl.name().to_string(),
            value: Some(Box::new(decl.clone())),
        },
        loc(),
    )
}

#[test]
fn literal_in_both_modes() {
    let mut ctx = SymContext::new();
    let n = Expr::number(42, loc());

    assert_eq!(expr_to_smt(&n, &mut ctx, &int_mode()).unwrap(), "42");
    assert_eq!(
        expr_to_smt(&n, &mut ctx, &bv_mode(8)).unwrap(),
        "(_ bv42 8)"
    );
}

#[test]
fn addition_in_both_modes() {
    let mut ctx = SymContext::new();
    let e = Expr::binary(
        BinOp::Add,
        Expr::number(1, loc()),
        Expr::number(2, loc()),
        loc(),
    );

    assert_eq!(expr_to_smt(&e, &mut ctx, &int_mode()).unwrap(), "(+ 1 2)");
    assert_eq!(
        expr_to_smt(&e, &mut ctx, &bv_mode(64)).unwrap(),
        "(bvadd (_ bv1 64) (_ bv2 64))"
    );
}

#[test]
fn logical_operators_are_mode_independent() {
    // and, or, not, =>, = and ite share one rendering across modes
    let mut ctx = SymContext::new();
    let tru = Expr::binary(BinOp::Eq, Expr::number(1, loc()), Expr::number(1, loc()), loc());
    let e = Expr::binary(BinOp::Implication, tru.clone(), tru, loc());

    let int_rendering = expr_to_smt(&e, &mut ctx, &int_mode()).unwrap();
    let bv_rendering = expr_to_smt(&e, &mut ctx, &bv_mode(64)).unwrap();
    assert_eq!(int_rendering, "(=> (= 1 1) (= 1 1))");
    // equality and implication do not change, only the literals do
    assert_eq!(bv_rendering, "(=> (= (_ bv1 64) (_ bv1 64)) (= (_ bv1 64) (_ bv1 64)))");
}

#[test]
fn identifier_reads_resolve_through_the_context() {
    let x = var("x", range(0, 7), 7);
    let mut ctx = SymContext::new();
    let s0 = ctx.register_symbol(7);
    assert_eq!(s0, "s0");

    let e = resolved(&x);
    assert_eq!(expr_to_smt(&e, &mut ctx, &int_mode()).unwrap(), "s0");
}

#[test]
fn ssa_on_simple_assignment() {
    // x := x + 1 with x bound to s0: the rhs sees s0, the write mints s1
    let x = var("x", range(0, 7), 7);
    let mut ctx = SymContext::new();
    ctx.register_symbol(7);

    let stmt = Stmt::assignment(
        resolved(&x),
        Expr::binary(BinOp::Add, resolved(&x), Expr::number(1, loc()), loc()),
        loc(),
    );

    let line = assignment_to_smt(&stmt, &mut ctx, &int_mode()).unwrap();
    assert_eq!(line, "(assert (= s1 (+ s0 1)))");

    // later reads of x resolve to the fresh symbol
    assert_eq!(
        expr_to_smt(&resolved(&x), &mut ctx, &int_mode()).unwrap(),
        "s1"
    );
}

#[test]
fn ssa_on_array_element_assignment() {
    // a[i] := 7 with a -> s0, i -> s1: emits a store and rebinds a
    let a = var(
        "a",
        TypeExpr::new(
            TypeExprKind::Array {
                index_type: Box::new(range(0, 3)),
                element_type: Box::new(range(0, 7)),
            },
            loc(),
        ),
        1,
    );
    let i = var("i", range(0, 3), 2);

    let mut ctx = SymContext::new();
    ctx.register_symbol(1);
    ctx.register_symbol(2);

    let stmt = Stmt::assignment(
        Expr::new(
            ExprKind::Element {
                array: Box::new(resolved(&a)),
                index: Box::new(resolved(&i)),
            },
            loc(),
        ),
        Expr::number(7, loc()),
        loc(),
    );

    let line = assignment_to_smt(&stmt, &mut ctx, &int_mode()).unwrap();
    assert_eq!(line, "(assert (= s2 (store s0 s1 7)))");
    assert_eq!(
        expr_to_smt(&resolved(&a), &mut ctx, &int_mode()).unwrap(),
        "s2"
    );
}

#[test]
fn record_field_assignment_uses_the_record_constructor() {
    // r.f := 5 for r: record { f, g }: constructor with f replaced
    let rec_ty = TypeExpr::new(
        TypeExprKind::Record {
            fields: vec![
                VarDecl::new("f", range(0, 7), loc()),
                VarDecl::new("g", range(0, 7), loc()),
            ],
        },
        loc(),
    );
    let r = var("r", rec_ty, 4);

    let mut ctx = SymContext::new();
    ctx.register_symbol(4);

    let stmt = Stmt::assignment(
        Expr::new(
            ExprKind::Field {
                record: Box::new(resolved(&r)),
                field: "f".to_string(),
            },
            loc(),
        ),
        Expr::number(5, loc()),
        loc(),
    );

    let line = assignment_to_smt(&stmt, &mut ctx, &int_mode()).unwrap();
    assert_eq!(line, "(assert (= s1 (mk_rec_f_g 5 (rec_g s0))))");
}

#[test]
fn bit_operations_require_bitvector_mode() {
    let x = var("x", range(0, 7), 7);
    let y = var("y", range(0, 7), 8);
    let mut ctx = SymContext::new();
    ctx.register_symbol(7);
    ctx.register_symbol(8);

    let band_loc = Location::new(Some("m.m".to_string()), 5, 9);
    let e = Expr::binary(BinOp::Band, resolved(&x), resolved(&y), band_loc.clone());

    let err = expr_to_smt(&e, &mut ctx, &int_mode()).unwrap_err();
    match err {
        Error::BitOpWithoutBitvectors { loc, .. } => {
            assert_eq!(loc, band_loc);
        }
        other => panic!("unexpected error {:?}", other),
    }

    assert_eq!(
        expr_to_smt(&e, &mut ctx, &bv_mode(64)).unwrap(),
        "(bvand s0 s1)"
    );
}

#[test]
fn isundefined_is_unsupported() {
    let mut ctx = SymContext::new();
    let e = Expr::new(
        ExprKind::IsUndefined(Box::new(Expr::number(0, loc()))),
        loc(),
    );
    assert!(matches!(
        expr_to_smt(&e, &mut ctx, &int_mode()),
        Err(Error::UnsupportedConstruct { .. })
    ));
}

#[test]
fn emission_is_deterministic() {
    let x = var("x", range(0, 7), 7);
    let e = Expr::binary(
        BinOp::Mul,
        resolved(&x),
        Expr::binary(BinOp::Sub, resolved(&x), Expr::number(3, loc()), loc()),
        loc(),
    );

    let render = || {
        let mut ctx = SymContext::new();
        ctx.register_symbol(7);
        expr_to_smt(&e, &mut ctx, &int_mode()).unwrap()
    };
    assert_eq!(render(), render());
    assert_eq!(render(), "(* s0 (- s0 3))");
}

#[test]
fn nested_element_of_record_field_keeps_prefix_resolution() {
    // r.a[3] := 1 for r: record { a: array } — the stump is the element
    // access, the update stores into a projection of the record
    let rec_ty = TypeExpr::new(
        TypeExprKind::Record {
            fields: vec![VarDecl::new(
                "a",
                TypeExpr::new(
                    TypeExprKind::Array {
                        index_type: Box::new(range(0, 3)),
                        element_type: Box::new(range(0, 7)),
                    },
                    loc(),
                ),
                loc(),
            )],
        },
        loc(),
    );
    let r = var("r", rec_ty, 9);

    let mut ctx = SymContext::new();
    ctx.register_symbol(9);

    let stmt = Stmt::assignment(
        Expr::new(
            ExprKind::Element {
                array: Box::new(Expr::new(
                    ExprKind::Field {
                        record: Box::new(resolved(&r)),
                        field: "a".to_string(),
                    },
                    loc(),
                )),
                index: Box::new(Expr::number(3, loc())),
            },
            loc(),
        ),
        Expr::number(1, loc()),
        loc(),
    );

    let line = assignment_to_smt(&stmt, &mut ctx, &int_mode()).unwrap();
    // stump is r.a (its child is the identifier), so the update is a
    // record constructor around the stored array
    assert_eq!(line, "(assert (= s1 (mk_rec_a (store (rec_a s0) 3 1))))");
}
