//! Symmetry-reduction code emission.
//!
//! For each named scalarset type the model declares, emits C routines
//! against the runtime's state-handle primitives: a pairwise element swap,
//! a memcmp-style three-way comparator, an in-place quicksort over
//! scalarset positions, and two whole-state canonicalisation entry points
//! (exhaustive permutation enumeration and a sort-based heuristic).
//!
//! Scalarset-valued fields are stored shifted by one: raw value 0 is the
//! reserved "undefined" sentinel, raw value `v != 0` encodes element
//! `v - 1`. All offsets and widths are emitted as exact decimal literals;
//! they are the contract with the runtime.

use murphi_syntax::type_expr::{TypeExpr, TypeExprKind};
use murphi_syntax::{Error, Model, Result, TypeDecl};
use num_bigint::BigInt;
use num_traits::One;
use tracing::debug;

/// Emit all canonicalisation routines for a model: one `swap_{T}`,
/// `compare_{T}` and `sort_{T}` per scalarset `T`, plus
/// `state_canonicalise_exhaustive` and `state_canonicalise_heuristic`.
pub fn generate_canonicalise(model: &Model, out: &mut String) -> Result<()> {
    let scalarsets = get_scalarsets(model);
    debug!(
        scalarsets = scalarsets.len(),
        "emitting canonicalisation routines"
    );

    for t in &scalarsets {
        generate_swap(model, out, t)?;
    }

    generate_canonicalise_exhaustive(&scalarsets, out)?;

    generate_canonicalise_heuristic(model, &scalarsets, out)
}

/// The named scalarset declarations of a model, in declaration order.
fn get_scalarsets(model: &Model) -> Vec<&TypeDecl> {
    let mut out = Vec::new();
    for d in &model.decls {
        if let murphi_syntax::Decl::Type(td) = d {
            if matches!(td.value.kind, TypeExprKind::Scalarset { .. }) {
                out.push(td);
            }
        }
    }
    out
}

fn ind(depth: usize) -> String {
    "  ".repeat(depth)
}

/// The scalarset bound of a pivot type declaration.
fn bound_of(pivot: &TypeDecl) -> Result<BigInt> {
    pivot.value.count()
}

/// Whether a type expression is a by-name reference to the pivot type.
fn names_pivot(ty: &TypeExpr, pivot: &TypeDecl) -> bool {
    matches!(&ty.kind, TypeExprKind::TypeExprID { name, .. } if *name == pivot.name)
}

// === swap_{T} ===

/// Emit an unconditional swap of two equally-shaped state regions.
fn generate_apply_swap(
    out: &mut String,
    offset_a: &str,
    offset_b: &str,
    ty: &TypeExpr,
    depth: usize,
) -> Result<()> {
    let t = ty.resolve()?;
    let i = ind(depth + 1);

    if t.is_simple() {
        let w = t.width()?;
        out.push_str(&format!(
            "{i}if ({offset_a} != {offset_b}) {{\n\
             {i}  value_t a = handle_read_raw(state_handle(s, {offset_a}, {w}));\n\
             {i}  value_t b = handle_read_raw(state_handle(s, {offset_b}, {w}));\n\
             {i}  handle_write_raw(state_handle(s, {offset_b}, {w}), a);\n\
             {i}  handle_write_raw(state_handle(s, {offset_a}, {w}), b);\n\
             {i}}}\n"
        ));
        return Ok(());
    }

    match &t.kind {
        TypeExprKind::Array {
            index_type,
            element_type,
        } => {
            let var = format!("i{}", depth);
            let len = index_type.count()?;
            let w = element_type.width()?;

            out.push_str(&format!(
                "{i}for (size_t {var} = 0; {var} < {len}; {var}++) {{\n"
            ));

            let off_a = format!("{} + {} * {}", offset_a, var, w);
            let off_b = format!("{} + {} * {}", offset_b, var, w);
            generate_apply_swap(out, &off_a, &off_b, element_type, depth + 1)?;

            out.push_str(&format!("{i}}}\n"));
            Ok(())
        }

        TypeExprKind::Record { fields } => {
            let mut off_a = offset_a.to_string();
            let mut off_b = offset_b.to_string();
            for f in fields {
                generate_apply_swap(out, &off_a, &off_b, &f.ty, depth)?;
                let w = f.width()?;
                off_a.push_str(&format!(" + {}", w));
                off_b.push_str(&format!(" + {}", w));
            }
            Ok(())
        }

        _ => Err(Error::InternalInvariant {
            message: "unhandled type in swap emission".to_string(),
            loc: ty.loc.clone(),
        }),
    }
}

/// Emit the swap behaviour of one state component with respect to the
/// pivot scalarset.
fn generate_swap_chunk(
    out: &mut String,
    ty: &TypeExpr,
    offset: &str,
    pivot: &TypeDecl,
    depth: usize,
) -> Result<()> {
    let i = ind(depth + 1);

    if ty.is_simple() {
        // A component holding a value of the pivot type must be rewritten
        // if it holds either of the two elements being exchanged. Raw 0 is
        // the undefined sentinel and is preserved.
        if names_pivot(ty, pivot) {
            let w = ty.width()?;
            out.push_str(&format!(
                "{i}if (x != y) {{\n\
                 {i}  value_t v = handle_read_raw(state_handle(s, {offset}, {w}));\n\
                 {i}  if (v != 0) {{\n\
                 {i}    if (v - 1 == (value_t)x) {{\n\
                 {i}      handle_write_raw(state_handle(s, {offset}, {w}), y + 1);\n\
                 {i}    }} else if (v - 1 == (value_t)y) {{\n\
                 {i}      handle_write_raw(state_handle(s, {offset}, {w}), x + 1);\n\
                 {i}    }}\n\
                 {i}  }}\n\
                 {i}}}\n"
            ));
        }

        // components of any other simple type are unaffected
        return Ok(());
    }

    let t = ty.resolve()?;
    match &t.kind {
        TypeExprKind::Array {
            index_type,
            element_type,
        } => {
            let w = element_type.width()?;

            // an array indexed by the pivot has its x and y elements
            // exchanged wholesale
            if names_pivot(index_type, pivot) {
                let off_x = format!("{} + x * {}", offset, w);
                let off_y = format!("{} + y * {}", offset, w);
                generate_apply_swap(out, &off_x, &off_y, element_type, depth)?;
            }

            // descend into the elements for nested occurrences
            let var = format!("i{}", depth);
            let len = index_type.count()?;
            out.push_str(&format!(
                "{i}for (size_t {var} = 0; {var} < {len}; {var}++) {{\n"
            ));

            let off = format!("{} + {} * {}", offset, var, w);
            generate_swap_chunk(out, element_type, &off, pivot, depth + 1)?;

            out.push_str(&format!("{i}}}\n"));
            Ok(())
        }

        TypeExprKind::Record { fields } => {
            let mut off = offset.to_string();
            for f in fields {
                generate_swap_chunk(out, &f.ty, &off, pivot, depth)?;
                off.push_str(&format!(" + {}", f.width()?));
            }
            Ok(())
        }

        _ => Err(Error::InternalInvariant {
            message: "unhandled type in swap emission".to_string(),
            loc: ty.loc.clone(),
        }),
    }
}

fn generate_swap(model: &Model, out: &mut String, pivot: &TypeDecl) -> Result<()> {
    out.push_str(&format!(
        "static void swap_{}(struct state *s __attribute__((unused)), \
         size_t x __attribute__((unused)), \
         size_t y __attribute__((unused))) {{\n",
        pivot.name
    ));

    for v in model.state_variables() {
        generate_swap_chunk(out, &v.ty, &v.offset.to_string(), pivot, 0)?;
    }

    out.push_str("}\n\n");
    Ok(())
}

// === compare_{T} ===

/// Emit a three-way comparison of two equally-shaped state regions.
fn generate_apply_compare(
    out: &mut String,
    offset_a: &str,
    offset_b: &str,
    ty: &TypeExpr,
    depth: usize,
) -> Result<()> {
    let t = ty.resolve()?;
    let i = ind(depth + 1);

    if t.is_simple() {
        let w = t.width()?;
        out.push_str(&format!(
            "{i}if ({offset_a} != {offset_b}) {{\n\
             {i}  value_t a = handle_read_raw(state_handle(s, {offset_a}, {w}));\n\
             {i}  value_t b = handle_read_raw(state_handle(s, {offset_b}, {w}));\n\
             {i}  if (a < b) {{\n\
             {i}    return -1;\n\
             {i}  }} else if (a > b) {{\n\
             {i}    return 1;\n\
             {i}  }}\n\
             {i}}}\n"
        ));
        return Ok(());
    }

    match &t.kind {
        TypeExprKind::Array {
            index_type,
            element_type,
        } => {
            let var = format!("i{}", depth);
            let len = index_type.count()?;
            let w = element_type.width()?;

            out.push_str(&format!(
                "{i}for (size_t {var} = 0; {var} < {len}; {var}++) {{\n"
            ));

            let off_a = format!("{} + {} * {}", offset_a, var, w);
            let off_b = format!("{} + {} * {}", offset_b, var, w);
            generate_apply_compare(out, &off_a, &off_b, element_type, depth + 1)?;

            out.push_str(&format!("{i}}}\n"));
            Ok(())
        }

        TypeExprKind::Record { fields } => {
            let mut off_a = offset_a.to_string();
            let mut off_b = offset_b.to_string();
            for f in fields {
                generate_apply_compare(out, &off_a, &off_b, &f.ty, depth)?;
                let w = f.width()?;
                off_a.push_str(&format!(" + {}", w));
                off_b.push_str(&format!(" + {}", w));
            }
            Ok(())
        }

        _ => Err(Error::InternalInvariant {
            message: "unhandled type in compare emission".to_string(),
            loc: ty.loc.clone(),
        }),
    }
}

/// Emit the comparison behaviour of one state component with respect to
/// the pivot scalarset.
fn generate_compare_chunk(
    out: &mut String,
    ty: &TypeExpr,
    offset: &str,
    pivot: &TypeDecl,
    depth: usize,
) -> Result<()> {
    let i = ind(depth + 1);

    if ty.is_simple() {
        // A component of the pivot type decides the comparison by which of
        // the two elements appears first in the state.
        if names_pivot(ty, pivot) {
            let w = ty.width()?;
            out.push_str(&format!(
                "{i}{{\n\
                 {i}  value_t v = handle_read_raw(state_handle(s, {offset}, {w}));\n\
                 {i}  if (v != 0) {{ /* ignored 'undefined' */\n\
                 {i}    if (v - 1 == (value_t)x) {{\n\
                 {i}      return -1;\n\
                 {i}    }} else if (v - 1 == (value_t)y) {{\n\
                 {i}      return 1;\n\
                 {i}    }}\n\
                 {i}  }}\n\
                 {i}}}\n"
            ));
        }
        return Ok(());
    }

    let t = ty.resolve()?;
    match &t.kind {
        TypeExprKind::Array {
            index_type,
            element_type,
        } => {
            let w = element_type.width()?;

            // an array indexed by the pivot compares its x and y elements
            // first; descent below only matters when they are equal
            if names_pivot(index_type, pivot) {
                let off_x = format!("{} + x * {}", offset, w);
                let off_y = format!("{} + y * {}", offset, w);
                generate_apply_compare(out, &off_x, &off_y, element_type, depth)?;
            }

            let var = format!("i{}", depth);
            let len = index_type.count()?;
            out.push_str(&format!(
                "{i}for (size_t {var} = 0; {var} < {len}; {var}++) {{\n"
            ));

            let off = format!("{} + {} * {}", offset, var, w);
            generate_compare_chunk(out, element_type, &off, pivot, depth + 1)?;

            out.push_str(&format!("{i}}}\n"));
            Ok(())
        }

        TypeExprKind::Record { fields } => {
            let mut off = offset.to_string();
            for f in fields {
                generate_compare_chunk(out, &f.ty, &off, pivot, depth)?;
                off.push_str(&format!(" + {}", f.width()?));
            }
            Ok(())
        }

        _ => Err(Error::InternalInvariant {
            message: "unhandled type in compare emission".to_string(),
            loc: ty.loc.clone(),
        }),
    }
}

/// Emit a memcmp-style comparator for a scalarset with respect to the
/// whole state.
fn generate_compare(out: &mut String, pivot: &TypeDecl, model: &Model) -> Result<()> {
    out.push_str(&format!(
        "static int compare_{}(const struct state *s, size_t x, size_t y) {{\n",
        pivot.name
    ));
    out.push_str("\n");
    out.push_str("  if (x == y) {\n");
    out.push_str("    return 0;\n");
    out.push_str("  }\n");
    out.push_str("\n");

    for v in model.state_variables() {
        generate_compare_chunk(out, &v.ty, &v.offset.to_string(), pivot, 0)?;
    }

    // fall through: all components equal
    out.push_str("  return 0;\n");
    out.push_str("}\n\n");
    Ok(())
}

// === sort_{T} ===

fn generate_sort(out: &mut String, pivot: &TypeDecl) {
    let t = &pivot.name;
    let lines = [
        format!("static void sort_{t}(struct state *s, size_t lower, size_t upper) {{"),
        String::new(),
        "  /* If we have nothing to sort, bail out. */".to_string(),
        "  if (lower >= upper) {".to_string(),
        "    return;".to_string(),
        "  }".to_string(),
        String::new(),
        "  /* Use Hoare's partitioning algorithm to apply quicksort. */".to_string(),
        "  size_t pivot = lower;".to_string(),
        "  size_t i = lower - 1;".to_string(),
        "  size_t j = upper + 1;".to_string(),
        String::new(),
        "  for (;;) {".to_string(),
        String::new(),
        "    do {".to_string(),
        "      i++;".to_string(),
        format!("      assert(i >= lower && i <= upper && \"out of bounds access in sort_{t}()\");"),
        format!("    }} while (compare_{t}(s, i, pivot) < 0);"),
        String::new(),
        "    do {".to_string(),
        "      j--;".to_string(),
        format!("      assert(j >= lower && j <= upper && \"out of bounds access in sort_{t}()\");"),
        format!("    }} while (compare_{t}(s, j, pivot) > 0);"),
        String::new(),
        "    if (i >= j) {".to_string(),
        "      break;".to_string(),
        "    }".to_string(),
        String::new(),
        "    /* Swap elements i and j. */".to_string(),
        format!("    swap_{t}(s, i, j);"),
        "    if (i == pivot) {".to_string(),
        "      pivot = j;".to_string(),
        "    } else if (j == pivot) {".to_string(),
        "      pivot = i;".to_string(),
        "    }".to_string(),
        "  }".to_string(),
        String::new(),
        format!("  sort_{t}(s, lower, j);"),
        format!("  sort_{t}(s, j + 1, upper);"),
        "}".to_string(),
        String::new(),
    ];
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
}

// === state_canonicalise_exhaustive ===

/// Open one level of the permutation enumeration: evaluate the current
/// candidate, then begin the schedule-counter loop that steps through the
/// permutations of this scalarset.
fn generate_loop_header(
    scalarset: &TypeDecl,
    index: usize,
    level: usize,
    out: &mut String,
) -> Result<()> {
    let i = ind(level);
    let t = &scalarset.name;
    let bound = bound_of(scalarset)?;
    let var = format!("i{}", index);

    out.push_str(&format!(
        "{i}if (state_cmp(&candidate, s) < 0) {{\n\
         {i}  /* Found a more canonical representation. */\n\
         {i}  memcpy(s, &candidate, sizeof(*s));\n\
         {i}}}\n\
         \n\
         {i}{{\n\
         {i}  size_t schedule_{t}[{bound}] = {{ 0 }};\n\
         \n\
         {i}  for (size_t {var} = 0; {var} < {bound}; ) {{\n\
         {i}    if (schedule_{t}[{var}] < {var}) {{\n\
         {i}      if ({var} % 2 == 0) {{\n\
         {i}        swap_{t}(&candidate, 0, {var});\n\
         {i}      }} else {{\n\
         {i}        swap_{t}(&candidate, schedule_{t}[{var}], {var});\n\
         {i}      }}\n"
    ));
    Ok(())
}

fn generate_loop_footer(scalarset: &TypeDecl, index: usize, level: usize, out: &mut String) {
    let i = ind(level);
    let t = &scalarset.name;
    let var = format!("i{}", index);

    out.push_str(&format!(
        "{i}      schedule_{t}[{var}]++;\n\
         {i}      {var} = 0;\n\
         {i}    }} else {{\n\
         {i}      schedule_{t}[{var}] = 0;\n\
         {i}      {var}++;\n\
         {i}    }}\n\
         {i}  }}\n\
         {i}}}\n"
    ));
}

/// Emit the nested permutation loops. The innermost position evaluates
/// the candidate; each outer scalarset advances once the inner nest has
/// exhausted its permutations. The nest for the inner scalarsets is also
/// emitted ahead of this level's loop, covering this level's identity
/// permutation.
fn generate_loop(
    scalarsets: &[&TypeDecl],
    index: usize,
    level: usize,
    out: &mut String,
) -> Result<()> {
    if index + 1 < scalarsets.len() {
        generate_loop(scalarsets, index + 1, level, out)?;
    }

    generate_loop_header(scalarsets[index], index, level, out)?;

    if index + 1 < scalarsets.len() {
        generate_loop(scalarsets, index + 1, level + 3, out)?;
    } else {
        let i = ind(level + 3);
        out.push_str(&format!(
            "{i}if (state_cmp(&candidate, s) < 0) {{\n\
             {i}  /* Found a more canonical representation. */\n\
             {i}  memcpy(s, &candidate, sizeof(*s));\n\
             {i}}}\n\
             \n"
        ));
    }

    generate_loop_footer(scalarsets[index], index, level, out);
    Ok(())
}

fn generate_canonicalise_exhaustive(scalarsets: &[&TypeDecl], out: &mut String) -> Result<()> {
    out.push_str(
        "static void state_canonicalise_exhaustive(struct state *s __attribute__((unused))) {\n",
    );
    out.push_str("\n");
    out.push_str("  assert(s != NULL && \"attempt to canonicalise NULL state\");\n");
    out.push_str("\n");

    if !scalarsets.is_empty() {
        out.push_str("  /* A state to store the current permutation we are considering. */\n");
        out.push_str("  static _Thread_local struct state candidate;\n");
        out.push_str("  memcpy(&candidate, s, sizeof(candidate));\n");
        out.push_str("\n");

        generate_loop(scalarsets, 0, 1, out)?;
    }

    out.push_str("}\n\n");
    Ok(())
}

// === state_canonicalise_heuristic ===

fn generate_canonicalise_heuristic(
    model: &Model,
    scalarsets: &[&TypeDecl],
    out: &mut String,
) -> Result<()> {
    for t in scalarsets {
        generate_compare(out, t, model)?;
        generate_sort(out, t);
    }

    out.push_str(
        "static void state_canonicalise_heuristic(struct state *s __attribute__((unused))) {\n",
    );
    out.push_str("\n");
    out.push_str("  assert(s != NULL && \"attempt to canonicalise NULL state\");\n");
    out.push_str("\n");

    for t in scalarsets {
        let last = bound_of(t)? - BigInt::one();
        out.push_str(&format!("  sort_{}(s, 0, {});\n", t.name, last));
    }

    out.push_str("}\n\n");
    Ok(())
}
