//! The per-inference-variable constraint log (§4.4): a flat, append-only
//! `Vec<Constraint>` on `Ctx`, scanned from a caller-supplied watermark
//! rather than indexed by id — matching `constraint.h`'s
//! `dy_constraint_get`/`dy_join_constraints`/`dy_free_constraints_starting_at`
//! trio, with watermark/rollback reframed as a scoped-acquisition helper
//! per the source's own DESIGN NOTES.

use crate::ctx::{Constraint, Ctx};
use crate::equality::are_equal;
use crate::expr::{choice, variable, Expr, Id, Polarity};
use crate::substitute::substitute;
use crate::ternary::Ternary;

/// Appends a one-sided lower-bound constraint.
pub fn add_lower(ctx: &mut Ctx, id: Id, lower: Expr) {
    ctx.constraints.push(Constraint {
        id,
        lower: Some(lower),
        upper: None,
    });
}

/// Appends a one-sided upper-bound constraint.
pub fn add_upper(ctx: &mut Ctx, id: Id, upper: Expr) {
    ctx.constraints.push(Constraint {
        id,
        lower: None,
        upper: Some(upper),
    });
}

/// Scans `ctx.constraints[start..]` for the first entry matching `id` and
/// returns its bound on the requested `polarity` side (lower for positive,
/// upper for negative). If the bound mentions `id` itself, wraps it in an
/// implicit recursion binding `id` — the occurs-check repair
/// `dy_constraint_get` performs by substituting `Variable(id)` for `id` and
/// checking whether anything changed.
pub fn get(ctx: &mut Ctx, id: Id, polarity: Polarity, start: usize) -> Option<Expr> {
    let entry = ctx.constraints[start..].iter().find(|c| c.id == id)?;
    let bound = match polarity {
        Polarity::Positive => entry.lower.clone(),
        Polarity::Negative => entry.upper.clone(),
    }?;

    let self_var = variable(id);
    if substitute(ctx, &bound, id, &self_var).is_some() {
        Some(crate::expr::recursion(polarity, true, id, bound))
    } else {
        Some(bound)
    }
}

/// Merges every entry in `[start2, end)` whose id also appears in
/// `[start1, start2)` into that earlier entry, removing the later one.
/// Two lower bounds that aren't already equal become a choice of the
/// *flipped* join polarity; two upper bounds become a choice of the
/// *unflipped* join polarity — the asymmetry `dy_join_constraints` bakes
/// in and that this crate preserves rather than "fixing" into symmetry.
pub fn join(ctx: &mut Ctx, start1: usize, start2: usize, polarity: Polarity) {
    let mut i = start2;
    while i < ctx.constraints.len() {
        let current = ctx.constraints[i].clone();
        let mut merge_target = None;
        for k in start1..start2 {
            if ctx.constraints[k].id == current.id {
                merge_target = Some(k);
                break;
            }
        }

        let Some(k) = merge_target else {
            i += 1;
            continue;
        };

        if let Some(lower) = current.lower {
            match &ctx.constraints[k].lower {
                Some(existing) if are_equal(ctx, existing, &lower) != Ternary::Yes => {
                    let merged = choice(polarity.flip(), true, ctx.constraints[k].lower.clone().unwrap(), lower);
                    ctx.constraints[k].lower = Some(merged);
                }
                Some(_) => {}
                None => ctx.constraints[k].lower = Some(lower),
            }
        }

        if let Some(upper) = current.upper {
            match &ctx.constraints[k].upper {
                Some(existing) if are_equal(ctx, existing, &upper) != Ternary::Yes => {
                    let merged = choice(polarity, true, ctx.constraints[k].upper.clone().unwrap(), upper);
                    ctx.constraints[k].upper = Some(merged);
                }
                Some(_) => {}
                None => ctx.constraints[k].upper = Some(upper),
            }
        }

        ctx.constraints.remove(i);
    }
}

/// Truncates the log back to `start`, dropping every entry appended since
/// — the rollback a `No` return from `is_subtype` must perform to uphold
/// the constraint-watermark invariant (§8).
pub fn free_starting_at(ctx: &mut Ctx, start: usize) {
    ctx.constraints.truncate(start);
}

/// Runs `f` with the constraint watermark taken on entry; if `f` returns
/// `Ternary::No`, rolls the log back to that watermark before returning.
/// The scoped-acquisition wrapper §9 calls for around watermark/rollback.
pub fn with_watermark(ctx: &mut Ctx, f: impl FnOnce(&mut Ctx) -> Ternary) -> Ternary {
    let watermark = ctx.constraint_watermark();
    let result = f(ctx);
    if result == Ternary::No {
        free_starting_at(ctx, watermark);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{any, void};

    #[test]
    fn get_returns_none_below_watermark() {
        let mut ctx = Ctx::new();
        add_lower(&mut ctx, 0, any());
        assert!(get(&mut ctx, 0, Polarity::Positive, 1).is_none());
    }

    #[test]
    fn get_positive_reads_lower_bound() {
        let mut ctx = Ctx::new();
        add_lower(&mut ctx, 0, any());
        let bound = get(&mut ctx, 0, Polarity::Positive, 0).unwrap();
        assert!(matches!(bound.as_ref(), crate::expr::ExprKind::Any));
    }

    #[test]
    fn get_negative_reads_upper_bound() {
        let mut ctx = Ctx::new();
        add_upper(&mut ctx, 0, void());
        let bound = get(&mut ctx, 0, Polarity::Negative, 0).unwrap();
        assert!(matches!(bound.as_ref(), crate::expr::ExprKind::Void));
    }

    #[test]
    fn get_missing_polarity_is_none() {
        let mut ctx = Ctx::new();
        add_lower(&mut ctx, 0, any());
        assert!(get(&mut ctx, 0, Polarity::Negative, 0).is_none());
    }

    #[test]
    fn get_occurs_check_wraps_in_recursion() {
        let mut ctx = Ctx::new();
        // lower bound for id 0 mentions id 0 itself.
        add_lower(&mut ctx, 0, variable(0));
        let bound = get(&mut ctx, 0, Polarity::Positive, 0).unwrap();
        match bound.as_ref() {
            crate::expr::ExprKind::Intro(intro) => match &intro.body {
                crate::expr::IntroBody::Complex(crate::expr::Complex::Recursion(r)) => {
                    assert_eq!(r.id, 0);
                }
                other => panic!("expected recursion body, got {:?}", other),
            },
            other => panic!("expected Intro, got {:?}", other),
        }
    }

    #[test]
    fn watermark_rolls_back_on_no() {
        let mut ctx = Ctx::new();
        let result = with_watermark(&mut ctx, |ctx| {
            add_lower(ctx, 0, any());
            Ternary::No
        });
        assert_eq!(result, Ternary::No);
        assert_eq!(ctx.constraints.len(), 0);
    }

    #[test]
    fn watermark_keeps_constraints_on_yes() {
        let mut ctx = Ctx::new();
        with_watermark(&mut ctx, |ctx| {
            add_lower(ctx, 0, any());
            Ternary::Yes
        });
        assert_eq!(ctx.constraints.len(), 1);
    }

    #[test]
    fn join_merges_matching_ids_into_earlier_region() {
        let mut ctx = Ctx::new();
        add_lower(&mut ctx, 0, any()); // start1..start2
        let start2 = ctx.constraints.len();
        add_lower(&mut ctx, 0, void()); // distinct lower -> choice
        join(&mut ctx, 0, start2, Polarity::Positive);
        assert_eq!(ctx.constraints.len(), 1);
        assert!(matches!(
            ctx.constraints[0].lower.as_ref().unwrap().as_ref(),
            crate::expr::ExprKind::Intro(_)
        ));
    }

    #[test]
    fn join_leaves_unmatched_ids_untouched() {
        let mut ctx = Ctx::new();
        add_lower(&mut ctx, 0, any());
        let start2 = ctx.constraints.len();
        add_lower(&mut ctx, 1, void());
        join(&mut ctx, 0, start2, Polarity::Positive);
        assert_eq!(ctx.constraints.len(), 2);
    }
}
