//! Structural equality up to alpha-renaming of binder ids.

use std::rc::Rc;

use crate::ctx::Ctx;
use crate::expr::{Complex, Direction, Expr, ExprKind, Intro, IntroBody, Map, MapKind, Simple};
use crate::ternary::Ternary;

/// `are_equal(ctx, e1, e2)` — structural equality up to alpha-renaming.
/// Same-shape intros recurse component-wise (pushing binder-id pairs onto
/// `equal_variables` for assumption/recursion); an unresolved form
/// (`Variable`, inference variable, `Elim`) compared against a different
/// concrete shape yields `Maybe` rather than `No`, since evaluation or
/// constraint resolution could still make them equal.
pub fn are_equal(ctx: &mut Ctx, e1: &Expr, e2: &Expr) -> Ternary {
    match (e1.as_ref(), e2.as_ref()) {
        (ExprKind::Any, ExprKind::Any) => Ternary::Yes,
        (ExprKind::Void, ExprKind::Void) => Ternary::Yes,

        (ExprKind::Variable(a), ExprKind::Variable(b)) => variable_ids_equal(ctx, *a, *b),
        (ExprKind::InferenceVar(a), ExprKind::InferenceVar(b)) => variable_ids_equal(ctx, *a, *b),

        (ExprKind::Intro(i1), ExprKind::Intro(i2)) => intros_equal(ctx, i1, i2),

        (ExprKind::Elim(a), ExprKind::Elim(b)) => {
            if !a.simple.structurally_matches(&b.simple) {
                return Ternary::No;
            }
            if a.is_implicit != b.is_implicit {
                return Ternary::No;
            }
            let expr_eq = are_equal(ctx, &a.expr, &b.expr);
            let simple_eq = simples_equal(ctx, &a.simple, &b.simple);
            let out_eq = are_equal(ctx, &a.out, &b.out);
            Ternary::combine([expr_eq, simple_eq, out_eq])
        }

        (ExprKind::Map(m1), ExprKind::Map(m2)) => maps_equal(ctx, m1, m2),

        (ExprKind::Custom(c1), ExprKind::Custom(c2)) => {
            if c1.custom_id != c2.custom_id {
                return Ternary::No;
            }
            let ops = Rc::clone(&ctx.custom_registry[c1.custom_id]);
            ops.is_equal(ctx, c1.payload.as_ref(), c2.payload.as_ref())
        }

        // An unresolved form on either side: defer rather than refute.
        (ExprKind::Variable(_), _)
        | (_, ExprKind::Variable(_))
        | (ExprKind::InferenceVar(_), _)
        | (_, ExprKind::InferenceVar(_))
        | (ExprKind::Elim(_), _)
        | (_, ExprKind::Elim(_))
        | (ExprKind::InferenceCtx(_), _)
        | (_, ExprKind::InferenceCtx(_)) => Ternary::Maybe,

        _ => Ternary::No,
    }
}

fn variable_ids_equal(ctx: &Ctx, a: u64, b: u64) -> Ternary {
    if a == b {
        return Ternary::Yes;
    }
    if ctx.equal_variables_contains(a, b) {
        Ternary::Yes
    } else {
        Ternary::Maybe
    }
}

fn intros_equal(ctx: &mut Ctx, i1: &Intro, i2: &Intro) -> Ternary {
    if i1.polarity != i2.polarity || i1.is_implicit != i2.is_implicit {
        return Ternary::No;
    }
    match (&i1.body, &i2.body) {
        (IntroBody::Complex(Complex::Assumption(a1)), IntroBody::Complex(Complex::Assumption(a2))) => {
            let ty_eq = are_equal(ctx, &a1.ty, &a2.ty);
            let body_eq = ctx.with_equal_variables(a1.id, a2.id, |ctx| are_equal(ctx, &a1.body, &a2.body));
            Ternary::combine([ty_eq, body_eq])
        }
        (IntroBody::Complex(Complex::Choice(c1)), IntroBody::Complex(Complex::Choice(c2))) => {
            Ternary::combine([are_equal(ctx, &c1.left, &c2.left), are_equal(ctx, &c1.right, &c2.right)])
        }
        (IntroBody::Complex(Complex::Recursion(r1)), IntroBody::Complex(Complex::Recursion(r2))) => {
            ctx.with_equal_variables(r1.id, r2.id, |ctx| are_equal(ctx, &r1.body, &r2.body))
        }
        (
            IntroBody::Simple { simple: s1, out: o1 },
            IntroBody::Simple { simple: s2, out: o2 },
        ) => {
            if !s1.structurally_matches(s2) {
                return Ternary::No;
            }
            Ternary::combine([simples_equal(ctx, s1, s2), are_equal(ctx, o1, o2)])
        }
        // Same top-level tag (both Intro) but different sub-shape
        // (Complex vs Simple, or different Complex kinds): a concrete,
        // irreconcilable mismatch.
        _ => Ternary::No,
    }
}

fn simples_equal(ctx: &mut Ctx, s1: &Simple, s2: &Simple) -> Ternary {
    match (s1, s2) {
        (Simple::Proof(p1), Simple::Proof(p2)) => are_equal(ctx, p1, p2),
        (Simple::Direction(Direction::Left), Simple::Direction(Direction::Left)) => Ternary::Yes,
        (Simple::Direction(Direction::Right), Simple::Direction(Direction::Right)) => Ternary::Yes,
        (Simple::Unfold, Simple::Unfold) => Ternary::Yes,
        (Simple::Unwrap, Simple::Unwrap) => Ternary::Yes,
        _ => Ternary::No,
    }
}

fn maps_equal(ctx: &mut Ctx, m1: &Map, m2: &Map) -> Ternary {
    if m1.is_implicit != m2.is_implicit {
        return Ternary::No;
    }
    match (&m1.kind, &m2.kind) {
        (MapKind::Assumption(a1), MapKind::Assumption(a2)) => {
            let ty_eq = are_equal(ctx, &a1.ty, &a2.ty);
            let body_eq =
                ctx.with_equal_variables(a1.id, a2.id, |ctx| are_equal(ctx, &a1.assumption, &a2.assumption));
            Ternary::combine([ty_eq, body_eq])
        }
        (MapKind::Choice(c1), MapKind::Choice(c2)) => {
            Ternary::combine([are_equal(ctx, &c1.left, &c2.left), are_equal(ctx, &c1.right, &c2.right)])
        }
        (MapKind::Recursion(r1), MapKind::Recursion(r2)) => ctx
            .with_equal_variables(r1.id, r2.id, |ctx| are_equal(ctx, &r1.assumption, &r2.assumption)),
        // A Map is compared against a different Map kind: a concrete
        // mismatch (Maps never arise as the "unresolved" side of an
        // equality the way Variable/Elim do), so this is a hard No, per
        // are_equal.c's expr_map_is_equal/one_of_is_equal asymmetry.
        _ => Ternary::No,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{any, assumption, choice, inference_var, variable, void, Polarity};

    #[test]
    fn identical_variables_are_equal() {
        let mut ctx = Ctx::new();
        assert_eq!(are_equal(&mut ctx, &variable(3), &variable(3)), Ternary::Yes);
    }

    #[test]
    fn unrelated_variables_are_maybe() {
        let mut ctx = Ctx::new();
        assert_eq!(are_equal(&mut ctx, &variable(3), &variable(4)), Ternary::Maybe);
    }

    #[test]
    fn any_and_void_are_distinct() {
        let mut ctx = Ctx::new();
        assert_eq!(are_equal(&mut ctx, &any(), &void()), Ternary::No);
    }

    #[test]
    fn alpha_equivalent_assumptions_are_equal() {
        let mut ctx = Ctx::new();
        // fun $0 : Any => $0  ==  fun $1 : Any => $1
        let e1 = assumption(Polarity::Positive, false, 0, any(), variable(0));
        let e2 = assumption(Polarity::Positive, false, 1, any(), variable(1));
        assert_eq!(are_equal(&mut ctx, &e1, &e2), Ternary::Yes);
    }

    #[test]
    fn choices_compare_componentwise() {
        let mut ctx = Ctx::new();
        let e1 = choice(Polarity::Positive, false, any(), void());
        let e2 = choice(Polarity::Positive, false, any(), void());
        assert_eq!(are_equal(&mut ctx, &e1, &e2), Ternary::Yes);

        let e3 = choice(Polarity::Positive, false, void(), any());
        assert_eq!(are_equal(&mut ctx, &e1, &e3), Ternary::No);
    }

    #[test]
    fn inference_var_against_concrete_form_is_maybe() {
        let mut ctx = Ctx::new();
        assert_eq!(are_equal(&mut ctx, &inference_var(0), &void()), Ternary::Maybe);
    }

    #[test]
    fn mismatched_complex_shapes_are_no() {
        let mut ctx = Ctx::new();
        let assumption_expr = assumption(Polarity::Positive, false, 0, any(), variable(0));
        let choice_expr = choice(Polarity::Positive, false, any(), void());
        assert_eq!(are_equal(&mut ctx, &assumption_expr, &choice_expr), Ternary::No);
    }
}
