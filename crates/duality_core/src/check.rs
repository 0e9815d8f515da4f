//! The type-checking pass (§4.5): computes the type of a term
//! (`type_of`), and walks a term resolving every `Elim` node's
//! `check_result` against the binder it eliminates, inserting whatever
//! coercion `subtype::is_subtype` produces along the way.
//!
//! Grounded on `core/type_of.h`'s `dy_type_of` and
//! `core/src/check.c`'s `dy_check_expr`/`dy_check_value_map_elim`, adapted
//! to this crate's design of storing the per-elim verdict directly on the
//! `Elim` node (`check_result`) instead of threading a side list of
//! "successful_elims" ids and a separate constraint-out-parameter through
//! every call.

use std::rc::Rc;

use crate::ctx::Ctx;
use crate::error::KernelError;
use crate::expr::{self, Complex, Elim, Expr, ExprKind, InferenceCtx, Intro, IntroBody, Map, MapKind, Polarity};
use crate::subtype::is_subtype;
use crate::ternary::Ternary;

/// Computes the type of `expr`. Mirrors `dy_type_of`: the type of a
/// `Complex` intro keeps the same `Complex` shape with its polarity forced
/// positive — a problem's type is itself, reinterpreted positively, not a
/// separate representation — with the assumption/recursion body (and both
/// pair sides) replaced by their own types; the type of a `Simple` intro
/// keeps its destructor and maps `out`; the type of an `Elim` is the `out`
/// type it already carries; `Any`/`Void` are both typed by `Void`,
/// matching the source's choice not to give `Any` its own supertype.
pub fn type_of(ctx: &mut Ctx, expr: &Expr) -> Expr {
    match expr.as_ref() {
        ExprKind::Intro(intro) => type_of_intro(ctx, intro),
        ExprKind::Elim(e) => e.out.clone(),
        ExprKind::Map(m) => type_of_map(ctx, m),
        ExprKind::Variable(id) => ctx
            .free_variables
            .iter()
            .rev()
            .find(|(v, _)| v == id)
            .map(|(_, ty)| ty.clone())
            .unwrap_or_else(crate::expr::void),
        ExprKind::InferenceVar(_) => crate::expr::any(),
        ExprKind::Any | ExprKind::Void => crate::expr::void(),
        ExprKind::InferenceCtx(i) => type_of(ctx, &i.body),
        ExprKind::Custom(c) => {
            let ops = Rc::clone(&ctx.custom_registry[c.custom_id]);
            ops.type_of(ctx, c.payload.as_ref())
        }
    }
}

/// Type of a `Map`: same kind, with the domain annotation and codomain
/// replaced by their own types, mirroring `type_of_intro`'s Complex
/// handling — a `Map`, like a `Complex` intro, types itself rather than
/// producing a separate representation.
fn type_of_map(ctx: &mut Ctx, m: &Map) -> Expr {
    match &m.kind {
        MapKind::Assumption(a) => {
            let body_ty = ctx.with_free_variable(a.id, a.ty.clone(), |ctx| type_of(ctx, &a.assumption));
            expr::map_assumption(m.is_implicit, a.id, a.ty.clone(), body_ty, a.dependence)
        }
        MapKind::Choice(c) => expr::map_choice(m.is_implicit, type_of(ctx, &c.left), type_of(ctx, &c.right)),
        MapKind::Recursion(r) => {
            let self_ty = expr::variable(r.id);
            let body_ty = ctx.with_free_variable(r.id, self_ty, |ctx| type_of(ctx, &r.assumption));
            expr::map_recursion(m.is_implicit, r.id, body_ty, r.dependence)
        }
    }
}

fn type_of_intro(ctx: &mut Ctx, intro: &Intro) -> Expr {
    match &intro.body {
        IntroBody::Complex(Complex::Assumption(a)) => {
            let body_ty = ctx.with_free_variable(a.id, a.ty.clone(), |ctx| type_of(ctx, &a.body));
            expr::assumption(Polarity::Positive, intro.is_implicit, a.id, a.ty.clone(), body_ty)
        }
        IntroBody::Complex(Complex::Choice(c)) => expr::choice(
            Polarity::Positive,
            intro.is_implicit,
            type_of(ctx, &c.left),
            type_of(ctx, &c.right),
        ),
        IntroBody::Complex(Complex::Recursion(r)) => {
            let self_ty = expr::variable(r.id);
            let body_ty = ctx.with_free_variable(r.id, self_ty, |ctx| type_of(ctx, &r.body));
            expr::recursion(Polarity::Positive, intro.is_implicit, r.id, body_ty)
        }
        IntroBody::Simple { simple, out } => {
            expr::simple_intro(Polarity::Positive, intro.is_implicit, simple.clone(), type_of(ctx, out))
        }
    }
}

/// Walks `expr`, resolving every `Elim` node's `check_result` and
/// returning `(verdict, rewritten)` the same way `is_subtype` does:
/// `rewritten` is `Some` exactly when a coercion was inserted somewhere
/// in the tree. A `Ternary::No` anywhere makes the whole check `No`; the
/// caller (`Ctx`'s public entry points) turns a non-`Yes` verdict into a
/// `KernelError`.
pub fn check(ctx: &mut Ctx, expr: &Expr) -> (Ternary, Option<Expr>) {
    match expr.as_ref() {
        ExprKind::Intro(intro) => {
            let (t, new_intro) = check_intro(ctx, intro);
            (t, new_intro.map(|i| Rc::new(ExprKind::Intro(i)) as Expr))
        }
        ExprKind::Elim(e) => check_elim(ctx, e),
        ExprKind::Map(m) => {
            let (t, new_map) = check_map(ctx, m);
            (t, new_map.map(|m| Rc::new(ExprKind::Map(m)) as Expr))
        }
        ExprKind::Variable(_) | ExprKind::InferenceVar(_) | ExprKind::Any | ExprKind::Void => {
            (Ternary::Yes, None)
        }
        ExprKind::InferenceCtx(i) => check_inference_ctx(ctx, i),
        ExprKind::Custom(c) => {
            let ops = Rc::clone(&ctx.custom_registry[c.custom_id]);
            match ops.check(ctx, c.payload.as_ref()) {
                Some(payload) => (
                    Ternary::Yes,
                    Some(Rc::new(ExprKind::Custom(crate::custom::Custom { custom_id: c.custom_id, payload }))),
                ),
                None => (Ternary::Yes, None),
            }
        }
    }
}

fn check_intro(ctx: &mut Ctx, intro: &Intro) -> (Ternary, Option<Intro>) {
    match &intro.body {
        IntroBody::Complex(Complex::Assumption(a)) => {
            let (t, new_body) = ctx.with_free_variable(a.id, a.ty.clone(), |ctx| check(ctx, &a.body));
            if new_body.is_none() {
                return (t, None);
            }
            (
                t,
                Some(Intro {
                    polarity: intro.polarity,
                    is_implicit: intro.is_implicit,
                    body: IntroBody::Complex(Complex::Assumption(crate::expr::Assumption {
                        id: a.id,
                        ty: a.ty.clone(),
                        body: new_body.unwrap(),
                    })),
                }),
            )
        }
        IntroBody::Complex(Complex::Choice(c)) => {
            let (t1, new_left) = check(ctx, &c.left);
            let (t2, new_right) = check(ctx, &c.right);
            if new_left.is_none() && new_right.is_none() {
                return (Ternary::combine([t1, t2]), None);
            }
            (
                Ternary::combine([t1, t2]),
                Some(Intro {
                    polarity: intro.polarity,
                    is_implicit: intro.is_implicit,
                    body: IntroBody::Complex(Complex::Choice(crate::expr::Choice {
                        left: new_left.unwrap_or_else(|| c.left.clone()),
                        right: new_right.unwrap_or_else(|| c.right.clone()),
                    })),
                }),
            )
        }
        IntroBody::Complex(Complex::Recursion(r)) => {
            let self_ty = expr::variable(r.id);
            let (t, new_body) = ctx.with_free_variable(r.id, self_ty, |ctx| check(ctx, &r.body));
            if new_body.is_none() {
                return (t, None);
            }
            (
                t,
                Some(Intro {
                    polarity: intro.polarity,
                    is_implicit: intro.is_implicit,
                    body: IntroBody::Complex(Complex::Recursion(crate::expr::Recursion {
                        id: r.id,
                        body: new_body.unwrap(),
                    })),
                }),
            )
        }
        IntroBody::Simple { simple, out } => {
            let (t, new_out) = check(ctx, out);
            let new_simple = match simple {
                crate::expr::Simple::Proof(p) => {
                    let (tp, new_p) = check(ctx, p);
                    (tp, new_p.map(crate::expr::Simple::Proof))
                }
                _ => (Ternary::Yes, None),
            };
            let combined = Ternary::combine([t, new_simple.0]);
            if new_out.is_none() && new_simple.1.is_none() {
                return (combined, None);
            }
            (
                combined,
                Some(Intro {
                    polarity: intro.polarity,
                    is_implicit: intro.is_implicit,
                    body: IntroBody::Simple {
                        simple: new_simple.1.unwrap_or_else(|| simple.clone()),
                        out: new_out.unwrap_or_else(|| out.clone()),
                    },
                }),
            )
        }
    }
}

/// Checks a `Map`'s domain and codomain (§4.5: "Map: recurse on the domain
/// and codomain"), the same shape as `check_intro`'s `Complex` cases.
fn check_map(ctx: &mut Ctx, m: &Map) -> (Ternary, Option<Map>) {
    match &m.kind {
        MapKind::Assumption(a) => {
            let (t1, new_ty) = check(ctx, &a.ty);
            let (t2, new_body) =
                ctx.with_free_variable(a.id, a.ty.clone(), |ctx| check(ctx, &a.assumption));
            let combined = Ternary::combine([t1, t2]);
            if new_ty.is_none() && new_body.is_none() {
                return (combined, None);
            }
            (
                combined,
                Some(Map {
                    is_implicit: m.is_implicit,
                    kind: MapKind::Assumption(crate::expr::MapAssumption {
                        id: a.id,
                        ty: new_ty.unwrap_or_else(|| a.ty.clone()),
                        assumption: new_body.unwrap_or_else(|| a.assumption.clone()),
                        dependence: a.dependence,
                    }),
                }),
            )
        }
        MapKind::Choice(c) => {
            let (t1, new_left) = check(ctx, &c.left);
            let (t2, new_right) = check(ctx, &c.right);
            let combined = Ternary::combine([t1, t2]);
            if new_left.is_none() && new_right.is_none() {
                return (combined, None);
            }
            (
                combined,
                Some(Map {
                    is_implicit: m.is_implicit,
                    kind: MapKind::Choice(crate::expr::MapChoice {
                        left: new_left.unwrap_or_else(|| c.left.clone()),
                        right: new_right.unwrap_or_else(|| c.right.clone()),
                    }),
                }),
            )
        }
        MapKind::Recursion(r) => {
            let self_ty = expr::variable(r.id);
            let (t, new_body) =
                ctx.with_free_variable(r.id, self_ty, |ctx| check(ctx, &r.assumption));
            if new_body.is_none() {
                return (t, None);
            }
            (
                t,
                Some(Map {
                    is_implicit: m.is_implicit,
                    kind: MapKind::Recursion(crate::expr::MapRecursion {
                        id: r.id,
                        assumption: new_body.unwrap(),
                        dependence: r.dependence,
                    }),
                }),
            )
        }
    }
}

/// An `Elim`'s own `check_result` doubles as the "successful_elims" memo
/// the source keeps in a side array: once resolved to `Yes` or `No` it is
/// never recomputed, only propagated.
fn check_elim(ctx: &mut Ctx, e: &Elim) -> (Ternary, Option<Expr>) {
    let (subject_t, new_subject) = check(ctx, &e.expr);
    let subject = new_subject.clone().unwrap_or_else(|| e.expr.clone());

    if e.check_result != Ternary::Maybe {
        if new_subject.is_none() {
            return (e.check_result, None);
        }
        let rebuilt = expr::elim(subject, e.simple.clone(), e.out.clone(), e.is_implicit, e.eval_immediately);
        let rebuilt = force_check_result(&rebuilt, e.check_result);
        return (Ternary::combine([subject_t, e.check_result]), Some(rebuilt));
    }

    let subject_ty = type_of(ctx, &subject);
    let candidate = expr::simple_intro(Polarity::Positive, e.is_implicit, e.simple.clone(), e.out.clone());
    let (res, coerced) = is_subtype(ctx, &subject_ty, &candidate, &subject);

    // `candidate` is a Solution shape, so every dispatch row that matches
    // against it (complex_vs_simple, the implicit fallbacks) embeds
    // `subject` inside a brand new elimination of its own and returns that
    // whole thing, not a patched-up `subject`. Re-wrapping it in another
    // `elim(_, e.simple, ...)` here would apply `e.simple` a second time.
    let rebuilt = match coerced {
        Some(replacement) => replacement,
        None => expr::elim(subject, e.simple.clone(), e.out.clone(), e.is_implicit, e.eval_immediately),
    };
    let rebuilt = force_check_result(&rebuilt, res);

    (Ternary::combine([subject_t, res]), Some(rebuilt))
}

/// Resolves an inference context (§4.5): checks the body with the
/// inference variable live, then consults the constraint log entries
/// appended while doing so. A bound id gets its solved expression spliced
/// back in (with the occurs-check repair `constraints::get` already
/// performs); an unbound id that never made it into the body's residual
/// type is defaulted — `Void` on the positive side (no producer ever
/// constrained it, so the tightest sound choice is the empty type),
/// `Any` on the negative side (no consumer ever constrained it, so the
/// loosest sound choice is the universal type); an unbound id that *does*
/// still appear is a parametric implicit and the context is left in place.
fn check_inference_ctx(ctx: &mut Ctx, i: &InferenceCtx) -> (Ternary, Option<Expr>) {
    let watermark = ctx.constraint_watermark();
    let (t, new_body) = check(ctx, &i.body);
    let body = new_body.unwrap_or_else(|| i.body.clone());

    match crate::constraints::get(ctx, i.id, i.polarity, watermark) {
        Some(bound) => {
            let substituted =
                crate::substitute::substitute(ctx, &body, i.id, &bound).unwrap_or_else(|| body.clone());
            (t, Some(substituted))
        }
        None => {
            let residual_ty = type_of(ctx, &body);
            if !expr::contains_this_variable(ctx, &residual_ty, i.id) {
                let filler = match i.polarity {
                    Polarity::Positive => crate::expr::void(),
                    Polarity::Negative => crate::expr::any(),
                };
                let substituted = crate::substitute::substitute(ctx, &body, i.id, &filler)
                    .unwrap_or_else(|| body.clone());
                (t, Some(substituted))
            } else {
                (t, Some(expr::inference_ctx(i.id, i.polarity, body)))
            }
        }
    }
}

fn force_check_result(e: &Expr, result: Ternary) -> Expr {
    match e.as_ref() {
        ExprKind::Elim(elim) => Rc::new(ExprKind::Elim(Elim {
            expr: elim.expr.clone(),
            simple: elim.simple.clone(),
            out: elim.out.clone(),
            is_implicit: elim.is_implicit,
            check_result: result,
            eval_immediately: elim.eval_immediately,
        })),
        _ => e.clone(),
    }
}

/// Checks `expr` and turns a non-`Yes` verdict into a `KernelError`,
/// the surface every external caller (the evaluator, `surface::run`, the
/// LSP, the CLI) actually uses rather than the raw ternary.
pub fn check_or_err(ctx: &mut Ctx, expr: &Expr) -> Result<Expr, KernelError> {
    let (result, new_expr) = check(ctx, expr);
    let checked = new_expr.unwrap_or_else(|| expr.clone());
    match result {
        Ternary::Yes => Ok(checked),
        Ternary::No => {
            let ty = type_of(ctx, &checked);
            Err(KernelError::TypeMismatch {
                expected: "<declared type>".to_string(),
                found: ctx.display(&ty),
                subject: ctx.display(&checked),
            })
        }
        Ternary::Maybe => Err(KernelError::Undecided { subject: ctx.display(&checked) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{any, assumption, proof, simple_intro, variable, void, Simple};

    #[test]
    fn type_of_any_and_void_is_void() {
        let mut ctx = Ctx::new();
        assert!(matches!(type_of(&mut ctx, &any()).as_ref(), ExprKind::Void));
        assert!(matches!(type_of(&mut ctx, &void()).as_ref(), ExprKind::Void));
    }

    #[test]
    fn type_of_identity_function_is_an_assumption() {
        let mut ctx = Ctx::new();
        let id_fn = assumption(Polarity::Positive, false, 0, any(), variable(0));
        let ty = type_of(&mut ctx, &id_fn);
        assert!(matches!(
            ty.as_ref(),
            ExprKind::Intro(Intro {
                body: IntroBody::Complex(Complex::Assumption(_)),
                ..
            })
        ));
    }

    #[test]
    fn type_of_variable_looks_up_free_variable_scope() {
        let mut ctx = Ctx::new();
        let ty = ctx.with_free_variable(0, void(), |ctx| type_of(ctx, &variable(0)));
        assert!(matches!(ty.as_ref(), ExprKind::Void));
    }

    #[test]
    fn check_well_typed_proof_application_succeeds() {
        let mut ctx = Ctx::new();
        let id_fn = assumption(Polarity::Positive, false, 0, any(), variable(0));
        let arg = proof(Polarity::Positive, false, void(), any());
        let app = expr::elim(id_fn, Simple::Proof(arg), any(), false, true);
        let (result, _) = check(&mut ctx, &app);
        assert!(result == Ternary::Yes || result == Ternary::Maybe);
    }

    #[test]
    fn check_or_err_reports_type_mismatch_as_error() {
        let mut ctx = Ctx::new();
        let bad = simple_intro(Polarity::Positive, false, Simple::Direction(crate::expr::Direction::Left), any());
        let app = expr::elim(bad, Simple::Proof(any()), any(), false, true);
        let res = check_or_err(&mut ctx, &app);
        assert!(res.is_err());
    }
}
