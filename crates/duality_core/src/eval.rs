//! The evaluator (§4.6): reduces a checked term to weak-head normal form
//! by interpreting `Elim` nodes whose `check_result` is not `No` and whose
//! `eval_immediately` flag is set, applying the matching destructor
//! (`Proof` against an `Assumption`, a `Direction` against a `Choice`,
//! `Unfold`/`Unwrap` against a `Recursion`) via substitution.
//!
//! Grounded on `core/src/eval.c`'s `dy_eval_expr` family; the separate
//! `successful_elims` memo and out-of-band constraint the source threads
//! through every call are replaced here by the `check_result` field
//! `check.rs` already resolved on each `Elim` node before evaluation runs.

use std::rc::Rc;

use crate::ctx::Ctx;
use crate::error::KernelError;
use crate::expr::{self, Complex, Direction, Expr, ExprKind, IntroBody, Simple};
use crate::substitute::substitute;
use crate::ternary::Ternary;

/// Reduces `expr` to weak-head normal form. Expects `expr` to already have
/// passed `check::check_or_err` — an `Elim` whose `check_result` is `No`
/// is treated as a logic error in the caller and reported rather than
/// silently skipped.
pub fn eval(ctx: &mut Ctx, expr: &Expr) -> Result<Expr, KernelError> {
    step(ctx)?;

    match expr.as_ref() {
        ExprKind::Intro(intro) => eval_intro(ctx, intro, expr),
        ExprKind::Elim(e) => eval_elim(ctx, e),
        // A bare `Map` is already a value: like an assumption or recursion
        // binder, nothing under it reduces until it is eliminated. The
        // point-wise "Elim of a Map with a compatible intro on the proof
        // side" rule (§4.6) — building the renamed pointwise application the
        // source's three map-elim helpers construct — has no counterpart in
        // this crate's elaborator (no AST form ever lowers to `ExprKind::Map`
        // here; see surface.rs) and is left unimplemented, same as
        // `subtype::implicit_sup_fallback`'s documented "not yet" stub: an
        // `Elim` whose subject reduces to `Map` falls through to `stuck`
        // below rather than guessing at a reduction rule nothing exercises.
        ExprKind::Map(_) | ExprKind::Variable(_) | ExprKind::InferenceVar(_) | ExprKind::Any | ExprKind::Void => {
            Ok(expr.clone())
        }
        ExprKind::InferenceCtx(i) => {
            let body = eval(ctx, &i.body)?;
            Ok(expr::inference_ctx(i.id, i.polarity, body))
        }
        ExprKind::Custom(c) => eval_custom(ctx, c, expr),
    }
}

fn step(ctx: &mut Ctx) -> Result<(), KernelError> {
    ctx.reduction_steps_taken += 1;
    if ctx.reduction_steps_taken > ctx.limits.max_reduction_steps {
        return Err(KernelError::StepLimitExceeded { limit: ctx.limits.max_reduction_steps });
    }
    Ok(())
}

fn eval_intro(ctx: &mut Ctx, intro: &crate::expr::Intro, original: &Expr) -> Result<Expr, KernelError> {
    match &intro.body {
        // Under a binder: nothing reduces without an argument in hand.
        IntroBody::Complex(Complex::Assumption(_)) | IntroBody::Complex(Complex::Recursion(_)) => {
            Ok(original.clone())
        }
        IntroBody::Complex(Complex::Choice(c)) => {
            let left = eval(ctx, &c.left)?;
            let right = eval(ctx, &c.right)?;
            Ok(expr::choice(intro.polarity, intro.is_implicit, left, right))
        }
        IntroBody::Simple { simple, out } => {
            let new_simple = match simple {
                Simple::Proof(p) => Simple::Proof(eval(ctx, p)?),
                other => other.clone(),
            };
            Ok(expr::simple_intro(intro.polarity, intro.is_implicit, new_simple, out.clone()))
        }
    }
}

fn eval_elim(ctx: &mut Ctx, e: &crate::expr::Elim) -> Result<Expr, KernelError> {
    if e.check_result == Ternary::No {
        let found_ty = crate::check::type_of(ctx, &e.expr);
        return Err(KernelError::TypeMismatch {
            expected: ctx.display(&e.out),
            found: ctx.display(&found_ty),
            subject: ctx.display(&e.expr),
        });
    }

    let subject = eval(ctx, &e.expr)?;

    if !e.eval_immediately {
        let new_simple = match &e.simple {
            Simple::Proof(p) => Simple::Proof(eval(ctx, p)?),
            other => other.clone(),
        };
        return Ok(stay_elim(subject, new_simple, e.out.clone(), e.is_implicit, e.check_result));
    }

    match (subject.as_ref(), &e.simple) {
        (ExprKind::Intro(intro), Simple::Proof(proof)) => {
            if let IntroBody::Complex(Complex::Assumption(a)) = &intro.body {
                let proof_value = eval(ctx, proof)?;
                let substituted = substitute(ctx, &a.body, a.id, &proof_value).unwrap_or_else(|| a.body.clone());
                eval(ctx, &substituted)
            } else {
                Err(stuck(ctx, &subject))
            }
        }
        (ExprKind::Intro(intro), Simple::Direction(dir)) => {
            if let IntroBody::Complex(Complex::Choice(c)) = &intro.body {
                let side = match dir {
                    Direction::Left => &c.left,
                    Direction::Right => &c.right,
                };
                eval(ctx, side)
            } else {
                Err(stuck(ctx, &subject))
            }
        }
        (ExprKind::Intro(intro), Simple::Unfold) | (ExprKind::Intro(intro), Simple::Unwrap) => {
            if let IntroBody::Complex(Complex::Recursion(r)) = &intro.body {
                ctx.recursion_unfoldings_taken += 1;
                if ctx.recursion_unfoldings_taken > ctx.limits.max_recursion_unfoldings {
                    return Err(KernelError::RecursionLimitExceeded { limit: ctx.limits.max_recursion_unfoldings });
                }
                let wrap = expr::recursion(intro.polarity, intro.is_implicit, r.id, r.body.clone());
                let unfolded = substitute(ctx, &r.body, r.id, &wrap).unwrap_or_else(|| wrap.clone());
                eval(ctx, &unfolded)
            } else {
                Err(stuck(ctx, &subject))
            }
        }
        // The subject is still neutral (a free variable, an unresolved
        // inference variable, or another stuck elimination): this whole
        // node is itself a value in normal form. If the verdict was left
        // `Maybe`, reduction may have changed the subject's type enough to
        // resolve it now, so re-enter the subtype engine rather than just
        // propagating the stale verdict forward.
        (ExprKind::Variable(_), _) | (ExprKind::InferenceVar(_), _) | (ExprKind::Elim(_), _) => {
            let new_simple = match &e.simple {
                Simple::Proof(p) => Simple::Proof(eval(ctx, p)?),
                other => other.clone(),
            };
            let resolved = if e.check_result == Ternary::Maybe {
                let subject_ty = crate::check::type_of(ctx, &subject);
                let candidate = expr::simple_intro(intro_polarity(), e.is_implicit, new_simple.clone(), e.out.clone());
                let (res, _) = crate::subtype::is_subtype(ctx, &subject_ty, &candidate, &subject);
                res
            } else {
                e.check_result
            };
            Ok(stay_elim(subject, new_simple, e.out.clone(), e.is_implicit, resolved))
        }
        _ => Err(stuck(ctx, &subject)),
    }
}

fn intro_polarity() -> crate::expr::Polarity {
    crate::expr::Polarity::Positive
}

fn stay_elim(subject: Expr, simple: Simple, out: Expr, is_implicit: bool, check_result: Ternary) -> Expr {
    let built = expr::elim(subject, simple, out, is_implicit, true);
    match built.as_ref() {
        ExprKind::Elim(elim) => Rc::new(ExprKind::Elim(crate::expr::Elim {
            expr: elim.expr.clone(),
            simple: elim.simple.clone(),
            out: elim.out.clone(),
            is_implicit: elim.is_implicit,
            check_result,
            eval_immediately: true,
        })),
        _ => built,
    }
}

fn stuck(ctx: &Ctx, subject: &Expr) -> KernelError {
    KernelError::StuckElimination { subject: ctx.display(subject) }
}

fn eval_custom(ctx: &mut Ctx, c: &crate::custom::Custom, original: &Expr) -> Result<Expr, KernelError> {
    let ops = Rc::clone(&ctx.custom_registry[c.custom_id]);
    let mut payload = c.payload.clone();
    loop {
        let (is_value, new_payload) = ops.eval(ctx, payload.as_ref());
        if let Some(p) = new_payload {
            payload = p;
        }
        if is_value {
            break;
        }
        step(ctx)?;
    }
    if Rc::ptr_eq(&payload, &c.payload) {
        Ok(original.clone())
    } else {
        Ok(Rc::new(ExprKind::Custom(crate::custom::Custom { custom_id: c.custom_id, payload })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{any, assumption, proof, variable, void, Elim, Polarity};

    fn with_check_result(e: &Expr, result: Ternary) -> Expr {
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

    #[test]
    fn identity_application_reduces_to_the_argument() {
        let mut ctx = Ctx::new();
        let id_fn = assumption(Polarity::Positive, false, 0, any(), variable(0));
        let arg = proof(Polarity::Positive, false, void(), any());
        let app = expr::elim(id_fn, Simple::Proof(arg.clone()), any(), false, true);
        let app = with_check_result(&app, Ternary::Yes);
        let result = eval(&mut ctx, &app).expect("identity application evaluates");
        assert!(matches!(result.as_ref(), ExprKind::Intro(_)));
    }

    #[test]
    fn choice_projection_picks_requested_side() {
        let mut ctx = Ctx::new();
        let c = expr::choice(Polarity::Positive, false, void(), any());
        let app = expr::elim(c, Simple::Direction(Direction::Left), void(), false, true);
        let app = with_check_result(&app, Ternary::Yes);
        let result = eval(&mut ctx, &app).expect("projection evaluates");
        assert!(matches!(result.as_ref(), ExprKind::Void));
    }

    #[test]
    fn elim_with_no_check_result_is_an_error() {
        let mut ctx = Ctx::new();
        let app = expr::elim(any(), Simple::Unfold, any(), false, true);
        let app = with_check_result(&app, Ternary::No);
        assert!(eval(&mut ctx, &app).is_err());
    }

    #[test]
    fn step_limit_is_enforced() {
        let mut ctx = Ctx::new_with_limits(crate::ctx::Limits { max_reduction_steps: 0, max_recursion_unfoldings: 10 });
        let result = eval(&mut ctx, &any());
        assert!(matches!(result, Err(KernelError::StepLimitExceeded { .. })));
    }
}
