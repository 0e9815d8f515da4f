//! Capture-avoiding substitution. Every function returns `Option<Expr>`:
//! `None` means the subtree is unchanged and the caller should keep its
//! original (retained) copy rather than pay for a rebuild — the
//! return-`None`-to-signal-unchanged protocol the whole kernel relies on
//! to avoid copying untouched subtrees.

use std::rc::Rc;

use crate::ctx::Ctx;
use crate::expr::{
    self, Assumption, Choice, Complex, Elim, ExprKind, Id, Intro, IntroBody, Map, MapAssumption,
    MapChoice, MapKind, MapRecursion, Recursion, Simple,
};
use crate::expr::Expr;

/// `substitute(ctx, expr, id, sub)` — replaces free occurrences of `id` in
/// `expr` with `sub`. Returns `None` when `id` does not occur free (the
/// caller keeps its existing reference to `expr`).
pub fn substitute(ctx: &mut Ctx, expr: &Expr, id: Id, sub: &Expr) -> Option<Expr> {
    match expr.as_ref() {
        ExprKind::Intro(intro) => substitute_intro(ctx, intro, id, sub).map(|i| Rc::new(ExprKind::Intro(i))),
        ExprKind::Elim(e) => substitute_elim(ctx, e, id, sub).map(|e| Rc::new(ExprKind::Elim(e))),
        ExprKind::Map(m) => substitute_map(ctx, m, id, sub).map(|m| Rc::new(ExprKind::Map(m))),
        ExprKind::Variable(v) => substitute_var_id(ctx, *v, id, sub, expr::variable as fn(Id) -> Expr),
        ExprKind::InferenceVar(v) => {
            substitute_var_id(ctx, *v, id, sub, expr::inference_var as fn(Id) -> Expr)
        }
        ExprKind::Any | ExprKind::Void => None,
        ExprKind::InferenceCtx(i) => {
            if id == i.id {
                return None;
            }
            substitute(ctx, &i.body, id, sub).map(|body| {
                expr::inference_ctx(i.id, i.polarity, body)
            })
        }
        ExprKind::Custom(c) => {
            let ops = Rc::clone(&ctx.custom_registry[c.custom_id]);
            ops.substitute(ctx, c.payload.as_ref(), id, sub).map(|payload| {
                Rc::new(ExprKind::Custom(crate::custom::Custom {
                    custom_id: c.custom_id,
                    payload,
                }))
            })
        }
    }
}

fn substitute_var_id(_ctx: &Ctx, v: Id, id: Id, sub: &Expr, _ctor: fn(Id) -> Expr) -> Option<Expr> {
    if v == id {
        return Some(Rc::clone(sub));
    }
    _ctx.renamed_variable(v).map(_ctor)
}

/// When entering a binder `bound_id` that differs from the substitution
/// target `id`: if `bound_id` would capture a free variable of `sub`,
/// rename the binder to a fresh id and push the renaming onto
/// `equal_variables` for the scope of the recursive substitution.
fn enter_binder<R>(
    ctx: &mut Ctx,
    bound_id: Id,
    id: Id,
    sub: &Expr,
    f: impl FnOnce(&mut Ctx, Id) -> Option<R>,
) -> Option<(Id, R)> {
    if id == bound_id {
        return None;
    }
    if expr::contains_this_variable(ctx, sub, bound_id) {
        let fresh = ctx.fresh_id();
        let result = ctx.with_equal_variables(bound_id, fresh, |ctx| f(ctx, id));
        result.map(|r| (fresh, r))
    } else {
        f(ctx, id).map(|r| (bound_id, r))
    }
}

fn substitute_intro(ctx: &mut Ctx, intro: &Intro, id: Id, sub: &Expr) -> Option<Intro> {
    let body = match &intro.body {
        IntroBody::Complex(Complex::Assumption(a)) => {
            substitute_assumption(ctx, a, id, sub).map(|a| IntroBody::Complex(Complex::Assumption(a)))
        }
        IntroBody::Complex(Complex::Choice(c)) => {
            substitute_choice(ctx, c, id, sub).map(|c| IntroBody::Complex(Complex::Choice(c)))
        }
        IntroBody::Complex(Complex::Recursion(r)) => {
            substitute_recursion(ctx, r, id, sub).map(|r| IntroBody::Complex(Complex::Recursion(r)))
        }
        IntroBody::Simple { simple, out } => {
            let simple_new = substitute_simple(ctx, simple, id, sub);
            let out_new = substitute(ctx, out, id, sub);
            if simple_new.is_none() && out_new.is_none() {
                None
            } else {
                Some(IntroBody::Simple {
                    simple: simple_new.unwrap_or_else(|| simple.clone()),
                    out: out_new.unwrap_or_else(|| Rc::clone(out)),
                })
            }
        }
    };
    body.map(|body| Intro {
        polarity: intro.polarity,
        is_implicit: intro.is_implicit,
        body,
    })
}

fn substitute_simple(ctx: &mut Ctx, simple: &Simple, id: Id, sub: &Expr) -> Option<Simple> {
    match simple {
        Simple::Proof(p) => substitute(ctx, p, id, sub).map(Simple::Proof),
        Simple::Direction(_) | Simple::Unfold | Simple::Unwrap => None,
    }
}

fn substitute_assumption(ctx: &mut Ctx, a: &Assumption, id: Id, sub: &Expr) -> Option<Assumption> {
    let ty_new = substitute(ctx, &a.ty, id, sub);
    let entered = enter_binder(ctx, a.id, id, sub, |ctx, id| substitute(ctx, &a.body, id, sub));
    match entered {
        Some((new_id, body_new)) => Some(Assumption {
            id: new_id,
            ty: ty_new.unwrap_or_else(|| Rc::clone(&a.ty)),
            body: body_new.unwrap_or_else(|| Rc::clone(&a.body)),
        }),
        None => ty_new.map(|ty| Assumption {
            id: a.id,
            ty,
            body: Rc::clone(&a.body),
        }),
    }
}

fn substitute_choice(ctx: &mut Ctx, c: &Choice, id: Id, sub: &Expr) -> Option<Choice> {
    let left_new = substitute(ctx, &c.left, id, sub);
    let right_new = substitute(ctx, &c.right, id, sub);
    if left_new.is_none() && right_new.is_none() {
        return None;
    }
    Some(Choice {
        left: left_new.unwrap_or_else(|| Rc::clone(&c.left)),
        right: right_new.unwrap_or_else(|| Rc::clone(&c.right)),
    })
}

fn substitute_recursion(ctx: &mut Ctx, r: &Recursion, id: Id, sub: &Expr) -> Option<Recursion> {
    if id == r.id {
        return None;
    }
    let entered = enter_binder(ctx, r.id, id, sub, |ctx, id| substitute(ctx, &r.body, id, sub));
    entered.map(|(new_id, body)| Recursion { id: new_id, body })
}

fn substitute_elim(ctx: &mut Ctx, e: &Elim, id: Id, sub: &Expr) -> Option<Elim> {
    let expr_new = substitute(ctx, &e.expr, id, sub);
    let simple_new = substitute_simple(ctx, &e.simple, id, sub);
    let out_new = substitute(ctx, &e.out, id, sub);
    if expr_new.is_none() && simple_new.is_none() && out_new.is_none() {
        return None;
    }
    Some(Elim {
        expr: expr_new.unwrap_or_else(|| Rc::clone(&e.expr)),
        simple: simple_new.unwrap_or_else(|| e.simple.clone()),
        out: out_new.unwrap_or_else(|| Rc::clone(&e.out)),
        is_implicit: e.is_implicit,
        check_result: e.check_result,
        eval_immediately: e.eval_immediately,
    })
}

fn substitute_map(ctx: &mut Ctx, m: &Map, id: Id, sub: &Expr) -> Option<Map> {
    let kind = match &m.kind {
        MapKind::Assumption(a) => substitute_map_assumption(ctx, a, id, sub).map(MapKind::Assumption),
        MapKind::Choice(c) => {
            let left_new = substitute(ctx, &c.left, id, sub);
            let right_new = substitute(ctx, &c.right, id, sub);
            if left_new.is_none() && right_new.is_none() {
                None
            } else {
                Some(MapKind::Choice(MapChoice {
                    left: left_new.unwrap_or_else(|| Rc::clone(&c.left)),
                    right: right_new.unwrap_or_else(|| Rc::clone(&c.right)),
                }))
            }
        }
        MapKind::Recursion(r) => substitute_map_recursion(ctx, r, id, sub).map(MapKind::Recursion),
    };
    kind.map(|kind| Map {
        is_implicit: m.is_implicit,
        kind,
    })
}

fn substitute_map_assumption(
    ctx: &mut Ctx,
    a: &MapAssumption,
    id: Id,
    sub: &Expr,
) -> Option<MapAssumption> {
    let ty_new = substitute(ctx, &a.ty, id, sub);
    let entered = enter_binder(ctx, a.id, id, sub, |ctx, id| {
        substitute(ctx, &a.assumption, id, sub)
    });
    match entered {
        Some((new_id, assumption_new)) => Some(MapAssumption {
            id: new_id,
            ty: ty_new.unwrap_or_else(|| Rc::clone(&a.ty)),
            assumption: assumption_new.unwrap_or_else(|| Rc::clone(&a.assumption)),
            dependence: a.dependence,
        }),
        None => ty_new.map(|ty| MapAssumption {
            id: a.id,
            ty,
            assumption: Rc::clone(&a.assumption),
            dependence: a.dependence,
        }),
    }
}

fn substitute_map_recursion(ctx: &mut Ctx, r: &MapRecursion, id: Id, sub: &Expr) -> Option<MapRecursion> {
    if id == r.id {
        return None;
    }
    let entered = enter_binder(ctx, r.id, id, sub, |ctx, id| {
        substitute(ctx, &r.assumption, id, sub)
    });
    entered.map(|(new_id, assumption)| MapRecursion {
        id: new_id,
        assumption,
        dependence: r.dependence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{any, assumption, variable, void, Polarity};

    #[test]
    fn substituting_free_variable_replaces_it() {
        let mut ctx = Ctx::new();
        let e = variable(0);
        let sub = void();
        let result = substitute(&mut ctx, &e, 0, &sub).expect("id 0 occurs free");
        assert!(matches!(result.as_ref(), ExprKind::Void));
    }

    #[test]
    fn substituting_absent_id_is_none() {
        let mut ctx = Ctx::new();
        let e = variable(1);
        let sub = void();
        assert!(substitute(&mut ctx, &e, 0, &sub).is_none());
    }

    #[test]
    fn substitute_identity_is_none() {
        // substitute(e, id, Variable(id)) == None for any e, id.
        let mut ctx = Ctx::new();
        let e = assumption(Polarity::Positive, false, 5, any(), variable(5));
        let sub = variable(0);
        assert!(substitute(&mut ctx, &e, 0, &sub).is_none());
    }

    #[test]
    fn substitution_stops_at_shadowing_binder() {
        let mut ctx = Ctx::new();
        // fun $0 : Any => $0 -- substituting id 0 must not touch the bound
        // occurrence, since the binder shadows it.
        let e = assumption(Polarity::Positive, false, 0, any(), variable(0));
        let sub = void();
        assert!(substitute(&mut ctx, &e, 0, &sub).is_none());
    }

    #[test]
    fn substitution_renames_to_avoid_capture() {
        let mut ctx = Ctx::new();
        ctx.running_id = 3; // ids 0..2 already issued by the hand-built expr below
        // fun $1 : Any => $2, substitute $2 := $1 (free). The binder id 1
        // occurs free in the substitution, so it must be renamed.
        let e = assumption(Polarity::Positive, false, 1, any(), variable(2));
        let sub = variable(1);
        let result = substitute(&mut ctx, &e, 2, &sub).expect("id 2 occurs free");
        match result.as_ref() {
            ExprKind::Intro(Intro {
                body: IntroBody::Complex(Complex::Assumption(a)),
                ..
            }) => {
                assert_ne!(a.id, 1, "binder should have been renamed away from the captured id");
                match a.body.as_ref() {
                    ExprKind::Variable(v) => assert_eq!(*v, 1, "body should now reference the substituted id"),
                    other => panic!("expected Variable, got {:?}", other),
                }
            }
            other => panic!("expected Intro assumption, got {:?}", other),
        }
    }
}
