//! The boundary with an AST→Core translator (§6 Elaboration input).
//!
//! Parsing surface syntax is out of scope for this crate: [`Ast`] names the
//! shape a translator hands across the boundary, and [`Elaborate`] is the
//! trait such a translator implements. Neither is implemented here. What
//! *is* here are builders that construct Core trees directly, following the
//! translator's own lowering rules, so that callers without a parser (the
//! test suite, the LSP's placeholder hover) can still produce valid Core.

use crate::ctx::Ctx;
use crate::expr::{self, Direction, Expr, Id, Polarity, Simple};

/// A surface-level AST node, as handed to [`Elaborate::elaborate`] by a
/// translator. Mirrors the variant list the boundary is specified over:
/// variable, function, recursion, list, do-block, string, string-type, any,
/// void, juxtaposition, simple, and the three `map-*` shapes. Field shapes
/// are deliberately loose (`String` names rather than resolved scopes) —
/// resolving names to ids is the translator's job, not this crate's.
#[derive(Clone, Debug)]
pub enum Ast {
    Variable(String),
    Function {
        param: String,
        implicit: bool,
        ty: Option<Box<Ast>>,
        body: Box<Ast>,
    },
    Recursion {
        name: String,
        body: Box<Ast>,
    },
    List(Vec<Ast>),
    Either(Vec<Ast>),
    Do(Vec<DoStmt>),
    String(String),
    StringType,
    Any,
    Void,
    Juxtaposition(Box<Ast>, Box<Ast>),
    Simple(SimpleAst),
    MapSome(Box<Ast>),
    MapEither(Box<Ast>),
    MapFin(Box<Ast>),
}

/// One statement inside a `do` block: either a bare expression (evaluated
/// and discarded except as the block's final value) or a `let`/`def`
/// binding that scopes over the remaining statements.
#[derive(Clone, Debug)]
pub enum DoStmt {
    Expr(Ast),
    Let { name: String, value: Ast },
    Def { name: String, value: Ast },
}

/// A destructor reaching across the boundary: a proof term, a choice
/// direction, or a recursion unfold/unwrap tag.
#[derive(Clone, Debug)]
pub enum SimpleAst {
    Proof(Box<Ast>),
    Direction(Direction),
    Unfold,
    Unwrap,
}

/// Implemented by an AST→Core translator. Not implemented in this crate —
/// surface parsing lives upstream of the kernel. Lowering follows the
/// rules fixed at the boundary:
/// - each binder receives a freshly allocated id;
/// - each implicit or untyped binder is wrapped in an inference context
///   with a fresh inference id and negative polarity for the type;
/// - `Juxtaposition` becomes `Elim` with `check_result = Maybe` and an out
///   type that is either supplied or an inference variable;
/// - `List` with `N` elements lowers to right-associated positive pairs;
///   `Either` lowers to right-associated negative pairs;
/// - `Do` block sugar lowers into nested function application / solution
///   chains, with `let`/`def` producing an immediately-applied binder.
pub trait Elaborate {
    fn elaborate(&self, ctx: &mut Ctx, ast: &Ast) -> Expr;
}

/// Test-only builders. These construct Core directly, following the same
/// lowering rules an `Elaborate` impl would apply, without going through
/// an `Ast` — useful for exercising the kernel end to end without a parser.
pub mod build {
    use super::*;

    /// `do { Void }` with no bindings: the empty do-block's elaboration.
    pub fn empty_do() -> Expr {
        expr::void()
    }

    /// `fun $id : ty => body(id)`, allocating a fresh binder id.
    pub fn fun(ctx: &mut Ctx, ty: Expr, body: impl FnOnce(Id) -> Expr) -> Expr {
        let id = ctx.fresh_id();
        expr::assumption(Polarity::Positive, false, id, ty, body(id))
    }

    /// An implicit binder with an unconstrained type: `fun @ $id : ?inf => ...`,
    /// wrapped in the inference context the boundary's lowering rule
    /// requires for implicit/untyped binders.
    pub fn implicit_fun(ctx: &mut Ctx, body: impl FnOnce(Id, Expr) -> Expr) -> Expr {
        let inf_id = ctx.fresh_id();
        let bind_id = ctx.fresh_id();
        let ty = expr::inference_var(inf_id);
        let inner = expr::assumption(Polarity::Positive, true, bind_id, ty.clone(), body(bind_id, ty));
        expr::inference_ctx(inf_id, Polarity::Negative, inner)
    }

    /// `func arg : out`, the lowering of `Juxtaposition` — an `Elim` whose
    /// `check_result` starts `Maybe`, resolved later by `check::check`.
    pub fn juxtapose(func: Expr, arg: Expr, out: Expr) -> Expr {
        expr::elim(func, Simple::Proof(arg), out, false, true)
    }

    /// `subject Left` / `subject Right`, the lowering of a choice projection.
    pub fn project(subject: Expr, direction: Direction, out: Expr) -> Expr {
        expr::elim(subject, Simple::Direction(direction), out, false, true)
    }

    /// `let $id : ty = value; body(id)` — sugar the boundary lowers into an
    /// immediately-applied function, matching a `do`-block `let`/`def`.
    pub fn let_in(ctx: &mut Ctx, ty: Expr, value: Expr, out: Expr, body: impl FnOnce(Id) -> Expr) -> Expr {
        let binder = fun(ctx, ty, body);
        juxtapose(binder, value, out)
    }

    /// A two-element `list { left, right }`: a positive pair.
    pub fn list2(left: Expr, right: Expr) -> Expr {
        expr::choice(Polarity::Positive, false, left, right)
    }

    /// A two-element `either { left, right }`: a negative pair.
    pub fn either2(left: Expr, right: Expr) -> Expr {
        expr::choice(Polarity::Negative, false, left, right)
    }

    /// `inf $id = body(id)`, a positive recursion binder.
    pub fn recursion_def(ctx: &mut Ctx, body: impl FnOnce(Id) -> Expr) -> Expr {
        let id = ctx.fresh_id();
        expr::recursion(Polarity::Positive, false, id, body(id))
    }
}

#[cfg(test)]
mod tests {
    use super::build::*;
    use super::*;
    use crate::ctx::Ctx;
    use crate::expr::ExprKind;

    #[test]
    fn empty_do_is_void() {
        assert!(matches!(empty_do().as_ref(), ExprKind::Void));
    }

    #[test]
    fn let_in_applies_an_immediate_function() {
        let mut ctx = Ctx::new();
        let value = expr::void();
        let built = let_in(&mut ctx, expr::any(), value, expr::any(), |id| expr::variable(id));
        match built.as_ref() {
            ExprKind::Elim(e) => assert!(matches!(e.simple, Simple::Proof(_))),
            _ => panic!("expected an Elim"),
        }
    }

    #[test]
    fn implicit_fun_wraps_an_inference_context() {
        let mut ctx = Ctx::new();
        let built = implicit_fun(&mut ctx, |id, _ty| expr::variable(id));
        assert!(matches!(built.as_ref(), ExprKind::InferenceCtx(_)));
    }

    #[test]
    fn list2_is_a_positive_choice() {
        let built = list2(expr::void(), expr::any());
        match built.as_ref() {
            ExprKind::Intro(intro) => assert_eq!(intro.polarity, Polarity::Positive),
            _ => panic!("expected an Intro"),
        }
    }
}
