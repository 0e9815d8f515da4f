//! String literals, implemented as one concrete `Custom` instance rather
//! than a tenth `Expr` variant (per the B.5 supplement): the original's
//! `DY_CORE_EXPR_STRING`/`DY_CORE_EXPR_TYPE_OF_STRINGS` tags collapse into
//! a single registered vtable whose payload distinguishes a literal value
//! from the `String` type itself.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::ctx::Ctx;
use crate::custom::{Custom, CustomOps, CustomPayload};
use crate::expr::{Expr, Id, Polarity};
use crate::ternary::Ternary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralPayload {
    /// A string literal value, e.g. `'hi'` → `"hi"`.
    Value(String),
    /// The type every string literal belongs to, printed as `String`.
    Type,
}

impl CustomPayload for LiteralPayload {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for LiteralPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralPayload::Value(s) => write!(f, "\"{s}\""),
            LiteralPayload::Type => write!(f, "String"),
        }
    }
}

/// The literal vtable. Captures its own registry id so `type_of` can
/// build a `String`-typed `Custom` expr under the same id without the
/// `CustomOps` trait needing to thread the id through every method.
pub struct LiteralOps {
    custom_id: usize,
}

impl LiteralOps {
    /// Registers the literal vtable on `ctx` and returns its custom id.
    pub fn register(ctx: &mut Ctx) -> usize {
        let id = ctx.custom_registry.len();
        ctx.register_custom(Rc::new(LiteralOps { custom_id: id }));
        id
    }
}

/// Builds a literal-value `Expr` for `value`, registering the shared
/// vtable under `custom_id` (obtained once via `LiteralOps::register`).
pub fn value(custom_id: usize, value: impl Into<String>) -> Expr {
    Rc::new(crate::expr::ExprKind::Custom(Custom {
        custom_id,
        payload: Rc::new(LiteralPayload::Value(value.into())),
    }))
}

/// Builds the `String` type `Expr` under the same registered vtable.
pub fn string_type(custom_id: usize) -> Expr {
    Rc::new(crate::expr::ExprKind::Custom(Custom {
        custom_id,
        payload: Rc::new(LiteralPayload::Type),
    }))
}

fn downcast(payload: &dyn CustomPayload) -> &LiteralPayload {
    payload
        .as_any()
        .downcast_ref::<LiteralPayload>()
        .expect("literal vtable invoked with a non-literal payload")
}

impl CustomOps for LiteralOps {
    fn type_of(&self, _ctx: &mut Ctx, payload: &dyn CustomPayload) -> Expr {
        match downcast(payload) {
            LiteralPayload::Value(_) => string_type(self.custom_id),
            LiteralPayload::Type => crate::expr::any(),
        }
    }

    fn is_equal(&self, _ctx: &mut Ctx, a: &dyn CustomPayload, b: &dyn CustomPayload) -> Ternary {
        match (downcast(a), downcast(b)) {
            (LiteralPayload::Value(x), LiteralPayload::Value(y)) => {
                if x == y {
                    Ternary::Yes
                } else {
                    Ternary::No
                }
            }
            (LiteralPayload::Type, LiteralPayload::Type) => Ternary::Yes,
            _ => Ternary::No,
        }
    }

    fn check(&self, _ctx: &mut Ctx, _payload: &dyn CustomPayload) -> Option<Rc<dyn CustomPayload>> {
        None
    }

    fn remove_mentions_in_type(
        &self,
        _ctx: &mut Ctx,
        _payload: &dyn CustomPayload,
        _id: Id,
        _polarity: Polarity,
    ) -> Option<Rc<dyn CustomPayload>> {
        None
    }

    fn eval(&self, _ctx: &mut Ctx, _payload: &dyn CustomPayload) -> (bool, Option<Rc<dyn CustomPayload>>) {
        (true, None)
    }

    fn substitute(
        &self,
        _ctx: &mut Ctx,
        _payload: &dyn CustomPayload,
        _id: Id,
        _sub: &Expr,
    ) -> Option<Rc<dyn CustomPayload>> {
        None
    }

    fn is_subtype(
        &self,
        _ctx: &mut Ctx,
        a: &dyn CustomPayload,
        b: &dyn CustomPayload,
        subtype_expr: &Expr,
    ) -> (Ternary, Option<Expr>) {
        match (downcast(a), downcast(b)) {
            (LiteralPayload::Type, LiteralPayload::Type) => (Ternary::Yes, None),
            (LiteralPayload::Value(x), LiteralPayload::Value(y)) if x == y => (Ternary::Yes, None),
            _ => {
                let _ = subtype_expr;
                (Ternary::No, None)
            }
        }
    }

    fn contains_this_variable(&self, _ctx: &Ctx, _payload: &dyn CustomPayload, _id: Id) -> bool {
        false
    }

    fn variable_appears_in_polarity(
        &self,
        _ctx: &Ctx,
        _payload: &dyn CustomPayload,
        _id: Id,
        _polarity: Polarity,
    ) -> (bool, bool) {
        (false, false)
    }

    fn to_string(&self, _ctx: &Ctx, payload: &dyn CustomPayload) -> String {
        downcast(payload).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Ctx;

    #[test]
    fn identical_literals_are_equal() {
        let mut ctx = Ctx::new();
        let id = LiteralOps::register(&mut ctx);
        let a = value(id, "hi");
        let b = value(id, "hi");
        assert_eq!(crate::equality::are_equal(&mut ctx, &a, &b), Ternary::Yes);
    }

    #[test]
    fn distinct_literals_are_not_equal() {
        let mut ctx = Ctx::new();
        let id = LiteralOps::register(&mut ctx);
        let a = value(id, "hi");
        let b = value(id, "bye");
        assert_eq!(crate::equality::are_equal(&mut ctx, &a, &b), Ternary::No);
    }

    #[test]
    fn literal_type_of_is_subtype_of_string_type() {
        let mut ctx = Ctx::new();
        let id = LiteralOps::register(&mut ctx);
        let v = value(id, "hi");
        let ty = string_type(id);
        let subject_ty = crate::check::type_of(&mut ctx, &v);
        let (result, _) = crate::subtype::is_subtype(&mut ctx, &subject_ty, &ty, &v);
        assert_eq!(result, Ternary::Yes);
    }

    #[test]
    fn display_quotes_the_value() {
        let mut ctx = Ctx::new();
        let id = LiteralOps::register(&mut ctx);
        let v = value(id, "hi");
        assert_eq!(ctx.display(&v), "\"hi\"");
    }
}
