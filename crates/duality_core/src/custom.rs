//! The "custom" expression slot: a registry id paired with an opaque
//! payload, dispatched through a trait object rather than a C vtable.
//! Registering a custom kind adds an entry to `Ctx::custom_registry`;
//! expressions carry the registry index, not the vtable itself.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::ctx::Ctx;
use crate::expr::{Expr, Id, Polarity};
use crate::ternary::Ternary;

pub mod literal;

/// Index into `Ctx::custom_registry`.
pub type CustomId = usize;

/// Opaque state carried by a custom node. Implementors are the data half
/// of the vtable/data split the source uses for its custom expressions.
pub trait CustomPayload: fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

/// A custom expression node: the registry id plus its payload.
#[derive(Clone, Debug)]
pub struct Custom {
    pub custom_id: CustomId,
    pub payload: Rc<dyn CustomPayload>,
}

/// The operations the rest of the kernel delegates to when it encounters a
/// custom node. `retain`/`release` from the source's twelve-method vtable
/// are omitted: `Rc::clone`/`Drop` are their compile-time-checked
/// equivalent here.
pub trait CustomOps {
    fn type_of(&self, ctx: &mut Ctx, payload: &dyn CustomPayload) -> Expr;

    fn is_equal(&self, ctx: &mut Ctx, a: &dyn CustomPayload, b: &dyn CustomPayload) -> Ternary;

    /// Returns `Some(new_payload)` when checking rewrote the payload.
    fn check(&self, ctx: &mut Ctx, payload: &dyn CustomPayload) -> Option<Rc<dyn CustomPayload>>;

    fn remove_mentions_in_type(
        &self,
        ctx: &mut Ctx,
        payload: &dyn CustomPayload,
        id: Id,
        polarity: Polarity,
    ) -> Option<Rc<dyn CustomPayload>>;

    /// Returns `(is_value, changed?)`.
    fn eval(&self, ctx: &mut Ctx, payload: &dyn CustomPayload) -> (bool, Option<Rc<dyn CustomPayload>>);

    fn substitute(
        &self,
        ctx: &mut Ctx,
        payload: &dyn CustomPayload,
        id: Id,
        sub: &Expr,
    ) -> Option<Rc<dyn CustomPayload>>;

    fn is_subtype(
        &self,
        ctx: &mut Ctx,
        a: &dyn CustomPayload,
        b: &dyn CustomPayload,
        subtype_expr: &Expr,
    ) -> (Ternary, Option<Expr>);

    fn contains_this_variable(&self, ctx: &Ctx, payload: &dyn CustomPayload, id: Id) -> bool;

    fn variable_appears_in_polarity(
        &self,
        ctx: &Ctx,
        payload: &dyn CustomPayload,
        id: Id,
        polarity: Polarity,
    ) -> (bool, bool);

    fn to_string(&self, ctx: &Ctx, payload: &dyn CustomPayload) -> String;
}

pub(crate) fn custom_contains_this_variable(ctx: &Ctx, custom: &Custom, id: Id) -> bool {
    let ops = Rc::clone(&ctx.custom_registry[custom.custom_id]);
    ops.contains_this_variable(ctx, custom.payload.as_ref(), id)
}

pub(crate) fn custom_variable_appears_in_polarity(
    ctx: &Ctx,
    custom: &Custom,
    id: Id,
    polarity: Polarity,
) -> (bool, bool) {
    let ops = Rc::clone(&ctx.custom_registry[custom.custom_id]);
    ops.variable_appears_in_polarity(ctx, custom.payload.as_ref(), id, polarity)
}

pub(crate) fn custom_to_string(ctx: &Ctx, custom: &Custom) -> String {
    let ops = Rc::clone(&ctx.custom_registry[custom.custom_id]);
    ops.to_string(ctx, custom.payload.as_ref())
}
