//! The mutable workspace threaded through every operation: the fresh-id
//! counter, the scoped stacks equality/substitution/subtyping push and pop,
//! the constraint log, and the custom-expression registry.

use std::rc::Rc;

use crate::custom::CustomOps;
use crate::expr::{Expr, Id};

/// A constraint on an inference variable: its known lower and/or upper
/// bound. Multiple entries sharing an `id` are permitted; `constraints::join`
/// merges them lazily.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub id: Id,
    pub lower: Option<Expr>,
    pub upper: Option<Expr>,
}

/// An entry on the coinductive termination stack guarding recursive subtype
/// calls: the two expressions being compared, and (once generated) the
/// variable id a future hit should substitute to close the proof.
#[derive(Clone, Debug)]
pub struct PastSubtypeCheck {
    pub subtype: Expr,
    pub supertype: Expr,
    pub substitute_var_id: Option<Id>,
}

/// Bounds that keep the evaluator and recursion unfolding total on
/// arbitrary input. See `duality_core::Limits`.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    pub max_reduction_steps: usize,
    pub max_recursion_unfoldings: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_reduction_steps: 1_000_000,
            max_recursion_unfoldings: 100_000,
        }
    }
}

pub struct Ctx {
    pub running_id: Id,
    pub free_variables: Vec<(Id, Expr)>,
    pub equal_variables: Vec<(Id, Id)>,
    pub past_subtype_checks: Vec<PastSubtypeCheck>,
    pub constraints: Vec<Constraint>,
    pub custom_registry: Vec<Rc<dyn CustomOps>>,
    pub limits: Limits,
    pub reduction_steps_taken: usize,
    pub recursion_unfoldings_taken: usize,
}

impl Ctx {
    pub fn new() -> Ctx {
        Ctx::new_with_limits(Limits::default())
    }

    pub fn new_with_limits(limits: Limits) -> Ctx {
        Ctx {
            running_id: 0,
            free_variables: Vec::new(),
            equal_variables: Vec::new(),
            past_subtype_checks: Vec::new(),
            constraints: Vec::new(),
            custom_registry: Vec::new(),
            limits,
            reduction_steps_taken: 0,
            recursion_unfoldings_taken: 0,
        }
    }

    /// Issues a fresh id, strictly greater than every id issued before it.
    pub fn fresh_id(&mut self) -> Id {
        let id = self.running_id;
        self.running_id += 1;
        id
    }

    pub fn register_custom(&mut self, ops: Rc<dyn CustomOps>) -> crate::custom::CustomId {
        self.custom_registry.push(ops);
        self.custom_registry.len() - 1
    }

    /// Pushes `(id, ty)` onto `free_variables` for the duration of `f`, then
    /// pops it. The scoped-acquisition idiom the source's raw push/pop
    /// pairs approximate by hand at every call site.
    pub fn with_free_variable<R>(&mut self, id: Id, ty: Expr, f: impl FnOnce(&mut Ctx) -> R) -> R {
        self.free_variables.push((id, ty));
        let result = f(self);
        self.free_variables.pop();
        result
    }

    /// Pushes `(id1, id2)` onto `equal_variables` for the duration of `f`.
    pub fn with_equal_variables<R>(&mut self, id1: Id, id2: Id, f: impl FnOnce(&mut Ctx) -> R) -> R {
        self.equal_variables.push((id1, id2));
        let result = f(self);
        self.equal_variables.pop();
        result
    }

    /// Looks up whether `id` has been aliased to another id by an enclosing
    /// alpha-renaming scope, consulting `equal_variables` in the `(bound,
    /// renamed)` direction substitution uses.
    pub fn renamed_variable(&self, id: Id) -> Option<Id> {
        self.equal_variables
            .iter()
            .rev()
            .find(|(id1, _)| *id1 == id)
            .map(|(_, id2)| *id2)
    }

    /// Looks up an alpha-equivalence pairing in either direction, the way
    /// `are_equal` consults the stack when comparing two variables.
    pub fn equal_variables_contains(&self, id1: Id, id2: Id) -> bool {
        self.equal_variables
            .iter()
            .any(|(a, b)| (*a == id1 && *b == id2) || (*a == id2 && *b == id1))
    }

    pub fn push_past_subtype_check(&mut self, entry: PastSubtypeCheck) {
        self.past_subtype_checks.push(entry);
    }

    pub fn pop_past_subtype_check(&mut self) {
        self.past_subtype_checks.pop();
    }

    /// Current watermark into the constraint log, to be paired with
    /// `constraints::free_starting_at` on a `No` branch.
    pub fn constraint_watermark(&self) -> usize {
        self.constraints.len()
    }

    /// Renders `expr` using the core's concrete syntax (see
    /// `expr::to_string`), threading `self` through for custom dispatch.
    pub fn display(&self, expr: &Expr) -> String {
        crate::expr::to_string(self, expr)
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Ctx::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_monotonic() {
        let mut ctx = Ctx::new();
        let a = ctx.fresh_id();
        let b = ctx.fresh_id();
        assert!(b > a);
    }

    #[test]
    fn equal_variables_scoped_push_pop() {
        let mut ctx = Ctx::new();
        assert!(!ctx.equal_variables_contains(1, 2));
        ctx.with_equal_variables(1, 2, |ctx| {
            assert!(ctx.equal_variables_contains(1, 2));
            assert!(ctx.equal_variables_contains(2, 1));
        });
        assert!(!ctx.equal_variables_contains(1, 2));
    }

    #[test]
    fn free_variable_scope_pops_on_exit() {
        let mut ctx = Ctx::new();
        let ty = crate::expr::any();
        ctx.with_free_variable(0, ty, |ctx| {
            assert_eq!(ctx.free_variables.len(), 1);
        });
        assert_eq!(ctx.free_variables.len(), 0);
    }
}
