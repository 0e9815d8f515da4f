//! The kernel's error taxonomy (§7): every fallible public entry point
//! returns `Result<_, KernelError>` rather than the original's bare `bool`
//! success flag plus a side channel of `fprintf`-to-stderr diagnostics.

use std::fmt;

/// Everything that can go wrong inside the kernel once parsing and
/// elaboration (out of scope here) have handed it a term to check,
/// evaluate, or compare. Carries pre-rendered strings rather than `Expr`
/// itself: rendering needs a `Ctx` for custom-node dispatch, and by the
/// time an error is being constructed the caller already has one at hand,
/// so callers render with `ctx.display(..)` at the error site.
#[derive(Clone, Debug)]
pub enum KernelError {
    /// `is_subtype`/`check` rejected a term outright (`Ternary::No`) rather
    /// than deferring (`Maybe`).
    TypeMismatch { expected: String, found: String, subject: String },

    /// A `check_result` on an `Elim` node never resolved past `Maybe` —
    /// neither accepted nor rejected, typically because it depends on an
    /// unresolved inference variable or free variable.
    Undecided { subject: String },

    /// Evaluation got stuck on a destructor applied to a value that is not
    /// the matching introduction form (e.g. `Unfold` applied to something
    /// that never reduced to a `Recursion`).
    StuckElimination { subject: String },

    /// `eval` performed more reduction steps than `Limits::max_reduction_steps`
    /// permits.
    StepLimitExceeded { limit: usize },

    /// Unfolding a recursive type/term exceeded `Limits::max_recursion_unfoldings`.
    RecursionLimitExceeded { limit: usize },

    /// A custom expression's vtable reported a failure of its own.
    Custom(String),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::TypeMismatch { expected, found, subject } => {
                write!(f, "type mismatch: expected `{expected}`, found `{found}` (checking `{subject}`)")
            }
            KernelError::Undecided { subject } => write!(f, "could not decide a check on `{subject}`"),
            KernelError::StuckElimination { subject } => write!(f, "stuck elimination on `{subject}`"),
            KernelError::StepLimitExceeded { limit } => write!(f, "exceeded the reduction step limit ({limit})"),
            KernelError::RecursionLimitExceeded { limit } => {
                write!(f, "exceeded the recursion unfolding limit ({limit})")
            }
            KernelError::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for KernelError {}
