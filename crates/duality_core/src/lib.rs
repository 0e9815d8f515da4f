//! Duality Core: a polarity-aware dependent type checker kernel.
//!
//! # Core Insight
//!
//! Every assumption, choice, and recursion carries an explicit polarity: a
//! positive occurrence introduces (a producer), a negative occurrence
//! eliminates (a consumer). Subtyping, equality, and checking all key off
//! this polarity rather than off a fixed notion of "function" or "pair" —
//! [`expr::Complex`] generalizes both through the same three shapes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      check / eval                           │
//! │   type_of, check_or_err, eval (weak-head normal form)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//! ┌─────────────────────────┐   ┌─────────────────────────────┐
//! │        subtype          │   │          equality            │
//! │  ternary, transforming  │   │  alpha-equivalence            │
//! └─────────────────────────┘   └─────────────────────────────┘
//!               │                             │
//!               └──────────────┬──────────────┘
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              constraints / substitute / ctx                 │
//! │   inference variable bounds, capture-avoiding substitution   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         expr / custom                       │
//! │        the nine-variant core IR, extensible via Custom        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Public API
//!
//! - [`Ctx`] / [`Limits`] — the mutable workspace and its resource bounds
//! - [`check::type_of`] / [`check::check_or_err`] — the check pass
//! - [`eval::eval`] — reduction to weak-head normal form
//! - [`subtype::is_subtype`] — the ternary, transforming subtype engine
//! - [`KernelError`] — everything that can go wrong once a term reaches the kernel
//!
//! Parsing and elaboration from surface syntax are out of scope: callers
//! hand this crate `Expr` trees already built, via [`surface`] or directly
//! through the `expr` constructors.

pub mod check;
pub mod constraints;
pub mod ctx;
pub mod custom;
pub mod equality;
pub mod error;
pub mod eval;
pub mod expr;
pub mod subtype;
pub mod substitute;
pub mod surface;
pub mod ternary;

pub use check::{check, check_or_err, type_of};
pub use ctx::{Constraint, Ctx, Limits, PastSubtypeCheck};
pub use error::KernelError;
pub use eval::eval;
pub use expr::{Expr, ExprKind, Id, Polarity};
pub use subtype::is_subtype;
pub use ternary::Ternary;
