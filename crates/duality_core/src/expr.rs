//! Core expression algebra: a tagged sum over nine variants, held by shared
//! ownership so that recursive positions are cheap to copy and a tree can
//! be referenced from several places (a constraint bound, a context stack
//! entry, a returned value) without cloning its contents.

use std::fmt;
use std::rc::Rc;

use crate::custom::Custom;

/// Globally unique identifier for a binder, issued from `Ctx::running_id`.
/// Fresh ids are always strictly greater than every id previously observed.
pub type Id = u64;

/// An expression is a reference-counted, immutable node. Cloning an `Expr`
/// is the "retain" of the source; dropping the last clone is "release".
/// There is no explicit retain/release API here — `Rc::clone`/`Drop` are
/// the compile-time-checked equivalent the source's manual bookkeeping
/// exists to approximate by hand in C.
pub type Expr = Rc<ExprKind>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn flip(self) -> Polarity {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => write!(f, "+"),
            Polarity::Negative => write!(f, "-"),
        }
    }
}

/// Which side of a `Choice` an elimination selects.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Left,
    Right,
}

/// The destructor half of a Simple intro, or the eliminator of an Elim node.
#[derive(Clone, Debug)]
pub enum Simple {
    /// A proof term of the assumption's domain type.
    Proof(Expr),
    Direction(Direction),
    Unfold,
    Unwrap,
}

impl Simple {
    /// True when `self` and `other` are the same destructor shape
    /// (both proofs, both the same direction, both Unfold, both Unwrap) —
    /// ignoring the payload of `Proof`. Used to short-circuit equality
    /// checks before comparing payloads.
    pub fn structurally_matches(&self, other: &Simple) -> bool {
        matches!(
            (self, other),
            (Simple::Proof(_), Simple::Proof(_))
                | (Simple::Direction(Direction::Left), Simple::Direction(Direction::Left))
                | (Simple::Direction(Direction::Right), Simple::Direction(Direction::Right))
                | (Simple::Unfold, Simple::Unfold)
                | (Simple::Unwrap, Simple::Unwrap)
        )
    }
}

#[derive(Clone, Debug)]
pub struct Assumption {
    pub id: Id,
    pub ty: Expr,
    pub body: Expr,
}

#[derive(Clone, Debug)]
pub struct Choice {
    pub left: Expr,
    pub right: Expr,
}

#[derive(Clone, Debug)]
pub struct Recursion {
    pub id: Id,
    pub body: Expr,
}

#[derive(Clone, Debug)]
pub enum Complex {
    Assumption(Assumption),
    Choice(Choice),
    Recursion(Recursion),
}

#[derive(Clone, Debug)]
pub enum IntroBody {
    Complex(Complex),
    /// A simple intro: the destructor plus the expected/observed
    /// continuation type ("out").
    Simple { simple: Simple, out: Expr },
}

#[derive(Clone, Debug)]
pub struct Intro {
    pub polarity: Polarity,
    pub is_implicit: bool,
    pub body: IntroBody,
}

#[derive(Clone, Debug)]
pub struct Elim {
    pub expr: Expr,
    pub simple: Simple,
    pub out: Expr,
    pub is_implicit: bool,
    pub check_result: crate::ternary::Ternary,
    pub eval_immediately: bool,
}

/// Tracks whether the codomain of a map actually depends on the bound
/// variable. The source computes this to pick a cheaper evaluation path;
/// here it is carried but not load-bearing for correctness, so `NotChecked`
/// is always a safe, conservative answer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dependence {
    NotChecked,
    Dependent,
    Independent,
}

#[derive(Clone, Debug)]
pub struct MapAssumption {
    pub id: Id,
    pub ty: Expr,
    pub assumption: Expr,
    pub dependence: Dependence,
}

#[derive(Clone, Debug)]
pub struct MapChoice {
    pub left: Expr,
    pub right: Expr,
}

#[derive(Clone, Debug)]
pub struct MapRecursion {
    pub id: Id,
    pub assumption: Expr,
    pub dependence: Dependence,
}

#[derive(Clone, Debug)]
pub enum MapKind {
    Assumption(MapAssumption),
    Choice(MapChoice),
    Recursion(MapRecursion),
}

#[derive(Clone, Debug)]
pub struct Map {
    pub is_implicit: bool,
    pub kind: MapKind,
}

#[derive(Clone, Debug)]
pub struct InferenceCtx {
    pub id: Id,
    pub polarity: Polarity,
    pub body: Expr,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Intro(Intro),
    Elim(Elim),
    Map(Map),
    Variable(Id),
    InferenceVar(Id),
    Any,
    Void,
    InferenceCtx(InferenceCtx),
    Custom(Custom),
}

pub fn intro(polarity: Polarity, is_implicit: bool, body: IntroBody) -> Expr {
    Rc::new(ExprKind::Intro(Intro {
        polarity,
        is_implicit,
        body,
    }))
}

pub fn assumption(polarity: Polarity, is_implicit: bool, id: Id, ty: Expr, body: Expr) -> Expr {
    intro(
        polarity,
        is_implicit,
        IntroBody::Complex(Complex::Assumption(Assumption { id, ty, body })),
    )
}

pub fn choice(polarity: Polarity, is_implicit: bool, left: Expr, right: Expr) -> Expr {
    intro(
        polarity,
        is_implicit,
        IntroBody::Complex(Complex::Choice(Choice { left, right })),
    )
}

pub fn recursion(polarity: Polarity, is_implicit: bool, id: Id, body: Expr) -> Expr {
    intro(
        polarity,
        is_implicit,
        IntroBody::Complex(Complex::Recursion(Recursion { id, body })),
    )
}

pub fn simple_intro(polarity: Polarity, is_implicit: bool, simple: Simple, out: Expr) -> Expr {
    intro(polarity, is_implicit, IntroBody::Simple { simple, out })
}

pub fn proof(polarity: Polarity, is_implicit: bool, value: Expr, out: Expr) -> Expr {
    simple_intro(polarity, is_implicit, Simple::Proof(value), out)
}

pub fn elim(expr: Expr, simple: Simple, out: Expr, is_implicit: bool, eval_immediately: bool) -> Expr {
    Rc::new(ExprKind::Elim(Elim {
        expr,
        simple,
        out,
        is_implicit,
        check_result: crate::ternary::Ternary::Maybe,
        eval_immediately,
    }))
}

pub fn variable(id: Id) -> Expr {
    Rc::new(ExprKind::Variable(id))
}

pub fn inference_var(id: Id) -> Expr {
    Rc::new(ExprKind::InferenceVar(id))
}

pub fn any() -> Expr {
    Rc::new(ExprKind::Any)
}

pub fn void() -> Expr {
    Rc::new(ExprKind::Void)
}

pub fn inference_ctx(id: Id, polarity: Polarity, body: Expr) -> Expr {
    Rc::new(ExprKind::InferenceCtx(InferenceCtx { id, polarity, body }))
}

pub fn map(is_implicit: bool, kind: MapKind) -> Expr {
    Rc::new(ExprKind::Map(Map { is_implicit, kind }))
}

pub fn map_assumption(is_implicit: bool, id: Id, ty: Expr, assumption: Expr, dependence: Dependence) -> Expr {
    map(
        is_implicit,
        MapKind::Assumption(MapAssumption { id, ty, assumption, dependence }),
    )
}

pub fn map_choice(is_implicit: bool, left: Expr, right: Expr) -> Expr {
    map(is_implicit, MapKind::Choice(MapChoice { left, right }))
}

pub fn map_recursion(is_implicit: bool, id: Id, assumption: Expr, dependence: Dependence) -> Expr {
    map(is_implicit, MapKind::Recursion(MapRecursion { id, assumption, dependence }))
}

/// `true` if `expr`'s free variables include `id`. Descends through every
/// binder, skipping the bound scope the way the source's
/// `dy_core_expr_contains_this_variable` does.
pub fn contains_this_variable(ctx: &crate::ctx::Ctx, expr: &Expr, id: Id) -> bool {
    match expr.as_ref() {
        ExprKind::Variable(v) | ExprKind::InferenceVar(v) => *v == id,
        ExprKind::Any | ExprKind::Void => false,
        ExprKind::Intro(intro) => match &intro.body {
            IntroBody::Complex(Complex::Assumption(a)) => {
                contains_this_variable(ctx, &a.ty, id)
                    || (a.id != id && contains_this_variable(ctx, &a.body, id))
            }
            IntroBody::Complex(Complex::Choice(c)) => {
                contains_this_variable(ctx, &c.left, id) || contains_this_variable(ctx, &c.right, id)
            }
            IntroBody::Complex(Complex::Recursion(r)) => {
                r.id != id && contains_this_variable(ctx, &r.body, id)
            }
            IntroBody::Simple { simple, out } => {
                simple_contains_this_variable(ctx, simple, id) || contains_this_variable(ctx, out, id)
            }
        },
        ExprKind::Elim(e) => {
            contains_this_variable(ctx, &e.expr, id)
                || simple_contains_this_variable(ctx, &e.simple, id)
                || contains_this_variable(ctx, &e.out, id)
        }
        ExprKind::Map(m) => match &m.kind {
            MapKind::Assumption(a) => {
                contains_this_variable(ctx, &a.ty, id)
                    || (a.id != id && contains_this_variable(ctx, &a.assumption, id))
            }
            MapKind::Choice(c) => {
                contains_this_variable(ctx, &c.left, id) || contains_this_variable(ctx, &c.right, id)
            }
            MapKind::Recursion(r) => r.id != id && contains_this_variable(ctx, &r.assumption, id),
        },
        ExprKind::InferenceCtx(i) => i.id != id && contains_this_variable(ctx, &i.body, id),
        ExprKind::Custom(c) => crate::custom::custom_contains_this_variable(ctx, c, id),
    }
}

fn simple_contains_this_variable(ctx: &crate::ctx::Ctx, simple: &Simple, id: Id) -> bool {
    match simple {
        Simple::Proof(p) => contains_this_variable(ctx, p, id),
        Simple::Direction(_) | Simple::Unfold | Simple::Unwrap => false,
    }
}

/// Reports whether `id` appears free in a covariant (first) and/or
/// contravariant (second) position, given the polarity the traversal is
/// currently under.
pub fn variable_appears_in_polarity(
    ctx: &crate::ctx::Ctx,
    expr: &Expr,
    id: Id,
    current_polarity: Polarity,
) -> (bool, bool) {
    match expr.as_ref() {
        ExprKind::Variable(v) | ExprKind::InferenceVar(v) => {
            if *v != id {
                (false, false)
            } else if current_polarity == Polarity::Positive {
                (true, false)
            } else {
                (false, true)
            }
        }
        ExprKind::Any | ExprKind::Void => (false, false),
        ExprKind::Intro(intro) => match &intro.body {
            IntroBody::Complex(Complex::Assumption(a)) => {
                let (p1, n1) = variable_appears_in_polarity(ctx, &a.ty, id, current_polarity.flip());
                let (p2, n2) = if a.id == id {
                    (false, false)
                } else {
                    variable_appears_in_polarity(ctx, &a.body, id, current_polarity)
                };
                (p1 || p2, n1 || n2)
            }
            IntroBody::Complex(Complex::Choice(c)) => {
                let (p1, n1) = variable_appears_in_polarity(ctx, &c.left, id, current_polarity);
                let (p2, n2) = variable_appears_in_polarity(ctx, &c.right, id, current_polarity);
                (p1 || p2, n1 || n2)
            }
            IntroBody::Complex(Complex::Recursion(r)) => {
                if r.id == id {
                    (false, false)
                } else {
                    variable_appears_in_polarity(ctx, &r.body, id, current_polarity)
                }
            }
            IntroBody::Simple { simple, out } => {
                let (p1, n1) = match simple {
                    Simple::Proof(p) => variable_appears_in_polarity(ctx, p, id, current_polarity),
                    _ => (false, false),
                };
                let (p2, n2) = variable_appears_in_polarity(ctx, out, id, current_polarity);
                (p1 || p2, n1 || n2)
            }
        },
        ExprKind::Elim(e) => {
            let (p1, n1) = variable_appears_in_polarity(ctx, &e.expr, id, current_polarity);
            let (p2, n2) = match &e.simple {
                Simple::Proof(p) => variable_appears_in_polarity(ctx, p, id, current_polarity),
                _ => (false, false),
            };
            let (p3, n3) = variable_appears_in_polarity(ctx, &e.out, id, current_polarity);
            (p1 || p2 || p3, n1 || n2 || n3)
        }
        ExprKind::Map(m) => match &m.kind {
            MapKind::Assumption(a) => {
                let (p1, n1) = variable_appears_in_polarity(ctx, &a.ty, id, current_polarity.flip());
                let (p2, n2) = if a.id == id {
                    (false, false)
                } else {
                    variable_appears_in_polarity(ctx, &a.assumption, id, current_polarity)
                };
                (p1 || p2, n1 || n2)
            }
            MapKind::Choice(c) => {
                let (p1, n1) = variable_appears_in_polarity(ctx, &c.left, id, current_polarity);
                let (p2, n2) = variable_appears_in_polarity(ctx, &c.right, id, current_polarity);
                (p1 || p2, n1 || n2)
            }
            MapKind::Recursion(r) => {
                if r.id == id {
                    (false, false)
                } else {
                    variable_appears_in_polarity(ctx, &r.assumption, id, current_polarity)
                }
            }
        },
        ExprKind::InferenceCtx(i) => {
            if i.id == id {
                (false, false)
            } else {
                variable_appears_in_polarity(ctx, &i.body, id, current_polarity)
            }
        }
        ExprKind::Custom(c) => {
            crate::custom::custom_variable_appears_in_polarity(ctx, c, id, current_polarity)
        }
    }
}

/// Renders `expr` in the core's fixed concrete syntax. Takes `ctx` (rather
/// than being a plain `Display` impl) because custom nodes dispatch their
/// own `to_string` through the registry `ctx` owns — matching the
/// original's `dy_core_expr_to_string(ctx, expr)` signature.
pub fn to_string(ctx: &crate::ctx::Ctx, expr: &Expr) -> String {
    match expr.as_ref() {
        ExprKind::Intro(intro) => fmt_intro(ctx, intro),
        ExprKind::Elim(e) => {
            let mut s = format!("({}) {}", to_string(ctx, &e.expr), fmt_simple_tag(ctx, &e.simple));
            s.push_str(" : ");
            if e.is_implicit {
                s.push_str("$$ ");
            }
            match e.check_result {
                crate::ternary::Ternary::No => s.push_str("FAIL "),
                crate::ternary::Ternary::Maybe => s.push_str("MAYBE "),
                crate::ternary::Ternary::Yes => {}
            }
            s.push_str(&to_string(ctx, &e.out));
            s
        }
        ExprKind::Map(m) => fmt_map(ctx, m),
        ExprKind::Variable(id) => format!("${}", id),
        ExprKind::InferenceVar(id) => format!("?{}", id),
        ExprKind::Any => "Any".to_string(),
        ExprKind::Void => "Void".to_string(),
        ExprKind::InferenceCtx(i) => format!("[INFER {}{}] {}", i.id, i.polarity, to_string(ctx, &i.body)),
        ExprKind::Custom(c) => crate::custom::custom_to_string(ctx, c),
    }
}

fn fmt_simple_tag(ctx: &crate::ctx::Ctx, simple: &Simple) -> String {
    match simple {
        Simple::Proof(p) => to_string(ctx, p),
        Simple::Direction(Direction::Left) => "L".to_string(),
        Simple::Direction(Direction::Right) => "R".to_string(),
        Simple::Unfold => "Unfold".to_string(),
        Simple::Unwrap => "Unwrap".to_string(),
    }
}

fn fmt_intro(ctx: &crate::ctx::Ctx, intro: &Intro) -> String {
    let at = if intro.is_implicit { "@" } else { "" };
    match &intro.body {
        IntroBody::Complex(Complex::Assumption(a)) => {
            let keyword = if intro.polarity == Polarity::Positive {
                "fun"
            } else {
                "some"
            };
            format!(
                "{}{} ${} : {} => {}",
                keyword,
                at,
                a.id,
                to_string(ctx, &a.ty),
                to_string(ctx, &a.body)
            )
        }
        IntroBody::Complex(Complex::Choice(c)) => {
            let keyword = if intro.polarity == Polarity::Positive {
                "list"
            } else {
                "either"
            };
            format!(
                "{}{} {{ {}, {} }}",
                keyword,
                at,
                to_string(ctx, &c.left),
                to_string(ctx, &c.right)
            )
        }
        IntroBody::Complex(Complex::Recursion(r)) => {
            let keyword = if intro.polarity == Polarity::Positive {
                "inf"
            } else {
                "fin"
            };
            format!("{}{} ${} = {}", keyword, at, r.id, to_string(ctx, &r.body))
        }
        IntroBody::Simple { simple, out } => {
            let arrow = match (intro.polarity, intro.is_implicit) {
                (Polarity::Positive, false) => "->",
                (Polarity::Negative, false) => "~>",
                (Polarity::Positive, true) => "@->",
                (Polarity::Negative, true) => "@~>",
            };
            format!("({} {} {})", fmt_simple_tag(ctx, simple), arrow, to_string(ctx, out))
        }
    }
}

fn fmt_map(ctx: &crate::ctx::Ctx, map: &Map) -> String {
    let at = if map.is_implicit { "@" } else { "" };
    match &map.kind {
        MapKind::Assumption(a) => format!(
            "map{} fun ${} : {} => {}",
            at,
            a.id,
            to_string(ctx, &a.ty),
            to_string(ctx, &a.assumption)
        ),
        MapKind::Choice(c) => format!(
            "map{} list {{ {}, {} }}",
            at,
            to_string(ctx, &c.left),
            to_string(ctx, &c.right)
        ),
        MapKind::Recursion(r) => format!("map{} inf ${} = {}", at, r.id, to_string(ctx, &r.assumption)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Ctx;

    #[test]
    fn variable_contains_itself() {
        let ctx = Ctx::new();
        let v = variable(0);
        assert!(contains_this_variable(&ctx, &v, 0));
        assert!(!contains_this_variable(&ctx, &v, 1));
    }

    #[test]
    fn assumption_shadows_bound_id() {
        let ctx = Ctx::new();
        let body = variable(0);
        let a = assumption(Polarity::Positive, false, 0, any(), body);
        // id 0 is bound by the assumption, so it does not count as free.
        assert!(!contains_this_variable(&ctx, &a, 0));
    }

    #[test]
    fn assumption_type_is_free() {
        let ctx = Ctx::new();
        let a = assumption(Polarity::Positive, false, 1, variable(0), void());
        assert!(contains_this_variable(&ctx, &a, 0));
    }

    #[test]
    fn display_void_and_any() {
        let ctx = Ctx::new();
        assert_eq!(to_string(&ctx, &void()), "Void");
        assert_eq!(to_string(&ctx, &any()), "Any");
    }

    #[test]
    fn display_assumption_uses_fun_and_some() {
        let ctx = Ctx::new();
        let pos = assumption(Polarity::Positive, false, 0, any(), variable(0));
        assert_eq!(to_string(&ctx, &pos), "fun $0 : Any => $0");

        let neg = assumption(Polarity::Negative, false, 0, any(), variable(0));
        assert_eq!(to_string(&ctx, &neg), "some $0 : Any => $0");
    }

    #[test]
    fn variable_polarity_in_contravariant_position() {
        let ctx = Ctx::new();
        // fun x : (x refers to id 7) => Void -- the domain type is checked
        // contravariantly, so a mention there flips to negative.
        let a = assumption(Polarity::Positive, false, 0, variable(7), void());
        let (pos, neg) = variable_appears_in_polarity(&ctx, &a, 7, Polarity::Positive);
        assert!(!pos);
        assert!(neg);
    }
}
