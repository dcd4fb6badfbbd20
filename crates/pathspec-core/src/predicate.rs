//! # Predicates and Expected Values
//!
//! An option's expected value is either a literal [`Value`] compared by
//! the option's own literal rule, or a caller-supplied [`Predicate`] that
//! judges the fetched actual value and describes its own expectation.
//! The engine never inspects a predicate beyond those two methods.
//!
//! The constructors in this module cover the common cases (`contains`,
//! ordering comparisons, `one_of`, `not`); [`from_fn`] wraps any closure.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::value::Value;

/// An external judgement over an actual attribute value.
///
/// Implementations must be `Send + Sync`: specifications holding them are
/// shared across threads and evaluated concurrently.
pub trait Predicate: Send + Sync {
    /// Returns `true` if `actual` satisfies the expectation.
    fn matches(&self, actual: &Value) -> bool;

    /// Describes the expectation, completing the sentence
    /// "expected size to ...", e.g. `be > 100`.
    fn describe(&self) -> String;
}

/// The expected value of one option constraint.
#[derive(Clone)]
pub enum Expected {
    Literal(Value),
    Predicate(Arc<dyn Predicate>),
}

impl Expected {
    /// Wrap a predicate implementation.
    pub fn predicate(p: impl Predicate + 'static) -> Self {
        Self::Predicate(Arc::new(p))
    }

    /// Human-readable form used in descriptions: the literal's quoted
    /// rendering or the predicate's description.
    pub fn describe(&self) -> String {
        match self {
            Self::Literal(v) => v.to_string(),
            Self::Predicate(p) => p.describe(),
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Predicate(_) => None,
        }
    }
}

impl fmt::Debug for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::Predicate(p) => f.debug_tuple("Predicate").field(&p.describe()).finish(),
        }
    }
}

impl<T: Into<Value>> From<T> for Expected {
    fn from(v: T) -> Self {
        Self::Literal(v.into())
    }
}

/// A predicate defined by a closure and a fixed description.
pub struct FnPredicate<F> {
    description: String,
    f: F,
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn matches(&self, actual: &Value) -> bool {
        (self.f)(actual)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Build a predicate from a description and a closure.
///
/// ```
/// use pathspec_core::predicate::from_fn;
/// let even = from_fn("be even", |v| v.as_integer().is_some_and(|i| i % 2 == 0));
/// assert_eq!(even.describe(), "be even");
/// ```
pub fn from_fn<F>(description: impl Into<String>, f: F) -> Expected
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Expected::predicate(FnPredicate {
        description: description.into(),
        f,
    })
}

/// Matches text containing a substring, a document object containing
/// every given key/value pair, or a document array containing an element.
#[derive(Debug, Clone)]
pub struct Contains(Value);

impl Predicate for Contains {
    fn matches(&self, actual: &Value) -> bool {
        match (actual, &self.0) {
            (Value::Text(haystack), Value::Text(needle)) => haystack.contains(needle.as_str()),
            (Value::Document(doc), Value::Document(needle)) => document_includes(doc, needle),
            (Value::Document(serde_json::Value::Array(items)), Value::Text(s)) => {
                items.iter().any(|i| i.as_str() == Some(s.as_str()))
            }
            _ => false,
        }
    }

    fn describe(&self) -> String {
        format!("include {}", self.0)
    }
}

fn document_includes(doc: &serde_json::Value, needle: &serde_json::Value) -> bool {
    use serde_json::Value as Json;

    match (doc, needle) {
        (Json::Object(actual), Json::Object(expected)) => expected
            .iter()
            .all(|(k, v)| actual.get(k).is_some_and(|a| a == v)),
        (Json::Array(items), Json::Array(expected)) => {
            expected.iter().all(|e| items.contains(e))
        }
        (Json::Array(items), other) => items.contains(other),
        _ => false,
    }
}

/// Build a [`Contains`] predicate.
pub fn contains(needle: impl Into<Value>) -> Expected {
    Expected::predicate(Contains(needle.into()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ordering {
    Gt,
    Ge,
    Lt,
    Le,
}

impl Ordering {
    fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }

    fn holds<T: PartialOrd>(self, actual: &T, bound: &T) -> bool {
        match self {
            Self::Gt => actual > bound,
            Self::Ge => actual >= bound,
            Self::Lt => actual < bound,
            Self::Le => actual <= bound,
        }
    }
}

/// Ordering comparison against an integer or timestamp bound.
#[derive(Debug, Clone)]
pub struct Compare {
    op: Ordering,
    bound: Value,
}

impl Predicate for Compare {
    fn matches(&self, actual: &Value) -> bool {
        match (actual, &self.bound) {
            (Value::Integer(a), Value::Integer(b)) => self.op.holds(a, b),
            (Value::Time(a), Value::Time(b)) => self.op.holds(a, b),
            _ => false,
        }
    }

    fn describe(&self) -> String {
        format!("be {} {}", self.op.symbol(), self.bound)
    }
}

fn compare(op: Ordering, bound: Value) -> Expected {
    Expected::predicate(Compare { op, bound })
}

/// Actual must be greater than `bound`.
pub fn gt(bound: impl Into<Value>) -> Expected {
    compare(Ordering::Gt, bound.into())
}

/// Actual must be greater than or equal to `bound`.
pub fn ge(bound: impl Into<Value>) -> Expected {
    compare(Ordering::Ge, bound.into())
}

/// Actual must be less than `bound`.
pub fn lt(bound: impl Into<Value>) -> Expected {
    compare(Ordering::Lt, bound.into())
}

/// Actual must be less than or equal to `bound`.
pub fn le(bound: impl Into<Value>) -> Expected {
    compare(Ordering::Le, bound.into())
}

/// Actual timestamp must fall inside `[start, end]`.
pub fn within(start: DateTime<Utc>, end: DateTime<Utc>) -> Expected {
    let description = format!(
        "be within {} and {}",
        Value::Time(start),
        Value::Time(end)
    );
    from_fn(description, move |actual| {
        actual.as_time().is_some_and(|t| *t >= start && *t <= end)
    })
}

/// Actual must equal one of the given values.
#[derive(Debug, Clone)]
pub struct OneOf(Vec<Value>);

impl Predicate for OneOf {
    fn matches(&self, actual: &Value) -> bool {
        self.0.iter().any(|candidate| candidate == actual)
    }

    fn describe(&self) -> String {
        let items: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        format!("be one of [{}]", items.join(", "))
    }
}

/// Build a [`OneOf`] predicate.
pub fn one_of<I, V>(candidates: I) -> Expected
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Expected::predicate(OneOf(candidates.into_iter().map(Into::into).collect()))
}

/// Text actual must match the regular expression.
///
/// Unlike a `Pattern` literal, usable on any text-valued option
/// (owner, target, ...).
pub fn matches_pattern(re: Regex) -> Expected {
    let description = format!("match {}", Value::Pattern(re.clone()));
    from_fn(description, move |actual| {
        actual.as_text().is_some_and(|s| re.is_match(s))
    })
}

/// Negates another expectation. A pattern literal is negated as a regex
/// search, any other literal as equality.
pub fn not(inner: impl Into<Expected>) -> Expected {
    match inner.into() {
        Expected::Literal(Value::Pattern(re)) => {
            let description = format!("not match {}", Value::Pattern(re.clone()));
            from_fn(description, move |actual| {
                !actual.as_text().is_some_and(|s| re.is_match(s))
            })
        }
        Expected::Literal(v) => {
            let description = format!("not be {v}");
            from_fn(description, move |actual| *actual != v)
        }
        Expected::Predicate(p) => {
            let description = format!("not {}", p.describe());
            from_fn(description, move |actual| !p.matches(actual))
        }
    }
}
