//! This module defines the core value type of the interpreter and helper functions
//! for building values. The main enum, [`Value`], is a closed set of datum kinds:
//! numbers, identifiers, cons pairs, proper lists, the empty list and native
//! procedures. Every consumer matches it exhaustively or goes through the checked
//! [`Value::downcast_ref`], which fails with [`Error::TypeMismatch`] instead of
//! coercing. Ergonomic helpers such as [`val`], [`sym`], [`nil`] and [`cons`] are
//! provided for building trees in code and tests.

mod list;
mod number;

pub use list::{List, ListIter, Pair, PairIter, cons};
pub use number::{Complex, IntegerType, Number, NumericKind, Rational};

use crate::Error;
use crate::evaluator::procedure::Procedure;
use std::fmt;

/// Allowed non-alphanumeric characters in identifier names
/// Most represent mathematical symbols or predicates ("?"), "$" supported for JavaScript identifiers
#[cfg_attr(not(feature = "scheme"), allow(dead_code))]
pub(crate) const SYMBOL_SPECIAL_CHARS: &str = "+-*/<>=!?_$";

/// Check if a string is a valid identifier name
/// Valid: non-empty, no leading digit, no "-digit" prefix, alphanumeric + SYMBOL_SPECIAL_CHARS
#[cfg_attr(not(feature = "scheme"), allow(dead_code))]
pub(crate) fn is_valid_symbol(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        None => false,
        Some(first_char) => {
            if first_char.is_ascii_digit() {
                return false;
            }

            if first_char == '-'
                && let Some(second_char) = chars.next()
                && second_char.is_ascii_digit()
            {
                return false;
            }

            name.chars()
                .all(|c| c.is_alphanumeric() || SYMBOL_SPECIAL_CHARS.contains(c))
        }
    }
}

/// Tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Pair,
    EmptyList,
    List,
    Identifier,
    Procedure,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Number => "number",
            ValueKind::Pair => "pair",
            ValueKind::EmptyList => "empty list",
            ValueKind::List => "list",
            ValueKind::Identifier => "identifier",
            ValueKind::Procedure => "procedure",
        })
    }
}

/// Core datum type of the interpreter
///
/// Values form a tree: a pair owns its `car` and `cdr`, a list owns its elements.
///
/// To build a tree, use the ergonomic helper functions:
/// - `val(42)` for numbers, `sym("name")` for identifiers, `nil()` for the empty list
/// - `val([1, 2, 3])` for homogeneous lists
/// - `val(vec![sym("+"), val(42)])` for mixed lists
/// - `cons(1, 2)` for pairs
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Integer, rational, real or complex scalar
    Number(Number),
    /// Cons cell
    Pair(Box<Pair>),
    /// Terminator of every proper list, and the identity argument of the arithmetic folds
    EmptyList,
    /// Proper list with at least one element when built by the reader
    List(List),
    /// Symbol name, resolved against the environment during evaluation
    Identifier(String),
    /// Native procedure
    Procedure(Procedure),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Pair(_) => ValueKind::Pair,
            Value::EmptyList => ValueKind::EmptyList,
            Value::List(_) => ValueKind::List,
            Value::Identifier(_) => ValueKind::Identifier,
            Value::Procedure(_) => ValueKind::Procedure,
        }
    }

    /// Checked view of the payload as `T`.
    ///
    /// ```
    /// use consxp::ast::{Number, Value, val};
    ///
    /// let v = val(7);
    /// assert_eq!(v.downcast_ref::<Number>().unwrap(), &Number::Integer(7));
    /// assert!(v.downcast_ref::<str>().is_err());
    /// ```
    pub fn downcast_ref<T: Downcast + ?Sized>(&self) -> Result<&T, Error> {
        T::downcast_from(self).ok_or_else(|| Error::type_mismatch(T::KIND, self.kind()))
    }

    /// Check if a value is the empty list
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::EmptyList)
    }
}

/// Payload types reachable from a [`Value`] through [`Value::downcast_ref`]
pub trait Downcast {
    const KIND: ValueKind;

    fn downcast_from(value: &Value) -> Option<&Self>;
}

impl Downcast for Number {
    const KIND: ValueKind = ValueKind::Number;

    fn downcast_from(value: &Value) -> Option<&Self> {
        match value {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl Downcast for Pair {
    const KIND: ValueKind = ValueKind::Pair;

    fn downcast_from(value: &Value) -> Option<&Self> {
        match value {
            Value::Pair(pair) => Some(pair),
            _ => None,
        }
    }
}

impl Downcast for List {
    const KIND: ValueKind = ValueKind::List;

    fn downcast_from(value: &Value) -> Option<&Self> {
        match value {
            Value::List(list) => Some(list),
            _ => None,
        }
    }
}

impl Downcast for Procedure {
    const KIND: ValueKind = ValueKind::Procedure;

    fn downcast_from(value: &Value) -> Option<&Self> {
        match value {
            Value::Procedure(procedure) => Some(procedure),
            _ => None,
        }
    }
}

impl Downcast for str {
    const KIND: ValueKind = ValueKind::Identifier;

    fn downcast_from(value: &Value) -> Option<&Self> {
        match value {
            Value::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Pair(pair) => write!(f, "{pair:?}"),
            Value::EmptyList => write!(f, "EmptyList"),
            Value::List(list) => {
                write!(f, "List(")?;
                for (i, v) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v:?}")?;
                }
                write!(f, ")")
            }
            Value::Identifier(name) => write!(f, "Identifier({name})"),
            Value::Procedure(procedure) => write!(f, "Procedure({})", procedure.id()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Pair(pair) => write!(f, "{pair}"),
            Value::EmptyList => write!(f, "()"),
            Value::List(list) => {
                write!(f, "(")?;
                for (i, elem) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
            Value::Identifier(name) => write!(f, "{name}"),
            Value::Procedure(procedure) => write!(f, "#<procedure:{}>", procedure.id()),
        }
    }
}

// From trait implementations for Value - enables .into() conversion

macro_rules! impl_value_from_number {
    ($($num_type:ty),* $(,)?) => {
        $(
            impl From<$num_type> for Value {
                fn from(n: $num_type) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

impl_value_from_number!(i8, i16, i32, IntegerType, u8, u16, u32, f32, f64, Rational, Complex);

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Pair> for Value {
    fn from(pair: Pair) -> Self {
        Value::Pair(Box::new(pair))
    }
}

impl From<List> for Value {
    fn from(list: List) -> Self {
        if list.is_empty() {
            Value::EmptyList
        } else {
            Value::List(list)
        }
    }
}

impl From<Procedure> for Value {
    fn from(procedure: Procedure) -> Self {
        Value::Procedure(procedure)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        v.into_iter().map(Into::into).collect::<List>().into()
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().map(Into::into).collect::<List>().into()
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(slice: &[T]) -> Self {
        slice.iter().cloned().map(Into::into).collect::<List>().into()
    }
}

// Fallible conversions from `Value` back into payload and primitive Rust types.

impl TryFrom<Value> for Number {
    type Error = Error;

    fn try_from(value: Value) -> Result<Number, Error> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(Error::type_mismatch(ValueKind::Number, other.kind())),
        }
    }
}

impl TryFrom<Value> for Pair {
    type Error = Error;

    fn try_from(value: Value) -> Result<Pair, Error> {
        match value {
            Value::Pair(pair) => Ok(*pair),
            other => Err(Error::type_mismatch(ValueKind::Pair, other.kind())),
        }
    }
}

impl TryFrom<Value> for List {
    type Error = Error;

    fn try_from(value: Value) -> Result<List, Error> {
        match value {
            Value::List(list) => Ok(list),
            other => Err(Error::type_mismatch(ValueKind::List, other.kind())),
        }
    }
}

impl TryFrom<Value> for Procedure {
    type Error = Error;

    fn try_from(value: Value) -> Result<Procedure, Error> {
        match value {
            Value::Procedure(procedure) => Ok(procedure),
            other => Err(Error::type_mismatch(ValueKind::Procedure, other.kind())),
        }
    }
}

impl TryFrom<Value> for IntegerType {
    type Error = Error;

    fn try_from(value: Value) -> Result<IntegerType, Error> {
        match Number::try_from(value)? {
            Number::Integer(n) => Ok(n),
            other => Err(Error::type_mismatch(NumericKind::Integer, other.kind())),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<f64, Error> {
        match Number::try_from(value)?.coerce(NumericKind::Real)? {
            Number::Real(x) => Ok(x),
            other => Err(Error::type_mismatch(NumericKind::Real, other.kind())),
        }
    }
}

/// Helper function for creating identifiers - works great in mixed lists!
/// Accepts both &str and String
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Identifier(name.as_ref().to_owned())
}

/// Helper function for creating Values - works great in mixed lists!
/// Accepts any type that can be converted to Value
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper function for the empty list - follows Lisp/Scheme conventions
pub fn nil() -> Value {
    Value::EmptyList
}
