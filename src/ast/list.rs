//! Cons pairs and proper lists.
//!
//! A [`List`] keeps its elements contiguously: the end of the backing vector plays
//! the role of the cached tail, so [`List::push_back`] is amortized O(1) and the
//! element count is always known. The cons-chain view is still available through
//! [`List::car`], [`List::cdr`] and [`List::into_pairs`]; the chain always ends in
//! [`Value::EmptyList`].

use crate::Error;
use crate::ast::{Value, ValueKind};
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

/// Ordered pair `(car . cdr)`. Owns both halves.
///
/// A cdr chain can be far longer than any nesting the reader limits, so drop,
/// clone, equality and formatting walk it in a loop rather than recursing
/// once per link.
pub struct Pair {
    car: Value,
    cdr: Value,
}

impl Pair {
    pub fn new(car: Value, cdr: Value) -> Self {
        Pair { car, cdr }
    }

    pub fn car(&self) -> &Value {
        &self.car
    }

    pub fn cdr(&self) -> &Value {
        &self.cdr
    }

    pub fn into_parts(mut self) -> (Value, Value) {
        let car = mem::replace(&mut self.car, Value::EmptyList);
        let cdr = mem::replace(&mut self.cdr, Value::EmptyList);
        (car, cdr)
    }

    /// Every `car` along the cdr chain, plus the value the chain ends on
    /// (`EmptyList` for a proper chain, anything else for a dotted tail).
    pub fn spine(&self) -> (Vec<&Value>, &Value) {
        let mut cars = vec![&self.car];
        let mut rest = &self.cdr;
        while let Value::Pair(pair) = rest {
            cars.push(&pair.car);
            rest = &pair.cdr;
        }
        (cars, rest)
    }

    /// Iterate the cars of the chain. A dotted tail is yielded once, last.
    pub fn iter(&self) -> PairIter<'_> {
        PairIter {
            head: Some(self),
            tail: None,
        }
    }
}

impl Drop for Pair {
    fn drop(&mut self) {
        let mut rest = mem::replace(&mut self.cdr, Value::EmptyList);
        while let Value::Pair(mut pair) = rest {
            rest = mem::replace(&mut pair.cdr, Value::EmptyList);
        }
    }
}

impl Clone for Pair {
    fn clone(&self) -> Self {
        let (cars, tail) = self.spine();
        let cdr = cars
            .iter()
            .skip(1)
            .rev()
            .fold(tail.clone(), |cdr, car| cons((*car).clone(), cdr));
        Pair::new(self.car.clone(), cdr)
    }
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        let (mut lhs, mut rhs) = (self, other);
        loop {
            if lhs.car != rhs.car {
                return false;
            }
            match (&lhs.cdr, &rhs.cdr) {
                (Value::Pair(l), Value::Pair(r)) => {
                    lhs = l;
                    rhs = r;
                }
                (l, r) => return l == r,
            }
        }
    }
}

/// `(1 . (2 . 3))`
impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cars, tail) = self.spine();
        for car in &cars {
            write!(f, "({car} . ")?;
        }
        write!(f, "{tail}")?;
        cars.iter().try_for_each(|_| f.write_str(")"))
    }
}

/// `Pair(Number(1), Pair(Number(2), Number(3)))`
impl fmt::Debug for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cars, tail) = self.spine();
        for car in &cars {
            write!(f, "Pair({car:?}, ")?;
        }
        write!(f, "{tail:?}")?;
        cars.iter().try_for_each(|_| f.write_str(")"))
    }
}

/// Allocate a pair. No validation is performed on either half.
pub fn cons(car: impl Into<Value>, cdr: impl Into<Value>) -> Value {
    Value::Pair(Box::new(Pair::new(car.into(), cdr.into())))
}

/// Borrowed iterator over a cons chain
#[derive(Debug, Clone)]
pub struct PairIter<'a> {
    head: Option<&'a Pair>,
    tail: Option<&'a Value>,
}

impl<'a> Iterator for PairIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(pair) = self.head.take() else {
            return self.tail.take();
        };
        match &pair.cdr {
            Value::Pair(next) => self.head = Some(next),
            Value::EmptyList => {}
            tail => self.tail = Some(tail),
        }
        Some(&pair.car)
    }
}

impl FusedIterator for PairIter<'_> {}

/// Proper list of values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    elements: Vec<Value>,
}

impl List {
    pub fn new() -> Self {
        List {
            elements: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        List {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Append to the end of the list
    pub fn push_back(&mut self, value: Value) {
        self.elements.push(value);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Head of the list, `None` when no element was pushed yet
    pub fn car(&self) -> Option<&Value> {
        self.elements.first()
    }

    /// Remainder after the head: a list of the remaining elements, or
    /// `EmptyList` when there are none.
    pub fn cdr(&self) -> Value {
        match self.elements.get(1..) {
            Some(rest) if !rest.is_empty() => Value::List(List {
                elements: rest.to_vec(),
            }),
            _ => Value::EmptyList,
        }
    }

    /// Consuming form of (`car`, `cdr`)
    pub fn split_first(self) -> Option<(Value, Value)> {
        let mut elements = self.elements.into_iter();
        let head = elements.next()?;
        let rest: Vec<Value> = elements.collect();
        let tail = if rest.is_empty() {
            Value::EmptyList
        } else {
            Value::List(List { elements: rest })
        };
        Some((head, tail))
    }

    pub fn iter(&self) -> ListIter<'_> {
        ListIter::new(&self.elements)
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.elements
    }

    /// Explicit cons-chain form, terminated by `EmptyList`
    pub fn into_pairs(self) -> Value {
        self.elements
            .into_iter()
            .rev()
            .fold(Value::EmptyList, |cdr, car| cons(car, cdr))
    }

    /// Rebuild a list from a proper cons chain (or copy an existing list).
    pub fn from_pairs(value: &Value) -> Result<List, Error> {
        match value {
            Value::EmptyList => Ok(List::new()),
            Value::List(list) => Ok(list.clone()),
            Value::Pair(pair) => {
                let (cars, end) = pair.spine();
                match end {
                    Value::EmptyList => Ok(cars.into_iter().cloned().collect()),
                    other => Err(Error::type_mismatch("proper list", other.kind())),
                }
            }
            other => Err(Error::type_mismatch(ValueKind::List, other.kind())),
        }
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        List {
            elements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = ListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowed iterator over list elements. Stops before the `EmptyList`
/// terminator, which is never yielded.
#[derive(Debug, Clone, Copy)]
pub struct ListIter<'a> {
    values: &'a [Value],
    index: usize,
}

impl<'a> ListIter<'a> {
    fn new(values: &'a [Value]) -> Self {
        ListIter { values, index: 0 }
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        let v = self.values.get(self.index)?;
        self.index += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.values.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ListIter<'_> {}
impl FusedIterator for ListIter<'_> {}
