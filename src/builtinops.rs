//! Built-in arithmetic operations and the registry that exposes them.
//!
//! The four operators `+ - * /` are not written as separate functions. Each one is
//! produced by [`make_arithmetic_procedure`] as a generic structural fold over the
//! argument value it receives:
//!
//! ```scheme
//! (+ 1 2 3)      ; list: left fold seeded with the first element, 6
//! (+ (3 . 4))    ; pair: fold car and cdr, combine, 7
//! (+)            ; empty list: identity element, 0
//! (*)            ; empty list: identity element, 1
//! ```
//!
//! ## Identity Elements
//!
//! The empty list reduces to the identity of the operator for the chosen numeric
//! kind: `0` for `+` and `-`, `1` for `*` and `/`. This gives a well-defined answer
//! for the zero-argument case instead of an arity error.
//!
//! ## Error Handling
//!
//! - **No Coercion Between Operands**: operands are widened to the procedure's
//!   numeric kind, never narrowed (`(+ 1/2)` fails in an integer environment)
//! - **Overflow Detection**: integer and rational arithmetic report overflow
//! - **Division by Zero**: reported for integers and rationals, IEEE semantics for
//!   reals and complex numbers
//!
//! ## Adding New Operations
//!
//! 1. **Add a variant** to [`ArithOp`] and map it in `apply` and `identity`
//! 2. **Add to BUILTIN_OPS** with its Scheme identifier
//! 3. **Add tests** covering the pair, list and empty-list shapes

use crate::Error;
use crate::ast::{Number, NumericKind, Value, ValueKind};
use crate::evaluator::procedure::Procedure;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::trace;

/// Binary operator folded by the arithmetic procedures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Plus,
    Minus,
    Multiplies,
    Divides,
}

impl ArithOp {
    pub const ALL: [ArithOp; 4] = [
        ArithOp::Plus,
        ArithOp::Minus,
        ArithOp::Multiplies,
        ArithOp::Divides,
    ];

    pub fn scheme_id(self) -> &'static str {
        match self {
            ArithOp::Plus => "+",
            ArithOp::Minus => "-",
            ArithOp::Multiplies => "*",
            ArithOp::Divides => "/",
        }
    }

    /// Combine two numbers of the same kind
    pub fn apply(self, lhs: Number, rhs: Number) -> Result<Number, Error> {
        match self {
            ArithOp::Plus => lhs.checked_add(rhs),
            ArithOp::Minus => lhs.checked_sub(rhs),
            ArithOp::Multiplies => lhs.checked_mul(rhs),
            ArithOp::Divides => lhs.checked_div(rhs),
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme_id())
    }
}

/// Identity element of `op` for numbers of `kind`
pub fn identity(op: ArithOp, kind: NumericKind) -> Number {
    match op {
        ArithOp::Plus | ArithOp::Minus => Number::zero(kind),
        ArithOp::Multiplies | ArithOp::Divides => Number::one(kind),
    }
}

/// Reduce `value` to a single number of `kind` by folding `op` over its structure.
///
/// - a number is widened to `kind`
/// - a pair combines its folded `car` with its folded `cdr`
/// - a list folds left to right, seeded with its first element
/// - the empty list is the identity of `op`
///
/// Anything else is a [`Error::TypeMismatch`].
pub fn fold(op: ArithOp, kind: NumericKind, value: &Value) -> Result<Number, Error> {
    match value {
        Value::Number(n) => n.coerce(kind),
        Value::EmptyList => Ok(identity(op, kind)),
        Value::Pair(pair) => {
            // Walk the cdr chain iteratively; the result equals
            // op(car0, op(car1, ... op(carN, fold(end))))
            let (cars, end) = pair.spine();
            let mut acc = fold(op, kind, end)?;
            for car in cars.into_iter().rev() {
                let lhs = fold(op, kind, car)?;
                trace!(%op, %lhs, rhs = %acc, "pair fold step");
                acc = op.apply(lhs, acc)?;
            }
            Ok(acc)
        }
        Value::List(list) => {
            let mut elements = list.iter();
            let Some(first) = elements.next() else {
                return Ok(identity(op, kind));
            };
            let mut acc = fold(op, kind, first)?;
            for element in elements {
                let rhs = fold(op, kind, element)?;
                trace!(%op, lhs = %acc, %rhs, "list fold step");
                acc = op.apply(acc, rhs)?;
            }
            Ok(acc)
        }
        Value::Identifier(_) | Value::Procedure(_) => {
            Err(Error::type_mismatch(ValueKind::Number, value.kind()))
        }
    }
}

/// Build the procedure for `op` over numbers of `kind`.
///
/// The procedure captures only the operator and the kind.
pub fn make_arithmetic_procedure(op: ArithOp, kind: NumericKind) -> Procedure {
    Procedure::new(op.scheme_id(), move |args: &Value| {
        trace!(%op, %kind, %args, "applying arithmetic procedure");
        fold(op, kind, args).map(Value::Number)
    })
}

/// Definition of a built-in operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinOp {
    /// The Scheme identifier for this operation
    pub scheme_id: &'static str,
    pub op: ArithOp,
}

impl BuiltinOp {
    /// Instantiate this operation for numbers of `kind`
    pub fn procedure(&self, kind: NumericKind) -> Procedure {
        make_arithmetic_procedure(self.op, kind)
    }
}

static BUILTIN_OPS: LazyLock<Vec<BuiltinOp>> = LazyLock::new(|| {
    ArithOp::ALL
        .into_iter()
        .map(|op| BuiltinOp {
            scheme_id: op.scheme_id(),
            op,
        })
        .collect()
});

/// Lazy static map from scheme_id to BuiltinOp (private - use find_scheme_op)
static BUILTIN_SCHEME: LazyLock<HashMap<&'static str, &'static BuiltinOp>> = LazyLock::new(|| {
    let ops: &'static [BuiltinOp] = BUILTIN_OPS.as_slice();
    ops.iter().map(|op| (op.scheme_id, op)).collect()
});

/// Every built-in operation, in registration order
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS.as_slice()
}

/// Look up a built-in operation by its Scheme identifier
pub fn find_scheme_op(id: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_SCHEME.get(id).copied()
}
