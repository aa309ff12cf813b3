//! Numeric tower: integer, rational, real and complex scalars.
//!
//! Arithmetic is only defined between two numbers of the same [`NumericKind`].
//! Callers bring operands to a common kind with [`Number::coerce`], which only
//! widens (Integer -> Rational -> Real -> Complex) and never narrows.
//!
//! Rationals are kept exactly as computed: arithmetic never reduces them to lowest
//! terms, so `1/2 + 1/2` is `2/2`. The sign always lives on the numerator.

use crate::Error;
use num_complex::Complex64;
use num_integer::Integer;
use std::fmt;
use std::str::FromStr;

/// Scalar type backing integer numbers
pub type IntegerType = i64;

/// Numeric kinds, ordered from narrowest to widest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericKind {
    Integer,
    Rational,
    Real,
    Complex,
}

impl NumericKind {
    pub const ALL: [NumericKind; 4] = [
        NumericKind::Integer,
        NumericKind::Rational,
        NumericKind::Real,
        NumericKind::Complex,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericKind::Integer => "integer",
            NumericKind::Rational => "rational",
            NumericKind::Real => "real",
            NumericKind::Complex => "complex",
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        NumericKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::EvalError(format!("Unknown numeric kind: {s}")))
    }
}

fn overflow(operation: &str) -> Error {
    Error::EvalError(format!("Integer overflow in {operation}"))
}

fn division_by_zero() -> Error {
    Error::EvalError("Division by zero".to_owned())
}

/// Least common multiple of two positive denominators
fn lcm(a: IntegerType, b: IntegerType) -> Result<IntegerType, Error> {
    (a / Integer::gcd(&a, &b))
        .checked_mul(b)
        .ok_or_else(|| overflow("rational denominator"))
}

/// Exact fraction of two integers. The denominator is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    numer: IntegerType,
    denom: IntegerType,
}

impl Rational {
    /// Build a fraction, moving any sign onto the numerator. No reduction happens.
    pub fn new(numer: IntegerType, denom: IntegerType) -> Result<Self, Error> {
        if denom == 0 {
            return Err(division_by_zero());
        }
        if denom < 0 {
            let numer = numer.checked_neg().ok_or_else(|| overflow("negation"))?;
            let denom = denom.checked_neg().ok_or_else(|| overflow("negation"))?;
            return Ok(Rational { numer, denom });
        }
        Ok(Rational { numer, denom })
    }

    pub fn from_integer(n: IntegerType) -> Self {
        Rational { numer: n, denom: 1 }
    }

    pub fn numer(&self) -> IntegerType {
        self.numer
    }

    pub fn denom(&self) -> IntegerType {
        self.denom
    }

    pub fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    pub fn checked_add(self, rhs: Rational) -> Result<Rational, Error> {
        if self.denom == rhs.denom {
            let numer = self
                .numer
                .checked_add(rhs.numer)
                .ok_or_else(|| overflow("addition"))?;
            return Ok(Rational {
                numer,
                denom: self.denom,
            });
        }

        let denom = lcm(self.denom, rhs.denom)?;
        let lhs_numer = self
            .numer
            .checked_mul(denom / self.denom)
            .ok_or_else(|| overflow("addition"))?;
        let rhs_numer = rhs
            .numer
            .checked_mul(denom / rhs.denom)
            .ok_or_else(|| overflow("addition"))?;
        let numer = lhs_numer
            .checked_add(rhs_numer)
            .ok_or_else(|| overflow("addition"))?;
        Ok(Rational { numer, denom })
    }

    pub fn checked_neg(self) -> Result<Rational, Error> {
        let numer = self
            .numer
            .checked_neg()
            .ok_or_else(|| overflow("negation"))?;
        Ok(Rational {
            numer,
            denom: self.denom,
        })
    }

    pub fn checked_sub(self, rhs: Rational) -> Result<Rational, Error> {
        self.checked_add(rhs.checked_neg()?)
    }

    pub fn checked_mul(self, rhs: Rational) -> Result<Rational, Error> {
        let numer = self
            .numer
            .checked_mul(rhs.numer)
            .ok_or_else(|| overflow("multiplication"))?;
        let denom = self
            .denom
            .checked_mul(rhs.denom)
            .ok_or_else(|| overflow("multiplication"))?;
        Ok(Rational { numer, denom })
    }

    /// Cross-multiplies: `(a/b) / (c/d) = (a*d) / (b*c)`
    pub fn checked_div(self, rhs: Rational) -> Result<Rational, Error> {
        if rhs.numer == 0 {
            return Err(division_by_zero());
        }
        let numer = self
            .numer
            .checked_mul(rhs.denom)
            .ok_or_else(|| overflow("division"))?;
        let denom = self
            .denom
            .checked_mul(rhs.numer)
            .ok_or_else(|| overflow("division"))?;
        Rational::new(numer, denom)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}

/// Complex number with `f64` parts
pub type Complex = Complex64;

/// Render a real so that it reads back as a real (`3.0`, not `3`)
pub(crate) fn format_real(x: f64) -> String {
    let text = x.to_string();
    if text.contains(['.', 'e', 'E']) || !x.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// Both parts are always written as reals (`1.0+2.0i`)
fn format_complex(c: Complex) -> String {
    let sign = if c.im.is_sign_negative() { "-" } else { "+" };
    format!("{}{sign}{}i", format_real(c.re), format_real(c.im.abs()))
}

/// A single scalar of one numeric kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(IntegerType),
    Rational(Rational),
    Real(f64),
    Complex(Complex),
}

fn mismatched_kinds(lhs: Number, rhs: Number) -> Error {
    Error::type_mismatch(lhs.kind(), rhs.kind())
}

impl Number {
    pub fn kind(&self) -> NumericKind {
        match self {
            Number::Integer(_) => NumericKind::Integer,
            Number::Rational(_) => NumericKind::Rational,
            Number::Real(_) => NumericKind::Real,
            Number::Complex(_) => NumericKind::Complex,
        }
    }

    /// Additive identity of `kind`
    pub fn zero(kind: NumericKind) -> Number {
        match kind {
            NumericKind::Integer => Number::Integer(0),
            NumericKind::Rational => Number::Rational(Rational::from_integer(0)),
            NumericKind::Real => Number::Real(0.0),
            NumericKind::Complex => Number::Complex(Complex::new(0.0, 0.0)),
        }
    }

    /// Multiplicative identity of `kind`
    pub fn one(kind: NumericKind) -> Number {
        match kind {
            NumericKind::Integer => Number::Integer(1),
            NumericKind::Rational => Number::Rational(Rational::from_integer(1)),
            NumericKind::Real => Number::Real(1.0),
            NumericKind::Complex => Number::Complex(Complex::new(1.0, 0.0)),
        }
    }

    /// Reinterpret this number as `kind`. Only widening conversions succeed.
    pub fn coerce(self, kind: NumericKind) -> Result<Number, Error> {
        let coerced = match (self, kind) {
            (Number::Integer(n), NumericKind::Integer) => Number::Integer(n),
            (Number::Integer(n), NumericKind::Rational) => {
                Number::Rational(Rational::from_integer(n))
            }
            (Number::Integer(n), NumericKind::Real) => Number::Real(n as f64),
            (Number::Integer(n), NumericKind::Complex) => {
                Number::Complex(Complex::new(n as f64, 0.0))
            }
            (Number::Rational(r), NumericKind::Rational) => Number::Rational(r),
            (Number::Rational(r), NumericKind::Real) => Number::Real(r.to_f64()),
            (Number::Rational(r), NumericKind::Complex) => {
                Number::Complex(Complex::new(r.to_f64(), 0.0))
            }
            (Number::Real(x), NumericKind::Real) => Number::Real(x),
            (Number::Real(x), NumericKind::Complex) => Number::Complex(Complex::new(x, 0.0)),
            (Number::Complex(c), NumericKind::Complex) => Number::Complex(c),
            (number, kind) => return Err(Error::type_mismatch(kind, number.kind())),
        };
        Ok(coerced)
    }

    pub fn checked_add(self, rhs: Number) -> Result<Number, Error> {
        match (self, rhs) {
            (Number::Integer(a), Number::Integer(b)) => a
                .checked_add(b)
                .map(Number::Integer)
                .ok_or_else(|| overflow("addition")),
            (Number::Rational(a), Number::Rational(b)) => a.checked_add(b).map(Number::Rational),
            (Number::Real(a), Number::Real(b)) => Ok(Number::Real(a + b)),
            (Number::Complex(a), Number::Complex(b)) => Ok(Number::Complex(a + b)),
            (a, b) => Err(mismatched_kinds(a, b)),
        }
    }

    pub fn checked_sub(self, rhs: Number) -> Result<Number, Error> {
        match (self, rhs) {
            (Number::Integer(a), Number::Integer(b)) => a
                .checked_sub(b)
                .map(Number::Integer)
                .ok_or_else(|| overflow("subtraction")),
            (Number::Rational(a), Number::Rational(b)) => a.checked_sub(b).map(Number::Rational),
            (Number::Real(a), Number::Real(b)) => Ok(Number::Real(a - b)),
            (Number::Complex(a), Number::Complex(b)) => Ok(Number::Complex(a - b)),
            (a, b) => Err(mismatched_kinds(a, b)),
        }
    }

    pub fn checked_mul(self, rhs: Number) -> Result<Number, Error> {
        match (self, rhs) {
            (Number::Integer(a), Number::Integer(b)) => a
                .checked_mul(b)
                .map(Number::Integer)
                .ok_or_else(|| overflow("multiplication")),
            (Number::Rational(a), Number::Rational(b)) => a.checked_mul(b).map(Number::Rational),
            (Number::Real(a), Number::Real(b)) => Ok(Number::Real(a * b)),
            (Number::Complex(a), Number::Complex(b)) => Ok(Number::Complex(a * b)),
            (a, b) => Err(mismatched_kinds(a, b)),
        }
    }

    /// Integer division truncates toward zero; reals and complexes follow IEEE 754.
    pub fn checked_div(self, rhs: Number) -> Result<Number, Error> {
        match (self, rhs) {
            (Number::Integer(_), Number::Integer(0)) => Err(division_by_zero()),
            (Number::Integer(a), Number::Integer(b)) => a
                .checked_div(b)
                .map(Number::Integer)
                .ok_or_else(|| overflow("division")),
            (Number::Rational(a), Number::Rational(b)) => a.checked_div(b).map(Number::Rational),
            (Number::Real(a), Number::Real(b)) => Ok(Number::Real(a / b)),
            (Number::Complex(a), Number::Complex(b)) => Ok(Number::Complex(a / b)),
            (a, b) => Err(mismatched_kinds(a, b)),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{n}"),
            Number::Rational(r) => write!(f, "{r}"),
            Number::Real(x) => f.write_str(&format_real(*x)),
            Number::Complex(c) => f.write_str(&format_complex(*c)),
        }
    }
}

macro_rules! impl_number_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Number {
            fn from(n: $int_type) -> Self {
                Number::Integer(IntegerType::from(n))
            }
        }
    };
}

impl_number_from_integer!(i8);
impl_number_from_integer!(i16);
impl_number_from_integer!(i32);
impl_number_from_integer!(IntegerType);
impl_number_from_integer!(u8);
impl_number_from_integer!(u16);
impl_number_from_integer!(u32);

impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Number::Real(x)
    }
}

impl From<f32> for Number {
    fn from(x: f32) -> Self {
        Number::Real(f64::from(x))
    }
}

impl From<Rational> for Number {
    fn from(r: Rational) -> Self {
        Number::Rational(r)
    }
}

impl From<Complex> for Number {
    fn from(c: Complex) -> Self {
        Number::Complex(c)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;

    fn ratio(n: IntegerType, d: IntegerType) -> Rational {
        Rational::new(n, d).unwrap()
    }

    #[test]
    fn test_rational_construction_normalizes_sign() {
        let r = ratio(1, -2);
        assert_eq!((r.numer(), r.denom()), (-1, 2));

        let r = ratio(-3, -4);
        assert_eq!((r.numer(), r.denom()), (3, 4));

        // never reduced
        let r = ratio(4, 8);
        assert_eq!((r.numer(), r.denom()), (4, 8));

        assert!(Rational::new(1, 0).is_err());
        assert!(Rational::new(1, IntegerType::MIN).is_err());
    }

    #[test]
    fn test_rational_arithmetic_data_driven() {
        type Case = (&'static str, Result<Rational, Error>, (IntegerType, IntegerType));

        let test_cases: Vec<Case> = vec![
            // equal denominators keep the denominator
            ("1/2 + 1/2", ratio(1, 2).checked_add(ratio(1, 2)), (2, 2)),
            ("1/5 + 3/5", ratio(1, 5).checked_add(ratio(3, 5)), (4, 5)),
            // unequal denominators go through the lcm
            ("1/4 + 1/6", ratio(1, 4).checked_add(ratio(1, 6)), (5, 12)),
            ("1/2 + 1/3", ratio(1, 2).checked_add(ratio(1, 3)), (5, 6)),
            ("3/4 + 1/8", ratio(3, 4).checked_add(ratio(1, 8)), (7, 8)),
            ("1/2 - 1/3", ratio(1, 2).checked_sub(ratio(1, 3)), (1, 6)),
            ("1/3 - 1/2", ratio(1, 3).checked_sub(ratio(1, 2)), (-1, 6)),
            ("2/3 * 3/4", ratio(2, 3).checked_mul(ratio(3, 4)), (6, 12)),
            ("-1/2 * 1/3", ratio(-1, 2).checked_mul(ratio(1, 3)), (-1, 6)),
            ("1/2 / 3/4", ratio(1, 2).checked_div(ratio(3, 4)), (4, 6)),
            ("1/2 / -3/4", ratio(1, 2).checked_div(ratio(-3, 4)), (-4, 6)),
            ("-1/2 / -1/4", ratio(-1, 2).checked_div(ratio(-1, 4)), (4, 2)),
        ];

        for (i, (name, actual, (numer, denom))) in test_cases.into_iter().enumerate() {
            let actual = actual.unwrap_or_else(|e| panic!("Test #{} ({name}) failed: {e}", i + 1));
            assert_eq!(
                (actual.numer(), actual.denom()),
                (numer, denom),
                "Test #{} ({name})",
                i + 1
            );
        }
    }

    #[test]
    fn test_rational_negation_moves_numerator_sign() {
        let r = ratio(3, 7).checked_neg().unwrap();
        assert_eq!((r.numer(), r.denom()), (-3, 7));
        assert!(ratio(IntegerType::MIN, 1).checked_neg().is_err());
    }

    #[test]
    fn test_rational_errors() {
        let err = ratio(1, 2).checked_div(ratio(0, 5)).unwrap_err();
        assert!(format!("{err}").contains("Division by zero"));

        let huge = ratio(IntegerType::MAX, 1);
        assert!(huge.checked_add(ratio(1, 1)).is_err());
        assert!(huge.checked_mul(ratio(2, 1)).is_err());
        assert!(ratio(1, IntegerType::MAX).checked_add(ratio(1, IntegerType::MAX - 1)).is_err());
    }

    #[test]
    fn test_integer_arithmetic() {
        let n = |x: IntegerType| Number::Integer(x);

        assert_eq!(n(3).checked_add(n(4)).unwrap(), n(7));
        assert_eq!(n(1).checked_sub(n(2)).unwrap(), n(-1));
        assert_eq!(n(7).checked_mul(n(8)).unwrap(), n(56));
        assert_eq!(n(34).checked_div(n(10)).unwrap(), n(3));
        assert_eq!(n(-7).checked_div(n(2)).unwrap(), n(-3)); // truncates toward zero

        assert!(n(IntegerType::MAX).checked_add(n(1)).is_err());
        assert!(n(IntegerType::MIN).checked_sub(n(1)).is_err());
        assert!(n(IntegerType::MIN).checked_div(n(-1)).is_err());
        let err = n(1).checked_div(n(0)).unwrap_err();
        assert_eq!(err, Error::EvalError("Division by zero".to_owned()));
    }

    #[test]
    fn test_complex_arithmetic() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(3.0, -1.0);

        assert_eq!(a + b, Complex::new(4.0, 1.0));
        assert_eq!(a - b, Complex::new(-2.0, 3.0));
        assert_eq!(a * b, Complex::new(5.0, 5.0));

        let q = (a * b) / b;
        assert!((q.re - a.re).abs() < 1e-12);
        assert!((q.im - a.im).abs() < 1e-12);
        assert_eq!(-a, Complex::new(-1.0, -2.0));
    }

    #[test]
    fn test_mixed_kinds_are_rejected() {
        let err = Number::Integer(1).checked_add(Number::Real(1.0)).unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: "integer".to_owned(),
                found: "real".to_owned(),
            }
        );
    }

    #[test]
    fn test_coerce_widens_only() {
        let cases = vec![
            (Number::Integer(2), NumericKind::Rational, Some(Number::Rational(ratio(2, 1)))),
            (Number::Integer(2), NumericKind::Real, Some(Number::Real(2.0))),
            (
                Number::Integer(2),
                NumericKind::Complex,
                Some(Number::Complex(Complex::new(2.0, 0.0))),
            ),
            (Number::Rational(ratio(1, 4)), NumericKind::Real, Some(Number::Real(0.25))),
            (Number::Real(1.5), NumericKind::Real, Some(Number::Real(1.5))),
            (Number::Real(1.5), NumericKind::Integer, None),
            (Number::Rational(ratio(1, 2)), NumericKind::Integer, None),
            (Number::Complex(Complex::new(0.0, 1.0)), NumericKind::Real, None),
        ];

        for (i, (number, kind, expected)) in cases.into_iter().enumerate() {
            let actual = number.coerce(kind).ok();
            assert_eq!(actual, expected, "Coerce test #{}", i + 1);
        }
    }

    #[test]
    fn test_identities() {
        for kind in NumericKind::ALL {
            assert_eq!(Number::zero(kind).kind(), kind);
            assert_eq!(Number::one(kind).kind(), kind);
        }
        assert_eq!(Number::zero(NumericKind::Rational), Number::Rational(ratio(0, 1)));
        assert_eq!(Number::one(NumericKind::Real), Number::Real(1.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Number::Integer(-42).to_string(), "-42");
        assert_eq!(Number::Rational(ratio(3, -4)).to_string(), "-3/4");
        assert_eq!(Number::Real(3.0).to_string(), "3.0");
        assert_eq!(Number::Real(-0.25).to_string(), "-0.25");
        assert_eq!(Number::Complex(Complex::new(1.0, -2.0)).to_string(), "1.0-2.0i");
        assert_eq!(Number::Complex(Complex::new(0.5, 0.0)).to_string(), "0.5+0.0i");
    }

    #[test]
    fn test_numeric_kind_from_str() {
        assert_eq!("real".parse::<NumericKind>().unwrap(), NumericKind::Real);
        assert!("quaternion".parse::<NumericKind>().is_err());
    }
}
