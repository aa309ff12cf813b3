use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{all_consuming, cut, opt, recognize},
    error::ErrorKind,
    multi::many0,
    number::complete::recognize_float,
    sequence::{pair, preceded, separated_pair, terminated},
};
use std::borrow::Cow;

use crate::ast::{
    IntegerType, Rational, SYMBOL_SPECIAL_CHARS, Value, cons, is_valid_symbol, sym,
};
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

/// Reader options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseConfig {
    /// Strip `;` line comments before parsing
    pub handle_comments: bool,
}

impl ParseConfig {
    fn prepare<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if self.handle_comments && input.contains(';') {
            Cow::Owned(strip_comments(input))
        } else {
            Cow::Borrowed(input)
        }
    }
}

/// Remove everything from `;` to the end of each line
fn strip_comments(input: &str) -> String {
    input
        .split_inclusive('\n')
        .map(|line| match line.find(';') {
            Some(start) if line.ends_with('\n') => format!("{}\n", &line[..start]),
            Some(start) => line[..start].to_owned(),
            None => line.to_owned(),
        })
        .collect()
}

/// Convert nom parsing errors to structured parse errors
fn parse_error_from_nom(input: &str, error: nom::Err<nom::error::Error<&str>>) -> ParseError {
    let e = match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => {
            return ParseError::from_message(ParseErrorKind::Incomplete, "Incomplete input");
        }
    };

    let position = input.len().saturating_sub(e.input.len());
    let char_position = input[..position].chars().count();
    let found = token_at(e.input);

    let (kind, message) = match e.code {
        ErrorKind::TooLarge => (
            ParseErrorKind::TooDeeplyNested,
            format!("Expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
        ),
        _ if e.input.is_empty() => (
            ParseErrorKind::Incomplete,
            "Unexpected end of input".to_owned(),
        ),
        ErrorKind::Digit | ErrorKind::HexDigit => (
            ParseErrorKind::ImplementationLimit,
            format!("Integer literal out of range at position {position}"),
        ),
        ErrorKind::Verify => (
            ParseErrorKind::ImplementationLimit,
            format!("Zero denominator in rational literal at position {position}"),
        ),
        ErrorKind::Alpha => (
            ParseErrorKind::InvalidSyntax,
            format!("Invalid token at position {position}"),
        ),
        ErrorKind::Tag => (
            ParseErrorKind::InvalidSyntax,
            format!("Unexpected '.' at position {position}"),
        ),
        ErrorKind::Char => (
            ParseErrorKind::InvalidSyntax,
            format!("Unexpected character at position {position}"),
        ),
        _ => {
            let remaining_chars: String = e.input.chars().take(10).collect();
            (
                ParseErrorKind::InvalidSyntax,
                format!("Invalid syntax near '{remaining_chars}'"),
            )
        }
    };

    ParseError::with_context(kind, message, input, char_position, found)
}

/// The token starting at `input`, if any, for error reporting
fn token_at(input: &str) -> Option<String> {
    let token: String = input
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .take(20)
        .collect();
    if token.is_empty() {
        input.chars().next().map(String::from)
    } else {
        Some(token)
    }
}

fn is_atom_char(c: char) -> bool {
    c.is_alphanumeric() || SYMBOL_SPECIAL_CHARS.contains(c) || c == '.' || c == '#'
}

/// `#x1F`, `#XfF`
fn hexadecimal(token: &str) -> IResult<&str, &str> {
    all_consuming(preceded(
        pair(char('#'), one_of("xX")),
        take_while1(|c: char| c.is_ascii_hexdigit()),
    ))
    .parse(token)
}

fn signed_digits(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(one_of("+-")), digit1)).parse(input)
}

/// `3/4`, `-1/2`
fn rational(token: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(separated_pair(signed_digits, char('/'), digit1)).parse(token)
}

/// `1.5`, `-0.25`, `2.`, `.5`, `1e3`
fn real(token: &str) -> IResult<&str, &str> {
    all_consuming(recognize_float).parse(token)
}

fn decimal(token: &str) -> IResult<&str, &str> {
    all_consuming(signed_digits).parse(token)
}

/// Classify a complete atom token. Number syntax takes precedence over identifiers.
fn classify_atom(token: &str) -> Result<Value, ErrorKind> {
    if let Ok((_, digits)) = hexadecimal(token) {
        return IntegerType::from_str_radix(digits, 16)
            .map(Value::from)
            .map_err(|_| ErrorKind::HexDigit);
    }
    if let Ok((_, (numer, denom))) = rational(token) {
        let numer = numer
            .parse::<IntegerType>()
            .map_err(|_| ErrorKind::Digit)?;
        let denom = denom
            .parse::<IntegerType>()
            .map_err(|_| ErrorKind::Digit)?;
        return Rational::new(numer, denom)
            .map(Value::from)
            .map_err(|_| ErrorKind::Verify);
    }
    // Integers first: recognize_float also accepts plain digit strings
    if let Ok((_, text)) = decimal(token) {
        return text
            .parse::<IntegerType>()
            .map(Value::from)
            .map_err(|_| ErrorKind::Digit);
    }
    if let Ok((_, text)) = real(token) {
        return text
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| ErrorKind::Float);
    }
    if is_valid_symbol(token) {
        return Ok(sym(token));
    }
    Err(ErrorKind::Alpha)
}

/// Parse a number or identifier
fn parse_atom(input: &str) -> IResult<&str, Value> {
    let (remaining, token) = take_while1(is_atom_char).parse(input)?;

    // A lone dot is list syntax, not a datum; recoverable so list parsing can see it
    if token == "." {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Tag,
        )));
    }

    match classify_atom(token) {
        Ok(value) => Ok((remaining, value)),
        Err(kind) => Err(nom::Err::Failure(nom::error::Error::new(input, kind))),
    }
}

/// Parse `()`, `(a b c)` or `(a b . c)`
fn parse_list(input: &str, depth: usize) -> IResult<&str, Value> {
    let (input, _) = char('(').parse(input)?;
    if depth >= MAX_PARSE_DEPTH {
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::TooLarge,
        )));
    }

    // Past the opening paren every error is final
    let (input, elements) = many0(|input| parse_sexpr(input, depth + 1)).parse(input)?;
    let (dot_input, _) = multispace0.parse(input)?;
    let (input, tail) = opt(preceded(
        char('.'),
        cut(|input| parse_sexpr(input, depth + 1)),
    ))
    .parse(dot_input)?;
    let (input, _) = cut(preceded(multispace0, char(')'))).parse(input)?;

    let value = match tail {
        None if elements.is_empty() => Value::EmptyList,
        None => Value::List(elements.into_iter().collect()),
        Some(_) if elements.is_empty() => {
            return Err(nom::Err::Failure(nom::error::Error::new(
                dot_input,
                ErrorKind::Tag,
            )));
        }
        Some(tail) => elements
            .into_iter()
            .rev()
            .fold(tail, |cdr, car| cons(car, cdr)),
    };
    Ok((input, value))
}

/// Parse an S-expression, skipping leading whitespace
fn parse_sexpr(input: &str, depth: usize) -> IResult<&str, Value> {
    preceded(
        multispace0,
        alt((|input| parse_list(input, depth), parse_atom)),
    )
    .parse(input)
}

/// Parse a complete S-expression from input.
pub fn parse_scheme(input: &str) -> Result<Value, Error> {
    parse_scheme_with_config(input, ParseConfig::default())
}

/// Parse exactly one S-expression, honoring `config`
pub fn parse_scheme_with_config(input: &str, config: ParseConfig) -> Result<Value, Error> {
    let source = config.prepare(input);
    let source = source.as_ref();

    match terminated(|input| parse_sexpr(input, 0), multispace0).parse(source) {
        Ok(("", value)) => Ok(value),
        Ok((remaining, _)) => {
            let position = source.len().saturating_sub(remaining.len());
            let remaining_preview: String = remaining.chars().take(20).collect();
            Err(ParseError::with_context(
                ParseErrorKind::TrailingContent,
                format!("Unexpected remaining input: '{remaining_preview}'"),
                source,
                source[..position].chars().count(),
                token_at(remaining),
            )
            .into())
        }
        Err(e) => Err(parse_error_from_nom(source, e).into()),
    }
}

/// Parse zero or more whitespace-separated S-expressions
pub fn parse_program(input: &str) -> Result<Vec<Value>, Error> {
    parse_program_with_config(input, ParseConfig::default())
}

pub fn parse_program_with_config(input: &str, config: ParseConfig) -> Result<Vec<Value>, Error> {
    let source = config.prepare(input);
    let source = source.as_ref();

    let (remaining, exprs) = terminated(many0(|input| parse_sexpr(input, 0)), multispace0)
        .parse(source)
        .map_err(|e| parse_error_from_nom(source, e))?;

    if remaining.is_empty() {
        return Ok(exprs);
    }
    // many0 stopped on a recoverable error; parse again to report it
    match parse_sexpr(remaining, 0) {
        Err(e) => Err(parse_error_from_nom(source, e).into()),
        Ok(_) => {
            let position = source.len().saturating_sub(remaining.len());
            Err(ParseError::with_context(
                ParseErrorKind::TrailingContent,
                "Unexpected remaining input",
                source,
                source[..position].chars().count(),
                token_at(remaining),
            )
            .into())
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{Number, nil, val};

    /// Test result variants for comprehensive parsing tests
    #[derive(Debug)]
    enum ParseTestResult {
        Success(Value),                // Parsing should succeed with this value
        Kind(ParseErrorKind),          // Parsing should fail with this error kind
        SpecificError(&'static str),   // Parsing should fail with error containing this string
    }
    use ParseTestResult::*;

    /// Helper for successful parse test cases
    fn success<T: Into<Value>>(value: T) -> ParseTestResult {
        Success(value.into())
    }

    fn rational(n: i64, d: i64) -> Value {
        val(Rational::new(n, d).unwrap())
    }

    /// Run comprehensive parse tests with simplified error reporting and round-trip validation
    fn run_parse_tests(test_cases: Vec<(&str, ParseTestResult)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("Parse test #{}", i + 1);
            let result = parse_scheme(input);

            match (result, expected) {
                (Ok(actual), Success(expected_val)) => {
                    assert_eq!(actual, *expected_val, "{test_id}: value mismatch");

                    // Test round-trip: display -> parse -> display should be identical
                    let displayed = format!("{actual}");
                    let reparsed = parse_scheme(&displayed).unwrap_or_else(|e| {
                        panic!("{test_id}: round-trip parse failed for '{displayed}': {e:?}")
                    });
                    let redisplayed = format!("{reparsed}");
                    assert_eq!(
                        displayed, redisplayed,
                        "{test_id}: round-trip display mismatch for '{input}'"
                    );
                }
                (Err(Error::ParseError(err)), Kind(expected_kind)) => {
                    assert_eq!(err.kind, *expected_kind, "{test_id}: {err}");
                }
                (Err(err), SpecificError(expected_text)) => {
                    let error_msg = format!("{err}");
                    assert!(
                        error_msg.contains(expected_text),
                        "{test_id}: error should contain '{expected_text}', got: {error_msg}"
                    );
                }
                (Ok(actual), expected) => {
                    panic!("{test_id}: expected {expected:?}, got {actual:?}");
                }
                (Err(err), expected) => {
                    panic!("{test_id}: expected {expected:?}, got error {err:?}");
                }
            }
        }
    }

    #[test]
    #[expect(clippy::too_many_lines)] // Comprehensive test coverage is intentionally thorough
    fn test_parser_comprehensive() {
        use ParseErrorKind::*;

        let test_cases = vec![
            // ===== NUMBER PARSING =====
            // Decimal numbers
            ("42", success(42)),
            ("-5", success(-5)),
            ("+7", success(7)),
            ("0", success(0)),
            ("-0", success(0)),
            // Hexadecimal numbers
            ("#x1A", success(26)),
            ("#X1a", success(26)),
            ("#xff", success(255)),
            ("#x0", success(0)),
            // Edge cases - large integer literals
            ("9223372036854775807", success(i64::MAX)),
            ("-9223372036854775808", success(i64::MIN)),
            // Rationals keep their terms
            ("3/4", success(rational(3, 4))),
            ("-1/2", success(rational(-1, 2))),
            ("2/4", success(rational(2, 4))),
            // Reals
            ("1.5", success(1.5)),
            ("-0.25", success(-0.25)),
            ("2.", success(2.0)),
            (".5", success(0.5)),
            ("+0.75", success(0.75)),
            ("1e3", success(1000.0)),
            ("-2.5e-1", success(-0.25)),
            // Number parsing failures
            ("99999999999999999999", Kind(ImplementationLimit)),
            ("-99999999999999999999", Kind(ImplementationLimit)),
            ("#x1FFFFFFFFFFFFFFFF", Kind(ImplementationLimit)),
            ("1/0", Kind(ImplementationLimit)),
            ("#xG", Kind(InvalidSyntax)),
            ("#x", Kind(InvalidSyntax)),
            ("123abc", Kind(InvalidSyntax)),
            ("1/x", Kind(InvalidSyntax)),
            ("1.2.3", Kind(InvalidSyntax)),
            ("1.2e", Kind(InvalidSyntax)),
            // ===== IDENTIFIER PARSING =====
            ("foo", success(sym("foo"))),
            ("+", success(sym("+"))),
            ("-", success(sym("-"))),
            ("*", success(sym("*"))),
            ("/", success(sym("/"))),
            (">=", success(sym(">="))),
            ("test-name", success(sym("test-name"))),
            ("test/name", success(sym("test/name"))),
            ("test?name", success(sym("test?name"))),
            ("test$name", success(sym("test$name"))),
            ("var123", success(sym("var123"))),
            ("-abc", success(sym("-abc"))),
            // Invalid identifiers
            ("123var", Kind(InvalidSyntax)),
            ("-42name", Kind(InvalidSyntax)),
            ("test#tag", Kind(InvalidSyntax)),
            ("#t", Kind(InvalidSyntax)),
            ("a.b", Kind(InvalidSyntax)),
            ("@invalid", SpecificError("Invalid syntax near '@invalid'")),
            // ===== EMPTY LIST AND LISTS =====
            ("()", success(nil())),
            ("(   )", success(nil())),
            ("(\t\n)", success(nil())),
            ("(42)", success([42])),
            ("(1 2 3)", success([1, 2, 3])),
            ("( 1   2\t\n3 )", success([1, 2, 3])),
            ("(+ 3 4)", success(vec![sym("+"), val(3), val(4)])),
            (
                "(+ 1/2 1.5)",
                success(vec![sym("+"), rational(1, 2), val(1.5)]),
            ),
            ("((1 2) (3 4))", success([[1, 2], [3, 4]])),
            ("(((1)))", success([val([val([val(1)])])])),
            ("(+ ())", success(vec![sym("+"), nil()])),
            // ===== DOTTED PAIRS =====
            ("(3 . 4)", success(cons(3, 4))),
            ("(3 .4)", success([val(3), val(0.4)])),
            ("(1 2 . 3)", success(cons(1, cons(2, 3)))),
            ("(1 . (2 . ()))", success(cons(1, cons(2, nil())))),
            ("(+ (3 . 4))", success(vec![sym("+"), cons(3, 4)])),
            ("( . 4)", SpecificError("Unexpected '.'")),
            ("(1 . 2 3)", Kind(InvalidSyntax)),
            (".", Kind(InvalidSyntax)),
            // ===== WHITESPACE HANDLING =====
            ("  42  ", success(42)),
            ("\r\n  foo  \t", success(sym("foo"))),
            // ===== GENERAL ERROR CASES =====
            ("(1 2 3", Kind(Incomplete)),
            ("((1 2)", Kind(Incomplete)),
            ("(+ 1 (- 2", Kind(Incomplete)),
            ("(3 .", Kind(Incomplete)),
            ("", Kind(Incomplete)),
            ("   ", Kind(Incomplete)),
            ("1 2 3)", Kind(TrailingContent)),
            ("(1 2))", Kind(TrailingContent)),
            ("1 2", Kind(TrailingContent)),
            ("(+ 1 2) (+ 3 4)", SpecificError("Unexpected remaining input: '(+ 3 4)'")),
            (")", Kind(InvalidSyntax)),
            ("(1 @)", SpecificError("Unexpected character at position 3")),
            ("(1 @)", SpecificError("ParseError")),
        ];

        run_parse_tests(test_cases);
    }

    #[test]
    fn test_parser_depth_limits() {
        let at_limit = format!(
            "{}1{}",
            "(".repeat(MAX_PARSE_DEPTH),
            ")".repeat(MAX_PARSE_DEPTH)
        );
        let over_limit = format!(
            "{}1{}",
            "(".repeat(MAX_PARSE_DEPTH + 1),
            ")".repeat(MAX_PARSE_DEPTH + 1)
        );

        assert!(
            parse_scheme(&at_limit).is_ok(),
            "{MAX_PARSE_DEPTH} nested lists should parse"
        );

        match parse_scheme(&over_limit) {
            Err(Error::ParseError(err)) => {
                assert_eq!(err.kind, ParseErrorKind::TooDeeplyNested);
                assert!(err.message.contains("too deeply nested"));
            }
            other => panic!("expected depth error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_context() {
        let Err(Error::ParseError(err)) = parse_scheme("(+ 1 99999999999999999999)") else {
            panic!("expected parse error");
        };
        assert_eq!(err.kind, ParseErrorKind::ImplementationLimit);
        assert_eq!(err.found.as_deref(), Some("99999999999999999999"));
        assert!(err.context.is_some());

        let displayed = format!("{}", Error::ParseError(err));
        assert!(displayed.starts_with("ParseError: Integer literal out of range"));
        assert!(displayed.contains("\nFound: 99999999999999999999"));
    }

    #[test]
    fn test_comments() {
        let with_comments = ParseConfig {
            handle_comments: true,
        };

        let input = "; leading comment\n(+ 1 ; inline\n 2) ; trailing";
        assert_eq!(
            parse_scheme_with_config(input, with_comments).unwrap(),
            val(vec![sym("+"), val(1), val(2)])
        );

        // without the option a semicolon is just an invalid character
        assert!(parse_scheme(input).is_err());

        assert_eq!(strip_comments("a ; b\nc"), "a \nc");
        assert_eq!(strip_comments("no comment"), "no comment");
    }

    #[test]
    fn test_parse_program() {
        assert_eq!(
            parse_program("(+ 1 2) 3\n(3 . 4)").unwrap(),
            vec![val(vec![sym("+"), val(1), val(2)]), val(3), cons(3, 4)]
        );
        assert_eq!(parse_program("").unwrap(), Vec::<Value>::new());
        assert_eq!(parse_program("  \n ").unwrap(), Vec::<Value>::new());

        let with_comments = ParseConfig {
            handle_comments: true,
        };
        assert_eq!(
            parse_program_with_config("; nothing\n1 ; one\n2", with_comments).unwrap(),
            vec![val(1), val(2)]
        );

        let errors = vec![
            ("(+ 1 2) )", ParseErrorKind::InvalidSyntax),
            ("(+ 1 2) (", ParseErrorKind::Incomplete),
            ("1 2abc", ParseErrorKind::InvalidSyntax),
        ];
        for (i, (input, expected_kind)) in errors.into_iter().enumerate() {
            match parse_program(input) {
                Err(Error::ParseError(err)) => {
                    assert_eq!(err.kind, expected_kind, "Program test #{}: {err}", i + 1);
                }
                other => panic!("Program test #{}: expected parse error, got {other:?}", i + 1),
            }
        }
    }

    #[test]
    fn test_number_kinds_from_reader() {
        let cases = vec![
            ("7", Number::Integer(7)),
            ("#x10", Number::Integer(16)),
            ("1/3", Number::Rational(Rational::new(1, 3).unwrap())),
            ("0.5", Number::Real(0.5)),
        ];
        for (input, expected) in cases {
            let value = parse_scheme(input).unwrap();
            assert_eq!(value.downcast_ref::<Number>().unwrap(), &expected);
        }
    }

    #[test]
    fn test_real_literals_keep_their_fraction() {
        let cases = vec![
            ("1.5", 1.5_f64),
            ("-0.25", -0.25),
            ("2.25", 2.25),
            ("0.125", 0.125),
            ("12.0625", 12.0625),
            ("-.5", -0.5),
        ];
        for (i, (input, expected)) in cases.into_iter().enumerate() {
            let Value::Number(Number::Real(actual)) = parse_scheme(input).unwrap() else {
                panic!("Real test #{}: '{input}' should read as a real", i + 1);
            };
            assert_eq!(actual.to_bits(), expected.to_bits(), "Real test #{} '{input}'", i + 1);
        }

        assert_eq!(
            parse_scheme("(+ 1.5 2.25)").unwrap(),
            val(vec![sym("+"), val(1.5), val(2.25)])
        );
    }
}
