//! Surface syntax: parser and canonical printer
//!
//! Grammar for a single polynomial:
//!
//! ```text
//! poly     := signedTerm (('+'|'-') term)*
//! term     := coeff ('*' factor)* | factor ('*' factor)*
//! factor   := 'x[' index ']' ('^' exponent)?
//! coeff    := [0-9]+
//! index    := [0-9]+
//! exponent := [0-9]+
//! ```
//!
//! Whitespace is permitted between tokens. The `min` parameter fixes the
//! smallest accepted indeterminate index: `x[k]` maps to exponent position
//! `k - min`. A leading `-` applies to the first term; signs are folded into
//! the coefficient field immediately, so parsed coefficients are canonical.
//!
//! The printer emits the same surface form the parser accepts (coefficient 1
//! omitted on non-constant monomials, exponent 1 omitted), so
//! `parse(print(P)) == P` for any canonical `P` under the same monoid, field
//! and ordering.

#![forbid(unsafe_code)]

use std::fmt;

use itertools::Itertools;

use crate::field::PrimeField;
use crate::monoid::{Exp, Term, TermMonoid};
use crate::poly::Polynomial;

/// Errors surfaced by the parser.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// A character outside the grammar.
    #[error("unexpected character '{found}' at byte {at}")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Byte offset in the input.
        at: usize,
    },
    /// Input ended inside a production.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// A specific token was required.
    #[error("expected {what} at byte {at}")]
    Expected {
        /// Description of the missing token.
        what: &'static str,
        /// Byte offset in the input.
        at: usize,
    },
    /// A numeric token does not fit its domain.
    #[error("numeric token at byte {at} does not fit")]
    NumberOverflow {
        /// Byte offset of the token.
        at: usize,
    },
    /// An indeterminate index outside `[min, min + N)`.
    #[error("index {index} out of range [{min}, {end})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Smallest accepted index.
        min: usize,
        /// One past the largest accepted index.
        end: usize,
    },
    /// An exponent beyond the monoid's per-variable capacity.
    #[error("exponent {exp} exceeds monoid capacity {max}")]
    ExponentOverflow {
        /// The offending exponent.
        exp: u64,
        /// The monoid's capacity.
        max: Exp,
    },
    /// Empty input where a polynomial or term was required.
    #[error("empty input")]
    Empty,
}

// ---------------------------- Cursor ----------------------------

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { bytes: s.as_bytes(), pos: 0 }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos >= self.bytes.len()
    }

    /// Consume `b` (after whitespace) if it is next.
    fn eat(&mut self, b: u8) -> bool {
        self.skip_ws();
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8, what: &'static str) -> Result<(), ParseError> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.fail(what))
        }
    }

    fn fail(&self, what: &'static str) -> ParseError {
        match self.bytes.get(self.pos) {
            Some(&c) => ParseError::Expected { what, at: self.pos }.or_char(c, self.pos),
            None => ParseError::UnexpectedEnd,
        }
    }

    /// Parse `[0-9]+` into a `u64`, rejecting overflow.
    fn number(&mut self) -> Result<u64, ParseError> {
        self.skip_ws();
        let start = self.pos;
        let mut value: u64 = 0;
        let mut any = false;
        while let Some(b) = self.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            any = true;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((b - b'0') as u64))
                .ok_or(ParseError::NumberOverflow { at: start })?;
            self.pos += 1;
        }
        if !any {
            return Err(self.fail("a digit"));
        }
        Ok(value)
    }
}

impl ParseError {
    /// Prefer the concrete-character report over the generic expectation.
    fn or_char(self, c: u8, at: usize) -> ParseError {
        if c.is_ascii_graphic() || c == b' ' {
            ParseError::UnexpectedChar { found: c as char, at }
        } else {
            self
        }
    }
}

// ---------------------------- Productions ----------------------------

/// `factor := 'x[' index ']' ('^' exponent)?`, accumulated into `exps`.
fn factor(
    cur: &mut Cursor<'_>,
    monoid: &TermMonoid,
    min: usize,
    exps: &mut [u64],
) -> Result<(), ParseError> {
    cur.expect(b'x', "an indeterminate")?;
    cur.expect(b'[', "'['")?;
    let index = cur.number()? as usize;
    let end = min + monoid.arity();
    if index < min || index >= end {
        return Err(ParseError::IndexOutOfRange { index, min, end });
    }
    cur.expect(b']', "']'")?;
    let exp = if cur.eat(b'^') { cur.number()? } else { 1 };
    let max = monoid.exp_capacity();
    if exp > max as u64 {
        return Err(ParseError::ExponentOverflow { exp, max });
    }
    exps[index - min] += exp;
    Ok(())
}

/// `term := coeff ('*' factor)* | factor ('*' factor)*`.
///
/// Returns the (unsigned) coefficient token, defaulting to 1, and the
/// accumulated exponent vector.
fn term_body(
    cur: &mut Cursor<'_>,
    monoid: &TermMonoid,
    min: usize,
) -> Result<(u64, Vec<u64>), ParseError> {
    let mut exps = vec![0u64; monoid.arity()];
    cur.skip_ws();
    let coeff_at = cur.pos;
    let coeff = match cur.peek() {
        Some(b) if b.is_ascii_digit() => cur.number()?,
        Some(b'x') => {
            factor(cur, monoid, min, &mut exps)?;
            1
        }
        _ => return Err(cur.fail("a coefficient or an indeterminate")),
    };
    if coeff > u32::MAX as u64 {
        return Err(ParseError::NumberOverflow { at: coeff_at });
    }
    while cur.eat(b'*') {
        factor(cur, monoid, min, &mut exps)?;
    }
    finish_exps(monoid, &exps)?;
    Ok((coeff, exps))
}

/// Validate accumulated exponents against the monoid capacity.
fn finish_exps(monoid: &TermMonoid, exps: &[u64]) -> Result<(), ParseError> {
    let max = monoid.exp_capacity();
    for &e in exps {
        if e > max as u64 {
            return Err(ParseError::ExponentOverflow { exp: e, max });
        }
    }
    Ok(())
}

fn to_term(monoid: &TermMonoid, exps: &[u64]) -> Term {
    let narrow: Vec<Exp> = exps.iter().map(|&e| e as Exp).collect();
    monoid.create(&narrow)
}

/// Parse a single polynomial. Signs are folded through `field`, duplicate
/// terms are purified, and zero monomials are dropped, so the result is
/// field-canonical; call `order` before relying on the leading term.
pub fn parse_poly(
    s: &str,
    monoid: &TermMonoid,
    field: &PrimeField,
    min: usize,
) -> Result<Polynomial, ParseError> {
    let mut cur = Cursor::new(s);
    if cur.at_end() {
        return Err(ParseError::Empty);
    }
    let mut monos = Vec::new();
    let mut negative = cur.eat(b'-');
    loop {
        let (coeff, exps) = term_body(&mut cur, monoid, min)?;
        let reduced = field.reduce(coeff as i64);
        let signed = if negative { field.neg(reduced) } else { reduced };
        monos.push((signed, to_term(monoid, &exps)));
        if cur.eat(b'+') {
            negative = false;
        } else if cur.eat(b'-') {
            negative = true;
        } else {
            break;
        }
    }
    if !cur.at_end() {
        return Err(cur.fail("'+', '-' or end of input"));
    }
    Ok(Polynomial::from_monomials_purified(monos, field))
}

/// Parse a `, `-separated list of polynomials.
pub fn parse_poly_list(
    s: &str,
    monoid: &TermMonoid,
    field: &PrimeField,
    min: usize,
) -> Result<Vec<Polynomial>, ParseError> {
    s.split(',')
        .map(|item| parse_poly(item, monoid, field, min))
        .collect()
}

/// Parse a single term (a factor product, no coefficient), e.g.
/// `x[1]^2*x[3]`. Used by `TermMonoid::create_from_string`.
pub fn parse_term(monoid: &TermMonoid, s: &str, min: usize) -> Result<Term, ParseError> {
    let mut cur = Cursor::new(s);
    if cur.at_end() {
        return Err(ParseError::Empty);
    }
    let mut exps = vec![0u64; monoid.arity()];
    cur.skip_ws();
    factor(&mut cur, monoid, min, &mut exps)?;
    while cur.eat(b'*') {
        factor(&mut cur, monoid, min, &mut exps)?;
    }
    if !cur.at_end() {
        return Err(cur.fail("'*' or end of input"));
    }
    finish_exps(monoid, &exps)?;
    Ok(to_term(monoid, &exps))
}

// ---------------------------- Printer ----------------------------

/// Write `poly` in the canonical surface form with indices offset by `min`.
pub(crate) fn write_poly(
    f: &mut fmt::Formatter<'_>,
    poly: &Polynomial,
    min: usize,
) -> fmt::Result {
    if poly.is_zero() {
        return write!(f, "0");
    }
    write!(
        f,
        "{}",
        poly.iter().format_with(" + ", |(c, t), g| {
            if t.is_one() {
                g(&c)
            } else if c == 1 {
                g(&t.display_base(min))
            } else {
                g(&format_args!("{}*{}", c, t.display_base(min)))
            }
        })
    )
}

/// [`Polynomial`] display adapter carrying the index base.
pub struct PolyDisplay<'a> {
    poly: &'a Polynomial,
    min: usize,
}

impl fmt::Display for PolyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_poly(f, self.poly, self.min)
    }
}

impl Polynomial {
    /// Render with indeterminate indices offset by `min` (the parser's base).
    pub fn display_base(&self, min: usize) -> PolyDisplay<'_> {
        PolyDisplay { poly: self, min }
    }
}
