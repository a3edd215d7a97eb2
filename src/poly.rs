//! Polynomials over the interned term monoid
//!
//! A polynomial is a pair of parallel arrays — coefficients and term handles
//! — plus the *sugar* degree tracked for the driver's selection strategy.
//! The representation is **canonical with respect to a field `F` and an
//! ordering `O`** when:
//!
//! - all coefficients are canonical representatives in `[0, p)` and non-zero;
//! - terms are pairwise distinct and sorted strictly decreasing under `O`
//!   (position 0 is the leading term);
//! - after `normalize`, a non-zero polynomial has leading coefficient 1.
//!
//! The zero polynomial is the empty support; constructors and `bring_in`
//! drop zero coefficients so the leading coefficient of a non-empty support
//! is never zero. Both the field and the ordering are per-operation
//! arguments, so a polynomial can be re-based into a new field or reordered
//! under a new ordering without rebuilding its terms.

#![forbid(unsafe_code)]
#![allow(missing_docs)]

use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;

use crate::field::{Coeff, FieldError, PrimeField};
use crate::monoid::{Term, TermMonoid};
use crate::order::TermCompare;

/// Errors surfaced by polynomial boundary operations.
#[derive(Debug, thiserror::Error)]
pub enum PolyError {
    /// Parallel arrays of different lengths.
    #[error("coefficient/term arrays differ in length ({coeffs} vs {terms})")]
    LengthMismatch { coeffs: usize, terms: usize },
    /// The support contains a repeated term, so ordering cannot be strict.
    #[error("duplicate term in support at position {position}")]
    DuplicateTerm { position: usize },
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// A finite ordered sequence of (coefficient, term) monomials plus sugar.
#[derive(Debug, Clone, Default)]
pub struct Polynomial {
    coeffs: Vec<Coeff>,
    terms: Vec<Term>,
    sugar: u64,
}

impl Polynomial {
    /// The zero polynomial (empty support, sugar 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parallel arrays, returning a checked result. Initial sugar
    /// is the total degree of the support.
    pub fn from_parts_r(coeffs: Vec<Coeff>, terms: Vec<Term>) -> Result<Self, PolyError> {
        if coeffs.len() != terms.len() {
            return Err(PolyError::LengthMismatch { coeffs: coeffs.len(), terms: terms.len() });
        }
        let sugar = terms.iter().map(Term::deg).max().unwrap_or(0);
        Ok(Self { coeffs, terms, sugar })
    }

    /// Build from parallel arrays (panics on length mismatch).
    pub fn from_parts(coeffs: Vec<Coeff>, terms: Vec<Term>) -> Self {
        Self::from_parts_r(coeffs, terms).expect("mismatched support arrays")
    }

    /// The monomial `1 · t`.
    pub fn from_term(t: Term) -> Self {
        let sugar = t.deg();
        Self { coeffs: vec![1], terms: vec![t], sugar }
    }

    /// Build from a monomial list as-is (duplicates and zero coefficients
    /// are kept; see [`from_monomials_purified`](Self::from_monomials_purified)).
    pub fn from_monomials(monos: impl IntoIterator<Item = (Coeff, Term)>) -> Self {
        let (coeffs, terms): (Vec<_>, Vec<_>) = monos.into_iter().unzip();
        Self::from_parts(coeffs, terms)
    }

    /// Build from a monomial list, folding duplicate terms by summing their
    /// coefficients in `field` and dropping the zero ones. First-seen term
    /// order is preserved; callers order afterwards.
    pub fn from_monomials_purified(
        monos: impl IntoIterator<Item = (Coeff, Term)>,
        field: &PrimeField,
    ) -> Self {
        let mut slot: HashMap<Term, usize> = HashMap::new();
        let mut coeffs: Vec<Coeff> = Vec::new();
        let mut terms: Vec<Term> = Vec::new();
        for (c, t) in monos {
            let c = field.reduce(c as i64);
            match slot.get(&t) {
                Some(&i) => coeffs[i] = field.add(coeffs[i], c),
                None => {
                    slot.insert(t.clone(), coeffs.len());
                    coeffs.push(c);
                    terms.push(t);
                }
            }
        }
        let mut out = Self { coeffs, terms, sugar: 0 };
        out.drop_zeros();
        out.sugar = out.deg();
        out
    }

    // ------------------------- Accessors -------------------------

    /// Zero iff the support is empty.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Support size.
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coefficient array of the support.
    #[inline]
    pub fn coeffs(&self) -> &[Coeff] {
        &self.coeffs
    }

    /// Term array of the support.
    #[inline]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Iterate the support in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (Coeff, &Term)> {
        self.coeffs.iter().copied().zip(self.terms.iter())
    }

    /// Total degree: maximum term degree over the support (0 when zero).
    pub fn deg(&self) -> u64 {
        self.terms.iter().map(Term::deg).max().unwrap_or(0)
    }

    /// Leading term, `None` on the zero polynomial.
    #[inline]
    pub fn lt_opt(&self) -> Option<&Term> {
        self.terms.first()
    }

    /// Leading coefficient, `None` on the zero polynomial.
    #[inline]
    pub fn lc_opt(&self) -> Option<Coeff> {
        self.coeffs.first().copied()
    }

    /// Leading term. Undefined (panics) on the zero polynomial.
    #[inline]
    pub fn lt(&self) -> &Term {
        self.lt_opt().expect("leading term of the zero polynomial")
    }

    /// Leading coefficient. Undefined (panics) on the zero polynomial.
    #[inline]
    pub fn lc(&self) -> Coeff {
        self.lc_opt().expect("leading coefficient of the zero polynomial")
    }

    /// LCM of the leading terms of `self` and `other`.
    pub fn lcm_lt(&self, other: &Polynomial, monoid: &TermMonoid) -> Term {
        monoid.lcm(self.lt(), other.lt())
    }

    /// The sugar degree (stored, not interpreted here).
    #[inline]
    pub fn sugar(&self) -> u64 {
        self.sugar
    }

    #[inline]
    pub fn set_sugar(&mut self, sugar: u64) {
        self.sugar = sugar;
    }

    // ------------------------- Multiplication -------------------------

    /// Multiply every term of the support by `t`, in place. Multiplication
    /// is order-preserving for any admissible ordering, so a sorted support
    /// stays sorted. Sugar advances by `deg(t)`.
    pub fn mul_term(&mut self, t: &Term, monoid: &TermMonoid) {
        if t.is_one() {
            return;
        }
        for s in &mut self.terms {
            *s = monoid.mul(s, t);
        }
        self.sugar += t.deg();
    }

    /// Bulk variant of [`mul_term`](Self::mul_term): produce
    /// `{t · s : s ∈ support}` across the worker pool, preserving the
    /// support order. Each worker goes through the monoid's internal
    /// synchronization independently.
    pub fn mul_all(&self, t: &Term, monoid: &TermMonoid) -> Polynomial {
        let terms: Vec<Term> = self
            .terms
            .par_iter()
            .map(|s| monoid.mul(s, t))
            .collect();
        Polynomial {
            coeffs: self.coeffs.clone(),
            terms,
            sugar: self.sugar + t.deg(),
        }
    }

    /// Multiply every coefficient by `lambda` in `field`, dropping the
    /// support entirely when `lambda` is zero.
    pub fn mul_scalar(&mut self, lambda: Coeff, field: &PrimeField) {
        if lambda == 0 {
            self.coeffs.clear();
            self.terms.clear();
            return;
        }
        for c in &mut self.coeffs {
            *c = field.mul(*c, lambda);
        }
    }

    // ------------------------- Canonical form -------------------------

    /// Scale so the leading coefficient is 1. No-op on zero or monic input.
    /// Fails only when the leading coefficient is not invertible, i.e. the
    /// support was not brought into `field` first.
    pub fn normalize(&mut self, field: &PrimeField) -> Result<(), FieldError> {
        let lc = match self.lc_opt() {
            Some(c) => c,
            None => return Ok(()),
        };
        if lc == 1 {
            return Ok(());
        }
        let inv = field.inv(lc)?;
        self.mul_scalar(inv, field);
        Ok(())
    }

    /// Reduce every coefficient to the canonical range of `field`, drop the
    /// monomials that vanish, then optionally [`normalize`](Self::normalize).
    pub fn bring_in(&mut self, field: &PrimeField, normalize: bool) -> Result<(), FieldError> {
        for c in &mut self.coeffs {
            *c = field.reduce(*c as i64);
        }
        self.drop_zeros();
        if normalize {
            self.normalize(field)?;
        }
        Ok(())
    }

    /// Stable permutation of the support into strictly decreasing order
    /// under `ord`. Duplicate terms are not expected here; a support built
    /// by [`from_monomials_purified`](Self::from_monomials_purified)
    /// contains none.
    pub fn order<O: TermCompare>(&mut self, ord: &O) {
        let mut support: Vec<(Coeff, Term)> = std::mem::take(&mut self.coeffs)
            .into_iter()
            .zip(std::mem::take(&mut self.terms))
            .collect();
        support.sort_by(|a, b| ord.cmp_terms(&b.1, &a.1));
        let (coeffs, terms) = support.into_iter().unzip();
        self.coeffs = coeffs;
        self.terms = terms;
    }

    /// Boundary operation: bring into `field`, sort decreasing under `ord`,
    /// verify the no-duplicate invariant, optionally normalize.
    pub fn canonicalize_r<O: TermCompare>(
        &mut self,
        field: &PrimeField,
        ord: &O,
        normalize: bool,
    ) -> Result<(), PolyError> {
        self.bring_in(field, false)?;
        self.order(ord);
        for (position, pair) in self.terms.windows(2).enumerate() {
            if pair[0] == pair[1] {
                return Err(PolyError::DuplicateTerm { position: position + 1 });
            }
        }
        if normalize {
            self.normalize(field)?;
        }
        Ok(())
    }

    /// Compact the support over the non-zero coefficients, preserving order.
    fn drop_zeros(&mut self) {
        if self.coeffs.iter().all(|&c| c != 0) {
            return;
        }
        let mut coeffs = Vec::with_capacity(self.coeffs.len());
        let mut terms = Vec::with_capacity(self.terms.len());
        for (c, t) in self.coeffs.drain(..).zip(self.terms.drain(..)) {
            if c != 0 {
                coeffs.push(c);
                terms.push(t);
            }
        }
        self.coeffs = coeffs;
        self.terms = terms;
    }
}

/// Structural equality: identical (coefficient, term) sequences. Sugar is a
/// selection-strategy annotation and does not participate.
impl PartialEq for Polynomial {
    fn eq(&self, other: &Self) -> bool {
        self.coeffs == other.coeffs && self.terms == other.terms
    }
}
impl Eq for Polynomial {}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::parse::write_poly(f, self, 1)
    }
}
