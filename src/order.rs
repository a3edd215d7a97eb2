//! Term orderings
//!
//! Pure comparators on interned term handles. The three admissible orders
//! (Lex, DegLex, DegRevLex) are a closed enum; [`TermCompare`] is the escape
//! hatch for callers that bring their own ordering. All variants are total
//! orders on handles of a common monoid and respect multiplication:
//! `a ≼ b` implies `a·c ≼ b·c`.

#![forbid(unsafe_code)]
#![allow(missing_docs)]

use std::cmp::Ordering;

use crate::monoid::Term;
use crate::poly::Polynomial;

/// Comparator strategy over term handles.
pub trait TermCompare {
    /// Three-way comparison of two handles from a common monoid.
    fn cmp_terms(&self, a: &Term, b: &Term) -> Ordering;
}

/// The built-in monomial orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonomialOrder {
    /// Compare the first coordinate where the exponents differ; the larger
    /// exponent wins.
    Lex,
    /// Total degree first; ties broken by [`Lex`](MonomialOrder::Lex).
    DegLex,
    /// Total degree first; on ties, the last coordinate where the exponents
    /// differ decides with the comparison swapped (the term with the smaller
    /// exponent at the later position is the larger term).
    DegRevLex,
}

impl MonomialOrder {
    pub fn cmp(&self, a: &Term, b: &Term) -> Ordering {
        if a.same(b) {
            return Ordering::Equal;
        }
        match self {
            MonomialOrder::Lex => lex(a, b),
            MonomialOrder::DegLex => a.deg().cmp(&b.deg()).then_with(|| lex(a, b)),
            MonomialOrder::DegRevLex => a.deg().cmp(&b.deg()).then_with(|| revlex(a, b)),
        }
    }
}

impl TermCompare for MonomialOrder {
    #[inline]
    fn cmp_terms(&self, a: &Term, b: &Term) -> Ordering {
        self.cmp(a, b)
    }
}

#[inline]
fn lex(a: &Term, b: &Term) -> Ordering {
    for (&x, &y) in a.exps().iter().zip(b.exps()) {
        match x.cmp(&y) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

#[inline]
fn revlex(a: &Term, b: &Term) -> Ordering {
    for (&x, &y) in a.exps().iter().zip(b.exps()).rev() {
        match y.cmp(&x) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

/// Orders polynomials by their leading term under `order`; `descending`
/// flips the direction. The zero polynomial sorts below everything.
#[derive(Debug, Clone, Copy)]
pub struct HeadOrder<O = MonomialOrder> {
    pub order: O,
    pub descending: bool,
}

impl<O: TermCompare> HeadOrder<O> {
    pub fn new(order: O, descending: bool) -> Self {
        Self { order, descending }
    }

    pub fn cmp_polys(&self, a: &Polynomial, b: &Polynomial) -> Ordering {
        let ord = match (a.lt_opt(), b.lt_opt()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => self.order.cmp_terms(x, y),
        };
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monoid::TermMonoid;

    #[test]
    fn lex_prefers_earlier_coordinates() {
        let m = TermMonoid::new(2, 8);
        // x[1] vs x[2]^5
        let a = m.create(&[1, 0]);
        let b = m.create(&[0, 5]);
        assert_eq!(MonomialOrder::Lex.cmp(&a, &b), Ordering::Greater);
        assert_eq!(MonomialOrder::DegLex.cmp(&a, &b), Ordering::Less);
    }

    #[test]
    fn degrevlex_breaks_degree_ties_from_the_back() {
        let m = TermMonoid::new(2, 8);
        // Equal degree: x[1]^2*x[2] > x[1]*x[2]^2
        let a = m.create(&[2, 1]);
        let b = m.create(&[1, 2]);
        assert_eq!(MonomialOrder::DegRevLex.cmp(&a, &b), Ordering::Greater);
        assert_eq!(MonomialOrder::DegRevLex.cmp(&b, &a), Ordering::Less);
    }

    #[test]
    fn orders_are_total_and_antisymmetric_on_samples() {
        let m = TermMonoid::new(3, 8);
        let sample: Vec<_> = [
            [0, 0, 0],
            [1, 0, 0],
            [0, 1, 0],
            [0, 0, 1],
            [2, 1, 0],
            [1, 2, 0],
            [1, 1, 1],
            [3, 0, 2],
        ]
        .iter()
        .map(|e| m.create(e))
        .collect();
        for ord in [MonomialOrder::Lex, MonomialOrder::DegLex, MonomialOrder::DegRevLex] {
            for a in &sample {
                for b in &sample {
                    let ab = ord.cmp(a, b);
                    let ba = ord.cmp(b, a);
                    assert_eq!(ab, ba.reverse());
                    assert_eq!(ab == Ordering::Equal, a.same(b));
                }
            }
        }
    }

    #[test]
    fn head_order_compares_polynomials_by_leading_term() {
        use crate::poly::Polynomial;
        let m = TermMonoid::new(2, 8);
        let a = Polynomial::from_term(m.create(&[2, 0]));
        let b = Polynomial::from_term(m.create(&[1, 1]));
        let zero = Polynomial::new();

        let asc = HeadOrder::new(MonomialOrder::DegRevLex, false);
        assert_eq!(asc.cmp_polys(&a, &b), Ordering::Greater);
        assert_eq!(asc.cmp_polys(&zero, &a), Ordering::Less);
        assert_eq!(asc.cmp_polys(&zero, &zero), Ordering::Equal);

        let desc = HeadOrder::new(MonomialOrder::DegRevLex, true);
        assert_eq!(desc.cmp_polys(&a, &b), Ordering::Less);
    }

    #[test]
    fn multiplication_compatibility() {
        let m = TermMonoid::new(3, 8);
        let a = m.create(&[2, 0, 1]);
        let b = m.create(&[1, 1, 1]);
        let c = m.create(&[0, 3, 2]);
        for ord in [MonomialOrder::Lex, MonomialOrder::DegLex, MonomialOrder::DegRevLex] {
            assert_eq!(ord.cmp(&a, &b), ord.cmp(&m.mul(&a, &c), &m.mul(&b, &c)));
        }
    }
}
