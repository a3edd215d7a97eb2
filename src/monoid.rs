//! Interned term monoid
//!
//! The commutative monoid of terms (power products) over `n` indeterminates.
//! Exponent vectors are **hash-consed**: [`TermMonoid::create`] returns the
//! unique [`Term`] handle for a given vector, so term identity is a pointer
//! comparison and the derived attributes (exponents, total degree, packed
//! hash) are computed exactly once.
//!
//! ## Invariants
//! - Two `create` calls with equal exponent vectors yield the *same* handle,
//!   including calls racing from different threads (the intern map performs a
//!   sharded insert-or-return; the critical section is bounded and never
//!   suspends).
//! - Interned data is immutable for the lifetime of the monoid and freely
//!   shareable across threads.
//! - Handles from different monoids must not be combined. Hot operations
//!   `debug_assert!` ownership; boundary code can use
//!   [`TermMonoid::check_owned`].
//!
//! The cached hash is the degree-packed mix fixed by the design: start with
//! `e_0`, then for each later exponent shift left by the monoid's per-variable
//! bit budget `d` and add. With `n·d` within the word this is a radix-`2^d`
//! encoding of the whole vector; beyond it, collisions are tolerated.

#![forbid(unsafe_code)]

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::parse::{self, ParseError};

/// A single exponent.
pub type Exp = u32;

/// Errors surfaced by monoid boundary operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MonoidError {
    /// An exponent vector of the wrong length reached `create`.
    #[error("exponent vector must have {expected} entries (got {got})")]
    BadArity {
        /// The monoid's number of indeterminates.
        expected: usize,
        /// Length of the offending vector.
        got: usize,
    },
    /// An exponent exceeds the monoid's per-variable capacity.
    #[error("exponent {exp} at position {index} exceeds capacity {max}")]
    ExponentOverflow {
        /// Position of the offending exponent.
        index: usize,
        /// The offending exponent.
        exp: Exp,
        /// The monoid's per-variable capacity.
        max: Exp,
    },
    /// A handle produced by a different monoid was presented.
    #[error("term handle belongs to a different monoid")]
    ForeignTerm,
    /// Construction parameters outside the supported range.
    #[error("bad monoid parameters: {0}")]
    BadParams(&'static str),
}

/// Interned payload behind a [`Term`] handle.
#[derive(Debug)]
struct TermData {
    exps: Box<[Exp]>,
    deg: u64,
    hash: u64,
    owner: u64,
}

/// Handle to a unique interned term.
///
/// Cheap to clone (one reference count). Equality takes the pointer fast
/// path and falls back to exponent comparison; `Hash` writes the cached
/// degree-packed hash.
#[derive(Clone)]
pub struct Term(Arc<TermData>);

impl Term {
    /// The exponent vector, length `n` of the owning monoid.
    #[inline]
    pub fn exps(&self) -> &[Exp] {
        &self.0.exps
    }

    /// Total degree (sum of exponents), precomputed at interning time.
    #[inline]
    pub fn deg(&self) -> u64 {
        self.0.deg
    }

    /// The cached degree-packed hash.
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.0.hash
    }

    /// Whether this is the identity term (all exponents zero).
    #[inline]
    pub fn is_one(&self) -> bool {
        self.0.deg == 0
    }

    /// Pointer identity: true iff both handles denote the same interned slot.
    #[inline]
    pub fn same(&self, other: &Term) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// True iff `self` is divisible by `other`, i.e. every exponent of
    /// `other` is ≤ the matching exponent of `self`.
    #[inline]
    pub fn divisible_by(&self, other: &Term) -> bool {
        debug_assert_eq!(self.0.owner, other.0.owner, "terms from different monoids");
        if self.0.deg < other.0.deg {
            return false;
        }
        self.exps()
            .iter()
            .zip(other.exps())
            .all(|(&a, &b)| a >= b)
    }

    /// Render with indeterminate indices offset by `min` (the parser's base).
    pub fn display_base(&self, min: usize) -> TermDisplay<'_> {
        TermDisplay { term: self, min }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.exps == other.0.exps
    }
}
impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Term({})", self)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_base(1).fmt(f)
    }
}

/// [`Term`] display adapter carrying the index base.
pub struct TermDisplay<'a> {
    term: &'a Term,
    min: usize,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.term.is_one() {
            return write!(f, "1");
        }
        let mut first = true;
        for (i, &e) in self.term.exps().iter().enumerate() {
            if e == 0 {
                continue;
            }
            if !first {
                write!(f, "*")?;
            }
            first = false;
            write!(f, "x[{}]", i + self.min)?;
            if e > 1 {
                write!(f, "^{}", e)?;
            }
        }
        Ok(())
    }
}

/// Process-unique monoid ids, stamped into every handle.
static NEXT_MONOID_ID: AtomicU64 = AtomicU64::new(1);

/// Factory and interning store for canonical terms over `n` indeterminates.
pub struct TermMonoid {
    n: usize,
    d: u32,
    id: u64,
    one: Term,
    interner: DashMap<Box<[Exp]>, Term>,
}

impl fmt::Debug for TermMonoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermMonoid")
            .field("n", &self.n)
            .field("d", &self.d)
            .field("len", &self.interner.len())
            .finish()
    }
}

impl TermMonoid {
    /// Construct a monoid over `n ≥ 1` indeterminates with per-exponent bit
    /// budget `d`, returning a checked result. `n · d` must stay within the
    /// 64-bit word so the packed hash does not alias catastrophically.
    pub fn new_r(n: usize, d: u32) -> Result<Self, MonoidError> {
        if n == 0 {
            return Err(MonoidError::BadParams("need at least one indeterminate"));
        }
        if d == 0 || d > 32 {
            return Err(MonoidError::BadParams("bit budget d must be in 1..=32"));
        }
        if n as u64 * d as u64 > 64 {
            return Err(MonoidError::BadParams("n*d exceeds the 64-bit hash word"));
        }
        let id = NEXT_MONOID_ID.fetch_add(1, AtomicOrdering::Relaxed);
        let zeros = vec![0 as Exp; n].into_boxed_slice();
        let one = Term(Arc::new(TermData {
            hash: packed_hash(&zeros, d),
            deg: 0,
            exps: zeros.clone(),
            owner: id,
        }));
        let interner = DashMap::new();
        interner.insert(zeros, one.clone());
        Ok(Self { n, d, id, one, interner })
    }

    /// Construct a monoid (panics on invalid parameters).
    pub fn new(n: usize, d: u32) -> Self {
        Self::new_r(n, d).expect("invalid monoid parameters")
    }

    /// Number of indeterminates.
    #[inline]
    pub fn arity(&self) -> usize {
        self.n
    }

    /// Largest exponent the surface syntax accepts: `2^d − 1`.
    #[inline]
    pub fn exp_capacity(&self) -> Exp {
        if self.d >= 32 {
            Exp::MAX
        } else {
            ((1u64 << self.d) - 1) as Exp
        }
    }

    /// Number of distinct terms interned so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.interner.len()
    }

    /// True iff only the identity term has been interned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.interner.len() <= 1
    }

    /// The identity term (all exponents zero).
    #[inline]
    pub fn one(&self) -> Term {
        self.one.clone()
    }

    /// True iff `t` was produced by this monoid.
    #[inline]
    pub fn owns(&self, t: &Term) -> bool {
        t.0.owner == self.id
    }

    /// Boundary check for foreign handles.
    pub fn check_owned(&self, t: &Term) -> Result<(), MonoidError> {
        if self.owns(t) {
            Ok(())
        } else {
            Err(MonoidError::ForeignTerm)
        }
    }

    /// The unique handle for `exps`. Idempotent; safe to call concurrently
    /// (racing inserts of the same vector converge on one handle).
    ///
    /// `exps` must have length [`arity`](Self::arity).
    pub fn create(&self, exps: &[Exp]) -> Term {
        assert_eq!(exps.len(), self.n, "exponent vector has the wrong arity");
        self.intern(exps)
    }

    /// Checked variant of [`create`](Self::create): validates arity and the
    /// per-variable capacity.
    pub fn create_r(&self, exps: &[Exp]) -> Result<Term, MonoidError> {
        if exps.len() != self.n {
            return Err(MonoidError::BadArity { expected: self.n, got: exps.len() });
        }
        let max = self.exp_capacity();
        for (index, &exp) in exps.iter().enumerate() {
            if exp > max {
                return Err(MonoidError::ExponentOverflow { index, exp, max });
            }
        }
        Ok(self.intern(exps))
    }

    /// Parse a single term in the surface syntax (e.g. `x[1]^2*x[3]`),
    /// with `min` as the smallest accepted indeterminate index.
    pub fn create_from_string(&self, s: &str, min: usize) -> Result<Term, ParseError> {
        parse::parse_term(self, s, min)
    }

    fn intern(&self, exps: &[Exp]) -> Term {
        if let Some(existing) = self.interner.get(exps) {
            return existing.clone();
        }
        // Vacant (or raced): insert-or-return under the shard lock. The
        // candidate built here is discarded if another thread won the race.
        self.interner
            .entry(exps.to_vec().into_boxed_slice())
            .or_insert_with(|| {
                trace!(target: "f4_algebra::monoid", deg = deg_of(exps), "interning new term");
                Term(Arc::new(TermData {
                    exps: exps.to_vec().into_boxed_slice(),
                    deg: deg_of(exps),
                    hash: packed_hash(exps, self.d),
                    owner: self.id,
                }))
            })
            .clone()
    }

    // ------------------------- Term operations -------------------------
    //
    // Componentwise on exponent vectors; inputs are never mutated. The
    // divisibility precondition of `div` is asserted in debug builds only.

    /// `a · b`: exponents added, result interned. Identity operands short-circuit.
    pub fn mul(&self, a: &Term, b: &Term) -> Term {
        debug_assert!(self.owns(a) && self.owns(b), "foreign term handle");
        if b.is_one() {
            return a.clone();
        }
        if a.is_one() {
            return b.clone();
        }
        let sum: Vec<Exp> = a
            .exps()
            .iter()
            .zip(b.exps())
            .map(|(&x, &y)| x + y)
            .collect();
        self.intern(&sum)
    }

    /// `a / b`. Precondition: `a.divisible_by(b)`.
    pub fn div(&self, a: &Term, b: &Term) -> Term {
        debug_assert!(self.owns(a) && self.owns(b), "foreign term handle");
        debug_assert!(a.divisible_by(b), "div precondition violated");
        if b.is_one() {
            return a.clone();
        }
        let diff: Vec<Exp> = a
            .exps()
            .iter()
            .zip(b.exps())
            .map(|(&x, &y)| x - y)
            .collect();
        self.intern(&diff)
    }

    /// Least common multiple: per-coordinate maximum, interned.
    pub fn lcm(&self, a: &Term, b: &Term) -> Term {
        debug_assert!(self.owns(a) && self.owns(b), "foreign term handle");
        if a.is_one() {
            return b.clone();
        }
        if b.is_one() {
            return a.clone();
        }
        let max: Vec<Exp> = a
            .exps()
            .iter()
            .zip(b.exps())
            .map(|(&x, &y)| x.max(y))
            .collect();
        self.intern(&max)
    }
}

#[inline]
fn deg_of(exps: &[Exp]) -> u64 {
    exps.iter().map(|&e| e as u64).sum()
}

#[inline]
fn packed_hash(exps: &[Exp], d: u32) -> u64 {
    let mut h = exps[0] as u64;
    for &e in &exps[1..] {
        h = (h << d).wrapping_add(e as u64);
    }
    h
}
