//! Simplify table for F4 symbolic preprocessing
//!
//! Memoisation of finished row reductions, keyed by (source polynomial,
//! multiplier term). Before the preprocessing phase materializes a product
//! `t · f`, it asks the table whether `f` (or `f` times a divisor of `t`)
//! has already been reduced; on a hit, the stored polynomial replaces the
//! multiplication *and* the reduction work.
//!
//! ## Concurrency contract
//! - The reducer inserts while preprocessing reads; both may target the same
//!   source polynomial. The two-level layout (outer map keyed by polynomial
//!   identity, sharded inner maps keyed by term) gives linearizable per-key
//!   updates with near-wait-free lookups.
//! - Inner tables are created lazily under the outer entry lock
//!   (double-checked publication); completed inserts are visible to any
//!   search that synchronizes with the inserting task.
//! - Stored polynomials are immutable (`Arc`), so a search never observes a
//!   partial value.
//!
//! The table is created empty at the start of a run, only grows, and is
//! discarded at run end.

#![forbid(unsafe_code)]

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::monoid::{Term, TermMonoid};
use crate::poly::Polynomial;

/// Outer key: polynomial *identity*, not value. Two `Arc`s compare equal iff
/// they are the same allocation.
#[derive(Clone)]
struct PolyKey(Arc<Polynomial>);

impl PartialEq for PolyKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for PolyKey {}

impl Hash for PolyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(Arc::as_ptr(&self.0) as usize);
    }
}

type Inner = DashMap<Term, Arc<Polynomial>>;

/// Concurrent two-level map from (polynomial, multiplier) to the polynomial
/// the product reduced to.
#[derive(Default)]
pub struct SimplifyTable {
    outer: DashMap<PolyKey, Arc<Inner>>,
}

impl SimplifyTable {
    /// Fresh, empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that multiplying `f` by `t` reduced to `p`. A later insert for
    /// the same `(f, t)` overwrites; the reducer only inserts stronger
    /// (later) results, so an overwrite never weakens the table.
    pub fn insert(&self, t: &Term, f: &Arc<Polynomial>, p: Arc<Polynomial>) {
        let inner = self
            .outer
            .entry(PolyKey(Arc::clone(f)))
            .or_insert_with(|| Arc::new(Inner::new()))
            .clone();
        inner.insert(t.clone(), p);
        debug!(
            target: "f4_algebra::simplify",
            multiplier = %t,
            support = f.len(),
            "recorded reduced product"
        );
    }

    /// Rewrite `(t, f)` using the strongest recorded reduction.
    ///
    /// While the table holds an entry for `f` whose key `t'` divides `t`,
    /// replace `t` with `t / t'` and `f` with the stored polynomial, picking
    /// the degree-maximal `t'` at each step (an exact match therefore always
    /// wins). When no entry applies, both arguments are left unchanged.
    ///
    /// The rewritten pair satisfies `(new t) · (new f) ≡ t · f` up to a
    /// scalar of the field the stored reductions were performed in.
    ///
    /// Returns whether at least one rewrite happened.
    pub fn search(&self, t: &mut Term, f: &mut Arc<Polynomial>, monoid: &TermMonoid) -> bool {
        let mut rewritten = false;
        loop {
            let inner = match self.outer.get(&PolyKey(Arc::clone(f))) {
                Some(entry) => Arc::clone(entry.value()),
                None => break,
            };
            let mut best: Option<(Term, Arc<Polynomial>)> = None;
            for entry in inner.iter() {
                if !t.divisible_by(entry.key()) {
                    continue;
                }
                let better = match &best {
                    Some((b, _)) => entry.key().deg() > b.deg(),
                    None => true,
                };
                if better {
                    best = Some((entry.key().clone(), Arc::clone(entry.value())));
                }
            }
            let (divisor, replacement) = match best {
                Some(hit) => hit,
                None => break,
            };
            if divisor.is_one() && Arc::ptr_eq(&replacement, f) {
                // An identity entry pointing back at its own source cannot
                // make progress.
                break;
            }
            trace!(
                target: "f4_algebra::simplify",
                divisor = %divisor,
                remaining = %t,
                "simplify hit"
            );
            *t = monoid.div(t, &divisor);
            *f = replacement;
            rewritten = true;
        }
        if !rewritten {
            trace!(target: "f4_algebra::simplify", multiplier = %t, "simplify miss");
        }
        rewritten
    }

    /// Total number of recorded (polynomial, multiplier) entries.
    pub fn len(&self) -> usize {
        self.outer.iter().map(|e| e.value().len()).sum()
    }

    /// True iff nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry (run teardown).
    pub fn clear(&self) {
        self.outer.clear();
    }
}
