//! Crate root: public surface, core aliases, and engine-wide invariants
//!
//! This crate is the symbolic-algebra core that makes F4 Gröbner basis
//! computation feasible: the hash-consed term monoid, polynomials over a
//! word-sized prime field with pluggable orderings, and the concurrent
//! simplify cache consulted during symbolic preprocessing. The pair
//! scheduler, the linear-algebra reducer and all I/O live outside this crate
//! and consume the interfaces re-exported here.
//!
//! ## Invariants
//!
//! - **Interning.** `TermMonoid::create` is idempotent: equal exponent
//!   vectors yield the *same* handle, even under concurrent calls, so term
//!   identity is a pointer comparison. Degree and the degree-packed hash are
//!   computed once, at interning time.
//! - **Canonical form.** A polynomial is canonical with respect to a field
//!   and an ordering when its coefficients are reduced and non-zero, its
//!   terms are distinct and strictly decreasing, and (after `normalize`) its
//!   leading coefficient is 1. The zero polynomial is the empty support.
//!   `bring_in` and `order` establish the form; both the field and the
//!   ordering are per-operation arguments, so rebasing a polynomial into a
//!   new field or ordering never rebuilds its terms.
//! - **Shared state.** The only mutable state shared across workers is the
//!   monoid's intern map and the simplify table; both are sharded maps with
//!   linearizable per-key updates. Everything interned or published is
//!   immutable afterwards.
//! - **Errors.** Boundary operations return precise `thiserror` values;
//!   hot-loop term and field operations assume their documented
//!   preconditions and `debug_assert!` them (`inv(0)` is always checked).
//!
//! ## Worker pool
//!
//! The number of worker threads is the only runtime parameter the engine
//! observes; build a pool with [`build_worker_pool`] and run bulk operations
//! (e.g. [`Polynomial::mul_all`]) inside `pool.install`.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms)]

/// Coefficient field Z/pZ with precomputed inverses.
pub mod field;
/// Hash-consed term monoid and term operations.
pub mod monoid;
/// Term ordering strategies (Lex, DegLex, DegRevLex).
pub mod order;
/// Surface syntax: parser and canonical printer.
pub mod parse;
/// Polynomials: parallel coefficient/term arrays plus sugar.
pub mod poly;
/// Concurrent simplify table for F4 symbolic preprocessing.
pub mod simplify;

// ============================================================================
// Canonical aliases and root-level re-exports (centralization)
// ============================================================================

pub use crate::field::{Coeff, FieldError, PrimeField, MAX_MODULUS};
pub use crate::monoid::{Exp, MonoidError, Term, TermMonoid};
pub use crate::order::{HeadOrder, MonomialOrder, TermCompare};
pub use crate::parse::{parse_poly, parse_poly_list, parse_term, ParseError};
pub use crate::poly::{PolyError, Polynomial};
pub use crate::simplify::SimplifyTable;

// ============================================================================
// Worker pool
// ============================================================================

/// Build the worker pool the driver hands to the engine. `threads == 0`
/// delegates the choice to the runtime (one worker per core).
pub fn build_worker_pool(
    threads: usize,
) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new().num_threads(threads).build()
}
