//! End-to-end driver scenarios over the public surface.
//!
//! Fixture: N = 2 indeterminates `x[1]`, `x[2]`, p = 32003, DegRevLex —
//! the shape an F4 driver sets up before scheduling critical pairs.

use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use f4_algebra::{
    parse_poly, parse_term, MonomialOrder, ParseError, Polynomial, PrimeField, SimplifyTable,
    TermMonoid,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn fixture() -> (TermMonoid, PrimeField) {
    init_tracing();
    (TermMonoid::new(2, 8), PrimeField::new(32003))
}

#[test]
fn binomial_square_orders_under_degrevlex() -> Result<()> {
    let (m, f) = fixture();
    let mut p = parse_poly("x[1]^2 + 2*x[1]*x[2] + x[2]^2", &m, &f, 1)?;
    p.order(&MonomialOrder::DegRevLex);
    assert_eq!(p.len(), 3);
    assert_eq!(p.deg(), 2);
    assert_eq!(p.lc(), 1);
    assert!(p.lt().same(&m.create(&[2, 0])));
    Ok(())
}

#[test]
fn bring_in_and_normalize_scale_by_the_inverse_leading_coefficient() -> Result<()> {
    let (m, f) = fixture();
    let mut p = parse_poly("3*x[1] + 2", &m, &f, 1)?;
    p.order(&MonomialOrder::DegRevLex);
    p.bring_in(&f, true)?;
    assert_eq!(p.to_string(), "x[1] + 21336");
    Ok(())
}

#[test]
fn lcm_division_and_divisibility_of_leading_terms() -> Result<()> {
    let (m, _f) = fixture();
    let a = parse_term(&m, "x[1]^3*x[2]", 1)?;
    let b = parse_term(&m, "x[1]*x[2]^2", 1)?;
    let l = m.lcm(&a, &b);
    assert!(l.same(&m.create(&[3, 2])));
    assert!(l.divisible_by(&a));
    assert!(l.divisible_by(&b));
    assert!(m.div(&l, &a).same(&parse_term(&m, "x[2]", 1)?));
    assert!(m.div(&l, &b).same(&parse_term(&m, "x[1]^2", 1)?));
    Ok(())
}

#[test]
fn the_three_orderings_disagree_exactly_where_expected() -> Result<()> {
    let (m, _f) = fixture();
    let x1 = m.create(&[1, 0]);
    let x2_5 = m.create(&[0, 5]);
    assert_eq!(MonomialOrder::Lex.cmp(&x1, &x2_5), Ordering::Greater);
    assert_eq!(MonomialOrder::DegLex.cmp(&x1, &x2_5), Ordering::Less);

    let a = m.create(&[2, 1]);
    let b = m.create(&[1, 2]);
    assert_eq!(MonomialOrder::DegRevLex.cmp(&a, &b), Ordering::Greater);
    Ok(())
}

#[test]
fn simplify_table_replays_a_recorded_reduction() -> Result<()> {
    let (m, f) = fixture();
    let table = SimplifyTable::new();

    let mut src = parse_poly("x[1]^2 + 1", &m, &f, 1)?;
    src.order(&MonomialOrder::DegRevLex);
    let src = Arc::new(src);
    let mut reduced = parse_poly("x[1]^3 + x[1]", &m, &f, 1)?;
    reduced.order(&MonomialOrder::DegRevLex);
    let reduced = Arc::new(reduced);

    table.insert(&parse_term(&m, "x[1]", 1)?, &src, Arc::clone(&reduced));

    let mut t = parse_term(&m, "x[1]^2", 1)?;
    let mut p = Arc::clone(&src);
    assert!(table.search(&mut t, &mut p, &m));
    assert!(t.same(&parse_term(&m, "x[1]", 1)?));
    assert!(Arc::ptr_eq(&p, &reduced));
    Ok(())
}

#[test]
fn out_of_range_indeterminates_are_a_parse_error() {
    let (m, f) = fixture();
    assert_eq!(
        parse_poly("x[3]", &m, &f, 1).unwrap_err(),
        ParseError::IndexOutOfRange { index: 3, min: 1, end: 3 }
    );
}

// ---------------------------------------------------------------------------
// Randomized algebraic invariants (fixed seed, so failures reproduce)
// ---------------------------------------------------------------------------

#[test]
fn randomized_term_algebra_invariants() {
    init_tracing();
    let m = TermMonoid::new(4, 8);
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let e1: Vec<u32> = (0..4).map(|_| rng.gen_range(0..16)).collect();
        let e2: Vec<u32> = (0..4).map(|_| rng.gen_range(0..16)).collect();
        let a = m.create(&e1);
        let b = m.create(&e2);
        let one = m.one();

        assert!(m.mul(&a, &one).same(&a));
        assert!(m.mul(&a, &b).same(&m.mul(&b, &a)));
        assert!(m.div(&m.mul(&a, &b), &b).same(&a));
        assert!(m.mul(&a, &b).divisible_by(&a));
        assert_eq!(m.mul(&a, &b).deg(), a.deg() + b.deg());

        let l = m.lcm(&a, &b);
        assert!(l.divisible_by(&a) && l.divisible_by(&b));
        // Degree minimality: shaving any coordinate of the lcm breaks
        // divisibility by one of the operands.
        for i in 0..4 {
            let mut shaved = l.exps().to_vec();
            if shaved[i] == 0 {
                continue;
            }
            shaved[i] -= 1;
            let s = m.create(&shaved);
            assert!(!(s.divisible_by(&a) && s.divisible_by(&b)));
        }
    }
}

#[test]
fn randomized_ordering_laws() {
    init_tracing();
    let m = TermMonoid::new(4, 8);
    let mut rng = StdRng::seed_from_u64(0xf4);
    let orders = [MonomialOrder::Lex, MonomialOrder::DegLex, MonomialOrder::DegRevLex];
    for _ in 0..300 {
        let ts: Vec<_> = (0..3)
            .map(|_| {
                let e: Vec<u32> = (0..4).map(|_| rng.gen_range(0..8)).collect();
                m.create(&e)
            })
            .collect();
        let (a, b, c) = (&ts[0], &ts[1], &ts[2]);
        for ord in orders {
            // Antisymmetry and identity-of-equals.
            assert_eq!(ord.cmp(a, b), ord.cmp(b, a).reverse());
            assert_eq!(ord.cmp(a, b) == Ordering::Equal, a.same(b));
            // Transitivity on this triple.
            if ord.cmp(a, b) != Ordering::Greater && ord.cmp(b, c) != Ordering::Greater {
                assert_ne!(ord.cmp(a, c), Ordering::Greater);
            }
            // Multiplication compatibility.
            assert_eq!(ord.cmp(a, b), ord.cmp(&m.mul(a, c), &m.mul(b, c)));
        }
    }
}

#[test]
fn parse_print_round_trip_on_random_canonical_polynomials() -> Result<()> {
    let (m, f) = fixture();
    let mut rng = StdRng::seed_from_u64(0x10ba1);
    for _ in 0..100 {
        let monos: Vec<(u32, _)> = (0..rng.gen_range(1..8))
            .map(|_| {
                let c = rng.gen_range(1..32003u32);
                let e: Vec<u32> = (0..2).map(|_| rng.gen_range(0..12)).collect();
                (c, m.create(&e))
            })
            .collect();
        let mut p = Polynomial::from_monomials_purified(monos, &f);
        p.order(&MonomialOrder::DegRevLex);
        let printed = p.display_base(1).to_string();
        let mut back = parse_poly(&printed, &m, &f, 1)?;
        back.order(&MonomialOrder::DegRevLex);
        assert_eq!(p, back, "round-trip failed for {printed}");
    }
    Ok(())
}
