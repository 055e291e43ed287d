//! Randomized agreement checks across the operation variants

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use semicsr::{
    block_diamond_closure, block_multiply, block_multiply_parallel, diamond_closure,
    diamond_closure_concurrent, diamond_closure_linear, dimacs, multiply, multiply_concurrent,
    snapshot, Arithmetic, BlockConfig, CsrError, CsrMatrix, PoolConfig, Semiring, Tropical,
    TropicalMatrix,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config() -> PoolConfig {
    PoolConfig::default().with_workers(4)
}

/// Random matrix with small integer entries, some of them negative so that
/// arithmetic products can cancel
fn random_integer<S: Semiring<Value = i64>>(
    rng: &mut StdRng,
    rows: usize,
    cols: usize,
    density: f64,
    weights: std::ops::Range<i64>,
) -> CsrMatrix<S> {
    let mut triplets = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            if rng.gen_bool(density) {
                triplets.push((row, col, rng.gen_range(weights.clone())));
            }
        }
    }
    CsrMatrix::from_triplets(rows, cols, triplets)
}

fn random_graph(rng: &mut StdRng, n: usize, density: f64) -> TropicalMatrix<i64> {
    let mut g: TropicalMatrix<i64> = random_integer(rng, n, n, density, 1..50);
    for i in 0..n {
        g.set(0, i, i);
    }
    g
}

fn dense<S: Semiring>(rows: usize, cols: usize, data: &[S::Value]) -> CsrMatrix<S> {
    let mut m = CsrMatrix::new(rows, cols);
    m.set_bulk(data);
    m
}

fn floyd_warshall(g: &TropicalMatrix<i64>) -> TropicalMatrix<i64> {
    let n = g.nrows();
    let mut dist: Vec<Vec<i64>> = (0..n)
        .map(|i| (0..n).map(|j| g.get(i, j)).collect())
        .collect();

    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if dist[i][k] != i64::MAX && dist[k][j] != i64::MAX {
                    dist[i][j] = dist[i][j].min(dist[i][k] + dist[k][j]);
                }
            }
        }
    }

    let flat: Vec<i64> = dist.into_iter().flatten().collect();
    dense(n, n, &flat)
}

#[test]
fn concurrent_multiply_matches_sequential() {
    init();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..20 {
        let (n, k, m) = (rng.gen_range(0..30), rng.gen_range(0..30), rng.gen_range(0..30));
        let density = rng.gen_range(0.0..0.4);

        let a: CsrMatrix<Arithmetic<i64>> = random_integer(&mut rng, n, k, density, -5..6);
        let b: CsrMatrix<Arithmetic<i64>> = random_integer(&mut rng, k, m, density, -5..6);
        let product = multiply(&a, &b);
        assert_eq!(multiply_concurrent(&a, &b, &config()).unwrap(), product);
        assert!(product.check_invariants().is_ok());

        let ta: CsrMatrix<Tropical<i64>> = random_integer(&mut rng, n, k, density, -5..50);
        let tb: CsrMatrix<Tropical<i64>> = random_integer(&mut rng, k, m, density, -5..50);
        assert_eq!(multiply_concurrent(&ta, &tb, &config()).unwrap(), multiply(&ta, &tb));
    }
}

#[test]
fn concurrent_float_multiply_is_bit_identical() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut a = CsrMatrix::<Arithmetic<f64>>::new(40, 40);
    for _ in 0..300 {
        let (r, c) = (rng.gen_range(0..40), rng.gen_range(0..40));
        a.set(rng.gen_range(-1.0..1.0), r, c);
    }

    let sequential = multiply(&a, &a);
    let concurrent = multiply_concurrent(&a, &a, &config()).unwrap();
    let bits = |m: &CsrMatrix<Arithmetic<f64>>| m.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&sequential), bits(&concurrent));
    assert_eq!(sequential.col_index(), concurrent.col_index());
}

#[test]
fn squaring_closure_matches_linear() {
    init();
    let mut rng = StdRng::seed_from_u64(99);

    for n in 0..14 {
        let g: TropicalMatrix<i64> = random_integer(&mut rng, n, n, 0.3, 1..20);
        let linear = diamond_closure_linear(&g);
        assert_eq!(diamond_closure(&g), linear, "n = {n}");
        assert_eq!(diamond_closure_concurrent(&g, &config()).unwrap(), linear);
    }
}

#[test]
fn closure_with_zero_diagonal_is_shortest_paths() {
    let mut rng = StdRng::seed_from_u64(2024);

    for n in 2..16 {
        let g = random_graph(&mut rng, n, 0.25);
        let expected = floyd_warshall(&g);
        assert_eq!(diamond_closure(&g), expected, "n = {n}");
        assert_eq!(block_diamond_closure(&g), expected, "n = {n}");
    }
}

#[test]
fn counting_matrix_squared() {
    let a = dense::<Arithmetic<i64>>(3, 3, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    let expected = dense::<Arithmetic<i64>>(3, 3, &[30, 36, 42, 66, 81, 96, 102, 126, 150]);

    assert_eq!(multiply(&a, &a), expected);
    assert_eq!(multiply_concurrent(&a, &a, &config()).unwrap(), expected);

    let padded = a.pad_to_power_of_two();
    assert_eq!(block_multiply(&padded, &padded).restrict(3, 3), expected);
}

#[test]
fn counting_graph_closure_matches_floyd_warshall() {
    // Complete digraph with weights 1..9 and zero-cost self loops
    let g = dense::<Tropical<i64>>(3, 3, &[0, 2, 3, 4, 0, 6, 7, 8, 0]);
    let expected = dense::<Tropical<i64>>(3, 3, &[0, 2, 3, 4, 0, 6, 7, 8, 0]);

    assert_eq!(floyd_warshall(&g), expected);
    assert_eq!(diamond_closure(&g), expected);
    assert_eq!(diamond_closure_concurrent(&g, &config()).unwrap(), expected);
}

#[test]
fn counting_graph_exact_power() {
    // Without self loops the closure is the 2-edge walk matrix
    let g = dense::<Tropical<i64>>(3, 3, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    let expected = dense::<Tropical<i64>>(3, 3, &[2, 3, 4, 5, 6, 7, 8, 9, 10]);
    assert_eq!(diamond_closure(&g), expected);
}

#[test]
fn empty_row_yields_empty_output_row() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut a: CsrMatrix<Arithmetic<i64>> = random_integer(&mut rng, 10, 10, 0.8, 1..9);
    for col in 0..10 {
        a.set(0, 4, col);
    }
    let b: CsrMatrix<Arithmetic<i64>> = random_integer(&mut rng, 10, 10, 0.8, 1..9);

    for product in [multiply(&a, &b), multiply_concurrent(&a, &b, &config()).unwrap()] {
        assert_eq!(product.row(4).count(), 0);
    }
}

#[test]
fn set_get_roundtrip() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut m = CsrMatrix::<Arithmetic<i32>>::new(25, 17);

    for _ in 0..500 {
        let (r, c) = (rng.gen_range(0..25), rng.gen_range(0..17));
        let v = rng.gen_range(-3..4);
        let before = m.nnz();
        let existed = m.get(r, c) != 0;

        m.set(v, r, c);
        assert_eq!(m.get(r, c), v);
        if v == 0 && existed {
            assert_eq!(m.nnz(), before - 1);
        }
    }
    assert!(m.check_invariants().is_ok());
}

#[test]
fn partition_rebuild_is_identity() {
    let mut rng = StdRng::seed_from_u64(11);

    for (rows, cols) in [(2, 2), (4, 6), (8, 8), (10, 4)] {
        let m: CsrMatrix<Arithmetic<i64>> = random_integer(&mut rng, rows, cols, 0.5, 1..9);
        let (h, w) = (rows / 2, cols / 2);

        let mut rebuilt = CsrMatrix::new(rows, cols);
        for (r, c) in [(0, 0), (0, w), (h, 0), (h, w)] {
            m.partition(r, c).rebuild(&mut rebuilt, r, c);
        }
        assert_eq!(rebuilt, m);
    }
}

#[test]
fn block_multiply_matches_flat() {
    let mut rng = StdRng::seed_from_u64(13);

    for n in [1, 2, 3, 5, 8, 11] {
        let a: CsrMatrix<Arithmetic<i64>> = random_integer(&mut rng, n, n, 0.4, -4..5);
        let padded = a.pad_to_power_of_two();
        let flat = multiply(&a, &a);

        assert_eq!(block_multiply(&padded, &padded).restrict(n, n), flat);
        let config = BlockConfig::default().with_parallel_depth(3);
        assert_eq!(block_multiply_parallel(&padded, &padded, &config).restrict(n, n), flat);
    }
}

#[test]
fn snapshot_roundtrip_and_corruption() {
    let mut rng = StdRng::seed_from_u64(21);
    let g = random_graph(&mut rng, 12, 0.3);

    let bytes = snapshot::to_bytes(&g).unwrap();
    assert_eq!(snapshot::from_bytes::<Tropical<i64>>(&bytes).unwrap(), g);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.csr");
    snapshot::save(&g, &path).unwrap();
    assert_eq!(snapshot::load::<Tropical<i64>, _>(&path).unwrap(), g);

    // Last row offset no longer equals nnz
    let mut corrupt = bytes.clone();
    let last = corrupt.len() - 8;
    corrupt[last..].copy_from_slice(&0u64.to_le_bytes());
    assert_eq!(
        snapshot::from_bytes::<Tropical<i64>>(&corrupt),
        Err(CsrError::InvalidOffsets)
    );

    // Header claims more entries than fit
    let mut corrupt = bytes;
    corrupt[28..36].copy_from_slice(&1000u64.to_le_bytes());
    assert!(snapshot::from_bytes::<Tropical<i64>>(&corrupt).is_err());
}

#[test]
fn dimacs_dedup_feeds_closure() {
    let text = "\
c two parallel arcs between 1 and 2
p sp 4 5
a 1 2 10
a 1 2 3
a 2 3 4
a 3 4 5
a 1 4 20
";
    let graph = dimacs::parse::<i64, _>(text.as_bytes()).unwrap();
    assert_eq!(graph.arcs.len(), 4);

    let mut g = graph.into_matrix();
    for i in 0..4 {
        g.set(0, i, i);
    }
    let closure = diamond_closure(&g);
    assert_eq!(closure.get(0, 1), 3);
    assert_eq!(closure.get(0, 3), 12);
    assert_eq!(closure.get(3, 0), i64::MAX);
}
