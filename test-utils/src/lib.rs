use num_traits::Float;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Max absolute difference and relative L1 error of `result` against `ans`.
pub fn diff<T: Float>(result: &[T], ans: &[T]) -> (f64, f64) {
    assert_eq!(result.len(), ans.len());
    let mut max_abs_diff = 0.;
    let mut up = 0.;
    let mut down = 0.;
    for (r, a) in result.iter().zip(ans) {
        let r = r.to_f64().unwrap();
        let a = a.to_f64().unwrap();
        let diff = (r - a).abs();
        max_abs_diff = max_abs_diff.max(diff);
        up += diff;
        down += a.abs();
    }
    (max_abs_diff, if down > 0. { up / down } else { up })
}

#[macro_export]
macro_rules! slice {
    ($blob:expr; $width:expr; [$line:expr]) => {
        $blob[$line * $width..][..$width]
    };
}

/// Row-major `a (m×k) · b (k×n)`, accumulating each element with a fused
/// multiply-add in ascending `k`.
pub fn host_matmul(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    assert_eq!(a.len(), m * k);
    assert_eq!(b.len(), k * n);
    let mut c = vec![0.0f32; m * n];
    for r in 0..m {
        let row = &slice!(a; k; [r]);
        for (col, out) in slice!(c; n; [r]).iter_mut().enumerate() {
            *out = row
                .iter()
                .enumerate()
                .fold(0.0f32, |acc, (i, &x)| x.mul_add(b[i * n + col], acc));
        }
    }
    c
}

/// `len` values uniformly drawn from [0, 1).
pub fn rand_data(len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random::<f32>()).collect()
}

#[test]
fn test_host_matmul() {
    // [1 2]   [5 6]   [19 22]
    // [3 4] · [7 8] = [43 50]
    let c = host_matmul(&[1., 2., 3., 4.], &[5., 6., 7., 8.], 2, 2, 2);
    assert_eq!(c, [19., 22., 43., 50.]);

    let c = host_matmul(&[1., 2., 3.], &[1., 1., 1.], 1, 3, 1);
    assert_eq!(c, [6.]);
}

#[test]
fn test_diff() {
    let (abs, rel) = diff(&[1.0f32, 2.0, 3.5], &[1.0, 2.0, 3.0]);
    assert_eq!(abs, 0.5);
    assert!((rel - 0.5 / 6.).abs() < 1e-12);
    assert_eq!(diff::<f32>(&[], &[]), (0., 0.));
}

#[test]
fn test_rand_data() {
    let x = rand_data(4096, 7);
    assert!(x.iter().all(|&v| (0. ..1.).contains(&v)));
    assert_eq!(x, rand_data(4096, 7));
}
