//! Correctness oracle.
//!
//! Exact equality is the default. It only holds because every kernel in the
//! bundled library accumulates with `fmaf` in ascending k; a kernel that
//! reorders the sum will be reported as a mismatch unless a tolerance is set.

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Verdict {
    Match,
    Mismatch {
        mismatched: usize,
        first: usize,
        max_abs_diff: f32,
    },
}

impl Verdict {
    #[inline]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

pub fn compare(result: &[f32], reference: &[f32], tolerance: Option<f32>) -> Verdict {
    assert_eq!(result.len(), reference.len());
    let accept = |r: f32, a: f32| match tolerance {
        None => r == a,
        Some(tol) => (r - a).abs() <= tol,
    };

    let mut mismatched = 0;
    let mut first = None;
    let mut max_abs_diff = 0.0f32;
    for (i, (&r, &a)) in result.iter().zip(reference).enumerate() {
        if !accept(r, a) {
            mismatched += 1;
            first.get_or_insert(i);
            // f32::max drops NaN operands
            let d = (r - a).abs();
            max_abs_diff = if d.is_nan() || max_abs_diff.is_nan() {
                f32::NAN
            } else {
                max_abs_diff.max(d)
            };
        }
    }
    match first {
        None => Verdict::Match,
        Some(first) => Verdict::Mismatch {
            mismatched,
            first,
            max_abs_diff,
        },
    }
}

#[test]
fn test_exact() {
    let a = [1.0f32, 2.0, 3.0];
    assert_eq!(compare(&a, &a, None), Verdict::Match);

    let b = [1.0f32, 2.0 + f32::EPSILON * 2., 3.5];
    assert_eq!(
        compare(&b, &a, None),
        Verdict::Mismatch {
            mismatched: 2,
            first: 1,
            max_abs_diff: 0.5
        }
    );
}

#[test]
fn test_tolerance() {
    let a = [1.0f32, 2.0, 3.0];
    let b = [1.0f32, 2.0 + 1e-6, 3.0 - 1e-6];
    assert!(!compare(&b, &a, None).is_match());
    assert!(compare(&b, &a, Some(1e-5)).is_match());
    assert!(!compare(&b, &a, Some(1e-8)).is_match());
}

#[test]
fn test_nan_is_mismatch() {
    let a = [0.0f32; 4];
    let mut b = a;
    b[3] = f32::NAN;
    let Verdict::Mismatch {
        mismatched, first, ..
    } = compare(&b, &a, Some(1.))
    else {
        panic!("NaN accepted")
    };
    assert_eq!((mismatched, first), (1, 3));
}

#[test]
fn test_max_abs_diff() {
    let ans = test_utils::rand_data(256, 3);
    let result = ans
        .iter()
        .enumerate()
        .map(|(i, &x)| if i % 7 == 3 { x + 0.25 } else { x })
        .collect::<Vec<_>>();
    let Verdict::Mismatch {
        mismatched,
        first,
        max_abs_diff,
    } = compare(&result, &ans, None)
    else {
        panic!("perturbed result accepted")
    };
    assert_eq!((mismatched, first), (37, 3));

    let (max_abs, _) = test_utils::diff(&result, &ans);
    assert!((max_abs_diff as f64 - max_abs).abs() < 1e-6);
    assert!(compare(&result, &ans, Some(0.5)).is_match());
}
