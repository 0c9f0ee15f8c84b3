//! Assertion helpers shared by unit and integration tests.

use std::fmt::Debug;

use regex::Regex;

pub fn assert_re(pattern: &str, haystack: &str) {
    let re = Regex::new(pattern).unwrap();
    assert!(re.is_match(haystack), "{:?} did not match {:?}", haystack, re);
}

/// Like assert_eq, but prints the vecs one element per line, and points out
/// each mismatched index, which is far easier to read for long rows.
pub fn assert_vec_eq<T: PartialEq + Debug>(left: Vec<T>, right: Vec<T>) {
    if left == right {
        return;
    }
    eprintln!("left: {:#?}\n!= right: {:#?}", left, right);
    if left.len() != right.len() {
        panic!("size of left ({}) != size of right ({})", left.len(), right.len());
    }
    for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        if l != r {
            eprintln!("Mismatch at index {}: {:?} != {:?}", i, l, r);
        }
    }
    panic!("left != right");
}

const APPROX_EPSILON: f64 = 1e-9;

/// Float equality within a relative (or, near zero, absolute) tolerance.
pub fn assert_approx_eq(left: f64, right: f64) {
    let scale = left.abs().max(right.abs()).max(1.0);
    assert!((left - right).abs() <= APPROX_EPSILON * scale,
            "left ({}) != right ({})", left, right);
}
