//! Natural string ordering
//!
//! Digit runs compare by numeric value, everything else byte by byte,
//! so `"2.9"` sorts before `"2.10"`. Version lists and index keys are
//! ordered with this comparison; plain lexicographic ordering would put
//! `"1.10"` before `"1.9"`.

use std::cmp::Ordering;

/// Compare two strings in natural order.
///
/// Both strings are scanned as alternating digit and non-digit runs.
/// Digit runs are compared numerically (leading zeros stripped, then by
/// run length, then digit-wise), non-digit runs as plain bytes. When
/// one string is a prefix of the other, the shorter one orders first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let (run_a, next_i) = digit_run(a, i);
            let (run_b, next_j) = digit_run(b, j);
            match cmp_digit_runs(run_a, run_b) {
                Ordering::Equal => {
                    i = next_i;
                    j = next_j;
                }
                other => return other,
            }
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                other => return other,
            }
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run(s: &[u8], start: usize) -> (&[u8], usize) {
    let mut end = start;
    while end < s.len() && s[end].is_ascii_digit() {
        end += 1;
    }
    (&s[start..end], end)
}

/// Numeric comparison without parsing into an integer, so digit runs of
/// any length are supported. Runs equal in value but written with
/// different numbers of leading zeros order by zero count to keep the
/// ordering total.
fn cmp_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let zeros_a = a.iter().take_while(|c| **c == b'0').count();
    let zeros_b = b.iter().take_while(|c| **c == b'0').count();
    let value_a = &a[zeros_a..];
    let value_b = &b[zeros_b..];

    value_a
        .len()
        .cmp(&value_b.len())
        .then_with(|| value_a.cmp(value_b))
        .then_with(|| zeros_b.cmp(&zeros_a))
}
