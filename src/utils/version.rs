//!
//! Dotted-numeric version comparison used by the `IF_LOWER` overwrite policy.

use std::cmp::Ordering;

/// Compare two dotted version strings segment by segment.
///
/// Each segment is compared by its numeric prefix; missing segments count as
/// zero, and non-numeric tails break ties lexically (`1.0.0-rc` sorts after
/// `1.0.0`).
pub fn compare(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.trim().split('.').collect();
    let right: Vec<&str> = b.trim().split('.').collect();
    let segments = left.len().max(right.len());

    for i in 0..segments {
        let l = left.get(i).copied().unwrap_or("0");
        let r = right.get(i).copied().unwrap_or("0");
        match compare_segment(l, r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let (a_digits, a_rest) = split_digits(a);
    let (b_digits, b_rest) = split_digits(b);
    match compare_digit_runs(a_digits, b_digits) {
        Ordering::Equal => a_rest.cmp(b_rest),
        other => other,
    }
}

fn split_digits(segment: &str) -> (&str, &str) {
    let digits = segment.len() - segment.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    segment.split_at(digits)
}

/// Numeric comparison on the raw digit text, with no integer-width ceiling:
/// after stripping leading zeros the longer run is greater, equal lengths
/// compare lexically.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ordering() {
        assert_eq!(compare("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare("1.0.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare("2.0", "10.0"), Ordering::Less);
    }

    #[test]
    fn test_missing_segments_are_zero() {
        assert_eq!(compare("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare("1", "1.0.1"), Ordering::Less);
        assert_eq!(compare("1.2", "1"), Ordering::Greater);
    }

    #[test]
    fn test_non_numeric_tail_breaks_ties() {
        assert_eq!(compare("1.0.0-rc", "1.0.0"), Ordering::Greater);
        assert_eq!(compare("1.0.0a", "1.0.0b"), Ordering::Less);
        assert_eq!(compare("1.0.0", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(compare(" 1.0.0 ", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_segments_wider_than_u64_stay_numeric() {
        // 2^64 + 1 must not collapse to zero.
        assert_eq!(compare("18446744073709551617", "2"), Ordering::Greater);
        assert_eq!(compare("1.99999999999999999999", "1.3"), Ordering::Greater);
        assert_eq!(compare("007", "7"), Ordering::Equal);
    }
}
