//! String helpers shared by the stages.

mod similarity;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::frame::Cell;
use crate::numerics::is_numeric;

pub use similarity::{jaro, jaro_winkler};

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Trim and collapse repeated spaces. Returns whether anything changed along
/// with the cleaned text.
pub fn clean_whitespace(text: &str) -> (bool, String) {
    let cleaned = SPACE_RUN.replace_all(text.trim(), " ").into_owned();
    (cleaned != text, cleaned)
}

/// A "true string": present, not blank and not a number.
pub fn is_true_str(cell: Option<&str>) -> bool {
    match cell {
        Some(s) => !s.trim().is_empty() && !is_numeric(s),
        None => false,
    }
}

/// Count the true strings in a row of cells.
pub fn count_true_str(cells: &[Cell]) -> usize {
    cells.iter().filter(|c| is_true_str(c.as_deref())).count()
}

/// Excel-style column keys: `A`..`Z`, `AA`, `AB`, ...
pub fn gen_alpha_keys(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let mut i = i + 1;
            let mut key = Vec::new();
            while i > 0 {
                let rem = (i - 1) % 26;
                key.push(b'A' + rem as u8);
                i = (i - 1) / 26;
            }
            key.reverse();
            String::from_utf8_lossy(&key).into_owned()
        })
        .collect()
}

/// Append `suffix` to each value.
pub fn broadcast_suffix<S: AsRef<str>>(values: &[S], suffix: &str) -> Vec<String> {
    values
        .iter()
        .map(|v| format!("{}{}", v.as_ref(), suffix))
        .collect()
}

/// Whether any of `candidates` appears in `values`.
pub fn within<S: AsRef<str>, T: AsRef<str>>(values: &[S], candidates: &[T]) -> bool {
    candidates
        .iter()
        .any(|c| values.iter().any(|v| v.as_ref() == c.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::row;

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(clean_whitespace("a good string"), (false, "a good string".to_string()));
        assert_eq!(clean_whitespace(" a bad  string "), (true, "a bad string".to_string()));
        assert_eq!(clean_whitespace("     what       even     "), (true, "what even".to_string()));
    }

    #[test]
    fn test_count_true_str() {
        assert_eq!(count_true_str(&[Some(String::new()), None, Some("  ".into())]), 0);
        assert_eq!(count_true_str(&row(&["a", "test", "1"])), 2);
        assert_eq!(count_true_str(&row(&["", "test", "1"])), 1);
    }

    #[test]
    fn test_gen_alpha_keys() {
        let keys = gen_alpha_keys(28);
        assert_eq!(keys[0], "A");
        assert_eq!(keys[25], "Z");
        assert_eq!(keys[26], "AA");
        assert_eq!(keys[27], "AB");
        assert_eq!(gen_alpha_keys(703)[702], "AAA");
    }

    #[test]
    fn test_broadcast_and_within() {
        assert_eq!(broadcast_suffix(&["a", "b"], "_x"), vec!["a_x", "b_x"]);
        assert!(within(&["a", "b"], &["z", "b"]));
        assert!(!within(&["a", "b"], &["z"]));
    }
}
