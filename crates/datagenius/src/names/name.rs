//! The parsed name record and the token operations shared by both parsers.

use serde::Serialize;

use super::patterns::{NamePatterns, KEPT_PUNCTUATION};

/// Components of up to two people's names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Name {
    pub prefix: Option<String>,
    pub fname: Option<String>,
    pub mname: Option<String>,
    pub lname: Option<String>,
    pub suffix: Option<String>,
    pub alt_name: Option<String>,
    pub prefix2: Option<String>,
    pub fname2: Option<String>,
    pub mname2: Option<String>,
    pub lname2: Option<String>,
    pub suffix2: Option<String>,
    pub valid: bool,
}

impl Name {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    /// Whether a second person was found.
    pub fn has_name2(&self) -> bool {
        self.fname2.is_some() && self.lname2.is_some()
    }

    /// `[prefix, fname, mname, lname, suffix]`, followed by the same five for
    /// the second person when there is one or `include_name2` is set.
    pub fn to_list(&self, include_name2: bool) -> Vec<Option<String>> {
        let mut out = vec![
            self.prefix.clone(),
            self.fname.clone(),
            self.mname.clone(),
            self.lname.clone(),
            self.suffix.clone(),
        ];
        if include_name2 || self.has_name2() {
            out.extend([
                self.prefix2.clone(),
                self.fname2.clone(),
                self.mname2.clone(),
                self.lname2.clone(),
                self.suffix2.clone(),
            ]);
        }
        out
    }

    /// Checks run once components are allocated: first and last name are
    /// required and may not both be a single character.
    pub(crate) fn final_check(&mut self) {
        let (Some(f), Some(l)) = (&self.fname, &self.lname) else {
            self.valid = false;
            return;
        };
        if f.chars().count() == 1 && l.chars().count() == 1 {
            self.valid = false;
        }
    }
}

/// A step applied to each token in turn. It receives the token's position and
/// returns the replacement; an empty string removes the token.
pub(crate) type TokenOp<'a> = Box<dyn FnMut(&mut Name, usize, &str) -> String + 'a>;

/// The operations every name goes through first.
pub(crate) fn base_operations(patterns: &NamePatterns) -> Vec<TokenOp<'_>> {
    let mut ops: Vec<TokenOp<'_>> = Vec::new();
    ops.push(Box::new(|_: &mut Name, _: usize, t: &str| cleanse_invalid_chars(t)));
    ops.push(Box::new(move |_: &mut Name, _: usize, t: &str| {
        cleanse_invalid_word(t, patterns)
    }));
    ops.push(Box::new(move |_: &mut Name, _: usize, t: &str| manage_cases(t, patterns)));
    ops
}

/// A token list is parseable when it has at least two slots and no digits.
pub(crate) fn tokens_valid(tokens: &[Option<String>]) -> bool {
    tokens.len() >= 2
        && !tokens
            .iter()
            .flatten()
            .any(|t| t.chars().any(|c| c.is_ascii_digit()))
}

/// Run `ops` over `tokens`, checking validity before each one and stopping at
/// the first failure. Removed tokens become `None` when `keep_positions` is
/// set and are dropped otherwise.
pub(crate) fn run_operations(
    tokens: &mut Vec<Option<String>>,
    name: &mut Name,
    ops: Vec<TokenOp<'_>>,
    keep_positions: bool,
) {
    for mut op in ops {
        if !tokens_valid(tokens) {
            name.valid = false;
            return;
        }
        for (i, slot) in tokens.iter_mut().enumerate() {
            let out = match slot.as_deref() {
                Some(t) => op(name, i, t),
                None => continue,
            };
            *slot = if out.is_empty() { None } else { Some(out) };
        }
        if !keep_positions {
            tokens.retain(Option::is_some);
        }
    }
}

/// Standardize hyphens: `a - b`, `a -b` and `a- b` become `a-b`.
pub fn standardize_hyphen(s: &str) -> String {
    s.replace("- ", "-").replace(" -", "-")
}

/// Remove ASCII punctuation other than `& ' - .`.
pub fn cleanse_invalid_chars(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_ascii_punctuation() || KEPT_PUNCTUATION.contains(c))
        .collect()
}

/// Drop invalid words (`family`, `the`, ...). Returns an empty string when
/// nothing is left.
pub fn cleanse_invalid_word(s: &str, patterns: &NamePatterns) -> String {
    s.split(' ')
        .filter(|w| !patterns.is_invalid_word(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the character at `hump_start` (a char index).
///
/// ```
/// use datagenius::names::format_camelcase;
///
/// assert_eq!(format_camelcase("mccloud", 2), "mcCloud");
/// assert_eq!(format_camelcase("badinput-", 9), "badinput-");
/// ```
pub fn format_camelcase(name: &str, hump_start: usize) -> String {
    name.chars()
        .enumerate()
        .flat_map(|(i, c)| {
            let upper: Vec<char> = if i == hump_start {
                c.to_uppercase().collect()
            } else {
                vec![c]
            };
            upper
        })
        .collect()
}

/// Uppercase the first character; strings shorter than two characters are
/// uppercased entirely.
pub fn standardize_caps(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Apply `f` to each `sep`-separated part of `s`.
fn map_parts(s: &str, sep: char, f: impl Fn(&str) -> String) -> String {
    s.split(sep).map(f).collect::<Vec<_>>().join(&sep.to_string())
}

/// Capitalize each space- or hyphen-separated part of `s`.
pub fn search_and_split(s: &str) -> String {
    map_parts(s, ' ', |w| map_parts(w, '-', standardize_caps))
}

fn camelcase_part(part: &str, patterns: &NamePatterns) -> String {
    for particle in &patterns.camelcase_particles {
        let n = particle.chars().count();
        let hump = part.chars().nth(n);
        if part.starts_with(particle.as_str()) && hump.is_some_and(|c| c.is_ascii_lowercase()) {
            return format_camelcase(part, n);
        }
    }
    part.to_string()
}

/// Fix capitalization: camelcase particles (McCloud, O'Brien), then a capital
/// at the start of every space- or hyphen-separated part (El-Kanan).
pub fn manage_cases(s: &str, patterns: &NamePatterns) -> String {
    let camel = map_parts(s, ' ', |w| map_parts(w, '-', |p| camelcase_part(p, patterns)));
    search_and_split(&camel)
}

/// A single letter, optionally followed by a period.
pub(crate) fn is_initial(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    match chars.as_slice() {
        [c] => c.is_alphabetic(),
        [c, '.'] => c.is_alphabetic(),
        _ => false,
    }
}
