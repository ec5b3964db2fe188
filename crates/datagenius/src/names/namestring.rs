//! Parsing a full name held in a single string.

use once_cell::sync::Lazy;
use regex::Regex;

use super::name::{
    base_operations, cleanse_invalid_chars, is_initial, manage_cases, run_operations,
    standardize_hyphen, Name, TokenOp,
};
use super::patterns::NamePatterns;

// =============================================================================
// Regex Patterns
// =============================================================================

static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]*)\)").unwrap());

/// A name string split into tokens and allocated into [`Name`] components.
///
/// ```
/// use datagenius::names::{NamePatterns, Namestring};
///
/// let patterns = NamePatterns::builtin();
/// let n = Namestring::parse("Mr. Alex J. White, III", &patterns);
/// assert_eq!(n.name.prefix.as_deref(), Some("Mr."));
/// assert_eq!(n.name.mname.as_deref(), Some("J."));
/// assert_eq!(n.name.suffix.as_deref(), Some("Iii"));
/// assert!(n.name.valid);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Namestring {
    pub name: Name,
    tokens: Vec<String>,
    second: Option<Vec<String>>,
}

impl Namestring {
    pub fn parse(text: &str, patterns: &NamePatterns) -> Self {
        let mut name = Name::new();

        let alt = PARENTHESIZED
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| cleanse_invalid_chars(m.as_str().trim()).to_lowercase())
            .filter(|a| !a.is_empty());
        name.alt_name = alt.map(|a| manage_cases(&a, patterns));
        let text = PARENTHESIZED.replace_all(text, " ");

        let mut slots: Vec<Option<String>> = standardize_hyphen(&text)
            .to_lowercase()
            .split_whitespace()
            .map(|t| Some(t.to_string()))
            .collect();

        let mut ops = base_operations(patterns);
        ops.push(middle_initials());
        ops.push(affixes(patterns));
        run_operations(&mut slots, &mut name, ops, false);

        let mut parsed = Self {
            name,
            tokens: slots.into_iter().flatten().collect(),
            second: None,
        };
        if parsed.name.valid {
            parsed.merge_compound_fnames(patterns);
            parsed.merge_lname_particles(patterns);
            parsed.split_ampersand(patterns);
        }
        parsed.allocate();
        parsed
    }

    /// Tokens for the first person.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens for the second person, when an ampersand split the name.
    pub fn second_tokens(&self) -> Option<&[String]> {
        self.second.as_deref()
    }

    pub fn into_name(self) -> Name {
        self.name
    }

    /// Join pairs like "Mary Ann" into one token.
    fn merge_compound_fnames(&mut self, patterns: &NamePatterns) {
        let mut merged = Vec::with_capacity(self.tokens.len());
        let mut i = 0;
        while i < self.tokens.len() {
            if let Some(next) = self.tokens.get(i + 1) {
                let combo = format!("{} {}", self.tokens[i], next);
                if patterns.is_compound_fname(&combo) {
                    merged.push(combo);
                    i += 2;
                    continue;
                }
            }
            merged.push(self.tokens[i].clone());
            i += 1;
        }
        self.tokens = merged;
    }

    /// Join a particle ("Van", "De") with the tokens after it, through the
    /// first one that is not itself a particle.
    fn merge_lname_particles(&mut self, patterns: &NamePatterns) {
        let mut merged: Vec<String> = Vec::with_capacity(self.tokens.len());
        let mut rest = self.tokens.iter();
        while let Some(token) = rest.next() {
            let mut token = token.clone();
            if !merged.is_empty() && patterns.is_lname_particle(&token) {
                for next in rest.by_ref() {
                    token.push(' ');
                    token.push_str(next);
                    if !patterns.is_lname_particle(next) {
                        break;
                    }
                }
            }
            merged.push(token);
        }
        self.tokens = merged;
    }

    /// Split at the first ampersand that follows a name. Leading ampersands
    /// ("and Mrs. ...", left behind by prefixes) are dropped.
    fn split_ampersand(&mut self, patterns: &NamePatterns) {
        let start = self
            .tokens
            .iter()
            .position(|t| !patterns.is_ampersand(t))
            .unwrap_or(self.tokens.len());
        let mut tokens = self.tokens.split_off(start);
        if let Some(at) = tokens.iter().position(|t| patterns.is_ampersand(t)) {
            let second: Vec<String> = tokens
                .split_off(at)
                .into_iter()
                .filter(|t| !patterns.is_ampersand(t))
                .collect();
            if !second.is_empty() {
                self.second = Some(second);
            }
        }
        self.tokens = tokens;
    }

    fn allocate(&mut self) {
        let name = &mut self.name;
        allocate_person(&self.tokens, &mut name.fname, &mut name.mname, &mut name.lname);
        if let Some(second) = &self.second {
            allocate_person(second, &mut name.fname2, &mut name.mname2, &mut name.lname2);
            if name.lname.is_none() {
                name.lname = name.lname2.clone();
            } else if name.lname2.is_none() {
                name.lname2 = name.lname.clone();
            }
        }

        let count = self.tokens.len() + self.second.as_ref().map_or(0, Vec::len);
        if count < 2 {
            name.valid = false;
        }
        name.final_check();
    }
}

/// Parse `text` and return only the [`Name`].
pub fn parse_namestring(text: &str, patterns: &NamePatterns) -> Name {
    Namestring::parse(text, patterns).into_name()
}

/// First token is the first name. With two tokens the second is the last
/// name; with more, the second is the middle name unless initials already
/// supplied one, and the remainder is the last name.
fn allocate_person(
    tokens: &[String],
    fname: &mut Option<String>,
    mname: &mut Option<String>,
    lname: &mut Option<String>,
) {
    let Some((first, rest)) = tokens.split_first() else {
        return;
    };
    *fname = Some(first.clone());
    match rest {
        [] => {}
        [last] => *lname = Some(last.clone()),
        [middle, tail @ ..] => {
            if mname.is_none() {
                *mname = Some(middle.clone());
                *lname = Some(tail.join(" "));
            } else {
                *lname = Some(rest.join(" "));
            }
        }
    }
}

/// Collect runs of single-letter initials after the first token. A run ends
/// at the next word and becomes `mname`, then `mname2`.
fn middle_initials<'a>() -> TokenOp<'a> {
    let mut chain: Vec<String> = Vec::new();
    let mut clusters = 0usize;
    Box::new(move |name: &mut Name, index: usize, t: &str| {
        if index == 0 || !t.chars().any(char::is_alphabetic) {
            return t.to_string();
        }
        if is_initial(t) {
            let mut initial = t.to_string();
            if !initial.ends_with('.') {
                initial.push('.');
            }
            chain.push(initial);
            return String::new();
        }
        if !chain.is_empty() {
            let joined = chain.concat();
            chain.clear();
            clusters += 1;
            match clusters {
                1 => name.mname = Some(joined),
                2 => name.mname2 = Some(joined),
                _ => {}
            }
        }
        t.to_string()
    })
}

fn fill_first_free(first: &mut Option<String>, second: &mut Option<String>, value: &str) {
    if first.is_none() {
        *first = Some(value.to_string());
    } else if second.is_none() {
        *second = Some(value.to_string());
    }
}

/// Move prefixes and suffixes out of the token list. The first of each kind
/// fills `prefix`/`suffix`, the second `prefix2`/`suffix2`, others are dropped.
fn affixes(patterns: &NamePatterns) -> TokenOp<'_> {
    Box::new(move |name: &mut Name, _: usize, t: &str| {
        if patterns.is_prefix(t) {
            fill_first_free(&mut name.prefix, &mut name.prefix2, t);
            String::new()
        } else if patterns.is_suffix(t) {
            fill_first_free(&mut name.suffix, &mut name.suffix2, t);
            String::new()
        } else {
            t.to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Namestring {
        Namestring::parse(text, &NamePatterns::builtin())
    }

    #[test]
    fn test_allocate() {
        let n = parse("William Cyrus Jehosephat");
        assert_eq!(n.name.fname.as_deref(), Some("William"));
        assert_eq!(n.name.mname.as_deref(), Some("Cyrus"));
        assert_eq!(n.name.lname.as_deref(), Some("Jehosephat"));

        let n = parse("Bob Smith");
        assert_eq!(n.name.fname.as_deref(), Some("Bob"));
        assert_eq!(n.name.mname, None);
        assert_eq!(n.name.lname.as_deref(), Some("Smith"));
        assert!(n.name.valid);
    }

    #[test]
    fn test_shared_last_name() {
        let n = parse("Bob and Helen Parr");
        assert_eq!(n.name.fname.as_deref(), Some("Bob"));
        assert_eq!(n.name.lname.as_deref(), Some("Parr"));
        assert_eq!(n.name.fname2.as_deref(), Some("Helen"));
        assert_eq!(n.name.lname2.as_deref(), Some("Parr"));

        let n = parse("Odysseus Ithaka and Penelope");
        assert_eq!(n.name.lname2.as_deref(), Some("Ithaka"));
    }

    #[test]
    fn test_assign_affixes() {
        let n = parse("Mr. Bob Parr");
        assert_eq!(n.name.prefix.as_deref(), Some("Mr."));
        assert_eq!(n.tokens(), ["Bob", "Parr"]);

        let n = parse("Mr. and Mrs. Bob Parr Jr.");
        assert_eq!(n.name.prefix.as_deref(), Some("Mr."));
        assert_eq!(n.name.prefix2.as_deref(), Some("Mrs."));
        assert_eq!(n.name.suffix.as_deref(), Some("Jr."));
        assert_eq!(n.tokens(), ["Bob", "Parr"]);

        let n = parse("Mr. and Mrs. and Dr. Bob Parr");
        assert_eq!(n.name.prefix.as_deref(), Some("Mr."));
        assert_eq!(n.name.prefix2.as_deref(), Some("Mrs."));
        assert_eq!(n.tokens(), ["Bob", "Parr"]);
    }

    #[test]
    fn test_assign_ampersand_split() {
        let n = parse("Bob Parr and Helen Parr");
        assert_eq!(n.tokens(), ["Bob", "Parr"]);
        assert_eq!(n.second_tokens().unwrap(), ["Helen", "Parr"]);
        assert_eq!(n.name.lname.as_deref(), Some("Parr"));

        let n = parse("Mr. and Ms. Bob Parr");
        assert_eq!(n.tokens(), ["Bob", "Parr"]);
        assert!(n.second_tokens().is_none());

        let n = parse("Mr. and Ms. Bob and Helen Parr");
        assert_eq!(n.tokens(), ["Bob"]);
        assert_eq!(n.second_tokens().unwrap(), ["Helen", "Parr"]);

        let n = parse("Bob & Helen Parr");
        assert_eq!(n.tokens(), ["Bob"]);
        assert_eq!(n.second_tokens().unwrap(), ["Helen", "Parr"]);
    }

    #[test]
    fn test_assign_middle_initials() {
        let n = parse("Kay O. G. Williams");
        assert_eq!(n.name.mname.as_deref(), Some("O.G."));
        assert_eq!(n.tokens(), ["Kay", "Williams"]);

        let n = parse("Barbara O Hammond and Nicholas L. Krupke");
        assert_eq!(n.name.mname.as_deref(), Some("O."));
        assert_eq!(n.name.mname2.as_deref(), Some("L."));
        assert_eq!(n.tokens(), ["Barbara", "Hammond"]);
        assert_eq!(n.second_tokens().unwrap(), ["Nicholas", "Krupke"]);

        let n = parse("E. B. White");
        assert_eq!(n.name.mname.as_deref(), Some("B."));
        assert_eq!(n.tokens(), ["E.", "White"]);
    }

    #[test]
    fn test_manage_multi_fname() {
        let n = parse("mary ann williamson");
        assert_eq!(n.tokens(), ["Mary Ann", "Williamson"]);

        let n = parse("mary ann and jo ann williamson");
        assert_eq!(n.tokens(), ["Mary Ann"]);
        assert_eq!(n.second_tokens().unwrap(), ["Jo Ann", "Williamson"]);
        assert_eq!(n.name.lname.as_deref(), Some("Williamson"));
    }

    #[test]
    fn test_manage_multi_lname() {
        assert_eq!(parse("bethany van houten").tokens(), ["Bethany", "Van Houten"]);
        assert_eq!(parse("maria de las casas").tokens(), ["Maria", "De Las Casas"]);
        assert_eq!(parse("Lars Boaz").tokens(), ["Lars", "Boaz"]);
    }

    #[test]
    fn test_manage_cases() {
        assert_eq!(parse("robert mccloud").tokens(), ["Robert", "McCloud"]);
        assert_eq!(parse("claire o'brien").tokens(), ["Claire", "O'Brien"]);
        assert_eq!(parse("Sophia Aloysius-heitkamp").tokens(), ["Sophia", "Aloysius-Heitkamp"]);
        assert_eq!(parse("fiddleford mcgucket").tokens(), ["Fiddleford", "McGucket"]);
    }

    #[test]
    fn test_validate() {
        assert!(!parse("Bob").name.valid);
        assert!(!parse("The Anderson Family").name.valid);
        assert!(!parse("123 come with me").name.valid);
        assert!(!parse("Dr. Bob").name.valid);
        assert!(parse("The Annoying Family Smith").name.valid);
    }

    #[test]
    fn test_alt_name() {
        let n = parse("Robert (Bob) Smith");
        assert_eq!(n.name.alt_name.as_deref(), Some("Bob"));
        assert_eq!(n.tokens(), ["Robert", "Smith"]);
    }

    #[test]
    fn test_parse_simple_namestrings() {
        let p = NamePatterns::builtin();
        let cases = [
            ("Ewan Hudson", [None, Some("Ewan"), None, Some("Hudson"), None]),
            ("Harley D. Patel", [None, Some("Harley"), Some("D."), Some("Patel"), None]),
            ("Dr. Jaden Blackburn", [Some("Dr."), Some("Jaden"), None, Some("Blackburn"), None]),
            ("Mr. Alex J. White, III", [Some("Mr."), Some("Alex"), Some("J."), Some("White"), Some("Iii")]),
        ];
        for (text, expected) in cases {
            let name = parse_namestring(text, &p);
            let expected: Vec<Option<String>> =
                expected.iter().map(|v| v.map(str::to_string)).collect();
            assert_eq!(name.to_list(false), expected, "{}", text);
            assert!(name.valid, "{}", text);
        }
    }
}
