//! Parsing names already split into first, middle and last columns.

use super::name::{
    base_operations, is_initial, run_operations, standardize_hyphen, tokens_valid, Name, TokenOp,
};
use super::patterns::NamePatterns;

/// Names stored as separate tokens, e.g. `[fname, mname, lname]`.
///
/// Positions matter here, so a token emptied by cleansing becomes `None`
/// instead of shifting the others.
#[derive(Debug, Clone, PartialEq)]
pub struct Nametoken {
    pub name: Name,
    tokens: Vec<Option<String>>,
}

impl Nametoken {
    pub fn parse<S: AsRef<str>>(tokens: &[Option<S>], patterns: &NamePatterns) -> Self {
        let mut name = Name::new();
        let mut slots: Vec<Option<String>> = tokens
            .iter()
            .map(|t| {
                t.as_ref()
                    .map(|s| standardize_hyphen(s.as_ref().trim()).to_lowercase())
                    .filter(|s| !s.is_empty())
            })
            .collect();

        let mut ops = base_operations(patterns);
        ops.push(trailing_middle_initial());
        ops.push(ampersand_split(patterns));
        run_operations(&mut slots, &mut name, ops, true);

        let mut parsed = Self { name, tokens: slots };
        parsed.allocate();
        parsed
    }

    pub fn tokens(&self) -> &[Option<String>] {
        &self.tokens
    }

    pub fn into_name(self) -> Name {
        self.name
    }

    fn allocate(&mut self) {
        let name = &mut self.name;
        name.fname = self.tokens.first().cloned().flatten();
        match self.tokens.len() {
            0 | 1 => {}
            2 => name.lname = self.tokens[1].clone(),
            _ => {
                if name.mname.is_none() {
                    name.mname = self.tokens[1].clone();
                }
                let last: Vec<&str> = self.tokens[2..].iter().flatten().map(String::as_str).collect();
                if !last.is_empty() {
                    name.lname = Some(last.join(" "));
                }
            }
        }
        if name.fname2.is_some() && name.lname2.is_none() {
            name.lname2 = name.lname.clone();
        }

        if !tokens_valid(&self.tokens) {
            name.valid = false;
        }
        name.final_check();
    }
}

/// Parse `tokens` and return only the [`Name`].
pub fn parse_nametokens<S: AsRef<str>>(tokens: &[Option<S>], patterns: &NamePatterns) -> Name {
    Nametoken::parse(tokens, patterns).into_name()
}

/// A first-name token ending in an initial ("john q") gives that initial to
/// `mname`.
fn trailing_middle_initial<'a>() -> TokenOp<'a> {
    Box::new(|name: &mut Name, index: usize, t: &str| {
        if index != 0 {
            return t.to_string();
        }
        let mut words: Vec<&str> = t.split(' ').collect();
        if words.len() > 1 && words.last().is_some_and(|w| is_initial(w)) {
            name.mname = words.pop().map(str::to_string);
        }
        words.join(" ")
    })
}

/// Everything after an ampersand inside a token belongs to the second person,
/// in the same position.
fn ampersand_split(patterns: &NamePatterns) -> TokenOp<'_> {
    Box::new(move |name: &mut Name, index: usize, t: &str| {
        let words: Vec<&str> = t.split(' ').collect();
        let Some(at) = words.iter().position(|w| patterns.is_ampersand(w)) else {
            return t.to_string();
        };
        let second = words[at + 1..].join(" ");
        if !second.is_empty() {
            let slot = match index {
                0 => &mut name.fname2,
                1 => &mut name.mname2,
                _ => &mut name.lname2,
            };
            *slot = Some(second);
        }
        words[..at].join(" ")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &[Option<&str>]) -> Nametoken {
        Nametoken::parse(tokens, &NamePatterns::builtin())
    }

    #[test]
    fn test_allocate() {
        let n = parse(&[Some("George"), Some("G."), Some("Carlin")]);
        assert_eq!(n.name.fname.as_deref(), Some("George"));
        assert_eq!(n.name.mname.as_deref(), Some("G."));
        assert_eq!(n.name.lname.as_deref(), Some("Carlin"));

        let n = parse(&[Some("Jonathan"), Some("Strange")]);
        assert_eq!(n.name.mname, None);
        assert_eq!(n.name.lname.as_deref(), Some("Strange"));
        assert!(n.name.valid);
    }

    #[test]
    fn test_intake_preserves_positions() {
        let n = parse(&[Some("hammond"), None, Some("tulip")]);
        assert_eq!(
            n.tokens(),
            [Some("Hammond".to_string()), None, Some("Tulip".to_string())]
        );
        let n = parse(&[Some("griffin"), Some("mcelroy")]);
        assert_eq!(n.tokens()[1].as_deref(), Some("McElroy"));
    }

    #[test]
    fn test_ampersand_split() {
        let n = parse(&[Some("Heather and Rob"), None, Some("Vandemar")]);
        assert_eq!(n.name.fname.as_deref(), Some("Heather"));
        assert_eq!(n.name.lname.as_deref(), Some("Vandemar"));
        assert_eq!(n.name.fname2.as_deref(), Some("Rob"));
        assert_eq!(n.name.lname2.as_deref(), Some("Vandemar"));

        let n = parse(&[Some("Penny & Alice"), None, Some("Orville & Stabs")]);
        assert_eq!(n.name.fname.as_deref(), Some("Penny"));
        assert_eq!(n.name.lname.as_deref(), Some("Orville"));
        assert_eq!(n.name.fname2.as_deref(), Some("Alice"));
        assert_eq!(n.name.lname2.as_deref(), Some("Stabs"));
    }

    #[test]
    fn test_trailing_middle_initial() {
        let n = parse(&[Some("George G."), Some("Carlin")]);
        assert_eq!(n.tokens()[0].as_deref(), Some("George"));
        assert_eq!(n.name.mname.as_deref(), Some("G."));

        let n = parse(&[Some("Mary Jo R."), Some("Williamson")]);
        assert_eq!(n.name.fname.as_deref(), Some("Mary Jo"));
        assert_eq!(n.name.mname.as_deref(), Some("R."));
        assert_eq!(n.name.lname.as_deref(), Some("Williamson"));

        let n = parse(&[Some("S"), Some("Ramachandran")]);
        assert_eq!(n.name.fname.as_deref(), Some("S"));
        assert_eq!(n.name.mname, None);
        assert!(n.name.valid);
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(!parse(&[None, None, None]).name.valid);
        assert!(!parse(&[Some("N"), None, Some("R")]).name.valid);
        assert!(!parse(&[Some("Bob")]).name.valid);
        assert!(!parse(&[Some("Bob"), Some("Family")]).name.valid);
    }
}
