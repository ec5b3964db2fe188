//! Personal name parsing.
//!
//! Two parsers share one set of token operations: [`Namestring`] handles a
//! full name in one cell ("Mr. and Mrs. Bob Parr Jr."), [`Nametoken`] handles
//! names already split across first/middle/last columns. Both produce a
//! [`Name`]. [`ParseNames`] and [`ParseNameTokens`] run them over a dataset.

mod name;
mod namestring;
mod nametoken;
mod patterns;

pub use name::{
    cleanse_invalid_chars, cleanse_invalid_word, format_camelcase, manage_cases,
    search_and_split, standardize_caps, standardize_hyphen, Name,
};
pub use namestring::{parse_namestring, Namestring};
pub use nametoken::{parse_nametokens, Nametoken};
pub use patterns::{load_custom_patterns, NamePatterns, KEPT_PUNCTUATION};

use crate::config::{validate_name_columns, DEFAULT_NAME_COLUMNS};
use crate::error::{GeniusError, Result};
use crate::frame::Dataset;
use crate::strings::broadcast_suffix;
use crate::transmutation::{Report, Stage, Transmutation};

/// Output labels and options shared by both name transmutations.
#[derive(Debug, Clone)]
struct NameOutput {
    name_columns: Vec<String>,
    name_num: Option<u32>,
    include_name2: bool,
}

impl Default for NameOutput {
    fn default() -> Self {
        Self {
            name_columns: DEFAULT_NAME_COLUMNS.iter().map(|s| s.to_string()).collect(),
            name_num: None,
            include_name2: false,
        }
    }
}

impl NameOutput {
    fn suffix(&self) -> String {
        self.name_num.map(|n| n.to_string()).unwrap_or_default()
    }

    /// Labels for the five (or ten) name columns, then `valid`.
    fn labels(&self, include_name2: bool) -> Vec<String> {
        let suffix = self.suffix();
        let mut labels = broadcast_suffix(&self.name_columns, &suffix);
        if include_name2 {
            let second = if suffix.is_empty() {
                "2".to_string()
            } else {
                format!("2_{}", suffix)
            };
            labels.extend(broadcast_suffix(&self.name_columns, &second));
        }
        labels.push(format!("valid{}", suffix));
        labels
    }

    /// Append the parsed names to `dataset`, one row per name. The second
    /// person's columns appear when forced or when any row names two people.
    fn write(&self, dataset: &mut Dataset, names: &[Option<Name>], transmutation: &str, stage: Stage) -> Report {
        let second_names = names.iter().flatten().filter(|n| n.has_name2()).count();
        let include_name2 = self.include_name2 || second_names > 0;
        let labels = self.labels(include_name2);
        let width = if include_name2 { 10 } else { 5 };
        let cols: Vec<usize> = labels.iter().map(|l| dataset.ensure_column(l)).collect();

        let (mut valid, mut invalid) = (0, 0);
        for (row, name) in dataset.rows_mut().iter_mut().zip(names) {
            let mut values = match name {
                Some(n) => n.to_list(include_name2),
                None => Vec::new(),
            };
            values.resize(width, None);
            let is_valid = name.as_ref().is_some_and(|n| n.valid);
            if name.is_some() {
                if is_valid { valid += 1 } else { invalid += 1 }
            }
            values.push(Some(is_valid.to_string()));
            for (&col, value) in cols.iter().zip(values) {
                row[col] = value;
            }
        }

        Report::new(transmutation, stage)
            .with_count("valid", valid)
            .with_count("invalid", invalid)
            .with_count("parsed", valid + invalid)
            .with_count("second_names", second_names)
    }
}

/// Parse a column of full-name strings into name component columns plus a
/// `valid` flag.
#[derive(Debug, Clone)]
pub struct ParseNames {
    column: String,
    patterns: NamePatterns,
    output: NameOutput,
}

impl ParseNames {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            patterns: NamePatterns::builtin(),
            output: NameOutput::default(),
        }
    }

    pub fn with_patterns(mut self, patterns: NamePatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Labels for prefix, first, middle, last and suffix. Must be five.
    pub fn with_name_columns(mut self, labels: Vec<String>) -> Result<Self> {
        validate_name_columns(&labels)?;
        self.output.name_columns = labels;
        Ok(self)
    }

    /// Suffix output labels with a number, for datasets holding several names.
    pub fn with_name_num(mut self, name_num: u32) -> Self {
        self.output.name_num = Some(name_num);
        self
    }

    /// Always emit the second person's columns.
    pub fn with_name2(mut self, include: bool) -> Self {
        self.output.include_name2 = include;
        self
    }
}

impl Transmutation for ParseNames {
    fn name(&self) -> &str {
        "parse_names"
    }

    fn stage(&self) -> Stage {
        Stage::Clean
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let col = dataset.require_column(&self.column)?;
        let names: Vec<Option<Name>> = dataset
            .column_values(col)
            .map(|v| v.map(|text| parse_namestring(text, &self.patterns)))
            .collect();
        Ok(self.output.write(dataset, &names, self.name(), self.stage()))
    }
}

/// Parse names stored across first/middle/last columns.
#[derive(Debug, Clone)]
pub struct ParseNameTokens {
    columns: Vec<String>,
    patterns: NamePatterns,
    output: NameOutput,
}

impl ParseNameTokens {
    /// `columns` are the token columns in order, e.g. `[fname, mname, lname]`.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if !(2..=3).contains(&columns.len()) {
            return Err(GeniusError::Config(format!(
                "name token columns must be 2 or 3 labels, got {}",
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            patterns: NamePatterns::builtin(),
            output: NameOutput::default(),
        })
    }

    pub fn with_patterns(mut self, patterns: NamePatterns) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_name_columns(mut self, labels: Vec<String>) -> Result<Self> {
        validate_name_columns(&labels)?;
        self.output.name_columns = labels;
        Ok(self)
    }

    pub fn with_name_num(mut self, name_num: u32) -> Self {
        self.output.name_num = Some(name_num);
        self
    }

    pub fn with_name2(mut self, include: bool) -> Self {
        self.output.include_name2 = include;
        self
    }
}

impl Transmutation for ParseNameTokens {
    fn name(&self) -> &str {
        "parse_name_tokens"
    }

    fn stage(&self) -> Stage {
        Stage::Clean
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let cols = self
            .columns
            .iter()
            .map(|c| dataset.require_column(c))
            .collect::<Result<Vec<_>>>()?;
        let names: Vec<Option<Name>> = dataset
            .rows()
            .iter()
            .map(|row| {
                let tokens: Vec<Option<&str>> = cols.iter().map(|&c| row[c].as_deref()).collect();
                if tokens.iter().all(Option::is_none) {
                    None
                } else {
                    Some(parse_nametokens(&tokens, &self.patterns))
                }
            })
            .collect();
        Ok(self.output.write(dataset, &names, self.name(), self.stage()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::row;

    fn simple_namestrings() -> Dataset {
        Dataset::new(
            ["id", "name"],
            vec![
                row(&["1", "Ewan Hudson"]),
                row(&["2", "Finley Chambers"]),
                row(&["3", "Harley D. Patel"]),
                row(&["4", "Dr. Jaden Blackburn"]),
                row(&["5", "Mr. Alex J. White, III"]),
                row(&["6", ""]),
            ],
        )
    }

    #[test]
    fn test_parse_names() {
        let mut ds = simple_namestrings();
        let report = ParseNames::new("name").transmute(&mut ds).unwrap();
        assert_eq!(
            ds.header,
            vec!["id", "name", "prefix", "fname", "mname", "lname", "suffix", "valid"]
        );
        assert_eq!(
            ds.rows()[4][2..].to_vec(),
            row(&["Mr.", "Alex", "J.", "White", "Iii", "true"])
        );
        assert_eq!(ds.get(2, 4), Some("D."));
        assert_eq!(ds.get(5, 7), Some("false"));
        assert_eq!(report.count("valid"), Some(5));
        assert_eq!(report.count("parsed"), Some(5));
    }

    #[test]
    fn test_parse_names_with_name_num_and_name2() {
        let mut ds = Dataset::new(["owner"], vec![row(&["Bob and Helen Parr"])]);
        ParseNames::new("owner")
            .with_name_num(1)
            .with_name2(true)
            .transmute(&mut ds)
            .unwrap();
        assert_eq!(ds.column("fname1").unwrap(), vec![Some("Bob")]);
        assert_eq!(ds.column("fname2_1").unwrap(), vec![Some("Helen")]);
        assert_eq!(ds.column("lname2_1").unwrap(), vec![Some("Parr")]);
        assert_eq!(ds.column("valid1").unwrap(), vec![Some("true")]);
    }

    #[test]
    fn test_parse_names_keeps_second_person() {
        let mut ds = Dataset::new(["name"], vec![row(&["Bob and Helen Parr"]), row(&["Ewan Hudson"])]);
        let report = ParseNames::new("name").transmute(&mut ds).unwrap();
        assert_eq!(ds.header.len(), 12);
        assert_eq!(ds.column("fname").unwrap(), vec![Some("Bob"), Some("Ewan")]);
        assert_eq!(ds.column("fname2").unwrap(), vec![Some("Helen"), None]);
        assert_eq!(ds.column("lname2").unwrap(), vec![Some("Parr"), None]);
        assert_eq!(ds.column("valid").unwrap(), vec![Some("true"), Some("true")]);
        assert_eq!(report.count("second_names"), Some(1));
    }

    #[test]
    fn test_parse_names_missing_column() {
        let mut ds = simple_namestrings();
        assert!(ParseNames::new("nope").transmute(&mut ds).is_err());
        assert!(ParseNames::new("name").with_name_columns(vec!["a".into()]).is_err());
    }

    #[test]
    fn test_parse_name_tokens() {
        let mut ds = Dataset::new(
            ["first", "middle", "last"],
            vec![
                row(&["george g.", "", "carlin"]),
                row(&["Heather and Rob", "", "Vandemar"]),
                row(&["", "", ""]),
            ],
        );
        let report = ParseNameTokens::new(["first", "middle", "last"])
            .unwrap()
            .transmute(&mut ds)
            .unwrap();
        assert_eq!(
            ds.rows()[0][3..].to_vec(),
            row(&["", "George", "G.", "Carlin", "", "", "", "", "", "", "true"])
        );
        assert_eq!(ds.column("fname2").unwrap()[1], Some("Rob"));
        assert_eq!(ds.column("lname2").unwrap()[1], Some("Vandemar"));
        assert_eq!(ds.get(2, 13), Some("false"));
        assert_eq!(report.count("parsed"), Some(2));
        assert_eq!(report.count("second_names"), Some(1));
        assert!(ParseNameTokens::new(["only"]).is_err());
    }
}
