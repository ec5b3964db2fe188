//! Reformat stage: reshape a cleaned table into a target layout.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{GeniusError, Result};
use crate::frame::{Dataset, Header};
use crate::guides::OneOrMany;
use crate::transmutation::{Report, Stage, Transmutation};

/// Rebuild the dataset with the columns of `template`.
///
/// Each mapping entry copies a source column into one or more template
/// columns. Template columns nothing maps to are left null and source
/// columns that are not mapped are dropped; the report records how many
/// values each dropped column held.
#[derive(Debug, Clone)]
pub struct Reformat {
    template: Vec<String>,
    mapping: IndexMap<String, Vec<String>>,
}

impl Reformat {
    pub fn new<S: Into<String>>(
        template: impl IntoIterator<Item = S>,
        mapping: IndexMap<String, Vec<String>>,
    ) -> Self {
        Self {
            template: template.into_iter().map(Into::into).collect(),
            mapping,
        }
    }

    /// Build from a mapping whose targets may be a single label or a list.
    pub fn from_targets<S: Into<String>>(
        template: impl IntoIterator<Item = S>,
        mapping: IndexMap<String, OneOrMany>,
    ) -> Self {
        let mapping = mapping
            .into_iter()
            .map(|(k, v)| (k, v.into_vec()))
            .collect();
        Self::new(template, mapping)
    }
}

impl Transmutation for Reformat {
    fn name(&self) -> &str {
        "reformat"
    }

    fn stage(&self) -> Stage {
        Stage::Reformat
    }

    fn priority(&self) -> u8 {
        15
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let header = Header::new(&self.template);

        // (source column, target column) pairs
        let mut copies = Vec::new();
        for (source, targets) in &self.mapping {
            let src = dataset.require_column(source)?;
            for target in targets {
                let dst = header.index_of(target).ok_or_else(|| {
                    GeniusError::ColumnNotFound(format!("{} (not in reformat template)", target))
                })?;
                copies.push((src, dst));
            }
        }

        let mut report = Report::new(self.name(), self.stage());
        for (col, label) in dataset.header.iter().enumerate() {
            let mapped = self
                .mapping
                .iter()
                .find(|(source, _)| dataset.column_index(source) == Some(col));
            report = match mapped {
                Some((_, targets)) => report.with_value(label, Value::from(targets.join(","))),
                None => report.with_count(label, dataset.non_null_count(col)),
            };
        }

        let width = header.len();
        let rows = dataset
            .rows()
            .iter()
            .map(|row| {
                let mut out = vec![None; width];
                for &(src, dst) in &copies {
                    out[dst] = row[src].clone();
                }
                out
            })
            .collect();

        *dataset = Dataset::with_header(header, rows);
        Ok(report.with_value("orig_header", Value::from(self.template.clone())))
    }
}

/// Fill nulls with a default value per column.
#[derive(Debug, Clone)]
pub struct FillDefaults {
    defaults: IndexMap<String, String>,
}

impl FillDefaults {
    pub fn new(defaults: IndexMap<String, String>) -> Self {
        Self { defaults }
    }
}

impl Transmutation for FillDefaults {
    fn name(&self) -> &str {
        "fill_defaults"
    }

    fn stage(&self) -> Stage {
        Stage::Reformat
    }

    fn transmute(&self, dataset: &mut Dataset) -> Result<Report> {
        let mut report = Report::new(self.name(), self.stage());
        for (label, default) in &self.defaults {
            let col = dataset.require_column(label)?;
            let mut filled = 0;
            for row in dataset.rows_mut() {
                if row[col].is_none() {
                    row[col] = Some(default.clone());
                    filled += 1;
                }
            }
            report = report.with_count(label.as_str(), filled);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::row;

    fn products() -> Dataset {
        Dataset::new(
            ["id", "name", "price", "cost", "upc", "attr1", "attr2", "attr3", "attr4", "attr5"],
            vec![
                row(&["1", "Widget", "8.5", "4.0", "1234567890", "", "", "", "", ""]),
                row(&["2", "Doohickey", "9.99", "5.0", "2345678901", "copper", "large", "", "", ""]),
                row(&["3", "Flange", "1.0", "0.2", "3456789012", "steel", "small", "", "", ""]),
                row(&["4", "Whatsit", "5.0", "2.0", "4567890123", "aluminum", "small", "", "", ""]),
            ],
        )
    }

    fn reformat() -> Reformat {
        let template = ["Prod Id", "Name", "Price", "Cost", "Prod UPC", "Material", "Barcode"];
        let mut mapping = IndexMap::new();
        for (k, v) in [("id", "Prod Id"), ("name", "Name"), ("price", "Price"), ("cost", "Cost"), ("attr1", "Material")] {
            mapping.insert(k.to_string(), vec![v.to_string()]);
        }
        mapping.insert("upc".to_string(), vec!["Prod UPC".to_string(), "Barcode".to_string()]);
        Reformat::new(template, mapping)
    }

    #[test]
    fn test_reformat() {
        let mut ds = products();
        let r = reformat().transmute(&mut ds).unwrap();
        assert_eq!(ds.header, vec!["prod_id", "name", "price", "cost", "prod_upc", "material", "barcode"]);
        assert_eq!(ds.header.original_form()[0], "Prod Id");
        assert_eq!(
            ds.rows()[1],
            row(&["2", "Doohickey", "9.99", "5.0", "2345678901", "copper", "2345678901"])
        );
        assert_eq!(ds.get(0, 5), None);
        assert_eq!(r.metadata["upc"], "Prod UPC,Barcode");
        assert_eq!(r.metadata["id"], "Prod Id");
        assert_eq!(r.count("attr2"), Some(3));
        assert_eq!(r.count("attr3"), Some(0));
        assert_eq!(r.metadata["orig_header"][4], "Prod UPC");
    }

    #[test]
    fn test_reformat_unknown_source() {
        let mut mapping = IndexMap::new();
        mapping.insert("nope".to_string(), vec!["A".to_string()]);
        let mut ds = products();
        assert!(Reformat::new(["A"], mapping).transmute(&mut ds).is_err());
    }

    #[test]
    fn test_fill_defaults() {
        let mut ds = products();
        let mut defaults = IndexMap::new();
        defaults.insert("attr1".to_string(), "unknown".to_string());
        defaults.insert("attr3".to_string(), "n/a".to_string());
        let r = FillDefaults::new(defaults).transmute(&mut ds).unwrap();
        assert_eq!(ds.get(0, 5), Some("unknown"));
        assert_eq!(r.count("attr1"), Some(1));
        assert_eq!(r.count("attr3"), Some(4));
    }
}
