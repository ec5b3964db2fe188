//! Join additional datasets onto a base dataset, exactly or by string
//! similarity.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{GeniusError, Result};
use crate::frame::{standardize_label, Cell, Dataset, Header};
use crate::guides::{SupplementGuide, DEFAULT_THRESHOLD};
use crate::strings::{gen_alpha_keys, jaro_winkler};

/// One `on` entry handed to [`build_plan`].
#[derive(Debug, Clone)]
pub enum On {
    /// A plain column joined exactly, without conditions.
    Column(String),
    /// A full guide.
    Guide(SupplementGuide),
}

impl From<&str> for On {
    fn from(column: &str) -> Self {
        On::Column(column.to_string())
    }
}

impl From<SupplementGuide> for On {
    fn from(guide: SupplementGuide) -> Self {
        On::Guide(guide)
    }
}

/// Collect `ons` into guides. Full guides keep their order; plain columns are
/// gathered into one exact guide placed last.
pub fn build_plan(ons: impl IntoIterator<Item = On>) -> Vec<SupplementGuide> {
    let mut simple = Vec::new();
    let mut plan = Vec::new();
    for on in ons {
        match on {
            On::Column(c) => simple.push(c),
            On::Guide(g) => plan.push(g),
        }
    }
    if !simple.is_empty() {
        plan.push(SupplementGuide::new(simple));
    }
    plan
}

/// Split `dataset` into the rows meeting every condition and the rest.
pub fn chunk(
    dataset: &Dataset,
    conditions: &IndexMap<String, Vec<String>>,
) -> Result<(Dataset, Dataset)> {
    let checks = conditions
        .iter()
        .map(|(label, values)| Ok((dataset.require_column(label)?, values)))
        .collect::<Result<Vec<_>>>()?;

    let (mut hits, mut misses) = (Vec::new(), Vec::new());
    for (i, row) in dataset.rows().iter().enumerate() {
        let ok = checks.iter().all(|(col, values)| {
            row[*col]
                .as_deref()
                .map(|v| values.iter().any(|x| x == v))
                .unwrap_or(false)
        });
        if ok { hits.push(i) } else { misses.push(i) }
    }
    Ok((dataset.select_rows(&hits), dataset.select_rows(&misses)))
}

/// Labels for the joined dataset: every left label, then each right column
/// from `right_cols`, suffixed when it collides with a left label.
///
/// Suffixed labels are standardized like any other, so `_A` lands as `_a`.
fn joined_header(left: &Dataset, right: &Dataset, right_cols: &[usize], suffix: &str) -> Header {
    let mut labels: Vec<String> = left.header.labels().to_vec();
    for &col in right_cols {
        let label = right.header.get(col).unwrap_or_default();
        if left.column_index(label).is_some() {
            labels.push(format!("{}{}", label, suffix));
        } else {
            labels.push(label.to_string());
        }
    }
    Header::new(labels)
}

/// Emit each left row joined with every right row it matched, or with nulls
/// when it matched none.
fn assemble(
    left: &Dataset,
    right: &Dataset,
    right_cols: &[usize],
    header: Header,
    matches: &[Vec<usize>],
) -> Dataset {
    let mut rows = Vec::with_capacity(left.row_count());
    for (l, row) in left.rows().iter().enumerate() {
        if matches[l].is_empty() {
            let mut out = row.clone();
            out.extend(std::iter::repeat(None).take(right_cols.len()));
            rows.push(out);
            continue;
        }
        for &r in &matches[l] {
            let mut out = row.clone();
            out.extend(right_cols.iter().map(|&c| right.rows()[r][c].clone()));
            rows.push(out);
        }
    }
    Dataset::with_header(header, rows)
}

fn on_columns(left: &Dataset, right: &Dataset, on: &[String]) -> Result<Vec<(usize, usize)>> {
    on.iter()
        .map(|label| Ok((left.require_column(label)?, right.require_column(label)?)))
        .collect()
}

/// Left join on equal, non-null values in every `on` column.
///
/// The `on` columns of `right` are not repeated in the output.
pub fn do_exact(left: &Dataset, right: &Dataset, on: &[String], suffix: &str) -> Result<Dataset> {
    let keys = on_columns(left, right, on)?;
    let right_on: Vec<usize> = keys.iter().map(|&(_, r)| r).collect();
    let right_cols: Vec<usize> = (0..right.column_count())
        .filter(|c| !right_on.contains(c))
        .collect();

    let key_of = |row: &[Cell], cols: &mut dyn Iterator<Item = usize>| -> Option<Vec<String>> {
        cols.map(|c| row[c].clone()).collect()
    };

    let mut index: IndexMap<Vec<String>, Vec<usize>> = IndexMap::new();
    for (r, row) in right.rows().iter().enumerate() {
        if let Some(key) = key_of(row, &mut right_on.iter().copied()) {
            index.entry(key).or_default().push(r);
        }
    }

    let matches: Vec<Vec<usize>> = left
        .rows()
        .iter()
        .map(|row| {
            key_of(row, &mut keys.iter().map(|&(l, _)| l))
                .and_then(|key| index.get(&key).cloned())
                .unwrap_or_default()
        })
        .collect();

    let header = joined_header(left, right, &right_cols, suffix);
    Ok(assemble(left, right, &right_cols, header, &matches))
}

/// Left join on Jaro-Winkler similarity of the lowercased `on` values.
///
/// A pair of rows matches when every `on` column meets its threshold. With
/// `block` columns, only pairs equal in all of them are compared. Every right
/// column is appended.
pub fn do_inexact(
    left: &Dataset,
    right: &Dataset,
    guide: &SupplementGuide,
    suffix: &str,
) -> Result<Dataset> {
    guide.validate()?;
    let keys = on_columns(left, right, &guide.on)?;
    let blocks = on_columns(left, right, &guide.block)?;
    let lower = |ds: &Dataset, col: usize| -> Vec<Option<String>> {
        ds.column_values(col).map(|v| v.map(str::to_lowercase)).collect()
    };
    let left_on: Vec<_> = keys.iter().map(|&(l, _)| lower(left, l)).collect();
    let right_on: Vec<_> = keys.iter().map(|&(_, r)| lower(right, r)).collect();
    let thresholds = if guide.thresholds.is_empty() {
        vec![DEFAULT_THRESHOLD; keys.len()]
    } else {
        guide.thresholds.clone()
    };

    let mut matches = vec![Vec::new(); left.row_count()];
    for (l, found) in matches.iter_mut().enumerate() {
        for r in 0..right.row_count() {
            let blocked = blocks.iter().all(|&(lb, rb)| {
                let a = &left.rows()[l][lb];
                a.is_some() && *a == right.rows()[r][rb]
            });
            if !blocked {
                continue;
            }
            let similar = thresholds.iter().enumerate().all(|(k, &threshold)| {
                match (&left_on[k][l], &right_on[k][r]) {
                    (Some(a), Some(b)) => jaro_winkler(a, b) >= threshold,
                    _ => false,
                }
            });
            if similar {
                found.push(r);
            }
        }
    }
    debug!(
        matched = matches.iter().filter(|m| !m.is_empty()).count(),
        rows = left.row_count(),
        "inexact join"
    );

    let right_cols: Vec<usize> = (0..right.column_count()).collect();
    let header = joined_header(left, right, &right_cols, suffix);
    Ok(assemble(left, right, &right_cols, header, &matches))
}

fn join(left: &Dataset, right: &Dataset, guide: &SupplementGuide, suffix: &str) -> Result<Dataset> {
    if guide.inexact {
        do_inexact(left, right, guide, suffix)
    } else {
        do_exact(left, right, &guide.on, suffix)
    }
}

/// Default suffixes `_A`, `_B`, ... or the given ones, which must number one
/// per other dataset. Each must keep some text once standardized into a
/// label.
pub fn prep_suffixes(suffixes: Option<Vec<String>>, count: usize) -> Result<Vec<String>> {
    let suffixes = suffixes.unwrap_or_else(|| {
        gen_alpha_keys(count)
            .into_iter()
            .map(|k| format!("_{}", k))
            .collect()
    });
    if suffixes.len() != count {
        return Err(GeniusError::InvalidGuide(format!(
            "Length of suffixes must be equal to the number of other datasets. Suffix len={}, suffixes={:?}",
            suffixes.len(),
            suffixes
        )));
    }
    if let Some(bad) = suffixes.iter().find(|s| standardize_label(s).is_empty()) {
        return Err(GeniusError::InvalidGuide(format!(
            "suffix {:?} is empty once standardized into a label",
            bad
        )));
    }
    Ok(suffixes)
}

/// Join each of `others` onto `base` following `guides`.
///
/// Guides are applied in order. Each takes the base rows meeting its
/// conditions that no earlier guide took, and joins them with the rows of
/// every other dataset meeting the same conditions. Base rows no guide took
/// pass through with null supplemental columns.
pub fn supplement(
    base: &Dataset,
    others: &[Dataset],
    guides: &[SupplementGuide],
    suffixes: Option<Vec<String>>,
) -> Result<Dataset> {
    let suffixes = prep_suffixes(suffixes, others.len())?;
    if guides.is_empty() {
        return Err(GeniusError::InvalidGuide(
            "supplement needs at least one guide".to_string(),
        ));
    }

    let mut remaining = base.clone();
    let mut parts = Vec::new();
    for guide in guides {
        guide.validate()?;
        let (mut joined, rest) = chunk(&remaining, &guide.conditions)?;
        if joined.is_empty() {
            continue;
        }
        remaining = rest;
        for (other, suffix) in others.iter().zip(&suffixes) {
            let (candidates, _) = chunk(other, &guide.conditions)?;
            joined = join(&joined, &candidates, guide, suffix)?;
        }
        debug!(on = ?guide.on, rows = joined.row_count(), "supplement chunk joined");
        parts.push(joined);
    }
    parts.push(remaining);

    let result = Dataset::concat(&parts);
    info!(
        rows = result.row_count(),
        columns = result.column_count(),
        "supplement complete"
    );
    Ok(result)
}
