//! Null defaulting, duplicate removal and salary parsing.

use polars::prelude::*;

use crate::columns::{
    has_column, text_column, COMPANY_NAME, JOB_LINK, JOB_LOCATION, JOB_SALARY, JOB_SKILLS,
    JOB_TITLE, SALARY_CURRENCY, SALARY_VALUE, UNKNOWN,
};
use crate::error::Result;

const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];

/// Which rows count as duplicates of an earlier row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dedup {
    /// Keep every row.
    Off,
    /// Rows equal on every column.
    FullRow,
    /// Rows sharing a value in the given column. Falls back to
    /// [`Dedup::FullRow`] when the table lacks that column.
    Identity(String),
}

impl Default for Dedup {
    fn default() -> Self {
        Dedup::Identity(JOB_LINK.to_string())
    }
}

/// Fill missing text, drop duplicates and split `job_salary` into
/// `salary_currency` and `salary_value`.
///
/// Columns the table does not have are left out rather than created.
pub fn clean(df: &DataFrame, dedup: &Dedup) -> Result<DataFrame> {
    let mut out = df.clone();

    for name in [JOB_TITLE, COMPANY_NAME, JOB_LOCATION] {
        fill_text(&mut out, name, UNKNOWN)?;
    }
    fill_text(&mut out, JOB_SKILLS, "")?;

    let mut out = drop_duplicates(&out, dedup)?;

    if let Some(salary) = text_column(&out, JOB_SALARY)? {
        let (currency, value): (Vec<Option<String>>, Vec<Option<f64>>) = salary
            .into_iter()
            .map(|raw| {
                (
                    raw.and_then(salary_currency).map(String::from),
                    raw.and_then(salary_value),
                )
            })
            .unzip();
        out.with_column(Series::new(SALARY_CURRENCY, currency))?;
        out.with_column(Series::new(SALARY_VALUE, value))?;
    }

    Ok(out)
}

fn fill_text(df: &mut DataFrame, name: &str, default: &str) -> Result<()> {
    if let Some(values) = text_column(df, name)? {
        let filled: Vec<String> = values
            .into_iter()
            .map(|v| v.unwrap_or(default).to_string())
            .collect();
        df.with_column(Series::new(name, filled))?;
    }
    Ok(())
}

/// First currency symbol in a salary string.
pub fn salary_currency(raw: &str) -> Option<&str> {
    raw.find(CURRENCY_SYMBOLS)
        .map(|start| {
            let len = raw[start..].chars().next().map_or(1, char::len_utf8);
            &raw[start..start + len]
        })
}

/// First run of digits in a salary string. Separators end the run, so
/// `"$120,000"` yields `120.0`.
pub fn salary_value(raw: &str) -> Option<f64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let digits = &raw[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

fn drop_duplicates(df: &DataFrame, dedup: &Dedup) -> Result<DataFrame> {
    let subset = match dedup {
        Dedup::Off => return Ok(df.clone()),
        Dedup::Identity(column) if has_column(df, column) => Some(vec![column.clone()]),
        Dedup::Identity(_) | Dedup::FullRow => None,
    };
    Ok(df.unique_stable(subset.as_deref(), UniqueKeepStrategy::First, None)?)
}
