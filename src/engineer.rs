//! Per-row feature derivations.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::columns::{
    has_column, text_column, DATE_POSTED, INDUSTRY, JOB_DESCRIPTION, JOB_LEVEL, JOB_SKILLS,
    JOB_TITLE, POSTING_MONTH, POSTING_YEAR, SKILL_COUNT, UNKNOWN,
};
use crate::error::{PrepError, Result};

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// What to do with a `date_posted` value that is present but not a date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DatePolicy {
    /// Year and month become null.
    #[default]
    Null,
    /// Abort with [`PrepError::UnparseableDate`].
    Strict,
}

/// Add `posting_year`, `posting_month`, `job_level`, `skill_count` and
/// `industry`.
///
/// A wholly absent source column still yields its derived column, filled
/// with the value a null input would get.
pub fn engineer(df: &DataFrame, dates: DatePolicy) -> Result<DataFrame> {
    let height = df.height();
    let (years, months) = posting_dates(df, dates)?;

    let levels: Vec<&str> = match text_column(df, JOB_TITLE)? {
        Some(titles) => titles.into_iter().map(job_level).collect(),
        None => vec![job_level(None); height],
    };

    let skills: Vec<u32> = match text_column(df, JOB_SKILLS)? {
        Some(skills) => skills.into_iter().map(skill_count).collect(),
        None => vec![skill_count(None); height],
    };

    let industries: Vec<String> = match text_column(df, JOB_DESCRIPTION)? {
        Some(descriptions) => descriptions.into_iter().map(industry).collect(),
        None => vec![industry(None); height],
    };

    let mut out = df.clone();
    out.with_column(Series::new(POSTING_YEAR, years))?;
    out.with_column(Series::new(POSTING_MONTH, months))?;
    out.with_column(Series::new(JOB_LEVEL, levels))?;
    out.with_column(Series::new(SKILL_COUNT, skills))?;
    out.with_column(Series::new(INDUSTRY, industries))?;
    Ok(out)
}

type YearMonth = (Vec<Option<i32>>, Vec<Option<i32>>);

fn posting_dates(df: &DataFrame, policy: DatePolicy) -> Result<YearMonth> {
    let height = df.height();
    if !has_column(df, DATE_POSTED) {
        return Ok((vec![None; height], vec![None; height]));
    }

    // Native temporal columns are normalised to plain dates first.
    let column = df.column(DATE_POSTED)?;
    let dates = match column.dtype() {
        DataType::Date | DataType::Datetime(_, _) => column.cast(&DataType::Date)?,
        _ => column.clone(),
    };
    let dates = dates.cast(&DataType::String)?;

    let mut years = Vec::with_capacity(height);
    let mut months = Vec::with_capacity(height);
    for (row, raw) in dates.str()?.into_iter().enumerate() {
        let parsed = match raw {
            None => None,
            Some(raw) => match parse_date(raw) {
                Some(date) => Some(date),
                None if policy == DatePolicy::Strict => {
                    return Err(PrepError::UnparseableDate {
                        row,
                        value: raw.to_string(),
                    })
                }
                None => None,
            },
        };
        years.push(parsed.map(|d| d.year()));
        months.push(parsed.map(|d| d.month() as i32));
    }
    Ok((years, months))
}

/// Parse the calendar date out of a `date_posted` value.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }
    if let Some(stamp) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(stamp.date());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|stamp| stamp.date_naive())
}

/// Seniority bucket from the job title. Senior markers are checked first.
pub fn job_level(title: Option<&str>) -> &'static str {
    match title {
        None => UNKNOWN,
        Some(t) if t.contains("Senior") || t.contains("Sr.") => "Senior",
        Some(t) if t.contains("Junior") || t.contains("Jr.") => "Junior",
        Some(_) => "Mid-level",
    }
}

/// `1 + number of commas`; a missing or empty list still counts as one.
pub fn skill_count(skills: Option<&str>) -> u32 {
    1 + skills.unwrap_or("").matches(',').count() as u32
}

/// Text after the last `" in "` of the description, up to the first `'.'`.
pub fn industry(description: Option<&str>) -> String {
    match description {
        Some(text) if text.contains(" in ") => {
            let tail = text.split(" in ").last().unwrap_or_default();
            tail.split('.').next().unwrap_or_default().to_string()
        }
        _ => UNKNOWN.to_string(),
    }
}
