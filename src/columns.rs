//! Column names shared by the cleaning and feature steps.

use polars::prelude::*;

use crate::error::Result;

pub const JOB_TITLE: &str = "job_title";
pub const COMPANY_NAME: &str = "company_name";
pub const JOB_LOCATION: &str = "job_location";
pub const JOB_SKILLS: &str = "job_skills";
pub const JOB_SALARY: &str = "job_salary";
pub const JOB_LINK: &str = "job_link";
pub const DATE_POSTED: &str = "date_posted";
pub const JOB_DESCRIPTION: &str = "job_description";

pub const SALARY_CURRENCY: &str = "salary_currency";
pub const SALARY_VALUE: &str = "salary_value";
pub const POSTING_YEAR: &str = "posting_year";
pub const POSTING_MONTH: &str = "posting_month";
pub const JOB_LEVEL: &str = "job_level";
pub const SKILL_COUNT: &str = "skill_count";
pub const INDUSTRY: &str = "industry";

/// Prediction target.
pub const TARGET: &str = SALARY_VALUE;

/// Placeholder for missing categorical text.
pub const UNKNOWN: &str = "Unknown";

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| *c == name)
}

/// Returns the column as text, or `None` when the table has no such column.
///
/// Non-string columns are cast, so a numeric salary or an all-null column
/// read back from a file is handled the same way as free text.
pub(crate) fn text_column(df: &DataFrame, name: &str) -> Result<Option<StringChunked>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let series = df.column(name)?.cast(&DataType::String)?;
    Ok(Some(series.str()?.clone()))
}
