//! Feature manifest and schema negotiation.

use polars::prelude::*;

use crate::columns::{
    has_column, COMPANY_NAME, INDUSTRY, JOB_LEVEL, JOB_LOCATION, JOB_SKILLS, JOB_TITLE,
    POSTING_MONTH, POSTING_YEAR, SKILL_COUNT, TARGET,
};
use crate::error::{PrepError, Result};

/// Candidate model features, in output order.
pub const CANONICAL_FEATURES: [&str; 9] = [
    JOB_TITLE,
    COMPANY_NAME,
    JOB_LOCATION,
    JOB_SKILLS,
    POSTING_YEAR,
    POSTING_MONTH,
    JOB_LEVEL,
    SKILL_COUNT,
    INDUSTRY,
];

/// Ordered list of feature columns. Never contains the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureManifest {
    names: Vec<String>,
}

impl FeatureManifest {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept: Vec<String> = Vec::new();
        for name in names.into_iter().map(Into::into) {
            if name != TARGET && !kept.contains(&name) {
                kept.push(name);
            }
        }
        Self { names: kept }
    }

    pub fn canonical() -> Self {
        Self::new(CANONICAL_FEATURES)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Keep only the features the table actually has, in manifest order.
    pub fn negotiate(&self, df: &DataFrame) -> Self {
        Self {
            names: self
                .names
                .iter()
                .filter(|name| has_column(df, name))
                .cloned()
                .collect(),
        }
    }

    /// Fail with the first feature the table lacks.
    pub fn require(&self, df: &DataFrame) -> Result<()> {
        match self.names.iter().find(|name| !has_column(df, name)) {
            Some(missing) => Err(PrepError::MissingColumn(missing.clone())),
            None => Ok(()),
        }
    }
}

impl Default for FeatureManifest {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_is_never_a_feature() {
        let manifest = FeatureManifest::new(["job_title", "salary_value", "industry", "job_title"]);
        assert_eq!(manifest.names(), ["job_title", "industry"]);
    }

    #[test]
    fn test_negotiate_keeps_manifest_order() -> anyhow::Result<()> {
        let df = df!(
            "industry" => &["tech"],
            "salary_value" => &[1.0],
            "job_title" => &["Analyst"]
        )?;
        let used = FeatureManifest::canonical().negotiate(&df);
        assert_eq!(used.names(), ["job_title", "industry"]);
        assert!(used.require(&df).is_ok());
        Ok(())
    }

    #[test]
    fn test_require_reports_missing() -> anyhow::Result<()> {
        let df = df!("job_title" => &["Analyst"])?;
        match FeatureManifest::canonical().require(&df) {
            Err(PrepError::MissingColumn(name)) => assert_eq!(name, COMPANY_NAME),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
        Ok(())
    }
}
