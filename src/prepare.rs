//! Load, clean, engineer and split a listings table into features and target.

use polars::prelude::*;

use crate::clean::{clean, Dedup};
use crate::columns::{has_column, TARGET};
use crate::engineer::{engineer, DatePolicy};
use crate::error::Result;
use crate::manifest::FeatureManifest;
use crate::source::RawSource;

/// Knobs for the cleaning and feature steps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrepOptions {
    pub dedup: Dedup,
    pub dates: DatePolicy,
}

/// A prepared dataset ready for a regression trainer.
#[derive(Clone, Debug)]
pub struct PreparedData {
    /// Cleaned and engineered table with every column kept.
    pub table: DataFrame,
    pub features: DataFrame,
    /// `salary_value`, or `None` when the table has no such column.
    pub target: Option<Series>,
    pub used_features: Vec<String>,
}

impl PreparedData {
    /// Whether the table carries a target column, even with zero rows.
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn len(&self) -> usize {
        self.table.height()
    }

    pub fn is_empty(&self) -> bool {
        self.table.height() == 0
    }
}

/// Load a table from `source` and prepare it.
///
/// Source errors are returned unchanged.
pub fn prepare<S>(source: &S, manifest: &FeatureManifest, options: &PrepOptions) -> Result<PreparedData>
where
    S: RawSource + ?Sized,
{
    let table = source.load_table()?;
    prepare_table(&table, manifest, options)
}

/// Prepare a table the caller already holds. The input is left untouched.
pub fn prepare_table(
    df: &DataFrame,
    manifest: &FeatureManifest,
    options: &PrepOptions,
) -> Result<PreparedData> {
    let cleaned = clean(df, &options.dedup)?;
    let table = engineer(&cleaned, options.dates)?;

    let used = manifest.negotiate(&table);
    let (features, target) = split_features_and_target(&table, &used)?;

    Ok(PreparedData {
        used_features: used.names().to_vec(),
        table,
        features,
        target,
    })
}

/// Select exactly the manifest's features and the target.
///
/// Unlike [`prepare_table`] this does not negotiate: a missing feature is a
/// [`PrepError::MissingColumn`](crate::PrepError::MissingColumn).
pub fn split_features_and_target(
    df: &DataFrame,
    manifest: &FeatureManifest,
) -> Result<(DataFrame, Option<Series>)> {
    manifest.require(df)?;

    let features = if manifest.is_empty() {
        DataFrame::empty()
    } else {
        df.select(manifest.names())?
    };

    let target = if has_column(df, TARGET) {
        Some(df.column(TARGET)?.clone())
    } else {
        None
    };

    Ok((features, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrepError;

    #[test]
    fn test_no_salary_gives_no_target() -> anyhow::Result<()> {
        let df = df!(
            "job_title" => &["Analyst", "Jr. Analyst"],
            "job_skills" => &["excel", "excel, sql"]
        )?;
        let prepared = prepare_table(&df, &FeatureManifest::canonical(), &PrepOptions::default())?;

        assert!(!prepared.has_target());
        assert!(prepared.target.is_none());
        assert_eq!(prepared.features.height(), 2);
        assert_eq!(
            prepared.used_features,
            [
                "job_title",
                "job_skills",
                "posting_year",
                "posting_month",
                "job_level",
                "skill_count",
                "industry"
            ]
        );
        Ok(())
    }

    #[test]
    fn test_split_requires_features() -> anyhow::Result<()> {
        let df = df!("job_title" => &["Analyst"], "salary_value" => &[Some(1.0)])?;
        let manifest = FeatureManifest::new(["job_title", "industry"]);
        assert!(matches!(
            split_features_and_target(&df, &manifest),
            Err(PrepError::MissingColumn(name)) if name == "industry"
        ));

        let (features, target) = split_features_and_target(&df, &FeatureManifest::new(["job_title"]))?;
        assert_eq!(features.get_column_names(), ["job_title"]);
        assert_eq!(target.map(|t| t.len()), Some(1));
        Ok(())
    }

    #[test]
    fn test_prepare_from_source_leaves_input_alone() -> anyhow::Result<()> {
        let df = df!("job_title" => &[Some("Senior Dev"), None])?;
        let prepared = prepare(&df, &FeatureManifest::default(), &PrepOptions::default())?;
        assert_eq!(df.width(), 1);
        assert_eq!(df.column("job_title")?.null_count(), 1);
        assert_eq!(prepared.len(), 2);
        assert!(prepared.table.width() > df.width());
        Ok(())
    }

    #[test]
    fn test_zero_rows_still_have_target() -> anyhow::Result<()> {
        let df = df!(
            "job_title" => Vec::<String>::new(),
            "job_salary" => Vec::<String>::new()
        )?;
        let prepared = prepare_table(&df, &FeatureManifest::canonical(), &PrepOptions::default())?;
        assert!(prepared.is_empty());
        assert!(prepared.has_target());
        assert_eq!(prepared.target.map(|t| t.len()), Some(0));
        Ok(())
    }
}
