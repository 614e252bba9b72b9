//! Pipeline settings, resolved once at the command-line boundary.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

use crate::clean::Dedup;
use crate::engineer::DatePolicy;
use crate::error::{PrepError, Result};
use crate::manifest::FeatureManifest;
use crate::prepare::PrepOptions;
use crate::source::Locator;

pub const ENV_PREFIX: &str = "TALENT_FLOW";
pub const DEFAULT_PREPARED_PATH: &str = "prepared_data.parquet";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    #[default]
    Identity,
    FullRow,
    Off,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Path, URL or `s3://bucket/key` of the raw listings.
    #[serde(default)]
    pub raw_data_locator: Option<String>,
    #[serde(default)]
    pub s3_bucket_name: Option<String>,
    #[serde(default, alias = "raw_data_key")]
    pub s3_key_name: Option<String>,
    /// Path or locator for the prepared table.
    #[serde(default)]
    pub prepared_data_path: Option<String>,
    /// Key of the prepared table inside `s3_bucket_name`.
    #[serde(default)]
    pub prepared_data_key: Option<String>,
    #[serde(default)]
    pub dedup: DedupMode,
    #[serde(default = "default_dedup_column")]
    pub dedup_column: String,
    #[serde(default)]
    pub strict_dates: bool,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_dedup_column() -> String {
    "job_link".into()
}

fn default_test_size() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

impl Settings {
    /// Layer an optional config file (JSON, TOML or YAML by extension) and
    /// `TALENT_FLOW_*` environment variables.
    pub fn load(path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(ConfigFile::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("features"),
        );
        builder.build()?.try_deserialize()
    }

    /// The raw source, from `raw_data_locator` or the bucket/key pair.
    pub fn locator(&self) -> Result<Locator> {
        if let Some(locator) = &self.raw_data_locator {
            return locator.parse();
        }
        match (&self.s3_bucket_name, &self.s3_key_name) {
            (Some(bucket), Some(key)) => Locator::s3(bucket, key),
            _ => Err(PrepError::InvalidLocator(
                "no raw_data_locator or s3_bucket_name/s3_key_name configured".into(),
            )),
        }
    }

    /// Where the prepared table goes: `prepared_data_path`, else
    /// `prepared_data_key` inside `s3_bucket_name`, else a local default.
    pub fn destination(&self) -> Result<Locator> {
        if let Some(path) = &self.prepared_data_path {
            return path.parse();
        }
        match (&self.s3_bucket_name, &self.prepared_data_key) {
            (Some(bucket), Some(key)) => Locator::s3(bucket, key),
            (None, Some(key)) => Err(PrepError::InvalidLocator(format!(
                "prepared_data_key {key} needs s3_bucket_name"
            ))),
            _ => Ok(Locator::File(PathBuf::from(DEFAULT_PREPARED_PATH))),
        }
    }

    pub fn options(&self) -> PrepOptions {
        let dedup = match self.dedup {
            DedupMode::Identity => Dedup::Identity(self.dedup_column.clone()),
            DedupMode::FullRow => Dedup::FullRow,
            DedupMode::Off => Dedup::Off,
        };
        let dates = if self.strict_dates {
            DatePolicy::Strict
        } else {
            DatePolicy::Null
        };
        PrepOptions { dedup, dates }
    }

    pub fn manifest(&self) -> FeatureManifest {
        match &self.features {
            Some(names) => FeatureManifest::new(names.iter().cloned()),
            None => FeatureManifest::canonical(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> anyhow::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        file.write_all(body.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_bucket_and_key() -> anyhow::Result<()> {
        let file = write_config(
            r#"{
                "s3_bucket_name": "talent-data",
                "s3_key_name": "raw/linkedin_jobs.parquet",
                "mlflow_tracking_uri": "http://localhost:5000",
                "strict_dates": true,
                "dedup": "full_row"
            }"#,
        )?;
        let settings = Settings::load(Some(file.path()))?;

        assert_eq!(
            settings.locator()?,
            Locator::S3 {
                bucket: "talent-data".into(),
                key: "raw/linkedin_jobs.parquet".into()
            }
        );
        assert_eq!(settings.options().dates, DatePolicy::Strict);
        assert_eq!(settings.options().dedup, Dedup::FullRow);
        assert_eq!(settings.manifest(), FeatureManifest::canonical());
        Ok(())
    }

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let file = write_config(r#"{ "raw_data_locator": "data/jobs.csv" }"#)?;
        let settings = Settings::load(Some(file.path()))?;

        assert_eq!(
            settings.destination()?,
            Locator::File(PathBuf::from(DEFAULT_PREPARED_PATH))
        );
        assert_eq!(settings.test_size, 0.2);
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.options(), PrepOptions::default());
        assert!(matches!(settings.locator()?, Locator::File(_)));
        Ok(())
    }

    #[test]
    fn test_feature_override_drops_target() -> anyhow::Result<()> {
        let file = write_config(r#"{ "features": ["job_title", "salary_value", "skill_count"] }"#)?;
        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.manifest().names(), ["job_title", "skill_count"]);
        assert!(settings.locator().is_err());
        Ok(())
    }

    #[test]
    fn test_prepared_key_goes_to_bucket() -> anyhow::Result<()> {
        let file = write_config(
            r#"{
                "s3_bucket_name": "talent-data",
                "raw_data_key": "raw/jobs.parquet",
                "prepared_data_key": "processed/jobs.parquet"
            }"#,
        )?;
        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.locator()?, Locator::s3("talent-data", "raw/jobs.parquet")?);
        assert_eq!(
            settings.destination()?,
            Locator::s3("talent-data", "processed/jobs.parquet")?
        );
        Ok(())
    }

    #[test]
    fn test_prepared_key_without_bucket_is_rejected() -> anyhow::Result<()> {
        let file = write_config(r#"{ "prepared_data_key": "processed/jobs.parquet" }"#)?;
        let settings = Settings::load(Some(file.path()))?;
        assert!(matches!(settings.destination(), Err(PrepError::InvalidLocator(_))));

        let file = write_config(r#"{ "prepared_data_path": "s3://other/out.csv" }"#)?;
        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.destination()?, Locator::s3("other", "out.csv")?);
        Ok(())
    }
}
