//! Raw listings sources: local files, HTTP(S) objects and S3 objects.

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use polars::io::mmap::MmapBytesReader;
use polars::prelude::*;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::error::{PrepError, Result};
use crate::s3::S3Store;

/// Anything that can hand over the raw listings table.
pub trait RawSource {
    fn load_table(&self) -> Result<DataFrame>;
}

impl RawSource for DataFrame {
    fn load_table(&self) -> Result<DataFrame> {
        Ok(self.clone())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    Parquet,
    Csv,
}

impl TableFormat {
    /// Pick the format from a path or URL extension.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.split(['?', '#']).next().unwrap_or(name);
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("parquet") | Some("pq") => Ok(TableFormat::Parquet),
            Some("csv") => Ok(TableFormat::Csv),
            _ => Err(PrepError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Where a stored table lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    File(PathBuf),
    /// Anonymous GET over plain HTTP(S).
    Http(String),
    /// Authenticated object access through the S3 API.
    S3 { bucket: String, key: String },
}

impl Locator {
    pub fn s3(bucket: &str, key: &str) -> Result<Self> {
        let key = key.trim_start_matches('/');
        if bucket.is_empty() || key.is_empty() {
            return Err(PrepError::InvalidLocator(format!("s3://{bucket}/{key}")));
        }
        Ok(Locator::S3 {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    pub fn format(&self) -> Result<TableFormat> {
        match self {
            Locator::File(path) => TableFormat::from_name(&path.to_string_lossy()),
            Locator::Http(url) => TableFormat::from_name(url),
            Locator::S3 { key, .. } => TableFormat::from_name(key),
        }
    }
}

impl FromStr for Locator {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PrepError::InvalidLocator(s.to_string()));
        }
        if let Some(rest) = s.strip_prefix("s3://") {
            let (bucket, key) = rest
                .split_once('/')
                .ok_or_else(|| PrepError::InvalidLocator(s.to_string()))?;
            return Locator::s3(bucket, key);
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Locator::Http(s.to_string()));
        }
        Ok(Locator::File(PathBuf::from(s)))
    }
}

impl RawSource for Locator {
    fn load_table(&self) -> Result<DataFrame> {
        let format = self.format()?;
        let df = match self {
            Locator::File(path) => load_file(path, format)?,
            Locator::Http(url) => {
                let bytes = download(url)?;
                read_table(Cursor::new(bytes), format)?
            }
            Locator::S3 { bucket, key } => {
                let bytes = S3Store::connect()?.get_object(bucket, key)?;
                read_table(Cursor::new(bytes), format)?
            }
        };
        info!("Loaded {} rows and {} columns", df.height(), df.width());
        Ok(df)
    }
}

fn load_file(path: &Path, format: TableFormat) -> Result<DataFrame> {
    info!("Reading {:?} table from {}", format, path.display());
    let file = File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => PrepError::NotFound(path.display().to_string()),
        _ => PrepError::Io(err),
    })?;
    read_table(file, format)
}

fn download(url: &str) -> Result<Vec<u8>> {
    info!("Downloading {url}");
    let response = reqwest::blocking::get(url)?;
    if response.status() == StatusCode::NOT_FOUND {
        return Err(PrepError::NotFound(url.to_string()));
    }
    let bytes = response.error_for_status()?.bytes()?;
    debug!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// Decode a table from any seekable reader.
pub fn read_table<R: MmapBytesReader>(reader: R, format: TableFormat) -> Result<DataFrame> {
    let df = match format {
        TableFormat::Parquet => ParquetReader::new(reader).finish()?,
        TableFormat::Csv => CsvReader::new(reader).has_header(true).finish()?,
    };
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_locators() -> anyhow::Result<()> {
        assert_eq!(
            "s3://jobs-bucket/raw/listings.parquet".parse::<Locator>()?,
            Locator::S3 {
                bucket: "jobs-bucket".into(),
                key: "raw/listings.parquet".into()
            }
        );
        assert_eq!(
            "https://example.com/listings.csv".parse::<Locator>()?,
            Locator::Http("https://example.com/listings.csv".into())
        );
        assert_eq!(
            "data/listings.parquet".parse::<Locator>()?,
            Locator::File(PathBuf::from("data/listings.parquet"))
        );
        assert!("s3://bucket-only".parse::<Locator>().is_err());
        assert!("s3:///raw/listings.parquet".parse::<Locator>().is_err());
        assert!("".parse::<Locator>().is_err());
        Ok(())
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(TableFormat::from_name("a/b.PARQUET").ok(), Some(TableFormat::Parquet));
        assert_eq!(TableFormat::from_name("https://x/y.csv?sig=1").ok(), Some(TableFormat::Csv));
        let object = Locator::s3("talent-data", "raw/jobs.pq").ok();
        assert_eq!(object.and_then(|l| l.format().ok()), Some(TableFormat::Parquet));
        assert!(matches!(
            TableFormat::from_name("listings.json"),
            Err(PrepError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let locator = Locator::File(PathBuf::from("/nonexistent/listings.csv"));
        assert!(matches!(locator.load_table(), Err(PrepError::NotFound(_))));
    }

    #[test]
    fn test_load_csv_file() -> anyhow::Result<()> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "job_title,job_salary")?;
        writeln!(file, "Senior Analyst,$90000")?;
        writeln!(file, "Clerk,")?;
        file.flush()?;

        let df = Locator::File(file.path().to_path_buf()).load_table()?;
        assert_eq!(df.shape(), (2, 2));
        Ok(())
    }

    #[test]
    fn test_dataframe_source() -> anyhow::Result<()> {
        let df = df!("job_title" => &["Analyst"])?;
        assert!(df.load_table()?.equals(&df));
        Ok(())
    }
}
