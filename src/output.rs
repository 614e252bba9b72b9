//! Persist prepared tables to local files or S3.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::error::{PrepError, Result};
use crate::s3::S3Store;
use crate::source::{Locator, TableFormat};

/// Write `df` to `dest` as Parquet or CSV depending on the extension.
///
/// Local parent directories are created as needed. Plain HTTP(S) locators
/// are read-only.
pub fn write_table(df: &mut DataFrame, dest: &Locator) -> Result<()> {
    let format = dest.format()?;
    match dest {
        Locator::File(path) => write_file(df, path, format)?,
        Locator::S3 { bucket, key } => {
            let mut body = Vec::new();
            encode(df, format, &mut body)?;
            S3Store::connect()?.put_object(bucket, key, body)?;
        }
        Locator::Http(url) => {
            return Err(PrepError::InvalidLocator(format!("cannot write to {url}")));
        }
    }

    info!("Wrote {} rows to {:?}", df.height(), dest);
    Ok(())
}

fn write_file(df: &mut DataFrame, path: &Path, format: TableFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    encode(df, format, &mut file)
}

fn encode<W: Write>(df: &mut DataFrame, format: TableFormat, writer: W) -> Result<()> {
    match format {
        TableFormat::Parquet => {
            ParquetWriter::new(writer).finish(df)?;
        }
        TableFormat::Csv => CsvWriter::new(writer).finish(df)?,
    }
    Ok(())
}
