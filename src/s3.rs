//! Blocking wrapper over the S3 client for reading raw listings and
//! publishing prepared tables.
//!
//! Credentials, region and endpoint come from the standard AWS environment
//! (`AWS_REGION`, `AWS_ENDPOINT_URL`, profiles, instance roles).

use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use crate::error::{PrepError, Result};

pub struct S3Store {
    runtime: Runtime,
    client: Client,
}

impl S3Store {
    pub fn connect() -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let config = runtime.block_on(aws_config::load_defaults(BehaviorVersion::latest()));
        Ok(Self {
            runtime,
            client: Client::new(&config),
        })
    }

    pub fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        info!("Fetching s3://{bucket}/{key}");
        self.runtime.block_on(async {
            let output = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| get_object_error(bucket, key, err.into_service_error()))?;
            let body = output
                .body
                .collect()
                .await
                .map_err(|err| PrepError::S3(err.to_string()))?;
            let bytes = body.into_bytes().to_vec();
            debug!("Fetched {} bytes", bytes.len());
            Ok::<_, PrepError>(bytes)
        })
    }

    pub fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        info!("Uploading {} bytes to s3://{bucket}/{key}", body.len());
        self.runtime.block_on(async {
            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(body))
                .send()
                .await
                .map_err(|err| PrepError::S3(DisplayErrorContext(&err).to_string()))?;
            Ok::<_, PrepError>(())
        })
    }
}

fn get_object_error(bucket: &str, key: &str, err: GetObjectError) -> PrepError {
    match err {
        GetObjectError::NoSuchKey(_) => PrepError::NotFound(format!("s3://{bucket}/{key}")),
        other => PrepError::S3(DisplayErrorContext(&other).to_string()),
    }
}
