use std::io::{Error, ErrorKind};

use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, SdkError},
    operation::get_object::GetObjectError,
};

use crate::fs::BlobStorageProvider;
use crate::S3Config;

/// A client of a single S3 bucket
pub struct ContainerClient {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl ContainerClient {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn error(kind: ErrorKind, err: &impl std::error::Error) -> Error {
    Error::new(kind, DisplayErrorContext(err).to_string())
}

/// The [`ErrorKind`] of a service error with HTTP `status`
fn status_kind(status: u16) -> ErrorKind {
    match status {
        403 => ErrorKind::PermissionDenied,
        404 => ErrorKind::NotFound,
        _ => ErrorKind::Other,
    }
}

async fn get(client: &ContainerClient, blob_name: &str) -> Result<Option<Vec<u8>>, Error> {
    let maybe_object = client
        .client
        .get_object()
        .bucket(&client.bucket)
        .key(blob_name)
        .send()
        .await;

    let object = match maybe_object {
        Err(err) => match err {
            SdkError::ServiceError(ref e) => {
                if matches!(e.err(), GetObjectError::NoSuchKey(_)) {
                    return Ok(None);
                }
                return Err(error(status_kind(e.raw().status().as_u16()), &err));
            }
            _ => return Err(error(ErrorKind::Other, &err)),
        },
        Ok(x) => x,
    };

    object
        .body
        .collect()
        .await
        .map(|x| Some(x.into_bytes().to_vec()))
        .map_err(Error::other)
}

/// Credentials that are handed to the SDK as-is
#[derive(Debug)]
struct StaticKeys {
    access_key: String,
    secret_access_key: String,
}

impl ProvideCredentials for StaticKeys {
    fn provide_credentials<'a>(
        &'a self,
    ) -> aws_credential_types::provider::future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        let access_key = self.access_key.clone();
        let secret_access_key = self.secret_access_key.clone();
        aws_credential_types::provider::future::ProvideCredentials::new(async {
            Ok(Credentials::new(
                access_key,
                secret_access_key,
                None,
                None,
                "s3-table",
            ))
        })
    }
}

/// Initialize a [`ContainerClient`] from `config`.
///
/// No request is sent and credentials are not validated: failures surface on the first
/// request. Retries are disabled, so every request is sent exactly once.
pub async fn client(config: S3Config) -> ContainerClient {
    let S3Config {
        bucket,
        access_key,
        secret_access_key,
        region,
        endpoint_url,
    } = config;
    let provider = StaticKeys {
        access_key,
        secret_access_key,
    };

    let mut loader = aws_config::ConfigLoader::default()
        .behavior_version(aws_config::BehaviorVersion::latest())
        .region(Region::new(region))
        .retry_config(aws_config::retry::RetryConfig::disabled())
        .credentials_provider(provider);
    let path_style = endpoint_url.is_some();
    if let Some(endpoint_url) = endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    let config = loader.load().await;

    // custom endpoints are addressed path-style (`{endpoint}/{bucket}/{key}`)
    let config = aws_sdk_s3::config::Builder::from(&config)
        .force_path_style(path_style)
        .build();
    let client = aws_sdk_s3::Client::from_conf(config);

    ContainerClient { client, bucket }
}

#[async_trait::async_trait]
impl BlobStorageProvider for ContainerClient {
    #[must_use]
    async fn maybe_get(&self, blob_name: &str) -> Result<Option<Vec<u8>>, std::io::Error> {
        get(self, blob_name).await
    }

    fn container(&self) -> &str {
        &self.bucket
    }
}
