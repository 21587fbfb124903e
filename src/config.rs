/// Region used when none is configured
pub const DEFAULT_REGION: &'static str = "us-east-1";

/// Resolved configuration of an S3 bucket.
///
/// Credentials are opaque: nothing here validates them. Empty or wrong values
/// are only detected by the service, on the first request.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Config {
    /// The bucket all objects are read from
    pub bucket: String,
    pub access_key: String,
    pub secret_access_key: String,
    /// e.g. `us-east-1`
    pub region: String,
    /// Custom endpoint for S3-compatible stores. `None` uses AWS
    pub endpoint_url: Option<String>,
}

impl S3Config {
    pub fn new(bucket: String, access_key: String, secret_access_key: String) -> Self {
        Self {
            bucket,
            access_key,
            secret_access_key,
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Resolves the configuration from the process environment.
    /// See [`S3Config::from_lookup`].
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the configuration from `lookup`:
    /// * `S3_BUCKET_NAME`
    /// * `AWS_ACCESS_KEY`
    /// * `AWS_SECRET_KEY`
    /// * `S3_ENDPOINT_URL` (optional)
    ///
    /// Missing variables become empty strings.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let var = |name: &str| lookup(name).unwrap_or_default();
        Self {
            bucket: var("S3_BUCKET_NAME"),
            access_key: var("AWS_ACCESS_KEY"),
            secret_access_key: var("AWS_SECRET_KEY"),
            region: DEFAULT_REGION.to_string(),
            endpoint_url: lookup("S3_ENDPOINT_URL").filter(|x| !x.is_empty()),
        }
    }
}

// keeps the secret out of logs
impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}
