//! Configuration module
//!
//! Environment-driven configuration for the gateway: server settings,
//! upstream RPC endpoints and deadlines, object storage, CDN, and upload
//! limits. `Config::from_env` applies defaults; `validate` fails fast on
//! combinations that cannot work at runtime.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use crate::validation::UploadLimits;

const MAX_UPLOAD_SIZE_MB: usize = 10;
const AUTH_RPC_TIMEOUT_SECS: u64 = 30;
const TOKEN_VALIDATE_TIMEOUT_SECS: u64 = 10;
const ENHANCEMENT_RPC_TIMEOUT_SECS: u64 = 60;

/// Storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Gateway configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    // Upstream RPC services
    pub auth_service_host: String,
    pub auth_service_port: u16,
    pub enhancement_service_host: String,
    pub enhancement_service_port: u16,
    pub auth_rpc_timeout: Duration,
    pub token_validate_timeout: Duration,
    pub enhancement_rpc_timeout: Duration,
    // Object storage
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub local_storage_path: Option<String>,
    // CDN
    pub cdn_domain: String,
    pub cdn_distribution_id: Option<String>,
    // Upload limits
    pub max_upload_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "jpg,jpeg,png,webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "image/jpeg,image/jpg,image/png,image/webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or(StorageBackend::S3);

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            auth_service_host: env::var("AUTH_SERVICE_HOST")
                .unwrap_or_else(|_| "auth-service".to_string()),
            auth_service_port: env::var("AUTH_SERVICE_PORT")
                .unwrap_or_else(|_| "50051".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("AUTH_SERVICE_PORT must be a valid port"))?,
            enhancement_service_host: env::var("ENHANCEMENT_SERVICE_HOST")
                .unwrap_or_else(|_| "enhancement-service".to_string()),
            enhancement_service_port: env::var("ENHANCEMENT_SERVICE_PORT")
                .unwrap_or_else(|_| "50061".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ENHANCEMENT_SERVICE_PORT must be a valid port"))?,
            auth_rpc_timeout: Duration::from_secs(
                env::var("AUTH_RPC_TIMEOUT_SECS")
                    .unwrap_or_else(|_| AUTH_RPC_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(AUTH_RPC_TIMEOUT_SECS),
            ),
            token_validate_timeout: Duration::from_secs(
                env::var("TOKEN_VALIDATE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| TOKEN_VALIDATE_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(TOKEN_VALIDATE_TIMEOUT_SECS),
            ),
            enhancement_rpc_timeout: Duration::from_secs(
                env::var("ENHANCEMENT_RPC_TIMEOUT_SECS")
                    .unwrap_or_else(|_| ENHANCEMENT_RPC_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(ENHANCEMENT_RPC_TIMEOUT_SECS),
            ),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").or_else(|_| env::var("AWS_REGION")).ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            cdn_domain: env::var("CDN_DOMAIN").unwrap_or_default(),
            cdn_distribution_id: env::var("CDN_DISTRIBUTION_ID").ok().filter(|s| !s.is_empty()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            allowed_extensions,
            allowed_content_types,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.cdn_domain.trim().is_empty() {
            return Err(anyhow::anyhow!("CDN_DOMAIN must be set"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!("S3_BUCKET must be set for the s3 backend"));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set for the s3 backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set for the local backend"
                    ));
                }
            }
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }
        if self.allowed_extensions.is_empty() || self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS and ALLOWED_CONTENT_TYPES must not be empty"
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Full endpoint for the auth service channel.
    pub fn auth_service_endpoint(&self) -> String {
        format!("http://{}:{}", self.auth_service_host, self.auth_service_port)
    }

    /// Full endpoint for the enhancement service channel.
    pub fn enhancement_service_endpoint(&self) -> String {
        format!(
            "http://{}:{}",
            self.enhancement_service_host, self.enhancement_service_port
        )
    }

    /// Upload limits for the ingestion pipeline.
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_size: self.max_upload_size_bytes,
            allowed_extensions: self.allowed_extensions.clone(),
            allowed_content_types: self.allowed_content_types.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 8080,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            auth_service_host: "localhost".to_string(),
            auth_service_port: 50051,
            enhancement_service_host: "localhost".to_string(),
            enhancement_service_port: 50061,
            auth_rpc_timeout: Duration::from_secs(30),
            token_validate_timeout: Duration::from_secs(10),
            enhancement_rpc_timeout: Duration::from_secs(60),
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/imago".to_string()),
            cdn_domain: "cdn.example.com".to_string(),
            cdn_distribution_id: None,
            max_upload_size_bytes: 10 * 1024 * 1024,
            allowed_extensions: vec!["jpg".to_string()],
            allowed_content_types: vec!["image/jpeg".to_string()],
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_cdn_domain() {
        let mut config = base_config();
        config.cdn_domain = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_s3_settings_for_s3_backend() {
        let mut config = base_config();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.s3_bucket = Some("bucket".to_string());
        config.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            "LOCAL".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert!("nfs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_service_endpoints() {
        let config = base_config();
        assert_eq!(config.auth_service_endpoint(), "http://localhost:50051");
        assert_eq!(
            config.enhancement_service_endpoint(),
            "http://localhost:50061"
        );
    }
}
