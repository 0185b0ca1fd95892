//! Reading a generated config the way the archiver consumes it.
//!
//! The archiver reads `default_settings` and the section of the selected
//! provider from `storage_providers`; every other provider entry is ignored.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::writer::ConfigFormat;

/// Environment variable consulted when the config carries no encryption key.
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Length of the AES-256 key the archiver expects.
pub const KEY_LEN: usize = 32;

const BUILTIN_KEY: &[u8; KEY_LEN] = b"default-32-byte-encryption-key!!";

const FALLBACK_PROVIDER: &str = "s3";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid `{provider}` provider section: {source}")]
    Provider {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown storage provider `{0}` (expected s3, googledrive, mega or minio)")]
    UnknownProvider(String),
}

/// Top-level structure of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub storage_providers: Map<String, Value>,
    #[serde(default)]
    pub default_settings: DefaultSettings,
}

/// Operator-wide defaults.
///
/// Sizes are read as plain signed integers; the builder accepts any `i64`, and
/// non-positive values are treated as unset when resolving.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DefaultSettings {
    pub storage_provider: String,
    pub workers: i64,
    pub chunk_size: i64,
    pub buffer_size: i64,
    pub encrypt: bool,
    pub resume: bool,
    pub encryption_key: String,
    /// Comma-separated list of paths.
    pub source_path: String,
    pub s3_filename: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub profile: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GoogleDriveSettings {
    pub credentials_path: String,
    pub token_path: String,
    pub folder_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MegaSettings {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MinioSettings {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub use_ssl: bool,
}

/// Parameters of the selected provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSettings {
    S3(S3Settings),
    GoogleDrive(GoogleDriveSettings),
    Mega(MegaSettings),
    Minio(MinioSettings),
}

impl ProviderSettings {
    /// Parse the section of provider `name`; a missing section yields empty settings.
    pub fn parse(name: &str, section: Option<&Value>) -> Result<Self, SettingsError> {
        fn typed<T: DeserializeOwned>(name: &str, section: Option<&Value>) -> Result<T, SettingsError> {
            let value = section.cloned().unwrap_or_else(|| Value::Object(Map::new()));
            serde_json::from_value(value).map_err(|source| SettingsError::Provider {
                provider: name.to_string(),
                source,
            })
        }

        Ok(match name {
            "s3" => ProviderSettings::S3(typed(name, section)?),
            "googledrive" => ProviderSettings::GoogleDrive(typed(name, section)?),
            "mega" => ProviderSettings::Mega(typed(name, section)?),
            "minio" => ProviderSettings::Minio(typed(name, section)?),
            other => return Err(SettingsError::UnknownProvider(other.to_string())),
        })
    }

    /// Labelled fields for display, secrets masked.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ProviderSettings::S3(s) => vec![
                ("bucket", s.bucket.clone()),
                ("region", s.region.clone()),
                ("profile", s.profile.clone()),
            ],
            ProviderSettings::GoogleDrive(g) => vec![
                ("credentials_path", g.credentials_path.clone()),
                ("token_path", g.token_path.clone()),
                ("folder_id", g.folder_id.clone()),
            ],
            ProviderSettings::Mega(m) => vec![
                ("username", m.username.clone()),
                ("password", mask(&m.password)),
            ],
            ProviderSettings::Minio(m) => vec![
                ("endpoint", m.endpoint.clone()),
                ("access_key_id", m.access_key_id.clone()),
                ("secret_access_key", mask(&m.secret_access_key)),
                ("bucket", m.bucket.clone()),
                ("use_ssl", m.use_ssl.to_string()),
            ],
        }
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

/// Where the encryption key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Config,
    Environment,
    BuiltIn,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeySource::Config => "config",
            KeySource::Environment => ENCRYPTION_KEY_ENV,
            KeySource::BuiltIn => "built-in default",
        })
    }
}

/// A key normalized to exactly [`KEY_LEN`] bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    pub bytes: [u8; KEY_LEN],
    pub source: KeySource,
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl EncryptionKey {
    /// Pick the configured key, else `env_key`, else the built-in key.
    ///
    /// Shorter keys are zero-padded, longer ones truncated.
    pub fn resolve(configured: &str, env_key: Option<&str>) -> Self {
        let (raw, source) = if !configured.is_empty() {
            (configured.as_bytes(), KeySource::Config)
        } else if let Some(env) = env_key.filter(|k| !k.is_empty()) {
            (env.as_bytes(), KeySource::Environment)
        } else {
            (&BUILTIN_KEY[..], KeySource::BuiltIn)
        };

        let mut bytes = [0u8; KEY_LEN];
        let n = raw.len().min(KEY_LEN);
        bytes[..n].copy_from_slice(&raw[..n]);
        Self { bytes, source }
    }
}

/// Effective settings for one archiver run.
#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    pub provider: String,
    pub provider_settings: ProviderSettings,
    /// Whether the provider has a section in `storage_providers`.
    pub provider_configured: bool,
    pub source_paths: Vec<String>,
    pub s3_filename: String,
    /// `None` when the file leaves it unset or non-positive.
    pub workers: Option<u64>,
    pub chunk_size: Option<u64>,
    pub buffer_size: Option<u64>,
    pub encrypt: bool,
    pub resume: bool,
    pub encryption_key: EncryptionKey,
}

impl ArchiveSettings {
    /// Load and resolve settings from a config file.
    ///
    /// The format follows the extension, as when writing.
    pub fn load(path: &Path, env_key: Option<&str>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = match ConfigFormat::from_path(path) {
            ConfigFormat::Json => serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            ConfigFormat::Toml => toml::from_str(&content).map_err(|source| SettingsError::ParseToml {
                path: path.to_path_buf(),
                source,
            })?,
        };
        Self::resolve(&file, env_key)
    }

    /// Resolve settings from an already parsed config.
    pub fn resolve(file: &FileConfig, env_key: Option<&str>) -> Result<Self, SettingsError> {
        let defaults = &file.default_settings;
        let provider = if defaults.storage_provider.is_empty() {
            FALLBACK_PROVIDER.to_string()
        } else {
            defaults.storage_provider.clone()
        };

        let section = file.storage_providers.get(&provider);
        if section.is_none() {
            warn!("provider `{provider}` has no section in storage_providers");
        }
        let provider_settings = ProviderSettings::parse(&provider, section)?;

        let source_paths = defaults
            .source_path
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            provider_configured: section.is_some(),
            provider,
            provider_settings,
            source_paths,
            s3_filename: defaults.s3_filename.clone(),
            workers: positive(defaults.workers),
            chunk_size: positive(defaults.chunk_size),
            buffer_size: positive(defaults.buffer_size),
            encrypt: defaults.encrypt,
            resume: defaults.resume,
            encryption_key: EncryptionKey::resolve(&defaults.encryption_key, env_key),
        })
    }
}

fn positive(n: i64) -> Option<u64> {
    u64::try_from(n).ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(value: Value) -> FileConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_resolve_s3() {
        let cfg = file(json!({
            "storage_providers": {
                "s3": {"bucket": "safe-storage-24", "region": "us-east-1", "profile": "default", "workers": 4}
            },
            "default_settings": {
                "storage_provider": "s3", "workers": 8, "chunk_size": 104857600,
                "buffer_size": 65536, "encrypt": true, "resume": false,
                "encryption_key": "", "source_path": "/data/a, /data/b,,", "s3_filename": "backup.tar"
            }
        }));
        let settings = ArchiveSettings::resolve(&cfg, None).unwrap();
        assert_eq!(settings.provider, "s3");
        assert!(settings.provider_configured);
        assert_eq!(
            settings.provider_settings,
            ProviderSettings::S3(S3Settings {
                bucket: "safe-storage-24".into(),
                region: "us-east-1".into(),
                profile: "default".into(),
            })
        );
        assert_eq!(settings.source_paths, ["/data/a", "/data/b"]);
        assert_eq!(settings.workers, Some(8));
        assert_eq!(settings.chunk_size, Some(104857600));
        assert!(!settings.resume);
        assert_eq!(settings.encryption_key.source, KeySource::BuiltIn);
    }

    #[test]
    fn test_empty_provider_falls_back_to_s3() {
        let settings = ArchiveSettings::resolve(&FileConfig::default(), None).unwrap();
        assert_eq!(settings.provider, "s3");
        assert!(!settings.provider_configured);
        assert_eq!(settings.provider_settings, ProviderSettings::S3(S3Settings::default()));
        assert!(settings.source_paths.is_empty());
        assert_eq!(settings.workers, None);
    }

    #[test]
    fn test_non_positive_sizes_are_unset() {
        let cfg = file(json!({
            "default_settings": {"workers": -1, "chunk_size": 0, "buffer_size": 9_000_000_000_i64}
        }));
        let settings = ArchiveSettings::resolve(&cfg, None).unwrap();
        assert_eq!(settings.workers, None);
        assert_eq!(settings.chunk_size, None);
        assert_eq!(settings.buffer_size, Some(9_000_000_000));
    }

    #[test]
    fn test_minio_and_masking() {
        let cfg = file(json!({
            "storage_providers": {
                "minio": {"endpoint": "localhost:9000", "access_key_id": "ak",
                          "secret_access_key": "sk", "bucket": "b", "use_ssl": false}
            },
            "default_settings": {"storage_provider": "minio"}
        }));
        let settings = ArchiveSettings::resolve(&cfg, None).unwrap();
        let fields = settings.provider_settings.fields();
        assert!(fields.contains(&("endpoint", "localhost:9000".to_string())));
        assert!(fields.contains(&("secret_access_key", "********".to_string())));
        assert!(fields.contains(&("use_ssl", "false".to_string())));
    }

    #[test]
    fn test_unknown_provider() {
        let cfg = file(json!({"default_settings": {"storage_provider": "dropbox"}}));
        assert!(matches!(
            ArchiveSettings::resolve(&cfg, None),
            Err(SettingsError::UnknownProvider(p)) if p == "dropbox"
        ));
    }

    #[test]
    fn test_bad_provider_section() {
        let cfg = file(json!({
            "storage_providers": {"mega": {"username": 5}},
            "default_settings": {"storage_provider": "mega"}
        }));
        assert!(matches!(
            ArchiveSettings::resolve(&cfg, None),
            Err(SettingsError::Provider { provider, .. }) if provider == "mega"
        ));
    }

    #[test]
    fn test_key_resolution() {
        let key = EncryptionKey::resolve("short", Some("from-env"));
        assert_eq!(key.source, KeySource::Config);
        assert_eq!(&key.bytes[..5], b"short");
        assert!(key.bytes[5..].iter().all(|b| *b == 0));

        let key = EncryptionKey::resolve("", Some("from-env"));
        assert_eq!(key.source, KeySource::Environment);
        assert_eq!(&key.bytes[..8], b"from-env");

        let long = "x".repeat(40);
        let key = EncryptionKey::resolve(&long, None);
        assert_eq!(key.bytes, [b'x'; KEY_LEN]);

        let key = EncryptionKey::resolve("", Some(""));
        assert_eq!(key.source, KeySource::BuiltIn);
        assert_eq!(&key.bytes, BUILTIN_KEY);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            ArchiveSettings::load(&missing, None),
            Err(SettingsError::Read { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            ArchiveSettings::load(&broken, None),
            Err(SettingsError::Parse { .. })
        ));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[default_settings\nworkers = ").unwrap();
        assert!(matches!(
            ArchiveSettings::load(&broken, None),
            Err(SettingsError::ParseToml { .. })
        ));
    }
}
