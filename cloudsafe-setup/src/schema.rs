//! The CloudSafe configuration schema.
//!
//! Two top-level sections are prompted for:
//!
//! ```json
//! {
//!     "storage_providers": { "s3": { ... }, "googledrive": { ... }, "mega": { ... }, "minio": { ... } },
//!     "default_settings": { "storage_provider": "s3", "workers": 4, ... }
//! }
//! ```

use clap::ValueEnum;
use schemaprompt::{Leaf, SchemaNode, Section};

/// File written when no output path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Key of the provider map.
pub const STORAGE_PROVIDERS: &str = "storage_providers";

/// Key of the operator-wide defaults.
pub const DEFAULT_SETTINGS: &str = "default_settings";

/// Per-provider enablement flag, present only while prompting.
pub const ENABLED: &str = "enabled";

/// Provider keys in prompting order.
pub const PROVIDERS: [&str; 4] = ["s3", "googledrive", "mega", "minio"];

pub const DEFAULT_CHUNK_SIZE: i64 = 100 * 1024 * 1024;
pub const DEFAULT_BUFFER_SIZE: i64 = 64 * 1024;
pub const DEFAULT_WORKERS: i64 = 4;
pub const DEFAULT_S3_BUCKET: &str = "safe-storage-24";
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Which storage providers end up in the written file.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProviderSelection {
    /// Ask whether each provider is enabled and keep only the enabled ones.
    #[default]
    Enabled,
    /// Skip the enablement question and write every provider.
    All,
}

/// Build the schema for the given provider selection.
pub fn cloudsafe_schema(selection: ProviderSelection) -> SchemaNode {
    Section::new()
        .section(STORAGE_PROVIDERS, storage_providers(selection))
        .section(DEFAULT_SETTINGS, default_settings())
        .into()
}

fn storage_providers(selection: ProviderSelection) -> Section {
    let s3 = provider(
        selection,
        "S3",
        true,
        vec![
            ("bucket", Leaf::string("Enter the S3 bucket name", DEFAULT_S3_BUCKET)),
            ("region", Leaf::string("Enter the S3 region", DEFAULT_S3_REGION)),
            ("profile", Leaf::string("Enter the S3 profile", "default")),
            ("chunk_size", Leaf::integer("Enter chunk size for S3", DEFAULT_CHUNK_SIZE)),
            ("workers", Leaf::integer("Enter number of S3 workers", DEFAULT_WORKERS)),
            ("buffer_size", Leaf::integer("Enter buffer size for S3", DEFAULT_BUFFER_SIZE)),
            ("resume", Leaf::boolean("Enable S3 resume? (yes/no)", true)),
        ],
    );

    let googledrive = provider(
        selection,
        "Google Drive",
        false,
        vec![
            (
                "credentials_path",
                Leaf::string("Enter Google Drive credentials path", ""),
            ),
            (
                "token_path",
                Leaf::string("Enter Google Drive token path", "~/.google/token.json"),
            ),
            ("folder_id", Leaf::string("Enter Google Drive folder ID", "")),
            (
                "chunk_size",
                Leaf::integer("Enter chunk size for Google Drive", DEFAULT_CHUNK_SIZE),
            ),
            ("resume", Leaf::boolean("Enable Google Drive resume? (yes/no)", true)),
        ],
    );

    let mega = provider(
        selection,
        "Mega.nz",
        false,
        vec![
            ("username", Leaf::string("Enter Mega username", "")),
            ("password", Leaf::string("Enter Mega password", "")),
            ("chunk_size", Leaf::integer("Enter chunk size for Mega", DEFAULT_CHUNK_SIZE)),
            ("resume", Leaf::boolean("Enable Mega resume? (yes/no)", true)),
        ],
    );

    let minio = provider(
        selection,
        "MinIO",
        false,
        vec![
            ("endpoint", Leaf::string("Enter MinIO endpoint (host:port)", "")),
            ("access_key_id", Leaf::string("Enter MinIO access key ID", "")),
            ("secret_access_key", Leaf::string("Enter MinIO secret access key", "")),
            ("bucket", Leaf::string("Enter MinIO bucket name", "")),
            ("use_ssl", Leaf::boolean("Use SSL for MinIO? (yes/no)", true)),
            ("chunk_size", Leaf::integer("Enter chunk size for MinIO", DEFAULT_CHUNK_SIZE)),
            ("workers", Leaf::integer("Enter number of MinIO workers", DEFAULT_WORKERS)),
            ("buffer_size", Leaf::integer("Enter buffer size for MinIO", DEFAULT_BUFFER_SIZE)),
            ("resume", Leaf::boolean("Enable MinIO resume? (yes/no)", true)),
        ],
    );

    Section::new()
        .section("s3", s3)
        .section("googledrive", googledrive)
        .section("mega", mega)
        .section("minio", minio)
}

fn provider(
    selection: ProviderSelection,
    label: &str,
    enabled: bool,
    fields: Vec<(&str, Leaf)>,
) -> Section {
    let mut section = Section::new();
    if selection == ProviderSelection::Enabled {
        section.insert(
            ENABLED,
            Leaf::boolean(format!("Enable {label} storage provider? (yes/no)"), enabled),
        );
    }
    for (key, leaf) in fields {
        section.insert(key, leaf);
    }
    section
}

fn default_settings() -> Section {
    Section::new()
        .leaf("storage_provider", Leaf::string("Enter default storage provider", "s3"))
        .leaf("workers", Leaf::integer("Enter default number of workers", DEFAULT_WORKERS))
        .leaf("chunk_size", Leaf::integer("Enter default chunk size", DEFAULT_CHUNK_SIZE))
        .leaf("buffer_size", Leaf::integer("Enter default buffer size", DEFAULT_BUFFER_SIZE))
        .leaf("encrypt", Leaf::boolean("Enable default encryption? (yes/no)", true))
        .leaf("resume", Leaf::boolean("Enable default resume? (yes/no)", true))
        .leaf("encryption_key", Leaf::string("Enter default encryption key", ""))
        .leaf("source_path", Leaf::string("Enter the source path to archive", ""))
        .leaf("s3_filename", Leaf::string("Enter the target filename for the object", ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaprompt::ScalarValue;
    use serde_json::json;

    fn providers(schema: &SchemaNode) -> Vec<String> {
        match schema.get_by_key(STORAGE_PROVIDERS) {
            Some(SchemaNode::Section(s)) => s.children().map(|(k, _)| k.to_string()).collect(),
            _ => panic!("storage_providers must be a section"),
        }
    }

    #[test]
    fn test_provider_order() {
        let schema = cloudsafe_schema(ProviderSelection::Enabled);
        assert_eq!(providers(&schema), PROVIDERS);
    }

    #[test]
    fn test_enabled_flag_first_and_only_in_enabled_mode() {
        let schema = cloudsafe_schema(ProviderSelection::Enabled);
        for name in PROVIDERS {
            let Some(SchemaNode::Section(section)) =
                schema.get_by_key(&format!("{STORAGE_PROVIDERS}.{name}"))
            else {
                panic!("{name} missing");
            };
            assert_eq!(section.children().next().map(|(k, _)| k), Some(ENABLED));
        }

        let schema = cloudsafe_schema(ProviderSelection::All);
        for name in PROVIDERS {
            assert!(
                schema
                    .get_by_key(&format!("{STORAGE_PROVIDERS}.{name}.{ENABLED}"))
                    .is_none()
            );
        }
    }

    #[test]
    fn test_only_s3_enabled_by_default() {
        let defaults = cloudsafe_schema(ProviderSelection::Enabled).defaults();
        for name in PROVIDERS {
            assert_eq!(
                defaults[STORAGE_PROVIDERS][name][ENABLED],
                json!(name == "s3"),
                "{name}"
            );
        }
    }

    #[test]
    fn test_default_settings_defaults() {
        let defaults = cloudsafe_schema(ProviderSelection::Enabled).defaults();
        assert_eq!(
            defaults[DEFAULT_SETTINGS],
            json!({
                "storage_provider": "s3",
                "workers": 4,
                "chunk_size": 104857600,
                "buffer_size": 65536,
                "encrypt": true,
                "resume": true,
                "encryption_key": "",
                "source_path": "",
                "s3_filename": ""
            })
        );
    }

    #[test]
    fn test_s3_bucket_default() {
        let schema = cloudsafe_schema(ProviderSelection::All);
        let Some(SchemaNode::Leaf(leaf)) = schema.get_by_key("storage_providers.s3.bucket") else {
            panic!("bucket leaf missing");
        };
        assert_eq!(leaf.default, Some(ScalarValue::Str("safe-storage-24".into())));
    }
}
