use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORAGE_ROOT: &str = "./tmp";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Directory holding uploaded images (under `images/`), also served statically.
    /// Set via TOKEN_STORAGE_ROOT env var. Default: ./tmp.
    pub storage_root: PathBuf,
    /// Optional request body cap in bytes. None = unlimited.
    /// Set via TOKEN_MAX_UPLOAD_BYTES env var.
    pub max_upload_bytes: Option<usize>,
    /// Delete the previous image when a token id is registered again.
    /// Set via TOKEN_PRUNE_REPLACED_IMAGES env var. Default: false.
    pub prune_replaced_images: bool,
    /// Emit logs as JSON instead of plain text.
    /// Set via TOKEN_LOG_FORMAT=json. Default: text.
    pub json_logs: bool,
}

impl Config {
    /// Configuration for a storage root with every optional behavior off.
    pub fn with_storage_root(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            port: DEFAULT_PORT,
            storage_root: storage_root.into(),
            max_upload_bytes: None,
            prune_replaced_images: false,
            json_logs: false,
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let port = match std::env::var("PORT") {
        Ok(raw) if !raw.is_empty() => raw.parse().unwrap_or_else(|_| {
            eprintln!("PORT={raw} is not a valid port, falling back to {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
        _ => DEFAULT_PORT,
    };

    let max_upload_bytes = match std::env::var("TOKEN_MAX_UPLOAD_BYTES") {
        Ok(raw) if !raw.is_empty() => Some(raw.parse().map_err(|_| {
            anyhow::anyhow!("TOKEN_MAX_UPLOAD_BYTES must be a byte count, got '{}'", raw)
        })?),
        _ => None,
    };

    Ok(Config {
        port,
        storage_root: std::env::var("TOKEN_STORAGE_ROOT")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_ROOT.into())
            .into(),
        max_upload_bytes,
        prune_replaced_images: std::env::var("TOKEN_PRUNE_REPLACED_IMAGES")
            .map(|v| parse_flag(&v))
            .unwrap_or(false),
        json_logs: std::env::var("TOKEN_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false),
    })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" ON "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("maybe"));
    }

    #[test]
    fn test_with_storage_root_defaults() {
        let cfg = Config::with_storage_root("/var/lib/tokens");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.storage_root, PathBuf::from("/var/lib/tokens"));
        assert!(cfg.max_upload_bytes.is_none());
        assert!(!cfg.prune_replaced_images);
    }
}
