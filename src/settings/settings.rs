use anyhow::{Result, anyhow};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub identity: Identity,
    pub store: Store,
    pub cache: Cache,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub tls: Option<Tls>,
}

#[derive(Debug, Deserialize)]
pub struct Tls {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    pub backend: String, // "fake" or "jwt"
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Name of the environment variable holding the HS256 key.
    #[serde(default = "default_signing_key_env")]
    pub signing_key_env: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "mysql"
    pub mysql_dsn: Option<String>,
    #[serde(default)]
    pub apply_schema: bool,
    #[serde(default)]
    pub seed_users: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
    pub backend: String, // "none", "memory" or "redis"
    pub redis_dsn: Option<String>,
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_issuer() -> String {
    "careernet.identity".to_string()
}

fn default_audience() -> String {
    "careernet-web".to_string()
}

fn default_signing_key_env() -> String {
    "CAREERNET_JWT_KEY".to_string()
}

fn default_access_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_cache_prefix() -> String {
    "careernet".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Load settings from `path` (or the build profile default), then apply
/// `CAREERNET__SECTION__KEY` environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);
    build(Config::builder().add_source(File::with_name(path)))
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder
        .add_source(Environment::with_prefix("CAREERNET").separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn dev_settings_load() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        assert_eq!(settings.identity.backend, "fake");
        assert_eq!(settings.store.backend, "memory");
        assert!(!settings.store.seed_users.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }

    #[test]
    fn optional_keys_fall_back_to_defaults() {
        let toml = r#"
[http]
address = "127.0.0.1:8080"

[log]
filter = "debug"

[identity]
backend = "jwt"

[store]
backend = "mysql"
mysql_dsn = "mysql://app:pw@localhost:3306/careernet"

[cache]
backend = "none"
"#;
        let settings =
            build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml))).unwrap();

        assert!(settings.http.tls.is_none());
        assert_eq!(settings.identity.audience, "careernet-web");
        assert_eq!(settings.identity.access_ttl_secs, 86_400);
        assert!(!settings.store.apply_schema);
        assert!(settings.store.seed_users.is_empty());
        assert_eq!(settings.cache.ttl_secs, 300);
    }
}
