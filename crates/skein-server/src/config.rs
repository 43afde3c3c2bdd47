use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skein_list::{ListConfig, DEFAULT_CAPACITY};

use crate::error::{ServerError, ServerResult};

/// Port the server listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 7777;

/// Server settings, loadable from TOML. Every field is optional in the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Data directory; `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// Maximum items per tree node for every timeline.
    pub capacity: usize,
    /// Answer cross-origin requests from any origin.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            data_dir: None,
            capacity: DEFAULT_CAPACITY,
            cors: false,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// The tree configuration every timeline is opened with.
    pub fn list_config(&self) -> ServerResult<ListConfig> {
        ListConfig::with_capacity(self.capacity).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:7777".parse::<SocketAddr>().unwrap());
        assert!(c.data_dir.is_none());
        assert_eq!(c.capacity, DEFAULT_CAPACITY);
        assert!(!c.cors);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            data_dir = "/var/lib/skein"
            capacity = 32
            "#,
        )
        .unwrap();
        assert_eq!(c.data_dir, Some(PathBuf::from("/var/lib/skein")));
        assert_eq!(c.capacity, 32);
        assert_eq!(c.bind_addr, ServerConfig::default().bind_addr);
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(matches!(
            ServerConfig::from_toml_str("bind_addr = \"nowhere\""),
            Err(ServerError::Config(_))
        ));
        let tiny = ServerConfig {
            capacity: 1,
            ..ServerConfig::default()
        };
        assert!(matches!(tiny.list_config(), Err(ServerError::Config(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skein.toml");
        std::fs::write(&path, "bind_addr = \"0.0.0.0:8080\"\ncors = true\n").unwrap();
        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert!(c.cors);
    }
}
