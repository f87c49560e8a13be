//! App configuration - passed in by the composition root

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::labels::card::NAME_LABEL;
use crate::error::{CardError, Result};

pub const DEFAULT_CONNECTOR: &str = "embedded-wallet";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: u64,
    pub name: String,
    /// Native token symbol shown next to balances.
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

impl ChainConfig {
    pub fn mainnet() -> Self { Self { id: 1, name: "Ethereum".into(), symbol: "ETH".into(), rpc_url: None } }
    pub fn sepolia() -> Self { Self { id: 11_155_111, name: "Sepolia".into(), symbol: "SepoliaETH".into(), rpc_url: None } }
    pub fn with_rpc(mut self, url: impl Into<String>) -> Self { self.rpc_url = Some(url.into()); self }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "ethereum" | "1" => Some(Self::mainnet()),
            "sepolia" | "11155111" => Some(Self::sepolia()),
            _ => None,
        }
    }
}

/// App configuration. The composition root builds it once at start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: String,
    /// Opaque identity-provider client id.
    pub client_id: String,
    /// First entry is the default chain.
    pub chains: Vec<ChainConfig>,
    /// Connector ids in priority order.
    pub connectors: Vec<String>,
    pub card_label: String,
    /// Connect the custodial wallet as soon as it is known.
    pub auto_connect: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: "deficard".into(),
            client_id: String::new(),
            chains: vec![ChainConfig::mainnet(), ChainConfig::sepolia()],
            connectors: vec![DEFAULT_CONNECTOR.into()],
            card_label: NAME_LABEL.into(),
            auto_connect: false,
        }
    }
}

impl AppConfig {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into(), ..Default::default() }
    }
    pub fn with_client_id(mut self, id: impl Into<String>) -> Self { self.client_id = id.into(); self }
    pub fn with_chains(mut self, chains: Vec<ChainConfig>) -> Self { self.chains = chains; self }
    pub fn with_connectors(mut self, connectors: Vec<String>) -> Self { self.connectors = connectors; self }
    pub fn with_card_label(mut self, label: impl Into<String>) -> Self { self.card_label = label.into(); self }
    pub fn with_auto_connect(mut self, on: bool) -> Self { self.auto_connect = on; self }

    pub fn default_chain(&self) -> Option<&ChainConfig> {
        self.chains.first()
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(CardError::Config("client_id is empty".into()));
        }
        if self.chains.is_empty() {
            return Err(CardError::Config("no chains configured".into()));
        }
        Ok(())
    }

    /// Defaults overridden by `DEFICARD_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Environment has priority over whatever is already set.
    pub fn apply_env(mut self) -> Self {
        let var = |key: &str| std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(app) = var("DEFICARD_APP") { self.app = app; }
        if let Some(id) = var("DEFICARD_CLIENT_ID") { self.client_id = id; }
        if let Some(label) = var("DEFICARD_CARD_LABEL") { self.card_label = label; }
        if let Some(list) = var("DEFICARD_CONNECTORS") {
            self.connectors = split_list(&list);
        }
        if let Some(list) = var("DEFICARD_CHAINS") {
            let chains: Vec<ChainConfig> = split_list(&list).iter().filter_map(|c| ChainConfig::from_name(c)).collect();
            if !chains.is_empty() {
                self.chains = chains;
            }
        }
        if let Some(flag) = var("DEFICARD_AUTO_CONNECT") {
            self.auto_connect = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        self
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CardError::Config(format!("read {}: {e}", path.display())))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: &[&str] = &[
        "DEFICARD_APP",
        "DEFICARD_CLIENT_ID",
        "DEFICARD_CARD_LABEL",
        "DEFICARD_CONNECTORS",
        "DEFICARD_CHAINS",
        "DEFICARD_AUTO_CONNECT",
    ];

    fn clear_env() {
        for v in VARS {
            std::env::remove_var(v);
        }
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.default_chain().unwrap().id, 1);
        assert_eq!(config.connectors, vec![DEFAULT_CONNECTOR.to_string()]);
        assert_eq!(config.card_label, "Solana Explorer #");
        assert!(!config.auto_connect);
    }

    #[test]
    fn validate_requires_client_id_and_chain() {
        assert!(matches!(AppConfig::default().validate(), Err(CardError::Config(_))));
        let config = AppConfig::new("t").with_client_id("abc");
        assert!(config.validate().is_ok());
        assert!(config.with_chains(vec![]).validate().is_err());
    }

    #[test]
    fn env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        clear_env();
        std::env::set_var("DEFICARD_CLIENT_ID", "client-123");
        std::env::set_var("DEFICARD_CONNECTORS", "injected, embedded-wallet,");
        std::env::set_var("DEFICARD_CHAINS", "sepolia,unknown");
        std::env::set_var("DEFICARD_AUTO_CONNECT", "yes");

        let config = AppConfig::from_env();
        assert_eq!(config.client_id, "client-123");
        assert_eq!(config.connectors, vec!["injected".to_string(), "embedded-wallet".to_string()]);
        assert_eq!(config.chains, vec![ChainConfig::sepolia()]);
        assert!(config.auto_connect);
        clear_env();
    }

    #[test]
    fn file_round_trip_with_partial_fields() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("deficard.json");
        let config = AppConfig::new("card").with_client_id("id").with_auto_connect(true);
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);

        std::fs::write(&path, r#"{"client_id":"only"}"#).unwrap();
        let partial = AppConfig::load(&path).unwrap();
        assert_eq!(partial.client_id, "only");
        assert_eq!(partial.chains.len(), 2);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = TempDir::new().expect("tempdir");
        assert!(matches!(AppConfig::load(dir.path().join("nope.json")), Err(CardError::Config(_))));
    }
}
