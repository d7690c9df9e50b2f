use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BinanceProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub coingecko: Option<CoinGeckoProviderConfig>,
    pub binance: Option<BinanceProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coingecko: Some(CoinGeckoProviderConfig {
                base_url: "https://api.coingecko.com/api/v3".to_string(),
            }),
            binance: Some(BinanceProviderConfig {
                base_url: "https://api.binance.com/api/v3".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Coin every beta is measured against.
    #[serde(default = "default_reference")]
    pub reference: String,
    /// Coins analyzed by the `export` command.
    #[serde(default)]
    pub watchlist: Vec<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Quote currency for price history requests.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Price history look-back in days.
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_reference() -> String {
    "bitcoin".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_days() -> u32 {
    14
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "coinbeta", "coinbeta")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
reference: "bitcoin"
watchlist:
  - "ethereum"
  - "solana"
currency: "usd"
days: 14
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.reference, "bitcoin");
        assert_eq!(config.watchlist, vec!["ethereum", "solana"]);
        assert_eq!(config.currency, "usd");
        assert_eq!(config.days, 14);
        assert!(config.providers.coingecko.is_some());
        assert_eq!(
            config.providers.coingecko.unwrap().base_url,
            "https://api.coingecko.com/api/v3".to_string()
        );

        let yaml_str_with_providers = r#"
reference: "bitcoin"
watchlist: []
providers:
  coingecko:
    base_url: "http://example.com/coingecko"
  binance:
    base_url: "http://example.com/binance"
"#;
        let config_with_providers: AppConfig =
            serde_yaml::from_str(yaml_str_with_providers).unwrap();
        assert!(config_with_providers.providers.coingecko.is_some());
        assert_eq!(
            config_with_providers.providers.coingecko.unwrap().base_url,
            "http://example.com/coingecko"
        );
        assert!(config_with_providers.providers.binance.is_some());
        assert_eq!(
            config_with_providers.providers.binance.unwrap().base_url,
            "http://example.com/binance"
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("watchlist: []").unwrap();
        assert_eq!(config.reference, "bitcoin");
        assert_eq!(config.currency, "usd");
        assert_eq!(config.days, 14);
        assert!(config.watchlist.is_empty());
    }
}
