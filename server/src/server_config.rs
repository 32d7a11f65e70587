use std::net::SocketAddr;
use std::time::Duration;

use common::config::Validate;
use common::engine::tictactoe::FirstPlayerMode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "server_config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub static_files_path: Option<String>,
    pub first_player: FirstPlayerMode,
    pub promo: PromoSettings,
    pub telegram: TelegramSettings,
    pub cleanup: CleanupSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            static_files_path: None,
            first_player: FirstPlayerMode::Human,
            promo: PromoSettings::default(),
            telegram: TelegramSettings::default(),
            cleanup: CleanupSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoSettings {
    pub prefix: String,
    pub code_length: usize,
}

impl Default for PromoSettings {
    fn default() -> Self {
        Self {
            prefix: "TTT".to_string(),
            code_length: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub enabled: bool,
    pub link_code_length: usize,
    pub link_code_ttl_secs: u64,
    pub linked_code_ttl_secs: u64,
    pub notify_timeout_ms: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            link_code_length: 6,
            link_code_ttl_secs: 600,
            linked_code_ttl_secs: 7 * 24 * 3600,
            notify_timeout_ms: 5000,
        }
    }
}

impl TelegramSettings {
    pub fn link_code_ttl(&self) -> Duration {
        Duration::from_secs(self.link_code_ttl_secs)
    }

    pub fn linked_code_ttl(&self) -> Duration {
        Duration::from_secs(self.linked_code_ttl_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    pub check_interval_secs: u64,
    pub inactivity_timeout_secs: u64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: 300,
            inactivity_timeout_secs: 3600,
        }
    }
}

impl CleanupSettings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        self.bind_address
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid bind address '{}': {}", self.bind_address, e))?;

        if self.promo.code_length < 4 || self.promo.code_length > 32 {
            return Err("Promo code length must be between 4 and 32".to_string());
        }
        if self.promo.prefix.len() > 16 {
            return Err("Promo prefix must be at most 16 characters".to_string());
        }
        if !self.promo.prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err("Promo prefix must be ASCII letters or digits".to_string());
        }

        if self.telegram.link_code_length < 4 || self.telegram.link_code_length > 32 {
            return Err("Link code length must be between 4 and 32".to_string());
        }
        if self.telegram.link_code_ttl_secs == 0 {
            return Err("Link code TTL must be positive".to_string());
        }
        if self.telegram.linked_code_ttl_secs < self.telegram.link_code_ttl_secs {
            return Err("Linked code TTL must not be shorter than the link code TTL".to_string());
        }
        if self.telegram.notify_timeout_ms == 0 {
            return Err("Notify timeout must be positive".to_string());
        }

        if self.cleanup.check_interval_secs == 0 {
            return Err("Cleanup check interval must be positive".to_string());
        }
        if self.cleanup.inactivity_timeout_secs == 0 {
            return Err("Inactivity timeout must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::{ConfigManager, InMemoryConfigProvider, YamlConfigSerializer};

    fn load(yaml: &str) -> Result<ServerConfig, String> {
        let manager: ConfigManager<InMemoryConfigProvider, ServerConfig> = ConfigManager::new(
            InMemoryConfigProvider::new(Some(yaml.to_string())),
            YamlConfigSerializer,
        );
        manager.get_config()
    }

    #[test]
    fn test_default_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_yaml_overrides_nested_sections() {
        let config = load(
            "bind_address: 127.0.0.1:8080\n\
             first_player: random\n\
             promo:\n  prefix: WIN\n\
             telegram:\n  enabled: true\n",
        )
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.first_player, FirstPlayerMode::Random);
        assert_eq!(config.promo.prefix, "WIN");
        assert_eq!(config.promo.code_length, 8);
        assert!(config.telegram.enabled);
        assert_eq!(config.telegram.link_code_ttl_secs, 600);
        assert_eq!(config.telegram.linked_code_ttl(), Duration::from_secs(604800));
    }

    #[test]
    fn test_rejects_bad_bind_address() {
        let err = load("bind_address: not-an-address\n").unwrap_err();
        assert!(err.contains("Invalid bind address"));
    }

    #[test]
    fn test_rejects_bad_promo_settings() {
        assert!(load("promo:\n  code_length: 2\n").is_err());
        assert!(load("promo:\n  prefix: \"W-1\"\n").is_err());
    }

    #[test]
    fn test_rejects_zero_durations() {
        assert!(load("telegram:\n  notify_timeout_ms: 0\n").is_err());
        assert!(load("cleanup:\n  check_interval_secs: 0\n").is_err());
    }

    #[test]
    fn test_rejects_linked_ttl_shorter_than_pending() {
        let err = load("telegram:\n  link_code_ttl_secs: 600\n  linked_code_ttl_secs: 60\n").unwrap_err();
        assert!(err.contains("Linked code TTL"));
    }
}
