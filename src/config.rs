use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

fn default_http_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_move_delay_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// e.g. "0.0.0.0:3001"
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Pacing delay before the automated opponent's state is broadcast
    #[serde(default = "default_move_delay_ms")]
    pub move_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            move_delay_ms: default_move_delay_ms(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::from_filename(".env");
        let cfg = Self {
            http_addr: std::env::var("HTTP_ADDR").unwrap_or_else(|_| default_http_addr()),
            move_delay_ms: match std::env::var("MOVE_DELAY_MS") {
                Ok(v) => v
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv("MOVE_DELAY_MS", v))?,
                Err(_) => default_move_delay_ms(),
            },
        };

        Ok(cfg)
    }

    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.http_addr, "0.0.0.0:3001");
        assert_eq!(cfg.move_delay(), Duration::from_millis(500));
    }

    #[test]
    fn t_toml_partial_override() {
        let cfg: Config = toml::from_str("move_delay_ms = 0").unwrap();
        assert_eq!(cfg.http_addr, "0.0.0.0:3001");
        assert_eq!(cfg.move_delay_ms, 0);
    }
}
