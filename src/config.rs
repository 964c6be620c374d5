use linkchain::chain::{DEFAULT_DIFFICULTY, DIFF_MAX, DIFF_MIN};
use std::env;

/// Host settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub host: String,
    pub port: u16,
    /// Difficulty for links mined without an explicit one.
    pub difficulty: u32,
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Missing or unparsable values fall back to defaults; difficulty is
    /// clamped into the range the mining endpoint accepts.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(8080),
            difficulty: get("DIFFICULTY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DIFFICULTY)
                .clamp(DIFF_MIN, DIFF_MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> HostConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HostConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(
            config(&[]),
            HostConfig {
                host: "127.0.0.1".into(),
                port: 8080,
                difficulty: DEFAULT_DIFFICULTY,
            }
        );
    }

    #[test]
    fn reads_and_clamps() {
        let cfg = config(&[("HOST", "0.0.0.0"), ("PORT", "9000"), ("DIFFICULTY", "40")]);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.difficulty, DIFF_MAX);

        assert_eq!(config(&[("DIFFICULTY", "0")]).difficulty, DIFF_MIN);
        assert_eq!(config(&[("PORT", "not-a-port")]).port, 8080);
    }
}
