//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `AUTH_TOKENS` — comma-separated `token=user` pairs seeded into the
///   static verifier (default: empty, every request rejected)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub auth_tokens: Vec<(String, String)>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            auth_tokens: std::env::var("AUTH_TOKENS")
                .map(|raw| Self::parse_auth_tokens(&raw))
                .unwrap_or_default(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn parse_auth_tokens(raw: &str) -> Vec<(String, String)> {
        raw.split(',')
            .filter_map(|pair| {
                let (token, user) = pair.split_once('=')?;
                let token = token.trim();
                let user = user.trim();
                if token.is_empty() || user.is_empty() {
                    None
                } else {
                    Some((token.to_string(), user.to_string()))
                }
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            auth_tokens: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.auth_tokens.is_empty());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "debug".to_string(),
            auth_tokens: Vec::new(),
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_auth_tokens() {
        let tokens = Config::parse_auth_tokens("tok-1=alice, tok-2=bob");
        assert_eq!(
            tokens,
            vec![
                ("tok-1".to_string(), "alice".to_string()),
                ("tok-2".to_string(), "bob".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_auth_tokens_skips_malformed_pairs() {
        let tokens = Config::parse_auth_tokens("tok-1=alice,broken,=bob,tok-2=");
        assert_eq!(tokens, vec![("tok-1".to_string(), "alice".to_string())]);
    }
}
