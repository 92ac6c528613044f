//! Authorization header selection.
//!
//! An access token always wins over basic-auth credentials. With neither,
//! requests go out unauthenticated and the service answers with its own
//! auth failure.

use crate::config::ServerConfig;
use data_encoding::BASE64;

/// Which kind of credentials a [`ServerConfig`] will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    Basic,
    Anonymous,
}

impl AuthScheme {
    pub fn of(config: &ServerConfig) -> Self {
        if has_value(&config.access_token) {
            AuthScheme::Bearer
        } else if has_value(&config.username) {
            AuthScheme::Basic
        } else {
            AuthScheme::Anonymous
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "bearer",
            AuthScheme::Basic => "basic",
            AuthScheme::Anonymous => "anonymous",
        }
    }
}

impl std::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the `Authorization` header value for `config`, if any.
///
/// # Example
///
/// ```
/// use xscan::config::ServerConfig;
/// use xscan::http::authorization_header;
///
/// let config = ServerConfig::new("https://acme.jfrog.io").with_access_token("tok");
/// assert_eq!(authorization_header(&config).as_deref(), Some("Bearer tok"));
/// ```
pub fn authorization_header(config: &ServerConfig) -> Option<String> {
    match AuthScheme::of(config) {
        AuthScheme::Bearer => config
            .access_token
            .as_ref()
            .map(|token| format!("Bearer {}", token)),
        AuthScheme::Basic => {
            let credentials = format!(
                "{}:{}",
                config.username.as_deref().unwrap_or_default(),
                config.password.as_deref().unwrap_or_default()
            );
            Some(format!("Basic {}", BASE64.encode(credentials.as_bytes())))
        }
        AuthScheme::Anonymous => None,
    }
}

fn has_value(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_basic(header: &str) -> String {
        let encoded = header.strip_prefix("Basic ").unwrap();
        String::from_utf8(BASE64.decode(encoded.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_token_only() {
        let config = ServerConfig::new("https://acme.io").with_access_token("tok");
        assert_eq!(authorization_header(&config), Some("Bearer tok".to_string()));
        assert_eq!(AuthScheme::of(&config), AuthScheme::Bearer);
    }

    #[test]
    fn test_basic_only() {
        let config = ServerConfig::new("https://acme.io").with_basic_auth("user", "pass");
        let header = authorization_header(&config).unwrap();
        assert!(header.starts_with("Basic "));
        assert_eq!(decode_basic(&header), "user:pass");
    }

    #[test]
    fn test_token_takes_precedence() {
        let config = ServerConfig::new("https://acme.io")
            .with_basic_auth("user", "pass")
            .with_access_token("tok");
        assert_eq!(authorization_header(&config), Some("Bearer tok".to_string()));
    }

    #[test]
    fn test_empty_token_falls_back_to_basic() {
        let config = ServerConfig::new("https://acme.io")
            .with_basic_auth("user", "pass")
            .with_access_token("");
        let header = authorization_header(&config).unwrap();
        assert_eq!(decode_basic(&header), "user:pass");
    }

    #[test]
    fn test_username_without_password() {
        let mut config = ServerConfig::new("https://acme.io");
        config.username = Some("user".to_string());
        let header = authorization_header(&config).unwrap();
        assert_eq!(decode_basic(&header), "user:");
    }

    #[test]
    fn test_no_credentials() {
        let config = ServerConfig::new("https://acme.io");
        assert_eq!(authorization_header(&config), None);
        assert_eq!(AuthScheme::of(&config), AuthScheme::Anonymous);
    }
}
