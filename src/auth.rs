use std::fmt;

/// Harness API key, sent in the `x-api-key` header.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Keep keys out of debug logs.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Username and password pair for endpoints that take basic auth.
///
/// Only the transport's basic auth path uses it; Harness API calls are keyed.
#[allow(dead_code)]
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

#[allow(dead_code)]
impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::from("pat.abc.def");
        assert_eq!(format!("{key:?}"), "ApiKey(****)");
        assert_eq!(key.as_str(), "pat.abc.def");
    }

    #[test]
    fn test_basic_credentials_debug_hides_password() {
        let creds = BasicCredentials::new("admin", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
