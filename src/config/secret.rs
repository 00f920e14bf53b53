//! Access token handling using the secrecy crate
//!
//! The Shopify access token lives in a `Secret` so that it is zeroed on drop
//! and never shows up in `Debug` output or logs. Reading it requires an
//! explicit `expose_secret()` at the single place a request header is built.
//!
//! # Example
//!
//! ```rust
//! use orderflow::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("shpat_0123".to_string());
//! assert_eq!(token.expose_secret().as_ref(), "shpat_0123");
//! assert!(!format!("{token:?}").contains("shpat_0123"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String payload of a secret, zeroized on drop
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A secret string: zeroized on drop, redacted in Debug
pub type SecretString = Secret<SecretValue>;

/// Wrap a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("shpat_abc".to_string());
        assert_eq!(secret.expose_secret(), "shpat_abc");
        assert!(!secret.expose_secret().is_empty());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("shpat_sensitive".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("shpat_sensitive"));
    }

    #[test]
    fn test_secret_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Section {
            api_key: SecretString,
        }

        let section: Section = toml::from_str(r#"api_key = "shpat_toml""#).unwrap();
        assert_eq!(section.api_key.expose_secret(), "shpat_toml");
    }
}
