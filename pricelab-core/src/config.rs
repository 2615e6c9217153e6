//! Source configuration.
//!
//! Credentials are handed in explicitly rather than read from the process
//! environment at call time; a missing key surfaces when the adapter is
//! constructed, not in the middle of a fetch.

use std::fmt;

use secrecy::SecretString;

/// Which live vendor an adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    AlphaVantage,
    Finnhub,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::AlphaVantage => "alpha_vantage",
            ProviderKind::Finnhub => "finnhub",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit configuration for the live data sources.
///
/// `priority` is the order in which live vendors are attempted; vendors
/// whose key is absent are skipped (and reported as skipped) at acquisition
/// time.
#[derive(Debug)]
pub struct SourceConfig {
    /// Alpha Vantage API key, if provisioned.
    pub alpha_vantage_key: Option<SecretString>,
    /// Finnhub API token, if provisioned.
    pub finnhub_key: Option<SecretString>,
    /// Order in which live vendors are attempted.
    pub priority: Vec<ProviderKind>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_key: None,
            finnhub_key: None,
            priority: vec![ProviderKind::AlphaVantage, ProviderKind::Finnhub],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priority_tries_alpha_vantage_first() {
        let config = SourceConfig::default();
        assert_eq!(
            config.priority,
            vec![ProviderKind::AlphaVantage, ProviderKind::Finnhub]
        );
        assert!(config.alpha_vantage_key.is_none());
        assert!(config.finnhub_key.is_none());
    }

    #[test]
    fn keys_are_redacted_in_debug_output() {
        let config = SourceConfig {
            alpha_vantage_key: Some(SecretString::new("top-secret".into())),
            ..SourceConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("top-secret"));
    }
}
