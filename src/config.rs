//! Analysis settings, built from the command line.

use crate::Result;
use crate::trace::MainThreadPolicy;
use anyhow::Context;
use regex::Regex;

/// Selects calls named exactly "render".
pub const DEFAULT_METHOD_NAME_REGEX: &str = "^render$";

/// Zones whose name lacks this substring are not user code and are skipped.
pub const DEFAULT_ZONE_FILTER: &str = "http";

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Tested (unanchored) against `MethodCall::name`.
    pub method_name_filter: Regex,
    pub zone_filter: String,
    pub main_thread_policy: MainThreadPolicy,
}

impl AnalysisConfig {
    pub fn new(method_name_regex: &str) -> Result<Self> {
        let method_name_filter = Regex::new(method_name_regex)
            .with_context(|| format!("invalid method name regex {:?}", method_name_regex))?;
        Ok(Self {
            method_name_filter,
            zone_filter: DEFAULT_ZONE_FILTER.to_string(),
            main_thread_policy: MainThreadPolicy::default(),
        })
    }

    pub fn with_zone_filter(mut self, zone_filter: impl Into<String>) -> Self {
        self.zone_filter = zone_filter.into();
        self
    }

    pub fn with_main_thread_policy(mut self, policy: MainThreadPolicy) -> Self {
        self.main_thread_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_regex_is_exact_render() {
        let config = AnalysisConfig::new(DEFAULT_METHOD_NAME_REGEX).unwrap();
        assert!(config.method_name_filter.is_match("render"));
        assert!(!config.method_name_filter.is_match("renderFrame"));
        assert!(!config.method_name_filter.is_match("preRender"));
    }

    #[test]
    fn regex_is_unanchored_by_default() {
        let config = AnalysisConfig::new("render").unwrap();
        assert!(config.method_name_filter.is_match("renderFrame"));
        assert!(config.method_name_filter.is_match("forceRerender"));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = AnalysisConfig::new("(unclosed").unwrap_err();
        assert!(format!("{:#}", err).contains("invalid method name regex"));
    }
}
