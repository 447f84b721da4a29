use std::collections::HashMap;

use crate::config::Config;

pub const SERP_API_KEY: &str = "SERP_API_KEY";
pub const JSEARCH_KEY: &str = "JSEARCH_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";

/// External keys for one request. Caller-supplied values win over the
/// process environment; blank values count as absent.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub serp_api_key: Option<String>,
    pub jsearch_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
}

impl Credentials {
    pub fn resolve(overrides: &HashMap<String, String>, config: &Config) -> Self {
        let pick = |name: &str, fallback: &Option<String>| {
            overrides
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .or_else(|| fallback.clone())
        };

        Self {
            serp_api_key: pick(SERP_API_KEY, &config.serp_api_key),
            jsearch_key: pick(JSEARCH_KEY, &config.jsearch_key),
            openai_api_key: pick(OPENAI_API_KEY, &config.openai_api_key),
            openrouter_api_key: pick(OPENROUTER_API_KEY, &config.openrouter_api_key),
        }
    }
}
