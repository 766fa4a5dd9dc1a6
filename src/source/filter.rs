//! URL building
//!
//! Appends the filter-parameter map to the base URL using one of the two
//! encoding strategies. Pure string work, no side effects; output is
//! deterministic because the filter map is insertion-ordered.

use crate::config::PipelineConfig;
use crate::types::{FilterMap, UrlStyle};

/// Fixed query key the API key is injected under
pub const API_KEY_PARAM: &str = "k";

/// Build the final request URL for the configured strategy.
pub fn apply_filters(config: &PipelineConfig) -> String {
    match config.url_style {
        UrlStyle::DictBased => dict_based(&config.url, &config.filter_params),
        UrlStyle::EqualBased => {
            let api_key = config
                .topic
                .requires_api_key()
                .then(|| config.auth.api_key());
            equal_based(&config.url, &config.filter_params, api_key)
        }
    }
}

/// Compact `key=value` pairs joined by `&`; the URL is returned unchanged
/// when the map is empty (no `?` appended).
pub fn dict_based(url: &str, params: &FilterMap) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={}", render_value(value)))
        .collect();
    format!("{url}?{}", pairs.join("&"))
}

/// Plain `?k1=v1&k2=v2` query string, always appended. `api_key` of
/// `Some` injects the key under [`API_KEY_PARAM`], replacing any
/// caller-supplied entry so the key appears exactly once.
pub fn equal_based(url: &str, params: &FilterMap, api_key: Option<&str>) -> String {
    let mut params = params.clone();
    if let Some(key) = api_key {
        params.insert(API_KEY_PARAM.to_string(), key.to_string());
    }
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    format!("{url}?{}", query.join("&"))
}

/// Values made only of URL-safe characters are emitted bare; anything else
/// is wrapped in escaped double quotes with spaces stripped (compact form)
/// and embedded quotes escaped.
fn render_value(value: &str) -> String {
    if value.chars().all(is_url_safe) {
        value.to_string()
    } else {
        let compact = value.replace(' ', "").replace('"', "%22");
        format!("%22{compact}%22")
    }
}

fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~')
}
