//! DuckDuckGo web search tool.
//!
//! Queries the JavaScript-free HTML endpoint and returns the text of the top
//! result snippets, joined into one string the model can read.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::error::AskwebError;
use crate::provider::http::shared_client;

pub const TOOL_NAME: &str = "duckduckgo_search";
pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com";
pub const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

const DESCRIPTION: &str = "A wrapper around DuckDuckGo Search. Useful for when you need to answer \
questions about current events. Input should be a search query.";

/// Endpoint and result shaping for [`DuckDuckGoSearch`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub base_url: String,
    /// DuckDuckGo region code (`kl`), e.g. `us-en`, `es-es`; `wt-wt` means no region.
    pub region: String,
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_URL.to_string(),
            region: "wt-wt".to_string(),
            max_results: 5,
        }
    }
}

pub struct DuckDuckGoSearch {
    settings: SearchSettings,
    parameters: AgentToolParameters,
}

impl DuckDuckGoSearch {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            settings,
            parameters: AgentToolParameters::object()
                .string("query", "The search query", true)
                .build(),
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    async fn fetch(&self, query: &str) -> Result<String, AskwebError> {
        let url = format!("{}/html/", self.settings.base_url.trim_end_matches('/'));
        let resp = shared_client()
            .get(&url)
            .query(&[("q", query), ("kl", self.settings.region.as_str())])
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(AskwebError::ToolExecution {
                tool_name: TOOL_NAME.to_string(),
                message: format!("DuckDuckGo returned status {status}"),
            });
        }
        Ok(resp.text().await?)
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(SearchSettings::default())
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearch {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, AskwebError> {
        let query = args.get_str("query")?.trim();
        if query.is_empty() {
            return Err(AskwebError::InvalidArgument("query must not be empty".into()));
        }

        let html = self.fetch(query).await?;
        let snippets = extract_snippets(&html, self.settings.max_results);
        debug!(query, results = snippets.len(), "DuckDuckGo search");

        if snippets.is_empty() {
            return Ok(serde_json::Value::String(NO_RESULTS.to_string()));
        }
        Ok(serde_json::Value::String(snippets.join(" ")))
    }
}

fn snippet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*class="[^"]*result__snippet[^"]*"[^>]*>(.*?)</a>"#)
            .expect("snippet pattern is valid")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

/// Pull plain-text result snippets out of a DuckDuckGo HTML results page.
pub fn extract_snippets(html: &str, limit: usize) -> Vec<String> {
    snippet_pattern()
        .captures_iter(html)
        .map(|caps| clean_fragment(&caps[1]))
        .filter(|s| !s.is_empty())
        .take(limit)
        .collect()
}

fn clean_fragment(fragment: &str) -> String {
    let text = tag_pattern().replace_all(fragment, "");
    let decoded = decode_entities(&text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9A-Fa-f]{1,6}|#[0-9]{1,7}|[A-Za-z]+);").expect("entity pattern is valid")
    })
}

// Single pass, so "&amp;lt;" decodes to "&lt;" and not "<".
fn decode_entities(text: &str) -> String {
    entity_pattern()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            decode_entity(entity).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32).map(String::from);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec.parse().ok().and_then(char::from_u32).map(String::from);
    }
    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "middot" => "\u{00B7}",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        _ => return None,
    };
    Some(decoded.to_string())
}
