//! Web search tool backed by DuckDuckGo's HTML endpoint.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use super::Tool;

pub const NO_RESULTS: &str = "No results found.";

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    pub body: String,
}

/// Something that can answer a text query.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn text(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// Render hits as numbered blocks, or [`NO_RESULTS`] when there are none.
pub fn format_results(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. **{}**\n   URL: {}\n   {}\n",
                i + 1,
                hit.title,
                hit.href,
                hit.body
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run a search and format it. Backend failures become a `Search error:` string.
pub async fn web_search(backend: &dyn SearchBackend, query: &str, max_results: usize) -> String {
    match backend.text(query, max_results).await {
        Ok(hits) => format_results(&hits),
        Err(e) => {
            tracing::warn!(error = %e, "Web search failed");
            format!("Search error: {}", e)
        }
    }
}

/// Search the web.
pub struct WebSearch {
    backend: Arc<dyn SearchBackend>,
    default_max_results: usize,
}

impl WebSearch {
    pub fn new(backend: Arc<dyn SearchBackend>, default_max_results: usize) -> Self {
        Self {
            backend,
            default_max_results,
        }
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web using DuckDuckGo. Returns formatted search results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query string"
                },
                "max_results": {
                    "type": "integer",
                    "description": format!("Number of results (default: {})", self.default_max_results)
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let max_results = args["max_results"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(self.default_max_results);

        Ok(web_search(self.backend.as_ref(), query, max_results).await)
    }
}

/// DuckDuckGo HTML search (no API key needed).
pub struct DuckDuckGo {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGo {
    pub fn new() -> Self {
        Self::with_endpoint("https://html.duckduckgo.com/html/")
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; AgentCoreAgent/0.1)")
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGo {
    async fn text(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<SearchHit>> {
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", status));
        }

        let html = response.text().await?;
        let mut hits = extract_ddg_results(&html);
        hits.truncate(max_results);
        Ok(hits)
    }
}

fn result_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#)
            .expect("valid result link regex")
    })
}

fn result_snippet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#)
            .expect("valid result snippet regex")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag regex"))
}

/// Extract search results from DuckDuckGo HTML.
fn extract_ddg_results(html: &str) -> Vec<SearchHit> {
    html.split("result__body\"")
        .skip(1)
        .filter_map(|chunk| {
            let link = result_link_re().captures(chunk)?;
            let title = clean_text(&link[2]);
            if title.is_empty() {
                return None;
            }
            let href = resolve_href(&html_decode(&link[1]));
            let body = result_snippet_re()
                .captures(chunk)
                .map(|c| clean_text(&c[1]))
                .unwrap_or_default();

            Some(SearchHit { title, href, body })
        })
        .collect()
}

/// Result links go through a redirect that carries the target in `uddg`.
fn resolve_href(raw: &str) -> String {
    if let Some(idx) = raw.find("uddg=") {
        let encoded = raw[idx + 5..].split('&').next().unwrap_or("");
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    raw.to_string()
}

fn clean_text(fragment: &str) -> String {
    let stripped = tag_re().replace_all(fragment, "");
    html_decode(stripped.split_whitespace().collect::<Vec<_>>().join(" ").as_str())
}

/// Basic HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
}
