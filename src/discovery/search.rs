// * HTML search-backed mention source
// * Queries a search results page for brand mentions, optionally scoped to forum/community sites

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::discovery::sources::{MentionSource, SourceFuture};
use crate::errors::SourceError;
use crate::model::MentionHit;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; backlink-intel/0.1; +https://example.invalid/bot)";
const REQUEST_TIMEOUT_SECS: u64 = 8;

// * Upper bound on hits parsed from one page; slots truncate further
const MAX_PARSED_RESULTS: usize = 25;

pub const FORUM_SITES: &[&str] = &["reddit.com", "quora.com", "stackoverflow.com", "news.ycombinator.com"];

static SEL_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.result, div.results_links").unwrap());
static SEL_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.result__a").unwrap());
static SEL_SNIPPET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__snippet, div.result__snippet").unwrap());

/// Which part of the web a query is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    Web,
    Sites(Vec<String>),
}

impl SearchScope {
    fn clause(&self) -> Option<String> {
        match self {
            SearchScope::Web => None,
            SearchScope::Sites(sites) if sites.is_empty() => None,
            SearchScope::Sites(sites) => Some(
                sites
                    .iter()
                    .map(|s| format!("site:{}", s))
                    .collect::<Vec<_>>()
                    .join(" OR "),
            ),
        }
    }
}

/// Mention source backed by an HTML search results page
#[derive(Debug, Clone)]
pub struct SearchMentionSource {
    name: String,
    client: Client,
    endpoint: Url,
    scope: SearchScope,
}

impl SearchMentionSource {
    pub fn new(name: impl Into<String>, client: Client, endpoint: Url, scope: SearchScope) -> Self {
        Self {
            name: name.into(),
            client,
            endpoint,
            scope,
        }
    }

    /// General web search on the default endpoint
    pub fn web(client: Client) -> Result<Self, SourceError> {
        Ok(Self::new("web", client, default_endpoint()?, SearchScope::Web))
    }

    /// Forum/community search across well-known discussion sites
    pub fn forum(client: Client) -> Result<Self, SourceError> {
        let sites = FORUM_SITES.iter().map(|s| s.to_string()).collect();
        Ok(Self::new("forum", client, default_endpoint()?, SearchScope::Sites(sites)))
    }

    /// Search restricted to one named community platform, e.g. `dev.to`
    pub fn community(client: Client, platform: &str) -> Result<Self, SourceError> {
        Ok(Self::new(
            platform,
            client,
            default_endpoint()?,
            SearchScope::Sites(vec![platform.to_string()]),
        ))
    }

    /// Builds the query text: quoted brand, own site excluded, optional site scope
    pub fn build_query(&self, brand: &str, domain: Option<&str>) -> String {
        let mut parts = vec![format!("\"{}\"", brand.trim())];
        if let Some(domain) = domain.filter(|d| !d.is_empty()) {
            parts.push(format!("-site:{}", domain));
        }
        if let Some(clause) = self.scope.clause() {
            parts.push(format!("({})", clause));
        }
        parts.join(" ")
    }

    async fn run_query(&self, query: String) -> Result<Vec<MentionHit>, SourceError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", &query);

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status.as_u16() == 429 || status.as_u16() == 403 {
            return Err(SourceError::RateLimited(status.as_u16()));
        }
        if !status.is_success() {
            return Err(SourceError::Request(format!("HTTP {}", status.as_u16())));
        }

        let body = resp.text().await?;
        Ok(parse_results(&body, MAX_PARSED_RESULTS))
    }
}

impl MentionSource for SearchMentionSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn search_mentions<'a>(&'a self, brand: &'a str, domain: Option<&'a str>) -> SourceFuture<'a, Vec<MentionHit>> {
        let query = self.build_query(brand, domain);
        Box::pin(async move {
            tracing::debug!(source = %self.name, query = %query, "Searching for mentions");
            self.run_query(query).await
        })
    }
}

fn default_endpoint() -> Result<Url, SourceError> {
    Url::parse(DEFAULT_SEARCH_ENDPOINT).map_err(|e| SourceError::Other(e.to_string()))
}

/// HTTP client tuned for search result pages
pub fn default_client() -> Result<Client, SourceError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(SourceError::from)
}

// * Resolves relative and redirect hrefs to the real destination
fn normalize_result_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let candidate = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    // * Redirect links carry the destination in `uddg`
    if let Ok(url) = Url::parse(&candidate) {
        let is_redirect = url.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) && url.path().starts_with("/l/");
        if is_redirect {
            return url
                .query_pairs()
                .find(|(k, v)| k == "uddg" && !v.trim().is_empty())
                .map(|(_, v)| v.into_owned());
        }
    }

    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        Some(candidate)
    } else {
        None
    }
}

/// Extracts up to `max_results` hits from a search results page
pub fn parse_results(html: &str, max_results: usize) -> Vec<MentionHit> {
    let doc = Html::parse_document(html);
    let mut out: Vec<MentionHit> = Vec::new();

    for item in doc.select(&SEL_ITEM) {
        if out.len() >= max_results {
            break;
        }

        let Some(link) = item.select(&SEL_LINK).next() else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(normalize_result_href) else {
            continue;
        };
        // * Nested result containers can repeat the same link
        if out.iter().any(|hit| hit.url == url) {
            continue;
        }

        let snippet = item
            .select(&SEL_SNIPPET)
            .next()
            .map(|n| n.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        let snippet = snippet.split_whitespace().collect::<Vec<_>>().join(" ");

        out.push(MentionHit { url, snippet });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="result results_links">
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.reddit.com%2Fr%2Fsaas%2Fcomments%2Fabc&rut=x">Thread</a>
            <a class="result__snippet">Has anyone   tried <b>Acme</b>?</a>
          </div>
          <div class="result results_links">
            <a class="result__a" href="https://dev.to/someone/acme-review">Review</a>
            <div class="result__snippet">Acme review</div>
          </div>
          <div class="result results_links">
            <a class="result__a" href="javascript:void(0)">Ad</a>
          </div>
          <div class="result results_links">
            <a class="result__a" href="https://news.example.com/acme">News</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results() {
        let hits = parse_results(PAGE, 10);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].url, "https://www.reddit.com/r/saas/comments/abc");
        assert_eq!(hits[0].snippet, "Has anyone tried Acme ?");
        assert_eq!(hits[1].url, "https://dev.to/someone/acme-review");
        assert!(hits[2].snippet.is_empty());
    }

    #[test]
    fn test_parse_respects_limit() {
        assert_eq!(parse_results(PAGE, 1).len(), 1);
        assert!(parse_results("<html></html>", 5).is_empty());
    }

    #[test]
    fn test_build_query() {
        let client = Client::new();
        let web = SearchMentionSource::web(client.clone()).unwrap();
        assert_eq!(web.build_query("Acme", Some("acme.io")), "\"Acme\" -site:acme.io");

        let community = SearchMentionSource::community(client.clone(), "dev.to").unwrap();
        assert_eq!(community.name(), "dev.to");
        assert_eq!(community.build_query("Acme", None), "\"Acme\" (site:dev.to)");

        let forum = SearchMentionSource::forum(client).unwrap();
        assert!(forum.build_query("Acme", None).contains("site:reddit.com OR site:quora.com"));
    }

    #[test]
    fn test_normalize_href() {
        assert_eq!(normalize_result_href("javascript:void(0)"), None);
        assert_eq!(normalize_result_href(""), None);
        assert_eq!(
            normalize_result_href("https://example.com/a").as_deref(),
            Some("https://example.com/a")
        );
    }
}
