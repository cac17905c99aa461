// * Heuristic lookup tables
// * Injected at construction so they can change without touching scoring logic

use serde::{Deserialize, Serialize};

use super::constants::{UNKNOWN_DOMAIN_AUTHORITY, UNKNOWN_DOMAIN_TRAFFIC};

/// Authority/traffic estimate for a well-known domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownDomain {
    pub domain: String,
    pub authority: u8,
    pub traffic: u64,
}

impl KnownDomain {
    fn new(domain: &str, authority: u8, traffic: u64) -> Self {
        Self {
            domain: domain.to_string(),
            authority,
            traffic,
        }
    }
}

/// Immutable heuristic tables consumed by the classifier, anchor bucketing and discovery
///
/// List order matters for the spam-term and TLD tables: only the first match is reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicTables {
    pub spam_terms: Vec<String>,
    /// Suffixes including the leading dot, e.g. `.xyz`
    pub low_quality_tlds: Vec<String>,
    pub generic_anchors: Vec<String>,
    pub known_domains: Vec<KnownDomain>,
    pub unknown_authority: u8,
    pub unknown_traffic: u64,
    /// Substrings marking a forum/community host
    pub forum_markers: Vec<String>,
    /// Substrings marking a blog platform host
    pub blog_markers: Vec<String>,
    /// Substrings marking a review site host
    pub review_markers: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for HeuristicTables {
    fn default() -> Self {
        Self {
            spam_terms: strings(&[
                "casino", "poker", "gambling", "betting", "slots", "viagra", "cialis", "pharmacy",
                "pills", "porn", "xxx", "adult", "escort", "replica", "cheap", "discount",
                "payday",
            ]),
            low_quality_tlds: strings(&[
                ".xyz", ".tk", ".top", ".ml", ".ga", ".cf", ".gq", ".click", ".loan", ".win",
                ".bid", ".work", ".download", ".racing",
            ]),
            generic_anchors: strings(&[
                "click here", "here", "read more", "learn more", "more", "this", "this site",
                "this website", "website", "link", "visit", "visit site", "go", "source",
                "check it out", "more info", "see more", "homepage",
            ]),
            known_domains: vec![
                KnownDomain::new("reddit.com", 91, 1_700_000_000),
                KnownDomain::new("quora.com", 93, 600_000_000),
                KnownDomain::new("medium.com", 95, 150_000_000),
                KnownDomain::new("dev.to", 85, 25_000_000),
                KnownDomain::new("stackoverflow.com", 93, 300_000_000),
                KnownDomain::new("news.ycombinator.com", 90, 10_000_000),
                KnownDomain::new("producthunt.com", 90, 6_000_000),
                KnownDomain::new("hashnode.com", 82, 8_000_000),
                KnownDomain::new("github.com", 96, 500_000_000),
                KnownDomain::new("linkedin.com", 98, 1_000_000_000),
                KnownDomain::new("twitter.com", 94, 4_000_000_000),
                KnownDomain::new("x.com", 94, 4_000_000_000),
                KnownDomain::new("youtube.com", 100, 30_000_000_000),
                KnownDomain::new("trustpilot.com", 93, 50_000_000),
                KnownDomain::new("g2.com", 91, 8_000_000),
                KnownDomain::new("capterra.com", 92, 10_000_000),
            ],
            unknown_authority: UNKNOWN_DOMAIN_AUTHORITY,
            unknown_traffic: UNKNOWN_DOMAIN_TRAFFIC,
            forum_markers: strings(&[
                "reddit.com", "quora.com", "stackoverflow.com", "stackexchange.com",
                "news.ycombinator.com", "forum", "community", "discourse", "boards.",
            ]),
            blog_markers: strings(&[
                "medium.com", "dev.to", "hashnode", "substack.com", "wordpress.com",
                "blogspot.com", "ghost.io", "blog",
            ]),
            review_markers: strings(&[
                "trustpilot.com", "g2.com", "capterra.com", "yelp.com", "producthunt.com",
                "review",
            ]),
        }
    }
}

impl HeuristicTables {
    /// Lowercases and trims every table entry, dropping blanks
    pub fn normalized(mut self) -> Self {
        for list in [
            &mut self.spam_terms,
            &mut self.low_quality_tlds,
            &mut self.generic_anchors,
            &mut self.forum_markers,
            &mut self.blog_markers,
            &mut self.review_markers,
        ] {
            *list = list
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        for tld in &mut self.low_quality_tlds {
            if !tld.starts_with('.') {
                tld.insert(0, '.');
            }
        }
        for known in &mut self.known_domains {
            known.domain = known.domain.trim().to_lowercase();
            known.authority = known.authority.min(100);
        }
        self
    }

    /// Looks up a host or any of its parent domains in the known-domain table
    pub fn lookup_domain(&self, host: &str) -> Option<&KnownDomain> {
        let mut candidate = host;
        loop {
            if let Some(known) = self.known_domains.iter().find(|k| k.domain == candidate) {
                return Some(known);
            }
            match candidate.split_once('.') {
                Some((_, parent)) if parent.contains('.') => candidate = parent,
                _ => return None,
            }
        }
    }

    pub fn is_generic_anchor(&self, anchor_lower: &str) -> bool {
        self.generic_anchors.iter().any(|g| g == anchor_lower)
    }
}
