// * Disavow Emitter
// * Renders toxic-link findings into the search-engine disavow file format
// *
// * Tiers:
// * - max score per domain >= 70  -> `domain:<domain>`
// * - individual link in [50, 70) -> raw URL line
// * - below 50                    -> reported as toxic, never disavowed

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::constants::{DISAVOW_DOMAIN_THRESHOLD, DISAVOW_URL_THRESHOLD};
use crate::engine::normalization::normalize_domain;
use crate::model::ToxicLink;

pub const DISAVOW_HEADER_TITLE: &str = "# Disavow file generated by backlink-intel";

/// Renders the disavow file stamped with the current time
pub fn generate_disavow_file(toxic_links: &[ToxicLink]) -> String {
    generate_disavow_file_at(toxic_links, Utc::now())
}

/// Renders the disavow file with an explicit generation timestamp
pub fn generate_disavow_file_at(toxic_links: &[ToxicLink], generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        DISAVOW_HEADER_TITLE.to_string(),
        format!("# Generated: {}", generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        format!("# Total toxic links: {}", toxic_links.len()),
    ];

    // * Highest score seen per domain, sorted for stable output
    let mut max_by_domain: BTreeMap<String, u32> = BTreeMap::new();
    for link in toxic_links {
        let domain = normalize_domain(&link.domain);
        if domain.is_empty() {
            continue;
        }
        let entry = max_by_domain.entry(domain).or_insert(0);
        *entry = (*entry).max(link.toxicity_score);
    }

    let disavowed_domains: HashSet<&str> = max_by_domain
        .iter()
        .filter(|(_, score)| **score >= DISAVOW_DOMAIN_THRESHOLD)
        .map(|(domain, _)| domain.as_str())
        .collect();

    let mut domain_lines: Vec<&str> = disavowed_domains.iter().copied().collect();
    domain_lines.sort_unstable();

    let mut seen_urls = HashSet::new();
    let url_lines: Vec<&str> = toxic_links
        .iter()
        .filter(|link| {
            (DISAVOW_URL_THRESHOLD..DISAVOW_DOMAIN_THRESHOLD).contains(&link.toxicity_score)
        })
        // ! Skip URLs already covered by a domain: line
        .filter(|link| !disavowed_domains.contains(normalize_domain(&link.domain).as_str()))
        .map(|link| link.url.trim())
        .filter(|url| !url.is_empty() && seen_urls.insert(*url))
        .collect();

    if !domain_lines.is_empty() {
        lines.push(String::new());
        lines.push("# Domains with severe toxicity".to_string());
        lines.extend(domain_lines.into_iter().map(|d| format!("domain:{}", d)));
    }

    if !url_lines.is_empty() {
        lines.push(String::new());
        lines.push("# Individual toxic URLs".to_string());
        lines.extend(url_lines.into_iter().map(str::to_string));
    }

    let mut file = lines.join("\n");
    file.push('\n');
    file
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkAttribute;
    use chrono::{NaiveDate, TimeZone};

    fn toxic(url: &str, domain: &str, score: u32) -> ToxicLink {
        ToxicLink {
            url: url.to_string(),
            domain: domain.to_string(),
            toxicity_score: score,
            reasons: vec![],
            link_type: LinkAttribute::Dofollow,
            anchor_text: String::new(),
            first_seen: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input_is_header_only() {
        let file = generate_disavow_file_at(&[], fixed_time());
        assert!(!file.is_empty());
        assert!(file.lines().all(|l| l.starts_with('#')));
        assert!(file.contains("# Generated: 2024-06-01T12:00:00Z"));
        assert!(file.contains("# Total toxic links: 0"));
    }

    #[test]
    fn test_domain_and_url_tiers() {
        let links = vec![
            toxic("https://a-spam.com/page", "a-spam.com", 75),
            toxic("https://b-site.net/post", "b-site.net", 55),
            toxic("https://c-meh.org/x", "c-meh.org", 40),
        ];
        let file = generate_disavow_file_at(&links, fixed_time());

        assert!(file.lines().any(|l| l == "domain:a-spam.com"));
        assert!(file.lines().any(|l| l == "https://b-site.net/post"));
        assert!(!file.contains("domain:b-site.net"));
        // * Listed as toxic but intentionally not disavowed
        assert!(!file.contains("c-meh.org"));
    }

    #[test]
    fn test_domain_uses_max_score() {
        let links = vec![
            toxic("https://mixed.com/1", "mixed.com", 35),
            toxic("https://mixed.com/2", "mixed.com", 72),
            toxic("https://mixed.com/3", "mixed.com", 60),
        ];
        let file = generate_disavow_file_at(&links, fixed_time());

        assert!(file.lines().any(|l| l == "domain:mixed.com"));
        // * Covered by the domain line
        assert!(!file.contains("https://mixed.com/3"));
    }

    #[test]
    fn test_duplicate_urls_emitted_once() {
        let links = vec![
            toxic("https://dup.com/x", "dup.com", 52),
            toxic("https://dup.com/x", "dup.com", 58),
        ];
        let file = generate_disavow_file_at(&links, fixed_time());
        assert_eq!(file.matches("https://dup.com/x").count(), 1);
    }
}
