// * Unlinked-mention enrichment
// * Turns raw search hits into annotated opportunities

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::HeuristicTables;
use crate::discovery::outreach::{mention_template, OutreachContext};
use crate::engine::normalization::{domain_from_url, is_same_site};
use crate::model::{MentionHit, MentionType, OpportunityStatus, UnlinkedMention};

/// Authority and traffic estimate for a host from the static lookup table
pub fn estimate_domain(host: &str, tables: &HeuristicTables) -> (u8, u64) {
    match tables.lookup_domain(host) {
        Some(known) => (known.authority, known.traffic),
        None => (tables.unknown_authority, tables.unknown_traffic),
    }
}

/// Classifies where a mention lives from its host alone
pub fn classify_mention_type(host: &str, tables: &HeuristicTables) -> MentionType {
    let matches = |markers: &[String]| markers.iter().any(|m| host.contains(m.as_str()));

    if matches(&tables.forum_markers) {
        MentionType::Forum
    } else if matches(&tables.blog_markers) {
        MentionType::Blog
    } else if matches(&tables.review_markers) {
        MentionType::Review
    } else {
        MentionType::News
    }
}

/// Builds unlinked mentions from tagged hits
///
/// Drops unparseable URLs, self-mentions on the target domain, and repeated URLs.
pub fn build_mentions(
    hits: Vec<(String, MentionHit)>,
    target_domain: &str,
    brand: &str,
    tables: &HeuristicTables,
    discovered_at: DateTime<Utc>,
) -> Vec<UnlinkedMention> {
    let mut seen_urls = HashSet::new();
    let mut mentions = Vec::new();

    for (found_via, hit) in hits {
        let url = hit.url.trim().to_string();
        let Some(host) = domain_from_url(&url) else {
            tracing::debug!(url = %url, source = %found_via, "Skipping unparseable mention URL");
            continue;
        };
        if is_same_site(&host, target_domain) {
            continue;
        }
        if !seen_urls.insert(url.clone()) {
            continue;
        }

        let (domain_authority, traffic_estimate) = estimate_domain(&host, tables);
        let mention_type = classify_mention_type(&host, tables);
        let outreach_template = mention_template(
            mention_type,
            &OutreachContext {
                brand,
                domain: target_domain,
                source_domain: &host,
            },
        );

        mentions.push(UnlinkedMention {
            url,
            domain: host,
            domain_authority,
            traffic_estimate,
            mention_context: hit.snippet.split_whitespace().collect::<Vec<_>>().join(" "),
            mention_type,
            found_via,
            discovered_at,
            outreach_template,
            status: OpportunityStatus::New,
        });
    }

    mentions
}
