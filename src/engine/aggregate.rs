// * Aggregate Scorer
// * Reduces a classified link set into quality metrics, referring domains and domain-level scores

use std::collections::HashMap;

use xxhash_rust::xxh64::xxh64;

use crate::config::constants::{
    HEALTH_BASE, HEALTH_PENALTY_HIGH_RISK, HEALTH_PENALTY_MEDIUM_RISK, HEALTH_QUALITY_PIVOT,
    HEALTH_QUALITY_WEIGHT, HEALTH_TOXIC_WEIGHT, RELEVANCE_MIN, RELEVANCE_SPAN, TOP_TLDS,
};
use crate::engine::classifier::{AuthorityTier, ClassifiedLink};
use crate::model::{
    AuthorityDistribution, BacklinkRecord, OverOptimizationRisk, QualityMetrics, ReferringDomain,
    TldCount,
};

// * Largest value still inside [RELEVANCE_MIN, RELEVANCE_MIN + RELEVANCE_SPAN)
const RELEVANCE_CEILING: f64 = RELEVANCE_MIN + RELEVANCE_SPAN - 0.01;

/// Supplies the topical relevance estimate reported in quality metrics
///
/// Implementations backed by a content-similarity service can replace the
/// default hash estimate. Output is clamped into [65, 85).
pub trait RelevanceEstimator: Send + Sync {
    fn estimate(&self, domain: &str, records: &[BacklinkRecord]) -> f64;
}

/// Deterministic placeholder: a stable per-domain value in [65, 85)
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedRelevance;

impl RelevanceEstimator for HashedRelevance {
    fn estimate(&self, domain: &str, _records: &[BacklinkRecord]) -> f64 {
        let bucket = xxh64(domain.as_bytes(), 0) % 2000;
        RELEVANCE_MIN + bucket as f64 / 100.0
    }
}

/// Dofollow/nofollow split of a link set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounts {
    pub total: usize,
    pub dofollow: usize,
    pub nofollow: usize,
}

impl LinkCounts {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BacklinkRecord>) -> Self {
        let mut counts = LinkCounts::default();
        for record in records {
            counts.total += 1;
            if record.link_type.is_dofollow() {
                counts.dofollow += 1;
            } else {
                counts.nofollow += 1;
            }
        }
        counts
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Mean authority over all links, 0 for an empty set
pub fn average_domain_authority(records: &[BacklinkRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: u64 = records.iter().map(|r| r.domain_authority as u64).sum();
    sum as f64 / records.len() as f64
}

pub fn authority_distribution(classified: &[ClassifiedLink<'_>]) -> AuthorityDistribution {
    let mut dist = AuthorityDistribution::default();
    for link in classified {
        match link.authority_tier {
            AuthorityTier::High => dist.high += 1,
            AuthorityTier::Medium => dist.medium += 1,
            AuthorityTier::Low => dist.low += 1,
        }
    }
    dist
}

/// Most frequent TLDs, count desc then name asc
pub fn top_tlds(classified: &[ClassifiedLink<'_>], limit: usize) -> Vec<TldCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for link in classified {
        if let Some(tld) = link.tld.as_deref() {
            *counts.entry(tld).or_insert(0) += 1;
        }
    }

    let mut tlds: Vec<TldCount> = counts
        .into_iter()
        .map(|(tld, count)| TldCount { tld: tld.to_string(), count })
        .collect();
    tlds.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tld.cmp(&b.tld)));
    tlds.truncate(limit);
    tlds
}

pub fn quality_metrics(classified: &[ClassifiedLink<'_>], records: &[BacklinkRecord], relevance: f64) -> QualityMetrics {
    let counts = LinkCounts::from_records(records);
    let dofollow_ratio = if counts.total == 0 {
        0.0
    } else {
        round_to(counts.dofollow as f64 / counts.total as f64, 2)
    };

    QualityMetrics {
        average_domain_authority: round_to(average_domain_authority(records), 1),
        dofollow_ratio,
        relevance_score: round_to(relevance.clamp(RELEVANCE_MIN, RELEVANCE_CEILING), 2),
        authority_distribution: authority_distribution(classified),
        top_tlds: top_tlds(classified, TOP_TLDS),
    }
}

/// Percentage of links classified toxic, 0 for an empty set
pub fn toxic_score(toxic_count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(100.0 * toxic_count as f64 / total as f64, 1)
}

/// Health score from toxicity, quality and anchor risk, clamped into [0, 100]
pub fn health_score(toxic_score: f64, quality_score: f64, risk: OverOptimizationRisk) -> f64 {
    let mut score = HEALTH_BASE;
    score -= toxic_score * HEALTH_TOXIC_WEIGHT;
    score += (quality_score - HEALTH_QUALITY_PIVOT) * HEALTH_QUALITY_WEIGHT;
    score -= match risk {
        OverOptimizationRisk::High => HEALTH_PENALTY_HIGH_RISK,
        OverOptimizationRisk::Medium => HEALTH_PENALTY_MEDIUM_RISK,
        OverOptimizationRisk::Low => 0.0,
    };
    round_to(score.clamp(0.0, 100.0), 1)
}

/// One row per unique source domain, strongest first
pub fn referring_domains(classified: &[ClassifiedLink<'_>]) -> Vec<ReferringDomain> {
    let mut by_domain: HashMap<&str, ReferringDomain> = HashMap::new();

    for link in classified {
        let record = link.record;
        let row = by_domain
            .entry(link.domain.as_str())
            .or_insert_with(|| ReferringDomain {
                domain: link.domain.clone(),
                domain_authority: record.domain_authority,
                backlinks: 0,
                dofollow_links: 0,
                first_seen: record.first_seen,
                anchor_text: record.anchor_text.clone(),
                traffic_estimate: record.traffic_estimate,
            });

        row.backlinks += 1;
        if record.link_type.is_dofollow() {
            row.dofollow_links += 1;
        }
        row.domain_authority = row.domain_authority.max(record.domain_authority);
        row.traffic_estimate = row.traffic_estimate.max(record.traffic_estimate);
        if record.first_seen < row.first_seen {
            row.first_seen = record.first_seen;
            row.anchor_text = record.anchor_text.clone();
        }
    }

    let mut rows: Vec<ReferringDomain> = by_domain.into_values().collect();
    rows.sort_by(|a, b| {
        b.domain_authority
            .cmp(&a.domain_authority)
            .then_with(|| b.backlinks.cmp(&a.backlinks))
            .then_with(|| a.domain.cmp(&b.domain))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classifier::LinkClassifier;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample() -> Vec<BacklinkRecord> {
        vec![
            BacklinkRecord::builder("https://news.site.com/a", "news.site.com").authority(75).first_seen(day(5)).anchor("acme").build(),
            BacklinkRecord::builder("https://news.site.com/b", "news.site.com").authority(70).nofollow().first_seen(day(2)).anchor("acme tools").build(),
            BacklinkRecord::builder("https://blog.org/post", "blog.org").authority(40).build(),
            BacklinkRecord::builder("https://spam.xyz/", "spam.xyz").authority(5).nofollow().build(),
        ]
    }

    #[test]
    fn test_quality_metrics() {
        let records = sample();
        let classifier = LinkClassifier::new();
        let classified = classifier.classify_batch(&records);
        let metrics = quality_metrics(&classified, &records, 70.0);

        assert_eq!(metrics.average_domain_authority, 47.5);
        assert_eq!(metrics.dofollow_ratio, 0.5);
        assert_eq!(metrics.authority_distribution.high, 2);
        assert_eq!(metrics.authority_distribution.medium, 1);
        assert_eq!(metrics.authority_distribution.low, 1);
        assert_eq!(metrics.authority_distribution.total(), records.len());
        assert_eq!(metrics.top_tlds[0], TldCount { tld: ".com".to_string(), count: 2 });
        assert_eq!(metrics.relevance_score, 70.0);
    }

    #[test]
    fn test_relevance_clamped_and_stable() {
        let estimate = HashedRelevance.estimate("example.com", &[]);
        assert!((65.0..85.0).contains(&estimate));
        assert_eq!(estimate, HashedRelevance.estimate("example.com", &[]));

        let metrics = quality_metrics(&[], &[], 120.0);
        assert!(metrics.relevance_score < 85.0);
        let metrics = quality_metrics(&[], &[], 10.0);
        assert_eq!(metrics.relevance_score, 65.0);
    }

    #[test]
    fn test_health_score() {
        assert_eq!(health_score(0.0, 50.0, OverOptimizationRisk::Low), 100.0);
        assert_eq!(health_score(100.0, 0.0, OverOptimizationRisk::High), 20.0);
        assert_eq!(health_score(20.0, 60.0, OverOptimizationRisk::Medium), 85.0);
        // * Clamped at both ends
        assert_eq!(health_score(0.0, 100.0, OverOptimizationRisk::Low), 100.0);
        assert_eq!(health_score(400.0, 0.0, OverOptimizationRisk::High), 0.0);
    }

    #[test]
    fn test_toxic_score() {
        assert_eq!(toxic_score(0, 0), 0.0);
        assert_eq!(toxic_score(1, 3), 33.3);
        assert_eq!(toxic_score(4, 4), 100.0);
    }

    #[test]
    fn test_referring_domains() {
        let records = sample();
        let classifier = LinkClassifier::new();
        let classified = classifier.classify_batch(&records);
        let rows = referring_domains(&classified);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().map(|r| r.backlinks).sum::<usize>(), records.len());

        let news = &rows[0];
        assert_eq!(news.domain, "news.site.com");
        assert_eq!(news.domain_authority, 75);
        assert_eq!(news.backlinks, 2);
        assert_eq!(news.dofollow_links, 1);
        assert_eq!(news.first_seen, day(2));
        assert_eq!(news.anchor_text, "acme tools");
    }

    #[test]
    fn test_link_counts() {
        let counts = LinkCounts::from_records(&sample());
        assert_eq!(counts.total, 4);
        assert_eq!(counts.dofollow + counts.nofollow, counts.total);
    }
}
