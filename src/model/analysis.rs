// * Derived analysis types assembled into a BacklinkAnalysisResult

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::backlink::{LinkAttribute, LossReason};

/// A link whose toxicity score crossed the classification threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToxicLink {
    pub url: String,
    pub domain: String,
    /// 0-100, additive and capped
    pub toxicity_score: u32,
    pub reasons: Vec<String>,
    pub link_type: LinkAttribute,
    pub anchor_text: String,
    pub first_seen: NaiveDate,
}

/// Three-bucket domain authority distribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AuthorityDistribution {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TldCount {
    pub tld: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub average_domain_authority: f64,
    pub dofollow_ratio: f64,
    /// Estimate in [65, 85), not derived from link data
    pub relevance_score: f64,
    pub authority_distribution: AuthorityDistribution,
    #[serde(rename = "topTLDs")]
    pub top_tlds: Vec<TldCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostLink {
    pub url: String,
    pub domain: String,
    pub domain_authority: u8,
    pub last_seen: NaiveDate,
    pub reason: LossReason,
    pub reclaimable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverOptimizationRisk {
    #[default]
    Low,
    Medium,
    High,
}

impl OverOptimizationRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverOptimizationRisk::Low => "low",
            OverOptimizationRisk::Medium => "medium",
            OverOptimizationRisk::High => "high",
        }
    }
}

/// Anchor text categories by lexical shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorCategory {
    Branded,
    Partial,
    Exact,
    Generic,
    Naked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorEntry {
    pub text: String,
    pub count: usize,
    /// Share of all links, integer percent
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorTextDistribution {
    pub branded: Vec<AnchorEntry>,
    pub partial: Vec<AnchorEntry>,
    pub exact: Vec<AnchorEntry>,
    pub generic: Vec<AnchorEntry>,
    pub naked: Vec<AnchorEntry>,
    pub over_optimization_risk: OverOptimizationRisk,
}

impl AnchorTextDistribution {
    pub fn bucket(&self, category: AnchorCategory) -> &[AnchorEntry] {
        match category {
            AnchorCategory::Branded => &self.branded,
            AnchorCategory::Partial => &self.partial,
            AnchorCategory::Exact => &self.exact,
            AnchorCategory::Generic => &self.generic,
            AnchorCategory::Naked => &self.naked,
        }
    }

    pub(crate) fn bucket_mut(&mut self, category: AnchorCategory) -> &mut Vec<AnchorEntry> {
        match category {
            AnchorCategory::Branded => &mut self.branded,
            AnchorCategory::Partial => &mut self.partial,
            AnchorCategory::Exact => &mut self.exact,
            AnchorCategory::Generic => &mut self.generic,
            AnchorCategory::Naked => &mut self.naked,
        }
    }

    /// Number of unique anchors across all buckets
    pub fn unique_anchor_count(&self) -> usize {
        self.all_entries().count()
    }

    /// Sum of occurrence counts across all buckets
    pub fn total_occurrences(&self) -> usize {
        self.all_entries().map(|e| e.count).sum()
    }

    fn all_entries(&self) -> impl Iterator<Item = &AnchorEntry> {
        self.branded
            .iter()
            .chain(&self.partial)
            .chain(&self.exact)
            .chain(&self.generic)
            .chain(&self.naked)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferringDomain {
    pub domain: String,
    pub domain_authority: u8,
    pub backlinks: usize,
    pub dofollow_links: usize,
    pub first_seen: NaiveDate,
    pub anchor_text: String,
    pub traffic_estimate: u64,
}

/// Top-level output of a backlink analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklinkAnalysisResult {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub health_score: f64,
    pub toxic_score: f64,
    pub quality_score: f64,
    pub total_backlinks: usize,
    pub dofollow_count: usize,
    pub nofollow_count: usize,
    pub toxic_links: Vec<ToxicLink>,
    pub quality_metrics: QualityMetrics,
    pub lost_links: Vec<LostLink>,
    pub anchor_text_distribution: AnchorTextDistribution,
    pub referring_domains: Vec<ReferringDomain>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_metrics_wire_names() {
        let metrics = QualityMetrics {
            top_tlds: vec![TldCount { tld: ".com".to_string(), count: 3 }],
            ..Default::default()
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json.get("topTLDs").is_some());
        assert!(json.get("averageDomainAuthority").is_some());
        assert!(json.get("dofollowRatio").is_some());
    }

    #[test]
    fn test_distribution_counts() {
        let mut dist = AnchorTextDistribution::default();
        dist.bucket_mut(AnchorCategory::Branded).push(AnchorEntry {
            text: "acme".to_string(),
            count: 4,
            percentage: 40,
        });
        dist.bucket_mut(AnchorCategory::Generic).push(AnchorEntry {
            text: "click here".to_string(),
            count: 2,
            percentage: 20,
        });

        assert_eq!(dist.unique_anchor_count(), 2);
        assert_eq!(dist.total_occurrences(), 6);
        assert_eq!(dist.bucket(AnchorCategory::Generic).len(), 1);
    }

    #[test]
    fn test_risk_ordering() {
        assert!(OverOptimizationRisk::High > OverOptimizationRisk::Medium);
        assert_eq!(OverOptimizationRisk::default(), OverOptimizationRisk::Low);
    }
}
