// * Link-acquisition opportunity types
// * The engine always produces `OpportunityStatus::New`; transitions are owned by the caller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capability::CategoryStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    #[default]
    New,
    Contacted,
    Acquired,
    Rejected,
}

/// Opportunity category, used as part of the dedup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    UnlinkedMention,
    BrokenLink,
    CompetitorGap,
}

/// Where an unlinked mention was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionType {
    Forum,
    Blog,
    Review,
    News,
}

impl MentionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MentionType::Forum => "forum",
            MentionType::Blog => "blog",
            MentionType::Review => "review",
            MentionType::News => "news",
        }
    }
}

/// A single raw hit from a mention source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionHit {
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

impl MentionHit {
    pub fn new(url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkedMention {
    pub url: String,
    pub domain: String,
    pub domain_authority: u8,
    pub traffic_estimate: u64,
    pub mention_context: String,
    pub mention_type: MentionType,
    /// Name of the source that surfaced the mention
    pub found_via: String,
    pub discovered_at: DateTime<Utc>,
    pub outreach_template: String,
    pub status: OpportunityStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenLinkOpportunity {
    pub source_url: String,
    pub source_domain: String,
    pub domain_authority: u8,
    /// Dead URL the source page links to
    pub broken_url: String,
    #[serde(default)]
    pub anchor_text: String,
    #[serde(default)]
    pub outreach_template: String,
    #[serde(default)]
    pub status: OpportunityStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorGap {
    pub source_domain: String,
    #[serde(default)]
    pub source_url: Option<String>,
    pub domain_authority: u8,
    /// Competitors the source already links to
    pub linked_competitors: Vec<String>,
    #[serde(default)]
    pub outreach_template: String,
    #[serde(default)]
    pub status: OpportunityStatus,
}

/// Common view over the three opportunity kinds
pub trait Opportunity {
    fn source_domain(&self) -> &str;
    fn domain_authority(&self) -> u8;
    fn opportunity_type(&self) -> OpportunityType;
}

impl Opportunity for UnlinkedMention {
    fn source_domain(&self) -> &str {
        &self.domain
    }

    fn domain_authority(&self) -> u8 {
        self.domain_authority
    }

    fn opportunity_type(&self) -> OpportunityType {
        OpportunityType::UnlinkedMention
    }
}

impl Opportunity for BrokenLinkOpportunity {
    fn source_domain(&self) -> &str {
        &self.source_domain
    }

    fn domain_authority(&self) -> u8 {
        self.domain_authority
    }

    fn opportunity_type(&self) -> OpportunityType {
        OpportunityType::BrokenLink
    }
}

impl Opportunity for CompetitorGap {
    fn source_domain(&self) -> &str {
        &self.source_domain
    }

    fn domain_authority(&self) -> u8 {
        self.domain_authority
    }

    fn opportunity_type(&self) -> OpportunityType {
        OpportunityType::CompetitorGap
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryStatus {
    pub unlinked_mentions: CategoryStatus,
    pub broken_link_targets: CategoryStatus,
    pub competitor_gaps: CategoryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklinkOpportunitiesResult {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub total_opportunities: usize,
    pub unlinked_mentions: Vec<UnlinkedMention>,
    pub broken_link_targets: Vec<BrokenLinkOpportunity>,
    pub competitor_gaps: Vec<CompetitorGap>,
    pub category_status: DiscoveryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_link_defaults_to_new() {
        let json = r#"{
            "sourceUrl": "https://resources.example.net/tools",
            "sourceDomain": "resources.example.net",
            "domainAuthority": 48,
            "brokenUrl": "https://gone.example.com/guide"
        }"#;
        let opp: BrokenLinkOpportunity = serde_json::from_str(json).unwrap();
        assert_eq!(opp.status, OpportunityStatus::New);
        assert_eq!(opp.opportunity_type(), OpportunityType::BrokenLink);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&OpportunityStatus::Contacted).unwrap(), "\"contacted\"");
        assert_eq!(serde_json::to_string(&MentionType::Review).unwrap(), "\"review\"");
    }
}
