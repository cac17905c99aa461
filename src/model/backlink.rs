// * Raw inbound-link records as yielded by a BacklinkSource
// * The engine never mutates these, it only derives from them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Link attribute of an inbound link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkAttribute {
    Dofollow,
    Nofollow,
}

impl LinkAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkAttribute::Dofollow => "dofollow",
            LinkAttribute::Nofollow => "nofollow",
        }
    }

    pub fn is_dofollow(&self) -> bool {
        matches!(self, LinkAttribute::Dofollow)
    }
}

/// Why an inactive link disappeared
///
/// `Unknown` is emitted whenever the source collaborator did not report a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    Removed,
    Noindex,
    PageDeleted,
    DomainExpired,
    Unknown,
}

impl LossReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LossReason::Removed => "removed",
            LossReason::Noindex => "noindex",
            LossReason::PageDeleted => "page_deleted",
            LossReason::DomainExpired => "domain_expired",
            LossReason::Unknown => "unknown",
        }
    }
}

/// One discovered inbound link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklinkRecord {
    pub source_url: String,
    pub source_domain: String,
    /// 0-100 estimate supplied by the source
    pub domain_authority: u8,
    pub traffic_estimate: u64,
    pub link_type: LinkAttribute,
    #[serde(default)]
    pub anchor_text: String,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Reported only for inactive links, when the source knows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_reason: Option<LossReason>,
}

fn default_active() -> bool {
    true
}

impl BacklinkRecord {
    /// Starts a builder for an active dofollow link seen on a single day
    pub fn builder(source_url: impl Into<String>, source_domain: impl Into<String>) -> BacklinkRecordBuilder {
        BacklinkRecordBuilder::new(source_url.into(), source_domain.into())
    }
}

/// Builder for `BacklinkRecord`, mostly used by tests and in-memory sources
#[derive(Debug, Clone)]
pub struct BacklinkRecordBuilder {
    record: BacklinkRecord,
}

impl BacklinkRecordBuilder {
    fn new(source_url: String, source_domain: String) -> Self {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        Self {
            record: BacklinkRecord {
                source_url,
                source_domain,
                domain_authority: 50,
                traffic_estimate: 10_000,
                link_type: LinkAttribute::Dofollow,
                anchor_text: String::new(),
                first_seen: day,
                last_seen: day,
                is_active: true,
                loss_reason: None,
            },
        }
    }

    pub fn authority(mut self, domain_authority: u8) -> Self {
        self.record.domain_authority = domain_authority.min(100);
        self
    }

    pub fn traffic(mut self, traffic_estimate: u64) -> Self {
        self.record.traffic_estimate = traffic_estimate;
        self
    }

    pub fn nofollow(mut self) -> Self {
        self.record.link_type = LinkAttribute::Nofollow;
        self
    }

    pub fn anchor(mut self, anchor_text: impl Into<String>) -> Self {
        self.record.anchor_text = anchor_text.into();
        self
    }

    pub fn first_seen(mut self, date: NaiveDate) -> Self {
        self.record.first_seen = date;
        self
    }

    pub fn last_seen(mut self, date: NaiveDate) -> Self {
        self.record.last_seen = date;
        self
    }

    pub fn inactive(mut self, reason: Option<LossReason>) -> Self {
        self.record.is_active = false;
        self.record.loss_reason = reason;
        self
    }

    pub fn build(self) -> BacklinkRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_with_defaults() {
        let json = r#"{
            "sourceUrl": "https://blog.example.org/post",
            "sourceDomain": "blog.example.org",
            "domainAuthority": 42,
            "trafficEstimate": 1200,
            "linkType": "nofollow",
            "firstSeen": "2023-05-01",
            "lastSeen": "2024-02-11"
        }"#;

        let record: BacklinkRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.link_type, LinkAttribute::Nofollow);
        assert!(record.is_active);
        assert!(record.anchor_text.is_empty());
        assert_eq!(record.loss_reason, None);
    }

    #[test]
    fn test_loss_reason_wire_names() {
        let json = serde_json::to_string(&LossReason::DomainExpired).unwrap();
        assert_eq!(json, "\"domain_expired\"");
        assert_eq!(LossReason::PageDeleted.as_str(), "page_deleted");
    }

    #[test]
    fn test_builder_caps_authority() {
        let record = BacklinkRecord::builder("https://a.com/x", "a.com")
            .authority(250)
            .nofollow()
            .inactive(Some(LossReason::Removed))
            .build();

        assert_eq!(record.domain_authority, 100);
        assert!(!record.link_type.is_dofollow());
        assert!(!record.is_active);
    }
}
