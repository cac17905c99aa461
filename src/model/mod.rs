// * Data model for backlink analysis and opportunity discovery

pub mod analysis;
pub mod backlink;
pub mod capability;
pub mod opportunity;

// * Re-exports for convenient access
pub use analysis::{
    AnchorCategory, AnchorEntry, AnchorTextDistribution, AuthorityDistribution,
    BacklinkAnalysisResult, LostLink, OverOptimizationRisk, QualityMetrics, ReferringDomain,
    TldCount, ToxicLink,
};
pub use backlink::{BacklinkRecord, BacklinkRecordBuilder, LinkAttribute, LossReason};
pub use capability::{Capability, CapabilityState, CategoryStatus};
pub use opportunity::{
    BacklinkOpportunitiesResult, BrokenLinkOpportunity, CompetitorGap, DiscoveryStatus,
    MentionHit, MentionType, Opportunity, OpportunityStatus, OpportunityType, UnlinkedMention,
};
