// * Configuration Constants
// * Central location for scoring weights, thresholds, limits and timeouts

// * Toxicity penalties (additive, capped at TOXICITY_MAX)
pub const PENALTY_LOW_AUTHORITY: u32 = 30;
pub const PENALTY_SPAM_TERM: u32 = 40;
pub const PENALTY_LOW_QUALITY_TLD: u32 = 25;
pub const PENALTY_LOW_TRAFFIC: u32 = 15;
pub const PENALTY_DIGIT_RUN: u32 = 20;
pub const TOXICITY_MAX: u32 = 100;

// * Penalty gates
pub const LOW_AUTHORITY_BELOW: u8 = 10;
pub const LOW_TRAFFIC_BELOW: u64 = 100;
pub const DIGIT_RUN_MIN_LEN: usize = 4;

// * A link is toxic iff its score is strictly above this
pub const TOXIC_THRESHOLD: u32 = 30;

// * Disavow tiers: domain-level at or above, URL-level in [URL, DOMAIN)
pub const DISAVOW_DOMAIN_THRESHOLD: u32 = 70;
pub const DISAVOW_URL_THRESHOLD: u32 = 50;

// * Authority distribution buckets
pub const AUTHORITY_HIGH_MIN: u8 = 60;
pub const AUTHORITY_MEDIUM_MIN: u8 = 30;

// * Health score weights
pub const HEALTH_BASE: f64 = 100.0;
pub const HEALTH_TOXIC_WEIGHT: f64 = 0.5;
pub const HEALTH_QUALITY_PIVOT: f64 = 50.0;
pub const HEALTH_QUALITY_WEIGHT: f64 = 0.3;
pub const HEALTH_PENALTY_HIGH_RISK: f64 = 15.0;
pub const HEALTH_PENALTY_MEDIUM_RISK: f64 = 8.0;

// * Over-optimization thresholds on unique exact-match ratio
pub const OVER_OPTIMIZATION_HIGH: f64 = 0.5;
pub const OVER_OPTIMIZATION_MEDIUM: f64 = 0.3;

// * Relevance estimate range [MIN, MIN + SPAN)
pub const RELEVANCE_MIN: f64 = 65.0;
pub const RELEVANCE_SPAN: f64 = 20.0;

// * Lost links with authority above this are worth reclaiming
pub const RECLAIMABLE_AUTHORITY_ABOVE: u8 = 20;

// * Result list caps
pub const TOP_TOXIC_LINKS: usize = 20;
pub const TOP_LOST_LINKS: usize = 10;
pub const TOP_REFERRING_DOMAINS: usize = 15;
pub const TOP_TLDS: usize = 5;

// * Opportunity discovery
pub const SOURCE_TIMEOUT_MS: u64 = 10_000;
pub const WEB_MENTION_LIMIT: usize = 5;
pub const FORUM_MENTION_LIMIT: usize = 10;
pub const COMMUNITY_MENTION_LIMIT: usize = 2;
pub const UNKNOWN_DOMAIN_AUTHORITY: u8 = 30;
pub const UNKNOWN_DOMAIN_TRAFFIC: u64 = 1_000;
