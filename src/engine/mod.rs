// * Backlink scoring engine: pure functions over a raw link set

pub mod aggregate;
pub mod anchors;
pub mod classifier;
pub mod disavow;
pub mod lost_links;
pub mod normalization;

// * Re-exports for convenient access
pub use aggregate::{HashedRelevance, LinkCounts, RelevanceEstimator};
pub use anchors::{analyze_anchor_text, classify_anchor};
pub use classifier::{AuthorityTier, ClassifiedLink, LinkClassifier, TldTier, ToxicityBreakdown};
pub use disavow::{generate_disavow_file, generate_disavow_file_at};
pub use lost_links::detect_lost_links;
pub use normalization::normalize_domain;
