// * Link Toxicity Classifier
// * Scores inbound links with additive rule-based penalties, capped at 100

use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::constants::{
    AUTHORITY_HIGH_MIN, AUTHORITY_MEDIUM_MIN, DIGIT_RUN_MIN_LEN, LOW_AUTHORITY_BELOW, LOW_TRAFFIC_BELOW,
    PENALTY_DIGIT_RUN, PENALTY_LOW_AUTHORITY, PENALTY_LOW_QUALITY_TLD, PENALTY_LOW_TRAFFIC,
    PENALTY_SPAM_TERM, TOXICITY_MAX, TOXIC_THRESHOLD,
};
use crate::config::HeuristicTables;
use crate::engine::normalization::{normalize_domain, tld_of};
use crate::model::{BacklinkRecord, ToxicLink};

// * Run of DIGIT_RUN_MIN_LEN or more digits anywhere in the domain
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\d{{{},}}", DIGIT_RUN_MIN_LEN)).unwrap());

pub const REASON_LOW_AUTHORITY: &str = "very low domain authority";
pub const REASON_LOW_TRAFFIC: &str = "extremely low traffic";
pub const REASON_DIGIT_RUN: &str = "suspicious number pattern";

/// Authority tier of the linking domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorityTier {
    High,
    Medium,
    Low,
}

impl AuthorityTier {
    pub fn from_authority(authority: u8) -> Self {
        if authority >= AUTHORITY_HIGH_MIN {
            AuthorityTier::High
        } else if authority >= AUTHORITY_MEDIUM_MIN {
            AuthorityTier::Medium
        } else {
            AuthorityTier::Low
        }
    }
}

/// Quality tier of the linking domain's TLD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TldTier {
    Standard,
    LowQuality,
}

/// Per-rule penalty contributions, for debugging and reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToxicityBreakdown {
    pub low_authority: u32,
    pub spam_term: u32,
    pub low_quality_tld: u32,
    pub low_traffic: u32,
    pub digit_run: u32,
    pub uncapped_total: u32,
}

/// A link together with everything the classifier derived from it
#[derive(Debug, Clone)]
pub struct ClassifiedLink<'a> {
    pub record: &'a BacklinkRecord,
    /// Normalized source domain
    pub domain: String,
    pub tld: Option<String>,
    pub toxicity_score: u32,
    pub reasons: Vec<String>,
    pub breakdown: ToxicityBreakdown,
    pub authority_tier: AuthorityTier,
    pub tld_tier: TldTier,
}

impl ClassifiedLink<'_> {
    pub fn is_toxic(&self) -> bool {
        self.toxicity_score > TOXIC_THRESHOLD
    }

    pub fn to_toxic_link(&self) -> ToxicLink {
        ToxicLink {
            url: self.record.source_url.clone(),
            domain: self.domain.clone(),
            toxicity_score: self.toxicity_score,
            reasons: self.reasons.clone(),
            link_type: self.record.link_type,
            anchor_text: self.record.anchor_text.clone(),
            first_seen: self.record.first_seen,
        }
    }
}

/// Heuristic link classifier
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    tables: Arc<HeuristicTables>,
}

impl LinkClassifier {
    /// Creates a classifier with the default heuristic tables
    pub fn new() -> Self {
        Self::with_tables(Arc::new(HeuristicTables::default()))
    }

    /// Creates a classifier with injected tables
    pub fn with_tables(tables: Arc<HeuristicTables>) -> Self {
        Self { tables }
    }

    /// Classifies a single link
    pub fn classify<'a>(&self, record: &'a BacklinkRecord) -> ClassifiedLink<'a> {
        let domain = normalize_domain(&record.source_domain);
        let mut breakdown = ToxicityBreakdown::default();
        let mut reasons = Vec::new();

        // * Very low authority
        if record.domain_authority < LOW_AUTHORITY_BELOW {
            breakdown.low_authority = PENALTY_LOW_AUTHORITY;
            reasons.push(REASON_LOW_AUTHORITY.to_string());
        }

        // * Spam term in domain, first match by list order
        if let Some(term) = self.tables.spam_terms.iter().find(|t| domain.contains(t.as_str())) {
            breakdown.spam_term = PENALTY_SPAM_TERM;
            reasons.push(format!("spam keyword: {}", term));
        }

        // * Low-quality TLD, first match by list order
        let low_tld = self
            .tables
            .low_quality_tlds
            .iter()
            .find(|tld| domain.ends_with(tld.as_str()));
        if let Some(tld) = low_tld {
            breakdown.low_quality_tld = PENALTY_LOW_QUALITY_TLD;
            reasons.push(format!("low-quality TLD: {}", tld));
        }

        // * Extremely low traffic
        if record.traffic_estimate < LOW_TRAFFIC_BELOW {
            breakdown.low_traffic = PENALTY_LOW_TRAFFIC;
            reasons.push(REASON_LOW_TRAFFIC.to_string());
        }

        // * Suspicious number pattern
        if DIGIT_RUN.is_match(&domain) {
            breakdown.digit_run = PENALTY_DIGIT_RUN;
            reasons.push(REASON_DIGIT_RUN.to_string());
        }

        breakdown.uncapped_total = breakdown.low_authority
            + breakdown.spam_term
            + breakdown.low_quality_tld
            + breakdown.low_traffic
            + breakdown.digit_run;

        ClassifiedLink {
            record,
            tld: tld_of(&domain),
            domain,
            toxicity_score: breakdown.uncapped_total.min(TOXICITY_MAX),
            reasons,
            authority_tier: AuthorityTier::from_authority(record.domain_authority),
            tld_tier: if low_tld.is_some() { TldTier::LowQuality } else { TldTier::Standard },
            breakdown,
        }
    }

    /// Classifies every link, preserving input order
    pub fn classify_batch<'a>(&self, records: &'a [BacklinkRecord]) -> Vec<ClassifiedLink<'a>> {
        records.iter().map(|r| self.classify(r)).collect()
    }

    pub fn tables(&self) -> &HeuristicTables {
        &self.tables
    }
}

impl Default for LinkClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects the toxic subset, highest score first (URL breaks ties)
pub fn toxic_links(classified: &[ClassifiedLink<'_>]) -> Vec<ToxicLink> {
    let mut toxic: Vec<ToxicLink> = classified
        .iter()
        .filter(|c| c.is_toxic())
        .map(ClassifiedLink::to_toxic_link)
        .collect();

    toxic.sort_by(compare_toxic);
    toxic
}

fn compare_toxic(a: &ToxicLink, b: &ToxicLink) -> Ordering {
    b.toxicity_score
        .cmp(&a.toxicity_score)
        .then_with(|| a.url.cmp(&b.url))
}
