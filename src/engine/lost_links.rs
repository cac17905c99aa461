// * Lost-Link Detector
// * Partitions inactive links and labels why they were lost

use crate::config::constants::RECLAIMABLE_AUTHORITY_ABOVE;
use crate::engine::normalization::normalize_domain;
use crate::model::{BacklinkRecord, LossReason, LostLink};

/// Builds a lost-link row for an inactive record, `None` for active ones
///
/// The reason comes from the source collaborator; without one it is `Unknown`.
pub fn to_lost_link(record: &BacklinkRecord) -> Option<LostLink> {
    if record.is_active {
        return None;
    }

    Some(LostLink {
        url: record.source_url.clone(),
        domain: normalize_domain(&record.source_domain),
        domain_authority: record.domain_authority,
        last_seen: record.last_seen,
        reason: record.loss_reason.unwrap_or(LossReason::Unknown),
        // ! Authority is the only signal here; page existence is not verified
        reclaimable: record.domain_authority > RECLAIMABLE_AUTHORITY_ABOVE,
    })
}

/// All inactive links, most recently seen first
pub fn detect_lost_links(records: &[BacklinkRecord]) -> Vec<LostLink> {
    let mut lost: Vec<LostLink> = records.iter().filter_map(to_lost_link).collect();
    lost.sort_by(|a, b| {
        b.last_seen
            .cmp(&a.last_seen)
            .then_with(|| b.domain_authority.cmp(&a.domain_authority))
            .then_with(|| a.url.cmp(&b.url))
    });
    lost
}
