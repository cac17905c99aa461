// * Opportunity Discovery Pipeline
// * Fans out to every configured source concurrently, isolates failures per source,
// * then joins and ranks each category independently

pub mod dedup;
pub mod mentions;
pub mod outreach;
pub mod search;
pub mod sources;
pub mod throttle;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{DiscoveryConfig, HeuristicTables};
use crate::engine::normalization::{domain_from_url, is_same_site, normalize_domain};
use crate::errors::{EngineError, SourceError};
use crate::model::{
    BacklinkOpportunitiesResult, BrokenLinkOpportunity, Capability, CompetitorGap, DiscoveryStatus,
    Opportunity, OpportunityStatus, UnlinkedMention,
};
use crate::ops::telemetry;

pub use dedup::{collapse_by_domain, rank_by_authority};
pub use mentions::{build_mentions, classify_mention_type, estimate_domain};
pub use outreach::{broken_link_template, competitor_gap_template, mention_template, OutreachContext};
pub use search::{SearchMentionSource, SearchScope};
pub use sources::{
    BacklinkSource, BrokenLinkSource, CompetitorGapSource, FailingBacklinkSource, FailingMentionSource,
    MentionSource, SourceFuture, StaticBacklinkSource, StaticBrokenLinkSource, StaticCompetitorGapSource,
    StaticMentionSource,
};
pub use throttle::{per_minute_limiter, DirectLimiter, ThrottledSource};

// * Category labels used in logs and metrics
pub const CATEGORY_MENTIONS: &str = "unlinked_mentions";
pub const CATEGORY_BROKEN_LINKS: &str = "broken_link_targets";
pub const CATEGORY_COMPETITOR_GAPS: &str = "competitor_gaps";

const BROKEN_LINK_SOURCE: &str = "broken_link_source";
const COMPETITOR_GAP_SOURCE: &str = "competitor_gap_source";

// * Community platforms searched by the live slot set
pub const COMMUNITY_PLATFORMS: &[&str] = &["dev.to", "medium.com"];

/// Which result budget a mention source draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionChannel {
    Web,
    Forum,
    Community,
}

impl MentionChannel {
    pub fn limit(&self, config: &DiscoveryConfig) -> usize {
        match self {
            MentionChannel::Web => config.web_mention_limit,
            MentionChannel::Forum => config.forum_mention_limit,
            MentionChannel::Community => config.community_mention_limit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MentionChannel::Web => "web",
            MentionChannel::Forum => "forum",
            MentionChannel::Community => "community",
        }
    }
}

/// A mention source plus the channel that bounds its result count
#[derive(Clone)]
pub struct MentionSlot {
    pub source: Arc<dyn MentionSource>,
    pub channel: MentionChannel,
}

impl MentionSlot {
    pub fn new(source: Arc<dyn MentionSource>, channel: MentionChannel) -> Self {
        Self { source, channel }
    }
}

/// Builds web, forum and community slots over the live search adapter
///
/// Every slot shares one client and one limiter, so the combined request rate
/// against the search endpoint stays within `requests_per_minute`.
pub fn live_search_slots(client: reqwest::Client, requests_per_minute: u32) -> Result<Vec<MentionSlot>, SourceError> {
    let limiter = per_minute_limiter(requests_per_minute);
    let throttled = |source: SearchMentionSource, channel: MentionChannel| {
        MentionSlot::new(
            Arc::new(ThrottledSource::with_limiter(source, limiter.clone())),
            channel,
        )
    };

    let mut slots = vec![
        throttled(SearchMentionSource::web(client.clone())?, MentionChannel::Web),
        throttled(SearchMentionSource::forum(client.clone())?, MentionChannel::Forum),
    ];
    for platform in COMMUNITY_PLATFORMS {
        slots.push(throttled(
            SearchMentionSource::community(client.clone(), platform)?,
            MentionChannel::Community,
        ));
    }

    Ok(slots)
}

/// First label of a normalized domain, used when no brand is given
pub fn default_brand(domain: &str) -> String {
    domain.split('.').next().unwrap_or(domain).to_string()
}

/// Normalizes, dedupes, and drops empty or self entries from a competitor list
pub fn normalize_competitors(domain: &str, competitors: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in competitors {
        let competitor = normalize_domain(raw);
        if competitor.is_empty() || competitor == domain || out.contains(&competitor) {
            continue;
        }
        out.push(competitor);
    }
    out
}

// * Settled state of one guarded capability call
enum CallOutcome<T> {
    Done(T),
    Failed(String),
    Cancelled,
}

// * Runs one capability call under its own timeout and error boundary
async fn guarded_call<T, F>(
    source: &str,
    timeout: Duration,
    cancel: &CancellationToken,
    call: F,
) -> CallOutcome<T>
where
    F: Future<Output = Result<T, SourceError>>,
{
    let started = Instant::now();

    let settled = tokio::select! {
        _ = cancel.cancelled() => None,
        res = tokio::time::timeout(timeout, call) => Some(res),
    };
    let elapsed = started.elapsed().as_secs_f64();

    match settled {
        None => {
            debug!(source = source, "Source query cancelled");
            telemetry::record_source_query(source, telemetry::OUTCOME_CANCELLED, elapsed);
            CallOutcome::Cancelled
        }
        Some(Ok(Ok(data))) => {
            telemetry::record_source_query(source, telemetry::OUTCOME_SUCCESS, elapsed);
            CallOutcome::Done(data)
        }
        Some(Ok(Err(e))) => {
            warn!(source = source, error = %e, "Source query failed, contributing no results");
            telemetry::record_source_query(source, telemetry::OUTCOME_FAILURE, elapsed);
            CallOutcome::Failed(e.to_string())
        }
        Some(Err(_)) => {
            let timeout_ms = timeout.as_millis() as u64;
            warn!(source = source, timeout_ms = timeout_ms, "Source query timed out, contributing no results");
            telemetry::record_source_query(source, telemetry::OUTCOME_TIMEOUT, elapsed);
            CallOutcome::Failed(format!("timed out after {}ms", timeout_ms))
        }
    }
}

/// Concurrent discovery over injected mention, broken-link and competitor-gap sources
pub struct OpportunityPipeline {
    mention_slots: Vec<MentionSlot>,
    broken_links: Option<Arc<dyn BrokenLinkSource>>,
    competitor_gaps: Option<Arc<dyn CompetitorGapSource>>,
    config: DiscoveryConfig,
    tables: Arc<HeuristicTables>,
}

impl OpportunityPipeline {
    pub fn new(config: DiscoveryConfig, tables: Arc<HeuristicTables>) -> Self {
        Self {
            mention_slots: Vec::new(),
            broken_links: None,
            competitor_gaps: None,
            config,
            tables,
        }
    }

    pub fn with_mention_source(mut self, source: Arc<dyn MentionSource>, channel: MentionChannel) -> Self {
        self.mention_slots.push(MentionSlot::new(source, channel));
        self
    }

    pub fn with_mention_slots(mut self, slots: Vec<MentionSlot>) -> Self {
        self.mention_slots.extend(slots);
        self
    }

    pub fn with_broken_link_source(mut self, source: Arc<dyn BrokenLinkSource>) -> Self {
        self.broken_links = Some(source);
        self
    }

    pub fn with_competitor_gap_source(mut self, source: Arc<dyn CompetitorGapSource>) -> Self {
        self.competitor_gaps = Some(source);
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn mention_source_count(&self) -> usize {
        self.mention_slots.len()
    }

    /// Runs all three categories concurrently and assembles the result
    ///
    /// `domain` must already be normalized. Source failures degrade their
    /// category only; a cancelled token aborts every in-flight query.
    pub async fn discover(
        &self,
        domain: &str,
        brand: &str,
        competitors: &[String],
        region: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<BacklinkOpportunitiesResult, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let competitors = normalize_competitors(domain, competitors);
        let (mentions, broken, gaps) = tokio::join!(
            self.discover_mentions(domain, brand, cancel),
            self.discover_broken_links(domain, brand, cancel),
            self.discover_competitor_gaps(domain, brand, &competitors, cancel),
        );

        let (unlinked_mentions, mentions_status) = mentions?.into_parts();
        let (broken_link_targets, broken_status) = broken?.into_parts();
        let (competitor_gaps, gaps_status) = gaps?.into_parts();

        telemetry::record_opportunities(CATEGORY_MENTIONS, unlinked_mentions.len());
        telemetry::record_opportunities(CATEGORY_BROKEN_LINKS, broken_link_targets.len());
        telemetry::record_opportunities(CATEGORY_COMPETITOR_GAPS, competitor_gaps.len());

        let total_opportunities = unlinked_mentions.len() + broken_link_targets.len() + competitor_gaps.len();
        info!(
            domain = domain,
            total = total_opportunities,
            mentions = unlinked_mentions.len(),
            broken_links = broken_link_targets.len(),
            competitor_gaps = competitor_gaps.len(),
            "Opportunity discovery complete"
        );

        Ok(BacklinkOpportunitiesResult {
            domain: domain.to_string(),
            region: region.map(str::to_string),
            total_opportunities,
            unlinked_mentions,
            broken_link_targets,
            competitor_gaps,
            category_status: DiscoveryStatus {
                unlinked_mentions: mentions_status,
                broken_link_targets: broken_status,
                competitor_gaps: gaps_status,
            },
        })
    }

    async fn discover_mentions(
        &self,
        domain: &str,
        brand: &str,
        cancel: &CancellationToken,
    ) -> Result<Capability<Vec<UnlinkedMention>>, EngineError> {
        if self.mention_slots.is_empty() {
            info!(category = CATEGORY_MENTIONS, "No MentionSource configured");
            return Ok(Capability::Unavailable);
        }

        let timeout = self.config.source_timeout();
        let calls = self.mention_slots.iter().map(|slot| async move {
            let outcome = guarded_call(
                slot.source.name(),
                timeout,
                cancel,
                slot.source.search_mentions(brand, Some(domain)),
            )
            .await;
            (slot, outcome)
        });

        // * Join barrier: every branch settles before anything is assembled
        let settled = join_all(calls).await;

        let mut hits = Vec::new();
        let mut failures = Vec::new();
        let mut succeeded = 0usize;
        for (slot, outcome) in settled {
            match outcome {
                CallOutcome::Done(mut found) => {
                    succeeded += 1;
                    debug!(
                        source = slot.source.name(),
                        channel = slot.channel.as_str(),
                        hits = found.len(),
                        "Mention source answered"
                    );
                    found.truncate(slot.channel.limit(&self.config));
                    let name = slot.source.name().to_string();
                    hits.extend(found.into_iter().map(|hit| (name.clone(), hit)));
                }
                CallOutcome::Failed(cause) => failures.push(format!("{}: {}", slot.source.name(), cause)),
                CallOutcome::Cancelled => return Err(EngineError::Cancelled),
            }
        }

        if succeeded == 0 {
            return Ok(Capability::Failed(failures.join("; ")));
        }

        let mentions = build_mentions(hits, domain, brand, &self.tables, Utc::now());
        Ok(Capability::Ok(self.finish(mentions)))
    }

    async fn discover_broken_links(
        &self,
        domain: &str,
        brand: &str,
        cancel: &CancellationToken,
    ) -> Result<Capability<Vec<BrokenLinkOpportunity>>, EngineError> {
        let Some(source) = &self.broken_links else {
            info!(category = CATEGORY_BROKEN_LINKS, "No BrokenLinkSource configured");
            return Ok(Capability::Unavailable);
        };

        let timeout = self.config.source_timeout();
        let targets = match guarded_call(BROKEN_LINK_SOURCE, timeout, cancel, source.find_broken_link_targets(domain)).await
        {
            CallOutcome::Done(targets) => targets,
            CallOutcome::Failed(cause) => return Ok(Capability::Failed(cause)),
            CallOutcome::Cancelled => return Err(EngineError::Cancelled),
        };

        let targets: Vec<BrokenLinkOpportunity> = targets
            .into_iter()
            .filter_map(|mut target| {
                target.source_domain = resolve_source_domain(&target.source_domain, Some(target.source_url.as_str()))?;
                if is_same_site(&target.source_domain, domain) {
                    return None;
                }
                target.outreach_template = broken_link_template(
                    &OutreachContext {
                        brand,
                        domain,
                        source_domain: &target.source_domain,
                    },
                    &target.broken_url,
                );
                target.status = OpportunityStatus::New;
                Some(target)
            })
            .collect();

        Ok(Capability::Ok(self.finish(targets)))
    }

    async fn discover_competitor_gaps(
        &self,
        domain: &str,
        brand: &str,
        competitors: &[String],
        cancel: &CancellationToken,
    ) -> Result<Capability<Vec<CompetitorGap>>, EngineError> {
        if competitors.is_empty() {
            return Ok(Capability::Ok(Vec::new()));
        }
        let Some(source) = &self.competitor_gaps else {
            info!(category = CATEGORY_COMPETITOR_GAPS, "No CompetitorGapSource configured");
            return Ok(Capability::Unavailable);
        };

        let timeout = self.config.source_timeout();
        let gaps = match guarded_call(COMPETITOR_GAP_SOURCE, timeout, cancel, source.diff_backlinks(domain, competitors)).await
        {
            CallOutcome::Done(gaps) => gaps,
            CallOutcome::Failed(cause) => return Ok(Capability::Failed(cause)),
            CallOutcome::Cancelled => return Err(EngineError::Cancelled),
        };

        let gaps: Vec<CompetitorGap> = gaps
            .into_iter()
            .filter_map(|mut gap| {
                gap.source_domain = resolve_source_domain(&gap.source_domain, gap.source_url.as_deref())?;
                // * The domain itself and the competitors are never their own gap
                if is_same_site(&gap.source_domain, domain) || competitors.contains(&gap.source_domain) {
                    return None;
                }
                gap.linked_competitors = normalize_competitors(domain, &gap.linked_competitors);
                gap.outreach_template = competitor_gap_template(
                    &OutreachContext {
                        brand,
                        domain,
                        source_domain: &gap.source_domain,
                    },
                    &gap.linked_competitors,
                );
                gap.status = OpportunityStatus::New;
                Some(gap)
            })
            .collect();

        Ok(Capability::Ok(self.finish(gaps)))
    }

    // * Optional per-category dedup, then authority ranking
    fn finish<T: Opportunity>(&self, items: Vec<T>) -> Vec<T> {
        let before = items.len();
        let mut items = if self.config.collapse_duplicate_domains {
            collapse_by_domain(items)
        } else {
            items
        };
        if items.len() < before {
            debug!(dropped = before - items.len(), "Collapsed duplicate-domain opportunities");
        }
        rank_by_authority(&mut items);
        items
    }
}

// * Prefers the reported domain, falls back to the URL host
fn resolve_source_domain(reported: &str, url: Option<&str>) -> Option<String> {
    let domain = normalize_domain(reported);
    if !domain.is_empty() {
        return Some(domain);
    }
    url.and_then(domain_from_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CapabilityState, MentionHit};

    fn pipeline() -> OpportunityPipeline {
        OpportunityPipeline::new(DiscoveryConfig::default(), Arc::new(HeuristicTables::default()))
    }

    #[test]
    fn test_default_brand() {
        assert_eq!(default_brand("acme.io"), "acme");
        assert_eq!(default_brand("localhost"), "localhost");
    }

    #[test]
    fn test_normalize_competitors() {
        let raw = vec![
            "https://www.Rival.com/".to_string(),
            "rival.com".to_string(),
            "acme.io".to_string(),
            "  ".to_string(),
            "other.io".to_string(),
        ];
        assert_eq!(normalize_competitors("acme.io", &raw), vec!["rival.com", "other.io"]);
    }

    #[tokio::test]
    async fn test_no_sources_is_unavailable_not_failed() {
        let result = pipeline()
            .discover("acme.io", "Acme", &["rival.com".to_string()], None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.total_opportunities, 0);
        assert_eq!(result.category_status.unlinked_mentions.status, CapabilityState::Unavailable);
        assert_eq!(result.category_status.broken_link_targets.status, CapabilityState::Unavailable);
        assert_eq!(result.category_status.competitor_gaps.status, CapabilityState::Unavailable);
    }

    #[tokio::test]
    async fn test_limit_truncates_per_slot() {
        let hits = (0..8)
            .map(|i| MentionHit::new(format!("https://site{}.com/post", i), "acme"))
            .collect();
        let result = pipeline()
            .with_mention_source(Arc::new(StaticMentionSource::new("dev.to", hits)), MentionChannel::Community)
            .discover("acme.io", "Acme", &[], None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.unlinked_mentions.len(), 2);
        assert_eq!(result.category_status.competitor_gaps.status, CapabilityState::Ok);
    }

    #[tokio::test]
    async fn test_guarded_call_timeout() {
        let outcome: CallOutcome<()> = guarded_call(
            "slow",
            Duration::from_millis(20),
            &CancellationToken::new(),
            async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(())
            },
        )
        .await;

        match outcome {
            CallOutcome::Failed(cause) => assert!(cause.contains("timed out")),
            _ => panic!("expected timeout"),
        }
    }
}
