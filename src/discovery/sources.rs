// * Consumed capabilities
// * The engine has no I/O of its own; everything external arrives through these traits

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::SourceError;
use crate::model::{BacklinkRecord, BrokenLinkOpportunity, CompetitorGap, MentionHit};

/// Boxed future returned by every capability call
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Yields the raw inbound-link set for a domain
pub trait BacklinkSource: Send + Sync {
    fn fetch<'a>(&'a self, domain: &'a str, region: Option<&'a str>) -> SourceFuture<'a, Vec<BacklinkRecord>>;
}

/// Searches for brand mentions (general web, forums, community platforms)
pub trait MentionSource: Send + Sync {
    /// Short label used in logs, metrics and `found_via`
    fn name(&self) -> &str;

    fn search_mentions<'a>(&'a self, brand: &'a str, domain: Option<&'a str>) -> SourceFuture<'a, Vec<MentionHit>>;
}

/// Finds pages linking to dead URLs that the domain could replace
pub trait BrokenLinkSource: Send + Sync {
    fn find_broken_link_targets<'a>(&'a self, domain: &'a str) -> SourceFuture<'a, Vec<BrokenLinkOpportunity>>;
}

/// Diffs referring-domain sets between a domain and its competitors
pub trait CompetitorGapSource: Send + Sync {
    fn diff_backlinks<'a>(
        &'a self,
        domain: &'a str,
        competitor_domains: &'a [String],
    ) -> SourceFuture<'a, Vec<CompetitorGap>>;
}

/// In-memory backlink source for tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct StaticBacklinkSource {
    records: Vec<BacklinkRecord>,
}

impl StaticBacklinkSource {
    pub fn new(records: Vec<BacklinkRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl BacklinkSource for StaticBacklinkSource {
    fn fetch<'a>(&'a self, _domain: &'a str, _region: Option<&'a str>) -> SourceFuture<'a, Vec<BacklinkRecord>> {
        let records = self.records.clone();
        Box::pin(async move { Ok(records) })
    }
}

/// Backlink source that always fails, for wiring checks
#[derive(Debug, Clone)]
pub struct FailingBacklinkSource {
    error: SourceError,
}

impl FailingBacklinkSource {
    pub fn new(error: SourceError) -> Self {
        Self { error }
    }
}

impl BacklinkSource for FailingBacklinkSource {
    fn fetch<'a>(&'a self, _domain: &'a str, _region: Option<&'a str>) -> SourceFuture<'a, Vec<BacklinkRecord>> {
        let error = self.error.clone();
        Box::pin(async move { Err(error) })
    }
}

/// In-memory mention source with an optional artificial delay
#[derive(Debug, Clone)]
pub struct StaticMentionSource {
    name: String,
    hits: Vec<MentionHit>,
    delay: Option<Duration>,
}

impl StaticMentionSource {
    pub fn new(name: impl Into<String>, hits: Vec<MentionHit>) -> Self {
        Self {
            name: name.into(),
            hits,
            delay: None,
        }
    }

    /// Sleeps before answering, to exercise timeouts and cancellation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl MentionSource for StaticMentionSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn search_mentions<'a>(&'a self, _brand: &'a str, _domain: Option<&'a str>) -> SourceFuture<'a, Vec<MentionHit>> {
        let hits = self.hits.clone();
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(hits)
        })
    }
}

/// Mention source that always fails
#[derive(Debug, Clone)]
pub struct FailingMentionSource {
    name: String,
    error: SourceError,
}

impl FailingMentionSource {
    pub fn new(name: impl Into<String>, error: SourceError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl MentionSource for FailingMentionSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn search_mentions<'a>(&'a self, _brand: &'a str, _domain: Option<&'a str>) -> SourceFuture<'a, Vec<MentionHit>> {
        let error = self.error.clone();
        Box::pin(async move { Err(error) })
    }
}

/// In-memory broken-link source
#[derive(Debug, Clone, Default)]
pub struct StaticBrokenLinkSource {
    targets: Vec<BrokenLinkOpportunity>,
}

impl StaticBrokenLinkSource {
    pub fn new(targets: Vec<BrokenLinkOpportunity>) -> Self {
        Self { targets }
    }
}

impl BrokenLinkSource for StaticBrokenLinkSource {
    fn find_broken_link_targets<'a>(&'a self, _domain: &'a str) -> SourceFuture<'a, Vec<BrokenLinkOpportunity>> {
        let targets = self.targets.clone();
        Box::pin(async move { Ok(targets) })
    }
}

/// In-memory competitor-gap source
#[derive(Debug, Clone, Default)]
pub struct StaticCompetitorGapSource {
    gaps: Vec<CompetitorGap>,
}

impl StaticCompetitorGapSource {
    pub fn new(gaps: Vec<CompetitorGap>) -> Self {
        Self { gaps }
    }
}

impl CompetitorGapSource for StaticCompetitorGapSource {
    fn diff_backlinks<'a>(
        &'a self,
        _domain: &'a str,
        competitor_domains: &'a [String],
    ) -> SourceFuture<'a, Vec<CompetitorGap>> {
        // * Only gaps that involve a requested competitor
        let gaps: Vec<CompetitorGap> = self
            .gaps
            .iter()
            .filter(|gap| gap.linked_competitors.iter().any(|c| competitor_domains.contains(c)))
            .cloned()
            .collect();
        Box::pin(async move { Ok(gaps) })
    }
}
