// * Backlink Intelligence Engine entry points
// * analyze_backlinks, generate_opportunities and generate_disavow_file over injected capabilities

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::constants::{TOP_LOST_LINKS, TOP_REFERRING_DOMAINS, TOP_TOXIC_LINKS};
use crate::config::{EngineConfig, HeuristicTables};
use crate::discovery::{
    default_brand, BacklinkSource, BrokenLinkSource, CompetitorGapSource, MentionChannel, MentionSlot,
    MentionSource, OpportunityPipeline,
};
use crate::engine::aggregate::{
    average_domain_authority, health_score, quality_metrics, referring_domains, round_to, toxic_score,
    HashedRelevance, LinkCounts, RelevanceEstimator,
};
use crate::engine::anchors::analyze_anchor_text;
use crate::engine::classifier::{toxic_links, LinkClassifier};
use crate::engine::disavow;
use crate::engine::lost_links::detect_lost_links;
use crate::engine::normalization::normalize_domain;
use crate::errors::EngineError;
use crate::model::{BacklinkAnalysisResult, BacklinkOpportunitiesResult, BacklinkRecord, ToxicLink};
use crate::ops::telemetry;

pub const BACKLINK_SOURCE: &str = "BacklinkSource";

/// Engine wired to its capabilities, built once and shared across calls
pub struct BacklinkEngine {
    classifier: LinkClassifier,
    tables: Arc<HeuristicTables>,
    backlink_source: Option<Arc<dyn BacklinkSource>>,
    relevance: Arc<dyn RelevanceEstimator>,
    pipeline: OpportunityPipeline,
    config: EngineConfig,
}

impl BacklinkEngine {
    pub fn builder() -> BacklinkEngineBuilder {
        BacklinkEngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetches the raw link set for `domain` and analyzes it
    ///
    /// Fails when no `BacklinkSource` is configured or when it errors or
    /// times out. An empty link set is a valid, zero-scored analysis.
    pub async fn analyze_backlinks(
        &self,
        domain: &str,
        region: Option<&str>,
    ) -> Result<BacklinkAnalysisResult, EngineError> {
        let domain = match validate_domain(domain) {
            Ok(domain) => domain,
            Err(e) => {
                telemetry::record_analysis(telemetry::OUTCOME_INVALID);
                return Err(e);
            }
        };

        let Some(source) = &self.backlink_source else {
            warn!(domain = %domain, capability = BACKLINK_SOURCE, "Analysis requires an unconfigured capability");
            telemetry::record_analysis(telemetry::OUTCOME_FAILURE);
            return Err(EngineError::CapabilityUnavailable {
                capability: BACKLINK_SOURCE,
            });
        };

        let timeout = self.config.discovery.source_timeout();
        let started = Instant::now();
        let fetched = tokio::time::timeout(timeout, source.fetch(&domain, region)).await;
        let elapsed = started.elapsed().as_secs_f64();

        let records = match fetched {
            Ok(Ok(records)) => {
                telemetry::record_source_query(BACKLINK_SOURCE, telemetry::OUTCOME_SUCCESS, elapsed);
                records
            }
            Ok(Err(cause)) => {
                warn!(domain = %domain, error = %cause, "Backlink source failed");
                telemetry::record_source_query(BACKLINK_SOURCE, telemetry::OUTCOME_FAILURE, elapsed);
                telemetry::record_analysis(telemetry::OUTCOME_FAILURE);
                return Err(EngineError::SourceFailed {
                    capability: BACKLINK_SOURCE,
                    cause,
                });
            }
            Err(_) => {
                let timeout_ms = timeout.as_millis() as u64;
                warn!(domain = %domain, timeout_ms = timeout_ms, "Backlink source timed out");
                telemetry::record_source_query(BACKLINK_SOURCE, telemetry::OUTCOME_TIMEOUT, elapsed);
                telemetry::record_analysis(telemetry::OUTCOME_FAILURE);
                return Err(EngineError::SourceTimeout {
                    capability: BACKLINK_SOURCE,
                    timeout_ms,
                });
            }
        };

        let result = self.analyze_records(&domain, region, &records);
        telemetry::record_analysis(telemetry::OUTCOME_SUCCESS);
        Ok(result)
    }

    /// Analyzes an already-fetched link set; `domain` is used as given
    pub fn analyze_records(
        &self,
        domain: &str,
        region: Option<&str>,
        records: &[BacklinkRecord],
    ) -> BacklinkAnalysisResult {
        let classified = self.classifier.classify_batch(records);
        let counts = LinkCounts::from_records(records);

        // * Sorted before truncation, so the top slice is stable
        let mut toxic = toxic_links(&classified);
        let toxic_count = toxic.len();
        telemetry::record_toxic_links(toxic_count);

        let relevance = self.relevance.estimate(domain, records);
        let metrics = quality_metrics(&classified, records, relevance);
        let anchors = analyze_anchor_text(records, &self.tables);

        let toxic_score = toxic_score(toxic_count, counts.total);
        let quality_score = round_to(average_domain_authority(records), 1);
        let health_score = health_score(toxic_score, quality_score, anchors.over_optimization_risk);

        let mut lost_links = detect_lost_links(records);
        lost_links.truncate(TOP_LOST_LINKS);

        let mut referring = referring_domains(&classified);
        referring.truncate(TOP_REFERRING_DOMAINS);

        toxic.truncate(TOP_TOXIC_LINKS);

        info!(
            domain = domain,
            total = counts.total,
            toxic = toxic_count,
            health_score = health_score,
            risk = anchors.over_optimization_risk.as_str(),
            "Backlink analysis complete"
        );

        BacklinkAnalysisResult {
            domain: domain.to_string(),
            region: region.map(str::to_string),
            health_score,
            toxic_score,
            quality_score,
            total_backlinks: counts.total,
            dofollow_count: counts.dofollow,
            nofollow_count: counts.nofollow,
            toxic_links: toxic,
            quality_metrics: metrics,
            lost_links,
            anchor_text_distribution: anchors,
            referring_domains: referring,
        }
    }

    /// Discovers link-acquisition opportunities
    ///
    /// Source absence or failure degrades the matching category only.
    pub async fn generate_opportunities(
        &self,
        domain: &str,
        brand: Option<&str>,
        competitors: &[String],
        region: Option<&str>,
    ) -> Result<BacklinkOpportunitiesResult, EngineError> {
        self.generate_opportunities_with_cancel(domain, brand, competitors, region, CancellationToken::new())
            .await
    }

    /// Same as `generate_opportunities`, aborting every in-flight query once `cancel` fires
    pub async fn generate_opportunities_with_cancel(
        &self,
        domain: &str,
        brand: Option<&str>,
        competitors: &[String],
        region: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<BacklinkOpportunitiesResult, EngineError> {
        let domain = validate_domain(domain)?;
        let brand = brand
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_brand(&domain));

        info!(domain = %domain, brand = %brand, competitors = competitors.len(), "Generating opportunities");
        self.pipeline
            .discover(&domain, &brand, competitors, region, &cancel)
            .await
    }

    /// Renders toxic findings as a disavow file
    pub fn generate_disavow_file(&self, toxic_links: &[ToxicLink]) -> String {
        disavow::generate_disavow_file(toxic_links)
    }
}

fn validate_domain(input: &str) -> Result<String, EngineError> {
    let domain = normalize_domain(input);
    if domain.is_empty() {
        return Err(EngineError::InvalidDomain(input.to_string()));
    }
    Ok(domain)
}

/// Builder for `BacklinkEngine`
#[derive(Default)]
pub struct BacklinkEngineBuilder {
    config: EngineConfig,
    backlink_source: Option<Arc<dyn BacklinkSource>>,
    mention_slots: Vec<MentionSlot>,
    broken_links: Option<Arc<dyn BrokenLinkSource>>,
    competitor_gaps: Option<Arc<dyn CompetitorGapSource>>,
    relevance: Option<Arc<dyn RelevanceEstimator>>,
}

impl BacklinkEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn backlink_source(mut self, source: Arc<dyn BacklinkSource>) -> Self {
        self.backlink_source = Some(source);
        self
    }

    pub fn mention_source(mut self, source: Arc<dyn MentionSource>, channel: MentionChannel) -> Self {
        self.mention_slots.push(MentionSlot::new(source, channel));
        self
    }

    pub fn mention_slots(mut self, slots: Vec<MentionSlot>) -> Self {
        self.mention_slots.extend(slots);
        self
    }

    pub fn broken_link_source(mut self, source: Arc<dyn BrokenLinkSource>) -> Self {
        self.broken_links = Some(source);
        self
    }

    pub fn competitor_gap_source(mut self, source: Arc<dyn CompetitorGapSource>) -> Self {
        self.competitor_gaps = Some(source);
        self
    }

    pub fn relevance_estimator(mut self, estimator: Arc<dyn RelevanceEstimator>) -> Self {
        self.relevance = Some(estimator);
        self
    }

    pub fn build(mut self) -> BacklinkEngine {
        // * Injected tables get the same cleanup as file-loaded ones
        self.config.heuristics = self.config.heuristics.normalized();
        let tables = Arc::new(self.config.heuristics.clone());

        let mut pipeline = OpportunityPipeline::new(self.config.discovery.clone(), Arc::clone(&tables))
            .with_mention_slots(self.mention_slots);
        if let Some(source) = self.broken_links {
            pipeline = pipeline.with_broken_link_source(source);
        }
        if let Some(source) = self.competitor_gaps {
            pipeline = pipeline.with_competitor_gap_source(source);
        }

        BacklinkEngine {
            classifier: LinkClassifier::with_tables(Arc::clone(&tables)),
            tables,
            backlink_source: self.backlink_source,
            relevance: self.relevance.unwrap_or_else(|| Arc::new(HashedRelevance)),
            pipeline,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::StaticBacklinkSource;
    use crate::model::OverOptimizationRisk;

    struct FixedRelevance(f64);

    impl RelevanceEstimator for FixedRelevance {
        fn estimate(&self, _domain: &str, _records: &[BacklinkRecord]) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_validate_domain() {
        assert_eq!(validate_domain("https://www.Acme.io/").unwrap(), "acme.io");
        assert!(matches!(validate_domain("   "), Err(EngineError::InvalidDomain(_))));
    }

    #[test]
    fn test_empty_link_set_scores() {
        let engine = BacklinkEngine::builder().build();
        let result = engine.analyze_records("acme.io", None, &[]);

        assert_eq!(result.total_backlinks, 0);
        assert_eq!(result.toxic_score, 0.0);
        assert_eq!(result.quality_score, 0.0);
        assert_eq!(result.health_score, 85.0);
        assert_eq!(result.anchor_text_distribution.over_optimization_risk, OverOptimizationRisk::Low);
        assert!(result.quality_metrics.relevance_score >= 65.0);
    }

    #[test]
    fn test_relevance_estimator_is_clamped() {
        let engine = BacklinkEngine::builder()
            .relevance_estimator(Arc::new(FixedRelevance(99.0)))
            .build();
        let result = engine.analyze_records("acme.io", None, &[]);
        assert!(result.quality_metrics.relevance_score < 85.0);
    }

    #[test]
    fn test_injected_tables_are_normalized() {
        let config = EngineConfig {
            heuristics: HeuristicTables {
                spam_terms: vec!["  Widgets ".to_string()],
                low_quality_tlds: vec!["BIZ".to_string()],
                ..HeuristicTables::default()
            },
            ..EngineConfig::default()
        };
        let engine = BacklinkEngine::builder().config(config).build();
        let records = vec![BacklinkRecord::builder("https://widgets-hub.biz/", "widgets-hub.biz").build()];

        let result = engine.analyze_records("acme.io", None, &records);
        assert_eq!(result.toxic_links.len(), 1);
        let reasons = &result.toxic_links[0].reasons;
        assert!(reasons.iter().any(|r| r == "spam keyword: widgets"));
        assert!(reasons.iter().any(|r| r == "low-quality TLD: .biz"));
        assert_eq!(engine.config().heuristics.low_quality_tlds, vec![".biz".to_string()]);
    }

    #[tokio::test]
    async fn test_analyze_normalizes_domain() {
        let records = vec![BacklinkRecord::builder("https://blog.org/a", "blog.org").build()];
        let engine = BacklinkEngine::builder()
            .backlink_source(Arc::new(StaticBacklinkSource::new(records)))
            .build();

        let result = engine.analyze_backlinks("HTTPS://WWW.Acme.io/", Some("us")).await.unwrap();
        assert_eq!(result.domain, "acme.io");
        assert_eq!(result.region.as_deref(), Some("us"));
        assert_eq!(result.total_backlinks, 1);
    }
}
