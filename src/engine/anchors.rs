// * Anchor-Text Classifier
// * Buckets unique anchors by lexical shape and derives over-optimization risk

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::constants::{OVER_OPTIMIZATION_HIGH, OVER_OPTIMIZATION_MEDIUM};
use crate::config::HeuristicTables;
use crate::model::{
    AnchorCategory, AnchorEntry, AnchorTextDistribution, BacklinkRecord, OverOptimizationRisk,
};

static URL_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(https?://|www\.)").unwrap());

// * Bare host with optional path, e.g. `example.com` or `example.co.uk/pricing`
static BARE_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9-]*(\.[a-z0-9-]+)*\.[a-z]{2,}(/\S*)?$").unwrap()
});

/// Categorizes one lowercased, trimmed anchor
pub fn classify_anchor(anchor_lower: &str, tables: &HeuristicTables) -> AnchorCategory {
    if URL_PREFIX.is_match(anchor_lower) || BARE_HOST.is_match(anchor_lower) {
        return AnchorCategory::Naked;
    }
    if tables.is_generic_anchor(anchor_lower) {
        return AnchorCategory::Generic;
    }

    match word_count(anchor_lower) {
        0 | 1 => AnchorCategory::Branded,
        2..=3 => AnchorCategory::Partial,
        _ => AnchorCategory::Exact,
    }
}

// * Whitespace tokens carrying at least one word; hyphenated compounds stay one word,
// * stray separators such as `-` or `|` are not counted
fn word_count(anchor: &str) -> usize {
    anchor
        .split_whitespace()
        .filter(|token| token.unicode_words().next().is_some())
        .count()
}

/// Maps the unique exact-match ratio onto a risk level
pub fn over_optimization_risk(exact_unique: usize, total_unique: usize) -> OverOptimizationRisk {
    if total_unique == 0 {
        return OverOptimizationRisk::Low;
    }
    let ratio = exact_unique as f64 / total_unique as f64;
    if ratio > OVER_OPTIMIZATION_HIGH {
        OverOptimizationRisk::High
    } else if ratio > OVER_OPTIMIZATION_MEDIUM {
        OverOptimizationRisk::Medium
    } else {
        OverOptimizationRisk::Low
    }
}

/// Builds the anchor distribution for a link set
///
/// Anchors are grouped case-insensitively; the first spelling seen is reported.
/// Empty anchors are skipped, so occurrences can sum to less than the link count,
/// while percentages are always relative to the full link count.
pub fn analyze_anchor_text(records: &[BacklinkRecord], tables: &HeuristicTables) -> AnchorTextDistribution {
    let total_links = records.len();
    let mut order: Vec<(String, String)> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        let display = record.anchor_text.trim();
        if display.is_empty() {
            continue;
        }
        let key = display.to_lowercase();
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push((key, display.to_string()));
        }
        *count += 1;
    }

    let mut distribution = AnchorTextDistribution::default();
    for (key, display) in order {
        let count = counts.get(&key).copied().unwrap_or(0);
        let percentage = if total_links == 0 {
            0
        } else {
            (count as f64 * 100.0 / total_links as f64).round() as u32
        };
        distribution
            .bucket_mut(classify_anchor(&key, tables))
            .push(AnchorEntry { text: display, count, percentage });
    }

    for category in [
        AnchorCategory::Branded,
        AnchorCategory::Partial,
        AnchorCategory::Exact,
        AnchorCategory::Generic,
        AnchorCategory::Naked,
    ] {
        distribution
            .bucket_mut(category)
            .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
    }

    distribution.over_optimization_risk =
        over_optimization_risk(distribution.exact.len(), distribution.unique_anchor_count());
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(anchor: &str) -> BacklinkRecord {
        BacklinkRecord::builder("https://ref.example.com/", "ref.example.com")
            .anchor(anchor)
            .build()
    }

    #[test]
    fn test_classify_shapes() {
        let tables = HeuristicTables::default();
        assert_eq!(classify_anchor("https://acme.io/pricing", &tables), AnchorCategory::Naked);
        assert_eq!(classify_anchor("www.acme.io", &tables), AnchorCategory::Naked);
        assert_eq!(classify_anchor("acme.io", &tables), AnchorCategory::Naked);
        assert_eq!(classify_anchor("click here", &tables), AnchorCategory::Generic);
        assert_eq!(classify_anchor("here", &tables), AnchorCategory::Generic);
        assert_eq!(classify_anchor("acme", &tables), AnchorCategory::Branded);
        assert_eq!(classify_anchor("acme project tools", &tables), AnchorCategory::Partial);
        assert_eq!(
            classify_anchor("best project management software", &tables),
            AnchorCategory::Exact
        );
    }

    #[test]
    fn test_hyphenated_words_count_once() {
        let tables = HeuristicTables::default();
        assert_eq!(classify_anchor("coca-cola", &tables), AnchorCategory::Branded);
        assert_eq!(classify_anchor("best e-commerce platform", &tables), AnchorCategory::Partial);
        assert_eq!(classify_anchor("e-commerce platform for teams", &tables), AnchorCategory::Exact);
        assert_eq!(classify_anchor("acme - crm tools", &tables), AnchorCategory::Partial);
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(over_optimization_risk(0, 0), OverOptimizationRisk::Low);
        assert_eq!(over_optimization_risk(3, 10), OverOptimizationRisk::Low);
        assert_eq!(over_optimization_risk(4, 10), OverOptimizationRisk::Medium);
        assert_eq!(over_optimization_risk(5, 10), OverOptimizationRisk::Medium);
        assert_eq!(over_optimization_risk(6, 10), OverOptimizationRisk::High);
    }

    #[test]
    fn test_case_insensitive_grouping() {
        let records = vec![link("Acme"), link("acme"), link("ACME"), link("click here")];
        let dist = analyze_anchor_text(&records, &HeuristicTables::default());

        assert_eq!(dist.branded.len(), 1);
        assert_eq!(dist.branded[0].text, "Acme");
        assert_eq!(dist.branded[0].count, 3);
        assert_eq!(dist.branded[0].percentage, 75);
        assert_eq!(dist.generic[0].percentage, 25);
    }

    #[test]
    fn test_empty_anchors_skipped_but_counted_in_total() {
        let records = vec![link("acme"), link(""), link("   "), link("acme")];
        let dist = analyze_anchor_text(&records, &HeuristicTables::default());

        assert_eq!(dist.total_occurrences(), 2);
        assert_eq!(dist.unique_anchor_count(), 1);
        assert_eq!(dist.branded[0].percentage, 50);
    }

    #[test]
    fn test_exact_heavy_profile_is_high_risk() {
        let records = vec![
            link("best crm software for startups"),
            link("cheap crm tools for small teams"),
            link("top rated sales pipeline app"),
            link("acme"),
        ];
        let dist = analyze_anchor_text(&records, &HeuristicTables::default());

        assert_eq!(dist.exact.len(), 3);
        assert_eq!(dist.over_optimization_risk, OverOptimizationRisk::High);
    }

    #[test]
    fn test_empty_link_set() {
        let dist = analyze_anchor_text(&[], &HeuristicTables::default());
        assert_eq!(dist.unique_anchor_count(), 0);
        assert_eq!(dist.over_optimization_risk, OverOptimizationRisk::Low);
    }
}
