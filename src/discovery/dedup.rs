// * Opportunity deduplication and ranking
// * One opportunity per (source domain, type); the highest-authority instance wins

use std::collections::HashMap;

use crate::model::{Opportunity, OpportunityType};

/// Collapses opportunities sharing a (source domain, type) key
///
/// The survivor is the highest-authority instance; on ties the first one seen.
pub fn collapse_by_domain<T: Opportunity>(items: Vec<T>) -> Vec<T> {
    let mut best: HashMap<(String, OpportunityType), T> = HashMap::new();
    let mut order: Vec<(String, OpportunityType)> = Vec::new();

    for item in items {
        let key = (item.source_domain().to_string(), item.opportunity_type());
        match best.get(&key) {
            Some(existing) if existing.domain_authority() >= item.domain_authority() => {
                tracing::debug!(domain = %key.0, "Dropping lower-authority duplicate opportunity");
            }
            Some(_) => {
                best.insert(key, item);
            }
            None => {
                order.push(key.clone());
                best.insert(key, item);
            }
        }
    }

    order.into_iter().filter_map(|key| best.remove(&key)).collect()
}

/// Orders by authority desc, then source domain asc
pub fn rank_by_authority<T: Opportunity>(items: &mut [T]) {
    items.sort_by(|a, b| {
        b.domain_authority()
            .cmp(&a.domain_authority())
            .then_with(|| a.source_domain().cmp(b.source_domain()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BrokenLinkOpportunity, OpportunityStatus};

    fn broken(domain: &str, authority: u8, broken_url: &str) -> BrokenLinkOpportunity {
        BrokenLinkOpportunity {
            source_url: format!("https://{}/resources", domain),
            source_domain: domain.to_string(),
            domain_authority: authority,
            broken_url: broken_url.to_string(),
            anchor_text: String::new(),
            outreach_template: String::new(),
            status: OpportunityStatus::New,
        }
    }

    #[test]
    fn test_collapse_keeps_highest_authority() {
        let items = vec![
            broken("a.com", 40, "https://x/1"),
            broken("b.com", 60, "https://x/2"),
            broken("a.com", 70, "https://x/3"),
            broken("a.com", 70, "https://x/4"),
        ];

        let collapsed = collapse_by_domain(items);
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed[0].source_domain, "a.com");
        assert_eq!(collapsed[0].broken_url, "https://x/3");
        assert_eq!(collapsed[1].source_domain, "b.com");
    }

    #[test]
    fn test_rank() {
        let mut items = vec![broken("z.com", 50, "u"), broken("a.com", 50, "u"), broken("m.com", 90, "u")];
        rank_by_authority(&mut items);
        let order: Vec<&str> = items.iter().map(|i| i.source_domain.as_str()).collect();
        assert_eq!(order, vec!["m.com", "a.com", "z.com"]);
    }
}
