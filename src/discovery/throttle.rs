// * Rate-limited mention source
// * Wraps any MentionSource with a local governor quota so search APIs are not hammered

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{Quota, RateLimiter as GovernorLimiter};
use nonzero_ext::nonzero;

use crate::discovery::sources::{MentionSource, SourceFuture};
use crate::model::MentionHit;

pub type DirectLimiter = GovernorLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// One `requests_per_minute` quota, shareable across sources hitting the same endpoint
pub fn per_minute_limiter(requests_per_minute: u32) -> Arc<DirectLimiter> {
    let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(nonzero!(1u32)));
    Arc::new(GovernorLimiter::direct(quota))
}

/// Delegating source that waits for a rate-limit permit before every call
pub struct ThrottledSource<S> {
    inner: S,
    limiter: Arc<DirectLimiter>,
}

impl<S: MentionSource> ThrottledSource<S> {
    /// Allows `requests_per_minute` calls, bursting up to the same amount
    pub fn per_minute(inner: S, requests_per_minute: u32) -> Self {
        Self::with_limiter(inner, per_minute_limiter(requests_per_minute))
    }

    pub fn with_quota(inner: S, quota: Quota) -> Self {
        Self::with_limiter(inner, Arc::new(GovernorLimiter::direct(quota)))
    }

    /// Draws permits from a limiter owned elsewhere
    pub fn with_limiter(inner: S, limiter: Arc<DirectLimiter>) -> Self {
        Self { inner, limiter }
    }

    /// Non-blocking check, consumes a permit when available
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: MentionSource> MentionSource for ThrottledSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn search_mentions<'a>(&'a self, brand: &'a str, domain: Option<&'a str>) -> SourceFuture<'a, Vec<MentionHit>> {
        Box::pin(async move {
            self.limiter.until_ready().await;
            tracing::debug!(source = self.inner.name(), "Rate-limit permit acquired");
            self.inner.search_mentions(brand, domain).await
        })
    }
}
