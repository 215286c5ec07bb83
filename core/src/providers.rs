//! Service provider queries.
//!
//! A [`ProviderSource`] lists the container's registered provider classes and
//! its deferred-service map; [`ProviderQuery`] filters providers by name, by
//! deferral, and by the services they defer. Candidates are the enumerated
//! provider classes: a provider that only appears in the deferred map is not
//! discovered.

use crate::name_match::{self, NameMatch};
use crate::trace::ChainTrace;
use crate::{IntrospectError, Query};
use std::fmt;
use std::sync::Arc;

/// One deferred container binding: the service becomes available when its
/// provider is loaded on first request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeferredService {
    /// Service identifier (abstract class name or container key).
    pub service: String,
    /// Provider class that registers it.
    pub provider: String,
}

impl DeferredService {
    pub fn new(service: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            provider: provider.into(),
        }
    }
}

/// The host container's provider registry.
pub trait ProviderSource: Send + Sync {
    /// All registered provider classes, in registration order.
    fn providers(&self) -> Vec<String>;

    /// The deferred-service map.
    fn deferred(&self) -> Vec<DeferredService>;
}

/// Fluent queries over registered providers.
pub struct ProviderQuery {
    source: Arc<dyn ProviderSource>,
    query: Query<String>,
}

impl ProviderQuery {
    pub fn new(source: Arc<dyn ProviderSource>) -> Self {
        let discover = Arc::clone(&source);
        let query = Query::new(move || discover.providers());
        Self { source, query }
    }

    fn name_filter(mut self, matcher: NameMatch) -> Self {
        self.query = name_match::filter_on(self.query, "provider", matcher, |p: &String| {
            p.as_str()
        });
        self
    }

    /// Keep providers whose class name matches a wildcard pattern.
    ///
    /// # Errors
    ///
    /// Fails at registration when the pattern does not compile.
    pub fn where_name(self, pattern: &str) -> Result<Self, IntrospectError> {
        Ok(self.name_filter(NameMatch::wildcard(pattern)?))
    }

    #[must_use]
    pub fn where_name_equals(self, name: impl Into<String>) -> Self {
        self.name_filter(NameMatch::Equals(name.into()))
    }

    #[must_use]
    pub fn where_name_starts_with(self, prefix: impl Into<String>) -> Self {
        self.name_filter(NameMatch::StartsWith(prefix.into()))
    }

    #[must_use]
    pub fn where_name_ends_with(self, suffix: impl Into<String>) -> Self {
        self.name_filter(NameMatch::EndsWith(suffix.into()))
    }

    #[must_use]
    pub fn where_name_contains(self, needle: impl Into<String>) -> Self {
        self.name_filter(NameMatch::Contains(needle.into()))
    }

    /// Keep providers that defer at least one service.
    #[must_use]
    pub fn deferred_only(mut self) -> Self {
        let source = Arc::clone(&self.source);
        self.query = self.query.filter("defers a service", move |p: &String| {
            source.deferred().iter().any(|d| d.provider == *p)
        });
        self
    }

    /// Keep providers deferring a service whose identifier matches a
    /// wildcard pattern.
    ///
    /// # Errors
    ///
    /// Fails at registration when the pattern does not compile.
    pub fn provides(mut self, pattern: &str) -> Result<Self, IntrospectError> {
        let matcher = NameMatch::wildcard(pattern)?;
        let source = Arc::clone(&self.source);
        let description = format!("defers a service that {matcher}");
        self.query = self.query.filter(description, move |p: &String| {
            source
                .deferred()
                .iter()
                .any(|d| d.provider == *p && matcher.matches(&d.service))
        });
        Ok(self)
    }

    /// Restrict the query to exactly these provider classes instead of the
    /// live registry.
    #[must_use]
    pub fn among(mut self, providers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.query = self.query.among(providers.into_iter().map(Into::into));
        self
    }

    /// Open an OR-branch over the same registry. Nested `or` calls inside
    /// the callback are ignored.
    ///
    /// # Errors
    ///
    /// Propagates pattern-compilation failures from inside the callback.
    pub fn or(
        mut self,
        build: impl FnOnce(Self) -> Result<Self, IntrospectError>,
    ) -> Result<Self, IntrospectError> {
        let nested = build(Self::new(Arc::clone(&self.source)))?;
        self.query = self.query.branch(nested.query.into_chain());
        Ok(self)
    }

    /// All matching provider classes, in registration order.
    #[must_use]
    pub fn get(&self) -> Vec<String> {
        self.query.get()
    }

    /// First matching provider, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<String> {
        self.query.first()
    }

    /// `true` if any provider matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching providers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one provider class.
    #[must_use]
    pub fn explain(&self, provider: &str) -> ChainTrace {
        self.query.explain(&provider.to_string())
    }
}

impl fmt::Debug for ProviderQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderQuery")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Container;

    impl ProviderSource for Container {
        fn providers(&self) -> Vec<String> {
            vec![
                "App\\Providers\\AppServiceProvider".to_string(),
                "App\\Providers\\RouteServiceProvider".to_string(),
                "App\\Providers\\BroadcastServiceProvider".to_string(),
                "App\\Providers\\QueueServiceProvider".to_string(),
            ]
        }

        fn deferred(&self) -> Vec<DeferredService> {
            vec![
                DeferredService::new("queue", "App\\Providers\\QueueServiceProvider"),
                DeferredService::new("queue.worker", "App\\Providers\\QueueServiceProvider"),
                DeferredService::new("broadcast", "App\\Providers\\BroadcastServiceProvider"),
                // Provider absent from the registration list on purpose.
                DeferredService::new("mail", "App\\Providers\\MailServiceProvider"),
            ]
        }
    }

    fn container() -> Arc<dyn ProviderSource> {
        Arc::new(Container)
    }

    #[test]
    fn enumerates_registered_providers() {
        assert_eq!(ProviderQuery::new(container()).count(), 4);
    }

    #[test]
    fn name_family() {
        let query = ProviderQuery::new(container()).where_name_ends_with("ServiceProvider");
        assert_eq!(query.count(), 4);

        let query = ProviderQuery::new(container())
            .where_name("*Route*")
            .unwrap();
        assert_eq!(query.count(), 1);
    }

    #[test]
    fn deferred_only_checks_the_map() {
        let deferred = ProviderQuery::new(container()).deferred_only().get();
        assert_eq!(
            deferred,
            vec![
                "App\\Providers\\BroadcastServiceProvider".to_string(),
                "App\\Providers\\QueueServiceProvider".to_string(),
            ]
        );
    }

    #[test]
    fn provides_matches_service_patterns() {
        let query = ProviderQuery::new(container()).provides("queue*").unwrap();
        assert_eq!(
            query.get(),
            vec!["App\\Providers\\QueueServiceProvider".to_string()]
        );

        let query = ProviderQuery::new(container()).provides("broadcast").unwrap();
        assert_eq!(query.count(), 1);
    }

    #[test]
    fn unregistered_deferred_provider_is_not_discovered() {
        let query = ProviderQuery::new(container()).provides("mail").unwrap();
        assert_eq!(query.count(), 0);
    }

    #[test]
    fn or_branch_unions() {
        let query = ProviderQuery::new(container())
            .where_name_contains("App\\Providers\\App")
            .or(|q| q.provides("queue"))
            .unwrap();
        assert_eq!(query.count(), 2);
    }
}
