//! The injected registry bundle.
//!
//! Nothing in this crate reaches into ambient globals: every query reads from
//! a source handed over at construction. [`Host`] bundles one implementation
//! of each source trait (defaulting to empty sources) plus the
//! [`Conventions`] that drive heuristic discovery. The facade takes a `Host`
//! as its single constructor argument, so swapping the whole backing for an
//! in-memory fixture is one call.

use crate::events::EventSource;
use crate::middleware::MiddlewareSource;
use crate::providers::ProviderSource;
use crate::reflect::{short_name, TypeKind, TypeRecord, TypeSource, TypeSourceExt};
use crate::routes::RouteSource;
use crate::views::{ViewRecord, ViewSource};
use crate::Pattern;
use std::fmt;
use std::sync::Arc;

/// The overridable knobs behind heuristic discovery.
///
/// These are **heuristics, not guarantees**: "is this class a queue job" has
/// no authoritative registry flag in the host, so discovery approximates it
/// from markers and naming conventions. Callers needing exact sets should
/// supply them explicitly with `among`.
///
/// Marker and base names match exactly or by trailing namespace segment, so
/// the short defaults below find their fully qualified counterparts.
#[derive(Debug, Clone)]
pub struct Conventions {
    /// Marker interfaces identifying queue jobs. Default: `ShouldQueue`.
    pub queue_markers: Vec<String>,
    /// Wildcard patterns matched against the *short* class name during job
    /// discovery. Default: `*Job`.
    pub job_name_patterns: Vec<Pattern>,
    /// Namespace fragments identifying jobs by location. Default: `\Jobs\`.
    pub job_namespace_fragments: Vec<String>,
    /// Base classes whose transitive subclasses count as models. Default:
    /// `Model`.
    pub model_bases: Vec<String>,
    /// Return-type fragments identifying relationship methods. Default:
    /// `Relation`.
    pub relation_fragments: Vec<String>,
    /// Marker interfaces for uniquely queued jobs. Default: `ShouldBeUnique`.
    pub unique_markers: Vec<String>,
    /// Marker interfaces for encrypted jobs. Default: `ShouldBeEncrypted`.
    pub encrypted_markers: Vec<String>,
}

/// Compile built-in pattern literals; a failed compile drops the entry.
fn compiled(patterns: &[&str]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| Pattern::compile(p).ok())
        .collect()
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            queue_markers: vec!["ShouldQueue".to_string()],
            job_name_patterns: compiled(&["*Job"]),
            job_namespace_fragments: vec!["\\Jobs\\".to_string()],
            model_bases: vec!["Model".to_string()],
            relation_fragments: vec!["Relation".to_string()],
            unique_markers: vec!["ShouldBeUnique".to_string()],
            encrypted_markers: vec!["ShouldBeEncrypted".to_string()],
        }
    }
}

impl Conventions {
    /// The job heuristic: a declared class that implements a queue marker,
    /// or whose short name matches a job pattern, or that lives in a job
    /// namespace.
    #[must_use]
    pub fn is_job<S: TypeSource + ?Sized>(&self, source: &S, name: &str) -> bool {
        let record = match source.lookup(name) {
            Some(record) => record,
            None => return false,
        };
        if record.kind != TypeKind::Class {
            return false;
        }
        self.queue_markers.iter().any(|m| source.implements(name, m))
            || self
                .job_name_patterns
                .iter()
                .any(|p| p.matches(short_name(name)))
            || self
                .job_namespace_fragments
                .iter()
                .any(|f| name.contains(f.as_str()))
    }

    /// The model heuristic: an instantiable class transitively extending one
    /// of the configured base classes.
    #[must_use]
    pub fn is_model<S: TypeSource + ?Sized>(&self, source: &S, name: &str) -> bool {
        let record = match source.lookup(name) {
            Some(record) => record,
            None => return false,
        };
        record.is_instantiable() && self.model_bases.iter().any(|b| source.extends(name, b))
    }

    /// The relationship heuristic: does a declared return type look like a
    /// relation.
    #[must_use]
    pub fn is_relation_return(&self, declared: &str) -> bool {
        self.relation_fragments
            .iter()
            .any(|f| declared.contains(f.as_str()))
    }
}

/// Source for every unconfigured slot: enumerates nothing, looks up nothing.
struct EmptySource;

impl TypeSource for EmptySource {
    fn type_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn lookup(&self, _name: &str) -> Option<TypeRecord> {
        None
    }
}

impl RouteSource for EmptySource {
    fn routes(&self) -> Vec<crate::routes::RouteRecord> {
        Vec::new()
    }
}

impl EventSource for EmptySource {
    fn events(&self) -> Vec<crate::events::EventRecord> {
        Vec::new()
    }
}

impl ViewSource for EmptySource {
    fn views(&self) -> Vec<ViewRecord> {
        Vec::new()
    }

    fn contents(&self, _view: &ViewRecord) -> Option<String> {
        None
    }
}

impl MiddlewareSource for EmptySource {
    fn aliases(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn groups(&self) -> Vec<(String, Vec<String>)> {
        Vec::new()
    }

    fn global(&self) -> Vec<String> {
        Vec::new()
    }

    fn priority(&self) -> Vec<String> {
        Vec::new()
    }
}

impl ProviderSource for EmptySource {
    fn providers(&self) -> Vec<String> {
        Vec::new()
    }

    fn deferred(&self) -> Vec<crate::providers::DeferredService> {
        Vec::new()
    }
}

/// One implementation of each source trait plus the discovery conventions.
///
/// Every slot defaults to an empty source, so a partial host is valid:
/// queries over unconfigured slots simply find nothing.
///
/// # Example
///
/// ```
/// use scry::{Conventions, Host};
///
/// let mut conventions = Conventions::default();
/// conventions.model_bases.push("ActiveRecord".to_string());
///
/// let host = Host::new().with_conventions(conventions);
/// assert_eq!(host.conventions().model_bases.len(), 2);
/// ```
pub struct Host {
    types: Arc<dyn TypeSource>,
    routes: Arc<dyn RouteSource>,
    events: Arc<dyn EventSource>,
    views: Arc<dyn ViewSource>,
    middleware: Arc<dyn MiddlewareSource>,
    providers: Arc<dyn ProviderSource>,
    conventions: Conventions,
}

impl Host {
    /// A host with empty sources and default conventions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: Arc::new(EmptySource),
            routes: Arc::new(EmptySource),
            events: Arc::new(EmptySource),
            views: Arc::new(EmptySource),
            middleware: Arc::new(EmptySource),
            providers: Arc::new(EmptySource),
            conventions: Conventions::default(),
        }
    }

    #[must_use]
    pub fn with_types(mut self, source: impl TypeSource + 'static) -> Self {
        self.types = Arc::new(source);
        self
    }

    #[must_use]
    pub fn with_routes(mut self, source: impl RouteSource + 'static) -> Self {
        self.routes = Arc::new(source);
        self
    }

    #[must_use]
    pub fn with_events(mut self, source: impl EventSource + 'static) -> Self {
        self.events = Arc::new(source);
        self
    }

    #[must_use]
    pub fn with_views(mut self, source: impl ViewSource + 'static) -> Self {
        self.views = Arc::new(source);
        self
    }

    #[must_use]
    pub fn with_middleware(mut self, source: impl MiddlewareSource + 'static) -> Self {
        self.middleware = Arc::new(source);
        self
    }

    #[must_use]
    pub fn with_providers(mut self, source: impl ProviderSource + 'static) -> Self {
        self.providers = Arc::new(source);
        self
    }

    #[must_use]
    pub fn with_conventions(mut self, conventions: Conventions) -> Self {
        self.conventions = conventions;
        self
    }

    #[must_use]
    pub fn types(&self) -> Arc<dyn TypeSource> {
        Arc::clone(&self.types)
    }

    #[must_use]
    pub fn routes(&self) -> Arc<dyn RouteSource> {
        Arc::clone(&self.routes)
    }

    #[must_use]
    pub fn events(&self) -> Arc<dyn EventSource> {
        Arc::clone(&self.events)
    }

    #[must_use]
    pub fn views(&self) -> Arc<dyn ViewSource> {
        Arc::clone(&self.views)
    }

    #[must_use]
    pub fn middleware(&self) -> Arc<dyn MiddlewareSource> {
        Arc::clone(&self.middleware)
    }

    #[must_use]
    pub fn providers(&self) -> Arc<dyn ProviderSource> {
        Arc::clone(&self.providers)
    }

    #[must_use]
    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("conventions", &self.conventions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::MethodRecord;

    struct Snapshot(Vec<TypeRecord>);

    impl TypeSource for Snapshot {
        fn type_names(&self) -> Vec<String> {
            self.0.iter().map(|r| r.name.clone()).collect()
        }

        fn lookup(&self, name: &str) -> Option<TypeRecord> {
            self.0.iter().find(|r| r.name == name).cloned()
        }
    }

    // ========== Defaults ==========

    #[test]
    fn default_conventions_are_framework_flavored() {
        let conventions = Conventions::default();
        assert_eq!(conventions.queue_markers, vec!["ShouldQueue".to_string()]);
        assert_eq!(conventions.job_name_patterns.len(), 1);
        assert!(conventions.job_name_patterns[0].matches("SendInvoiceJob"));
        assert_eq!(conventions.model_bases, vec!["Model".to_string()]);
    }

    #[test]
    fn empty_host_finds_nothing() {
        let host = Host::new();
        assert!(host.types().type_names().is_empty());
        assert!(host.routes().routes().is_empty());
        assert!(host.events().events().is_empty());
        assert!(host.views().views().is_empty());
        assert!(host.middleware().aliases().is_empty());
        assert!(host.providers().providers().is_empty());
    }

    #[test]
    fn with_types_replaces_the_slot() {
        let host = Host::new().with_types(Snapshot(vec![TypeRecord::new(
            "App\\Thing",
            TypeKind::Class,
        )]));
        assert_eq!(host.types().type_names(), vec!["App\\Thing".to_string()]);
    }

    // ========== Job heuristic ==========

    fn job_snapshot() -> Snapshot {
        let mut marked = TypeRecord::new("App\\Services\\Mailer", TypeKind::Class);
        marked
            .interfaces
            .push("Illuminate\\Contracts\\Queue\\ShouldQueue".to_string());

        let mut abstract_job = TypeRecord::new("App\\ProcessBase", TypeKind::Class);
        abstract_job.is_abstract = true;
        abstract_job.methods.push(MethodRecord::new("handle"));

        Snapshot(vec![
            marked,
            TypeRecord::new("App\\SendInvoiceJob", TypeKind::Class),
            TypeRecord::new("App\\Jobs\\Prune", TypeKind::Class),
            TypeRecord::new("App\\Services\\Billing", TypeKind::Class),
            TypeRecord::new("App\\Contracts\\JobLike", TypeKind::Interface),
            abstract_job,
        ])
    }

    #[test]
    fn job_heuristic_accepts_marker_name_or_namespace() {
        let conventions = Conventions::default();
        let snapshot = job_snapshot();

        assert!(conventions.is_job(&snapshot, "App\\Services\\Mailer"));
        assert!(conventions.is_job(&snapshot, "App\\SendInvoiceJob"));
        assert!(conventions.is_job(&snapshot, "App\\Jobs\\Prune"));
        assert!(!conventions.is_job(&snapshot, "App\\Services\\Billing"));
    }

    #[test]
    fn job_heuristic_requires_a_class() {
        let conventions = Conventions::default();
        let snapshot = job_snapshot();

        assert!(!conventions.is_job(&snapshot, "App\\Contracts\\JobLike"));
        assert!(!conventions.is_job(&snapshot, "App\\Missing"));
    }

    // ========== Model heuristic ==========

    #[test]
    fn model_heuristic_requires_instantiable_subclass() {
        let mut user = TypeRecord::new("App\\Models\\User", TypeKind::Class);
        user.parent = Some("Framework\\Model".to_string());

        let mut draft = TypeRecord::new("App\\Models\\Draft", TypeKind::Class);
        draft.parent = Some("Framework\\Model".to_string());
        draft.is_abstract = true;

        let snapshot = Snapshot(vec![
            user,
            draft,
            TypeRecord::new("Framework\\Model", TypeKind::Class),
        ]);
        let conventions = Conventions::default();

        assert!(conventions.is_model(&snapshot, "App\\Models\\User"));
        assert!(!conventions.is_model(&snapshot, "App\\Models\\Draft"));
        assert!(!conventions.is_model(&snapshot, "Framework\\Model"));
    }

    #[test]
    fn relation_return_heuristic_is_fragment_based() {
        let conventions = Conventions::default();
        assert!(conventions.is_relation_return("Illuminate\\Database\\Eloquent\\Relations\\HasMany"));
        assert!(!conventions.is_relation_return("string"));
    }
}
