//! The facade: one value that hands out every query builder.
//!
//! [`Introspect`] owns a [`Host`] and nothing else. Each method constructs
//! a fresh builder wired to the right source slot, so queries never share
//! state and the facade itself has nothing to invalidate. The single-entity
//! methods (`type_of`, `job`, `method`, `callable`) are the only fallible
//! entry points.

use crate::constants::ConstantQuery;
use crate::events::EventQuery;
use crate::host::Host;
use crate::jobs::{JobIntrospector, JobQuery};
use crate::methods::{CallableIntrospector, MethodIntrospector, MethodQuery};
use crate::middleware::MiddlewareQuery;
use crate::models::ModelQuery;
use crate::providers::ProviderQuery;
use crate::reflect::TypeKind;
use crate::routes::RouteQuery;
use crate::types::{TypeIntrospector, TypeQuery};
use crate::views::ViewQuery;
use crate::IntrospectError;

/// Entry point over one host snapshot.
///
/// # Example
///
/// ```
/// use scry::{Host, Introspect};
///
/// let scry = Introspect::new(Host::new());
///
/// assert_eq!(scry.classes().count(), 0);
/// assert!(!scry.routes().exists());
/// ```
#[derive(Debug)]
pub struct Introspect {
    host: Host,
}

impl Introspect {
    /// Wrap a host. Construction does no work.
    #[must_use]
    pub fn new(host: Host) -> Self {
        Self { host }
    }

    /// The wrapped host.
    #[must_use]
    pub fn host(&self) -> &Host {
        &self.host
    }

    // ========== Type queries ==========

    /// Query every declared type, whatever its kind.
    #[must_use]
    pub fn types(&self) -> TypeQuery {
        TypeQuery::new(self.host.types())
    }

    /// Query class declarations.
    #[must_use]
    pub fn classes(&self) -> TypeQuery {
        TypeQuery::of_kind(self.host.types(), TypeKind::Class)
    }

    /// Query interface declarations.
    #[must_use]
    pub fn interfaces(&self) -> TypeQuery {
        TypeQuery::of_kind(self.host.types(), TypeKind::Interface)
    }

    /// Query trait declarations.
    #[must_use]
    pub fn traits(&self) -> TypeQuery {
        TypeQuery::of_kind(self.host.types(), TypeKind::Trait)
    }

    /// Query enum declarations.
    #[must_use]
    pub fn enums(&self) -> TypeQuery {
        TypeQuery::of_kind(self.host.types(), TypeKind::Enum)
    }

    /// Query the methods visible on one type.
    #[must_use]
    pub fn methods_of(&self, type_name: impl Into<String>) -> MethodQuery {
        MethodQuery::new(self.host.types(), type_name)
    }

    /// Query the constants visible on one type.
    #[must_use]
    pub fn constants_of(&self, type_name: impl Into<String>) -> ConstantQuery {
        ConstantQuery::new(self.host.types(), type_name)
    }

    // ========== Convention-driven queries ==========

    /// Query classes the model heuristic accepts.
    #[must_use]
    pub fn models(&self) -> ModelQuery {
        ModelQuery::new(self.host.types(), self.host.conventions().clone())
    }

    /// Query classes the queue heuristic accepts.
    #[must_use]
    pub fn jobs(&self) -> JobQuery {
        JobQuery::new(self.host.types(), self.host.conventions().clone())
    }

    // ========== Registry queries ==========

    /// Query the route table.
    #[must_use]
    pub fn routes(&self) -> RouteQuery {
        RouteQuery::new(self.host.routes())
    }

    /// Query the event-to-listener registry.
    #[must_use]
    pub fn events(&self) -> EventQuery {
        EventQuery::new(self.host.events())
    }

    /// Query known view templates.
    #[must_use]
    pub fn views(&self) -> ViewQuery {
        ViewQuery::new(self.host.views())
    }

    /// Query the flattened middleware registry.
    #[must_use]
    pub fn middleware(&self) -> MiddlewareQuery {
        MiddlewareQuery::new(self.host.middleware())
    }

    /// Query registered service providers.
    #[must_use]
    pub fn providers(&self) -> ProviderQuery {
        ProviderQuery::new(self.host.providers())
    }

    // ========== Single-entity detail views ==========

    /// Detail view of one declared type.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::UnknownType`] when the type is absent.
    pub fn type_of(&self, name: &str) -> Result<TypeIntrospector, IntrospectError> {
        TypeIntrospector::new(self.host.types(), name)
    }

    /// Detail view of one dispatchable job class.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::UnknownType`] when the class is absent;
    /// [`IntrospectError::NotInstantiable`] when it cannot be constructed.
    pub fn job(&self, name: &str) -> Result<JobIntrospector, IntrospectError> {
        JobIntrospector::new(self.host.types(), self.host.conventions().clone(), name)
    }

    /// Detail view of one method, resolved through the member walk.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::UnknownType`] or
    /// [`IntrospectError::UnknownMethod`] when either half is missing.
    pub fn method(
        &self,
        type_name: &str,
        method: &str,
    ) -> Result<MethodIntrospector, IntrospectError> {
        MethodIntrospector::new(self.host.types().as_ref(), type_name, method)
    }

    /// Detail view of a `"Type::method"` callable target.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::MalformedCallable`] for a target not of that
    /// shape, otherwise the resolution errors of the two halves.
    pub fn callable(&self, target: &str) -> Result<CallableIntrospector, IntrospectError> {
        CallableIntrospector::new(self.host.types(), target)
    }
}

#[cfg(test)]
mod tests {
    use scry_fixture::prelude::*;
    use scry_fixture::{FixtureHost, MethodFixture, PropertyFixture, TypeFixture};

    fn host() -> Host {
        FixtureHost::new()
            .with_type(
                TypeFixture::class("App\\Models\\User")
                    .with_parent("Framework\\Database\\Model")
                    .with_method(
                        MethodFixture::new("posts").returns("Framework\\Relations\\HasMany"),
                    )
                    .with_constant("CREATED_AT", "'created_at'"),
            )
            .with_type(TypeFixture::class("Framework\\Database\\Model"))
            .with_type(
                TypeFixture::class("App\\Jobs\\SendWelcomeEmail")
                    .with_interface("Illuminate\\Contracts\\Queue\\ShouldQueue")
                    .with_property(PropertyFixture::new("queue").with_default("'emails'")),
            )
            .with_type(TypeFixture::interface("App\\Contracts\\Billable"))
            .with_type(TypeFixture::trait_("Framework\\Database\\SoftDeletes"))
            .with_type(TypeFixture::enum_("App\\Enums\\Status"))
            .with_route(
                RouteRecord::new("users")
                    .with_name("users.index")
                    .with_handler("App\\Http\\Controllers\\UserController", "index"),
            )
            .with_event(EventRecord::new("App\\Events\\UserRegistered"))
            .with_template(
                ViewRecord::new("layouts.app", "resources/views/layouts/app.blade.php"),
                "<html></html>",
            )
            .with_alias("auth", "App\\Http\\Middleware\\Authenticate")
            .with_provider("App\\Providers\\AppServiceProvider")
            .into_host()
    }

    fn scry() -> Introspect {
        Introspect::new(host())
    }

    // ========== Builder dispatch ==========

    #[test]
    fn kind_preset_queries_partition_the_snapshot() {
        let scry = scry();
        assert_eq!(scry.types().count(), 6);
        assert_eq!(scry.classes().count(), 3);
        assert_eq!(scry.interfaces().count(), 1);
        assert_eq!(scry.traits().count(), 1);
        assert_eq!(scry.enums().count(), 1);
    }

    #[test]
    fn convention_queries_use_the_host_conventions() {
        let scry = scry();
        assert_eq!(scry.models().get(), vec!["App\\Models\\User".to_string()]);
        assert_eq!(
            scry.jobs().get(),
            vec!["App\\Jobs\\SendWelcomeEmail".to_string()]
        );
    }

    #[test]
    fn registry_queries_reach_their_slots() {
        let scry = scry();
        assert!(scry.routes().where_name_equals("users.index").exists());
        assert_eq!(scry.events().count(), 1);
        assert!(scry.views().where_name_equals("layouts.app").exists());
        assert!(scry.middleware().where_alias("auth").exists());
        assert_eq!(scry.providers().count(), 1);
    }

    #[test]
    fn member_queries_walk_the_snapshot() {
        let scry = scry();
        assert!(scry.methods_of("App\\Models\\User").where_name_equals("posts").exists());
        assert_eq!(scry.constants_of("App\\Models\\User").count(), 1);
        assert!(!scry.methods_of("App\\Missing").exists());
    }

    #[test]
    fn each_call_builds_a_fresh_query() {
        let scry = scry();
        let narrowed = scry.classes().where_name_contains("User");
        assert_eq!(narrowed.count(), 1);
        // The facade is unaffected by the consumed builder above.
        assert_eq!(scry.classes().count(), 3);
    }

    // ========== Single-entity dispatch ==========

    #[test]
    fn detail_views_resolve_through_the_facade() {
        let scry = scry();
        assert_eq!(scry.type_of("App\\Models\\User").unwrap().short_name(), "User");
        assert_eq!(
            scry.job("App\\Jobs\\SendWelcomeEmail").unwrap().queue().value(),
            Some(&"emails".to_string())
        );
        assert_eq!(
            scry.method("App\\Models\\User", "posts").unwrap().return_type().as_deref(),
            Some("Framework\\Relations\\HasMany")
        );
        assert_eq!(
            scry.callable("App\\Models\\User::posts").unwrap().target_type().short_name(),
            "User"
        );
    }

    #[test]
    fn detail_views_hard_fail_on_bad_targets() {
        let scry = scry();
        assert!(matches!(
            scry.type_of("App\\Missing"),
            Err(IntrospectError::UnknownType { .. })
        ));
        assert!(matches!(
            scry.job("App\\Contracts\\Billable"),
            Err(IntrospectError::NotInstantiable { .. })
        ));
        assert!(matches!(
            scry.method("App\\Models\\User", "missing"),
            Err(IntrospectError::UnknownMethod { .. })
        ));
        assert!(matches!(
            scry.callable("not-a-callable"),
            Err(IntrospectError::MalformedCallable { .. })
        ));
    }

    #[test]
    fn empty_host_answers_empty_everywhere() {
        let scry = Introspect::new(Host::new());
        assert_eq!(scry.types().count(), 0);
        assert!(!scry.routes().exists());
        assert!(!scry.models().exists());
        assert!(scry.host().types().type_names().is_empty());
    }
}
