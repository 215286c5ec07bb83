//! scry-fixture: in-memory hosts for conformance testing
//!
//! A [`FixtureHost`] is one value implementing every source trait scry
//! queries against, fed by plain builder calls instead of a real framework
//! boot. It is the reference host: predictable, insertion-ordered, and
//! cheap to assemble per test.
//!
//! # Example
//!
//! ```
//! use scry_fixture::prelude::*;
//!
//! let host = FixtureHost::new()
//!     .with_type(
//!         TypeFixture::class("App\\Services\\Billing")
//!             .with_method(MethodFixture::new("invoice")),
//!     )
//!     .with_route(RouteRecord::new("billing").with_name("billing.show"))
//!     .into_host();
//!
//! let scry = Introspect::new(host);
//! assert!(scry.classes().exists());
//! assert!(scry.routes().where_name("billing.*")?.exists());
//! # Ok::<(), scry::IntrospectError>(())
//! ```

use scry::{
    Conventions, DeferredService, EventRecord, EventSource, Host, MiddlewareSource,
    ProviderSource, RouteRecord, RouteSource, TypeRecord, TypeSource, ViewRecord, ViewSource,
};
use std::collections::HashMap;

mod types;

pub use types::{MethodFixture, ParamFixture, PropertyFixture, TypeFixture};

/// An in-memory host: every registry scry can query, as plain vectors.
///
/// Enumeration order is insertion order throughout. `into_host` clones the
/// fixture into each source slot of a [`Host`], so the one value serves all
/// six traits.
#[derive(Debug, Clone, Default)]
pub struct FixtureHost {
    types: Vec<TypeRecord>,
    routes: Vec<RouteRecord>,
    events: Vec<EventRecord>,
    views: Vec<ViewRecord>,
    /// Template text keyed by view name.
    templates: HashMap<String, String>,
    aliases: Vec<(String, String)>,
    groups: Vec<(String, Vec<String>)>,
    global: Vec<String>,
    priority: Vec<String>,
    providers: Vec<String>,
    deferred: Vec<DeferredService>,
}

impl FixtureHost {
    /// An empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type declaration (a [`TypeFixture`] or a raw [`TypeRecord`]).
    #[must_use]
    pub fn with_type(mut self, fixture: impl Into<TypeRecord>) -> Self {
        self.types.push(fixture.into());
        self
    }

    /// Add a route.
    #[must_use]
    pub fn with_route(mut self, route: RouteRecord) -> Self {
        self.routes.push(route);
        self
    }

    /// Add an event registration.
    #[must_use]
    pub fn with_event(mut self, event: EventRecord) -> Self {
        self.events.push(event);
        self
    }

    /// Add a known view without template contents (its contents read as
    /// unavailable).
    #[must_use]
    pub fn with_view(mut self, view: ViewRecord) -> Self {
        self.views.push(view);
        self
    }

    /// Add a known view together with its template text.
    #[must_use]
    pub fn with_template(mut self, view: ViewRecord, contents: impl Into<String>) -> Self {
        self.templates.insert(view.name.clone(), contents.into());
        self.views.push(view);
        self
    }

    /// Register a middleware alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>, class: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), class.into()));
        self
    }

    /// Register a middleware group.
    #[must_use]
    pub fn with_group(
        mut self,
        group: impl Into<String>,
        classes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.groups
            .push((group.into(), classes.into_iter().map(Into::into).collect()));
        self
    }

    /// Append a global middleware.
    #[must_use]
    pub fn with_global(mut self, class: impl Into<String>) -> Self {
        self.global.push(class.into());
        self
    }

    /// Set the middleware priority order (replaces any previous order).
    #[must_use]
    pub fn with_priority(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.priority = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Register a service provider.
    #[must_use]
    pub fn with_provider(mut self, class: impl Into<String>) -> Self {
        self.providers.push(class.into());
        self
    }

    /// Register a deferred service binding.
    #[must_use]
    pub fn with_deferred(mut self, service: impl Into<String>, provider: impl Into<String>) -> Self {
        self.deferred.push(DeferredService::new(service, provider));
        self
    }

    /// Wire this fixture into every source slot of a [`Host`] with default
    /// conventions.
    #[must_use]
    pub fn into_host(self) -> Host {
        Host::new()
            .with_types(self.clone())
            .with_routes(self.clone())
            .with_events(self.clone())
            .with_views(self.clone())
            .with_middleware(self.clone())
            .with_providers(self)
    }

    /// Like [`into_host`](Self::into_host), with explicit conventions.
    #[must_use]
    pub fn into_host_with(self, conventions: Conventions) -> Host {
        self.into_host().with_conventions(conventions)
    }
}

impl TypeSource for FixtureHost {
    fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|r| r.name.clone()).collect()
    }

    fn lookup(&self, name: &str) -> Option<TypeRecord> {
        self.types.iter().find(|r| r.name == name).cloned()
    }
}

impl RouteSource for FixtureHost {
    fn routes(&self) -> Vec<RouteRecord> {
        self.routes.clone()
    }
}

impl EventSource for FixtureHost {
    fn events(&self) -> Vec<EventRecord> {
        self.events.clone()
    }
}

impl ViewSource for FixtureHost {
    fn views(&self) -> Vec<ViewRecord> {
        self.views.clone()
    }

    fn contents(&self, view: &ViewRecord) -> Option<String> {
        self.templates.get(&view.name).cloned()
    }
}

impl MiddlewareSource for FixtureHost {
    fn aliases(&self) -> Vec<(String, String)> {
        self.aliases.clone()
    }

    fn groups(&self) -> Vec<(String, Vec<String>)> {
        self.groups.clone()
    }

    fn global(&self) -> Vec<String> {
        self.global.clone()
    }

    fn priority(&self) -> Vec<String> {
        self.priority.clone()
    }
}

impl ProviderSource for FixtureHost {
    fn providers(&self) -> Vec<String> {
        self.providers.clone()
    }

    fn deferred(&self) -> Vec<DeferredService> {
        self.deferred.clone()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{FixtureHost, MethodFixture, ParamFixture, PropertyFixture, TypeFixture};
    pub use scry::prelude::*;
}
