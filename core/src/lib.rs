//! scry - fluent introspection queries over explicit application registries
//!
//! A query-composition layer for inspecting a host application's structure:
//! its declared types, routes, event listeners, queue jobs, models, views,
//! middleware, and service providers.
//!
//! # Architecture
//!
//! The engine is a small declarative predicate-combinator system applied
//! lazily over an enumerated candidate universe:
//!
//! - [`Pattern`] — Wildcard pattern (`*`) compiled to an anchored matcher
//! - [`NameMatch`] — Declarative name predicates (equals, prefix, suffix, contains, wildcard)
//! - [`Filter<C>`] — Predicate over one candidate value
//! - [`FilterChain<C>`] — Primary AND chain plus independent OR branches
//! - [`CandidateSource<C>`] — Explicit list or live discovery via [`Discover<C>`]
//! - [`Query<C>`] — Accumulate-then-evaluate engine with `get`/`first`/`exists`/`count`
//!
//! On top of the engine, one query builder per entity kind ([`TypeQuery`],
//! [`RouteQuery`], [`JobQuery`], ...) adapts entity fields and capability
//! lookups into filters, and [`Introspect`] dispatches builders over an
//! injected [`Host`].
//!
//! # Key Design Insights
//!
//! 1. **Filters compile once**: wildcard patterns are validated and compiled
//!    at filter-registration time, never per candidate. Invalid patterns fail
//!    fast with [`IntrospectError::InvalidPattern`].
//!
//! 2. **Lookup miss → `false`**: capability filters degrade to `false` (and
//!    accessors to `None`/empty) when a target is absent. Only single-entity
//!    introspector construction hard-fails. This keeps chains composable:
//!    an impossible condition yields zero matches, never an error.
//!
//! 3. **Explicit injection**: every candidate source receives its registry
//!    snapshot as a constructor parameter ([`Host`] bundles them). Nothing
//!    reaches into ambient globals, so the whole layer is testable without a
//!    running host framework.
//!
//! # Example
//!
//! ```
//! use scry::prelude::*;
//!
//! let names = vec![
//!     "App\\Http\\Controllers\\UserController".to_string(),
//!     "App\\Http\\Controllers\\PostController".to_string(),
//!     "App\\Services\\Billing".to_string(),
//! ];
//!
//! let query = Query::new(move || names.clone())
//!     .filter("name ends with Controller", |name: &String| {
//!         name.ends_with("Controller")
//!     });
//!
//! assert_eq!(query.count(), 2);
//! assert_eq!(
//!     query.first().as_deref(),
//!     Some("App\\Http\\Controllers\\UserController"),
//! );
//! ```
//!
//! Entity builders are reached through the facade:
//!
//! ```
//! use scry::prelude::*;
//!
//! let scry = Introspect::new(Host::new());
//!
//! // Empty host: discovery finds nothing, and that is not an error.
//! assert!(!scry.routes().exists());
//! assert_eq!(scry.classes().count(), 0);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod chain;
mod constants;
mod events;
mod facade;
mod filter;
mod host;
mod jobs;
mod methods;
mod middleware;
mod models;
mod name_match;
mod pattern;
mod providers;
mod query;
mod reflect;
mod routes;
mod source;
mod trace;
mod types;
mod views;

pub mod docblock;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Engine
pub use chain::FilterChain;
pub use filter::Filter;
pub use name_match::NameMatch;
pub use pattern::Pattern;
pub use query::Query;
pub use source::{CandidateSource, Discover};
pub use trace::{BranchTrace, ChainTrace, FilterTrace};

// Host model
pub use host::{Conventions, Host};
pub use reflect::{
    fqn_matches, namespace_of, normalize_type, short_name, AttributeRecord, ConstantRecord,
    MethodRecord, ParamRecord, PropertyRecord, TypeKind, TypeRecord, TypeSource, TypeSourceExt,
    Visibility, CONSTRUCTOR,
};

// Registry sources and records
pub use events::{EventQuery, EventRecord, EventSource};
pub use middleware::{MiddlewareQuery, MiddlewareRecord, MiddlewareSource};
pub use providers::{DeferredService, ProviderQuery, ProviderSource};
pub use routes::{RouteQuery, RouteRecord, RouteSource};
pub use views::{ViewQuery, ViewRecord, ViewSource};

// Entity queries and introspectors
pub use constants::ConstantQuery;
pub use facade::Introspect;
pub use jobs::{JobIntrospector, JobQuery, StaticProp};
pub use methods::{CallableIntrospector, MethodIntrospector, MethodQuery};
pub use models::ModelQuery;
pub use types::{TypeIntrospector, TypeQuery};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use scry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AttributeRecord,
        BranchTrace,
        CallableIntrospector,
        // Engine
        CandidateSource,
        ChainTrace,
        ConstantQuery,
        ConstantRecord,
        // Host model
        Conventions,
        DeferredService,
        Discover,
        EventQuery,
        EventRecord,
        EventSource,
        Filter,
        FilterChain,
        FilterTrace,
        Host,
        // Facade
        Introspect,
        // Errors
        IntrospectError,
        JobIntrospector,
        JobQuery,
        MethodIntrospector,
        MethodQuery,
        MethodRecord,
        MiddlewareQuery,
        MiddlewareRecord,
        MiddlewareSource,
        ModelQuery,
        NameMatch,
        ParamRecord,
        Pattern,
        PropertyRecord,
        ProviderQuery,
        ProviderSource,
        Query,
        RouteQuery,
        RouteRecord,
        RouteSource,
        StaticProp,
        TypeIntrospector,
        TypeKind,
        TypeQuery,
        TypeRecord,
        TypeSource,
        TypeSourceExt,
        ViewQuery,
        ViewRecord,
        ViewSource,
        Visibility,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length for wildcard patterns.
///
/// Every pattern reaches the regex engine after escaping, and compilation cost
/// grows with pattern length even for the linear-time engine. Enforced eagerly
/// by [`Pattern::compile`].
pub const MAX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from filter registration and single-entity introspector construction.
///
/// Nothing in this enum is produced during candidate evaluation: a filter that
/// cannot find its target simply does not match. These errors surface where a
/// caller named something specific — a wildcard pattern that does not compile,
/// or a single type/method/job/callable that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntrospectError {
    /// A wildcard pattern was rejected by the regex engine.
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        source: String,
    },
    /// A wildcard pattern exceeds [`MAX_PATTERN_LENGTH`].
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// A single-entity target is not present in the type snapshot.
    UnknownType {
        /// The qualified name that was requested.
        name: String,
    },
    /// A single-entity target exists but cannot be introspected as requested.
    NotInstantiable {
        /// The qualified name that was requested.
        name: String,
        /// Why the target is rejected (e.g. `"abstract class"`, `"interface"`).
        reason: String,
    },
    /// A method introspector target does not exist on its type.
    UnknownMethod {
        /// The qualified type name.
        type_name: String,
        /// The missing method name.
        method: String,
    },
    /// A callable target string is not of the `Type::method` shape.
    MalformedCallable {
        /// The string that failed to parse.
        target: String,
    },
}

impl std::fmt::Display for IntrospectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern \"{pattern}\": {source}")
            }
            Self::PatternTooLong { len, max } => {
                write!(f, "pattern length is {len}, but maximum allowed is {max}")
            }
            Self::UnknownType { name } => {
                write!(f, "unknown type \"{name}\": not present in the host snapshot")
            }
            Self::NotInstantiable { name, reason } => {
                write!(f, "type \"{name}\" cannot be introspected here: {reason}")
            }
            Self::UnknownMethod { type_name, method } => {
                write!(f, "type \"{type_name}\" has no method \"{method}\"")
            }
            Self::MalformedCallable { target } => {
                write!(
                    f,
                    "malformed callable \"{target}\": expected \"Type::method\""
                )
            }
        }
    }
}

impl std::error::Error for IntrospectError {}
