//! Event dispatcher queries.
//!
//! An [`EventSource`] exposes the dispatcher's event-to-listeners map;
//! [`EventQuery`] filters it by event name and listener. Listener entries are
//! whatever the host registered: class names, `Class@method` strings, or a
//! rendered closure marker.

use crate::name_match::{self, NameMatch};
use crate::trace::ChainTrace;
use crate::{IntrospectError, Query};
use std::fmt;
use std::sync::Arc;

/// One event with its registered listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventRecord {
    /// Event class name or string event name.
    pub name: String,
    /// Listener entries, in registration order.
    pub listeners: Vec<String>,
}

impl EventRecord {
    /// An event with no listeners.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_listeners(
        mut self,
        listeners: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.listeners = listeners.into_iter().map(Into::into).collect();
        self
    }
}

/// The host dispatcher's event map.
pub trait EventSource: Send + Sync {
    /// All known events, in the dispatcher's enumeration order.
    fn events(&self) -> Vec<EventRecord>;
}

/// Fluent queries over the event map.
pub struct EventQuery {
    source: Arc<dyn EventSource>,
    query: Query<EventRecord>,
}

impl EventQuery {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        let discover = Arc::clone(&source);
        let query = Query::new(move || discover.events());
        Self { source, query }
    }

    fn name_filter(mut self, matcher: NameMatch) -> Self {
        self.query = name_match::filter_on(self.query, "event", matcher, |e: &EventRecord| {
            e.name.as_str()
        });
        self
    }

    /// Keep events whose name matches a wildcard pattern.
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

    /// Keep events with at least one listener matching a wildcard pattern.
    ///
    /// # Errors
    ///
    /// Fails at registration when the pattern does not compile.
    pub fn where_listener(mut self, pattern: &str) -> Result<Self, IntrospectError> {
        let matcher = NameMatch::wildcard(pattern)?;
        let description = format!("any listener {matcher}");
        self.query = self.query.filter(description, move |e: &EventRecord| {
            e.listeners.iter().any(|l| matcher.matches(l))
        });
        Ok(self)
    }

    /// Keep events that have at least one listener.
    #[must_use]
    pub fn has_listeners(mut self) -> Self {
        self.query = self.query.filter("has listeners", |e: &EventRecord| {
            !e.listeners.is_empty()
        });
        self
    }

    /// Restrict the query to exactly these events instead of the live map.
    #[must_use]
    pub fn among(mut self, events: impl IntoIterator<Item = EventRecord>) -> Self {
        self.query = self.query.among(events);
        self
    }

    /// Open an OR-branch over the same event map. Nested `or` calls inside
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

    /// All matching events, in enumeration order.
    #[must_use]
    pub fn get(&self) -> Vec<EventRecord> {
        self.query.get()
    }

    /// First matching event, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<EventRecord> {
        self.query.first()
    }

    /// `true` if any event matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching events.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one event.
    #[must_use]
    pub fn explain(&self, event: &EventRecord) -> ChainTrace {
        self.query.explain(event)
    }
}

impl fmt::Debug for EventQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQuery")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
