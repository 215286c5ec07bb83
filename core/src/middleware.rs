//! Middleware registry queries.
//!
//! The host registers middleware in four places: an alias map, named groups,
//! the global stack, and a priority order. [`MiddlewareQuery`] flattens all
//! four into one [`MiddlewareRecord`] per class (first-seen order: aliases,
//! groups, global, priority) and filters over that, so "where is this class
//! registered" is a single query instead of four lookups.

use crate::name_match::{self, NameMatch};
use crate::trace::ChainTrace;
use crate::{IntrospectError, Query};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One middleware class with everything the registry says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MiddlewareRecord {
    /// Middleware class name.
    pub class: String,
    /// Aliases pointing at this class.
    pub aliases: Vec<String>,
    /// Groups containing this class.
    pub groups: Vec<String>,
    /// Member of the global stack.
    pub global: bool,
    /// Position in the priority order, when listed there.
    pub priority: Option<usize>,
}

impl MiddlewareRecord {
    /// An unregistered record: no aliases, no groups, not global, no
    /// priority.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            aliases: Vec::new(),
            groups: Vec::new(),
            global: false,
            priority: None,
        }
    }
}

/// The host's middleware registry, slot by slot.
pub trait MiddlewareSource: Send + Sync {
    /// `(alias, class)` pairs, in registration order.
    fn aliases(&self) -> Vec<(String, String)>;

    /// `(group, classes)` pairs, in registration order.
    fn groups(&self) -> Vec<(String, Vec<String>)>;

    /// The global stack, in execution order.
    fn global(&self) -> Vec<String>;

    /// The priority order, highest first.
    fn priority(&self) -> Vec<String>;
}

fn slot<'a>(
    records: &'a mut Vec<MiddlewareRecord>,
    index: &mut HashMap<String, usize>,
    class: &str,
) -> &'a mut MiddlewareRecord {
    if let Some(&i) = index.get(class) {
        return &mut records[i];
    }
    index.insert(class.to_string(), records.len());
    records.push(MiddlewareRecord::new(class));
    let last = records.len() - 1;
    &mut records[last]
}

/// One record per class, merging every registry slot that mentions it.
fn flatten(source: &dyn MiddlewareSource) -> Vec<MiddlewareRecord> {
    let mut records = Vec::new();
    let mut index = HashMap::new();

    for (alias, class) in source.aliases() {
        slot(&mut records, &mut index, &class).aliases.push(alias);
    }
    for (group, classes) in source.groups() {
        for class in classes {
            let record = slot(&mut records, &mut index, &class);
            if !record.groups.contains(&group) {
                record.groups.push(group.clone());
            }
        }
    }
    for class in source.global() {
        slot(&mut records, &mut index, &class).global = true;
    }
    for (position, class) in source.priority().into_iter().enumerate() {
        slot(&mut records, &mut index, &class).priority = Some(position);
    }
    records
}

/// Fluent queries over the flattened middleware registry.
pub struct MiddlewareQuery {
    source: Arc<dyn MiddlewareSource>,
    query: Query<MiddlewareRecord>,
}

impl MiddlewareQuery {
    pub fn new(source: Arc<dyn MiddlewareSource>) -> Self {
        let discover = Arc::clone(&source);
        let query = Query::new(move || flatten(&*discover));
        Self { source, query }
    }

    fn class_filter(mut self, matcher: NameMatch) -> Self {
        self.query = name_match::filter_on(self.query, "class", matcher, |m: &MiddlewareRecord| {
            m.class.as_str()
        });
        self
    }

    /// Keep middleware whose class name matches a wildcard pattern.
    ///
    /// # Errors
    ///
    /// Fails at registration when the pattern does not compile.
    pub fn where_name(self, pattern: &str) -> Result<Self, IntrospectError> {
        Ok(self.class_filter(NameMatch::wildcard(pattern)?))
    }

    #[must_use]
    pub fn where_name_equals(self, class: impl Into<String>) -> Self {
        self.class_filter(NameMatch::Equals(class.into()))
    }

    #[must_use]
    pub fn where_name_starts_with(self, prefix: impl Into<String>) -> Self {
        self.class_filter(NameMatch::StartsWith(prefix.into()))
    }

    #[must_use]
    pub fn where_name_ends_with(self, suffix: impl Into<String>) -> Self {
        self.class_filter(NameMatch::EndsWith(suffix.into()))
    }

    #[must_use]
    pub fn where_name_contains(self, needle: impl Into<String>) -> Self {
        self.class_filter(NameMatch::Contains(needle.into()))
    }

    /// Keep middleware registered under exactly this alias.
    #[must_use]
    pub fn where_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        let description = format!("aliased as \"{alias}\"");
        self.query = self.query.filter(description, move |m: &MiddlewareRecord| {
            m.aliases.contains(&alias)
        });
        self
    }

    /// Keep middleware belonging to a group.
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        let description = format!("in group \"{group}\"");
        self.query = self.query.filter(description, move |m: &MiddlewareRecord| {
            m.groups.contains(&group)
        });
        self
    }

    /// Keep middleware on the global stack.
    #[must_use]
    pub fn global_only(mut self) -> Self {
        self.query = self
            .query
            .filter("on the global stack", |m: &MiddlewareRecord| m.global);
        self
    }

    /// Keep middleware listed in the priority order.
    #[must_use]
    pub fn prioritized(mut self) -> Self {
        self.query = self.query.filter("in the priority order", |m: &MiddlewareRecord| {
            m.priority.is_some()
        });
        self
    }

    /// Restrict the query to exactly these records instead of the live
    /// registry.
    #[must_use]
    pub fn among(mut self, middleware: impl IntoIterator<Item = MiddlewareRecord>) -> Self {
        self.query = self.query.among(middleware);
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

    /// All matching middleware, in first-seen registry order.
    #[must_use]
    pub fn get(&self) -> Vec<MiddlewareRecord> {
        self.query.get()
    }

    /// First matching middleware, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<MiddlewareRecord> {
        self.query.first()
    }

    /// `true` if any middleware matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching middleware.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one record.
    #[must_use]
    pub fn explain(&self, middleware: &MiddlewareRecord) -> ChainTrace {
        self.query.explain(middleware)
    }
}

impl fmt::Debug for MiddlewareQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareQuery")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Registry;

    impl MiddlewareSource for Registry {
        fn aliases(&self) -> Vec<(String, String)> {
            vec![
                ("auth".to_string(), "App\\Http\\Middleware\\Authenticate".to_string()),
                (
                    "throttle".to_string(),
                    "Framework\\Middleware\\ThrottleRequests".to_string(),
                ),
            ]
        }

        fn groups(&self) -> Vec<(String, Vec<String>)> {
            vec![
                (
                    "web".to_string(),
                    vec![
                        "Framework\\Middleware\\EncryptCookies".to_string(),
                        "Framework\\Middleware\\StartSession".to_string(),
                    ],
                ),
                (
                    "api".to_string(),
                    vec!["Framework\\Middleware\\ThrottleRequests".to_string()],
                ),
            ]
        }

        fn global(&self) -> Vec<String> {
            vec!["Framework\\Middleware\\TrimStrings".to_string()]
        }

        fn priority(&self) -> Vec<String> {
            vec![
                "Framework\\Middleware\\StartSession".to_string(),
                "App\\Http\\Middleware\\Authenticate".to_string(),
            ]
        }
    }

    fn registry() -> Arc<dyn MiddlewareSource> {
        Arc::new(Registry)
    }

    // ========== Flattening ==========

    #[test]
    fn flattens_in_first_seen_order() {
        let classes: Vec<String> = MiddlewareQuery::new(registry())
            .get()
            .into_iter()
            .map(|m| m.class)
            .collect();
        assert_eq!(
            classes,
            vec![
                "App\\Http\\Middleware\\Authenticate",
                "Framework\\Middleware\\ThrottleRequests",
                "Framework\\Middleware\\EncryptCookies",
                "Framework\\Middleware\\StartSession",
                "Framework\\Middleware\\TrimStrings",
            ]
        );
    }

    #[test]
    fn slots_merge_per_class() {
        let throttle = MiddlewareQuery::new(registry())
            .where_alias("throttle")
            .first()
            .unwrap();
        assert_eq!(throttle.aliases, vec!["throttle".to_string()]);
        assert_eq!(throttle.groups, vec!["api".to_string()]);
        assert!(!throttle.global);
        assert_eq!(throttle.priority, None);
    }

    #[test]
    fn priority_records_position() {
        let auth = MiddlewareQuery::new(registry())
            .where_alias("auth")
            .first()
            .unwrap();
        assert_eq!(auth.priority, Some(1));
    }

    // ========== Filters ==========

    #[test]
    fn in_group_filters() {
        assert_eq!(MiddlewareQuery::new(registry()).in_group("web").count(), 2);
    }

    #[test]
    fn global_only_filters() {
        let globals = MiddlewareQuery::new(registry()).global_only().get();
        assert_eq!(globals.len(), 1);
        assert_eq!(globals[0].class, "Framework\\Middleware\\TrimStrings");
    }

    #[test]
    fn prioritized_filters() {
        assert_eq!(MiddlewareQuery::new(registry()).prioritized().count(), 2);
    }

    #[test]
    fn class_name_family() {
        let query = MiddlewareQuery::new(registry()).where_name_ends_with("Session");
        assert_eq!(query.count(), 1);

        let query = MiddlewareQuery::new(registry())
            .where_name("App\\*")
            .unwrap();
        assert_eq!(query.count(), 1);
    }

    #[test]
    fn or_branch_unions() {
        let query = MiddlewareQuery::new(registry())
            .global_only()
            .or(|q| Ok(q.where_alias("auth")))
            .unwrap();
        assert_eq!(query.count(), 2);
    }
}
