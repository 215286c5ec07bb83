//! Class-constant queries.
//!
//! Candidates are the [`ConstantRecord`]s visible on one type, including
//! inherited constants and interface constants. Values are the raw literal
//! spellings captured by the snapshot, so [`ConstantQuery::where_value_equals`]
//! compares text, not evaluated values.

use crate::name_match::{self, NameMatch};
use crate::reflect::{ConstantRecord, TypeSource, TypeSourceExt, Visibility};
use crate::trace::ChainTrace;
use crate::{IntrospectError, Query};
use std::fmt;
use std::sync::Arc;

/// Fluent queries over the constants visible on one type.
pub struct ConstantQuery {
    source: Arc<dyn TypeSource>,
    type_name: String,
    query: Query<ConstantRecord>,
}

impl ConstantQuery {
    /// Query the constants of `type_name`. An unknown type produces an
    /// empty candidate set, not an error.
    pub fn new(source: Arc<dyn TypeSource>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let discover = Arc::clone(&source);
        let discover_name = type_name.clone();
        let query = Query::new(move || discover.all_constants(&discover_name));
        Self {
            source,
            type_name,
            query,
        }
    }

    fn name_filter(mut self, matcher: NameMatch) -> Self {
        self.query =
            name_match::filter_on(self.query, "constant", matcher, |c: &ConstantRecord| {
                c.name.as_str()
            });
        self
    }

    /// Keep constants whose name matches a wildcard pattern.
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

    /// Keep constants with exactly this visibility.
    #[must_use]
    pub fn where_visibility(mut self, visibility: Visibility) -> Self {
        let description = format!("visibility {visibility}");
        self.query = self.query.filter(description, move |c: &ConstantRecord| {
            c.visibility == visibility
        });
        self
    }

    /// Keep constants whose raw literal value equals `value` exactly.
    #[must_use]
    pub fn where_value_equals(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        let description = format!("value is {value}");
        self.query = self
            .query
            .filter(description, move |c: &ConstantRecord| c.value == value);
        self
    }

    /// Restrict the query to exactly these records instead of the snapshot.
    #[must_use]
    pub fn among(mut self, constants: impl IntoIterator<Item = ConstantRecord>) -> Self {
        self.query = self.query.among(constants);
        self
    }

    /// Open an OR-branch over the same type's constants. Nested `or` calls
    /// inside the callback are ignored.
    ///
    /// # Errors
    ///
    /// Propagates pattern-compilation failures from inside the callback.
    pub fn or(
        mut self,
        build: impl FnOnce(Self) -> Result<Self, IntrospectError>,
    ) -> Result<Self, IntrospectError> {
        let nested = build(Self::new(Arc::clone(&self.source), self.type_name.clone()))?;
        self.query = self.query.branch(nested.query.into_chain());
        Ok(self)
    }

    /// All matching constant records, in resolution order.
    #[must_use]
    pub fn get(&self) -> Vec<ConstantRecord> {
        self.query.get()
    }

    /// First matching record, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<ConstantRecord> {
        self.query.first()
    }

    /// `true` if any constant matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching constants.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one record.
    #[must_use]
    pub fn explain(&self, constant: &ConstantRecord) -> ChainTrace {
        self.query.explain(constant)
    }
}

impl fmt::Debug for ConstantQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantQuery")
            .field("type_name", &self.type_name)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
