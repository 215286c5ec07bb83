//! Method-level queries and detail views.
//!
//! [`MethodQuery`] runs over every method visible on one type (own,
//! inherited, trait-provided), so the candidates are full [`MethodRecord`]s
//! rather than names and most filters read record fields directly. An
//! unknown owning type yields an empty query rather than an error; the
//! detail views below are the strict counterpart.
//!
//! [`CallableIntrospector`] resolves a `"Type::method"` string the way
//! framework router tables and queue payloads spell callables, and exposes
//! both halves as detail views.

use crate::docblock;
use crate::name_match::{self, NameMatch};
use crate::reflect::{
    AttributeRecord, MethodRecord, ParamRecord, TypeSource, TypeSourceExt, Visibility,
};
use crate::trace::ChainTrace;
use crate::types::TypeIntrospector;
use crate::{IntrospectError, Pattern, Query};
use std::fmt;
use std::sync::Arc;

/// Fluent queries over the methods visible on one type.
pub struct MethodQuery {
    source: Arc<dyn TypeSource>,
    type_name: String,
    query: Query<MethodRecord>,
}

impl MethodQuery {
    /// Query the methods of `type_name`. An unknown type produces an empty
    /// candidate set, not an error.
    pub fn new(source: Arc<dyn TypeSource>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let discover = Arc::clone(&source);
        let discover_name = type_name.clone();
        let query = Query::new(move || discover.all_methods(&discover_name));
        Self {
            source,
            type_name,
            query,
        }
    }

    fn name_filter(mut self, matcher: NameMatch) -> Self {
        self.query =
            name_match::filter_on(self.query, "method", matcher, |m: &MethodRecord| {
                m.name.as_str()
            });
        self
    }

    /// Keep methods whose name matches a wildcard pattern.
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

    /// Keep public methods.
    #[must_use]
    pub fn public_only(mut self) -> Self {
        self.query = self
            .query
            .filter("public", |m: &MethodRecord| m.visibility.is_public());
        self
    }

    /// Keep methods with exactly this visibility.
    #[must_use]
    pub fn where_visibility(mut self, visibility: Visibility) -> Self {
        let description = format!("visibility {visibility}");
        self.query = self
            .query
            .filter(description, move |m: &MethodRecord| m.visibility == visibility);
        self
    }

    /// Keep static methods.
    #[must_use]
    pub fn where_static(mut self) -> Self {
        self.query = self.query.filter("static", |m: &MethodRecord| m.is_static);
        self
    }

    /// Keep abstract methods.
    #[must_use]
    pub fn where_abstract(mut self) -> Self {
        self.query = self
            .query
            .filter("abstract", |m: &MethodRecord| m.is_abstract);
        self
    }

    /// Keep final methods.
    #[must_use]
    pub fn where_final(mut self) -> Self {
        self.query = self.query.filter("final", |m: &MethodRecord| m.is_final);
        self
    }

    /// Keep methods whose normalized return type matches a wildcard pattern.
    /// Methods with no declared return type never match.
    ///
    /// # Errors
    ///
    /// Fails at registration when the pattern does not compile.
    pub fn where_returns(mut self, pattern: &str) -> Result<Self, IntrospectError> {
        let compiled = Pattern::compile(pattern)?;
        let description = format!("returns {compiled}");
        self.query = self.query.filter(description, move |m: &MethodRecord| {
            m.return_type_normalized()
                .is_some_and(|t| compiled.matches(&t))
        });
        Ok(self)
    }

    /// Keep methods carrying an attribute (exact or trailing-segment name).
    #[must_use]
    pub fn has_attribute(mut self, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        let description = format!("has attribute \"{attribute}\"");
        self.query = self
            .query
            .filter(description, move |m: &MethodRecord| m.has_attribute(&attribute));
        self
    }

    /// Keep methods declaring exactly `count` parameters.
    #[must_use]
    pub fn where_param_count(mut self, count: usize) -> Self {
        let description = format!("takes {count} params");
        self.query = self
            .query
            .filter(description, move |m: &MethodRecord| m.params.len() == count);
        self
    }

    /// Restrict the query to exactly these records instead of the snapshot.
    #[must_use]
    pub fn among(mut self, methods: impl IntoIterator<Item = MethodRecord>) -> Self {
        self.query = self.query.among(methods);
        self
    }

    /// Open an OR-branch over the same type's methods. Nested `or` calls
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

    /// All matching method records, in resolution order (own methods first,
    /// then inherited, then trait-provided).
    #[must_use]
    pub fn get(&self) -> Vec<MethodRecord> {
        self.query.get()
    }

    /// First matching record, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<MethodRecord> {
        self.query.first()
    }

    /// `true` if any method matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching methods.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one record.
    #[must_use]
    pub fn explain(&self, method: &MethodRecord) -> ChainTrace {
        self.query.explain(method)
    }
}

impl fmt::Debug for MethodQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodQuery")
            .field("type_name", &self.type_name)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

/// Detail view over one method visible on one type.
pub struct MethodIntrospector {
    type_name: String,
    record: MethodRecord,
}

impl MethodIntrospector {
    /// Resolve `method` on `type_name` through the snapshot's member walk.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::UnknownType`] when the owning type is absent;
    /// [`IntrospectError::UnknownMethod`] when the type exists but the
    /// method is not visible on it.
    pub fn new(
        source: &dyn TypeSource,
        type_name: &str,
        method: &str,
    ) -> Result<Self, IntrospectError> {
        if source.lookup(type_name).is_none() {
            return Err(IntrospectError::UnknownType {
                name: type_name.to_string(),
            });
        }
        let record =
            source
                .find_method(type_name, method)
                .ok_or_else(|| IntrospectError::UnknownMethod {
                    type_name: type_name.to_string(),
                    method: method.to_string(),
                })?;
        Ok(Self {
            type_name: type_name.to_string(),
            record,
        })
    }

    /// The type the method was resolved against (not necessarily the
    /// declaring type).
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.record.visibility
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.record.visibility.is_public()
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.record.is_static
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.record.is_abstract
    }

    #[must_use]
    pub fn is_final(&self) -> bool {
        self.record.is_final
    }

    /// Declared parameters, in order.
    #[must_use]
    pub fn params(&self) -> &[ParamRecord] {
        &self.record.params
    }

    #[must_use]
    pub fn param_count(&self) -> usize {
        self.record.params.len()
    }

    /// Count of parameters without a default and not variadic.
    #[must_use]
    pub fn required_param_count(&self) -> usize {
        self.record
            .params
            .iter()
            .filter(|p| !p.has_default && !p.variadic)
            .count()
    }

    /// Normalized return type (`?` prefix folded in), `None` when
    /// undeclared.
    #[must_use]
    pub fn return_type(&self) -> Option<String> {
        self.record.return_type_normalized()
    }

    /// Attributes declared on the method.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeRecord] {
        &self.record.attributes
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.record.has_attribute(name)
    }

    /// Raw docblock text.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.record.doc.as_deref()
    }

    /// First docblock line, scraped best-effort.
    #[must_use]
    pub fn doc_summary(&self) -> Option<String> {
        self.record.doc.as_deref().and_then(docblock::summary)
    }

    /// The underlying method record.
    #[must_use]
    pub fn record(&self) -> &MethodRecord {
        &self.record
    }
}

impl fmt::Debug for MethodIntrospector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodIntrospector")
            .field("type_name", &self.type_name)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// Detail view over a `"Type::method"` callable string.
pub struct CallableIntrospector {
    target: String,
    type_view: TypeIntrospector,
    method_view: MethodIntrospector,
}

impl CallableIntrospector {
    /// Split and resolve a callable target.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::MalformedCallable`] when the string is not of the
    /// form `Type::method`; otherwise the type and method resolution errors
    /// of the two detail views.
    pub fn new(source: Arc<dyn TypeSource>, target: &str) -> Result<Self, IntrospectError> {
        let (type_name, method) =
            target
                .split_once("::")
                .ok_or_else(|| IntrospectError::MalformedCallable {
                    target: target.to_string(),
                })?;
        if type_name.is_empty() || method.is_empty() {
            return Err(IntrospectError::MalformedCallable {
                target: target.to_string(),
            });
        }
        let type_view = TypeIntrospector::new(Arc::clone(&source), type_name)?;
        let method_view = MethodIntrospector::new(source.as_ref(), type_name, method)?;
        Ok(Self {
            target: target.to_string(),
            type_view,
            method_view,
        })
    }

    /// The original `Type::method` string.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Detail view of the type half.
    #[must_use]
    pub fn target_type(&self) -> &TypeIntrospector {
        &self.type_view
    }

    /// Detail view of the method half.
    #[must_use]
    pub fn method(&self) -> &MethodIntrospector {
        &self.method_view
    }
}

impl fmt::Debug for CallableIntrospector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableIntrospector")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
