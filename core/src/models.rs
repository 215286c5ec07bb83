//! ORM-model discovery.
//!
//! Like jobs, models are found by convention, not registration: a model is
//! an instantiable class whose ancestry reaches one of the configured base
//! classes. Relation checks are static too, reading a method's declared
//! return type through [`Conventions::is_relation_return`] instead of
//! invoking anything.

use crate::host::Conventions;
use crate::name_match::{self, NameMatch};
use crate::reflect::{TypeSource, TypeSourceExt};
use crate::trace::ChainTrace;
use crate::{IntrospectError, Query};
use std::fmt;
use std::sync::Arc;

/// Fluent queries over classes the model heuristic accepts.
pub struct ModelQuery {
    source: Arc<dyn TypeSource>,
    conventions: Conventions,
    query: Query<String>,
}

impl ModelQuery {
    /// Discover model classes in the snapshot via the conventions heuristic.
    pub fn new(source: Arc<dyn TypeSource>, conventions: Conventions) -> Self {
        let discover = Arc::clone(&source);
        let discover_conventions = conventions.clone();
        let query = Query::new(move || {
            discover
                .type_names()
                .into_iter()
                .filter(|name| discover_conventions.is_model(&discover, name))
                .collect()
        });
        Self {
            source,
            conventions,
            query,
        }
    }

    fn name_filter(mut self, matcher: NameMatch) -> Self {
        self.query = name_match::filter_on(self.query, "model", matcher, |n: &String| n.as_str());
        self
    }

    /// Keep models whose qualified class name matches a wildcard pattern.
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

    /// Keep models with a strict ancestor matching `base`.
    #[must_use]
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        let source = Arc::clone(&self.source);
        let description = format!("extends \"{base}\"");
        self.query = self
            .query
            .filter(description, move |name: &String| source.extends(name, &base));
        self
    }

    /// Keep models using a trait, directly or transitively.
    #[must_use]
    pub fn uses_trait(mut self, trait_name: impl Into<String>) -> Self {
        let trait_name = trait_name.into();
        let source = Arc::clone(&self.source);
        let description = format!("uses trait \"{trait_name}\"");
        self.query = self.query.filter(description, move |name: &String| {
            source.uses_trait(name, &trait_name)
        });
        self
    }

    /// Keep models on which a method is visible.
    #[must_use]
    pub fn has_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        let source = Arc::clone(&self.source);
        let description = format!("has method \"{method}\"");
        self.query = self.query.filter(description, move |name: &String| {
            source.find_method(name, &method).is_some()
        });
        self
    }

    /// Keep models carrying an attribute (own declarations only).
    #[must_use]
    pub fn has_attribute(mut self, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        let source = Arc::clone(&self.source);
        let description = format!("has attribute \"{attribute}\"");
        self.query = self.query.filter(description, move |name: &String| {
            source
                .lookup(name)
                .is_some_and(|r| r.has_attribute(&attribute))
        });
        self
    }

    /// Keep models declaring a relation method named `name`: the method must
    /// be visible and its declared return type must look like a relation.
    #[must_use]
    pub fn has_relation(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let source = Arc::clone(&self.source);
        let conventions = self.conventions.clone();
        let description = format!("has relation \"{name}\"");
        self.query = self.query.filter(description, move |model: &String| {
            source.find_method(model, &name).is_some_and(|m| {
                m.return_type
                    .as_deref()
                    .is_some_and(|t| conventions.is_relation_return(t))
            })
        });
        self
    }

    /// Restrict the query to exactly these class names instead of running
    /// discovery.
    #[must_use]
    pub fn among(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.query = self.query.among(names.into_iter().map(Into::into));
        self
    }

    /// Open an OR-branch over the same discovery. Nested `or` calls inside
    /// the callback are ignored.
    ///
    /// # Errors
    ///
    /// Propagates pattern-compilation failures from inside the callback.
    pub fn or(
        mut self,
        build: impl FnOnce(Self) -> Result<Self, IntrospectError>,
    ) -> Result<Self, IntrospectError> {
        let nested = build(Self::new(
            Arc::clone(&self.source),
            self.conventions.clone(),
        ))?;
        self.query = self.query.branch(nested.query.into_chain());
        Ok(self)
    }

    /// All matching model class names, in snapshot enumeration order.
    #[must_use]
    pub fn get(&self) -> Vec<String> {
        self.query.get()
    }

    /// First matching class name, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<String> {
        self.query.first()
    }

    /// `true` if any model matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching models.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one class name.
    #[must_use]
    pub fn explain(&self, name: &str) -> ChainTrace {
        self.query.explain(&name.to_string())
    }
}

impl fmt::Debug for ModelQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelQuery")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
