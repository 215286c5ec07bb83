//! Declared-type queries and the single-type detail view.
//!
//! [`TypeQuery`] enumerates the snapshot's type names (optionally restricted
//! to one [`TypeKind`]) and filters them through capability lookups:
//! inheritance, interfaces, traits, members, attributes. Candidates are plain
//! qualified names; every capability filter goes back to the [`TypeSource`]
//! at evaluation time, so results always reflect the snapshot being queried.
//!
//! [`TypeIntrospector`] is the detail view over one known type; unlike query
//! filters it fails loudly when its target does not exist.

use crate::docblock;
use crate::methods::MethodIntrospector;
use crate::name_match::{self, NameMatch};
use crate::reflect::{
    namespace_of, AttributeRecord, ConstantRecord, MethodRecord, ParamRecord, PropertyRecord,
    TypeKind, TypeRecord, TypeSource, TypeSourceExt, CONSTRUCTOR,
};
use crate::trace::ChainTrace;
use crate::{IntrospectError, Query};
use std::fmt;
use std::sync::Arc;

/// Fluent queries over declared types.
///
/// # Example
///
/// ```
/// use scry::{TypeKind, TypeQuery, TypeRecord, TypeSource};
/// use std::sync::Arc;
///
/// struct Snapshot(Vec<TypeRecord>);
///
/// impl TypeSource for Snapshot {
///     fn type_names(&self) -> Vec<String> {
///         self.0.iter().map(|r| r.name.clone()).collect()
///     }
///     fn lookup(&self, name: &str) -> Option<TypeRecord> {
///         self.0.iter().find(|r| r.name == name).cloned()
///     }
/// }
///
/// let snapshot: Arc<dyn TypeSource> = Arc::new(Snapshot(vec![
///     TypeRecord::new("App\\Services\\Billing", TypeKind::Class),
///     TypeRecord::new("App\\Contracts\\Billable", TypeKind::Interface),
/// ]));
///
/// let classes = TypeQuery::of_kind(Arc::clone(&snapshot), TypeKind::Class);
/// assert_eq!(classes.count(), 1);
///
/// let billables = TypeQuery::new(snapshot).where_name("*Bill*")?;
/// assert_eq!(billables.count(), 2);
/// # Ok::<(), scry::IntrospectError>(())
/// ```
pub struct TypeQuery {
    source: Arc<dyn TypeSource>,
    kind: Option<TypeKind>,
    query: Query<String>,
}

impl TypeQuery {
    /// Query every declared type, whatever its kind.
    pub fn new(source: Arc<dyn TypeSource>) -> Self {
        Self::build(source, None)
    }

    /// Query only declarations of one kind.
    pub fn of_kind(source: Arc<dyn TypeSource>, kind: TypeKind) -> Self {
        Self::build(source, Some(kind))
    }

    fn build(source: Arc<dyn TypeSource>, kind: Option<TypeKind>) -> Self {
        let discover = Arc::clone(&source);
        let query = Query::new(move || {
            let names = discover.type_names();
            match kind {
                None => names,
                Some(kind) => names
                    .into_iter()
                    .filter(|n| discover.lookup(n).is_some_and(|r| r.kind == kind))
                    .collect(),
            }
        });
        Self {
            source,
            kind,
            query,
        }
    }

    fn name_filter(mut self, matcher: NameMatch) -> Self {
        self.query = name_match::filter_on(self.query, "name", matcher, |n: &String| n.as_str());
        self
    }

    /// Keep types whose qualified name matches a wildcard pattern.
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

    /// Keep types declared in a namespace or any of its sub-namespaces.
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let description = format!("in namespace \"{namespace}\"");
        self.query = self.query.filter(description, move |name: &String| {
            namespace_of(name).is_some_and(|actual| {
                actual == namespace
                    || actual
                        .strip_prefix(namespace.as_str())
                        .is_some_and(|rest| rest.starts_with('\\'))
            })
        });
        self
    }

    /// Keep types with a strict ancestor matching `base` (exact or trailing
    /// segment).
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

    /// Keep types implementing an interface, directly or transitively.
    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        let interface = interface.into();
        let source = Arc::clone(&self.source);
        let description = format!("implements \"{interface}\"");
        self.query = self.query.filter(description, move |name: &String| {
            source.implements(name, &interface)
        });
        self
    }

    /// Keep types using a trait, directly or through ancestors and other
    /// traits.
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

    /// Keep types on which a method is visible (own, inherited, or
    /// trait-provided).
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

    /// Keep types on which a property is visible.
    #[must_use]
    pub fn has_property(mut self, property: impl Into<String>) -> Self {
        let property = property.into();
        let source = Arc::clone(&self.source);
        let description = format!("has property \"{property}\"");
        self.query = self.query.filter(description, move |name: &String| {
            source.find_property(name, &property).is_some()
        });
        self
    }

    /// Keep types on which a constant is visible (own, inherited, or from an
    /// interface).
    #[must_use]
    pub fn has_constant(mut self, constant: impl Into<String>) -> Self {
        let constant = constant.into();
        let source = Arc::clone(&self.source);
        let description = format!("has constant \"{constant}\"");
        self.query = self.query.filter(description, move |name: &String| {
            source.find_constant(name, &constant).is_some()
        });
        self
    }

    /// Keep types carrying an attribute (own declarations only).
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

    /// Keep concrete classes with a public (or absent) constructor.
    #[must_use]
    pub fn instantiable(mut self) -> Self {
        let source = Arc::clone(&self.source);
        self.query = self.query.filter("instantiable", move |name: &String| {
            source.lookup(name).is_some_and(|r| r.is_instantiable())
        });
        self
    }

    /// Keep abstract classes.
    #[must_use]
    pub fn is_abstract(mut self) -> Self {
        let source = Arc::clone(&self.source);
        self.query = self.query.filter("abstract", move |name: &String| {
            source.lookup(name).is_some_and(|r| r.is_abstract)
        });
        self
    }

    /// Keep final classes.
    #[must_use]
    pub fn is_final(mut self) -> Self {
        let source = Arc::clone(&self.source);
        self.query = self.query.filter("final", move |name: &String| {
            source.lookup(name).is_some_and(|r| r.is_final)
        });
        self
    }

    /// Restrict the query to exactly these names instead of the snapshot.
    #[must_use]
    pub fn among(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.query = self.query.among(names.into_iter().map(Into::into));
        self
    }

    /// Open an OR-branch over the same snapshot (and kind restriction).
    /// Nested `or` calls inside the callback are ignored.
    ///
    /// # Errors
    ///
    /// Propagates pattern-compilation failures from inside the callback.
    pub fn or(
        mut self,
        build: impl FnOnce(Self) -> Result<Self, IntrospectError>,
    ) -> Result<Self, IntrospectError> {
        let nested = build(Self::build(Arc::clone(&self.source), self.kind))?;
        self.query = self.query.branch(nested.query.into_chain());
        Ok(self)
    }

    /// All matching qualified names, in snapshot enumeration order.
    #[must_use]
    pub fn get(&self) -> Vec<String> {
        self.query.get()
    }

    /// First matching name, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<String> {
        self.query.first()
    }

    /// `true` if any type matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching types.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one qualified name.
    #[must_use]
    pub fn explain(&self, name: &str) -> ChainTrace {
        self.query.explain(&name.to_string())
    }
}

impl fmt::Debug for TypeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeQuery")
            .field("kind", &self.kind)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

/// Detail view over one declared type.
///
/// Construction fails with [`IntrospectError::UnknownType`] when the target
/// is absent from the snapshot; every accessor afterwards is infallible and
/// degrades to `None`/empty where the snapshot has nothing to say.
pub struct TypeIntrospector {
    source: Arc<dyn TypeSource>,
    record: TypeRecord,
}

impl TypeIntrospector {
    /// Look up the target in the snapshot.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::UnknownType`] when no record exists under `name`.
    pub fn new(source: Arc<dyn TypeSource>, name: &str) -> Result<Self, IntrospectError> {
        let record = source
            .lookup(name)
            .ok_or_else(|| IntrospectError::UnknownType {
                name: name.to_string(),
            })?;
        Ok(Self { source, record })
    }

    /// Fully qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    #[must_use]
    pub fn short_name(&self) -> &str {
        self.record.short_name()
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.record.namespace()
    }

    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.record.kind
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.record.is_abstract
    }

    #[must_use]
    pub fn is_final(&self) -> bool {
        self.record.is_final
    }

    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        self.record.is_instantiable()
    }

    /// Direct parent class.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.record.parent.as_deref()
    }

    /// Transitive parent chain, nearest first.
    #[must_use]
    pub fn parents(&self) -> Vec<String> {
        self.source.ancestry(&self.record.name)
    }

    /// Interfaces declared directly on this type.
    #[must_use]
    pub fn direct_interfaces(&self) -> &[String] {
        &self.record.interfaces
    }

    /// Every reachable interface, first-seen order.
    #[must_use]
    pub fn interfaces(&self) -> Vec<String> {
        self.source.all_interfaces(&self.record.name)
    }

    /// Traits used directly by this type.
    #[must_use]
    pub fn direct_traits(&self) -> &[String] {
        &self.record.traits
    }

    /// Every reachable trait, first-seen order.
    #[must_use]
    pub fn traits(&self) -> Vec<String> {
        self.source.all_traits(&self.record.name)
    }

    #[must_use]
    pub fn extends(&self, base: &str) -> bool {
        self.source.extends(&self.record.name, base)
    }

    #[must_use]
    pub fn implements(&self, interface: &str) -> bool {
        self.source.implements(&self.record.name, interface)
    }

    #[must_use]
    pub fn uses_trait(&self, trait_name: &str) -> bool {
        self.source.uses_trait(&self.record.name, trait_name)
    }

    /// All visible methods: own, inherited, trait-provided.
    #[must_use]
    pub fn methods(&self) -> Vec<MethodRecord> {
        self.source.all_methods(&self.record.name)
    }

    #[must_use]
    pub fn method_names(&self) -> Vec<String> {
        self.methods().into_iter().map(|m| m.name).collect()
    }

    #[must_use]
    pub fn public_method_names(&self) -> Vec<String> {
        self.methods()
            .into_iter()
            .filter(|m| m.visibility.is_public())
            .map(|m| m.name)
            .collect()
    }

    #[must_use]
    pub fn static_method_names(&self) -> Vec<String> {
        self.methods()
            .into_iter()
            .filter(|m| m.is_static)
            .map(|m| m.name)
            .collect()
    }

    /// All visible properties.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyRecord> {
        self.source.all_properties(&self.record.name)
    }

    #[must_use]
    pub fn property_names(&self) -> Vec<String> {
        self.properties().into_iter().map(|p| p.name).collect()
    }

    #[must_use]
    pub fn public_property_names(&self) -> Vec<String> {
        self.properties()
            .into_iter()
            .filter(|p| p.visibility.is_public())
            .map(|p| p.name)
            .collect()
    }

    /// All visible constants, including interface constants.
    #[must_use]
    pub fn constants(&self) -> Vec<ConstantRecord> {
        self.source.all_constants(&self.record.name)
    }

    /// Parameters of the constructor in effect (possibly inherited). Empty
    /// when no constructor is declared anywhere.
    #[must_use]
    pub fn constructor_params(&self) -> Vec<ParamRecord> {
        self.source
            .find_method(&self.record.name, CONSTRUCTOR)
            .map(|m| m.params)
            .unwrap_or_default()
    }

    /// Attributes declared on this type.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeRecord] {
        &self.record.attributes
    }

    /// Attributes whose name matches (exact or trailing segment).
    #[must_use]
    pub fn attributes_named(&self, name: &str) -> Vec<&AttributeRecord> {
        self.record
            .attributes
            .iter()
            .filter(|a| crate::reflect::fqn_matches(&a.name, name))
            .collect()
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

    /// The underlying snapshot record.
    #[must_use]
    pub fn record(&self) -> &TypeRecord {
        &self.record
    }

    /// Promote to the detail view of one visible method.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::UnknownMethod`] when the method is not visible on
    /// this type.
    pub fn method(&self, name: &str) -> Result<MethodIntrospector, IntrospectError> {
        MethodIntrospector::new(self.source.as_ref(), &self.record.name, name)
    }
}

impl fmt::Debug for TypeIntrospector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeIntrospector")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::reflect::CONSTRUCTOR;
    use scry_fixture::prelude::*;
    use scry_fixture::{FixtureHost, MethodFixture, ParamFixture, TypeFixture};
    use std::sync::Arc;

    fn snapshot() -> Arc<dyn TypeSource> {
        let fixture = FixtureHost::new()
            .with_type(
                TypeFixture::class("App\\Models\\User")
                    .with_parent("Framework\\Model")
                    .with_interface("App\\Contracts\\Auditable")
                    .with_trait("Framework\\SoftDeletes")
                    .with_method(MethodFixture::new("posts").returns("Framework\\Relations\\HasMany"))
                    .with_attribute(
                        AttributeRecord::new("App\\Attributes\\ObservedBy")
                            .with_args(["UserObserver::class"]),
                    )
                    .with_doc("/** The user model. */"),
            )
            .with_type(
                TypeFixture::class("Framework\\Model")
                    .with_method(MethodFixture::new("save"))
                    .with_method(
                        MethodFixture::new(CONSTRUCTOR)
                            .with_param(ParamFixture::new("attributes").with_default("[]")),
                    ),
            )
            .with_type(
                TypeFixture::interface("App\\Contracts\\Auditable").with_constant("AUDIT", "\"on\""),
            )
            .with_type(TypeFixture::trait_("Framework\\SoftDeletes").with_method(MethodFixture::new("restore")))
            .with_type(TypeFixture::class("App\\Services\\Billing").final_())
            .with_type(TypeFixture::class("App\\Models\\Draft").with_parent("Framework\\Model").abstract_())
            .with_type(TypeFixture::enum_("App\\Enums\\Status"));
        Arc::new(fixture)
    }

    // ========== Kind restriction ==========

    #[test]
    fn unrestricted_query_sees_every_kind() {
        assert_eq!(TypeQuery::new(snapshot()).count(), 7);
    }

    #[test]
    fn kind_restriction_filters_discovery() {
        assert_eq!(TypeQuery::of_kind(snapshot(), TypeKind::Class).count(), 4);
        assert_eq!(TypeQuery::of_kind(snapshot(), TypeKind::Interface).count(), 1);
        assert_eq!(TypeQuery::of_kind(snapshot(), TypeKind::Trait).count(), 1);
        assert_eq!(TypeQuery::of_kind(snapshot(), TypeKind::Enum).count(), 1);
    }

    // ========== Name and namespace ==========

    #[test]
    fn in_namespace_includes_sub_namespaces() {
        let query = TypeQuery::new(snapshot()).in_namespace("App");
        assert_eq!(query.count(), 5);

        let query = TypeQuery::new(snapshot()).in_namespace("App\\Models");
        assert_eq!(query.count(), 2);
    }

    #[test]
    fn in_namespace_is_not_a_string_prefix() {
        let query = TypeQuery::new(snapshot()).in_namespace("App\\Mo");
        assert_eq!(query.count(), 0);
    }

    // ========== Capability filters ==========

    #[test]
    fn extends_walks_transitively() {
        let query = TypeQuery::new(snapshot()).extends("Model");
        let mut names = query.get();
        names.sort();
        assert_eq!(
            names,
            vec!["App\\Models\\Draft".to_string(), "App\\Models\\User".to_string()]
        );
    }

    #[test]
    fn implements_and_uses_trait() {
        let query = TypeQuery::new(snapshot()).implements("Auditable");
        assert_eq!(query.get(), vec!["App\\Models\\User".to_string()]);

        let query = TypeQuery::new(snapshot()).uses_trait("SoftDeletes");
        assert_eq!(query.get(), vec!["App\\Models\\User".to_string()]);
    }

    #[test]
    fn has_method_sees_inherited_and_trait_methods() {
        let inherited = TypeQuery::new(snapshot()).has_method("save");
        let mut names = inherited.get();
        names.sort();
        assert_eq!(
            names,
            vec![
                "App\\Models\\Draft".to_string(),
                "App\\Models\\User".to_string(),
                "Framework\\Model".to_string(),
            ]
        );

        let from_trait = TypeQuery::new(snapshot()).has_method("restore");
        assert!(from_trait.get().contains(&"App\\Models\\User".to_string()));
    }

    #[test]
    fn has_constant_reaches_interfaces() {
        let query = TypeQuery::new(snapshot()).has_constant("AUDIT");
        let names = query.get();
        assert!(names.contains(&"App\\Models\\User".to_string()));
        assert!(names.contains(&"App\\Contracts\\Auditable".to_string()));
    }

    #[test]
    fn instantiable_and_flag_filters() {
        let instantiable = TypeQuery::of_kind(snapshot(), TypeKind::Class).instantiable();
        let mut names = instantiable.get();
        names.sort();
        assert_eq!(
            names,
            vec![
                "App\\Models\\User".to_string(),
                "App\\Services\\Billing".to_string(),
                "Framework\\Model".to_string(),
            ]
        );

        assert_eq!(
            TypeQuery::new(snapshot()).is_abstract().get(),
            vec!["App\\Models\\Draft".to_string()]
        );
        assert_eq!(
            TypeQuery::new(snapshot()).is_final().get(),
            vec!["App\\Services\\Billing".to_string()]
        );
    }

    #[test]
    fn has_attribute_is_own_declarations_only() {
        let query = TypeQuery::new(snapshot()).has_attribute("ObservedBy");
        assert_eq!(query.get(), vec!["App\\Models\\User".to_string()]);
    }

    #[test]
    fn or_branch_unions() {
        let query = TypeQuery::new(snapshot())
            .is_final()
            .or(|q| Ok(q.is_abstract()))
            .unwrap();
        assert_eq!(query.count(), 2);
    }

    // ========== TypeIntrospector ==========

    #[test]
    fn unknown_type_is_a_hard_error() {
        let err = TypeIntrospector::new(snapshot(), "App\\Missing").unwrap_err();
        assert_eq!(
            err,
            IntrospectError::UnknownType {
                name: "App\\Missing".to_string()
            }
        );
    }

    #[test]
    fn introspector_exposes_names_and_flags() {
        let user = TypeIntrospector::new(snapshot(), "App\\Models\\User").unwrap();
        assert_eq!(user.short_name(), "User");
        assert_eq!(user.namespace(), Some("App\\Models"));
        assert_eq!(user.kind(), TypeKind::Class);
        assert!(user.is_instantiable());
        assert_eq!(user.parent(), Some("Framework\\Model"));
        assert_eq!(user.parents(), vec!["Framework\\Model".to_string()]);
    }

    #[test]
    fn introspector_walks_members() {
        let user = TypeIntrospector::new(snapshot(), "App\\Models\\User").unwrap();
        assert_eq!(
            user.method_names(),
            vec!["posts", "save", CONSTRUCTOR, "restore"]
        );
        assert!(user.uses_trait("SoftDeletes"));
        assert_eq!(user.constants().len(), 1);

        let params = user.constructor_params();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "attributes");
        assert!(params[0].has_default);
    }

    #[test]
    fn introspector_reads_attributes_and_docs() {
        let user = TypeIntrospector::new(snapshot(), "App\\Models\\User").unwrap();
        assert_eq!(user.attributes_named("ObservedBy").len(), 1);
        assert!(user.has_attribute("App\\Attributes\\ObservedBy"));
        assert_eq!(user.doc_summary().as_deref(), Some("The user model."));
    }

    #[test]
    fn method_promotion_and_unknown_method() {
        let user = TypeIntrospector::new(snapshot(), "App\\Models\\User").unwrap();

        let posts = user.method("posts").unwrap();
        assert_eq!(posts.return_type().as_deref(), Some("Framework\\Relations\\HasMany"));

        let restore = user.method("restore").unwrap();
        assert_eq!(restore.name(), "restore");

        let err = user.method("missing").unwrap_err();
        assert_eq!(
            err,
            IntrospectError::UnknownMethod {
                type_name: "App\\Models\\User".to_string(),
                method: "missing".to_string()
            }
        );
    }
}
