//! The data-level model of the host's type system.
//!
//! There is no ambient reflection here. A host supplies a point-in-time
//! snapshot of its declared types as plain records, served through the narrow
//! [`TypeSource`] trait (enumerate names, look one up). Everything richer is
//! derived: [`TypeSourceExt`] walks the recorded parent/interface/trait edges
//! to answer transitive questions (`extends`, `implements`, `uses_trait`,
//! inherited members).
//!
//! Records list what each type *declares*; the extension trait walks the
//! ancestry and trait links so inherited members become visible without the
//! host pre-flattening anything.
//!
//! # Naming
//!
//! Qualified names use the host's backslash separator (`App\Models\User`).
//! Wherever a name is *asked about* (as opposed to enumerated), it matches
//! either exactly or by trailing segment: `uses_trait("SoftDeletes")` finds
//! `Illuminate\Database\Eloquent\SoftDeletes`. See [`fqn_matches`].
//!
//! # Example
//!
//! ```
//! use scry::{TypeKind, TypeRecord, TypeSource, TypeSourceExt};
//!
//! struct Snapshot(Vec<TypeRecord>);
//!
//! impl TypeSource for Snapshot {
//!     fn type_names(&self) -> Vec<String> {
//!         self.0.iter().map(|r| r.name.clone()).collect()
//!     }
//!     fn lookup(&self, name: &str) -> Option<TypeRecord> {
//!         self.0.iter().find(|r| r.name == name).cloned()
//!     }
//! }
//!
//! let mut user = TypeRecord::new("App\\Models\\User", TypeKind::Class);
//! user.parent = Some("Illuminate\\Database\\Eloquent\\Model".to_string());
//!
//! let snapshot = Snapshot(vec![
//!     user,
//!     TypeRecord::new("Illuminate\\Database\\Eloquent\\Model", TypeKind::Class),
//! ]);
//!
//! assert!(snapshot.extends("App\\Models\\User", "Model"));
//! ```

use std::collections::{HashSet, VecDeque};

/// The host's constructor method name.
pub const CONSTRUCTOR: &str = "__construct";

// ═══════════════════════════════════════════════════════════════════════════════
// Name helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Last `\`-separated segment of a qualified name.
///
/// ```
/// assert_eq!(scry::short_name("App\\Models\\User"), "User");
/// assert_eq!(scry::short_name("User"), "User");
/// ```
#[must_use]
pub fn short_name(fqn: &str) -> &str {
    fqn.rsplit_once('\\').map_or(fqn, |(_, short)| short)
}

/// Everything before the last `\`, or `None` for an unqualified name.
#[must_use]
pub fn namespace_of(fqn: &str) -> Option<&str> {
    fqn.rsplit_once('\\').map(|(ns, _)| ns)
}

/// `true` if `fqn` is exactly `needle`, or ends with `\needle`.
///
/// This is how every "is it called X" question is answered: callers may pass a
/// short name or a fully qualified one.
///
/// ```
/// assert!(scry::fqn_matches("App\\Jobs\\SendInvoice", "SendInvoice"));
/// assert!(scry::fqn_matches("App\\Jobs\\SendInvoice", "App\\Jobs\\SendInvoice"));
/// assert!(!scry::fqn_matches("App\\Jobs\\SendInvoice", "Invoice"));
/// ```
#[must_use]
pub fn fqn_matches(fqn: &str, needle: &str) -> bool {
    fqn == needle
        || fqn
            .strip_suffix(needle)
            .is_some_and(|rest| rest.ends_with('\\'))
}

/// Display form of a declared type with its nullability applied.
///
/// Nullable `T` renders as `?T`. Union and intersection types (`A|B`, `A&B`)
/// pass through unchanged, as does `mixed`, which already admits null and is
/// never `?`-prefixed.
#[must_use]
pub fn normalize_type(declared: Option<&str>, nullable: bool) -> Option<String> {
    let declared = declared?;
    if declared.contains('|') || declared.contains('&') || declared == "mixed" {
        return Some(declared.to_string());
    }
    if nullable && !declared.starts_with('?') {
        return Some(format!("?{declared}"));
    }
    Some(declared.to_string())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Snapshot records
// ═══════════════════════════════════════════════════════════════════════════════

/// What kind of declaration a [`TypeRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Interface => write!(f, "interface"),
            Self::Trait => write!(f, "trait"),
            Self::Enum => write!(f, "enum"),
        }
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    #[must_use]
    pub fn is_public(self) -> bool {
        self == Self::Public
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Protected => write!(f, "protected"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// One declared type in the host snapshot.
///
/// Lists what the type declares itself: direct parent, direct interfaces
/// (implemented by a class, or extended by an interface), directly used
/// traits, and its own members. Transitive views live on [`TypeSourceExt`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeRecord {
    /// Fully qualified name.
    pub name: String,
    pub kind: TypeKind,
    /// Direct parent class, if any.
    pub parent: Option<String>,
    /// Direct interfaces (a class implements them, an interface extends them).
    pub interfaces: Vec<String>,
    /// Directly used traits.
    pub traits: Vec<String>,
    /// Methods declared on this type itself.
    pub methods: Vec<MethodRecord>,
    /// Properties declared on this type itself.
    pub properties: Vec<PropertyRecord>,
    /// Constants declared on this type itself.
    pub constants: Vec<ConstantRecord>,
    pub attributes: Vec<AttributeRecord>,
    /// Raw docblock text, if the host captured one.
    pub doc: Option<String>,
    pub is_abstract: bool,
    pub is_final: bool,
}

impl TypeRecord {
    /// An empty record of the given kind.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            constants: Vec::new(),
            attributes: Vec::new(),
            doc: None,
            is_abstract: false,
            is_final: false,
        }
    }

    /// Last segment of the qualified name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    /// Namespace portion of the qualified name.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        namespace_of(&self.name)
    }

    /// A method declared on this type itself (inherited methods live on
    /// [`TypeSourceExt::find_method`]).
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodRecord> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// A property declared on this type itself.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// A constant declared on this type itself.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&ConstantRecord> {
        self.constants.iter().find(|c| c.name == name)
    }

    /// The declared constructor, if any.
    #[must_use]
    pub fn constructor(&self) -> Option<&MethodRecord> {
        self.method(CONSTRUCTOR)
    }

    /// `true` if any attribute name matches (exact or trailing segment).
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| fqn_matches(&a.name, name))
    }

    /// `true` for a concrete class whose constructor, if declared, is public.
    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Class
            && !self.is_abstract
            && self.constructor().is_none_or(|c| c.visibility.is_public())
    }

    /// Why [`is_instantiable`](Self::is_instantiable) is false, as a short
    /// human-readable phrase. `None` when the type is instantiable.
    #[must_use]
    pub fn uninstantiable_reason(&self) -> Option<&'static str> {
        match self.kind {
            TypeKind::Interface => Some("interface"),
            TypeKind::Trait => Some("trait"),
            TypeKind::Enum => Some("enum"),
            TypeKind::Class if self.is_abstract => Some("abstract class"),
            TypeKind::Class => {
                if self.constructor().is_none_or(|c| c.visibility.is_public()) {
                    None
                } else {
                    Some("non-public constructor")
                }
            }
        }
    }
}

/// One declared method.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodRecord {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub params: Vec<ParamRecord>,
    /// Declared return type, verbatim.
    pub return_type: Option<String>,
    pub returns_nullable: bool,
    pub attributes: Vec<AttributeRecord>,
    /// Raw docblock text, if the host captured one.
    pub doc: Option<String>,
}

impl MethodRecord {
    /// A public, non-static method with no params and no declared return type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
            is_abstract: false,
            params: Vec::new(),
            return_type: None,
            returns_nullable: false,
            attributes: Vec::new(),
            doc: None,
        }
    }

    /// Declared return type with nullability applied (`?T`); see
    /// [`normalize_type`].
    #[must_use]
    pub fn return_type_normalized(&self) -> Option<String> {
        normalize_type(self.return_type.as_deref(), self.returns_nullable)
    }

    /// `true` if any attribute name matches (exact or trailing segment).
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| fqn_matches(&a.name, name))
    }
}

/// One declared property.
///
/// Defaults are captured statically when the host can: `has_default` with a
/// `None` value means "declared with a default the snapshot could not render",
/// which downstream reads report as dynamic rather than absent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyRecord {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub declared_type: Option<String>,
    pub nullable: bool,
    pub has_default: bool,
    /// Rendered default value, when statically known.
    pub default: Option<String>,
    pub attributes: Vec<AttributeRecord>,
    pub doc: Option<String>,
}

impl PropertyRecord {
    /// A public, non-static, untyped property with no default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            declared_type: None,
            nullable: false,
            has_default: false,
            default: None,
            attributes: Vec::new(),
            doc: None,
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamRecord {
    pub name: String,
    pub declared_type: Option<String>,
    pub nullable: bool,
    pub has_default: bool,
    /// Rendered default value, when statically known.
    pub default: Option<String>,
    /// Constructor-promoted property.
    pub promoted: bool,
    pub variadic: bool,
    pub by_reference: bool,
}

impl ParamRecord {
    /// An untyped, required, by-value parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            nullable: false,
            has_default: false,
            default: None,
            promoted: false,
            variadic: false,
            by_reference: false,
        }
    }
}

/// One attribute occurrence: qualified attribute name plus rendered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeRecord {
    pub name: String,
    /// Arguments as rendered source text, in declaration order.
    pub args: Vec<String>,
}

impl AttributeRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// One declared constant, with its value as rendered source text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstantRecord {
    pub name: String,
    pub value: String,
    pub visibility: Visibility,
}

impl ConstantRecord {
    /// A public constant.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            visibility: Visibility::Public,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Source trait
// ═══════════════════════════════════════════════════════════════════════════════

/// The narrow seam between the query layer and the host's type snapshot.
///
/// `type_names` fixes the enumeration order every type-level query inherits.
/// `lookup` is called from inside filters, possibly many times per terminal
/// call; implementations are expected to make it cheap (a map lookup, not a
/// parse). A miss is not an error: filters treat it as "does not match".
pub trait TypeSource: Send + Sync {
    /// All declared type names, in the host's enumeration order.
    fn type_names(&self) -> Vec<String>;

    /// The record for one exact qualified name.
    fn lookup(&self, name: &str) -> Option<TypeRecord>;
}

/// `TypeSource` for shared handles.
impl TypeSource for std::sync::Arc<dyn TypeSource> {
    fn type_names(&self) -> Vec<String> {
        (**self).type_names()
    }

    fn lookup(&self, name: &str) -> Option<TypeRecord> {
        (**self).lookup(name)
    }
}

/// Owner chain for method and property lookups: the type itself, its
/// ancestors nearest-first, then its traits.
fn member_owners<S: TypeSource + ?Sized>(source: &S, name: &str) -> Vec<String> {
    let mut owners = vec![name.to_string()];
    owners.extend(source.ancestry(name));
    owners.extend(source.all_traits(name));
    owners
}

/// Owner chain for constant lookups: the type itself, its ancestors, then its
/// interfaces.
fn constant_owners<S: TypeSource + ?Sized>(source: &S, name: &str) -> Vec<String> {
    let mut owners = vec![name.to_string()];
    owners.extend(source.ancestry(name));
    owners.extend(source.all_interfaces(name));
    owners
}

/// Transitive views derived from the declared edges in a [`TypeSource`].
///
/// All walks are cycle-guarded: a snapshot with a parent loop or a trait that
/// names itself terminates instead of hanging. Lookup misses end a walk early
/// with whatever was gathered so far.
///
/// Name arguments to the boolean checks match exactly or by trailing segment
/// ([`fqn_matches`]).
pub trait TypeSourceExt: TypeSource {
    /// Transitive parent chain, nearest first. The declared parent appears
    /// even when its own record is missing from the snapshot; the walk just
    /// stops there.
    fn ancestry(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(name.to_string());
        let mut current = self.lookup(name).and_then(|r| r.parent);
        while let Some(parent) = current {
            if !seen.insert(parent.clone()) {
                break;
            }
            current = self.lookup(&parent).and_then(|r| r.parent);
            chain.push(parent);
        }
        chain
    }

    /// Every interface reachable from this type: direct, inherited from
    /// ancestors, and extended by other interfaces. First-seen order.
    fn all_interfaces(&self, name: &str) -> Vec<String> {
        let mut queue: VecDeque<String> = VecDeque::new();
        for owner in std::iter::once(name.to_string()).chain(self.ancestry(name)) {
            if let Some(record) = self.lookup(&owner) {
                queue.extend(record.interfaces);
            }
        }

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        while let Some(interface) = queue.pop_front() {
            if !seen.insert(interface.clone()) {
                continue;
            }
            if let Some(record) = self.lookup(&interface) {
                queue.extend(record.interfaces);
            }
            out.push(interface);
        }
        out
    }

    /// Every trait reachable from this type: used directly, by an ancestor,
    /// or by another used trait. First-seen order.
    fn all_traits(&self, name: &str) -> Vec<String> {
        let mut queue: VecDeque<String> = VecDeque::new();
        for owner in std::iter::once(name.to_string()).chain(self.ancestry(name)) {
            if let Some(record) = self.lookup(&owner) {
                queue.extend(record.traits);
            }
        }

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        while let Some(used) = queue.pop_front() {
            if !seen.insert(used.clone()) {
                continue;
            }
            if let Some(record) = self.lookup(&used) {
                queue.extend(record.traits);
            }
            out.push(used);
        }
        out
    }

    /// `true` if any strict ancestor matches `base`. A type does not extend
    /// itself.
    fn extends(&self, name: &str, base: &str) -> bool {
        self.ancestry(name).iter().any(|a| fqn_matches(a, base))
    }

    /// `true` if any reachable interface matches.
    fn implements(&self, name: &str, interface: &str) -> bool {
        self.all_interfaces(name)
            .iter()
            .any(|i| fqn_matches(i, interface))
    }

    /// `true` if any reachable trait matches.
    fn uses_trait(&self, name: &str, trait_name: &str) -> bool {
        self.all_traits(name)
            .iter()
            .any(|t| fqn_matches(t, trait_name))
    }

    /// All methods visible on a type: its own, then inherited, then
    /// trait-provided, merged by name with the nearest declaration winning.
    fn all_methods(&self, name: &str) -> Vec<MethodRecord> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for owner in member_owners(self, name) {
            if let Some(record) = self.lookup(&owner) {
                for method in record.methods {
                    if seen.insert(method.name.clone()) {
                        out.push(method);
                    }
                }
            }
        }
        out
    }

    /// Nearest declaration of a method, searching the type, its ancestors,
    /// then its traits.
    fn find_method(&self, name: &str, method: &str) -> Option<MethodRecord> {
        member_owners(self, name).into_iter().find_map(|owner| {
            self.lookup(&owner)?
                .methods
                .into_iter()
                .find(|m| m.name == method)
        })
    }

    /// All properties visible on a type, merged like
    /// [`all_methods`](Self::all_methods).
    fn all_properties(&self, name: &str) -> Vec<PropertyRecord> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for owner in member_owners(self, name) {
            if let Some(record) = self.lookup(&owner) {
                for property in record.properties {
                    if seen.insert(property.name.clone()) {
                        out.push(property);
                    }
                }
            }
        }
        out
    }

    /// Nearest declaration of a property.
    fn find_property(&self, name: &str, property: &str) -> Option<PropertyRecord> {
        member_owners(self, name).into_iter().find_map(|owner| {
            self.lookup(&owner)?
                .properties
                .into_iter()
                .find(|p| p.name == property)
        })
    }

    /// All constants visible on a type: its own, inherited, and declared on
    /// reachable interfaces. Merged by name, nearest declaration wins.
    fn all_constants(&self, name: &str) -> Vec<ConstantRecord> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for owner in constant_owners(self, name) {
            if let Some(record) = self.lookup(&owner) {
                for constant in record.constants {
                    if seen.insert(constant.name.clone()) {
                        out.push(constant);
                    }
                }
            }
        }
        out
    }

    /// Nearest declaration of a constant, searching the type, its ancestors,
    /// then its interfaces.
    fn find_constant(&self, name: &str, constant: &str) -> Option<ConstantRecord> {
        constant_owners(self, name).into_iter().find_map(|owner| {
            self.lookup(&owner)?
                .constants
                .into_iter()
                .find(|c| c.name == constant)
        })
    }
}

impl<S: TypeSource + ?Sized> TypeSourceExt for S {}
