//! Fluent builders over the snapshot records.
//!
//! Tests read better when a declaration is one chained expression instead of
//! a block of field assignments. Each builder starts from the record's
//! defaults and flips exactly what the test says; `Into<…Record>` lets them
//! drop into any place a record is expected.

use scry::{
    AttributeRecord, ConstantRecord, MethodRecord, ParamRecord, PropertyRecord, TypeKind,
    TypeRecord, Visibility,
};

/// Builder for a [`TypeRecord`].
#[derive(Debug, Clone)]
pub struct TypeFixture {
    record: TypeRecord,
}

impl TypeFixture {
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            record: TypeRecord::new(name, TypeKind::Class),
        }
    }

    #[must_use]
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            record: TypeRecord::new(name, TypeKind::Interface),
        }
    }

    #[must_use]
    pub fn trait_(name: impl Into<String>) -> Self {
        Self {
            record: TypeRecord::new(name, TypeKind::Trait),
        }
    }

    #[must_use]
    pub fn enum_(name: impl Into<String>) -> Self {
        Self {
            record: TypeRecord::new(name, TypeKind::Enum),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.record.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.record.interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn with_trait(mut self, trait_name: impl Into<String>) -> Self {
        self.record.traits.push(trait_name.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<MethodRecord>) -> Self {
        self.record.methods.push(method.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: impl Into<PropertyRecord>) -> Self {
        self.record.properties.push(property.into());
        self
    }

    /// Add a public constant from name and raw literal value.
    #[must_use]
    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.record.constants.push(ConstantRecord::new(name, value));
        self
    }

    /// Add a fully specified constant record.
    #[must_use]
    pub fn with_constant_record(mut self, constant: ConstantRecord) -> Self {
        self.record.constants.push(constant);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeRecord) -> Self {
        self.record.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.record.doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn abstract_(mut self) -> Self {
        self.record.is_abstract = true;
        self
    }

    #[must_use]
    pub fn final_(mut self) -> Self {
        self.record.is_final = true;
        self
    }

    /// The finished record.
    #[must_use]
    pub fn build(self) -> TypeRecord {
        self.record
    }
}

impl From<TypeFixture> for TypeRecord {
    fn from(fixture: TypeFixture) -> Self {
        fixture.record
    }
}

/// Builder for a [`MethodRecord`].
#[derive(Debug, Clone)]
pub struct MethodFixture {
    record: MethodRecord,
}

impl MethodFixture {
    /// A public, non-static method.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            record: MethodRecord::new(name),
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.record.visibility = visibility;
        self
    }

    #[must_use]
    pub fn static_(mut self) -> Self {
        self.record.is_static = true;
        self
    }

    #[must_use]
    pub fn abstract_(mut self) -> Self {
        self.record.is_abstract = true;
        self
    }

    #[must_use]
    pub fn final_(mut self) -> Self {
        self.record.is_final = true;
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: impl Into<ParamRecord>) -> Self {
        self.record.params.push(param.into());
        self
    }

    /// Set a declared return type.
    #[must_use]
    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.record.return_type = Some(return_type.into());
        self
    }

    /// Set a declared, nullable return type.
    #[must_use]
    pub fn returns_nullable(mut self, return_type: impl Into<String>) -> Self {
        self.record.return_type = Some(return_type.into());
        self.record.returns_nullable = true;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeRecord) -> Self {
        self.record.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.record.doc = Some(doc.into());
        self
    }

    /// The finished record.
    #[must_use]
    pub fn build(self) -> MethodRecord {
        self.record
    }
}

impl From<MethodFixture> for MethodRecord {
    fn from(fixture: MethodFixture) -> Self {
        fixture.record
    }
}

/// Builder for a [`PropertyRecord`].
#[derive(Debug, Clone)]
pub struct PropertyFixture {
    record: PropertyRecord,
}

impl PropertyFixture {
    /// A public, non-static, untyped property.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            record: PropertyRecord::new(name),
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.record.visibility = visibility;
        self
    }

    #[must_use]
    pub fn static_(mut self) -> Self {
        self.record.is_static = true;
        self
    }

    #[must_use]
    pub fn typed(mut self, declared_type: impl Into<String>) -> Self {
        self.record.declared_type = Some(declared_type.into());
        self
    }

    #[must_use]
    pub fn typed_nullable(mut self, declared_type: impl Into<String>) -> Self {
        self.record.declared_type = Some(declared_type.into());
        self.record.nullable = true;
        self
    }

    /// Set a statically captured default literal.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.record.has_default = true;
        self.record.default = Some(default.into());
        self
    }

    /// Mark the property as defaulted without a statically renderable value.
    #[must_use]
    pub fn dynamic_default(mut self) -> Self {
        self.record.has_default = true;
        self.record.default = None;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeRecord) -> Self {
        self.record.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.record.doc = Some(doc.into());
        self
    }

    /// The finished record.
    #[must_use]
    pub fn build(self) -> PropertyRecord {
        self.record
    }
}

impl From<PropertyFixture> for PropertyRecord {
    fn from(fixture: PropertyFixture) -> Self {
        fixture.record
    }
}

/// Builder for a [`ParamRecord`].
#[derive(Debug, Clone)]
pub struct ParamFixture {
    record: ParamRecord,
}

impl ParamFixture {
    /// An untyped, required, by-value parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            record: ParamRecord::new(name),
        }
    }

    #[must_use]
    pub fn typed(mut self, declared_type: impl Into<String>) -> Self {
        self.record.declared_type = Some(declared_type.into());
        self
    }

    #[must_use]
    pub fn typed_nullable(mut self, declared_type: impl Into<String>) -> Self {
        self.record.declared_type = Some(declared_type.into());
        self.record.nullable = true;
        self
    }

    /// Set a statically captured default literal.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.record.has_default = true;
        self.record.default = Some(default.into());
        self
    }

    /// Constructor-promoted property parameter.
    #[must_use]
    pub fn promoted(mut self) -> Self {
        self.record.promoted = true;
        self
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.record.variadic = true;
        self
    }

    #[must_use]
    pub fn by_reference(mut self) -> Self {
        self.record.by_reference = true;
        self
    }

    /// The finished record.
    #[must_use]
    pub fn build(self) -> ParamRecord {
        self.record
    }
}

impl From<ParamFixture> for ParamRecord {
    fn from(fixture: ParamFixture) -> Self {
        fixture.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_fixture_accumulates_members() {
        let record: TypeRecord = TypeFixture::class("App\\Models\\User")
            .with_parent("Framework\\Model")
            .with_interface("App\\Contracts\\Auditable")
            .with_trait("Framework\\SoftDeletes")
            .with_method(MethodFixture::new("save"))
            .with_property(PropertyFixture::new("table").with_default("'users'"))
            .with_constant("CREATED_AT", "'created_at'")
            .into();

        assert_eq!(record.kind, TypeKind::Class);
        assert_eq!(record.parent.as_deref(), Some("Framework\\Model"));
        assert_eq!(record.methods.len(), 1);
        assert_eq!(record.properties.len(), 1);
        assert_eq!(record.constants.len(), 1);
        assert!(record.is_instantiable());
    }

    #[test]
    fn kind_constructors_and_flags() {
        assert_eq!(
            TypeFixture::interface("I").build().uninstantiable_reason(),
            Some("interface")
        );
        assert_eq!(
            TypeFixture::class("A").abstract_().build().uninstantiable_reason(),
            Some("abstract class")
        );
        assert!(TypeFixture::class("F").final_().build().is_final);
    }

    #[test]
    fn method_fixture_defaults_and_overrides() {
        let record: MethodRecord = MethodFixture::new("find")
            .static_()
            .with_param(ParamFixture::new("id").typed("int"))
            .with_param(ParamFixture::new("columns").variadic())
            .returns_nullable("self")
            .into();

        assert!(record.visibility.is_public());
        assert!(record.is_static);
        assert_eq!(record.params.len(), 2);
        assert!(record.params[1].variadic);
        assert_eq!(record.return_type_normalized().as_deref(), Some("?self"));
    }

    #[test]
    fn property_fixture_distinguishes_default_shapes() {
        let valued: PropertyRecord = PropertyFixture::new("queue").with_default("'emails'").into();
        assert!(valued.has_default);
        assert_eq!(valued.default.as_deref(), Some("'emails'"));

        let dynamic: PropertyRecord = PropertyFixture::new("queue").dynamic_default().into();
        assert!(dynamic.has_default);
        assert!(dynamic.default.is_none());

        let bare: PropertyRecord = PropertyFixture::new("queue").into();
        assert!(!bare.has_default);
    }
}
