use crate::stmt;

/// How the introspector reaches a property's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Through the declared field.
    #[default]
    Field,

    /// Through the getter/setter pair.
    Property,
}

/// Raw property metadata produced by the type introspector.
///
/// The descriptor states accessor identity explicitly; the engine never
/// derives accessor names itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Property name.
    pub name: String,

    /// Declared type.
    pub ty: stmt::Type,

    /// True when the declared type is a non-nullable primitive.
    pub primitive: bool,

    /// Getter identity (`getName`, `isActive`), if the type declares one.
    pub getter: Option<String>,

    /// Setter identity, if the type declares one.
    pub setter: Option<String>,

    /// True when the type declares a field with the property's name.
    pub declared_field: bool,

    pub access: AccessMode,
}

impl PropertyDescriptor {
    /// A property reached through its declared field.
    pub fn field(name: impl Into<String>, ty: stmt::Type) -> PropertyDescriptor {
        PropertyDescriptor {
            name: name.into(),
            ty,
            primitive: false,
            getter: None,
            setter: None,
            declared_field: true,
            access: AccessMode::Field,
        }
    }

    /// A property reached through a getter/setter pair.
    pub fn property(
        name: impl Into<String>,
        ty: stmt::Type,
        getter: impl Into<String>,
        setter: impl Into<String>,
    ) -> PropertyDescriptor {
        PropertyDescriptor {
            name: name.into(),
            ty,
            primitive: false,
            getter: Some(getter.into()),
            setter: Some(setter.into()),
            declared_field: false,
            access: AccessMode::Property,
        }
    }

    pub fn primitive(mut self) -> Self {
        self.primitive = true;
        self
    }

    pub fn without_getter(mut self) -> Self {
        self.getter = None;
        self
    }

    pub fn without_declared_field(mut self) -> Self {
        self.declared_field = false;
        self
    }

    pub fn with_declared_field(mut self) -> Self {
        self.declared_field = true;
        self
    }
}
