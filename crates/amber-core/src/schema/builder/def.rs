use crate::{
    schema::app::{CascadeSet, PropertyDescriptor},
    stmt::Type,
};

/// Mapping definition of one entity, embeddable or mapped superclass.
#[derive(Debug, Clone)]
pub struct ModelDef {
    pub name: String,
    pub kind: ModelDefKind,

    /// Table name. Defaults to the model name.
    pub table: Option<String>,

    /// Joined-inheritance parent entity, or mapped superclass supplying
    /// fields.
    pub extends: Option<String>,

    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelDefKind {
    Entity,
    Embeddable,
    MappedSuperclass,
}

/// Mapping definition of one property.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Introspected property metadata.
    pub property: PropertyDescriptor,

    pub mapping: Mapping,

    /// Fetch laziness. Defaults depend on the mapping: scalars and to-one
    /// associations are eager, collections are lazy.
    pub lazy: Option<bool>,

    pub column: ColumnDef,
}

#[derive(Debug, Clone)]
pub enum Mapping {
    Basic,
    Id { generator: Option<GeneratorDef> },
    EmbeddedId { target: String },
    Version,
    Embedded { target: String },
    ManyToOne(ToOneDef),
    OneToMany(OneToManyDef),
    ManyToMany(ManyToManyDef),
    ElementCollection(ElementCollectionDef),
    OneToOneMappedBy {
        target: String,
        mapped_by: String,
        cascade: CascadeSet,
    },
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Column name. Defaults to the property name.
    pub name: Option<String>,

    /// Defaults to `false` for primitives and keys, `true` otherwise.
    pub nullable: Option<bool>,

    pub unique: bool,

    /// Length of string columns.
    pub length: Option<u64>,

    pub insertable: bool,
    pub updatable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumnDef {
    pub name: String,

    /// Referenced target key column. Defaults to the key column at the same
    /// position.
    pub referenced: Option<String>,

    pub nullable: Option<bool>,
    pub unique: bool,
}

/// Many-to-one, or the owning side of a one-to-one.
#[derive(Debug, Clone)]
pub struct ToOneDef {
    pub target: String,
    pub cascade: CascadeSet,
    pub join_columns: Vec<JoinColumnDef>,

    /// Part of the owner's primary key.
    pub id: bool,

    pub one_to_one: bool,
}

#[derive(Debug, Clone)]
pub struct OneToManyDef {
    pub target: String,

    /// Many-to-one on the target pointing back at the owner.
    pub mapped_by: String,

    pub cascade: CascadeSet,
    pub order_by: Vec<OrderByDef>,

    /// Target property keying the collection. `None` for a list.
    pub map_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ManyToManyDef {
    pub target: String,
    pub cascade: CascadeSet,

    /// Association table name. Defaults to `<owner table>_<target table>`.
    pub join_table: Option<String>,

    /// Columns referencing the owner. Default `<owner>_<key column>`.
    pub join_columns: Vec<JoinColumnDef>,

    /// Columns referencing the target. Default `<property>_<key column>`.
    pub inverse_join_columns: Vec<JoinColumnDef>,

    pub order_by: Vec<OrderByDef>,
}

#[derive(Debug, Clone)]
pub struct ElementCollectionDef {
    pub element: Type,

    /// Collection table name. Defaults to `<owner table>_<property>`.
    pub table: Option<String>,

    /// Value column name. Defaults to the property name.
    pub column: Option<String>,

    /// Columns referencing the owner. Default `<owner>_<key column>`.
    pub join_columns: Vec<JoinColumnDef>,

    /// Load elements ordered by value.
    pub ordered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorDef {
    Identity,
    Auto,

    /// Named sequence. Defaults to `<table>_cseq`.
    Sequence(Option<String>),

    /// Generator table entry. Defaults to `<table>_cseq`.
    Table(Option<String>),

    Max,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByDef {
    pub field: String,
    pub descending: bool,
}

impl ModelDef {
    pub fn entity(name: impl Into<String>) -> ModelDef {
        ModelDef::new(name, ModelDefKind::Entity)
    }

    pub fn embeddable(name: impl Into<String>) -> ModelDef {
        ModelDef::new(name, ModelDefKind::Embeddable)
    }

    pub fn mapped_superclass(name: impl Into<String>) -> ModelDef {
        ModelDef::new(name, ModelDefKind::MappedSuperclass)
    }

    fn new(name: impl Into<String>, kind: ModelDefKind) -> ModelDef {
        ModelDef {
            name: name.into(),
            kind,
            table: None,
            extends: None,
            fields: vec![],
        }
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

impl FieldDef {
    pub fn new(property: PropertyDescriptor, mapping: Mapping) -> FieldDef {
        FieldDef {
            property,
            mapping,
            lazy: None,
            column: ColumnDef::default(),
        }
    }

    /// Scalar property reached through its declared field.
    pub fn basic(name: &str, ty: Type) -> FieldDef {
        FieldDef::new(PropertyDescriptor::field(name, ty), Mapping::Basic)
    }

    pub fn id(name: &str, ty: Type) -> FieldDef {
        FieldDef::new(
            PropertyDescriptor::field(name, ty),
            Mapping::Id { generator: None },
        )
    }

    pub fn version(name: &str, ty: Type) -> FieldDef {
        FieldDef::new(PropertyDescriptor::field(name, ty), Mapping::Version)
    }

    pub fn embedded(name: &str, target: &str) -> FieldDef {
        FieldDef::new(
            PropertyDescriptor::field(name, Type::Unknown),
            Mapping::Embedded {
                target: target.to_string(),
            },
        )
    }

    pub fn embedded_id(name: &str, target: &str) -> FieldDef {
        FieldDef::new(
            PropertyDescriptor::field(name, Type::Unknown),
            Mapping::EmbeddedId {
                target: target.to_string(),
            },
        )
    }

    pub fn many_to_one(name: &str, target: &str) -> FieldDef {
        FieldDef::new(
            PropertyDescriptor::field(name, Type::Unknown),
            Mapping::ManyToOne(ToOneDef {
                target: target.to_string(),
                cascade: CascadeSet::NONE,
                join_columns: vec![],
                id: false,
                one_to_one: false,
            }),
        )
    }

    /// Owning side of a one-to-one.
    pub fn one_to_one(name: &str, target: &str) -> FieldDef {
        let mut def = FieldDef::many_to_one(name, target);
        if let Mapping::ManyToOne(to_one) = &mut def.mapping {
            to_one.one_to_one = true;
        }
        def
    }

    /// Dependent side of a one-to-one, mapped by `mapped_by` on the target.
    pub fn one_to_one_mapped_by(name: &str, target: &str, mapped_by: &str) -> FieldDef {
        FieldDef::new(
            PropertyDescriptor::field(name, Type::Unknown),
            Mapping::OneToOneMappedBy {
                target: target.to_string(),
                mapped_by: mapped_by.to_string(),
                cascade: CascadeSet::NONE,
            },
        )
    }

    pub fn one_to_many(name: &str, target: &str, mapped_by: &str) -> FieldDef {
        FieldDef::new(
            PropertyDescriptor::field(name, Type::Unknown),
            Mapping::OneToMany(OneToManyDef {
                target: target.to_string(),
                mapped_by: mapped_by.to_string(),
                cascade: CascadeSet::NONE,
                order_by: vec![],
                map_key: None,
            }),
        )
    }

    pub fn many_to_many(name: &str, target: &str) -> FieldDef {
        FieldDef::new(
            PropertyDescriptor::field(name, Type::Unknown),
            Mapping::ManyToMany(ManyToManyDef {
                target: target.to_string(),
                cascade: CascadeSet::NONE,
                join_table: None,
                join_columns: vec![],
                inverse_join_columns: vec![],
                order_by: vec![],
            }),
        )
    }

    pub fn element_collection(name: &str, element: Type) -> FieldDef {
        FieldDef::new(
            PropertyDescriptor::field(name, Type::list(element.clone())),
            Mapping::ElementCollection(ElementCollectionDef {
                element,
                table: None,
                column: None,
                join_columns: vec![],
                ordered: false,
            }),
        )
    }

    /// Replaces the introspected descriptor.
    pub fn descriptor(mut self, property: PropertyDescriptor) -> Self {
        self.property = property;
        self
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = Some(lazy);
        self
    }

    pub fn column(mut self, name: &str) -> Self {
        self.column.name = Some(name.to_string());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.column.nullable = Some(nullable);
        self
    }

    pub fn unique(mut self) -> Self {
        self.column.unique = true;
        self
    }

    pub fn length(mut self, length: u64) -> Self {
        self.column.length = Some(length);
        self
    }

    pub fn insertable(mut self, insertable: bool) -> Self {
        self.column.insertable = insertable;
        self
    }

    pub fn updatable(mut self, updatable: bool) -> Self {
        self.column.updatable = updatable;
        self
    }

    pub fn primitive(mut self) -> Self {
        self.property.primitive = true;
        self
    }

    /// Key generator of an id field.
    pub fn generated(mut self, generator: GeneratorDef) -> Self {
        if let Mapping::Id { generator: slot } = &mut self.mapping {
            *slot = Some(generator);
        }
        self
    }

    /// Marks a many-to-one as part of the primary key.
    pub fn key(mut self) -> Self {
        if let Mapping::ManyToOne(to_one) = &mut self.mapping {
            to_one.id = true;
        }
        self
    }

    pub fn cascade(mut self, cascade: impl Into<CascadeSet>) -> Self {
        let cascade = cascade.into();

        match &mut self.mapping {
            Mapping::ManyToOne(def) => def.cascade = cascade,
            Mapping::OneToMany(def) => def.cascade = cascade,
            Mapping::ManyToMany(def) => def.cascade = cascade,
            Mapping::OneToOneMappedBy { cascade: slot, .. } => *slot = cascade,
            _ => {}
        }
        self
    }

    /// Adds a join column to a many-to-one, many-to-many or element
    /// collection.
    pub fn join_column(mut self, join_column: JoinColumnDef) -> Self {
        match &mut self.mapping {
            Mapping::ManyToOne(def) => def.join_columns.push(join_column),
            Mapping::ManyToMany(def) => def.join_columns.push(join_column),
            Mapping::ElementCollection(def) => def.join_columns.push(join_column),
            _ => {}
        }
        self
    }

    pub fn inverse_join_column(mut self, join_column: JoinColumnDef) -> Self {
        if let Mapping::ManyToMany(def) = &mut self.mapping {
            def.inverse_join_columns.push(join_column);
        }
        self
    }

    /// Association or collection table name.
    pub fn join_table(mut self, name: &str) -> Self {
        match &mut self.mapping {
            Mapping::ManyToMany(def) => def.join_table = Some(name.to_string()),
            Mapping::ElementCollection(def) => def.table = Some(name.to_string()),
            _ => {}
        }
        self
    }

    pub fn order_by(mut self, field: &str, descending: bool) -> Self {
        let order_by = OrderByDef {
            field: field.to_string(),
            descending,
        };

        match &mut self.mapping {
            Mapping::OneToMany(def) => def.order_by.push(order_by),
            Mapping::ManyToMany(def) => def.order_by.push(order_by),
            Mapping::ElementCollection(def) => def.ordered = true,
            _ => {}
        }
        self
    }

    /// Loads a one-to-many as a map keyed by the target property `field`.
    pub fn map_key(mut self, field: &str) -> Self {
        if let Mapping::OneToMany(def) = &mut self.mapping {
            def.map_key = Some(field.to_string());
        }
        self
    }

    pub(super) fn column_name(&self) -> &str {
        self.column.name.as_deref().unwrap_or(&self.property.name)
    }
}

impl Default for ColumnDef {
    fn default() -> Self {
        ColumnDef {
            name: None,
            nullable: None,
            unique: false,
            length: None,
            insertable: true,
            updatable: true,
        }
    }
}

impl JoinColumnDef {
    pub fn new(name: &str) -> JoinColumnDef {
        JoinColumnDef {
            name: name.to_string(),
            referenced: None,
            nullable: None,
            unique: false,
        }
    }

    pub fn referenced(mut self, column: &str) -> Self {
        self.referenced = Some(column.to_string());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}
