//! Schemas shared by the scenario tests.

use amber::{
    schema::{app::CascadeSet, FieldDef, GeneratorDef, ModelDef, Schema},
    stmt::Type,
};

/// `Document { id, name, body }` with `body` loaded lazily.
pub fn documents() -> Schema {
    let mut builder = Schema::builder();
    builder.model(
        ModelDef::entity("Document")
            .field(FieldDef::id("id", Type::I64))
            .field(FieldDef::basic("name", Type::String))
            .field(FieldDef::basic("body", Type::Bytes).lazy(true)),
    );
    builder.build().unwrap()
}

/// Departments own their employees; employees carry a version.
///
/// Department keys come from the `Department_cseq` sequence, employee keys
/// from an identity column.
pub fn company() -> Schema {
    let mut builder = Schema::builder();
    builder
        .model(
            ModelDef::entity("Department")
                .field(FieldDef::id("id", Type::I64).generated(GeneratorDef::Sequence(None)))
                .field(FieldDef::basic("name", Type::String))
                .field(
                    FieldDef::one_to_many("employees", "Employee", "dept")
                        .cascade(CascadeSet::ALL)
                        .order_by("name", false),
                ),
        )
        .model(
            ModelDef::entity("Employee")
                .field(FieldDef::id("id", Type::I64).generated(GeneratorDef::Identity))
                .field(FieldDef::basic("name", Type::String))
                .field(FieldDef::version("version", Type::I32).primitive())
                .field(FieldDef::many_to_one("dept", "Department")),
        );
    builder.build().unwrap()
}

/// Purchases referencing a customer, a set of products and free-form tags.
pub fn shop() -> Schema {
    let mut builder = Schema::builder();
    builder
        .model(
            ModelDef::entity("Customer")
                .field(FieldDef::id("id", Type::I64))
                .field(FieldDef::basic("name", Type::String)),
        )
        .model(
            ModelDef::entity("Product")
                .field(FieldDef::id("id", Type::I64))
                .field(FieldDef::basic("name", Type::String)),
        )
        .model(
            ModelDef::entity("Purchase")
                .field(FieldDef::id("id", Type::I64).generated(GeneratorDef::Max))
                .field(FieldDef::many_to_one("customer", "Customer").cascade(CascadeSet::ALL))
                .field(
                    FieldDef::many_to_many("products", "Product")
                        .cascade(CascadeSet::ALL)
                        .order_by("name", true),
                )
                .field(FieldDef::element_collection("tags", Type::String).order_by("tags", false)),
        );
    builder.build().unwrap()
}

/// `Assignment` keyed by `(deptId, empId)`.
pub fn assignments() -> Schema {
    let mut builder = Schema::builder();
    builder.model(
        ModelDef::entity("Assignment")
            .field(FieldDef::id("deptId", Type::I32))
            .field(FieldDef::id("empId", Type::I32))
            .field(FieldDef::basic("role", Type::String)),
    );
    builder.build().unwrap()
}

/// `Manager` extends `Person`, each with its own table.
pub fn staff() -> Schema {
    let mut builder = Schema::builder();
    builder
        .model(
            ModelDef::entity("Person")
                .field(FieldDef::id("id", Type::I64))
                .field(FieldDef::basic("name", Type::String)),
        )
        .model(
            ModelDef::entity("Manager")
                .extends("Person")
                .field(FieldDef::basic("bonus", Type::I64)),
        );
    builder.build().unwrap()
}

/// Branches load their clerks together with their own row.
pub fn branches() -> Schema {
    let mut builder = Schema::builder();
    builder
        .model(
            ModelDef::entity("Branch")
                .field(FieldDef::id("id", Type::I64))
                .field(FieldDef::basic("name", Type::String))
                .field(
                    FieldDef::one_to_many("clerks", "Clerk", "branch")
                        .lazy(false)
                        .order_by("name", false),
                ),
        )
        .model(
            ModelDef::entity("Clerk")
                .field(FieldDef::id("id", Type::I64))
                .field(FieldDef::basic("name", Type::String))
                .field(FieldDef::many_to_one("branch", "Branch")),
        );
    builder.build().unwrap()
}

/// Desks of a floor, keyed by their `code`.
pub fn floors() -> Schema {
    let mut builder = Schema::builder();
    builder
        .model(
            ModelDef::entity("Floor")
                .field(FieldDef::id("id", Type::I64))
                .field(
                    FieldDef::one_to_many("desks", "Desk", "floor")
                        .map_key("code")
                        .cascade(CascadeSet::ALL),
                ),
        )
        .model(
            ModelDef::entity("Desk")
                .field(FieldDef::id("id", Type::I64))
                .field(FieldDef::basic("code", Type::String))
                .field(FieldDef::many_to_one("floor", "Floor")),
        );
    builder.build().unwrap()
}

/// A `Dept` owning at most one `Boss`, whose row holds the foreign key.
pub fn directors() -> Schema {
    let mut builder = Schema::builder();
    builder
        .model(
            ModelDef::entity("Dept")
                .field(FieldDef::id("id", Type::I64))
                .field(FieldDef::basic("name", Type::String))
                .field(
                    FieldDef::one_to_one_mapped_by("boss", "Boss", "dept")
                        .cascade(CascadeSet::ALL),
                ),
        )
        .model(
            ModelDef::entity("Boss")
                .field(FieldDef::id("id", Type::I64))
                .field(FieldDef::basic("name", Type::String))
                .field(FieldDef::one_to_one("dept", "Dept")),
        );
    builder.build().unwrap()
}

/// `Office` inherits `createdBy` from a mapped superclass and stores an
/// embedded `Address`.
pub fn offices() -> Schema {
    let mut builder = Schema::builder();
    builder
        .model(
            ModelDef::mapped_superclass("Audited")
                .field(FieldDef::basic("createdBy", Type::String)),
        )
        .model(
            ModelDef::embeddable("Address")
                .field(FieldDef::basic("city", Type::String))
                .field(FieldDef::basic("zip", Type::String)),
        )
        .model(
            ModelDef::entity("Office")
                .extends("Audited")
                .field(FieldDef::id("id", Type::I64))
                .field(FieldDef::embedded("address", "Address")),
        );
    builder.build().unwrap()
}

/// `Badge` keyed by an embedded `(deptId, empId)` id.
pub fn badges() -> Schema {
    let mut builder = Schema::builder();
    builder
        .model(
            ModelDef::embeddable("BadgeKey")
                .field(FieldDef::basic("deptId", Type::I32))
                .field(FieldDef::basic("empId", Type::I32)),
        )
        .model(
            ModelDef::entity("Badge")
                .field(FieldDef::embedded_id("id", "BadgeKey"))
                .field(FieldDef::basic("label", Type::String)),
        );
    builder.build().unwrap()
}
