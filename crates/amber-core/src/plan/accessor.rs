use crate::{
    schema::{
        app::{Field, FieldId, FieldTy, ModelId},
        Schema,
    },
    stmt::{Type, Value},
    Error, Mask, Result,
};
use by_address::ByAddress;

/// Rule deciding whether a setter write changes the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
    /// Equal values are the same value. Used for primitives, strings and
    /// other scalars without identity.
    Value,

    /// Values are the same only if they are the same object: shared
    /// buffers compare by address, entities by reference. Scalars nested in
    /// records and lists still compare by value.
    Identity,
}

/// Read access to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetterPlan {
    pub field: FieldId,

    /// Load group fetched if its bit is unset.
    pub load_group: usize,

    /// Mask word holding the load bit.
    pub word: usize,

    /// The load bit within `word`.
    pub bit: u64,

    /// Group tracking whether an association's target has been resolved.
    pub target_load_group: Option<usize>,
}

/// Write access to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetterPlan {
    pub field: FieldId,

    /// Loaded before the old value is compared.
    pub load_group: usize,

    /// Dirty bit set by a changing write. `None` for fields never written
    /// by UPDATE.
    pub update_index: Option<usize>,

    pub equality: Equality,

    /// Version field and its dirty index, set with the first dirty write.
    pub version: Option<(FieldId, usize)>,
}

impl Equality {
    pub fn for_field(field: &Field) -> Equality {
        if field.primitive {
            return Equality::Value;
        }

        match field.declared {
            Type::Bool
            | Type::I16
            | Type::I32
            | Type::I64
            | Type::F64
            | Type::String
            | Type::Timestamp => Equality::Value,
            _ => Equality::Identity,
        }
    }

    pub fn eq(self, old: &Value, new: &Value) -> bool {
        match self {
            Equality::Value => old == new,
            Equality::Identity => identical(old, new),
        }
    }
}

fn identical(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Bytes(old), Value::Bytes(new)) => ByAddress(&**old) == ByAddress(&**new),
        (Value::Record(old), Value::Record(new)) | (Value::List(old), Value::List(new)) => {
            old.len() == new.len() && old.iter().zip(new).all(|(a, b)| identical(a, b))
        }
        (Value::Map(old), Value::Map(new)) => {
            old.len() == new.len()
                && old
                    .iter()
                    .zip(new)
                    .all(|((ka, va), (kb, vb))| ka == kb && identical(va, vb))
        }
        _ => old == new,
    }
}

pub fn getter(schema: &Schema, field: FieldId) -> GetterPlan {
    let field = schema.field(field);
    let load_group = field.load_group_index();
    let word = load_group / Mask::WORD_BITS;

    GetterPlan {
        field: field.id,
        load_group,
        word,
        bit: Mask::group_bit(word, load_group),
        target_load_group: field.target_load_group(),
    }
}

/// Plans a write to `field` on an instance of `model`.
pub fn setter(schema: &Schema, model: ModelId, field: FieldId) -> Result<SetterPlan> {
    let field = schema.field(field);

    if let FieldTy::ManyToOne(rel) = &field.ty {
        if let Some(key) = rel.alias {
            return Err(Error::invalid_state(format!(
                "`{}` shares its columns with key `{}` and cannot be set",
                field.name,
                schema.field(key).name
            )));
        }
    }

    if field.accessor.setter().is_none() {
        return Err(Error::invalid_state(format!(
            "`{}` has no setter",
            field.name
        )));
    }

    let version = schema
        .entity(model)
        .version
        .and_then(|version| schema.field(version).update_index.map(|index| (version, index)));

    Ok(SetterPlan {
        field: field.id,
        load_group: field.load_group_index(),
        update_index: field.update_index,
        equality: Equality::for_field(field),
        version,
    })
}
