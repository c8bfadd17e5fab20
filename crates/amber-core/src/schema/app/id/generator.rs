/// Strategy producing new primary key values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Generator {
    /// Database identity column, read back after INSERT.
    Identity,

    /// Left to the database; handled like `Identity`.
    Auto,

    /// Named sequence, read before INSERT.
    Sequence { name: String },

    /// Generator table, read before INSERT.
    Table { name: String },

    /// One more than the column's current maximum, read before INSERT.
    Max,
}

impl Generator {
    /// Suffix of the default sequence name, appended to the table name.
    pub const SEQUENCE_SUFFIX: &'static str = "_cseq";

    pub fn default_sequence_name(table: &str) -> String {
        format!("{table}{}", Self::SEQUENCE_SUFFIX)
    }

    /// True if the value is produced by the INSERT itself.
    pub fn is_identity(&self) -> bool {
        matches!(self, Generator::Identity | Generator::Auto)
    }

    /// Sequence or generator table consulted before INSERT.
    pub fn sequence_name(&self) -> Option<&str> {
        match self {
            Generator::Sequence { name } | Generator::Table { name } => Some(name),
            _ => None,
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            Generator::Identity => "identity",
            Generator::Auto => "auto",
            Generator::Sequence { .. } => "sequence",
            Generator::Table { .. } => "table",
            Generator::Max => "max",
        }
    }
}
