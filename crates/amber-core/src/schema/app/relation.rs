mod dependent_one_to_one;
pub use dependent_one_to_one::DependentOneToOne;

mod element_collection;
pub use element_collection::ElementCollection;

mod many_to_many;
pub use many_to_many::ManyToMany;

mod many_to_one;
pub use many_to_one::ManyToOne;

mod one_to_many;
pub use one_to_many::{MapKey, OneToMany};

use crate::schema::{app::FieldId, db::ColumnId};

/// Ordering applied when a collection is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderByColumn {
    /// Target field holding the sort value.
    pub field: FieldId,

    pub column: ColumnId,
    pub descending: bool,
}
