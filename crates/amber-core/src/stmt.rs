mod fragment;
pub use fragment::{Assignments, ColumnList, ColumnRef, Condition, Operand, OrderBy, Predicate};

mod statement;
pub use statement::{Aggregate, Delete, Insert, Select, Statement, TableRef, Update};

mod ty;
pub use ty::Type;

mod value;
pub use value::{EntityRef, Value};
