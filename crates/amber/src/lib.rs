mod engine;

pub mod session;
pub use session::{EntityState, Session};

pub use amber_core::{
    driver::{self, Connection},
    plan,
    schema::{self, Schema},
    stmt::{self, EntityRef, Value},
    Error, Mask, Result,
};

pub use amber_sql::Serializer;
