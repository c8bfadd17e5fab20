mod bind;

mod cascade;
pub(crate) use cascade::{Cascade, Lifecycle};

mod exec;
mod flush;
mod lifecycle;
mod load;
