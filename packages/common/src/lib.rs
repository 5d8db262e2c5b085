pub mod error;
pub mod query;
pub mod visitor;

pub use error::*;
pub use query::*;
pub use visitor::*;
