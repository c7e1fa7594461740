pub mod dispatcher;
pub mod types;

pub use types::*;
