pub mod handlers;
pub mod routes;

pub use routes::{handle_rejection, routes};
