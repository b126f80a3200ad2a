pub mod country_handler;

pub use country_handler::*;
