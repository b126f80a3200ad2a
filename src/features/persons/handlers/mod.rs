pub mod person_handler;

pub use person_handler::*;
