//! Country reference data.
//!
//! Top of the geographic hierarchy. Names and ISO-style codes are unique
//! across the table, and a country cannot be deleted while provinces still
//! reference it.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CountryService;
