//! City reference data.
//!
//! Bottom of the geographic hierarchy. A city belongs to a province, reads
//! embed the province with its country, and registration resolves a city by
//! name (optionally narrowed by province name).

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CityService;
