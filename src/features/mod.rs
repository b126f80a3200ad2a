pub mod auth;
pub mod cities;
pub mod countries;
pub mod persons;
pub mod provinces;
