mod city;

pub use city::{City, CityChanges, CityWithRelationsRow};
