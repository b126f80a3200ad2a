mod province;

pub use province::{Province, ProvinceChanges, ProvinceWithCountryRow};
