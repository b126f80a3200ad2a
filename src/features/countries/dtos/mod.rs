mod country_dto;

pub use country_dto::{
    CountryResponseDto, CreateCountryDto, ListCountriesQuery, UpdatePatchCountryDto,
    UpdatePutCountryDto,
};
