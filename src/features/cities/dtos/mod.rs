mod city_dto;

pub use city_dto::{
    CityResponseDto, CreateCityDto, UpdatePatchCityDto, UpdatePutCityDto,
};
