use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers, model as auth_model};
use crate::features::cities::{dtos as cities_dtos, handlers as cities_handlers};
use crate::features::countries::{dtos as countries_dtos, handlers as countries_handlers};
use crate::features::persons::{
    dtos as persons_dtos, handlers as persons_handlers, models as persons_models,
};
use crate::features::provinces::{dtos as provinces_dtos, handlers as provinces_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::get_me,
        // Countries
        countries_handlers::create_country,
        countries_handlers::list_countries,
        countries_handlers::search_countries,
        countries_handlers::get_country,
        countries_handlers::update_put_country,
        countries_handlers::update_patch_country,
        countries_handlers::delete_country,
        // Provinces
        provinces_handlers::create_province,
        provinces_handlers::list_provinces,
        provinces_handlers::search_provinces,
        provinces_handlers::get_province,
        provinces_handlers::update_put_province,
        provinces_handlers::update_patch_province,
        provinces_handlers::delete_province,
        // Cities
        cities_handlers::create_city,
        cities_handlers::list_cities,
        cities_handlers::search_cities,
        cities_handlers::get_city,
        cities_handlers::update_put_city,
        cities_handlers::update_patch_city,
        cities_handlers::delete_city,
        // Persons
        persons_handlers::create_person,
        persons_handlers::list_persons,
        persons_handlers::search_persons,
        persons_handlers::get_person,
        persons_handlers::update_put_person,
        persons_handlers::update_patch_person,
        persons_handlers::delete_person,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth_model::AuthenticatedUser,
            auth_dtos::LoginRequestDto,
            auth_dtos::RegisterRequestDto,
            auth_dtos::TokenResponseDto,
            auth_dtos::RegisterResponseDto,
            auth_dtos::MeResponseDto,
            ApiResponse<auth_dtos::TokenResponseDto>,
            ApiResponse<auth_dtos::RegisterResponseDto>,
            ApiResponse<auth_dtos::MeResponseDto>,
            // Countries
            countries_dtos::CreateCountryDto,
            countries_dtos::UpdatePutCountryDto,
            countries_dtos::UpdatePatchCountryDto,
            countries_dtos::CountryResponseDto,
            ApiResponse<countries_dtos::CountryResponseDto>,
            ApiResponse<Vec<countries_dtos::CountryResponseDto>>,
            // Provinces
            provinces_dtos::CreateProvinceDto,
            provinces_dtos::UpdatePutProvinceDto,
            provinces_dtos::UpdatePatchProvinceDto,
            provinces_dtos::ProvinceResponseDto,
            ApiResponse<provinces_dtos::ProvinceResponseDto>,
            ApiResponse<Vec<provinces_dtos::ProvinceResponseDto>>,
            // Cities
            cities_dtos::CreateCityDto,
            cities_dtos::UpdatePutCityDto,
            cities_dtos::UpdatePatchCityDto,
            cities_dtos::CityResponseDto,
            ApiResponse<cities_dtos::CityResponseDto>,
            ApiResponse<Vec<cities_dtos::CityResponseDto>>,
            // Persons
            persons_models::PersonRole,
            persons_dtos::CreatePersonDto,
            persons_dtos::UpdatePutPersonDto,
            persons_dtos::UpdatePatchPersonDto,
            persons_dtos::PersonResponseDto,
            ApiResponse<persons_dtos::PersonResponseDto>,
            ApiResponse<Vec<persons_dtos::PersonResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "countries", description = "Country reference data"),
        (name = "provinces", description = "Province reference data"),
        (name = "cities", description = "City reference data"),
        (name = "persons", description = "Registered persons (staff only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Georef API",
        version = "0.1.0",
        description = "Geographic reference data and person registration",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
