mod auth_dto;

pub use auth_dto::{
    LoginRequestDto, MeResponseDto, RegisterRequestDto, RegisterResponseDto, TokenResponseDto,
};
