mod person_dto;

pub use person_dto::{
    CreatePersonDto, PersonResponseDto, UpdatePatchPersonDto, UpdatePutPersonDto,
};
