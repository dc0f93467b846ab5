pub mod completion_dto;
pub mod deployment_dto;
pub mod template_dto;
