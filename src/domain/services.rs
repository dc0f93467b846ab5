pub mod completion_service_trait;
pub mod deployment_service_trait;
pub mod template_search_trait;
