pub mod catalog;
pub mod mistral;
pub mod n8n;
