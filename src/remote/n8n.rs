pub mod n8n_client;
pub mod n8n_endpoint;
