pub mod mistral_client;
