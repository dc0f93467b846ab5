pub mod generator;
pub mod persistence;
pub mod registry;
pub mod services;
pub mod session;
pub mod utils;
pub mod validator;
pub mod workflow;
