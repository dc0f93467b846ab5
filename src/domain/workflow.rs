pub mod connection;
pub mod workflow;
pub mod workflow_node;
