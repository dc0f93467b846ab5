pub mod workflow_store;
