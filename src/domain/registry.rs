pub mod node_registry;
