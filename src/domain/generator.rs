pub mod connection_builder;
pub mod generator;
pub mod node_synthesizer;
pub mod pattern_selector;
pub mod prompt;
pub mod strategy;
