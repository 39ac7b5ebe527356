pub mod decoder;
pub mod engine;
pub mod interfaces;
pub mod queue;
pub mod store;
