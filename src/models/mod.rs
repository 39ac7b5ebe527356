pub mod config;
pub mod flow;
pub mod interface;
pub mod packet;
pub mod stats;
