pub mod client;
pub mod config;
pub mod editor;
pub mod overlap;
pub mod resolver;
pub mod service;
pub mod slot;
