pub mod core;
pub mod service;
pub mod structs;
pub mod tasks;
pub mod utils;
