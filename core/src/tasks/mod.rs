pub mod actions;
mod collection;
pub mod definition;
pub mod error;
mod fields;
pub mod folder;
pub mod principal;
pub mod registered;
pub mod registration;
pub mod repetition;
pub mod running;
pub mod scheduler;
pub mod settings;
mod snapshot;
pub mod triggers;
pub mod values;
