pub(crate) mod encoding;
pub mod error;
pub mod logging;
pub(crate) mod regex_options;
pub mod scheduler_toml;
pub(crate) mod strings;
pub mod time;
