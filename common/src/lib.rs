pub mod flags;
pub mod windows;
