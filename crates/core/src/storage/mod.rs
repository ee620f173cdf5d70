pub mod file_store;
pub mod format;
pub mod store;
