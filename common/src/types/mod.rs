pub mod document;
pub mod file_handle;
