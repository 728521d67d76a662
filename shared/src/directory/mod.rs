pub mod error;
pub mod object_directory;
pub mod object_id;
