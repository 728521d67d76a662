pub mod authority;
pub mod error;
pub mod property_registry;
