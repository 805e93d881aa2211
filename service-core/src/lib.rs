//! service-core: Shared infrastructure for the Eagle Bank services.
pub mod error;
pub mod observability;
