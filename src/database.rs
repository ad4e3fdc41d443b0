pub mod attachment;
pub mod company;
pub mod driver_response;
pub mod key_value;
pub mod memory_store;
pub mod postgres_store;
pub mod redis_store;
pub mod repository;
pub mod verification_session;
pub mod wizard_draft;
