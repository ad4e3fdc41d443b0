pub mod attachment;
pub mod company;
pub mod driver_response;
pub mod equipment;
pub mod health;
pub mod verification_session;
pub mod wizard;
