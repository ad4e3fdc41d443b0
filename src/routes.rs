pub mod attachment;
pub mod company;
pub mod driver;
pub mod error;
pub mod file;
pub mod health;
pub mod response;
pub mod verification_session;
pub mod wizard;
