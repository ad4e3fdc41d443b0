pub mod attachment;
pub mod company;
pub mod links;
pub mod report;
pub mod response;
pub mod verification_session;
pub mod wizard;
