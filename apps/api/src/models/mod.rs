pub mod credentials;
pub mod job;
pub mod profile;
