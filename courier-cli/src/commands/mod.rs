pub mod handler;

pub mod envelope;
pub mod negotiate;
pub mod profile;
