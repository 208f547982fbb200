pub mod logger;
pub mod token;
