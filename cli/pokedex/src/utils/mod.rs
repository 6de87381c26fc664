pub mod dialog;
pub mod logger;
pub mod message;
