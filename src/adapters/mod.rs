pub mod admin;
pub mod api_handler;
pub mod encryption;
pub mod export;
pub mod health_handler;
pub mod secrets;
pub mod storage;
