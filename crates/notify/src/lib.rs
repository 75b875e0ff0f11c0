pub mod discord;
pub mod log;
pub mod payload;
