pub mod call;
pub mod config;
pub mod direction;
pub mod error;
pub mod event;
pub mod event_channel;
