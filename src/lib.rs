pub mod app;
pub mod config;
pub mod error;
pub mod guide;
pub mod history;
pub mod input;
pub mod notify;
pub mod selector;
pub mod serve;
