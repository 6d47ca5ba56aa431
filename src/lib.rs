#![forbid(unsafe_code)]

pub mod book_store;
pub mod cli;
pub mod config;
pub mod export;
pub mod fetch;
pub mod formats;
pub mod http;
pub mod logging;
pub mod resolver;
pub mod status;
