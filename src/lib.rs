#![forbid(unsafe_code)]

pub mod catalog;
pub mod category;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
