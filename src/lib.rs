// Crate root library declaration and module exports.
pub mod board;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod controller;
pub mod document;
pub mod error;
pub mod host;
pub mod model;
pub mod report;
pub mod storage;
pub mod submitter;
