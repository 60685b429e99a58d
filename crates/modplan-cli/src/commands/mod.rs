pub mod check;
pub mod config;
pub mod graph;
pub mod init;
pub mod resolve;
