// handlers module - REST route handlers
// Contains handlers for generation, modification, download, deployment

pub mod deploy;
pub mod download;
pub mod generate;
