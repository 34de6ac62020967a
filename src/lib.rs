//! Astraflow core: generation backend turning n8n workflows into runnable
//! React applications.
//!
//! The pipeline: workflow JSON → prompt → generative text service → raw
//! text → [`normalize`] → preview snippet ([`preview`]), project tree
//! ([`project`]) → archive ([`archive`]) or deployment ([`publish`]).

pub mod archive;
pub mod config;
pub mod generate;
pub mod normalize;
pub mod preview;
pub mod project;
pub mod publish;
pub mod server;
pub mod session;
pub mod util;
pub mod workflow;
