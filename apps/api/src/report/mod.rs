//! Report pipeline — prompt formatting, concurrent generation, normalization
//! and the HTTP handlers that expose them.

pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod requester;
