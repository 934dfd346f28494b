pub(crate) mod client;
pub(crate) mod loader;
pub(crate) mod prompt;
pub(crate) mod sse;
pub(crate) mod worker;

pub(crate) use client::{GeminiClient, StreamClient};
pub(crate) use worker::spawn_generation;
