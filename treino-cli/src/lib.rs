//! Terminal client for the Treino API. Exposed as a library so the client and
//! renderers can be tested without spawning the binary.

pub mod api;
pub mod commands;
pub mod config;
pub mod output;
