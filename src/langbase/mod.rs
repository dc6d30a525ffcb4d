//! Langbase Pipes client, the HTTP backend behind every generation call.

mod client;
mod types;


pub use client::LangbaseClient;
pub use types::*;
