//! Text generation against an OpenAI-style chat-completion endpoint.
//!
//! Three widgets share one request/response contract and differ only in the
//! prompt they send: topic explanations, key takeaways, and SWOT-style
//! feedback on the user's own explanation.

mod client;
mod prompt;
pub mod render;

pub use client::{AiSettings, TextGenClient, API_KEY_VAR, API_URL_VAR, MODEL_VAR};
pub use prompt::{AcademicLevel, Prompt};
