//! Gateway adapters for reaching LLM providers.

mod http;

pub use http::HttpModelGateway;
