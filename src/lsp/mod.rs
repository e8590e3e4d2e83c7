//! LSP Protocol Implementation
//!
//! Backend state, request handlers and the stdio server loop.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod server;

pub use backend::Backend;
pub use document::DocumentState;
