//! Bundled outline providers.
//!
//! The engine only depends on the [`OutlineProvider`](super::outline::OutlineProvider)
//! trait; this module ships the default tree-sitter implementation for
//! front-end source files.

mod javascript;

pub use javascript::TreeSitterProvider;
