//! Shared helpers for traverser-gen tests.

pub mod catalogue;
