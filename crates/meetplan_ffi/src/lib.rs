//! FFI crate entry point.

pub mod api;
