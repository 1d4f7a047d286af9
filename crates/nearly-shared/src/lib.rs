//! # Nearly Shared
//!
//! Wire types shared by the API server and its clients.
//! Kept free of server dependencies so a WASM client can compile it too.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
