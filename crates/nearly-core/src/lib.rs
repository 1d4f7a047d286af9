//! # Nearly Core
//!
//! The domain layer of the Nearly backend.
//! Entities, ports and the client-side state machines (reel playback, reels
//! feed, comment threading, engagement and auth session state). Nothing in
//! here touches a database, a socket or a clock.

pub mod client;
pub mod domain;
pub mod error;
pub mod feed;
pub mod playback;
pub mod ports;
pub mod threading;

pub use error::{DomainError, RepoError};
