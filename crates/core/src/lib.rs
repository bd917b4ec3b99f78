//! Domain types shared by the faceswap crates.
//!
//! Nothing in here performs I/O: the fusion client, the database layer and
//! the HTTP server all build on these types.

pub mod error;
pub mod fusion_state;
pub mod media;
pub mod query_status;
pub mod types;
pub mod upload;
