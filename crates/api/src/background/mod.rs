//! Background tasks.
//!
//! Each submodule provides long-running async work intended to be spawned
//! via `tokio::spawn`. All tasks accept a [`CancellationToken`] for
//! graceful shutdown.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod fusion_jobs;
