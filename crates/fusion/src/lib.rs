//! Client and orchestration for the external face-fusion compute API.
//!
//! The compute service follows a create/poll pattern: a multipart create
//! call returns an opaque output-path token, and a query endpoint is polled
//! with that token until it reports a terminal status. This crate provides
//! the HTTP client ([`api`]), the backend seam used in tests
//! ([`backend`]), the poll loop ([`poller`]), artifact persistence
//! ([`storage`]) and the [`runner::FaceFusion`] orchestrator tying them
//! together.

pub mod api;
pub mod backend;
pub mod config;
pub mod poller;
pub mod runner;
pub mod storage;

#[cfg(test)]
mod testing;
