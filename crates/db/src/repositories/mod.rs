//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod fusion_job_repo;

pub use fusion_job_repo::FusionJobRepo;
