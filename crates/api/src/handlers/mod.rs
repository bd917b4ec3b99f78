pub mod face_swap;
pub mod jobs;
pub mod upload;
