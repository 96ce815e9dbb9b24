//! Row models for the raw statements the repositories run.

pub mod post;
pub mod version;
