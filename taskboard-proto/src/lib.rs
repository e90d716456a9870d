//! Shared wire definitions for the Taskboard REST backend.

pub mod activity;
pub mod codec;
pub mod project;
pub mod task;
pub mod user;
