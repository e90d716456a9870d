//! Taskboard — terminal Kanban client with optimistic status updates.
//!
//! - [`api`]: REST client and the [`api::TaskBackend`] seam the board uses
//! - [`board`]: store, drag controller and optimistic update coordinator
//! - [`net`]: background worker bridging the TUI loop and the backend
//! - [`app`] / [`ui`]: terminal presentation

pub mod api;
pub mod app;
pub mod board;
pub mod config;
pub mod net;
pub mod ui;
