//! # checklist-core
//!
//! Foundation types shared by every daily-checklist crate:
//!
//! - **Branded IDs**: [`TaskId`] and [`ChecklistId`] as newtypes for type safety
//! - **Atomic files**: [`fs::write_atomic`] for crash-safe whole-file rewrites
//! - **Logging**: `tracing` subscriber setup and a capture layer for tests

#![deny(unsafe_code)]

pub mod fs;
pub mod ids;
pub mod logging;

pub use ids::{ChecklistId, TaskId};
