//! Core domain types
//!
//! This module contains the structures that describe a unit of remote work:
//! its status label, the snapshots returned by the status endpoints, and the
//! locally tracked task that wraps the latest snapshot.

pub mod status;
pub mod task;
