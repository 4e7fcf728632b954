//! Leadflow Core
//!
//! Core types and abstractions shared by the Leadflow client, workflows and CLI.
//!
//! This crate contains:
//! - Domain types: remote tasks, their status labels and status snapshots
//! - DTOs: request and response bodies of the lead automation API
//! - Input normalization: turning raw user input into submittable lists

pub mod domain;
pub mod dto;
pub mod input;
