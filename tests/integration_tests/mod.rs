//! Integration tests module
//!
//! This module provides end-to-end tests for the sweep engine, including:
//! - Complete fetch → validate → persist cycles against mock servers
//! - Aborted cycles and store preservation
//! - Query helper properties

pub mod error_scenarios;
pub mod fixtures;
pub mod pagination_test;
pub mod sweep_test;
