//! Integration test utilities for the relay
//!
//! This crate provides helpers for running end-to-end tests against a
//! relay server bound to a local port.

pub mod helpers;

pub use helpers::*;
