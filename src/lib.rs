//! Intent Bridge
//!
//! Executes smart-home command intents against a home-automation item
//! registry: challenge gating, optional state validation around dispatch,
//! and per-device outcome reporting for batched requests.

pub mod catalog;
pub mod challenge;
pub mod command;
pub mod config;
pub mod registry;
