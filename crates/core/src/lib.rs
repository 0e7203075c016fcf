//! Core monetary logic for Coinage.
//!
//! This crate contains pure arithmetic with ZERO I/O. All money types,
//! reconciliation rules and calculations live here.
//!
//! # Modules
//!
//! - `currency` - Monetary types, values, calculations and allocation

pub mod currency;
