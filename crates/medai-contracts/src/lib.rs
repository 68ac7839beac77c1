//! # medai-contracts
//!
//! Shared types, schemas, and errors for MedAi Navigator.
//!
//! Every other crate in the workspace imports from here. This crate holds
//! data definitions only; validation and business rules live in
//! `medai-navigator`.

pub mod error;
pub mod flow;
pub mod planner;
pub mod services;
pub mod verify;
