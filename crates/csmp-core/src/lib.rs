//! Shared domain types, error taxonomy, configuration, and collaborator
//! traits for the CSMP spectrum annotation pipeline.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod adduct;
pub mod batch;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;
