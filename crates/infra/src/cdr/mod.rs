//! Clinical data repository (FHIR store)

pub mod client;

pub use client::CdrClient;
