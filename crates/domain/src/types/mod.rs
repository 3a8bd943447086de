//! Resource types and models

pub mod client;
pub mod producer;
pub mod service;

pub use client::{ApplicationClient, ClientMeta, ScopesUpdate};
pub use producer::Producer;
pub use service::Service;
