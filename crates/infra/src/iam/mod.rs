//! Identity and access management resources

pub mod clients;

pub use clients::ClientsService;
