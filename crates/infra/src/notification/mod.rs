//! Event notification resources

pub mod producers;

pub use producers::ProducerService;
