//! Functions exposed to the remote agent

pub mod price;

pub use price::PriceLookupTool;
