pub mod client;
pub mod version;

pub use client::{RegistryClient, VersionLookup, VersionSource};
