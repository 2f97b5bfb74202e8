//! Top-level facade crate for carbon-registry.
//!
//! Re-exports the cache core and the server library so users can depend on a single crate.

pub mod core {
    pub use carbon_registry_core::*;
}

pub mod server {
    pub use carbon_registry_server::*;
}
