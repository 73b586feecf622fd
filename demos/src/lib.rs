//! Shared pieces for the demo programs under `examples/`.
//!
//! Every demo expects the `mock-backend` binary to be listening on port 3000.
use std::net::SocketAddr;

pub use mock_backend::client::HttpBackend;

pub const MOCK_BACKEND_PORT: u16 = 3000;

/// Client for `route` on the locally running mock backend.
pub fn backend(route: &str) -> HttpBackend {
    HttpBackend::new(SocketAddr::from(([127, 0, 0, 1], MOCK_BACKEND_PORT)), route)
}
