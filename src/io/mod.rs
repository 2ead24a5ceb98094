//! Network I/O behind the fetch stage.

mod client;
mod mock;
mod transport;

pub use client::create_client;
pub use mock::MockTransport;
pub use transport::{HttpTransport, Transport, TransportResponse};
