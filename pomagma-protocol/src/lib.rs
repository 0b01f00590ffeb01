//! The request/response wire protocol: message framing, the `Request`/`Response`
//! oneof, and a blocking TCP server/client pair. Transport-only — `pomagma-cli` wires a `Handler`
//! that actually drives a structure.

mod client;
mod protocol;
mod server;
mod wire;

pub use client::Client;
pub use protocol::{Request, Response};
pub use server::{Handler, Server};
pub use wire::{read_message, write_message, MAX_MESSAGE_BYTES};
