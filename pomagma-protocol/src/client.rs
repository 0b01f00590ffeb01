//! A small blocking client over the same length-framed stream [`crate::server::Server`] speaks.

use std::net::TcpStream;

use pomagma_util::Result;

use crate::protocol::{Request, Response};
use crate::wire::{read_message, write_message};

pub struct Client {
    stream: TcpStream,
}

impl Client {
    pub fn connect(addr: &str) -> Result<Client> {
        let stream = TcpStream::connect(addr)?;
        Ok(Client { stream })
    }

    /// Sends one request and blocks for its response. The connection stays open, so a client may
    /// call repeatedly without reconnecting.
    pub fn call(&mut self, request: &Request) -> Result<Response> {
        write_message(&mut self.stream, request)?;
        read_message(&mut self.stream)
    }
}
