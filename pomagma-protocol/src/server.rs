//! A blocking, thread-per-connection request/response server: one socket accepting many
//! connections, each driving a length-framed TCP stream (see [`crate::wire`]) carrying one
//! request and one response per round trip, dispatched to a single handler.

use std::io::ErrorKind;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use pomagma_util::Result;

use crate::protocol::{Request, Response};
use crate::wire::{read_message, write_message};

/// Handles one decoded request and produces the response to send back. Implemented by whatever
/// owns the `Structure` being served (`pomagma-cli`); kept as a trait object here so
/// `pomagma-protocol` never depends on `pomagma-structure`.
pub trait Handler: Send + Sync {
    fn handle(&self, request: Request) -> Response;
}

impl<F: Fn(Request) -> Response + Send + Sync> Handler for F {
    fn handle(&self, request: Request) -> Response {
        self(request)
    }
}

pub struct Server {
    listener: TcpListener,
}

impl Server {
    pub fn bind(addr: &str) -> Result<Server> {
        let listener = TcpListener::bind(addr)?;
        Ok(Server { listener })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections forever, spawning one OS thread per connection. Each connection thread
    /// serves requests from that socket until the peer disconnects or sends malformed input.
    pub fn serve(&self, handler: Arc<dyn Handler>) -> Result<()> {
        for stream in self.listener.incoming() {
            let stream = stream?;
            let handler = handler.clone();
            thread::spawn(move || {
                if let Err(e) = serve_connection(stream, handler.as_ref()) {
                    tracing::warn!(error = %e, "pomagma-protocol connection ended with an error");
                }
            });
        }
        Ok(())
    }
}

fn serve_connection(mut stream: TcpStream, handler: &dyn Handler) -> Result<()> {
    loop {
        let request: Request = match read_message(&mut stream) {
            Ok(r) => r,
            Err(pomagma_util::PomagmaError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                return Ok(())
            }
            Err(e) => return Err(e),
        };
        let response = handler.handle(request);
        write_message(&mut stream, &response)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use std::collections::HashMap;

    #[test]
    fn server_round_trips_a_request_through_a_handler() {
        let server = Server::bind("127.0.0.1:0").expect("bind");
        let addr = server.local_addr().expect("addr");

        let handler: Arc<dyn Handler> = Arc::new(|req: Request| match req {
            Request::GetHistogram => Response::Histogram {
                counts: HashMap::new(),
            },
            _ => Response::Error {
                message: "unexpected request".to_string(),
            },
        });

        let join = thread::spawn(move || {
            server.serve(handler).ok();
        });

        let mut client = Client::connect(&addr.to_string()).expect("connect");
        let response = client.call(&Request::GetHistogram).expect("call");
        assert_eq!(
            response,
            Response::Histogram {
                counts: HashMap::new()
            }
        );
        drop(client);
        drop(join);
    }
}
