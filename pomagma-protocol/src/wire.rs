//! Length-framed message encoding shared by [`crate::server::Server`] and
//! [`crate::client::Client`]: a 4-byte big-endian length prefix followed by a `bincode`-encoded
//! payload.

use std::io::{Read, Write};

use pomagma_util::{PomagmaError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Refuses to allocate a read buffer larger than this many bytes for a single message, so a
/// corrupt or adversarial length prefix can't be used to exhaust memory.
pub const MAX_MESSAGE_BYTES: u32 = 256 * 1024 * 1024;

pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<()> {
    let bytes = bincode::serialize(message)?;
    let len = u32::try_from(bytes.len())
        .map_err(|_| PomagmaError::Parse(format!("message of {} bytes exceeds u32 length prefix", bytes.len())))?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_BYTES {
        return Err(PomagmaError::Parse(format!(
            "message length {len} exceeds maximum of {MAX_MESSAGE_BYTES}"
        )));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    let message = bincode::deserialize(&buf)?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_string_through_the_frame() {
        let mut buf = Vec::new();
        write_message(&mut buf, &"hello".to_string()).expect("write");
        let mut cursor = std::io::Cursor::new(buf);
        let out: String = read_message(&mut cursor).expect("read");
        assert_eq!(out, "hello");
    }

    #[test]
    fn rejects_a_length_prefix_over_the_cap() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_MESSAGE_BYTES + 1).to_be_bytes());
        let mut cursor = std::io::Cursor::new(buf);
        let result: Result<String> = read_message(&mut cursor);
        assert!(result.is_err());
    }
}
