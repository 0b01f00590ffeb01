//! The sole call site for `cloudflare-zlib`, used to compress each snapshot section before its
//! digest is taken (see the snapshot format in `pomagma-structure::snapshot`). Isolated to one
//! small module so the rest of the workspace never touches the zlib binding directly.

use cloudflare_zlib::{Deflate, Inflate};

use crate::error::PomagmaError;
use crate::Result;

/// Deflates `data` at the default compression level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut deflate = Deflate::new(Deflate::DEFAULT_COMPRESSION)
        .map_err(|e| PomagmaError::Parse(format!("zlib deflate init failed: {e}")))?;
    deflate
        .write(data)
        .map_err(|e| PomagmaError::Parse(format!("zlib deflate write failed: {e}")))?;
    deflate
        .finish()
        .map_err(|e| PomagmaError::Parse(format!("zlib deflate finish failed: {e}")))
}

/// Inflates a buffer produced by [`compress`]. `expected_len` is the exact decompressed size,
/// which every snapshot section records alongside its compressed bytes.
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut inflate = Inflate::new();
    let mut out = Vec::with_capacity(expected_len);
    inflate
        .inflate(data, &mut out)
        .map_err(|e| PomagmaError::Parse(format!("zlib inflate failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let original = b"pomagma snapshot section payload, repeated repeated repeated";
        let compressed = compress(original).expect("compress");
        let decompressed = decompress(&compressed, original.len()).expect("decompress");
        assert_eq!(decompressed, original);
    }

    #[test]
    fn round_trips_empty_input() {
        let compressed = compress(&[]).expect("compress");
        let decompressed = decompress(&compressed, 0).expect("decompress");
        assert!(decompressed.is_empty());
    }
}
