//! Picapica Backend Client
//!
//! The booth's only external collaborator: a hosted auth + relational
//! storage service, treated as an opaque boundary. This crate defines
//! the call contract ([`BoothBackend`]), a REST implementation for the
//! hosted service, an in-memory implementation for tests and offline
//! runs, and the process-wide [`auth::AuthContext`].

pub mod auth;
pub mod backend;
pub mod hosted;
pub mod memory;

pub use auth::{AuthContext, AuthSnapshot};
pub use backend::{record_download, BoothBackend};
pub use hosted::HostedBackend;
pub use memory::MemoryBackend;

use base64::Engine as _;

/// Encode composed strip bytes the way the image table stores them.
pub fn encode_image_data(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode stored image data back to raw bytes.
pub fn decode_image_data(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_data_round_trips() {
        let bytes = vec![1u8, 2, 3, 250, 251, 252];
        let encoded = encode_image_data(&bytes);
        assert_eq!(decode_image_data(&encoded).unwrap(), bytes);
    }
}
