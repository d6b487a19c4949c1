//! API key rotation for catalog requests.

mod credential_source;
mod key_rotation;

pub use credential_source::{parse_keys, CredentialSource, KeysFile, StaticKeys, DEFAULT_KEYS_FILE};
pub use key_rotation::KeyRotation;
