//! Reversible byte transforms applied to the stored document.
//!
//! **None of this is encryption.** [`XorCipher`] only keeps the file from
//! being read or hand-edited at a glance; anyone holding the binary can
//! recover the key. Plug in a real cipher through [`ByteTransform`] if the
//! contents need protecting.

use std::fmt;
use std::sync::Arc;

/// A reversible transform over the serialized document.
///
/// Implementations must satisfy `decrypt(&encrypt(x)) == x` for every `x`.
pub trait ByteTransform: fmt::Debug + Send + Sync {
    fn encrypt(&self, plain: &[u8]) -> Vec<u8>;
    fn decrypt(&self, stored: &[u8]) -> Vec<u8>;
}

pub type SharedTransform = Arc<dyn ByteTransform>;

/// Leaves bytes untouched. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl ByteTransform for Identity {
    fn encrypt(&self, plain: &[u8]) -> Vec<u8> {
        plain.to_vec()
    }

    fn decrypt(&self, stored: &[u8]) -> Vec<u8> {
        stored.to_vec()
    }
}

/// XOR every byte with the key, cycling the key over the stream.
#[derive(Clone)]
pub struct XorCipher {
    key: Vec<u8>,
}

impl XorCipher {
    /// An empty key makes the cipher a no-op.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    fn apply(&self, bytes: &[u8]) -> Vec<u8> {
        if self.key.is_empty() {
            return bytes.to_vec();
        }
        bytes
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }
}

impl fmt::Debug for XorCipher {
    /// Shows only the key length.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XorCipher")
            .field("key_len", &self.key.len())
            .finish()
    }
}

impl ByteTransform for XorCipher {
    fn encrypt(&self, plain: &[u8]) -> Vec<u8> {
        self.apply(plain)
    }

    fn decrypt(&self, stored: &[u8]) -> Vec<u8> {
        self.apply(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_reversible() {
        let cipher = XorCipher::new(b"k3y".to_vec());
        let plain = br#"{"__version__": 1, "name": "John"}"#;
        let stored = cipher.encrypt(plain);
        assert_ne!(stored.as_slice(), plain.as_slice());
        assert_eq!(cipher.decrypt(&stored), plain.to_vec());
    }

    #[test]
    fn xor_cycles_key() {
        let cipher = XorCipher::new(vec![0x01, 0x02]);
        assert_eq!(cipher.encrypt(&[0, 0, 0, 0, 0]), vec![1, 2, 1, 2, 1]);
    }

    #[test]
    fn xor_empty_key_is_noop() {
        let cipher = XorCipher::new(Vec::new());
        assert_eq!(cipher.encrypt(b"abc"), b"abc".to_vec());
    }

    #[test]
    fn xor_is_deterministic() {
        let cipher = XorCipher::new("secret");
        assert_eq!(cipher.encrypt(b"same input"), cipher.encrypt(b"same input"));
    }

    #[test]
    fn debug_hides_key() {
        let cipher = XorCipher::new("secret");
        assert!(!format!("{cipher:?}").contains("secret"));
    }

    #[test]
    fn identity_round_trips() {
        assert_eq!(Identity.decrypt(&Identity.encrypt(b"x")), b"x".to_vec());
    }
}
