//! DAENCE: deterministic authenticated encryption with no
//! nonsense.
//!
//! DAENCE is a nonce-misuse-resistant construction in the
//! synthetic IV family. There is no nonce to get wrong: the
//! associated data and the message are compressed with Poly1305
//! under two independent keys, the two digests are chained
//! through HChaCha20 (or HSalsa20) into a 192-bit synthetic
//! value, and that value is both the authentication tag and the
//! XChaCha20 (or XSalsa20) nonce that encrypts the message.
//!
//! The ciphertext is the 24-octet synthetic value followed by
//! the encrypted message. There is no version tag or length
//! field.
//!
//! This crate implements
//!
//! - [`ChaChaDaence`], keyed with 64 octets, and
//! - [`Salsa20Daence`], keyed with 96 octets,
//!
//! along with the subkey derivation functions they are built
//! from. The unauthenticated stream ciphers are re-exported from
//! the `chacha20` and `salsa20` crates.
//!
//! # Example
//!
//! ```rust
//! use daence::ChaChaDaence;
//!
//! let aead = ChaChaDaence::new(&[0x42u8; 64]);
//! let msg = b"attack at dawn";
//!
//! let mut ciphertext = [0u8; 14 + ChaChaDaence::TAG_SIZE];
//! aead.seal(&mut ciphertext, msg, b"header")?;
//!
//! let mut plaintext = [0u8; 14];
//! aead.open(&mut plaintext, &ciphertext, b"header")?;
//! assert_eq!(&plaintext, msg);
//! # Ok::<(), daence::Error>(())
//! ```
//!
//! # Usage limits
//!
//! Determinism means that equal (associated data, message) pairs
//! produce equal ciphertexts, and nothing else about them leaks.
//! Each message must be at most [`Daence::P_MAX`] octets, which is
//! what the 32-bit block counter of ChaCha20 allows.

#![cfg_attr(docs, feature(doc_cfg))]
#![cfg_attr(feature = "error_in_core", feature(error_in_core))]
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::implicit_saturating_sub,
    clippy::panic,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]
#![forbid(unsafe_code)]

mod auth;
mod daence;
mod permute;

pub use {
    auth::{Authenticator, Digests, DualPoly1305, NestedPoly1305, AUTH_KEY_SIZE, DIGEST_SIZE},
    chacha20::{ChaCha20, XChaCha20},
    daence::{ChaChaDaence, Daence, Salsa20Daence, TAG_SIZE},
    permute::{
        derive_subkey, hchacha20, hsalsa20, permute, ChaCha, Permutation, Salsa, BLOCK_SIZE,
        INPUT_SIZE, KEY_SIZE, XNONCE_SIZE,
    },
    salsa20::{Salsa20, XSalsa20},
};

/// Re-exported for the stream cipher traits.
pub use cipher;

use {cfg_if::cfg_if, core::fmt, core::mem::size_of};

cfg_if! {
    if #[cfg(feature = "error_in_core")] {
        use core::error;
    } else if #[cfg(feature = "std")] {
        use std::error;
    }
}

/// Like [`assert!`], but forces a compile-time error.
macro_rules! const_assert {
    ($($tt:tt)*) => {
        const _: () = assert!($($tt)*);
    }
}
// Lengths are encoded as `u64`s.
const_assert!(size_of::<usize>() <= 8);

/// An error returned by this crate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The plaintext is too large.
    PlaintextTooLarge,
    /// The ciphertext is too large.
    CiphertextTooLarge,
    /// The ciphertext is shorter than a synthetic value.
    MalformedCiphertext,
    /// The output buffer is too small.
    BufferTooSmall,
    /// The key has the wrong length.
    InvalidKeyLength,
    /// The message could not be authenticated.
    Authentication,
    /// A known-answer self-test failed.
    SelfTest,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaintextTooLarge => write!(f, "plaintext too large"),
            Self::CiphertextTooLarge => write!(f, "ciphertext too large"),
            Self::MalformedCiphertext => {
                write!(f, "ciphertext shorter than the synthetic value")
            }
            Self::BufferTooSmall => write!(f, "output buffer too small"),
            Self::InvalidKeyLength => write!(f, "invalid key length"),
            Self::Authentication => write!(f, "message authentication failure"),
            Self::SelfTest => write!(f, "known-answer self-test failed"),
        }
    }
}

#[cfg_attr(docs, doc(cfg(any(feature = "error_in_core", feature = "std"))))]
#[cfg(any(feature = "error_in_core", feature = "std"))]
impl error::Error for Error {}

/// Runs the known-answer self-tests of every scheme in this
/// crate.
///
/// Intended for startup health checks. Returns
/// [`Error::SelfTest`] if any scheme fails to reproduce its
/// reference vector.
pub fn self_test() -> Result<(), Error> {
    ChaChaDaence::self_test()?;
    Salsa20Daence::self_test()
}

cfg_if! {
    if #[cfg(feature = "zeroize")] {
        /// Overwrites secret octets with zeros.
        #[inline(always)]
        pub(crate) fn wipe(buf: &mut [u8]) {
            zeroize::Zeroize::zeroize(buf);
        }
    } else {
        /// Overwrites secret octets with zeros.
        ///
        /// Without `zeroize` the compiler is free to elide this.
        #[inline(always)]
        pub(crate) fn wipe(buf: &mut [u8]) {
            buf.fill(0);
        }
    }
}
