//! Message compression with pairs of Poly1305 keys.
//!
//! Each authentication key is 128 bits. Poly1305 wants a 256-bit
//! key `r || s`, so the key becomes the evaluation point `r` and
//! the addend `s` is zero.

use {
    crate::wipe,
    byteorder::{ByteOrder, LittleEndian},
    poly1305::{
        universal_hash::{KeyInit, UniversalHash},
        Poly1305,
    },
};

/// The size in octets of an authentication key.
pub const AUTH_KEY_SIZE: usize = 16;

/// The size in octets of a digest.
pub const DIGEST_SIZE: usize = 16;

/// The two digests that feed the synthetic value.
#[derive(Clone, Default)]
#[cfg_attr(feature = "zeroize", derive(zeroize::ZeroizeOnDrop))]
pub struct Digests {
    /// Keys the first subkey derivation.
    pub h1: [u8; DIGEST_SIZE],
    /// Keys the second subkey derivation.
    pub h2: [u8; DIGEST_SIZE],
}

/// Compresses associated data and a message into [`Digests`].
pub trait Authenticator {
    /// Computes both digests over `additional_data` and
    /// `message`.
    fn digests(&self, additional_data: &[u8], message: &[u8]) -> Digests;
}

/// Zero-extends an authentication key into a Poly1305 key.
#[inline(always)]
fn widen(key: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[..AUTH_KEY_SIZE].copy_from_slice(key);
    out
}

/// Two independent Poly1305 evaluations over
/// `pad16(a) || pad16(m) || le64(|a|) || le64(|m|)`.
///
/// This is the compression function of ChaCha-DAENCE.
#[derive(Clone)]
#[cfg_attr(feature = "zeroize", derive(zeroize::ZeroizeOnDrop))]
pub struct DualPoly1305 {
    k1: [u8; 32],
    k2: [u8; 32],
}

impl DualPoly1305 {
    /// Creates the authenticator from two 128-bit keys.
    pub fn new(k1: &[u8; AUTH_KEY_SIZE], k2: &[u8; AUTH_KEY_SIZE]) -> Self {
        Self {
            k1: widen(k1),
            k2: widen(k2),
        }
    }

    fn digest(key: &[u8; 32], ad: &[u8], msg: &[u8]) -> [u8; DIGEST_SIZE] {
        let mut mac = Poly1305::new(key.into());
        mac.update_padded(ad);
        mac.update_padded(msg);
        mac.update(&[lengths(ad.len(), msg.len()).into()]);
        let mut out = [0u8; DIGEST_SIZE];
        out.copy_from_slice(&mac.finalize());
        out
    }
}

impl Authenticator for DualPoly1305 {
    fn digests(&self, additional_data: &[u8], message: &[u8]) -> Digests {
        Digests {
            h1: Self::digest(&self.k1, additional_data, message),
            h2: Self::digest(&self.k2, additional_data, message),
        }
    }
}

/// Poly1305 over the associated data and the message separately,
/// then again over the four intermediate tags.
///
///   ha1 = Poly1305_k1(a), ha2 = Poly1305_k2(a)
///   hm1 = Poly1305_k1(m), hm2 = Poly1305_k2(m)
///   h1  = Poly1305_k3(ha1 || ha2 || hm1 || hm2)
///   h2  = Poly1305_k4(ha1 || ha2 || hm1 || hm2)
///
/// This is the compression function of Salsa20-DAENCE.
#[derive(Clone)]
#[cfg_attr(feature = "zeroize", derive(zeroize::ZeroizeOnDrop))]
pub struct NestedPoly1305 {
    k1: [u8; 32],
    k2: [u8; 32],
    k3: [u8; 32],
    k4: [u8; 32],
}

impl NestedPoly1305 {
    /// Creates the authenticator from four 128-bit keys.
    pub fn new(
        k1: &[u8; AUTH_KEY_SIZE],
        k2: &[u8; AUTH_KEY_SIZE],
        k3: &[u8; AUTH_KEY_SIZE],
        k4: &[u8; AUTH_KEY_SIZE],
    ) -> Self {
        Self {
            k1: widen(k1),
            k2: widen(k2),
            k3: widen(k3),
            k4: widen(k4),
        }
    }

    fn tag(key: &[u8; 32], data: &[u8], out: &mut [u8]) {
        out.copy_from_slice(&Poly1305::new(key.into()).compute_unpadded(data));
    }
}

impl Authenticator for NestedPoly1305 {
    fn digests(&self, additional_data: &[u8], message: &[u8]) -> Digests {
        let mut inner = [0u8; 4 * DIGEST_SIZE];
        Self::tag(&self.k1, additional_data, &mut inner[0..16]);
        Self::tag(&self.k2, additional_data, &mut inner[16..32]);
        Self::tag(&self.k1, message, &mut inner[32..48]);
        Self::tag(&self.k2, message, &mut inner[48..64]);

        let mut d = Digests::default();
        Self::tag(&self.k3, &inner, &mut d.h1);
        Self::tag(&self.k4, &inner, &mut d.h2);
        wipe(&mut inner);
        d
    }
}

/// Encodes `le64(ad) || le64(msg)`.
fn lengths(ad: usize, msg: usize) -> [u8; 16] {
    let mut out = [0u8; 16];
    LittleEndian::write_u64(&mut out[0..8], ad as u64);
    LittleEndian::write_u64(&mut out[8..16], msg as u64);
    out
}
