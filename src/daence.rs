//! The DAENCE deterministic authenticated encryption schemes.
//!
//! Sealing computes a 192-bit synthetic value from the associated
//! data and the plaintext and uses it twice: as the authentication
//! tag and as the extended nonce of the stream cipher.
//!
//! ```text
//! (h1, h2) = Compress_{k1,k2}(a, m)
//! u        = H_{k0}(h1)
//! t        = H_u(h2)[0..24]
//! c        = t || (m ^ XStream_{k0}(t))
//! ```
//!
//! Opening runs the stream cipher first, recomputes the synthetic
//! value from the candidate plaintext, and compares it against the
//! received tag in constant time.

use {
    crate::{
        auth::{Authenticator, Digests, DualPoly1305, NestedPoly1305, AUTH_KEY_SIZE},
        permute::{derive_subkey, ChaCha, Permutation, Salsa},
        wipe, Error,
    },
    cipher::StreamCipher,
    core::marker::PhantomData,
    subtle::ConstantTimeEq,
};

/// The size in octets of a synthetic value.
pub const TAG_SIZE: usize = 24;

/// ChaCha-DAENCE: HChaCha20, XChaCha20, and two Poly1305 keys.
pub type ChaChaDaence = Daence<ChaCha, DualPoly1305>;

/// Salsa20-DAENCE: HSalsa20, XSalsa20, and four Poly1305 keys.
pub type Salsa20Daence = Daence<Salsa, NestedPoly1305>;

/// A deterministic AEAD over the permutation `P` and the
/// authenticator `A`.
///
/// There is no nonce. Sealing the same plaintext and associated
/// data twice under the same key produces the same ciphertext,
/// which reveals only that the inputs were equal.
pub struct Daence<P, A> {
    k0: [u8; 32],
    auth: A,
    _permutation: PhantomData<P>,
}

impl ChaChaDaence {
    /// The size in octets of a key.
    pub const KEY_SIZE: usize = 64;

    /// Creates an instance of the AEAD.
    ///
    /// The key is split into a 32-octet encryption key followed
    /// by two 16-octet authentication keys.
    pub fn new(key: &[u8; 64]) -> Self {
        let mut k1 = [0u8; AUTH_KEY_SIZE];
        let mut k2 = [0u8; AUTH_KEY_SIZE];
        k1.copy_from_slice(&key[32..48]);
        k2.copy_from_slice(&key[48..64]);
        let aead = Self::from_parts(&key[0..32], DualPoly1305::new(&k1, &k2));
        wipe(&mut k1);
        wipe(&mut k2);
        aead
    }

    /// Creates an instance of the AEAD from a slice, which must
    /// be exactly [`KEY_SIZE`][Self::KEY_SIZE] octets long.
    pub fn new_from_slice(key: &[u8]) -> Result<Self, Error> {
        let key: &[u8; 64] = key.try_into().map_err(|_| Error::InvalidKeyLength)?;
        Ok(Self::new(key))
    }

    /// Runs the known-answer test.
    ///
    /// Checks that sealing reproduces the reference ciphertext,
    /// that opening it recovers the plaintext, and that a single
    /// flipped bit is rejected.
    pub fn self_test() -> Result<(), Error> {
        let key: [u8; 64] = seq(0x00);
        let aead = Self::new(&key);
        aead.known_answer(&seq::<16>(0x40), &seq::<33>(0x50), &CHACHA_KAT)
    }
}

impl Salsa20Daence {
    /// The size in octets of a key.
    pub const KEY_SIZE: usize = 96;

    /// Creates an instance of the AEAD.
    ///
    /// The key is split into a 32-octet encryption key followed
    /// by four 16-octet authentication keys.
    pub fn new(key: &[u8; 96]) -> Self {
        let mut k = [[0u8; AUTH_KEY_SIZE]; 4];
        for (dst, src) in k.iter_mut().zip(key[32..].chunks_exact(AUTH_KEY_SIZE)) {
            dst.copy_from_slice(src);
        }
        let aead = Self::from_parts(
            &key[0..32],
            NestedPoly1305::new(&k[0], &k[1], &k[2], &k[3]),
        );
        for k in &mut k {
            wipe(k);
        }
        aead
    }

    /// Creates an instance of the AEAD from a slice, which must
    /// be exactly [`KEY_SIZE`][Self::KEY_SIZE] octets long.
    pub fn new_from_slice(key: &[u8]) -> Result<Self, Error> {
        let key: &[u8; 96] = key.try_into().map_err(|_| Error::InvalidKeyLength)?;
        Ok(Self::new(key))
    }

    /// Runs the known-answer test.
    ///
    /// Checks that sealing reproduces the reference ciphertext,
    /// that opening it recovers the plaintext, and that a single
    /// flipped bit is rejected.
    pub fn self_test() -> Result<(), Error> {
        let key: [u8; 96] = seq(0x00);
        let aead = Self::new(&key);
        aead.known_answer(&seq::<16>(0x60), &seq::<33>(0x70), &SALSA20_KAT)
    }
}

impl<P: Permutation, A: Authenticator> Daence<P, A> {
    /// The size in octets of the synthetic value that prefixes
    /// every ciphertext.
    pub const TAG_SIZE: usize = TAG_SIZE;

    /// The maximum size in octets of a plaintext.
    ///
    /// This is the 32-bit block counter limit of XChaCha20, and
    /// also applies to Salsa20-DAENCE.
    pub const P_MAX: u64 = (1 << 38) - 64;

    /// The maximum size in octets of a ciphertext.
    pub const C_MAX: u64 = Self::P_MAX + Self::TAG_SIZE as u64;

    /// The maximum size in octets of additional data.
    pub const A_MAX: u64 = u64::MAX;

    fn from_parts(k0: &[u8], auth: A) -> Self {
        let mut key = [0u8; 32];
        key.copy_from_slice(k0);
        Self {
            k0: key,
            auth,
            _permutation: PhantomData,
        }
    }

    /// Encrypts and authenticates `plaintext`, writing
    /// `tag || ciphertext` to `dst`.
    ///
    /// # Requirements
    ///
    /// - `dst` must be at least [`TAG_SIZE`][Self::TAG_SIZE]
    ///   octets longer than `plaintext`.
    /// - `plaintext` must be at most [`P_MAX`][Self::P_MAX]
    ///   octets long.
    #[inline]
    pub fn seal(
        &self,
        dst: &mut [u8],
        plaintext: &[u8],
        additional_data: &[u8],
    ) -> Result<(), Error> {
        if plaintext.len() as u64 > Self::P_MAX {
            return Err(Error::PlaintextTooLarge);
        }
        // This will not overflow since `plaintext.len()` is at
        // most `P_MAX`.
        if dst.len() < Self::TAG_SIZE + plaintext.len() {
            return Err(Error::BufferTooSmall);
        }
        let (tag, dst) = dst
            .split_first_chunk_mut::<TAG_SIZE>()
            .ok_or(Error::BufferTooSmall)?;
        self.seal_scatter(dst, tag, plaintext, additional_data)
    }

    /// Decrypts and authenticates `ciphertext`, which must be
    /// `tag || ciphertext` as produced by [`seal`][Self::seal].
    ///
    /// On failure nothing of the candidate plaintext is left in
    /// `dst`.
    ///
    /// # Requirements
    ///
    /// - `ciphertext` must be at least
    ///   [`TAG_SIZE`][Self::TAG_SIZE] octets long.
    /// - `dst` must be at least `ciphertext.len()` -
    ///   [`TAG_SIZE`][Self::TAG_SIZE] octets long.
    /// - `ciphertext` must be at most [`C_MAX`][Self::C_MAX]
    ///   octets long.
    #[inline]
    pub fn open(
        &self,
        dst: &mut [u8],
        ciphertext: &[u8],
        additional_data: &[u8],
    ) -> Result<(), Error> {
        let (tag, ciphertext) = ciphertext
            .split_first_chunk::<TAG_SIZE>()
            .ok_or(Error::MalformedCiphertext)?;
        self.open_gather(dst, tag, ciphertext, additional_data)
    }

    /// Encrypts and authenticates `plaintext`.
    ///
    /// The result (less the synthetic value) is written to `dst`
    /// and the synthetic value is written to `tag`.
    ///
    /// # Requirements
    ///
    /// - `dst` must be at least as long as `plaintext`.
    /// - `plaintext` must be at most [`P_MAX`][Self::P_MAX]
    ///   octets long.
    pub fn seal_scatter(
        &self,
        dst: &mut [u8],
        tag: &mut [u8; TAG_SIZE],
        plaintext: &[u8],
        additional_data: &[u8],
    ) -> Result<(), Error> {
        if dst.len() < plaintext.len() {
            return Err(Error::BufferTooSmall);
        }
        if plaintext.len() as u64 > Self::P_MAX {
            return Err(Error::PlaintextTooLarge);
        }

        *tag = self.synthetic_value(additional_data, plaintext);

        let dst = &mut dst[..plaintext.len()];
        dst.copy_from_slice(plaintext);
        P::xstream(&self.k0, tag)
            .try_apply_keystream(dst)
            .map_err(|_| Error::PlaintextTooLarge)
    }

    /// Decrypts and authenticates `ciphertext` against the
    /// synthetic value `tag`.
    ///
    /// On failure nothing of the candidate plaintext is left in
    /// `dst`.
    ///
    /// # Requirements
    ///
    /// - `dst` must be at least as long as `ciphertext`.
    /// - `ciphertext` must be at most [`P_MAX`][Self::P_MAX]
    ///   octets long.
    pub fn open_gather(
        &self,
        dst: &mut [u8],
        tag: &[u8; TAG_SIZE],
        ciphertext: &[u8],
        additional_data: &[u8],
    ) -> Result<(), Error> {
        if dst.len() < ciphertext.len() {
            return Err(Error::BufferTooSmall);
        }
        if ciphertext.len() as u64 > Self::P_MAX {
            return Err(Error::CiphertextTooLarge);
        }

        let dst = &mut dst[..ciphertext.len()];
        dst.copy_from_slice(ciphertext);
        P::xstream(&self.k0, tag)
            .try_apply_keystream(dst)
            .map_err(|_| Error::CiphertextTooLarge)?;

        let mut want = self.synthetic_value(additional_data, dst);
        let ok = bool::from(want[..].ct_eq(&tag[..]));
        wipe(&mut want);
        if !ok {
            wipe(dst);
            return Err(Error::Authentication);
        }
        Ok(())
    }

    /// Computes the synthetic value of `message` and
    /// `additional_data`.
    fn synthetic_value(&self, additional_data: &[u8], message: &[u8]) -> [u8; TAG_SIZE] {
        let d = self.auth.digests(additional_data, message);
        combine::<P>(&d, &self.k0)
    }

    fn known_answer(&self, ad: &[u8], msg: &[u8; 33], want: &[u8; 57]) -> Result<(), Error> {
        let mut ct = [0u8; 57];
        self.seal(&mut ct, msg, ad).map_err(|_| Error::SelfTest)?;
        if &ct != want {
            return Err(Error::SelfTest);
        }

        let mut pt = [0u8; 33];
        self.open(&mut pt, want, ad).map_err(|_| Error::SelfTest)?;
        if &pt != msg {
            return Err(Error::SelfTest);
        }

        ct[18] ^= 0x10;
        match self.open(&mut pt, &ct, ad) {
            Err(Error::Authentication) => Ok(()),
            _ => Err(Error::SelfTest),
        }
    }
}

#[cfg(feature = "zeroize")]
impl<P, A> Drop for Daence<P, A> {
    fn drop(&mut self) {
        wipe(&mut self.k0);
    }
}

#[cfg(feature = "zeroize")]
impl<P, A> zeroize::ZeroizeOnDrop for Daence<P, A> {}

/// Chains two subkey derivations over the digests and truncates
/// the result to a synthetic value.
fn combine<P: Permutation>(d: &Digests, k0: &[u8; 32]) -> [u8; TAG_SIZE] {
    let mut u0 = derive_subkey::<P>(&d.h1, k0);
    let mut u = derive_subkey::<P>(&d.h2, &u0);
    let mut t = [0u8; TAG_SIZE];
    t.copy_from_slice(&u[..TAG_SIZE]);
    wipe(&mut u0);
    wipe(&mut u);
    t
}

/// Returns `[start, start+1, ...]`.
fn seq<const N: usize>(start: u8) -> [u8; N] {
    let mut out = [0u8; N];
    let mut v = start;
    for b in out.iter_mut() {
        *b = v;
        v = v.wrapping_add(1);
    }
    out
}

const CHACHA_KAT: [u8; 57] = [
    0x99, 0x76, 0x70, 0x9c, 0x45, 0x3c, 0x8f, 0x94, 0xe4, 0x92, 0xef, 0xa7,
    0x70, 0xe3, 0xc2, 0x21, 0xe0, 0x8e, 0xa6, 0xa0, 0xe5, 0x88, 0xd5, 0x4e,
    0x22, 0x7d, 0x2c, 0x0c, 0xde, 0xe4, 0x08, 0xbc, 0xe9, 0xd0, 0x53, 0x2a,
    0x3a, 0x36, 0x27, 0x01, 0x0f, 0x11, 0xf2, 0xb2, 0xe4, 0x72, 0x67, 0xe5,
    0x33, 0xe9, 0x5a, 0xa3, 0xb2, 0xe7, 0x1e, 0xfb, 0x68,
];

const SALSA20_KAT: [u8; 57] = [
    0xa5, 0x09, 0x6e, 0x6c, 0xd6, 0x56, 0x41, 0x31, 0xdc, 0xfb, 0xd1, 0x86,
    0xcb, 0x1e, 0x13, 0x72, 0x8e, 0x2b, 0x67, 0x19, 0xb0, 0xbf, 0x71, 0x94,
    0x14, 0xfb, 0x8f, 0x32, 0x8f, 0xca, 0x05, 0x2a, 0xcd, 0x43, 0x27, 0xd1,
    0x37, 0x12, 0x67, 0x96, 0x19, 0x35, 0x56, 0x63, 0x18, 0x55, 0x38, 0x71,
    0xb9, 0x0c, 0xc9, 0x08, 0x29, 0xa9, 0xd9, 0x60, 0xf9,
];
