//! The ChaCha20 and Salsa20 keyed permutations and the subkey
//! derivation built on them.
//!
//! The permutations themselves come from the RustCrypto `chacha20`
//! and `salsa20` crates. A permutation input is the 128-bit block
//! counter and nonce of the base stream cipher, so one keystream
//! block at that position is exactly one evaluation.

use {
    crate::wipe,
    byteorder::{ByteOrder, LittleEndian},
    chacha20::{ChaChaCore, XChaCha20},
    cipher::{
        consts::{U10, U64},
        generic_array::GenericArray,
        KeyIvInit, StreamCipher, StreamCipherCore, StreamCipherSeekCore,
    },
    core::iter::zip,
    salsa20::{SalsaCore, XSalsa20},
};

/// The size in octets of a permutation block.
pub const BLOCK_SIZE: usize = 64;

/// The size in octets of a key.
pub const KEY_SIZE: usize = 32;

/// The size in octets of a permutation input.
pub const INPUT_SIZE: usize = 16;

/// The size in octets of an extended nonce.
pub const XNONCE_SIZE: usize = 24;

/// "expand 32-byte k"
const SIGMA: [u32; 4] = [
    u32::from_le_bytes(*b"expa"),
    u32::from_le_bytes(*b"nd 3"),
    u32::from_le_bytes(*b"2-by"),
    u32::from_le_bytes(*b"te k"),
];

/// A 512-bit keyed permutation from the Salsa20 family.
///
/// The state is sixteen 32-bit words holding four constant words,
/// eight key words, and four input words. The positions of the
/// constant and input words differ between ChaCha and Salsa20,
/// which is all that [`derive_subkey`] needs to know to strip them
/// back out of a block.
pub trait Permutation {
    /// Positions of the four constant words.
    const SIGMA_WORDS: [usize; 4];

    /// Positions of the four input words.
    const INPUT_WORDS: [usize; 4];

    /// The stream cipher keyed with a 192-bit nonce.
    type XStream: StreamCipher;

    /// Returns the block for `input` under `key`, including the
    /// feed-forward addition of the initial state.
    fn block(input: &[u8; INPUT_SIZE], key: &[u8; KEY_SIZE]) -> [u8; BLOCK_SIZE];

    /// Creates the extended-nonce stream cipher.
    fn xstream(key: &[u8; KEY_SIZE], nonce: &[u8; XNONCE_SIZE]) -> Self::XStream;
}

/// The ChaCha20 permutation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ChaCha;

impl Permutation for ChaCha {
    const SIGMA_WORDS: [usize; 4] = [0, 1, 2, 3];
    const INPUT_WORDS: [usize; 4] = [12, 13, 14, 15];

    type XStream = XChaCha20;

    fn block(input: &[u8; INPUT_SIZE], key: &[u8; KEY_SIZE]) -> [u8; BLOCK_SIZE] {
        // Word 12 is the block counter, words 13..16 the nonce.
        let (ctr, nonce) = input.split_at(4);
        let mut core = ChaChaCore::<U10>::new(key.into(), GenericArray::from_slice(nonce));
        core.set_block_pos(LittleEndian::read_u32(ctr));
        keystream_block(core)
    }

    #[inline]
    fn xstream(key: &[u8; KEY_SIZE], nonce: &[u8; XNONCE_SIZE]) -> XChaCha20 {
        XChaCha20::new(key.into(), nonce.into())
    }
}

/// The Salsa20 permutation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Salsa;

impl Permutation for Salsa {
    const SIGMA_WORDS: [usize; 4] = [0, 5, 10, 15];
    const INPUT_WORDS: [usize; 4] = [6, 7, 8, 9];

    type XStream = XSalsa20;

    fn block(input: &[u8; INPUT_SIZE], key: &[u8; KEY_SIZE]) -> [u8; BLOCK_SIZE] {
        // Words 6 and 7 are the nonce, words 8 and 9 the 64-bit
        // block counter.
        let (nonce, ctr) = input.split_at(8);
        let mut core = SalsaCore::<U10>::new(key.into(), GenericArray::from_slice(nonce));
        core.set_block_pos(LittleEndian::read_u64(ctr));
        keystream_block(core)
    }

    #[inline]
    fn xstream(key: &[u8; KEY_SIZE], nonce: &[u8; XNONCE_SIZE]) -> XSalsa20 {
        XSalsa20::new(key.into(), nonce.into())
    }
}

/// Writes one keystream block at the core's current position.
///
/// This skips the remaining-blocks check of the stream wrappers,
/// which refuse the final counter value.
fn keystream_block<C>(mut core: C) -> [u8; BLOCK_SIZE]
where
    C: StreamCipherCore<BlockSize = U64>,
{
    let mut block = GenericArray::<u8, U64>::default();
    core.write_keystream_block(&mut block);
    let mut out = [0u8; BLOCK_SIZE];
    out.copy_from_slice(&block);
    wipe(&mut block);
    out
}

/// Evaluates the keyed permutation `P` on one block.
///
/// Returns the 64-octet block produced from `input` under `key`,
/// including the feed-forward addition of the initial state.
#[inline]
pub fn permute<P: Permutation>(
    input: &[u8; INPUT_SIZE],
    key: &[u8; KEY_SIZE],
) -> [u8; BLOCK_SIZE] {
    P::block(input, key)
}

/// Derives a 256-bit subkey from `input` under `key`.
///
/// This is one evaluation of [`permute`] followed by subtracting
/// the constant words and the input words back out of the block,
/// which leaves the eight words an attacker cannot invert. With
/// [`ChaCha`] this is HChaCha20 and with [`Salsa`] it is HSalsa20.
///
/// All arithmetic is wrapping 32-bit with fixed indices, so the
/// running time does not depend on the secret values.
pub fn derive_subkey<P: Permutation>(
    input: &[u8; INPUT_SIZE],
    key: &[u8; KEY_SIZE],
) -> [u8; KEY_SIZE] {
    let mut block = permute::<P>(input, key);

    let mut iw = [0u32; 4];
    LittleEndian::read_u32_into(input, &mut iw);

    let mut out = [0u8; KEY_SIZE];
    let words = zip(P::SIGMA_WORDS, SIGMA).chain(zip(P::INPUT_WORDS, iw));
    for (chunk, (i, v)) in zip(out.chunks_exact_mut(4), words) {
        let w = LittleEndian::read_u32(&block[4 * i..4 * i + 4]);
        LittleEndian::write_u32(chunk, w.wrapping_sub(v));
    }
    wipe(&mut block);
    out
}

/// HChaCha20.
#[inline]
pub fn hchacha20(
    input: &[u8; INPUT_SIZE],
    key: &[u8; KEY_SIZE],
) -> [u8; KEY_SIZE] {
    derive_subkey::<ChaCha>(input, key)
}

/// HSalsa20.
#[inline]
pub fn hsalsa20(
    input: &[u8; INPUT_SIZE],
    key: &[u8; KEY_SIZE],
) -> [u8; KEY_SIZE] {
    derive_subkey::<Salsa>(input, key)
}
