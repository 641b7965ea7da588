//! Property-based tests for both DAENCE schemes.
//!
//! 1. **Round-trip**: open(seal(a, m), a) == m
//! 2. **Determinism**: equal inputs produce equal ciphertexts
//! 3. **Integrity**: any single flipped bit is rejected
//! 4. **Binding**: the ciphertext only opens under its own
//!    associated data

use daence::{ChaChaDaence, Error, Salsa20Daence, TAG_SIZE};
use proptest::prelude::*;

/// Both schemes behind one interface so each property is written
/// once.
trait Scheme: Sized {
    const KEY_SIZE: usize;
    fn from_key(key: &[u8]) -> Self;
    fn seal_vec(&self, msg: &[u8], ad: &[u8]) -> Vec<u8>;
    fn open_vec(&self, ct: &[u8], ad: &[u8]) -> Result<Vec<u8>, Error>;
}

macro_rules! scheme {
    ($ty:ty) => {
        impl Scheme for $ty {
            const KEY_SIZE: usize = <$ty>::KEY_SIZE;

            fn from_key(key: &[u8]) -> Self {
                <$ty>::new_from_slice(key).expect("key should have the right length")
            }

            fn seal_vec(&self, msg: &[u8], ad: &[u8]) -> Vec<u8> {
                let mut dst = vec![0u8; msg.len() + TAG_SIZE];
                self.seal(&mut dst, msg, ad).expect("seal should not fail");
                dst
            }

            fn open_vec(&self, ct: &[u8], ad: &[u8]) -> Result<Vec<u8>, Error> {
                let mut dst = vec![0u8; ct.len().saturating_sub(TAG_SIZE)];
                self.open(&mut dst, ct, ad).map(|()| dst)
            }
        }
    };
}
scheme!(ChaChaDaence);
scheme!(Salsa20Daence);

fn key_strategy<S: Scheme>() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), S::KEY_SIZE)
}

fn check_roundtrip<S: Scheme>(key: &[u8], msg: &[u8], ad: &[u8]) -> Result<(), TestCaseError> {
    let aead = S::from_key(key);
    let ct = aead.seal_vec(msg, ad);
    prop_assert_eq!(ct.len(), msg.len() + TAG_SIZE);
    prop_assert_eq!(aead.open_vec(&ct, ad), Ok(msg.to_vec()));
    Ok(())
}

fn check_deterministic<S: Scheme>(key: &[u8], msg: &[u8], ad: &[u8]) -> Result<(), TestCaseError> {
    let a = S::from_key(key).seal_vec(msg, ad);
    let b = S::from_key(key).seal_vec(msg, ad);
    prop_assert_eq!(a, b);
    Ok(())
}

fn check_bit_flip<S: Scheme>(
    key: &[u8],
    msg: &[u8],
    ad: &[u8],
    pos: prop::sample::Index,
    bit: u8,
) -> Result<(), TestCaseError> {
    let aead = S::from_key(key);
    let mut ct = aead.seal_vec(msg, ad);
    let i = pos.index(ct.len());
    ct[i] ^= 1 << bit;
    prop_assert_eq!(aead.open_vec(&ct, ad), Err(Error::Authentication));
    Ok(())
}

fn check_ad_binding<S: Scheme>(
    key: &[u8],
    msg: &[u8],
    ad: &[u8],
    other: &[u8],
) -> Result<(), TestCaseError> {
    prop_assume!(ad != other);
    let aead = S::from_key(key);
    let ct = aead.seal_vec(msg, ad);
    prop_assert_eq!(aead.open_vec(&ct, other), Err(Error::Authentication));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_chacha_roundtrip(
        key in key_strategy::<ChaChaDaence>(),
        msg in prop::collection::vec(any::<u8>(), 0..300),
        ad in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        check_roundtrip::<ChaChaDaence>(&key, &msg, &ad)?;
    }

    #[test]
    fn prop_salsa20_roundtrip(
        key in key_strategy::<Salsa20Daence>(),
        msg in prop::collection::vec(any::<u8>(), 0..300),
        ad in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        check_roundtrip::<Salsa20Daence>(&key, &msg, &ad)?;
    }

    #[test]
    fn prop_chacha_deterministic(
        key in key_strategy::<ChaChaDaence>(),
        msg in prop::collection::vec(any::<u8>(), 0..200),
        ad in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        check_deterministic::<ChaChaDaence>(&key, &msg, &ad)?;
    }

    #[test]
    fn prop_salsa20_deterministic(
        key in key_strategy::<Salsa20Daence>(),
        msg in prop::collection::vec(any::<u8>(), 0..200),
        ad in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        check_deterministic::<Salsa20Daence>(&key, &msg, &ad)?;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_chacha_bit_flip_rejected(
        key in key_strategy::<ChaChaDaence>(),
        msg in prop::collection::vec(any::<u8>(), 0..100),
        ad in prop::collection::vec(any::<u8>(), 0..32),
        pos in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        check_bit_flip::<ChaChaDaence>(&key, &msg, &ad, pos, bit)?;
    }

    #[test]
    fn prop_salsa20_bit_flip_rejected(
        key in key_strategy::<Salsa20Daence>(),
        msg in prop::collection::vec(any::<u8>(), 0..100),
        ad in prop::collection::vec(any::<u8>(), 0..32),
        pos in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        check_bit_flip::<Salsa20Daence>(&key, &msg, &ad, pos, bit)?;
    }

    #[test]
    fn prop_chacha_ad_binding(
        key in key_strategy::<ChaChaDaence>(),
        msg in prop::collection::vec(any::<u8>(), 0..100),
        ad in prop::collection::vec(any::<u8>(), 0..32),
        other in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        check_ad_binding::<ChaChaDaence>(&key, &msg, &ad, &other)?;
    }

    #[test]
    fn prop_salsa20_ad_binding(
        key in key_strategy::<Salsa20Daence>(),
        msg in prop::collection::vec(any::<u8>(), 0..100),
        ad in prop::collection::vec(any::<u8>(), 0..32),
        other in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        check_ad_binding::<Salsa20Daence>(&key, &msg, &ad, &other)?;
    }

    #[test]
    fn prop_short_ciphertext_is_malformed(
        ct in prop::collection::vec(any::<u8>(), 0..TAG_SIZE),
    ) {
        let chacha = ChaChaDaence::new(&[0u8; 64]);
        prop_assert_eq!(chacha.open_vec(&ct, b""), Err(Error::MalformedCiphertext));
        let salsa = Salsa20Daence::new(&[0u8; 96]);
        prop_assert_eq!(salsa.open_vec(&ct, b""), Err(Error::MalformedCiphertext));
    }
}
