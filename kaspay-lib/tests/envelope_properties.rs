//! Property tests for the envelope codec.

#![cfg(feature = "aes-cbc")]

use kaspay_lib::envelope::{envelope_len, split_envelope, SIGNATURE_SIZE};
use kaspay_lib::{ApiKeys, CallContext, EnvelopeCodec, EnvelopeError, Verb};
use proptest::prelude::*;

fn verb() -> impl Strategy<Value = Verb> {
    prop_oneof![
        Just(Verb::Get),
        Just(Verb::Post),
        Just(Verb::Put),
        Just(Verb::Delete),
    ]
}

fn context() -> impl Strategy<Value = CallContext> {
    (verb(), "[a-z/]{0,40}", "[a-z0-9-]{1,16}", any::<i64>()).prop_map(
        |(verb, path, account, timestamp)| {
            CallContext::new(
                verb,
                format!("https://www.kaspay.com/api/v1/{}", path),
                account,
                timestamp,
            )
        },
    )
}

fn codec(enc: &[u8], mac: &[u8]) -> EnvelopeCodec {
    EnvelopeCodec::with_default_cipher(ApiKeys::new(enc.to_vec(), mac.to_vec()).unwrap()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn roundtrip_for_any_key_lengths(
        enc in prop::collection::vec(any::<u8>(), 1..48),
        mac in prop::collection::vec(any::<u8>(), 1..80),
        ctx in context(),
        plaintext in prop::collection::vec(any::<u8>(), 0..300),
    ) {
        let codec = codec(&enc, &mac);
        let envelope = codec.encrypt_request(&ctx, &plaintext).unwrap();

        prop_assert_eq!(envelope.len(), envelope_len(plaintext.len()));
        prop_assert_eq!(codec.decrypt_request(&ctx, &envelope).unwrap(), plaintext);
    }

    #[test]
    fn any_single_bit_flip_is_rejected(
        ctx in context(),
        plaintext in prop::collection::vec(any::<u8>(), 0..64),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let codec = codec(&[7u8; 32], &[9u8; 32]);
        let mut envelope = codec.encrypt_request(&ctx, &plaintext).unwrap();
        let index = position.index(envelope.len());
        envelope[index] ^= 1 << bit;

        prop_assert_eq!(
            codec.decrypt_request(&ctx, &envelope),
            Err(EnvelopeError::InvalidSignature)
        );
    }

    #[test]
    fn envelope_is_bound_to_its_context(
        ctx in context(),
        other in context(),
        plaintext in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        prop_assume!(ctx != other);
        let codec = codec(&[1u8; 32], &[2u8; 32]);
        let envelope = codec.encrypt_request(&ctx, &plaintext).unwrap();

        prop_assert_eq!(
            codec.decrypt_request(&other, &envelope),
            Err(EnvelopeError::InvalidSignature)
        );
    }

    #[test]
    fn arbitrary_bytes_never_open(
        ctx in context(),
        garbage in prop::collection::vec(any::<u8>(), 0..200),
    ) {
        let codec = codec(&[3u8; 32], &[4u8; 32]);
        prop_assert!(codec.decrypt_request(&ctx, &garbage).is_err());
    }

    #[test]
    fn split_keeps_last_signature_bytes(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
        let (ciphertext, signature) = split_envelope(&bytes);
        prop_assert_eq!(ciphertext.len() + signature.len(), bytes.len());
        prop_assert_eq!(signature.len(), bytes.len().min(SIGNATURE_SIZE));
    }
}
