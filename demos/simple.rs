#![cfg(feature = "in-memory")]

use hypersig::{
    Error, HyperSig, InMemoryIndexStore, IndexStore, Params, PublicKey, SecretKey, Seed, Signature,
    VerificationError,
};

fn main() {
    // A small parameter set: 2 layers of height-4 trees give 256 signatures per key.
    let params = Params::new(2, 4, 2, 16, 8).unwrap();
    let scheme = HyperSig::new(params).unwrap();
    println!(
        "signatures per key: {}, signature size: {} bytes",
        params.max_signatures(),
        params.signature_bytes()
    );

    // The signer derives a key pair from a fresh seed.
    let (mut sk, pk) = scheme.keygen(Seed::fresh()).unwrap();

    // Each signature consumes one index of the secret key.
    let msg1 = "Hi! This is my first message.".as_bytes();
    let sig1 = scheme.sign(msg1, &mut sk).unwrap();
    assert_eq!(sig1.index(), 0);
    assert_eq!(scheme.verify(msg1, &sig1, &pk), Ok(()));

    // A signature does not verify for any other message.
    assert_eq!(
        scheme.verify(b"Hi! This is my first massage.", &sig1, &pk),
        Err(Error::VerificationFailed(VerificationError::RootMismatch))
    );

    // Signatures and public keys travel as plain bytes.
    let sig_bytes = sig1.to_bytes();
    let pk_bytes = pk.to_bytes();
    let received_pk = PublicKey::from_bytes(&pk_bytes).unwrap();
    let received_sig = Signature::from_bytes(&sig_bytes, &params).unwrap();
    assert!(scheme.is_valid(msg1, &received_sig, &received_pk));

    // With an index store, a copy of the key restored from a backup can not reuse an index
    // that was already spent.
    let store = InMemoryIndexStore::open("").unwrap();
    let backup = sk.clone();
    let msg2 = "Second message, signed through the store.".as_bytes();
    let sig2 = scheme.sign_persisted(msg2, &mut sk, &store).unwrap();
    assert_eq!(sig2.index(), 1);

    let mut restored = backup;
    let msg3 = "Signed with the restored key.".as_bytes();
    let sig3 = scheme.sign_persisted(msg3, &mut restored, &store).unwrap();
    assert_eq!(sig3.index(), 2);
    assert!(scheme.is_valid(msg3, &sig3, &pk));

    // Once every index is spent the key refuses to sign.
    let mut exhausted = restored.to_bytes();
    exhausted[32..].copy_from_slice(&params.max_signatures().to_be_bytes());
    let mut last = SecretKey::from_bytes(&exhausted[..]).unwrap();
    assert!(matches!(
        scheme.sign(b"too late", &mut last),
        Err(Error::IndexExhausted { .. })
    ));

    println!("All checks passed.");
}
