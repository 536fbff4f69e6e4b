//! Round-trip, tamper and concurrency properties of the public API.

use std::thread;

use bcrypt_eks::{hash, verify, BcryptError, Hasher, Version, ENCODED_LEN, MAX_PASSWORD_LEN};
use proptest::prelude::*;

proptest! {
    // Every case runs the key schedule several times; keep the count low.
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_hash_then_verify(password in proptest::collection::vec(1u8..=255, 1..=MAX_PASSWORD_LEN)) {
        let hashed = hash(&password, 4).unwrap();
        prop_assert_eq!(hashed.as_str().len(), ENCODED_LEN);
        prop_assert!(verify(&password, &hashed).unwrap());
    }

    #[test]
    fn prop_appended_byte_fails(password in "[ -~]{1,71}", extra in 0x20u8..0x7f) {
        let hashed = hash(&password, 4).unwrap();
        let mut longer = password.clone().into_bytes();
        longer.push(extra);
        prop_assert!(!verify(&longer, &hashed).unwrap());
    }

    #[test]
    fn prop_every_version_round_trips(password in "[ -~]{1,72}", index in 0usize..3) {
        let version = Version::ALL[index];
        let hashed = Hasher::new(version).hash(&password, 4).unwrap();
        prop_assert!(hashed.as_str().starts_with(version.identifier()));
        prop_assert!(verify(&password, &hashed).unwrap());
    }
}

#[test]
fn full_length_password_round_trips() -> Result<(), BcryptError> {
    let password = "a".repeat(MAX_PASSWORD_LEN);
    let hashed = hash(&password, 4)?;
    assert!(verify(&password, &hashed)?);
    Ok(())
}

#[test]
fn fresh_salts_give_distinct_hashes() -> Result<(), BcryptError> {
    let a = hash("test", 4)?;
    let b = hash("test", 4)?;
    assert_ne!(a, b);
    assert!(verify("test", &a)?);
    assert!(verify("test", &b)?);
    Ok(())
}

#[test]
fn different_passwords_differ() -> Result<(), BcryptError> {
    let a = Hasher::new(Version::V2b).hash_with_salt("password1", 4, "abcdefghijklmnopqrstuu")?;
    let b = Hasher::new(Version::V2b).hash_with_salt("password2", 4, "abcdefghijklmnopqrstuu")?;
    assert_ne!(a, b);
    Ok(())
}

#[test]
fn unicode_passwords_round_trip() -> Result<(), BcryptError> {
    for password in ["πάσσω", "密码", "🔐🔑", "Ñoño"] {
        let hashed = hash(password, 4)?;
        assert!(verify(password, &hashed)?);
    }
    Ok(())
}

#[test]
fn parallel_calls_are_independent() {
    let expected = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || -> Result<(), BcryptError> {
                let own = format!("thread-{i}");
                let hashed = hash(&own, 4)?;
                assert!(verify(&own, &hashed)?);
                assert!(verify("U*U", expected)?);
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().ok(), Some(Ok(())));
    }
}

#[test]
fn cost_is_recorded() -> Result<(), BcryptError> {
    let hashed = hash("pw", 6)?;
    let parts = hashed.parts()?;
    assert_eq!(parts.cost, 6);
    assert_eq!(parts.version, Version::V2b);
    assert!(hashed.as_str().starts_with("$2b$06$"));
    Ok(())
}
