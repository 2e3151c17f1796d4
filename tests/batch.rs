use decypher_core::batch::{decrypt_files, encrypt_files};
use decypher_core::{Config, Decypher, DecypherError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn engine(dir: &Path) -> Decypher {
    let config = Config {
        tally: write(dir, "tally.txt", "TEST 9000\nABCD 1000\n"),
        dictionary: write(dir, "dictionary.txt", "puppy\ncat\ndog\n"),
        ..Config::default()
    };
    Decypher::load(&config).unwrap()
}

#[test]
fn unreadable_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path());
    let missing = dir.path().join("missing.txt");
    let secret = write(dir.path(), "secret.txt", "Xaxxb, trst!\n");

    let paths = vec![missing.clone(), secret.clone()];
    let outcomes: Vec<_> = decrypt_files(&engine, &paths).collect();

    assert_eq!(outcomes[0].path, missing.as_path());
    assert!(matches!(&outcomes[0].result, Err(DecypherError::Read { path, .. }) if *path == missing));
    assert!(!dir.path().join("missing-decrypted.txt").exists());

    assert_eq!(outcomes[1].path, secret.as_path());
    let decrypted = outcomes[1].result.as_ref().unwrap();
    assert_eq!(decrypted.output, dir.path().join("secret-decrypted.txt"));
    assert_eq!(decrypted.analysis.key.apply_to_word("XAB"), "PUY");
    assert_eq!(fs::read_to_string(&decrypted.output).unwrap(), "Puppy, test!\n");
}

#[test]
fn encrypt_mode_writes_prefixed_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "first.txt", "Puppy, test!\n");
    let missing = dir.path().join("missing.txt");
    let second = write(dir.path(), "second.txt", "Hello there\n");

    let paths = vec![first, missing, second];
    let mut rng = StdRng::seed_from_u64(11);
    let outcomes: Vec<_> = encrypt_files(&paths, &mut rng).collect();
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[1].result, Err(DecypherError::Read { .. })));

    for (outcome, plain) in [(&outcomes[0], "Puppy, test!\n"), (&outcomes[2], "Hello there\n")] {
        let encrypted = outcome.result.as_ref().unwrap();
        let name = outcome.path.file_name().unwrap().to_string_lossy();
        assert_eq!(encrypted.output, dir.path().join(format!("_{name}")));
        let text = fs::read_to_string(&encrypted.output).unwrap();
        assert_eq!(encrypted.key.inverse().apply_preserving(&text), plain);
    }

    // Same seed, same keys.
    let mut rng = StdRng::seed_from_u64(11);
    let again: Vec<_> = encrypt_files(&paths, &mut rng).collect();
    assert_eq!(
        again[0].result.as_ref().unwrap().key,
        outcomes[0].result.as_ref().unwrap().key
    );
}

#[test]
fn encrypted_fixture_can_be_decrypted() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path());
    let plain = write(dir.path(), "plain.txt", "puppy test\n");

    let paths = vec![plain];
    let mut rng = StdRng::seed_from_u64(5);
    let encrypted: Vec<_> = encrypt_files(&paths, &mut rng).collect();
    let fixture = encrypted[0].result.as_ref().unwrap().output.clone();

    let fixtures = vec![fixture];
    let decrypted: Vec<_> = decrypt_files(&engine, &fixtures).collect();
    let output = &decrypted[0].result.as_ref().unwrap().output;
    assert_eq!(output, &dir.path().join("_plain-decrypted.txt"));
    assert!(output.exists());
}
