use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn skipped_file_fails_the_run_but_not_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let tally = write(dir.path(), "tally.txt", "TEST 9000\nABCD 1000\n");
    let dictionary = write(dir.path(), "dictionary.txt", "puppy\ncat\ndog\n");
    let secret = write(dir.path(), "secret.txt", "Xaxxb, trst!\n");

    let output = Command::new(env!("CARGO_BIN_EXE_decypher"))
        .arg("-t")
        .arg(&tally)
        .arg("-d")
        .arg(&dictionary)
        .arg(dir.path().join("missing.txt"))
        .arg(&secret)
        .output()
        .expect("failed to spawn");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.txt"), "stderr: {stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("secret.txt: "), "stdout: {stdout}");
    assert_eq!(
        fs::read_to_string(dir.path().join("secret-decrypted.txt")).unwrap(),
        "Puppy, test!\n"
    );
}

#[test]
fn encrypt_flag_writes_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let plain = write(dir.path(), "plain.txt", "Hello there\n");

    let status = Command::new(env!("CARGO_BIN_EXE_decypher"))
        .args(["--encrypt", "--seed", "9", "--silent"])
        .arg(&plain)
        .status()
        .expect("failed to spawn");

    assert!(status.success());
    let encrypted = fs::read_to_string(dir.path().join("_plain.txt")).unwrap();
    assert_eq!(encrypted.len(), "Hello there\n".len());
    assert!(encrypted.ends_with('\n'));
}
