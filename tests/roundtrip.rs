use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn binlock() -> &'static str {
    env!("CARGO_BIN_EXE_binlock")
}

fn run_in(dir: &Path, args: &[&str], stdin_bytes: &[u8]) -> Output {
    let mut child = Command::new(binlock())
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binlock");
    {
        use std::io::Write;
        let mut stdin = child.stdin.take().expect("failed to open stdin");
        stdin.write_all(stdin_bytes).expect("failed to write stdin");
    }
    child.wait_with_output().expect("failed to wait on binlock")
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn encode_b64_literal_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hello.txt"), b"hello").unwrap();

    let output = run_in(dir.path(), &["encode", "-i", "hello.txt"], b"");
    assert!(output.status.success(), "{}", stderr_text(&output));
    assert_eq!(output.stdout, b"aGVsbG8=");
}

#[test]
fn decode_b64_literal_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hello.b64"), b"aGVsbG8=").unwrap();

    let output = run_in(dir.path(), &["encode", "--decode", "-i", "hello.b64"], b"");
    assert!(output.status.success(), "{}", stderr_text(&output));
    assert_eq!(output.stdout, b"hello");
}

#[test]
fn encode_reads_stdin_when_no_input_given() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["encode"], b"hello");
    assert!(output.status.success(), "{}", stderr_text(&output));
    assert_eq!(output.stdout, b"aGVsbG8=");
}

#[test]
fn encode_generates_output_filename() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hello.txt"), b"hello").unwrap();

    let output = run_in(dir.path(), &["encode", "-i", "hello.txt", "-o"], b"");
    assert!(output.status.success(), "{}", stderr_text(&output));
    let generated = dir.path().join("hello.txt.b64");
    assert_eq!(fs::read(generated).unwrap(), b"aGVsbG8=");
}

#[test]
fn encrypt_then_decrypt_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

    let output = run_in(
        dir.path(),
        &[
            "--password-stdin",
            "crypt",
            "-i",
            "secret.txt",
            "-o",
            "secret.aes",
        ],
        b"correct\ncorrect\n",
    );
    assert!(output.status.success(), "{}", stderr_text(&output));

    // Fixed header slot, ciphertext as long as the plaintext.
    let container = fs::read(dir.path().join("secret.aes")).unwrap();
    assert_eq!(container.len(), 512 + b"secret".len());

    let output = run_in(
        dir.path(),
        &[
            "--password-stdin",
            "crypt",
            "--decrypt",
            "-i",
            "secret.aes",
            "-o",
            "out.plain",
        ],
        b"correct\n",
    );
    assert!(output.status.success(), "{}", stderr_text(&output));
    assert_eq!(fs::read(dir.path().join("out.plain")).unwrap(), b"secret");
}

#[test]
fn wrong_password_fails_without_creating_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
    let output = run_in(
        dir.path(),
        &[
            "--password-stdin",
            "crypt",
            "-i",
            "secret.txt",
            "-o",
            "secret.aes",
        ],
        b"correct\ncorrect\n",
    );
    assert!(output.status.success(), "{}", stderr_text(&output));

    let output = run_in(
        dir.path(),
        &[
            "--password-stdin",
            "crypt",
            "--decrypt",
            "-i",
            "secret.aes",
            "-o",
            "never.plain",
        ],
        b"wrong\n",
    );
    assert!(!output.status.success());
    assert!(stderr_text(&output).contains("invalid tag"));
    assert!(!dir.path().join("never.plain").exists());
}

#[test]
fn dump_header_is_idempotent_and_skips_the_sink() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
    let output = run_in(
        dir.path(),
        &[
            "--password-stdin",
            "crypt",
            "-i",
            "secret.txt",
            "-o",
            "secret.aes",
        ],
        b"pw\npw\n",
    );
    assert!(output.status.success(), "{}", stderr_text(&output));
    let before = fs::read(dir.path().join("secret.aes")).unwrap();

    let args = [
        "crypt",
        "--dump-header",
        "-i",
        "secret.aes",
        "-o",
        "should-not-exist",
    ];
    let first = run_in(dir.path(), &args, b"");
    let second = run_in(dir.path(), &args, b"");
    assert!(first.status.success(), "{}", stderr_text(&first));
    assert!(second.status.success(), "{}", stderr_text(&second));
    assert_eq!(first.stdout, second.stdout);

    let text = String::from_utf8_lossy(&first.stdout).into_owned();
    for field in ["binlock", "salt", "iv", "aad", "tag"] {
        assert!(text.contains(&format!("[{field} = ")), "missing {field}");
    }
    // The configured sink is never touched, and the source never mutated.
    assert!(!dir.path().join("should-not-exist").exists());
    assert_eq!(fs::read(dir.path().join("secret.aes")).unwrap(), before);
}

#[test]
fn overwrite_with_stdin_is_rejected_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["crypt", "--overwrite"], b"data");
    assert!(!output.status.success());
    assert!(stderr_text(&output).contains("invalid configuration"));
}

#[test]
fn overwrite_replaces_the_input_file_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("msg.txt");
    fs::write(&path, b"keep this safe").unwrap();

    let output = run_in(
        dir.path(),
        &["--password-stdin", "crypt", "-i", "msg.txt", "--overwrite"],
        b"pw\npw\n",
    );
    assert!(output.status.success(), "{}", stderr_text(&output));
    let container = fs::read(&path).unwrap();
    assert!(container.starts_with(b"{\"binlock\""));
    assert!(container.len() >= 512);

    let output = run_in(
        dir.path(),
        &[
            "--password-stdin",
            "crypt",
            "--decrypt",
            "-i",
            "msg.txt",
            "--overwrite",
        ],
        b"pw\n",
    );
    assert!(output.status.success(), "{}", stderr_text(&output));
    assert_eq!(fs::read(&path).unwrap(), b"keep this safe");
}

#[test]
fn missing_input_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["encode", "-i", "nope.txt"], b"");
    assert!(!output.status.success());
    assert!(stderr_text(&output).contains("does not exist"));
}

#[test]
fn foreign_file_is_rejected_before_any_password_prompt() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("junk.bin"), b"not a container").unwrap();

    // No password on stdin: decryption must fail on the header alone.
    let output = run_in(
        dir.path(),
        &["--password-stdin", "crypt", "--decrypt", "-i", "junk.bin"],
        b"",
    );
    assert!(!output.status.success());
    assert!(stderr_text(&output).contains("corrupted container header"));
}
