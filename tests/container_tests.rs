use binlock::container;
use binlock::error::Error;
use binlock::format::HEADER_LEN;
use binlock::logger::Logger;

fn quiet() -> Logger {
    Logger::new(false, false)
}

fn find(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
        .expect("pattern present in header")
}

/// Replace one hex digit of the named header field with a different valid
/// hex digit, so the header still parses but the field value changes.
fn tamper_field(container: &mut [u8], field: &str) {
    let marker = format!("\"{field}\":\"");
    let index = find(container, marker.as_bytes()) + marker.len();
    container[index] = if container[index] == b'0' { b'1' } else { b'0' };
}

#[test]
fn seal_open_round_trip() {
    let log = quiet();
    let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let sealed = container::seal(&payload, b"correct", &log).unwrap();
    // Ciphertext length equals plaintext length; the tag lives in the header.
    assert_eq!(sealed.len(), HEADER_LEN + payload.len());
    let opened = container::open(&sealed, b"correct", &log).unwrap();
    assert_eq!(&opened[..], &payload[..]);
}

#[test]
fn empty_payload_round_trips() {
    let log = quiet();
    let sealed = container::seal(b"", b"pw", &log).unwrap();
    assert_eq!(sealed.len(), HEADER_LEN);
    let opened = container::open(&sealed, b"pw", &log).unwrap();
    assert!(opened.is_empty());
}

#[test]
fn wrong_password_is_ambiguous_failure() {
    let log = quiet();
    let sealed = container::seal(b"secret", b"correct", &log).unwrap();
    let err = container::open(&sealed, b"wrong", &log).unwrap_err();
    assert!(matches!(err, Error::Authentication));
}

#[test]
fn tampering_never_yields_plaintext() {
    let log = quiet();
    let sealed = container::seal(b"attack at dawn", b"pw", &log).unwrap();

    // One flipped ciphertext bit.
    let mut tampered = sealed.clone();
    tampered[HEADER_LEN + 3] ^= 0x01;
    assert!(matches!(
        container::open(&tampered, b"pw", &log).unwrap_err(),
        Error::Authentication
    ));

    // One changed hex digit in each authenticated header field.
    for field in ["iv", "aad", "tag"] {
        let mut tampered = sealed.clone();
        tamper_field(&mut tampered, field);
        assert!(
            matches!(
                container::open(&tampered, b"pw", &log).unwrap_err(),
                Error::Authentication
            ),
            "tampered '{field}' must fail authentication"
        );
    }
}

#[test]
fn salt_tamper_is_the_same_failure_class() {
    let log = quiet();
    let sealed = container::seal(b"secret", b"pw", &log).unwrap();
    let mut tampered = sealed;
    tamper_field(&mut tampered, "salt");
    assert!(matches!(
        container::open(&tampered, b"pw", &log).unwrap_err(),
        Error::Authentication
    ));
}

#[test]
fn truncated_container_fails_before_any_crypto() {
    let err = container::split(&[1u8; 100]).unwrap_err();
    assert!(matches!(err, Error::CorruptHeader(_)));
}

#[test]
fn aead_tag_is_authoritative_without_check_field() {
    let log = quiet();
    let sealed = container::seal(b"secret", b"pw", &log).unwrap();
    let (mut header, payload) = container::split(&sealed).unwrap();
    header.check = None;
    let opened = container::open_payload(&header, payload, b"pw", &log).unwrap();
    assert_eq!(&opened[..], b"secret");
}
