//! End-to-end handshake through a client and a server engine.
//! Both sides derive the same keys, agree on Finished, and
//! authenticate each other's records.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tlsstate::handshake::PublicKey;
use tlsstate::{
    Cipher, CipherSuite, ContentType, Direction, HandshakeType, Random, RecordHeader, StateConfig,
    StateEngine, TlsRole, TlsVersion,
};

fn engine(role: TlsRole, seed: u64) -> StateEngine {
    let config = StateConfig::builder().role(role).build();
    StateEngine::new(config, StdRng::seed_from_u64(seed))
}

/// Handshake message framing: type(1) || length(3) || body.
fn handshake_message(msg_type: HandshakeType, body: &[u8]) -> Vec<u8> {
    let len = body.len() as u32;
    let mut out = vec![msg_type as u8];
    out.extend_from_slice(&len.to_be_bytes()[1..]);
    out.extend_from_slice(body);
    out
}

/// Feed a message to both transcripts when it is digest material.
fn exchange(
    client: &mut StateEngine,
    server: &mut StateEngine,
    msg_type: HandshakeType,
    body: &[u8],
) {
    let msg = handshake_message(msg_type, body);
    if client.classify_handshake_material(msg_type) {
        client.accumulate_handshake_bytes(&msg).unwrap();
    }
    if server.classify_handshake_material(msg_type) {
        server.accumulate_handshake_bytes(&msg).unwrap();
    }
}

/// Run a full RSA-style handshake and leave both engines in data transfer.
fn handshake(suite: CipherSuite) -> (StateEngine, StateEngine) {
    let mut client = engine(TlsRole::Client, 1);
    let mut server = engine(TlsRole::Server, 2);

    // -------------------------------------------------------
    // ClientHello / ServerHello
    // -------------------------------------------------------
    let client_random = client.gen_client_random();
    client.set_client_version(TlsVersion::Tls10);
    client.start_handshake(TlsVersion::Tls10, client_random);
    server.start_handshake(TlsVersion::Tls10, client_random);
    exchange(&mut client, &mut server, HandshakeType::HelloRequest, b"");
    exchange(&mut client, &mut server, HandshakeType::ClientHello, client_random.as_bytes());

    let server_random = server.gen_server_random();
    client.set_server_random(server_random).unwrap();
    server.set_server_random(server_random).unwrap();
    exchange(&mut client, &mut server, HandshakeType::ServerHello, server_random.as_bytes());
    exchange(&mut client, &mut server, HandshakeType::Certificate, b"server certificate chain");
    exchange(&mut client, &mut server, HandshakeType::ServerHelloDone, b"");
    client.set_public_key(PublicKey(b"server rsa key".to_vec())).unwrap();

    // -------------------------------------------------------
    // ClientKeyExchange
    // -------------------------------------------------------
    let pre_master_secret = client.gen_random(48);
    exchange(&mut client, &mut server, HandshakeType::ClientKeyExchange, &pre_master_secret);
    client.derive_master_secret(&pre_master_secret).unwrap();
    server.derive_master_secret(&pre_master_secret).unwrap();

    let cipher = Cipher::from_suite(suite).unwrap();
    client.set_cipher(cipher.clone());
    server.set_cipher(cipher);
    client.derive_key_schedule().unwrap();
    server.derive_key_schedule().unwrap();

    // -------------------------------------------------------
    // ChangeCipherSpec + Finished, client first
    // -------------------------------------------------------
    client.switch_tx_encryption();
    server.switch_rx_encryption();
    let client_verify = client.compute_finished(true).unwrap();
    assert!(server.verify_finished(true, &client_verify).unwrap());
    exchange(&mut client, &mut server, HandshakeType::Finished, &client_verify);

    server.switch_tx_encryption();
    client.switch_rx_encryption();
    let server_verify = server.compute_finished(false).unwrap();
    assert!(client.verify_finished(false, &server_verify).unwrap());
    assert_ne!(client_verify, server_verify);

    client.end_handshake();
    server.end_handshake();
    (client, server)
}

#[test]
fn test_full_handshake_agrees_on_secrets() {
    let mut client = engine(TlsRole::Client, 10);
    let mut server = engine(TlsRole::Server, 20);
    let client_random = Random([0xC1; 32]);
    let server_random = Random([0x5E; 32]);

    client.start_handshake(TlsVersion::Tls10, client_random);
    server.start_handshake(TlsVersion::Tls10, client_random);
    client.set_server_random(server_random).unwrap();
    server.set_server_random(server_random).unwrap();
    client.derive_master_secret(&[0x03; 48]).unwrap();
    server.derive_master_secret(&[0x03; 48]).unwrap();

    let client_ms = client.master_secret().unwrap();
    assert_eq!(client_ms.as_bytes().len(), 48);
    assert_eq!(Some(client_ms), server.master_secret());
}

#[test]
fn test_full_handshake_aes128_sha() {
    let (client, server) = handshake(CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA);

    assert!(!client.handshake_active());
    assert!(!server.handshake_active());
    assert!(client.tx_encrypted() && client.rx_encrypted());
    assert!(server.tx_encrypted() && server.rx_encrypted());

    let client_tx = client.direction_state(Direction::Tx).unwrap();
    let server_rx = server.direction_state(Direction::Rx).unwrap();
    assert_eq!(client_tx, server_rx);
    assert_eq!(client_tx.mac_secret().len(), 20);
    assert_eq!(client_tx.key().len(), 16);
    assert_eq!(client_tx.iv().len(), 16);
    assert_eq!(
        client.direction_state(Direction::Rx),
        server.direction_state(Direction::Tx)
    );
    assert_ne!(client_tx, client.direction_state(Direction::Rx).unwrap());
}

#[test]
fn test_record_macs_cross_verify() {
    let (mut client, mut server) = handshake(CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA);

    let payloads: [&[u8]; 3] = [b"GET / HTTP/1.0\r\n\r\n", b"", b"second record"];
    for payload in payloads {
        let header = RecordHeader::new(
            ContentType::ApplicationData,
            TlsVersion::Tls10,
            payload.len() as u16,
        );
        let sent = client.compute_mac(Direction::Tx, &header, payload).unwrap();
        let checked = server.compute_mac(Direction::Rx, &header, payload).unwrap();
        assert_eq!(sent, checked);
    }

    let header = RecordHeader::new(ContentType::Alert, TlsVersion::Tls10, 2);
    let sent = server.compute_mac(Direction::Tx, &header, &[1, 0]).unwrap();
    let checked = client.compute_mac(Direction::Rx, &header, &[1, 0]).unwrap();
    assert_eq!(sent, checked);

    assert_eq!(client.sequence_number(Direction::Tx), Some(3));
    assert_eq!(server.sequence_number(Direction::Rx), Some(3));
    assert_eq!(server.sequence_number(Direction::Tx), Some(1));
    assert_eq!(client.sequence_number(Direction::Rx), Some(1));
}

#[test]
fn test_out_of_step_sequence_breaks_mac() {
    let (mut client, mut server) = handshake(CipherSuite::TLS_RSA_WITH_RC4_128_MD5);
    let header = RecordHeader::new(ContentType::ApplicationData, TlsVersion::Tls10, 4);

    // Server drops the first record; its receive counter falls behind.
    client.compute_mac(Direction::Tx, &header, b"lost").unwrap();
    let sent = client.compute_mac(Direction::Tx, &header, b"next").unwrap();
    let checked = server.compute_mac(Direction::Rx, &header, b"next").unwrap();
    assert_eq!(sent.len(), 16);
    assert_ne!(sent, checked);
}

#[test]
fn test_every_suite_completes() {
    for suite in [
        CipherSuite::TLS_RSA_WITH_NULL_MD5,
        CipherSuite::TLS_RSA_WITH_NULL_SHA,
        CipherSuite::TLS_RSA_WITH_RC4_128_MD5,
        CipherSuite::TLS_RSA_WITH_RC4_128_SHA,
        CipherSuite::TLS_RSA_WITH_3DES_EDE_CBC_SHA,
        CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
        CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
        CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA256,
    ] {
        let (client, server) = handshake(suite);
        let cipher = Cipher::from_suite(suite).unwrap();
        let tx = client.direction_state(Direction::Tx).unwrap();
        assert_eq!(tx.key().len(), cipher.key_len, "{suite:?}");
        assert_eq!(tx.iv().len(), cipher.iv_len, "{suite:?}");
        assert_eq!(tx.mac_secret().len(), cipher.mac_len, "{suite:?}");
        assert_eq!(server.cipher(), Some(cipher));
    }
}

#[test]
fn test_finished_mismatch_on_diverged_transcript() {
    let mut client = engine(TlsRole::Client, 5);
    let mut server = engine(TlsRole::Server, 6);
    for e in [&mut client, &mut server] {
        e.start_handshake(TlsVersion::Tls10, Random([1; 32]));
        e.set_server_random(Random([2; 32])).unwrap();
        e.derive_master_secret(&[3; 48]).unwrap();
    }
    client.accumulate_handshake_bytes(b"client hello").unwrap();
    server.accumulate_handshake_bytes(b"client hellO").unwrap();

    let client_verify = client.compute_finished(true).unwrap();
    assert!(!server.verify_finished(true, &client_verify).unwrap());
}

#[test]
fn test_key_log_lines_match_between_peers() {
    let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let make = |role: TlsRole| {
        let sink = lines.clone();
        let config = StateConfig::builder()
            .role(role)
            .key_log(Arc::new(move |line: &str| {
                sink.lock().unwrap().push(line.to_string());
            }))
            .build();
        StateEngine::new(config, StdRng::seed_from_u64(9))
    };
    let mut client = make(TlsRole::Client);
    let mut server = make(TlsRole::Server);
    for e in [&mut client, &mut server] {
        e.start_handshake(TlsVersion::Tls10, Random([0xAA; 32]));
        e.set_server_random(Random([0xBB; 32])).unwrap();
        e.derive_master_secret(b"shared pre-master secret").unwrap();
    }

    let logged = lines.lock().unwrap();
    assert_eq!(logged.len(), 2);
    assert_eq!(logged[0], logged[1]);
    assert!(logged[0].starts_with(&format!("CLIENT_RANDOM {} ", "aa".repeat(32))));
}
