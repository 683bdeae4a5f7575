#![no_main]
use libfuzzer_sys::fuzz_target;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tlsstate::{Random, StateConfig, StateEngine, TlsVersion};

fuzz_target!(|data: &[u8]| {
    let mut engine = StateEngine::new(StateConfig::builder().build(), StdRng::seed_from_u64(0));
    engine.start_handshake(TlsVersion::Tls10, Random([1; 32]));
    engine.set_server_random(Random([2; 32])).unwrap();
    engine.derive_master_secret(&[3; 48]).unwrap();
    for chunk in data.chunks(7) {
        engine.accumulate_handshake_bytes(chunk).unwrap();
        let first = engine.compute_finished(true).unwrap();
        let second = engine.compute_finished(true).unwrap();
        assert_eq!(first, second);
    }
});
