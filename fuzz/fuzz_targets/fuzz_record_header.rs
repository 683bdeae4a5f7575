#![no_main]
use libfuzzer_sys::fuzz_target;
use tlsstate::RecordHeader;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = RecordHeader::decode(data) {
        assert_eq!(&header.encode()[..], &data[..5]);
    }
});
