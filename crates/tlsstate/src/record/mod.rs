//! TLS record header encoding and the record MAC input layout.

use crate::TlsVersion;
use tlsstate_types::TlsError;

/// Length of an encoded record header.
pub const RECORD_HEADER_LEN: usize = 5;

/// TLS record content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ContentType {
    ChangeCipherSpec = 20,
    Alert = 21,
    Handshake = 22,
    ApplicationData = 23,
}

impl ContentType {
    pub fn from_u8(v: u8) -> Result<Self, TlsError> {
        match v {
            20 => Ok(ContentType::ChangeCipherSpec),
            21 => Ok(ContentType::Alert),
            22 => Ok(ContentType::Handshake),
            23 => Ok(ContentType::ApplicationData),
            _ => Err(TlsError::RecordError(format!("unknown content type: {v}"))),
        }
    }
}

/// A record header: type(1) || version(2) || length(2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub content_type: ContentType,
    pub version: TlsVersion,
    pub length: u16,
}

impl RecordHeader {
    pub fn new(content_type: ContentType, version: TlsVersion, length: u16) -> Self {
        Self {
            content_type,
            version,
            length,
        }
    }

    /// Serialize the header, big-endian.
    pub fn encode(&self) -> [u8; RECORD_HEADER_LEN] {
        let version = self.version.to_u16().to_be_bytes();
        let length = self.length.to_be_bytes();
        [
            self.content_type as u8,
            version[0],
            version[1],
            length[0],
            length[1],
        ]
    }

    /// Parse a header from the first five bytes of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, TlsError> {
        if data.len() < RECORD_HEADER_LEN {
            return Err(TlsError::RecordError("incomplete record header".into()));
        }
        let content_type = ContentType::from_u8(data[0])?;
        let version = TlsVersion::from_u16(u16::from_be_bytes([data[1], data[2]]))?;
        let length = u16::from_be_bytes([data[3], data[4]]);
        Ok(Self {
            content_type,
            version,
            length,
        })
    }
}

/// Build the record MAC input:
/// `seq_num(8, big-endian) || header(5) || content`.
pub fn mac_input(sequence_number: u64, header: &RecordHeader, content: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(8 + RECORD_HEADER_LEN + content.len());
    input.extend_from_slice(&sequence_number.to_be_bytes());
    input.extend_from_slice(&header.encode());
    input.extend_from_slice(content);
    input
}
