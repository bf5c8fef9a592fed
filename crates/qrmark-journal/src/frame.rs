//! On-disk layout of a redemption journal.
//!
//! A journal is [`HEADER`] followed by frames. Each frame is an 8-byte
//! prefix (`kind`, three zero bytes, payload length as u32 LE) and the
//! payload. Record frames carry one [`RedemptionRecord`] as UTF-8 JSON.

use crate::errors::JournalError;
use qrmark_core::RedemptionRecord;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Frame prefix size in bytes.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Largest payload a frame may carry. A record is a few hundred bytes.
pub const MAX_PAYLOAD_SIZE: u32 = 1024 * 1024;

/// Journal header: `QRJ1`, version 1 (u16 LE), then zeroed flags and reserved bytes.
pub const HEADER: [u8; HEADER_SIZE] = [
    b'Q', b'R', b'J', b'1', 0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

const KIND_REDEMPTION: u8 = 0x01;

/// Checks that `bytes` is the journal header this version writes.
pub fn check_header(bytes: &[u8]) -> Result<(), JournalError> {
    if bytes == HEADER {
        return Ok(());
    }
    let reason = if bytes.len() != HEADER_SIZE {
        format!("expected {} bytes, got {}", HEADER_SIZE, bytes.len())
    } else if bytes[..4] != HEADER[..4] {
        "not a qrmark journal".to_string()
    } else if bytes[4..6] != HEADER[4..6] {
        format!(
            "unsupported version 0x{:04x}",
            u16::from_le_bytes([bytes[4], bytes[5]])
        )
    } else {
        "non-zero flags or reserved bytes".to_string()
    };
    Err(JournalError::InvalidHeader(reason))
}

/// A decoded journal frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A committed redemption.
    Redemption(RedemptionRecord),
    /// A frame of a kind this version does not interpret. Readers skip it.
    Opaque {
        /// Frame kind byte, never the record kind.
        kind: u8,
        /// Raw payload.
        payload: Vec<u8>,
    },
}

impl Frame {
    /// Encodes the frame prefix and payload.
    ///
    /// # Errors
    ///
    /// [`JournalError::PayloadTooLarge`] past [`MAX_PAYLOAD_SIZE`], or a JSON
    /// error for a record that does not serialize.
    pub fn encode(&self) -> Result<Vec<u8>, JournalError> {
        let json;
        let (kind, payload) = match self {
            Frame::Redemption(record) => {
                json = serde_json::to_vec(record)?;
                (KIND_REDEMPTION, json.as_slice())
            }
            Frame::Opaque { kind, payload } => (*kind, payload.as_slice()),
        };

        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len <= MAX_PAYLOAD_SIZE)
            .ok_or(JournalError::PayloadTooLarge {
                size: payload.len() as u64,
                max: MAX_PAYLOAD_SIZE,
            })?;

        let mut bytes = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&[kind, 0, 0, 0]);
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(payload);
        Ok(bytes)
    }

    /// Decodes a payload read from a frame of `kind`.
    ///
    /// Record payloads must be UTF-8 JSON. Unknown fields are ignored so that
    /// newer writers can add fields without breaking older readers.
    pub fn decode(kind: u8, payload: Vec<u8>) -> Result<Self, JournalError> {
        if kind != KIND_REDEMPTION {
            return Ok(Frame::Opaque { kind, payload });
        }
        let text = std::str::from_utf8(&payload)?;
        Ok(Frame::Redemption(serde_json::from_str(text)?))
    }
}

/// Splits a frame prefix read at `offset` into its kind and payload length.
pub(crate) fn parse_prefix(
    bytes: &[u8; FRAME_HEADER_SIZE],
    offset: u64,
) -> Result<(u8, u32), JournalError> {
    let invalid = |reason: String| JournalError::InvalidFrame { offset, reason };
    if bytes[1..4] != [0u8; 3] {
        return Err(invalid("non-zero reserved bytes".to_string()));
    }
    let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if len > MAX_PAYLOAD_SIZE {
        return Err(invalid(format!(
            "payload size {} exceeds maximum {}",
            len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok((bytes[0], len))
}
