//! Fixed-size, CRC-protected command frames
//!
//! ```text
//! [version:1][command:1][payload, zero padded][crc32 LE:4]
//! |<-------------- total_size - 4 ------------>|
//! ```
//!
//! The checksum covers the padded region, so the firmware can run CRC-32 over
//! its statically sized receive buffer without knowing the payload length.

use std::fmt;

use crate::error::ProtocolError;
use crate::protocol::{CHECKSUM_SIZE, HEADER_SIZE};

/// CRC-32/ISO-HDLC (zlib polynomial, reflected, final xor)
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// A complete, checksummed frame ready to be handed to a transport
#[derive(Clone, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: Vec<u8>,
}

impl CommandFrame {
    /// Protocol version byte
    pub fn version(&self) -> u8 {
        self.bytes[0]
    }

    /// Command byte
    pub fn command_id(&self) -> u8 {
        self.bytes[1]
    }

    /// Payload region including zero padding
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_SIZE..self.checksum_offset()]
    }

    /// Stored CRC-32 trailer
    pub fn checksum(&self) -> u32 {
        read_trailer(&self.bytes)
    }

    /// Serialized frame (no report id)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn checksum_offset(&self) -> usize {
        self.bytes.len() - CHECKSUM_SIZE
    }
}

impl fmt::Debug for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFrame")
            .field("version", &self.version())
            .field("command_id", &format_args!("0x{:02X}", self.command_id()))
            .field("len", &self.bytes.len())
            .field("checksum", &format_args!("0x{:08X}", self.checksum()))
            .finish()
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Build a frame of exactly `total_size` bytes.
///
/// Fails with [`ProtocolError::PayloadTooLarge`] when header plus payload do
/// not fit in front of the checksum; nothing is allocated in that case.
pub fn encode(
    version: u8,
    command_id: u8,
    payload: &[u8],
    total_size: usize,
) -> Result<CommandFrame, ProtocolError> {
    let body_len = checked_body_len(total_size)?;
    let capacity = body_len - HEADER_SIZE;
    if payload.len() > capacity {
        return Err(ProtocolError::PayloadTooLarge {
            len: payload.len(),
            capacity,
        });
    }

    let mut bytes = vec![0u8; total_size];
    bytes[0] = version;
    bytes[1] = command_id;
    bytes[HEADER_SIZE..HEADER_SIZE + payload.len()].copy_from_slice(payload);

    let crc = crc32(&bytes[..body_len]);
    bytes[body_len..].copy_from_slice(&crc.to_le_bytes());

    Ok(CommandFrame { bytes })
}

/// A frame split back into its fields, as the firmware sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub version: u8,
    pub command_id: u8,
    /// Full payload region; trailing zeros are padding unless the command
    /// layout says otherwise
    pub payload: Vec<u8>,
    /// Trailer as stored in the frame
    pub checksum: u32,
    /// Whether the trailer matches CRC-32 of everything before it
    pub checksum_valid: bool,
}

impl DecodedFrame {
    /// Apply the firmware's acceptance rules: version first, then checksum
    pub fn validate(&self, expected_version: u8) -> Result<(), ProtocolError> {
        if self.version != expected_version {
            return Err(ProtocolError::ProtocolVersionMismatch {
                expected: expected_version,
                actual: self.version,
            });
        }
        if !self.checksum_valid {
            return Err(ProtocolError::ChecksumInvalid {
                stored: self.checksum,
                computed: self.computed_checksum(),
            });
        }
        Ok(())
    }

    /// CRC-32 over header and payload as decoded
    pub fn computed_checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&[self.version, self.command_id]);
        hasher.update(&self.payload);
        hasher.finalize()
    }
}

/// Split `bytes` into a [`DecodedFrame`], recomputing the checksum.
///
/// Only a length mismatch is an error here; version and checksum problems are
/// reported through the returned value so callers can inspect bad frames.
pub fn decode(bytes: &[u8], total_size: usize) -> Result<DecodedFrame, ProtocolError> {
    let body_len = checked_body_len(total_size)?;
    if bytes.len() != total_size {
        return Err(ProtocolError::FrameSizeMismatch {
            expected: total_size,
            actual: bytes.len(),
        });
    }

    let checksum = read_trailer(bytes);
    Ok(DecodedFrame {
        version: bytes[0],
        command_id: bytes[1],
        payload: bytes[HEADER_SIZE..body_len].to_vec(),
        checksum,
        checksum_valid: crc32(&bytes[..body_len]) == checksum,
    })
}

fn checked_body_len(total_size: usize) -> Result<usize, ProtocolError> {
    if total_size < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(ProtocolError::InvalidFrameSize(total_size));
    }
    Ok(total_size - CHECKSUM_SIZE)
}

fn read_trailer(bytes: &[u8]) -> u32 {
    let at = bytes.len() - CHECKSUM_SIZE;
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
