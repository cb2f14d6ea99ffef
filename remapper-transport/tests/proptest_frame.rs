//! Property-based tests for the frame codec.

use proptest::prelude::*;
use remapper_transport::{
    decode, encode, parse_frame, HidCommand, InjectInput, ParsedCommand, ProtocolError,
    ProtocolRevision,
};

fn revision() -> impl Strategy<Value = ProtocolRevision> {
    prop_oneof![Just(ProtocolRevision::V18), Just(ProtocolRevision::V19)]
}

/// A revision together with a payload that fits its frame
fn fitting_payload() -> impl Strategy<Value = (ProtocolRevision, Vec<u8>)> {
    revision().prop_flat_map(|rev| {
        (
            Just(rev),
            proptest::collection::vec(any::<u8>(), 0..=rev.payload_capacity()),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Encoding then decoding returns the header, the payload padded with
    /// zeros, and a valid checksum.
    #[test]
    fn prop_decode_inverts_encode((rev, payload) in fitting_payload(), id in any::<u8>()) {
        let frame = encode(rev.version(), id, &payload, rev.frame_size())
            .map_err(|e| TestCaseError::fail(format!("encode failed: {e}")))?;
        prop_assert_eq!(frame.len(), rev.frame_size());

        let decoded = decode(frame.as_bytes(), rev.frame_size())
            .map_err(|e| TestCaseError::fail(format!("decode failed: {e}")))?;
        prop_assert_eq!(decoded.version, rev.version());
        prop_assert_eq!(decoded.command_id, id);
        prop_assert!(decoded.checksum_valid);
        prop_assert_eq!(&decoded.payload[..payload.len()], &payload[..]);
        prop_assert!(decoded.payload[payload.len()..].iter().all(|&b| b == 0));
    }

    /// Any single flipped bit makes the frame unacceptable.
    #[test]
    fn prop_single_bit_flip_rejected(
        (rev, payload) in fitting_payload(),
        bit in 0usize..(128 * 8),
    ) {
        let frame = encode(rev.version(), 27, &payload, rev.frame_size())
            .map_err(|e| TestCaseError::fail(format!("encode failed: {e}")))?;
        let mut bytes = frame.into_bytes();
        let bit = bit % (bytes.len() * 8);
        bytes[bit / 8] ^= 1 << (bit % 8);

        let decoded = decode(&bytes, rev.frame_size())
            .map_err(|e| TestCaseError::fail(format!("decode failed: {e}")))?;
        let verdict = decoded.validate(rev.version());
        prop_assert!(
            matches!(
                verdict,
                Err(ProtocolError::ChecksumInvalid { .. })
                    | Err(ProtocolError::ProtocolVersionMismatch { .. })
            ),
            "bit {} accepted: {:?}", bit, verdict
        );
    }

    /// Oversized payloads are refused with the capacity in the error.
    #[test]
    fn prop_oversize_rejected(rev in revision(), extra in 1usize..64) {
        let len = rev.payload_capacity() + extra;
        let payload = vec![0xA5; len];
        let err = encode(rev.version(), 1, &payload, rev.frame_size()).unwrap_err();
        prop_assert_eq!(
            err,
            ProtocolError::PayloadTooLarge { len, capacity: rev.payload_capacity() }
        );
    }

    /// Injected input survives the firmware-side parse on both revisions.
    #[test]
    fn prop_inject_parses_back(
        rev in revision(),
        x in any::<i16>(),
        y in any::<i16>(),
        mask in any::<u8>(),
        wheel in any::<i8>(),
    ) {
        let report = InjectInput::motion(x, y).buttons(mask).wheel(wheel);
        let frame = report.build(rev)
            .map_err(|e| TestCaseError::fail(format!("build failed: {e}")))?;
        let parsed = parse_frame(frame.as_bytes(), rev)
            .map_err(|e| TestCaseError::fail(format!("parse failed: {e}")))?;

        let expected = match rev {
            ProtocolRevision::V18 => InjectInput::motion(x, y).buttons(mask),
            ProtocolRevision::V19 => report,
        };
        prop_assert_eq!(parsed, ParsedCommand::InjectInput(expected));
    }
}

#[test]
fn crc_check_value() {
    assert_eq!(remapper_transport::crc32(b"123456789"), 0xCBF4_3926);
}

#[test]
fn wrong_length_is_size_mismatch() {
    let rev = ProtocolRevision::V19;
    let err = decode(&[0u8; 64], rev.frame_size()).unwrap_err();
    assert_eq!(
        err,
        ProtocolError::FrameSizeMismatch {
            expected: 128,
            actual: 64
        }
    );
}
