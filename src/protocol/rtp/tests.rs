use proptest::prelude::*;

use super::sysex::{SegmentKind, segment_of};
use super::{MidiPacket, RtpHeader};

proptest! {
    #[test]
    fn test_decode_any_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..600)) {
        // Should not panic, return either Ok or Err
        if let Ok(packet) = MidiPacket::decode(&bytes) {
            prop_assert!(packet.payload().len() <= packet.commands.len());
        }
        let _ = RtpHeader::decode(&bytes);
    }

    #[test]
    fn test_packet_encode_decode_roundtrip(
        sequence in any::<u16>(),
        timestamp in any::<u32>(),
        ssrc in any::<u32>(),
        commands in proptest::collection::vec(any::<u8>(), 0..0x300),
    ) {
        let packet = MidiPacket::new(sequence, timestamp, ssrc, commands.clone());
        let decoded = MidiPacket::decode(&packet.encode()).expect("Decode failed");

        prop_assert_eq!(decoded.header.sequence, sequence);
        prop_assert_eq!(decoded.header.timestamp, timestamp);
        prop_assert_eq!(decoded.header.ssrc, ssrc);
        prop_assert_eq!(decoded.commands.as_ref(), commands.as_slice());
    }

    #[test]
    fn test_segment_lengths(
        inner in proptest::collection::vec(0u8..0x80, 0..64),
        first in prop::sample::select(vec![0xF0u8, 0xF7]),
        last in prop::sample::select(vec![0xF0u8, 0xF7, 0xF4]),
    ) {
        let mut commands = vec![first];
        commands.extend_from_slice(&inner);
        commands.push(last);
        let n = commands.len();

        let seg = segment_of(&commands);
        let (kind, start, len) = match (first, last) {
            (0xF0, 0xF0) => (SegmentKind::First, 0, n - 1),
            (0xF7, 0xF0) => (SegmentKind::Middle, 1, n - 2),
            (0xF7, 0xF7) => (SegmentKind::Last, 1, n - 1),
            (0xF7, 0xF4) => (SegmentKind::Cancelled, 0, 1),
            _ => (SegmentKind::Complete, 0, n),
        };

        prop_assert_eq!(seg.kind, kind);
        prop_assert_eq!(seg.start, start);
        prop_assert_eq!(seg.len, len);
        prop_assert!(seg.apply(&commands).len() <= n);
    }
}
