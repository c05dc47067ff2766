use proptest::prelude::*;

use crate::protocol::applemidi::{
    Command, EndSession, Invitation, ReceiverFeedback, SyncPacket,
};

proptest! {
    #[test]
    fn test_decoders_any_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
        // Should not panic, return either Ok or Err
        let _ = Invitation::decode(&bytes);
        let _ = EndSession::decode(&bytes);
        let _ = SyncPacket::decode(&bytes);
        let _ = ReceiverFeedback::decode(&bytes);
    }

    #[test]
    fn test_invitation_fields_survive_decode(
        token in any::<u32>(),
        ssrc in any::<u32>(),
        name in "[a-zA-Z0-9 ]{0,64}",
    ) {
        let mut buf = vec![0xFF, 0xFF, b'I', b'N', 0, 0, 0, 2];
        buf.extend_from_slice(&token.to_be_bytes());
        buf.extend_from_slice(&ssrc.to_be_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.push(0);

        let decoded = Invitation::decode(&buf).expect("Decode failed");
        prop_assert_eq!(decoded.command, Command::Invitation);
        prop_assert_eq!(decoded.initiator_token, token);
        prop_assert_eq!(decoded.ssrc, ssrc);
        prop_assert_eq!(decoded.name, name);
    }

    #[test]
    fn test_sync_encode_decode_roundtrip(
        ssrc in any::<u32>(),
        count in 0u8..3,
        timestamps in any::<[u64; 3]>(),
    ) {
        let sync = SyncPacket { ssrc, count, timestamps };
        let decoded = SyncPacket::decode(&sync.encode()).expect("Decode failed");
        prop_assert_eq!(decoded, sync);
    }

    #[test]
    fn test_offset_estimate_matches_formula(
        t0 in 0u64..1 << 40,
        t1 in 0u64..1 << 40,
        t2 in 0u64..1 << 40,
    ) {
        let sync = SyncPacket { ssrc: 0, count: 2, timestamps: [t0, t1, t2] };
        #[allow(clippy::cast_possible_wrap)]
        let expected = ((t2 + t0) / 2) as i64 - t1 as i64;
        prop_assert_eq!(sync.offset_estimate(), expected);
    }
}
