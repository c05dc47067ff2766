use crate::protocol::DecodeError;
use crate::protocol::applemidi::SyncPacket;

fn sync_bytes(ssrc: u32, count: u8, timestamps: [u64; 3]) -> Vec<u8> {
    let mut buf = vec![0xFF, 0xFF, b'C', b'K'];
    buf.extend_from_slice(&ssrc.to_be_bytes());
    buf.push(count);
    buf.extend_from_slice(&[0, 0, 0]);
    for timestamp in timestamps {
        buf.extend_from_slice(&timestamp.to_be_bytes());
    }
    buf
}

#[test]
fn test_decode_sync() {
    let buf = sync_bytes(0xCAFE_BABE, 2, [10, 20, 30]);
    let sync = SyncPacket::decode(&buf).unwrap();

    assert_eq!(sync.ssrc, 0xCAFE_BABE);
    assert_eq!(sync.count, 2);
    assert_eq!(sync.timestamps, [10, 20, 30]);
}

#[test]
fn test_decode_sync_requires_exact_length() {
    let mut buf = sync_bytes(1, 0, [1, 0, 0]);
    buf.push(0);

    assert_eq!(
        SyncPacket::decode(&buf),
        Err(DecodeError::InvalidLength {
            expected: 36,
            actual: 37
        })
    );
    assert!(SyncPacket::decode(&buf[..35]).is_err());
}

#[test]
fn test_decode_sync_rejects_bad_signature() {
    let mut buf = sync_bytes(1, 0, [1, 0, 0]);
    buf[0] = 0x80;

    assert_eq!(
        SyncPacket::decode(&buf),
        Err(DecodeError::InvalidSignature(0x80FF))
    );
}

#[test]
fn test_reply_encode_layout() {
    let reply = SyncPacket::reply(0x0102_0304, 0x1111, 0x2222);
    let encoded = reply.encode();

    assert_eq!(encoded.len(), SyncPacket::SIZE);
    assert_eq!(&encoded[0..4], &[0xFF, 0xFF, b'C', b'K']);
    assert_eq!(&encoded[4..8], &[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(encoded[8], 1);
    assert_eq!(&encoded[9..12], &[0, 0, 0]);
    assert_eq!(&encoded[12..20], &0x1111u64.to_be_bytes());
    assert_eq!(&encoded[20..28], &0x2222u64.to_be_bytes());
    assert_eq!(&encoded[28..36], &[0u8; 8]);
}

#[test]
fn test_sync_roundtrip() {
    let reply = SyncPacket::reply(42, u64::MAX - 1, 12345);
    assert_eq!(SyncPacket::decode(&reply.encode()).unwrap(), reply);
}

#[test]
fn test_offset_estimate() {
    let sync = SyncPacket {
        ssrc: 1,
        count: 2,
        timestamps: [1000, 1600, 1300],
    };
    // (1300 + 1000) / 2 - 1600
    assert_eq!(sync.offset_estimate(), -450);

    let sync = SyncPacket {
        ssrc: 1,
        count: 2,
        timestamps: [1001, 200, 1002],
    };
    // Truncating division: 2003 / 2 = 1001
    assert_eq!(sync.offset_estimate(), 801);
}

#[test]
fn test_offset_estimate_large_timestamps() {
    let sync = SyncPacket {
        ssrc: 1,
        count: 2,
        timestamps: [u64::MAX, u64::MAX, u64::MAX],
    };
    assert_eq!(sync.offset_estimate(), 0);
}
