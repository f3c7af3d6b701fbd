//! Binary wire format for full-skeleton pose snapshots
//!
//! ## Packet Layout
//!
//! ```text
//! offset 0      i32 LE   joint count N
//! offset 4      N records of 7 × f32 LE:
//!               [px, py, pz, qx, qy, qz, qw]
//! ```
//!
//! There is no header, version, checksum or joint tagging: record `i` is the
//! joint with ordinal `i` in the shared [`JointId`](crate::JointId) table.
//! Both endpoints must agree on that table and on little-endian byte order.
//!
//! Decoding is lenient about trailing bytes and strict about truncation.

use crate::types::{JointPose, Quat, Snapshot, Vec3};
use crate::{PoseError, Result};

/// Size of the leading joint count field in bytes.
pub const COUNT_SIZE: usize = 4;

/// Size of one encoded joint record in bytes (7 × f32).
pub const RECORD_SIZE: usize = 7 * 4;

/// Largest UDP payload over IPv4.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Encoded size of a snapshot with `joints` entries.
pub const fn encoded_len(joints: usize) -> usize {
    COUNT_SIZE + joints * RECORD_SIZE
}

/// Encode a snapshot into a new buffer.
pub fn encode(snapshot: &Snapshot) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(encoded_len(snapshot.len()));
    encode_into(snapshot, &mut buffer);
    buffer
}

/// Encode a snapshot into `buffer`, replacing its contents.
pub fn encode_into(snapshot: &Snapshot, buffer: &mut Vec<u8>) {
    buffer.clear();
    buffer.reserve(encoded_len(snapshot.len()));
    buffer.extend_from_slice(&(snapshot.len() as i32).to_le_bytes());

    for joint in snapshot {
        let p = joint.position;
        let q = joint.rotation;
        for value in [p.x, p.y, p.z, q.x, q.y, q.z, q.w] {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    }
}

/// Decode a snapshot from a datagram payload.
pub fn decode(data: &[u8]) -> Result<Snapshot> {
    let count_bytes = data.get(..COUNT_SIZE).ok_or_else(|| {
        PoseError::malformed_packet(format!(
            "packet is {} bytes, too short for the joint count",
            data.len()
        ))
    })?;
    let count = i32::from_le_bytes([count_bytes[0], count_bytes[1], count_bytes[2], count_bytes[3]]);

    let count = usize::try_from(count)
        .map_err(|_| PoseError::malformed_packet(format!("negative joint count {}", count)))?;

    let body = &data[COUNT_SIZE..];
    let required = count.checked_mul(RECORD_SIZE).ok_or_else(|| {
        PoseError::malformed_packet(format!("joint count {} overflows packet size", count))
    })?;
    if body.len() < required {
        return Err(PoseError::malformed_packet(format!(
            "declared {} joints needing {} bytes, only {} present",
            count,
            required,
            body.len()
        )));
    }

    let joints = body[..required].chunks_exact(RECORD_SIZE).map(decode_record).collect();
    Ok(Snapshot::new(joints))
}

fn decode_record(record: &[u8]) -> JointPose {
    let f = |index: usize| {
        let offset = index * 4;
        f32::from_le_bytes([
            record[offset],
            record[offset + 1],
            record[offset + 2],
            record[offset + 3],
        ])
    };
    JointPose::new(Vec3::new(f(0), f(1), f(2)), Quat::new(f(3), f(4), f(5), f(6)))
}
