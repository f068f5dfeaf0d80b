//! Fixed-layout binary packet encoding.
//!
//! Each packet bundles `PACKET_LEN` samples of every channel and is fully
//! self-contained:
//!
//! | Field      | Bytes | Encoding                     |
//! |------------|-------|------------------------------|
//! | RF         | 4096  | f32 little-endian            |
//! | Gradient X | 4096  | f32 little-endian            |
//! | Gradient Y | 4096  | f32 little-endian            |
//! | Gradient Z | 4096  | f32 little-endian            |
//! | Receive    | 128   | 1 bit per sample, MSB first  |
//!
//! The last packet is padded with zero samples up to `PACKET_LEN`. Packets
//! are written back to back with no header, separator or trailer; the
//! consumer must know the sample count and sample period out of band.
//!
//! The byte order is pinned to little-endian so the stream means the same
//! thing on every host.

use std::io::Write;

use crate::error::{Error, Result};
use crate::types::SequenceWaveforms;

/// Samples per channel in one packet.
pub const PACKET_LEN: usize = 1024;

/// Serialized size of one packet: four f32 channels plus the bit-packed
/// receive channel.
pub const PACKET_BYTES: usize = 4 * 4 * PACKET_LEN + PACKET_LEN / 8;

/// Number of packets a sequence of `num_samples` samples occupies.
pub fn packet_count(num_samples: usize) -> usize {
    (num_samples + PACKET_LEN - 1) / PACKET_LEN
}

/// Serialize one f32 channel slice, zero-padded to `PACKET_LEN` floats.
fn write_channel(frame: &mut Vec<u8>, samples: &[f64]) {
    for &sample in samples {
        frame.extend_from_slice(&(sample as f32).to_le_bytes());
    }
    for _ in samples.len()..PACKET_LEN {
        frame.extend_from_slice(&0.0_f32.to_le_bytes());
    }
}

/// Pack the receive gate, false-padded to `PACKET_LEN` samples, 8 samples
/// per byte, most significant bit first.
fn pack_receive(frame: &mut Vec<u8>, samples: &[bool]) {
    let mut bytes = [0u8; PACKET_LEN / 8];
    for (i, &high) in samples.iter().enumerate() {
        if high {
            bytes[i / 8] |= 1 << (7 - i % 8);
        }
    }
    frame.extend_from_slice(&bytes);
}

/// Build the frame for packet `index`.
fn encode_frame(waveforms: &SequenceWaveforms, index: usize) -> Result<Vec<u8>> {
    let start = index * PACKET_LEN;
    let end = (start + PACKET_LEN).min(waveforms.len());

    let mut frame = Vec::with_capacity(PACKET_BYTES);
    write_channel(&mut frame, &waveforms.rf[start..end]);
    write_channel(&mut frame, &waveforms.gradient.x[start..end]);
    write_channel(&mut frame, &waveforms.gradient.y[start..end]);
    write_channel(&mut frame, &waveforms.gradient.z[start..end]);
    pack_receive(&mut frame, &waveforms.receive[start..end]);

    if frame.len() != PACKET_BYTES {
        return Err(Error::EncodingInvariant {
            expected: PACKET_BYTES,
            actual: frame.len(),
        });
    }
    Ok(frame)
}

#[cfg(not(feature = "parallel"))]
fn build_frames(waveforms: &SequenceWaveforms) -> Result<Vec<Vec<u8>>> {
    (0..packet_count(waveforms.len()))
        .map(|index| encode_frame(waveforms, index))
        .collect()
}

// Frames only read disjoint slices of the finished arrays, so they can be
// built concurrently; collecting keeps index order, and the write loop below
// stays strictly sequential.
#[cfg(feature = "parallel")]
fn build_frames(waveforms: &SequenceWaveforms) -> Result<Vec<Vec<u8>>> {
    use rayon::prelude::*;

    (0..packet_count(waveforms.len()))
        .into_par_iter()
        .map(|index| encode_frame(waveforms, index))
        .collect()
}

/// Encode the whole sequence as `ceil(len / PACKET_LEN)` packets and write
/// them to `writer` in increasing time order.
pub fn encode_packets<W: Write>(waveforms: &SequenceWaveforms, writer: &mut W) -> Result<()> {
    for frame in build_frames(waveforms)? {
        writer.write_all(&frame)?;
    }
    Ok(())
}

/// One decoded packet: the consumer-side view of a single frame.
#[derive(Debug, Clone)]
pub struct Packet {
    pub rf: Vec<f32>,
    pub gradient_x: Vec<f32>,
    pub gradient_y: Vec<f32>,
    pub gradient_z: Vec<f32>,
    pub receive: Vec<bool>,
}

/// Decode a single frame; the inverse of the encoder.
pub fn decode_packet(frame: &[u8]) -> Result<Packet> {
    if frame.len() != PACKET_BYTES {
        return Err(Error::EncodingInvariant {
            expected: PACKET_BYTES,
            actual: frame.len(),
        });
    }

    let read_channel = |offset: usize| -> Vec<f32> {
        (0..PACKET_LEN)
            .map(|i| {
                let at = offset + 4 * i;
                f32::from_le_bytes(frame[at..at + 4].try_into().unwrap())
            })
            .collect()
    };

    let bits_at = 4 * 4 * PACKET_LEN;
    let receive = (0..PACKET_LEN)
        .map(|i| frame[bits_at + i / 8] >> (7 - i % 8) & 1 == 1)
        .collect();

    Ok(Packet {
        rf: read_channel(0),
        gradient_x: read_channel(4 * PACKET_LEN),
        gradient_y: read_channel(8 * PACKET_LEN),
        gradient_z: read_channel(12 * PACKET_LEN),
        receive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GradientWaveforms;
    use assert2::{check, let_assert};
    use rand::Rng;

    fn waveforms(num_samples: usize) -> SequenceWaveforms {
        SequenceWaveforms {
            rf: vec![0.0; num_samples],
            gradient: GradientWaveforms::zeroed(num_samples),
            receive: vec![false; num_samples],
        }
    }

    fn random_waveforms(num_samples: usize) -> SequenceWaveforms {
        let mut rng = rand::thread_rng();
        SequenceWaveforms {
            rf: (0..num_samples).map(|_| rng.gen_range(-1.0..1.0)).collect(),
            gradient: GradientWaveforms {
                x: (0..num_samples).map(|_| rng.gen_range(-1.0..1.0)).collect(),
                y: (0..num_samples).map(|_| rng.gen_range(-1.0..1.0)).collect(),
                z: (0..num_samples).map(|_| rng.gen_range(-1.0..1.0)).collect(),
            },
            receive: (0..num_samples).map(|_| rng.gen()).collect(),
        }
    }

    fn encode(waveforms: &SequenceWaveforms) -> Vec<u8> {
        let mut stream = Vec::new();
        encode_packets(waveforms, &mut stream).unwrap();
        stream
    }

    #[test]
    fn packet_count_rounds_up() {
        check!(packet_count(0) == 0);
        check!(packet_count(1) == 1);
        check!(packet_count(PACKET_LEN) == 1);
        check!(packet_count(PACKET_LEN + 1) == 2);
        check!(packet_count(3 * PACKET_LEN) == 3);
    }

    #[test]
    fn every_packet_is_exactly_16512_bytes() {
        check!(PACKET_BYTES == 16_512);
        for num_samples in [1, 40, PACKET_LEN, PACKET_LEN + 1, 2500] {
            let stream = encode(&waveforms(num_samples));
            check!(stream.len() == packet_count(num_samples) * PACKET_BYTES);
        }
    }

    #[test]
    fn channels_sit_at_fixed_offsets() {
        let mut w = waveforms(40);
        w.rf[0] = 1.5;
        w.gradient.x[0] = 2.5;
        w.gradient.y[0] = -3.0;
        w.gradient.z[0] = 4.0;
        w.receive[0] = true;

        let stream = encode(&w);
        check!(stream[0..4] == 1.5_f32.to_le_bytes());
        check!(stream[4096..4100] == 2.5_f32.to_le_bytes());
        check!(stream[8192..8196] == (-3.0_f32).to_le_bytes());
        check!(stream[12288..12292] == 4.0_f32.to_le_bytes());
        // First receive sample lands in the top bit of the first bit-field
        // byte.
        check!(stream[16384] == 0x80);
    }

    #[test]
    fn full_receive_window_packs_to_all_ones() {
        let mut w = waveforms(PACKET_LEN);
        w.receive = vec![true; PACKET_LEN];

        let stream = encode(&w);
        check!(stream.len() == PACKET_BYTES);
        check!(stream[16384..16512].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn receive_bits_are_packed_msb_first() {
        let mut w = waveforms(16);
        for i in 0..16 {
            w.receive[i] = i % 2 == 0;
        }

        let stream = encode(&w);
        check!(stream[16384] == 0xAA);
        check!(stream[16385] == 0xAA);
        check!(stream[16386] == 0x00);
    }

    #[test]
    fn short_sequence_is_zero_padded() {
        let mut w = waveforms(40);
        w.rf[39] = 1.0;

        let stream = encode(&w);
        let packet = decode_packet(&stream).unwrap();
        check!(packet.rf[39] == 1.0);
        check!(packet.rf[40..].iter().all(|&v| v == 0.0));
        check!(packet.receive.iter().all(|&b| !b));
    }

    #[test]
    fn round_trip_reconstructs_the_padded_arrays() {
        let w = random_waveforms(1500);
        let stream = encode(&w);
        check!(stream.len() == 2 * PACKET_BYTES);

        for index in 0..2 {
            let packet = decode_packet(&stream[index * PACKET_BYTES..(index + 1) * PACKET_BYTES])
                .unwrap();
            for i in 0..PACKET_LEN {
                let at = index * PACKET_LEN + i;
                let expect =
                    |channel: &[f64]| channel.get(at).map(|&v| v as f32).unwrap_or(0.0);
                check!(packet.rf[i] == expect(&w.rf));
                check!(packet.gradient_x[i] == expect(&w.gradient.x));
                check!(packet.gradient_y[i] == expect(&w.gradient.y));
                check!(packet.gradient_z[i] == expect(&w.gradient.z));
                check!(packet.receive[i] == w.receive.get(at).copied().unwrap_or(false));
            }
        }
    }

    #[test]
    fn stream_is_frames_in_index_order() {
        let w = random_waveforms(3000);
        let stream = encode(&w);
        for index in 0..packet_count(3000) {
            let frame = encode_frame(&w, index).unwrap();
            check!(stream[index * PACKET_BYTES..(index + 1) * PACKET_BYTES] == frame[..]);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let w = random_waveforms(2048);
        check!(encode(&w) == encode(&w));
    }

    #[test]
    fn decode_rejects_wrong_frame_length() {
        let result = decode_packet(&[0u8; PACKET_BYTES - 1]);
        let_assert!(Err(Error::EncodingInvariant { expected, actual }) = result);
        check!(expected == PACKET_BYTES);
        check!(actual == PACKET_BYTES - 1);
    }
}
