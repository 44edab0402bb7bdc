//! Strict parser for uncompressed PCM audio in a RIFF/WAVE container.
//!
//! The parser is a pure function of the input bytes: each step reads from an
//! immutable slice at an explicit offset and either produces a validated
//! value or fails with one of the [`crate::WavVizError`] decode variants.
//! Nothing is recovered; a failed decode yields no partial result.

use std::path::Path;

use crate::{endian, Result, WavVizError};

/// "RIFF" as a big-endian 32-bit value.
const RIFF_MAGIC: u32 = 0x5249_4646;
/// "WAVE" as a big-endian 32-bit value.
const WAVE_MAGIC: u32 = 0x5741_5645;
/// "fmt " as a big-endian 32-bit value.
const FMT_MAGIC: u32 = 0x666D_7420;
/// "LIST" as a big-endian 32-bit value.
const LIST_MAGIC: u32 = 0x4C49_5354;
/// "data" as a big-endian 32-bit value.
const DATA_MAGIC: u32 = 0x6461_7461;

/// Size of the RIFF header in bytes.
pub const RIFF_HEADER_LEN: usize = 12;
/// Size of the format chunk in bytes, including its 8-byte chunk header.
pub const FORMAT_CHUNK_LEN: usize = 24;

/// A sample frame carries either a single channel or a left/right pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelCount {
    Mono = 1,
    Stereo = 2,
}

impl ChannelCount {
    /// Number of interleaved samples per frame.
    pub fn count(self) -> usize {
        self as usize
    }
}

/// Validated PCM stream parameters, immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    channels: ChannelCount,
    sample_rate: u32,
    bits_per_sample: u16,
    byte_rate: u32,
    block_align: u16,
}

impl AudioFormat {
    /// Builds a format description, cross-checking the declared byte rate and
    /// block align against the values PCM derives from the other fields.
    pub fn new(
        channels: ChannelCount,
        sample_rate: u32,
        bits_per_sample: u16,
        byte_rate: u32,
        block_align: u16,
    ) -> Result<Self> {
        let bytes_per_sample = u64::from(bits_per_sample / 8);
        let channel_count = channels.count() as u64;

        // Byte rate is redundant for PCM; treat any disagreement as fatal.
        if u64::from(byte_rate) != u64::from(sample_rate) * channel_count * bytes_per_sample {
            return Err(WavVizError::InconsistentHeader(
                "byte rate does not match sample rate * channels * bytes per sample",
            ));
        }
        if u64::from(block_align) != channel_count * bytes_per_sample {
            return Err(WavVizError::InconsistentHeader(
                "block align does not match channels * bytes per sample",
            ));
        }

        Ok(Self {
            channels,
            sample_rate,
            bits_per_sample,
            byte_rate,
            block_align,
        })
    }

    pub fn channels(&self) -> ChannelCount {
        self.channels
    }

    /// Sample frames per second.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Bytes of PCM data consumed per second.
    pub fn byte_rate(&self) -> u32 {
        self.byte_rate
    }

    /// Bytes per sample frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.block_align
    }
}

/// A fully decoded WAV file: validated format plus the flat sample buffer,
/// interleaved L,R,L,R,... for stereo.
#[derive(Debug, Clone)]
pub struct WavAudio {
    chunk_size: u32,
    format: AudioFormat,
    samples: Vec<i16>,
}

impl WavAudio {
    /// Decodes a complete in-memory WAV byte stream.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let chunk_size = parse_riff_header(bytes)?;
        let format = parse_format_chunk(&bytes[RIFF_HEADER_LEN..])?;
        let samples = parse_data_chunk(&bytes[RIFF_HEADER_LEN + FORMAT_CHUNK_LEN..])?;

        Ok(Self {
            chunk_size,
            format,
            samples,
        })
    }

    /// Reads and decodes a WAV file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    /// Size declared by the outer RIFF chunk.
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Total number of interleaved samples (not frames).
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Play time of the decoded stream in seconds.
    pub fn duration_seconds(&self) -> f64 {
        let frames = self.samples.len() / self.format.channels().count();
        frames as f64 / f64::from(self.format.sample_rate())
    }

    /// Splits the decode result into the parts the playback engine owns.
    pub fn into_parts(self) -> (AudioFormat, Vec<i16>) {
        (self.format, self.samples)
    }
}

/// Parses the 12-byte RIFF header and returns the declared chunk size.
pub fn parse_riff_header(bytes: &[u8]) -> Result<u32> {
    if bytes.len() < RIFF_HEADER_LEN {
        return Err(WavVizError::TruncatedData(
            "fewer than 12 bytes available for the RIFF header",
        ));
    }

    if endian::read_u32_be(bytes, 0)? != RIFF_MAGIC {
        return Err(WavVizError::MalformedContainer(
            "RIFF chunk does not start with the RIFF identifier",
        ));
    }

    let chunk_size = endian::read_u32_le(bytes, 4)?;

    if endian::read_u32_be(bytes, 8)? != WAVE_MAGIC {
        return Err(WavVizError::MalformedContainer(
            "RIFF chunk format is not WAVE",
        ));
    }

    Ok(chunk_size)
}

/// Parses the 24-byte format chunk into a validated [`AudioFormat`].
///
/// Only PCM is handled: the sub-chunk size must be 16 and the format tag 1.
pub fn parse_format_chunk(bytes: &[u8]) -> Result<AudioFormat> {
    if bytes.len() < FORMAT_CHUNK_LEN {
        return Err(WavVizError::TruncatedData(
            "fewer than 24 bytes available for the format chunk",
        ));
    }

    if endian::read_u32_be(bytes, 0)? != FMT_MAGIC {
        return Err(WavVizError::MalformedContainer(
            "format chunk identifier is not 'fmt '",
        ));
    }

    if endian::read_u32_le(bytes, 4)? != 16 {
        return Err(WavVizError::UnsupportedFormat(
            "format sub-chunk size is not the 16 bytes PCM uses",
        ));
    }

    if endian::read_u16_le(bytes, 8)? != 1 {
        return Err(WavVizError::UnsupportedFormat(
            "audio format tag is not PCM",
        ));
    }

    let channels = match endian::read_u16_le(bytes, 10)? {
        1 => ChannelCount::Mono,
        2 => ChannelCount::Stereo,
        _ => {
            return Err(WavVizError::MalformedContainer(
                "channel count is neither mono nor stereo",
            ))
        }
    };

    let sample_rate = endian::read_u32_le(bytes, 12)?;
    let byte_rate = endian::read_u32_le(bytes, 16)?;
    let block_align = endian::read_u16_le(bytes, 20)?;

    // PCM stores whole bytes per sample, so odd widths round up.
    let declared_bits = endian::read_u16_le(bytes, 22)?;
    let rounded_bits = (u32::from(declared_bits) + 7) / 8 * 8;
    let bits_per_sample = u16::try_from(rounded_bits).map_err(|_| {
        WavVizError::MalformedContainer("bits per sample field is out of range")
    })?;

    AudioFormat::new(channels, sample_rate, bits_per_sample, byte_rate, block_align)
}

/// Parses the data chunk into little-endian signed 16-bit samples.
///
/// A "LIST" metadata chunk may sit between the format and data chunks; it is
/// skipped over using its own declared size before "data" is required.
pub fn parse_data_chunk(bytes: &[u8]) -> Result<Vec<i16>> {
    let mut offset = 0;
    if endian::read_u32_be(bytes, 0)? == LIST_MAGIC {
        let list_size = endian::read_u32_le(bytes, 4)?;
        offset = 8usize
            .checked_add(list_size as usize)
            .ok_or(WavVizError::TruncatedData(
                "LIST chunk declares more bytes than remain in the buffer",
            ))?;
    }

    if endian::read_u32_be(bytes, offset)? != DATA_MAGIC {
        return Err(WavVizError::MalformedContainer(
            "data chunk identifier is not 'data'",
        ));
    }

    let declared = endian::read_u32_le(bytes, offset + 4)? as usize;
    if declared % 2 != 0 {
        return Err(WavVizError::TruncatedData(
            "data chunk declares an odd byte count for 16-bit samples",
        ));
    }

    let payload_start = offset + 8;
    let payload = payload_start
        .checked_add(declared)
        .and_then(|end| bytes.get(payload_start..end))
        .ok_or(WavVizError::TruncatedData(
            "data chunk declares more bytes than remain in the buffer",
        ))?;

    let mut samples = Vec::with_capacity(declared / 2);
    let mut cursor = 0;
    while cursor < declared {
        samples.push(endian::read_i16_le(payload, cursor)?);
        cursor += 2;
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The reference container: RIFF size 2084, stereo PCM at 22050 Hz,
    /// 16-bit, followed by a 28-byte data chunk.
    const REFERENCE: [u8; 72] = [
        0x52, 0x49, 0x46, 0x46, 0x24, 0x08, 0x00, 0x00, 0x57, 0x41, 0x56, 0x45, //
        0x66, 0x6D, 0x74, 0x20, 0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, //
        0x22, 0x56, 0x00, 0x00, 0x88, 0x58, 0x01, 0x00, 0x04, 0x00, 0x10, 0x00, //
        0x64, 0x61, 0x74, 0x61, 0x1C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x24, 0x17, 0x1E, 0xF3, 0x3C, 0x13, 0x3C, 0x14, 0x16, 0xF9, 0x18, 0xF9, //
        0x34, 0xE7, 0x23, 0xA6, 0x3C, 0xF2, 0x24, 0xF2, 0x11, 0xCE, 0x1A, 0x0D,
    ];

    fn build_wav(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let byte_rate = sample_rate * u32::from(channels) * 2;
        let block_align = channels * 2;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&byte_rate.to_le_bytes());
        bytes.extend_from_slice(&block_align.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn decodes_the_reference_container() {
        let wav = WavAudio::decode(&REFERENCE).unwrap();

        assert_eq!(wav.chunk_size(), 2084);
        assert_eq!(wav.format().channels(), ChannelCount::Stereo);
        assert_eq!(wav.format().sample_rate(), 22050);
        assert_eq!(wav.format().bits_per_sample(), 16);

        let expected: [i16; 14] = [
            0x0000,
            0x0000,
            0x1724,
            0xF31Eu16 as i16,
            0x133C,
            0x143C,
            0xF916u16 as i16,
            0xF918u16 as i16,
            0xE734u16 as i16,
            0xA623u16 as i16,
            0xF23Cu16 as i16,
            0xF224u16 as i16,
            0xCE11u16 as i16,
            0x0D1A,
        ];
        assert_eq!(wav.samples(), &expected);
    }

    #[test]
    fn round_trips_synthetic_mono_and_stereo() {
        let mono_samples: Vec<i16> = (-50..50).collect();
        let wav = WavAudio::decode(&build_wav(1, 8_000, &mono_samples)).unwrap();
        assert_eq!(wav.format().channels(), ChannelCount::Mono);
        assert_eq!(wav.samples(), mono_samples.as_slice());
        assert_eq!(wav.format().byte_rate(), 16_000);
        assert_eq!(wav.format().block_align(), 2);

        let stereo_samples: Vec<i16> = vec![1, -1, i16::MAX, i16::MIN, 0, 7];
        let wav = WavAudio::decode(&build_wav(2, 44_100, &stereo_samples)).unwrap();
        assert_eq!(wav.format().channels(), ChannelCount::Stereo);
        assert_eq!(wav.samples(), stereo_samples.as_slice());
        assert_eq!(wav.format().block_align(), 4);
        assert!((wav.duration_seconds() - 3.0 / 44_100.0).abs() < 1e-9);
    }

    #[test]
    fn skips_a_list_chunk_by_its_declared_size() {
        let samples: Vec<i16> = vec![5, -5, 6, -6];
        let mut bytes = build_wav(1, 8_000, &samples);

        let mut list = Vec::new();
        list.extend_from_slice(b"LIST");
        list.extend_from_slice(&10u32.to_le_bytes());
        list.extend_from_slice(b"INFOpadded");
        bytes.splice(36..36, list);

        let wav = WavAudio::decode(&bytes).unwrap();
        assert_eq!(wav.samples(), samples.as_slice());
    }

    #[test]
    fn rejects_bad_riff_magic() {
        let mut bytes = build_wav(1, 8_000, &[0, 1]);
        bytes[0] = b'X';
        assert!(matches!(
            WavAudio::decode(&bytes),
            Err(WavVizError::MalformedContainer(_))
        ));

        bytes = build_wav(1, 8_000, &[0, 1]);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(
            WavAudio::decode(&bytes),
            Err(WavVizError::MalformedContainer(_))
        ));
    }

    #[test]
    fn rejects_short_headers() {
        assert!(matches!(
            parse_riff_header(&REFERENCE[..11]),
            Err(WavVizError::TruncatedData(_))
        ));
        assert!(matches!(
            parse_format_chunk(&REFERENCE[12..30]),
            Err(WavVizError::TruncatedData(_))
        ));
    }

    #[test]
    fn rejects_non_pcm_formats() {
        let mut bytes = build_wav(1, 8_000, &[0, 1]);
        bytes[16..20].copy_from_slice(&18u32.to_le_bytes());
        assert!(matches!(
            WavAudio::decode(&bytes),
            Err(WavVizError::UnsupportedFormat(_))
        ));

        bytes = build_wav(1, 8_000, &[0, 1]);
        bytes[20..22].copy_from_slice(&3u16.to_le_bytes());
        assert!(matches!(
            WavAudio::decode(&bytes),
            Err(WavVizError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn rejects_unsupported_channel_counts() {
        let mut bytes = build_wav(2, 8_000, &[0, 1]);
        bytes[22..24].copy_from_slice(&6u16.to_le_bytes());
        assert!(matches!(
            WavAudio::decode(&bytes),
            Err(WavVizError::MalformedContainer(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_byte_rate() {
        let mut bytes = build_wav(2, 22_050, &[0, 1]);
        bytes[28..32].copy_from_slice(&12_345u32.to_le_bytes());
        assert!(matches!(
            WavAudio::decode(&bytes),
            Err(WavVizError::InconsistentHeader(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_block_align() {
        let mut bytes = build_wav(2, 22_050, &[0, 1]);
        bytes[32..34].copy_from_slice(&2u16.to_le_bytes());
        assert!(matches!(
            WavAudio::decode(&bytes),
            Err(WavVizError::InconsistentHeader(_))
        ));
    }

    #[test]
    fn rejects_odd_or_overlong_data_declarations() {
        let mut bytes = build_wav(1, 8_000, &[0, 1, 2, 3]);
        bytes[40..44].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            WavAudio::decode(&bytes),
            Err(WavVizError::TruncatedData(_))
        ));

        bytes = build_wav(1, 8_000, &[0, 1, 2, 3]);
        bytes[40..44].copy_from_slice(&1_000u32.to_le_bytes());
        assert!(matches!(
            WavAudio::decode(&bytes),
            Err(WavVizError::TruncatedData(_))
        ));
    }

    #[test]
    fn rounds_bit_depths_up_to_whole_bytes() {
        assert_eq!(
            AudioFormat::new(ChannelCount::Mono, 1_000, 16, 2_000, 2)
                .unwrap()
                .bits_per_sample(),
            16
        );
        // Constructing through the parser exercises the rounding itself.
        let mut bytes = build_wav(1, 1_000, &[0, 1]);
        bytes[34..36].copy_from_slice(&12u16.to_le_bytes());
        let wav = WavAudio::decode(&bytes).unwrap();
        assert_eq!(wav.format().bits_per_sample(), 16);
    }
}
