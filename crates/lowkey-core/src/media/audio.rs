//! PCM WAV carrier.
//!
//! One sample is one embedding unit. Bits are patched into the low end of
//! the sample's two's-complement representation at its native width, so a
//! touched sample always stays inside the legal range for that width and
//! `hound` never rejects it on write.

use std::io::{Seek, Write};
use std::path::Path;

use hound::{Sample, SampleFormat, WavReader, WavSpec, WavWriter};
use log::error;

use crate::error::LowkeyError;
use crate::media::{lsb_mask, CarrierUnits, Persist};
use crate::result::Result;

/// Decoded samples at their native width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleBuf {
    Bits8(Vec<i8>),
    Bits16(Vec<i16>),
    /// 24-bit samples sign-extended into `i32`, range `-2^23..2^23`.
    Bits24(Vec<i32>),
}

/// A WAV file held in memory, spec preserved for the write-back.
#[derive(Debug, Clone)]
pub struct AudioCarrier {
    spec: WavSpec,
    samples: SampleBuf,
}

impl AudioCarrier {
    /// Reads an integer PCM WAV file of 8, 16 or 24 bits per sample.
    pub fn from_file(f: &Path) -> Result<Self> {
        let mut reader = WavReader::open(f).map_err(|e| {
            error!("Cannot open WAV file {}: {e}", f.display());
            LowkeyError::InvalidAudioCarrier
        })?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int {
            return Err(LowkeyError::UnsupportedPcmWidth(spec.bits_per_sample));
        }

        let samples = match spec.bits_per_sample {
            8 => SampleBuf::Bits8(collect_samples(reader.samples::<i8>())?),
            16 => SampleBuf::Bits16(collect_samples(reader.samples::<i16>())?),
            24 => SampleBuf::Bits24(collect_samples(reader.samples::<i32>())?),
            width => return Err(LowkeyError::UnsupportedPcmWidth(width)),
        };

        Ok(AudioCarrier { spec, samples })
    }

    /// Builds a carrier from already decoded samples.
    pub fn from_parts(spec: WavSpec, samples: SampleBuf) -> Self {
        AudioCarrier { spec, samples }
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    pub fn samples(&self) -> &SampleBuf {
        &self.samples
    }
}

fn collect_samples<S>(samples: impl Iterator<Item = hound::Result<S>>) -> Result<Vec<S>> {
    samples
        .collect::<hound::Result<Vec<S>>>()
        .map_err(|e| {
            error!("Cannot decode WAV samples: {e}");
            LowkeyError::InvalidAudioCarrier
        })
}

impl CarrierUnits for AudioCarrier {
    fn unit_count(&self) -> usize {
        match &self.samples {
            SampleBuf::Bits8(v) => v.len(),
            SampleBuf::Bits16(v) => v.len(),
            SampleBuf::Bits24(v) => v.len(),
        }
    }

    fn read_lsbs(&self, idx: usize, depth: u8) -> u8 {
        let mask = lsb_mask(depth);
        match &self.samples {
            SampleBuf::Bits8(v) => (v[idx] as u8) & mask,
            SampleBuf::Bits16(v) => (v[idx] as u8) & mask,
            SampleBuf::Bits24(v) => (v[idx] as u8) & mask,
        }
    }

    fn write_lsbs(&mut self, idx: usize, depth: u8, value: u8) {
        let mask = lsb_mask(depth);
        let bits = value & mask;
        match &mut self.samples {
            SampleBuf::Bits8(v) => {
                let raw = v[idx] as u8;
                v[idx] = ((raw & !mask) | bits) as i8;
            }
            SampleBuf::Bits16(v) => {
                let raw = v[idx] as u16;
                v[idx] = ((raw & !u16::from(mask)) | u16::from(bits)) as i16;
            }
            SampleBuf::Bits24(v) => {
                let raw = (v[idx] as u32) & 0x00FF_FFFF;
                let patched = (raw & !u32::from(mask)) | u32::from(bits);
                v[idx] = if patched & 0x0080_0000 != 0 {
                    (patched | 0xFF00_0000) as i32
                } else {
                    patched as i32
                };
            }
        }
    }
}

impl Persist for AudioCarrier {
    fn save_as(&self, file: &Path) -> Result<()> {
        let mut writer = WavWriter::create(file, self.spec).map_err(|e| {
            error!("Cannot create WAV file {}: {e}", file.display());
            LowkeyError::AudioCreationError
        })?;

        match &self.samples {
            SampleBuf::Bits8(v) => write_samples(&mut writer, v)?,
            SampleBuf::Bits16(v) => write_samples(&mut writer, v)?,
            SampleBuf::Bits24(v) => write_samples(&mut writer, v)?,
        }

        writer.finalize().map_err(|e| {
            error!("Cannot finalize WAV file {}: {e}", file.display());
            LowkeyError::AudioEncodingError
        })
    }
}

fn write_samples<S, W>(writer: &mut WavWriter<W>, samples: &[S]) -> Result<()>
where
    S: Sample + Copy,
    W: Write + Seek,
{
    for sample in samples {
        writer
            .write_sample(*sample)
            .map_err(|_e| LowkeyError::AudioEncodingError)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(bits: u16) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: bits,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn should_patch_16_bit_samples_at_both_range_ends() {
        let mut carrier =
            AudioCarrier::from_parts(spec(16), SampleBuf::Bits16(vec![i16::MAX, -1, 0, i16::MIN]));

        carrier.write_lsbs(0, 3, 0b000);
        carrier.write_lsbs(1, 1, 0);
        carrier.write_lsbs(3, 2, 0b11);

        match carrier.samples() {
            SampleBuf::Bits16(v) => {
                assert_eq!(v[0], 0x7FF8);
                assert_eq!(v[1], -2);
                assert_eq!(v[2], 0);
                assert_eq!(v[3], i16::MIN + 3);
            }
            other => panic!("expected 16 bit samples, got {other:?}"),
        }
    }

    #[test]
    fn should_keep_24_bit_samples_inside_the_legal_range() {
        let top = (1 << 23) - 1;
        let bottom = -(1 << 23);
        let mut carrier =
            AudioCarrier::from_parts(spec(24), SampleBuf::Bits24(vec![top, bottom, -1]));

        carrier.write_lsbs(0, 2, 0b00);
        carrier.write_lsbs(1, 1, 1);
        carrier.write_lsbs(2, 4, 0b0000);

        match carrier.samples() {
            SampleBuf::Bits24(v) => {
                assert_eq!(v[0], top - 3);
                assert_eq!(v[1], bottom + 1);
                assert_eq!(v[2], -16);
                assert!(v.iter().all(|&s| (bottom..=top).contains(&s)));
            }
            other => panic!("expected 24 bit samples, got {other:?}"),
        }
    }

    #[test]
    fn should_round_trip_bits_through_8_bit_samples() {
        let mut carrier =
            AudioCarrier::from_parts(spec(8), SampleBuf::Bits8(vec![0, -128, 127, -1]));

        for idx in 0..4 {
            carrier.write_lsbs(idx, 2, idx as u8 & 0b11);
        }
        for idx in 0..4 {
            assert_eq!(carrier.read_lsbs(idx, 2), idx as u8 & 0b11);
        }
    }

    #[test]
    fn should_replace_the_whole_sample_at_depth_8() {
        let mut carrier = AudioCarrier::from_parts(spec(16), SampleBuf::Bits16(vec![0x55AA]));

        carrier.write_lsbs(0, 8, 0xF0);

        match carrier.samples() {
            SampleBuf::Bits16(v) => assert_eq!(v[0], 0x55F0),
            other => panic!("expected 16 bit samples, got {other:?}"),
        }
        assert_eq!(carrier.read_lsbs(0, 8), 0xF0);
    }

    #[test]
    fn should_reject_float_wav_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let float_spec = WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, float_spec).unwrap();
        for i in 0..32 {
            writer.write_sample(i as f32 / 32.0).unwrap();
        }
        writer.finalize().unwrap();

        match AudioCarrier::from_file(&path) {
            Err(LowkeyError::UnsupportedPcmWidth(32)) => {}
            other => panic!("expected UnsupportedPcmWidth, got {other:?}"),
        }
    }
}
