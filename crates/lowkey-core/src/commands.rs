//! Path-level operations behind the CLI: load a carrier, run the codec,
//! persist the result next to the input.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::capacity;
use crate::codec::{self, LsbCodec, Secret};
use crate::error::LowkeyError;
use crate::frame::Region;
use crate::media::{video, Carrier, MediaKind, Persist};
use crate::result::Result;

/// Where an unveiled payload landed, and whether it looks like text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unveiled {
    pub path: PathBuf,
    pub is_text: bool,
}

/// Hides the file at `data_file` inside the carrier at `carrier_path` and
/// writes the stego output next to the carrier. Returns the output path.
pub fn hide(
    carrier_path: &Path,
    data_file: &Path,
    key: &str,
    depth: u8,
    region: Option<Region>,
) -> Result<PathBuf> {
    let secret = Secret::from_file(data_file)?;
    hide_data(carrier_path, &secret, key, depth, region)
}

/// Same as [`hide`], for a secret already in memory.
pub fn hide_data(
    carrier_path: &Path,
    secret: &Secret,
    key: &str,
    depth: u8,
    region: Option<Region>,
) -> Result<PathBuf> {
    let kind = MediaKind::from_path(carrier_path)?;
    let target = stego_path(carrier_path, kind);

    match kind {
        MediaKind::Image | MediaKind::Audio => {
            let mut carrier = Carrier::from_file(carrier_path)?;
            LsbCodec::embed(&mut carrier, secret, key, depth, region)?;
            carrier.save_as(&target)?;
        }
        MediaKind::Video => {
            if region.is_some() {
                return Err(LowkeyError::InvalidRegion);
            }
            let scratch = FrameScratch::for_media(carrier_path);
            video::extract_first_frame(carrier_path, &scratch.path)?;
            let mut carrier = Carrier::from_file(&scratch.path)?;
            LsbCodec::embed(&mut carrier, secret, key, depth, None)?;
            carrier.save_as(&scratch.path)?;
            video::splice_first_frame(carrier_path, &scratch.path, &target)?;
        }
    }

    info!(
        "hid {} bytes in {}",
        secret.payload.len(),
        target.display()
    );
    Ok(target)
}

/// Recovers the secret hidden in `stego_file` and writes it next to the
/// stego file as `extracted_<original name>`.
pub fn unveil(stego_file: &Path, key: &str, depth: u8) -> Result<Unveiled> {
    let kind = MediaKind::from_path(stego_file)?;

    let secret = match kind {
        MediaKind::Image | MediaKind::Audio => {
            let carrier = Carrier::from_file(stego_file)?;
            LsbCodec::extract(&carrier, key, depth)?
        }
        MediaKind::Video => {
            let scratch = FrameScratch::for_media(stego_file);
            video::extract_first_frame(stego_file, &scratch.path)?;
            let carrier = Carrier::from_file(&scratch.path)?;
            LsbCodec::extract(&carrier, key, depth)?
        }
    };

    // Decoded names never get to smuggle in path components.
    let file_name = Path::new(&secret.filename)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(LowkeyError::InvalidFileName)?;
    let target = stego_file.with_file_name(format!("extracted_{file_name}"));
    fs::write(&target, &secret.payload).map_err(|source| LowkeyError::WriteError { source })?;

    info!(
        "extracted {} bytes into {}",
        secret.payload.len(),
        target.display()
    );
    Ok(Unveiled {
        path: target,
        is_text: secret.is_text(),
    })
}

/// Body capacity of the carrier at `carrier_path` in whole bytes.
pub fn estimate_capacity(carrier_path: &Path, depth: u8, region: Option<Region>) -> Result<u64> {
    codec::validate_depth(depth)?;
    let candidates = candidate_count(carrier_path, region)?;
    Ok(capacity::capacity_bytes(candidates, depth))
}

/// Smallest depth at which a payload of `payload_bytes` plus its filename
/// would fit into the carrier at `carrier_path`.
pub fn recommend_depth(
    carrier_path: &Path,
    payload_bytes: u64,
    filename_len: usize,
    region: Option<Region>,
) -> Result<u8> {
    let candidates = candidate_count(carrier_path, region)?;
    Ok(capacity::recommended_depth(candidates, payload_bytes, filename_len))
}

fn candidate_count(carrier_path: &Path, region: Option<Region>) -> Result<usize> {
    let kind = MediaKind::from_path(carrier_path)?;
    let region = region.filter(|r| !r.is_whole());

    let carrier = match kind {
        MediaKind::Image | MediaKind::Audio => Carrier::from_file(carrier_path)?,
        MediaKind::Video => {
            if region.is_some() {
                return Err(LowkeyError::InvalidRegion);
            }
            let scratch = FrameScratch::for_media(carrier_path);
            video::extract_first_frame(carrier_path, &scratch.path)?;
            Carrier::from_file(&scratch.path)?
        }
    };

    Ok(codec::candidate_units(&carrier, region)?.len())
}

/// Stego output path derived from the carrier: `stego_<name>` next to the
/// input, nudged to a lossless container where the input format would chew
/// up the embedded bits.
fn stego_path(carrier: &Path, kind: MediaKind) -> PathBuf {
    let stem = carrier
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("carrier");

    match kind {
        MediaKind::Video => carrier.with_file_name(format!("stego_{stem}.mkv")),
        MediaKind::Image if has_jpeg_extension(carrier) => {
            carrier.with_file_name(format!("stego_{stem}.png"))
        }
        _ => {
            let name = carrier
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("carrier");
            carrier.with_file_name(format!("stego_{name}"))
        }
    }
}

fn has_jpeg_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            e == "jpg" || e == "jpeg"
        })
        .unwrap_or(false)
}

/// A temporary frame image that cleans up after itself.
struct FrameScratch {
    path: PathBuf,
}

impl FrameScratch {
    fn for_media(media: &Path) -> Self {
        let stem = media
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("frame");
        let path = std::env::temp_dir().join(format!(
            "lowkey-frame-{}-{stem}.png",
            std::process::id()
        ));
        FrameScratch { path }
    }
}

impl Drop for FrameScratch {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
