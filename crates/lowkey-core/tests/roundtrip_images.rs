use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use lowkey_core::commands::{hide, unveil};
use lowkey_core::{LowkeyError, Region};

fn write_carrier(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(w, h, |x, y| {
        Rgb([(x * 3 + y) as u8, (x ^ (y * 5)) as u8, (x + 2 * y) as u8])
    })
    .save(&path)
    .unwrap();
    path
}

fn write_secret(dir: &Path, name: &str, payload: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, payload).unwrap();
    path
}

#[test]
fn should_round_trip_a_payload_through_a_png() {
    let dir = TempDir::new().unwrap();
    let carrier = write_carrier(dir.path(), "carrier.png", 64, 64);
    let payload: Vec<u8> = (0..100).map(|i| (i * 37) as u8).collect();
    let secret = write_secret(dir.path(), "x.bin", &payload);

    let carrier_before = fs::read(&carrier).unwrap();
    let stego = hide(&carrier, &secret, "hunter2", 2, None).unwrap();

    assert_eq!(stego, dir.path().join("stego_carrier.png"));
    assert_eq!(fs::read(&carrier).unwrap(), carrier_before);

    let unveiled = unveil(&stego, "hunter2", 2).unwrap();

    assert_eq!(unveiled.path, dir.path().join("extracted_x.bin"));
    assert!(!unveiled.is_text);
    assert_eq!(fs::read(&unveiled.path).unwrap(), payload);
}

#[test]
fn should_round_trip_at_every_depth() {
    let dir = TempDir::new().unwrap();
    let carrier = write_carrier(dir.path(), "carrier.png", 48, 48);
    let payload = b"per-depth fidelity check".to_vec();

    for depth in 1..=8 {
        let secret = write_secret(dir.path(), &format!("depth{depth}.bin"), &payload);
        let stego = hide(&carrier, &secret, "hunter2", depth, None).unwrap();
        let unveiled = unveil(&stego, "hunter2", depth).unwrap();

        assert_eq!(
            fs::read(&unveiled.path).unwrap(),
            payload,
            "depth {depth} mangled the payload"
        );
    }
}

#[test]
fn should_confine_changes_to_the_region_and_the_header() {
    let dir = TempDir::new().unwrap();
    let carrier = write_carrier(dir.path(), "carrier.png", 64, 64);
    let secret = write_secret(dir.path(), "x.bin", &[0xA7; 200]);
    let region = Region::new(32, 32, 64, 64);

    let stego = hide(&carrier, &secret, "hunter2", 2, Some(region)).unwrap();

    let before = image::open(&carrier).unwrap().to_rgb8();
    let after = image::open(&stego).unwrap().to_rgb8();
    for (idx, (orig, new)) in before.as_raw().iter().zip(after.as_raw()).enumerate() {
        if orig == new {
            continue;
        }
        let pixel = idx / 3;
        let (x, y) = (pixel % 64, pixel / 64);
        assert!(
            idx < 168 || (x >= 32 && y >= 32),
            "unit {idx} at ({x}, {y}) changed outside header and region"
        );
    }

    let unveiled = unveil(&stego, "hunter2", 2).unwrap();
    assert_eq!(fs::read(&unveiled.path).unwrap(), vec![0xA7; 200]);
}

#[test]
fn should_round_trip_through_a_bmp_carrier() {
    let dir = TempDir::new().unwrap();
    let carrier = write_carrier(dir.path(), "carrier.bmp", 64, 64);
    let secret = write_secret(dir.path(), "notes.txt", b"bmp stays bmp");

    let stego = hide(&carrier, &secret, "hunter2", 1, None).unwrap();
    assert_eq!(stego, dir.path().join("stego_carrier.bmp"));

    let unveiled = unveil(&stego, "hunter2", 1).unwrap();
    assert!(unveiled.is_text);
    assert_eq!(fs::read(&unveiled.path).unwrap(), b"bmp stays bmp");
}

#[test]
fn should_write_jpeg_inputs_to_a_lossless_stego_png() {
    let dir = TempDir::new().unwrap();
    let carrier = write_carrier(dir.path(), "photo.jpg", 64, 64);
    let secret = write_secret(dir.path(), "x.bin", &[42; 64]);

    let stego = hide(&carrier, &secret, "hunter2", 2, None).unwrap();

    assert_eq!(stego, dir.path().join("stego_photo.png"));
    let unveiled = unveil(&stego, "hunter2", 2).unwrap();
    assert_eq!(fs::read(&unveiled.path).unwrap(), vec![42; 64]);
}

#[test]
fn should_reject_the_wrong_key_and_the_wrong_depth() {
    let dir = TempDir::new().unwrap();
    let carrier = write_carrier(dir.path(), "carrier.png", 64, 64);
    let secret = write_secret(dir.path(), "meeting-notes-2024-archive.tar.gz", &[0xC3; 64]);

    let stego = hide(&carrier, &secret, "hunter2", 2, None).unwrap();

    match unveil(&stego, "hunter3", 2) {
        Err(LowkeyError::WrongKey) => {}
        other => panic!("expected WrongKey, got {other:?}"),
    }
    assert!(unveil(&stego, "hunter2", 5).is_err());
}

#[test]
fn should_fill_the_carrier_to_the_last_byte_and_not_one_more() {
    let dir = TempDir::new().unwrap();
    let carrier = write_carrier(dir.path(), "carrier.png", 64, 64);

    // 64*64*3 - 168 candidate units at depth 1 hold 1515 bytes; the 5-byte
    // filename leaves exactly 1510 for the payload.
    let full = write_secret(dir.path(), "x.bin", &vec![7u8; 1510]);
    let stego = hide(&carrier, &full, "hunter2", 1, None).unwrap();
    let unveiled = unveil(&stego, "hunter2", 1).unwrap();
    assert_eq!(fs::read(&unveiled.path).unwrap(), vec![7u8; 1510]);

    let too_big = write_secret(dir.path(), "y.bin", &vec![7u8; 1511]);
    match hide(&carrier, &too_big, "hunter2", 1, None) {
        Err(LowkeyError::PayloadTooLarge {
            needed_bits,
            capacity_bits,
        }) => {
            assert_eq!(needed_bits, (1511 + 5) * 8);
            assert_eq!(capacity_bits, (64 * 64 * 3 - 168) as u64);
        }
        other => panic!("expected PayloadTooLarge, got {other:?}"),
    }
}
