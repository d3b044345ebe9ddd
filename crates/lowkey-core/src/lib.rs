//! # Lowkey Core API
//!
//! Keyed least-significant-bit steganography over images, PCM audio and the
//! first frame of a video. A secret travels as a filename plus payload
//! behind a short self-describing header; the body bits are scattered across
//! the carrier in an order derived from the key, so without the key a reader
//! cannot even line them up.
//!
//! # Usage Examples
//!
//! ## Hide a file inside an image
//!
//! ```rust
//! use image::RgbImage;
//! use tempfile::tempdir;
//!
//! let temp_dir = tempdir().expect("Failed to create temporary directory");
//!
//! let carrier = temp_dir.path().join("carrier.png");
//! RgbImage::from_fn(64, 64, |x, y| image::Rgb([x as u8, y as u8, 7]))
//!     .save(&carrier)
//!     .expect("Failed to write carrier image");
//!
//! let note = temp_dir.path().join("note.txt");
//! std::fs::write(&note, "meet at dawn").expect("Failed to write secret");
//!
//! let stego = lowkey_core::commands::hide(&carrier, &note, "hunter2", 2, None)
//!     .expect("Failed to hide file in image");
//! assert!(stego.ends_with("stego_carrier.png"));
//! ```
//!
//! ## Unveil it again
//!
//! ```rust
//! # use image::RgbImage;
//! # use tempfile::tempdir;
//! # let temp_dir = tempdir().expect("Failed to create temporary directory");
//! # let carrier = temp_dir.path().join("carrier.png");
//! # RgbImage::from_fn(64, 64, |x, y| image::Rgb([x as u8, y as u8, 7]))
//! #     .save(&carrier)
//! #     .expect("Failed to write carrier image");
//! # let note = temp_dir.path().join("note.txt");
//! # std::fs::write(&note, "meet at dawn").expect("Failed to write secret");
//! # let stego = lowkey_core::commands::hide(&carrier, &note, "hunter2", 2, None)
//! #     .expect("Failed to hide file in image");
//! let unveiled = lowkey_core::commands::unveil(&stego, "hunter2", 2)
//!     .expect("Failed to unveil secret from image");
//!
//! assert_eq!(
//!     std::fs::read(&unveiled.path).expect("Failed to read payload"),
//!     b"meet at dawn"
//! );
//! assert!(unveiled.is_text);
//! ```

#![warn(clippy::redundant_else)]

pub mod capacity;
pub mod codec;
pub mod commands;
pub mod error;
pub mod frame;
pub mod keys;
pub mod media;
pub mod permutation;
pub mod result;

pub use crate::codec::{LsbCodec, Secret};
pub use crate::commands::Unveiled;
pub use crate::error::LowkeyError;
pub use crate::frame::Region;
pub use crate::keys::{derive_key, KeyMaterial};
pub use crate::media::{Carrier, CarrierUnits, MediaKind, Persist};
pub use crate::result::Result;
