//! Experimental average-hash perceptual fingerprint.
//!
//! Not called from the live scan pipeline. Kept from an earlier attempt
//! at near-duplicate detection (burst-mode shots, re-encodes) that never
//! graduated past a prototype: it only handles still images, ignores
//! rotation, and has no calibrated similarity threshold. The Planner
//! uses exact content fingerprints (`chunk::fingerprint_file`) exclusively.

#![allow(dead_code)]

use image::GenericImageView;
use std::path::Path;

const HASH_SIZE: u32 = 8;

/// A 64-bit average hash. Hamming distance between two hashes is a rough
/// proxy for visual similarity; no threshold for "same photo" has been
/// chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AverageHash(u64);

impl AverageHash {
    pub fn hamming_distance(&self, other: &AverageHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

/// Downscale to 8x8 grayscale and threshold each pixel against the mean.
/// Unused: decoding every image a second time just for this was never
/// worth it next to the chunk hasher's cost.
fn average_hash(path: &Path) -> Result<AverageHash, image::ImageError> {
    let img = image::open(path)?;
    let small = img.resize_exact(HASH_SIZE, HASH_SIZE, image::imageops::FilterType::Triangle);
    let gray = small.to_luma8();

    let total: u32 = gray.pixels().map(|p| p.0[0] as u32).sum();
    let mean = total / (HASH_SIZE * HASH_SIZE);

    let mut bits: u64 = 0;
    for (i, pixel) in gray.pixels().enumerate() {
        if pixel.0[0] as u32 >= mean {
            bits |= 1 << i;
        }
    }

    Ok(AverageHash(bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_hash_has_zero_distance() {
        let a = AverageHash(0b1010);
        let b = AverageHash(0b1010);
        assert_eq!(a.hamming_distance(&b), 0);
    }

    #[test]
    fn differing_bits_are_counted() {
        let a = AverageHash(0b0000);
        let b = AverageHash(0b1011);
        assert_eq!(a.hamming_distance(&b), 3);
    }
}
