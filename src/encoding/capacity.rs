//! Codeword capacity of QR versions 1–40.
//!
//! Pure lookups, no encoding. Used to fill in the byte counts of a
//! [`Symbol`](super::Symbol) after the encoder picked a version.

use crate::types::ErrorCorrectionLevel;

pub const MIN_VERSION: u8 = 1;
pub const MAX_VERSION: u8 = 40;

/// EC codewords per block, indexed `[level][version]`. Index 0 is unused.
const EC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

/// Reed–Solomon block count, indexed `[level][version]`.
const EC_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];

/// Codeword layout of one version at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub total_codewords: u32,
    pub data_codewords: u32,
    pub ec_codewords: u32,
    pub ec_blocks: u32,
}

/// Side length in modules of a version.
pub fn module_count(version: u8) -> u32 {
    17 + 4 * u32::from(version)
}

/// Modules left for data + EC after function patterns, format and version info.
fn raw_data_modules(version: u8) -> u32 {
    let v = u32::from(version);
    let mut modules = (16 * v + 128) * v + 64;
    if v >= 2 {
        let alignment = v / 7 + 2;
        modules -= (25 * alignment - 10) * alignment - 55;
        if v >= 7 {
            modules -= 36;
        }
    }
    modules
}

/// Look up the codeword layout. `None` for versions outside 1–40.
pub fn capacity(version: u8, level: ErrorCorrectionLevel) -> Option<Capacity> {
    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return None;
    }
    let row = level.ordinal();
    let total = raw_data_modules(version) / 8;
    let blocks = u32::from(EC_BLOCKS[row][version as usize]);
    let ec = u32::from(EC_CODEWORDS_PER_BLOCK[row][version as usize]) * blocks;
    Some(Capacity {
        total_codewords: total,
        data_codewords: total - ec,
        ec_codewords: ec,
        ec_blocks: blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ErrorCorrectionLevel::*;

    #[test]
    fn module_count_spans_21_to_177() {
        assert_eq!(module_count(1), 21);
        assert_eq!(module_count(40), 177);
    }

    #[test]
    fn version_1_layout() {
        let c = capacity(1, L).unwrap();
        assert_eq!(c.total_codewords, 26);
        assert_eq!(c.data_codewords, 19);
        assert_eq!(c.ec_codewords, 7);
        assert_eq!(c.ec_blocks, 1);

        assert_eq!(capacity(1, M).unwrap().data_codewords, 16);
        assert_eq!(capacity(1, Q).unwrap().data_codewords, 13);
        assert_eq!(capacity(1, H).unwrap().data_codewords, 9);
    }

    #[test]
    fn version_2_total_accounts_for_alignment_pattern() {
        assert_eq!(capacity(2, L).unwrap().total_codewords, 44);
    }

    #[test]
    fn version_7_total_accounts_for_version_info() {
        assert_eq!(capacity(7, L).unwrap().total_codewords, 196);
    }

    #[test]
    fn version_40_layout() {
        let low = capacity(40, L).unwrap();
        assert_eq!(low.total_codewords, 3706);
        assert_eq!(low.data_codewords, 2956);
        assert_eq!(low.ec_blocks, 25);

        assert_eq!(capacity(40, H).unwrap().data_codewords, 1276);
    }

    #[test]
    fn out_of_range_versions() {
        assert_eq!(capacity(0, L), None);
        assert_eq!(capacity(41, M), None);
    }
}
