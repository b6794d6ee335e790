//! Code tables for the printed-tag detector.
//!
//! The AprilTag families reuse the tables shipped with `aprilgrid`; the ArUco
//! 4x4 table is the first 50 codes of the standard 4x4 dictionary.

use aprilgrid::tag_families;

/// ArUco 4x4, 50 markers. Bit `y * 4 + x` holds payload cell `(x, y)`, the
/// least significant bit is the top-left cell and a set bit is white.
pub const ARUCO_4X4_50: [u64; 50] = [
    0x4cad, 0x59f0, 0xb4cc, 0x6299, 0x792a, 0xb39e, 0x7479, 0x4f23, 0x5b7f, 0x6af3, 0x899f, 0xe588,
    0xed70, 0xf054, 0x8d24, 0x7c64, 0xa662, 0x0066, 0x7a36, 0xf56e, 0xd161, 0xd40d, 0xab33, 0x41bb,
    0xe27f, 0x8e29, 0x2735, 0x2aa5, 0xc484, 0xf62c, 0xa822, 0x4dea, 0xf379, 0xd30f, 0x7510, 0x9490,
    0xae18, 0xff20, 0x6fb0, 0x5a38, 0x18e8, 0x1454, 0x314c, 0x4d1c, 0x1724, 0xd774, 0xfcb4, 0x26d2,
    0x740a, 0xc80a,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MarkerDictionary {
    /// ArUco 4x4 with a one cell border
    #[default]
    #[value(name = "aruco4x4_50")]
    Aruco4x4_50,
    #[value(name = "t16h5")]
    T16H5,
    #[value(name = "t25h7")]
    T25H7,
    #[value(name = "t25h9")]
    T25H9,
    #[value(name = "t36h11")]
    T36H11,
    /// t36h11 with a one cell border
    #[value(name = "t36h11b1")]
    T36H11B1,
}

impl MarkerDictionary {
    /// Payload cells along one side.
    pub fn edge_bits(&self) -> u8 {
        match self {
            MarkerDictionary::Aruco4x4_50 | MarkerDictionary::T16H5 => 4,
            MarkerDictionary::T25H7 | MarkerDictionary::T25H9 => 5,
            MarkerDictionary::T36H11 | MarkerDictionary::T36H11B1 => 6,
        }
    }

    /// Width of the black frame around the payload, in cells.
    pub fn border_bits(&self) -> u8 {
        match self {
            MarkerDictionary::Aruco4x4_50 | MarkerDictionary::T36H11B1 => 1,
            _ => 2,
        }
    }

    /// Cells along one side of the marker, border included.
    pub fn side_cells(&self) -> u32 {
        self.edge_bits() as u32 + 2 * self.border_bits() as u32
    }

    /// Codes are accepted when fewer than this many bits differ.
    pub fn hamming_threshold(&self) -> u8 {
        match self {
            MarkerDictionary::Aruco4x4_50 | MarkerDictionary::T16H5 => 1,
            MarkerDictionary::T25H7 | MarkerDictionary::T25H9 => 2,
            MarkerDictionary::T36H11 | MarkerDictionary::T36H11B1 => 3,
        }
    }

    pub fn codes(&self) -> &'static [u64] {
        match self {
            MarkerDictionary::Aruco4x4_50 => &ARUCO_4X4_50,
            MarkerDictionary::T16H5 => &tag_families::T16H5,
            MarkerDictionary::T25H7 => &tag_families::T25H7,
            MarkerDictionary::T25H9 => &tag_families::T25H9,
            MarkerDictionary::T36H11 | MarkerDictionary::T36H11B1 => &tag_families::T36H11,
        }
    }

    /// AprilTag codes store the top-left cell in the most significant bit,
    /// ArUco codes in the least significant one.
    pub fn msb_first(&self) -> bool {
        !matches!(self, MarkerDictionary::Aruco4x4_50)
    }

    /// Bit of the code that holds payload cell `(x, y)`.
    pub fn cell_bit(&self, x: u32, y: u32) -> u32 {
        let edge = self.edge_bits() as u32;
        let k = y * edge + x;
        if self.msb_first() {
            edge * edge - 1 - k
        } else {
            k
        }
    }

    /// Whether payload cell `(x, y)` of marker `id` is white.
    pub fn cell_is_white(&self, id: usize, x: u32, y: u32) -> Option<bool> {
        let code = self.codes().get(id)?;
        Some((code >> self.cell_bit(x, y)) & 1 == 1)
    }
}
