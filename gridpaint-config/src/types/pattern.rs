//! Brush patterns for patterned background fills.
//!
//! Pattern ids follow the conventional brush-style numbering (1 = solid,
//! 2..=8 dense dithers, 9..=14 line hatches), so configs written with
//! numeric ids keep working.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillPattern {
    #[default]
    Solid,
    Dense1,
    Dense2,
    Dense3,
    Dense4,
    Dense5,
    Dense6,
    Dense7,
    Horizontal,
    Vertical,
    Cross,
    BackwardDiagonal,
    ForwardDiagonal,
    DiagonalCross,
}

const ALL: [FillPattern; 14] = [
    FillPattern::Solid,
    FillPattern::Dense1,
    FillPattern::Dense2,
    FillPattern::Dense3,
    FillPattern::Dense4,
    FillPattern::Dense5,
    FillPattern::Dense6,
    FillPattern::Dense7,
    FillPattern::Horizontal,
    FillPattern::Vertical,
    FillPattern::Cross,
    FillPattern::BackwardDiagonal,
    FillPattern::ForwardDiagonal,
    FillPattern::DiagonalCross,
];

// 4x4 ordered-dither thresholds, 0..16.
const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

impl FillPattern {
    /// Look up a pattern by its numeric id. Unknown ids fall back to solid.
    pub fn from_id(id: u8) -> FillPattern {
        match id {
            1..=14 => ALL[(id - 1) as usize],
            _ => {
                log::warn!("Unknown fill pattern id {id}, using solid");
                FillPattern::Solid
            }
        }
    }

    pub fn id(self) -> u8 {
        ALL.iter().position(|p| *p == self).map_or(1, |i| i as u8 + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            FillPattern::Solid => "solid",
            FillPattern::Dense1 => "dense1",
            FillPattern::Dense2 => "dense2",
            FillPattern::Dense3 => "dense3",
            FillPattern::Dense4 => "dense4",
            FillPattern::Dense5 => "dense5",
            FillPattern::Dense6 => "dense6",
            FillPattern::Dense7 => "dense7",
            FillPattern::Horizontal => "horizontal",
            FillPattern::Vertical => "vertical",
            FillPattern::Cross => "cross",
            FillPattern::BackwardDiagonal => "backward_diagonal",
            FillPattern::ForwardDiagonal => "forward_diagonal",
            FillPattern::DiagonalCross => "diagonal_cross",
        }
    }

    fn from_name(name: &str) -> Option<FillPattern> {
        ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Sparse patterns (ids 7..=14) are drawn with the editor-wide
    /// transparency instead of the surface opacity.
    pub fn uses_editor_transparency(self) -> bool {
        (7..=14).contains(&self.id())
    }

    /// Whether the device pixel at `(x, y)` is painted by this pattern.
    pub fn covers(self, x: u32, y: u32) -> bool {
        let dither = |coverage_16ths: u8| BAYER_4X4[(y % 4) as usize][(x % 4) as usize] < coverage_16ths;
        match self {
            FillPattern::Solid => true,
            FillPattern::Dense1 => dither(15),
            FillPattern::Dense2 => dither(14),
            FillPattern::Dense3 => dither(10),
            FillPattern::Dense4 => dither(8),
            FillPattern::Dense5 => dither(6),
            FillPattern::Dense6 => dither(2),
            FillPattern::Dense7 => dither(1),
            FillPattern::Horizontal => y % 4 == 0,
            FillPattern::Vertical => x % 4 == 0,
            FillPattern::Cross => x % 4 == 0 || y % 4 == 0,
            FillPattern::BackwardDiagonal => (x + y) % 4 == 0,
            FillPattern::ForwardDiagonal => (x + 4 - y % 4) % 4 == 0,
            FillPattern::DiagonalCross => (x + y) % 4 == 0 || (x + 4 - y % 4) % 4 == 0,
        }
    }
}

impl Serialize for FillPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for FillPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Id(u8),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Id(id) => Ok(FillPattern::from_id(id)),
            Repr::Name(name) => FillPattern::from_name(&name.to_ascii_lowercase()).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown fill pattern '{name}'"))
            }),
        }
    }
}
