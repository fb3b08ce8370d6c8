use serde::{Deserialize, Serialize};
use worldmap_common::Point;

/// Mineral deposit classification.
///
/// The discriminants are the on-disk tag bytes. Both directions of the
/// mapping go through [`OreKind::tag`] and [`OreKind::from_tag`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum OreKind {
    Coal = 0,
    Iron = 1,
    Copper = 2,
    Gold = 3,
    Diamond = 4,
}

impl OreKind {
    pub const ALL: [OreKind; 5] = [
        OreKind::Coal,
        OreKind::Iron,
        OreKind::Copper,
        OreKind::Gold,
        OreKind::Diamond,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns `None` for bytes outside the table.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(OreKind::Coal),
            1 => Some(OreKind::Iron),
            2 => Some(OreKind::Copper),
            3 => Some(OreKind::Gold),
            4 => Some(OreKind::Diamond),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OreKind::Coal => "coal",
            OreKind::Iron => "iron",
            OreKind::Copper => "copper",
            OreKind::Gold => "gold",
            OreKind::Diamond => "diamond",
        }
    }
}

/// A generated world object with a type id owned by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub structure_type: i32,
    pub position: Point,
    /// Footprint in insertion order.
    pub points: Vec<Point>,
}

impl Structure {
    pub fn new(structure_type: i32, position: Point, points: Vec<Point>) -> Self {
        Self {
            structure_type,
            position,
            points,
        }
    }
}

/// A player-placed object. Buildings are not chunk-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub position: Point,
    /// Footprint in insertion order.
    pub points: Vec<Point>,
}

impl Building {
    pub fn new(position: Point, points: Vec<Point>) -> Self {
        Self { position, points }
    }
}
