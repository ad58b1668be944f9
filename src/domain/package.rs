// Package catalog: what each size tier buys on the listings grid

use crate::classifier::Tier;
use serde::Serialize;

/// Grid footprint, image allowance and price of a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub tier: Tier,
    pub label: &'static str,
    pub columns: u8,
    pub rows: u8,
    pub max_images: u8,
    /// Price in soles
    pub price: u32,
}

impl PackageInfo {
    /// Human-readable footprint, e.g. "2x4 - 5 images"
    pub fn description(&self) -> String {
        match self.max_images {
            0 => format!("{}x{} - no image", self.columns, self.rows),
            1 => format!("{}x{} - 1 image", self.columns, self.rows),
            n => format!("{}x{} - {} images", self.columns, self.rows, n),
        }
    }

    /// Grid cells the card occupies
    pub fn cells(&self) -> u16 {
        u16::from(self.columns) * u16::from(self.rows)
    }
}

pub const PACKAGES: [PackageInfo; 5] = [
    PackageInfo {
        tier: Tier::Miniature,
        label: "Miniature",
        columns: 1,
        rows: 1,
        max_images: 0,
        price: 15,
    },
    PackageInfo {
        tier: Tier::Small,
        label: "Small",
        columns: 1,
        rows: 2,
        max_images: 1,
        price: 25,
    },
    PackageInfo {
        tier: Tier::Medium,
        label: "Medium",
        columns: 2,
        rows: 2,
        max_images: 3,
        price: 45,
    },
    PackageInfo {
        tier: Tier::Large,
        label: "Large",
        columns: 2,
        rows: 4,
        max_images: 5,
        price: 85,
    },
    PackageInfo {
        tier: Tier::Huge,
        label: "Huge",
        columns: 2,
        rows: 6,
        max_images: 10,
        price: 125,
    },
];

/// Package for a tier
pub fn package_for(tier: Tier) -> &'static PackageInfo {
    // PACKAGES is laid out in tier order
    &PACKAGES[tier as usize]
}
