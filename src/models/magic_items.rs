//! Magic item tracker: four level tiers, five rarity buckets each

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTier {
    Levels1To4,
    Levels5To10,
    Levels11To16,
    Levels17To20,
}

impl LevelTier {
    pub const ALL: [LevelTier; 4] = [
        LevelTier::Levels1To4,
        LevelTier::Levels5To10,
        LevelTier::Levels11To16,
        LevelTier::Levels17To20,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LevelTier::Levels1To4 => "1-4",
            LevelTier::Levels5To10 => "5-10",
            LevelTier::Levels11To16 => "11-16",
            LevelTier::Levels17To20 => "17-20",
        }
    }
}

impl fmt::Display for LevelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Levels {}", self.label())
    }
}

impl FromStr for LevelTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized.trim_start_matches("levels").trim();
        LevelTier::ALL
            .into_iter()
            .find(|tier| tier.label() == normalized)
            .ok_or_else(|| format!("unknown level tier '{s}' (expected 1-4, 5-10, 11-16 or 17-20)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    VeryRare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::VeryRare,
        Rarity::Legendary,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::VeryRare => "very-rare",
            Rarity::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Rarity::ALL
            .into_iter()
            .find(|rarity| rarity.label() == normalized)
            .ok_or_else(|| format!("unknown rarity '{s}'"))
    }
}

/// Item names for one level tier, one list per rarity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagicItemTierData {
    #[serde(deserialize_with = "lenient::values")]
    pub common_items: Vec<String>,
    #[serde(deserialize_with = "lenient::values")]
    pub uncommon_items: Vec<String>,
    #[serde(deserialize_with = "lenient::values")]
    pub rare_items: Vec<String>,
    #[serde(deserialize_with = "lenient::values")]
    pub very_rare_items: Vec<String>,
    #[serde(deserialize_with = "lenient::values")]
    pub legendary_items: Vec<String>,
}

impl MagicItemTierData {
    pub fn items(&self, rarity: Rarity) -> &Vec<String> {
        match rarity {
            Rarity::Common => &self.common_items,
            Rarity::Uncommon => &self.uncommon_items,
            Rarity::Rare => &self.rare_items,
            Rarity::VeryRare => &self.very_rare_items,
            Rarity::Legendary => &self.legendary_items,
        }
    }

    pub fn items_mut(&mut self, rarity: Rarity) -> &mut Vec<String> {
        match rarity {
            Rarity::Common => &mut self.common_items,
            Rarity::Uncommon => &mut self.uncommon_items,
            Rarity::Rare => &mut self.rare_items,
            Rarity::VeryRare => &mut self.very_rare_items,
            Rarity::Legendary => &mut self.legendary_items,
        }
    }
}

/// Singular per campaign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagicItemTracker {
    #[serde(deserialize_with = "lenient::or_default")]
    pub level_tier_1_4: MagicItemTierData,
    #[serde(deserialize_with = "lenient::or_default")]
    pub level_tier_5_10: MagicItemTierData,
    #[serde(deserialize_with = "lenient::or_default")]
    pub level_tier_11_16: MagicItemTierData,
    #[serde(deserialize_with = "lenient::or_default")]
    pub level_tier_17_20: MagicItemTierData,
}

impl MagicItemTracker {
    pub fn tier(&self, tier: LevelTier) -> &MagicItemTierData {
        match tier {
            LevelTier::Levels1To4 => &self.level_tier_1_4,
            LevelTier::Levels5To10 => &self.level_tier_5_10,
            LevelTier::Levels11To16 => &self.level_tier_11_16,
            LevelTier::Levels17To20 => &self.level_tier_17_20,
        }
    }

    pub fn tier_mut(&mut self, tier: LevelTier) -> &mut MagicItemTierData {
        match tier {
            LevelTier::Levels1To4 => &mut self.level_tier_1_4,
            LevelTier::Levels5To10 => &mut self.level_tier_5_10,
            LevelTier::Levels11To16 => &mut self.level_tier_11_16,
            LevelTier::Levels17To20 => &mut self.level_tier_17_20,
        }
    }
}
