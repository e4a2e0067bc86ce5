//! Magic item name lists, one per level tier and rarity

use tracing::{info, warn};

use crate::error::TrackerError;
use crate::models::{Campaign, LevelTier, Rarity};

pub fn list(campaign: &Campaign, tier: LevelTier, rarity: Rarity) -> &[String] {
    campaign.magic_item_tracker.tier(tier).items(rarity)
}

/// Add `name` to one bucket. The bucket stays sorted and never holds the same
/// name twice. Returns the stored (trimmed) name.
pub fn add(campaign: &mut Campaign, tier: LevelTier, rarity: Rarity, name: &str) -> Result<String, TrackerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::required("Item name"));
    }

    let items = campaign.magic_item_tracker.tier_mut(tier).items_mut(rarity);
    if items.iter().any(|existing| existing == name) {
        warn!(tier = %tier, rarity = rarity.label(), item = name, "Magic item already listed");
        return Err(TrackerError::DuplicateItem { name: name.to_string() });
    }
    items.push(name.to_string());
    items.sort();

    info!(tier = %tier, rarity = rarity.label(), item = name, "Added magic item");
    Ok(name.to_string())
}

/// Remove the exact name from one bucket; `false` when it was not listed
pub fn remove(campaign: &mut Campaign, tier: LevelTier, rarity: Rarity, name: &str) -> bool {
    let items = campaign.magic_item_tracker.tier_mut(tier).items_mut(rarity);
    match items.iter().position(|existing| existing == name) {
        Some(index) => {
            items.remove(index);
            info!(tier = %tier, rarity = rarity.label(), item = name, "Removed magic item");
            true
        }
        None => {
            warn!(tier = %tier, rarity = rarity.label(), item = name, "Magic item to remove not found");
            false
        }
    }
}
