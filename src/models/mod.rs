//! Campaign record schema
//!
//! - **ids**: opaque identifiers and the session id allocator
//! - **entries**: leaf records (NPCs, settlements, journal entries, ...)
//! - **magic_items**: tier × rarity item lists
//! - **campaign**: `Campaign` and the top-level `ApplicationData`
//! - **lenient**: deserializers that contain decode failures to one record

pub mod campaign;
pub mod entries;
pub mod ids;
pub mod lenient;
pub mod magic_items;

pub use campaign::{ApplicationData, Campaign};
pub use entries::{
    BastionEntry, BastionFacility, CampaignConflicts, CampaignJournalEntry, Conflict, DmCharacterEntry,
    GameExpectationsEntry, NpcEntry, Pace, PlayerMotivation, SensitiveElement, SettlementEntry,
    SettlementSize, TimeUnit, TravelPlanEntry, TravelStage,
};
pub use ids::{EntryId, IdAllocator, Identified};
pub use magic_items::{LevelTier, MagicItemTierData, MagicItemTracker, Rarity};
