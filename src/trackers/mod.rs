//! Tracker CRUD over a campaign's record collections
//!
//! - **keyed**: generic list/add/edit/delete for the seven keyed collections
//! - **conflicts**: ordered conflict list inside the singular container
//! - **magic_items**: deduplicated name lists per tier and rarity
//! - **nested**: travel stages, bastion facilities and sensitive elements
//! - **records**: per-record labels and form validation

pub mod conflicts;
pub mod keyed;
pub mod magic_items;
pub mod nested;
mod records;

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::TrackerError;
use crate::models::{
    BastionEntry, Campaign, CampaignJournalEntry, DmCharacterEntry, EntryId, GameExpectationsEntry,
    IdAllocator, Identified, NpcEntry, SettlementEntry, TravelPlanEntry,
};

/// A record that can be created and edited through a form
pub trait Record: Identified + Clone + Default + Serialize + DeserializeOwned {
    /// Human-readable kind used in messages ("NPC", "Bastion", ...)
    const KIND: &'static str;

    /// Display name shown in listings
    fn label(&self) -> &str;

    /// Reject the form before any mutation happens
    fn validate(&self) -> Result<(), TrackerError> {
        Ok(())
    }

    /// Tidy form input before it is stored
    fn normalize(&mut self) {}

    /// Give nested child records without a usable id a fresh one
    fn assign_child_ids(&mut self, _ids: &IdAllocator) {}
}

/// Binds a record type to its collection inside a campaign
pub trait KeyedTracker {
    type Entry: Record;

    fn collection(campaign: &Campaign) -> &IndexMap<EntryId, Self::Entry>;
    fn collection_mut(campaign: &mut Campaign) -> &mut IndexMap<EntryId, Self::Entry>;

    /// Listing order; collection order unless overridden
    fn sort_for_display(_entries: &mut [&Self::Entry]) {}

    /// Starting values for a new record's form
    fn new_draft(_campaign: &Campaign) -> Self::Entry {
        Self::Entry::default()
    }
}

pub struct ExpectationsTracker;
pub struct TravelTracker;
pub struct NpcTracker;
pub struct SettlementTracker;
pub struct JournalTracker;
pub struct CharacterTracker;
pub struct BastionTracker;

impl KeyedTracker for ExpectationsTracker {
    type Entry = GameExpectationsEntry;

    fn collection(campaign: &Campaign) -> &IndexMap<EntryId, Self::Entry> {
        &campaign.game_expectations
    }

    fn collection_mut(campaign: &mut Campaign) -> &mut IndexMap<EntryId, Self::Entry> {
        &mut campaign.game_expectations
    }
}

impl KeyedTracker for TravelTracker {
    type Entry = TravelPlanEntry;

    fn collection(campaign: &Campaign) -> &IndexMap<EntryId, Self::Entry> {
        &campaign.travel_plans
    }

    fn collection_mut(campaign: &mut Campaign) -> &mut IndexMap<EntryId, Self::Entry> {
        &mut campaign.travel_plans
    }
}

impl KeyedTracker for NpcTracker {
    type Entry = NpcEntry;

    fn collection(campaign: &Campaign) -> &IndexMap<EntryId, Self::Entry> {
        &campaign.npcs
    }

    fn collection_mut(campaign: &mut Campaign) -> &mut IndexMap<EntryId, Self::Entry> {
        &mut campaign.npcs
    }

    fn sort_for_display(entries: &mut [&Self::Entry]) {
        entries.sort_by_cached_key(|npc| npc.name.to_lowercase());
    }
}

impl KeyedTracker for SettlementTracker {
    type Entry = SettlementEntry;

    fn collection(campaign: &Campaign) -> &IndexMap<EntryId, Self::Entry> {
        &campaign.settlements
    }

    fn collection_mut(campaign: &mut Campaign) -> &mut IndexMap<EntryId, Self::Entry> {
        &mut campaign.settlements
    }
}

impl KeyedTracker for JournalTracker {
    type Entry = CampaignJournalEntry;

    fn collection(campaign: &Campaign) -> &IndexMap<EntryId, Self::Entry> {
        &campaign.campaign_journal
    }

    fn collection_mut(campaign: &mut Campaign) -> &mut IndexMap<EntryId, Self::Entry> {
        &mut campaign.campaign_journal
    }

    fn sort_for_display(entries: &mut [&Self::Entry]) {
        entries.sort_by_key(|entry| entry.session_number);
    }

    fn new_draft(campaign: &Campaign) -> Self::Entry {
        CampaignJournalEntry {
            session_number: nested::next_session_number(campaign),
            ..CampaignJournalEntry::default()
        }
    }
}

impl KeyedTracker for CharacterTracker {
    type Entry = DmCharacterEntry;

    fn collection(campaign: &Campaign) -> &IndexMap<EntryId, Self::Entry> {
        &campaign.dm_characters
    }

    fn collection_mut(campaign: &mut Campaign) -> &mut IndexMap<EntryId, Self::Entry> {
        &mut campaign.dm_characters
    }
}

impl KeyedTracker for BastionTracker {
    type Entry = BastionEntry;

    fn collection(campaign: &Campaign) -> &IndexMap<EntryId, Self::Entry> {
        &campaign.bastions
    }

    fn collection_mut(campaign: &mut Campaign) -> &mut IndexMap<EntryId, Self::Entry> {
        &mut campaign.bastions
    }

    fn sort_for_display(entries: &mut [&Self::Entry]) {
        entries.sort_by_cached_key(|bastion| bastion.bastion_name.to_lowercase());
    }
}
