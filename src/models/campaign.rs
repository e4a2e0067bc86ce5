//! Campaign and the top-level application document

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::entries::{
    BastionEntry, CampaignConflicts, CampaignJournalEntry, DmCharacterEntry, GameExpectationsEntry,
    NpcEntry, SettlementEntry, TravelPlanEntry,
};
use super::ids::{EntryId, Identified};
use super::lenient;
use super::magic_items::MagicItemTracker;
use crate::constants::data::{LEGACY_SCHEMA_VERSION, SCHEMA_VERSION};

/// One campaign's full content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Campaign {
    pub campaign_id: EntryId,
    pub name: String,
    #[serde(deserialize_with = "lenient::keyed")]
    pub game_expectations: IndexMap<EntryId, GameExpectationsEntry>,
    #[serde(deserialize_with = "lenient::keyed")]
    pub travel_plans: IndexMap<EntryId, TravelPlanEntry>,
    #[serde(deserialize_with = "lenient::keyed")]
    pub npcs: IndexMap<EntryId, NpcEntry>,
    #[serde(deserialize_with = "lenient::keyed")]
    pub settlements: IndexMap<EntryId, SettlementEntry>,
    #[serde(deserialize_with = "lenient::keyed")]
    pub campaign_journal: IndexMap<EntryId, CampaignJournalEntry>,
    #[serde(deserialize_with = "lenient::keyed")]
    pub dm_characters: IndexMap<EntryId, DmCharacterEntry>,
    // Singular structures: never absent, synthesized empty when missing or null
    #[serde(deserialize_with = "lenient::or_default")]
    pub campaign_conflicts: CampaignConflicts,
    #[serde(deserialize_with = "lenient::or_default")]
    pub magic_item_tracker: MagicItemTracker,
    #[serde(deserialize_with = "lenient::keyed")]
    pub bastions: IndexMap<EntryId, BastionEntry>,
    pub dm_name_global: String,
}

impl Campaign {
    pub fn new(campaign_id: EntryId, name: impl Into<String>) -> Self {
        Self {
            campaign_id,
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Identified for Campaign {
    const PREFIX: &'static str = "";

    fn id(&self) -> &EntryId {
        &self.campaign_id
    }

    fn set_id(&mut self, id: EntryId) {
        self.campaign_id = id;
    }
}

fn legacy_schema_version() -> u32 {
    LEGACY_SCHEMA_VERSION
}

/// Everything persisted to the data file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationData {
    /// Absent in files written before versioning was introduced
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    #[serde(deserialize_with = "lenient::keyed")]
    pub campaigns: IndexMap<EntryId, Campaign>,
    /// Last-active campaign, empty when none
    pub active_campaign_id: String,
}

impl Default for ApplicationData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            campaigns: IndexMap::new(),
            active_campaign_id: String::new(),
        }
    }
}

impl ApplicationData {
    pub fn campaign(&self, id: &str) -> Option<&Campaign> {
        self.campaigns.get(id)
    }

    pub fn campaign_mut(&mut self, id: &str) -> Option<&mut Campaign> {
        self.campaigns.get_mut(id)
    }

    pub fn first_campaign_id(&self) -> Option<&EntryId> {
        self.campaigns.keys().next()
    }
}
