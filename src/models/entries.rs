//! Leaf record types stored inside a campaign
//!
//! Free-text fields may carry markup produced by rich-text editors; they are
//! opaque strings here.

use serde::{Deserialize, Serialize};

use super::ids::{EntryId, Identified};
use super::lenient;
use crate::constants::id_prefix;

macro_rules! identified {
    ($ty:ty, $field:ident, $prefix:expr) => {
        impl Identified for $ty {
            const PREFIX: &'static str = $prefix;

            fn id(&self) -> &EntryId {
                &self.$field
            }

            fn set_id(&mut self, id: EntryId) {
                self.$field = id;
            }
        }
    };
}

// ==============================================================================
// Game expectations
// ==============================================================================

/// A topic the table wants handled carefully
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitiveElement {
    pub name: String,
    pub hard_limit: bool,
    pub soft_limit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameExpectationsEntry {
    pub entry_id: EntryId,
    pub dm_name: String,
    pub player_name: String,
    pub game_theme_flavor: String,
    #[serde(deserialize_with = "lenient::values")]
    pub sensitive_elements: Vec<SensitiveElement>,
    pub player_hopes: String,
    pub at_table_concerns: String,
}

identified!(GameExpectationsEntry, entry_id, id_prefix::GAME_EXPECTATIONS);

// ==============================================================================
// Travel planner
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pace {
    Fast,
    #[default]
    Normal,
    Slow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    #[default]
    #[serde(rename = "days")]
    Days,
    #[serde(rename = "hrs")]
    Hours,
}

/// One leg of a journey
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelStage {
    pub stage_id: EntryId,
    /// User-facing label such as "Stage 1"
    pub stage_number_id: String,
    pub start_location: String,
    pub end_location: String,
    pub distance: String,
    pub terrain: String,
    pub weather: String,
    pub pace: Pace,
    pub travel_time_value: u32,
    pub travel_time_unit: TimeUnit,
    pub narrative_notes: String,
    pub challenges: String,
    /// Running total for the journey, e.g. "3 days"
    pub elapsed_time_total: String,
}

identified!(TravelStage, stage_id, id_prefix::TRAVEL_STAGE);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelPlanEntry {
    pub entry_id: EntryId,
    pub journey_name: String,
    pub origin: String,
    pub destination: String,
    #[serde(deserialize_with = "lenient::records")]
    pub stages: Vec<TravelStage>,
}

identified!(TravelPlanEntry, entry_id, id_prefix::TRAVEL_PLAN);

// ==============================================================================
// NPCs and settlements
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcEntry {
    pub entry_id: EntryId,
    pub name: String,
    pub stat_block_source: String,
    pub mm_page: String,
    pub stat_block_alterations: String,
    pub alignment: String,
    pub personality: String,
    pub appearance: String,
    pub secret: String,
}

identified!(NpcEntry, entry_id, id_prefix::NPC);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementSize {
    #[default]
    Village,
    Town,
    City,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementEntry {
    pub entry_id: EntryId,
    pub name: String,
    pub size: SettlementSize,
    pub defining_trait: String,
    pub claim_to_fame: String,
    pub current_calamity: String,
    pub local_leader: String,
    pub noteworthy_people: String,
    pub noteworthy_places: String,
    pub gp_value_most_expensive_item: String,
}

identified!(SettlementEntry, entry_id, id_prefix::SETTLEMENT);

// ==============================================================================
// Campaign journal
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignJournalEntry {
    pub entry_id: EntryId,
    pub session_number: u32,
    /// ISO date, `YYYY-MM-DD`
    pub session_date: String,
    pub session_title: String,
    pub earlier_events: String,
    pub planned_summary: String,
    pub additional_notes: String,
}

identified!(CampaignJournalEntry, entry_id, id_prefix::JOURNAL);

// ==============================================================================
// DM-side player character sheets
// ==============================================================================

/// What a player enjoys at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerMotivation {
    Acting,
    Exploring,
    Fighting,
    Instigating,
    Optimizing,
    #[serde(rename = "Problem-Solving")]
    ProblemSolving,
    Socializing,
    Storytelling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmCharacterEntry {
    pub entry_id: EntryId,
    pub character_name: String,
    pub player_name: String,
    #[serde(deserialize_with = "lenient::values")]
    pub player_motivations: Vec<PlayerMotivation>,
    pub notes_on_player_expectations: String,
    pub char_class: String,
    pub subclass: String,
    pub level: u32,
    pub background: String,
    pub species_race: String,
    pub alignment: String,
    pub goals_ambitions: String,
    pub quirks_whims: String,
    pub magic_items_owned: String,
    pub character_details: String,
    pub family_friends_foes: String,
    pub adventure_ideas: String,
}

impl Default for DmCharacterEntry {
    fn default() -> Self {
        Self {
            entry_id: EntryId::default(),
            character_name: String::new(),
            player_name: String::new(),
            player_motivations: Vec::new(),
            notes_on_player_expectations: String::new(),
            char_class: String::new(),
            subclass: String::new(),
            level: 1,
            background: String::new(),
            species_race: String::new(),
            alignment: String::new(),
            goals_ambitions: String::new(),
            quirks_whims: String::new(),
            magic_items_owned: String::new(),
            character_details: String::new(),
            family_friends_foes: String::new(),
            adventure_ideas: String::new(),
        }
    }
}

identified!(DmCharacterEntry, entry_id, id_prefix::DM_CHARACTER);

// ==============================================================================
// Conflicts
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conflict {
    pub conflict_id: EntryId,
    pub title_identifier: String,
    pub antagonist_situation: String,
    pub notes: String,
}

identified!(Conflict, conflict_id, id_prefix::CONFLICT);

/// Singular per campaign; holds the ordered conflict list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConflicts {
    #[serde(deserialize_with = "lenient::records")]
    pub conflicts: Vec<Conflict>,
}

// ==============================================================================
// Bastions
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BastionFacility {
    pub facility_id: EntryId,
    pub facility_type_name: String,
    pub space: String,
    pub order_association: String,
    pub hirelings: String,
    pub notes: String,
}

identified!(BastionFacility, facility_id, id_prefix::BASTION_FACILITY);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BastionEntry {
    pub entry_id: EntryId,
    pub bastion_name: String,
    pub character_name: String,
    pub level: u32,
    #[serde(deserialize_with = "lenient::records")]
    pub special_facilities: Vec<BastionFacility>,
    pub basic_facilities_desc: String,
    pub bastion_defenders_desc: String,
}

identified!(BastionEntry, entry_id, id_prefix::BASTION);
