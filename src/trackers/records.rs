use chrono::NaiveDate;

use super::Record;
use crate::constants::validation::*;
use crate::error::TrackerError;
use crate::models::{
    BastionEntry, BastionFacility, CampaignJournalEntry, Conflict, DmCharacterEntry, GameExpectationsEntry,
    IdAllocator, Identified, NpcEntry, SettlementEntry, TravelPlanEntry, TravelStage,
};

fn require(value: &str, field: &str) -> Result<(), TrackerError> {
    if value.trim().is_empty() {
        Err(TrackerError::required(field))
    } else {
        Ok(())
    }
}

/// Children with an empty id, or one already used earlier in the list, get a fresh id
fn fill_child_ids<C: Identified>(children: &mut [C], ids: &IdAllocator) {
    for index in 0..children.len() {
        let current = children[index].id();
        if !current.is_empty() && !children[..index].iter().any(|c| c.id() == current) {
            continue;
        }
        let id = ids.allocate::<C>(|candidate| children.iter().any(|c| c.id() == candidate));
        children[index].set_id(id);
    }
}

fn in_range(value: u32, min: u32, max: u32, field: &str) -> Result<(), TrackerError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(TrackerError::Validation(format!("{field} must be between {min} and {max} (got {value})")))
    }
}

impl Record for GameExpectationsEntry {
    const KIND: &'static str = "Game expectations entry";

    fn label(&self) -> &str {
        &self.player_name
    }

    fn validate(&self) -> Result<(), TrackerError> {
        require(&self.player_name, "Player Name")
    }

    fn normalize(&mut self) {
        // Rows without a name are blank table rows in the form
        self.sensitive_elements.retain(|element| !element.name.trim().is_empty());
    }
}

impl Record for TravelStage {
    const KIND: &'static str = "Travel stage";

    fn label(&self) -> &str {
        if self.stage_number_id.is_empty() {
            &self.start_location
        } else {
            &self.stage_number_id
        }
    }

    fn validate(&self) -> Result<(), TrackerError> {
        if self.start_location.trim().is_empty() || self.end_location.trim().is_empty() {
            return Err(TrackerError::Validation(
                "Stage start and end locations cannot be empty".to_string(),
            ));
        }
        in_range(self.travel_time_value, 0, MAX_TRAVEL_TIME, "Travel time")
    }
}

impl Record for TravelPlanEntry {
    const KIND: &'static str = "Travel plan";

    fn label(&self) -> &str {
        &self.journey_name
    }

    fn validate(&self) -> Result<(), TrackerError> {
        require(&self.journey_name, "Journey Name")?;
        self.stages.iter().try_for_each(Record::validate)
    }

    fn normalize(&mut self) {
        self.stages.iter_mut().for_each(Record::normalize);
    }

    fn assign_child_ids(&mut self, ids: &IdAllocator) {
        fill_child_ids(&mut self.stages, ids);
    }
}

impl Record for NpcEntry {
    const KIND: &'static str = "NPC";

    fn label(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), TrackerError> {
        require(&self.name, "NPC Name")
    }
}

impl Record for SettlementEntry {
    const KIND: &'static str = "Settlement";

    fn label(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), TrackerError> {
        require(&self.name, "Settlement Name")
    }
}

impl Record for CampaignJournalEntry {
    const KIND: &'static str = "Journal entry";

    fn label(&self) -> &str {
        &self.session_title
    }

    fn validate(&self) -> Result<(), TrackerError> {
        require(&self.session_title, "Session Title")?;
        in_range(self.session_number, MIN_SESSION_NUMBER, MAX_SESSION_NUMBER, "Session Number")?;
        if !self.session_date.is_empty()
            && NaiveDate::parse_from_str(&self.session_date, SESSION_DATE_FORMAT).is_err()
        {
            return Err(TrackerError::Validation(format!(
                "Session Date '{}' is not a YYYY-MM-DD date",
                self.session_date
            )));
        }
        Ok(())
    }
}

impl Record for DmCharacterEntry {
    const KIND: &'static str = "Player character";

    fn label(&self) -> &str {
        &self.character_name
    }

    fn validate(&self) -> Result<(), TrackerError> {
        require(&self.character_name, "Character's Name")?;
        in_range(self.level, MIN_CHARACTER_LEVEL, MAX_CHARACTER_LEVEL, "Level")
    }

    fn normalize(&mut self) {
        let mut seen = Vec::with_capacity(self.player_motivations.len());
        self.player_motivations.retain(|m| {
            if seen.contains(m) {
                false
            } else {
                seen.push(*m);
                true
            }
        });
    }
}

impl Record for Conflict {
    const KIND: &'static str = "Conflict";

    fn label(&self) -> &str {
        &self.title_identifier
    }

    fn validate(&self) -> Result<(), TrackerError> {
        require(&self.title_identifier, "Conflict Title/Identifier")
    }
}

impl Record for BastionFacility {
    const KIND: &'static str = "Bastion facility";

    fn label(&self) -> &str {
        &self.facility_type_name
    }

    fn validate(&self) -> Result<(), TrackerError> {
        require(&self.facility_type_name, "Facility Type/Name")
    }
}

impl Record for BastionEntry {
    const KIND: &'static str = "Bastion";

    fn label(&self) -> &str {
        &self.bastion_name
    }

    fn validate(&self) -> Result<(), TrackerError> {
        require(&self.bastion_name, "Bastion Name")?;
        in_range(self.level, 0, MAX_BASTION_LEVEL, "Bastion Level")?;
        self.special_facilities.iter().try_for_each(Record::validate)
    }

    fn normalize(&mut self) {
        self.special_facilities.iter_mut().for_each(Record::normalize);
    }

    fn assign_child_ids(&mut self, ids: &IdAllocator) {
        fill_child_ids(&mut self.special_facilities, ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerMotivation, SensitiveElement};

    #[test]
    fn test_whitespace_only_names_are_rejected() {
        let npc = NpcEntry { name: "   ".to_string(), ..NpcEntry::default() };
        assert!(matches!(npc.validate(), Err(TrackerError::Validation(_))));
    }

    #[test]
    fn test_journal_checks_number_and_date() {
        let mut entry = CampaignJournalEntry {
            session_number: 1,
            session_title: "Arrival".to_string(),
            session_date: "2024-02-29".to_string(),
            ..CampaignJournalEntry::default()
        };
        assert!(entry.validate().is_ok());

        entry.session_date = "29/02/2024".to_string();
        assert!(entry.validate().is_err());

        entry.session_date.clear();
        entry.session_number = 0;
        assert!(entry.validate().is_err());
        entry.session_number = 1000;
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_character_level_range() {
        let mut pc = DmCharacterEntry { character_name: "Van Richten".to_string(), ..DmCharacterEntry::default() };
        assert!(pc.validate().is_ok());
        pc.level = 21;
        assert!(pc.validate().is_err());
        pc.level = 0;
        assert!(pc.validate().is_err());
    }

    #[test]
    fn test_plan_validates_its_stages() {
        let plan = TravelPlanEntry {
            journey_name: "Road to Vallaki".to_string(),
            stages: vec![TravelStage { start_location: "Barovia".to_string(), ..TravelStage::default() }],
            ..TravelPlanEntry::default()
        };
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("start and end"));
    }

    #[test]
    fn test_bastion_validates_facilities() {
        let bastion = BastionEntry {
            bastion_name: "Old Mill".to_string(),
            special_facilities: vec![BastionFacility::default()],
            ..BastionEntry::default()
        };
        assert!(bastion.validate().is_err());
    }

    #[test]
    fn test_normalize_drops_blank_sensitive_rows() {
        let mut entry = GameExpectationsEntry {
            player_name: "Alice".to_string(),
            sensitive_elements: vec![
                SensitiveElement { name: "Spiders".to_string(), hard_limit: true, soft_limit: false },
                SensitiveElement { name: " ".to_string(), hard_limit: false, soft_limit: true },
            ],
            ..GameExpectationsEntry::default()
        };
        entry.normalize();
        assert_eq!(entry.sensitive_elements.len(), 1);
    }

    #[test]
    fn test_normalize_dedups_motivations_keeping_order() {
        let mut pc = DmCharacterEntry {
            player_motivations: vec![
                PlayerMotivation::Storytelling,
                PlayerMotivation::Acting,
                PlayerMotivation::Storytelling,
            ],
            ..DmCharacterEntry::default()
        };
        pc.normalize();
        assert_eq!(pc.player_motivations, vec![PlayerMotivation::Storytelling, PlayerMotivation::Acting]);
    }
}
