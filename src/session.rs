//! Campaign session: the loaded document, the current selection and the
//! persist-after-every-change policy
//!
//! Tracker operations always address the currently selected campaign through
//! the session, so there is no cached view to fall out of date.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::TrackerError;
use crate::models::{
    ApplicationData, BastionEntry, BastionFacility, Campaign, EntryId, IdAllocator, LevelTier, Rarity,
    TravelPlanEntry, TravelStage,
};
use crate::persistence;
use crate::trackers::{KeyedTracker, Record, conflicts, keyed, magic_items, nested};

/// Which campaign tracker operations apply to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    None,
    Selected(EntryId),
}

impl Selection {
    pub fn id(&self) -> Option<&EntryId> {
        match self {
            Selection::None => None,
            Selection::Selected(id) => Some(id),
        }
    }
}

/// Yes/no question asked before anything is deleted
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Result of a confirmed delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    Declined,
    /// Target was already gone
    NotFound,
}

pub struct CampaignSession {
    data_path: PathBuf,
    data: ApplicationData,
    selection: Selection,
    ids: IdAllocator,
}

impl CampaignSession {
    /// Load `path` (or start empty) and pick the campaign to work on:
    /// the stored active campaign if it still exists, else the first one.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let data_path = path.into();
        let data = persistence::load(&data_path);
        let selection = resolve_selection(&data);
        info!(
            path = %data_path.display(),
            campaigns = data.campaigns.len(),
            selected = ?selection.id().map(EntryId::as_str),
            "Opened campaign data"
        );
        Self {
            data_path,
            data,
            selection,
            ids: IdAllocator::new(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn campaigns(&self) -> impl Iterator<Item = &Campaign> {
        self.data.campaigns.values()
    }

    pub fn current_campaign(&self) -> Result<&Campaign, TrackerError> {
        self.selection
            .id()
            .and_then(|id| self.data.campaign(id.as_str()))
            .ok_or(TrackerError::NoCampaign)
    }

    /// Create and select a new campaign. Names are trimmed and must be unique.
    pub fn create_campaign(&mut self, name: &str) -> Result<EntryId, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::required("Campaign name"));
        }
        if self.data.campaigns.values().any(|campaign| campaign.name == name) {
            warn!(name, "Campaign name already in use");
            return Err(TrackerError::DuplicateCampaign { name: name.to_string() });
        }

        let campaigns = &self.data.campaigns;
        let id = self.ids.allocate::<Campaign>(|candidate| campaigns.contains_key(candidate));
        self.data
            .campaigns
            .insert(id.clone(), Campaign::new(id.clone(), name));
        self.selection = Selection::Selected(id.clone());
        info!(id = %id, name, "Created campaign");

        self.persist()?;
        Ok(id)
    }

    pub fn select(&mut self, id: &str) -> Result<(), TrackerError> {
        let Some(key) = self.data.campaigns.get_key_value(id).map(|(key, _)| key.clone()) else {
            return Err(TrackerError::not_found("Campaign", id));
        };
        info!(id, "Selected campaign");
        self.selection = Selection::Selected(key);
        Ok(())
    }

    /// Delete the selected campaign after confirmation; selection falls back
    /// to the first remaining campaign
    pub fn delete_current_campaign(&mut self, confirm: &mut dyn Confirm) -> Result<DeleteOutcome, TrackerError> {
        let campaign = self.current_campaign()?;
        let (id, name) = (campaign.campaign_id.clone(), campaign.name.clone());

        if !confirm.confirm(&format!("Delete campaign '{name}' and all its data?")) {
            info!(id = %id, "Campaign deletion declined");
            return Ok(DeleteOutcome::Declined);
        }

        let Some((key, _)) = self.data.campaigns.shift_remove_entry(id.as_str()) else {
            return Ok(DeleteOutcome::NotFound);
        };
        self.ids.retire(key);
        self.selection = match self.data.first_campaign_id() {
            Some(first) => Selection::Selected(first.clone()),
            None => Selection::None,
        };
        info!(id = %id, name = %name, "Deleted campaign");

        self.persist()?;
        Ok(DeleteOutcome::Removed)
    }

    /// Apply `change` to the selected campaign and persist if it succeeds.
    /// A failing change leaves the document untouched and unsaved.
    pub fn mutate<R>(
        &mut self,
        change: impl FnOnce(&mut Campaign, &mut IdAllocator) -> Result<R, TrackerError>,
    ) -> Result<R, TrackerError> {
        let id = self.selection.id().cloned().ok_or(TrackerError::NoCampaign)?;
        let campaign = self
            .data
            .campaign_mut(id.as_str())
            .ok_or(TrackerError::NoCampaign)?;
        let result = change(campaign, &mut self.ids)?;
        self.persist()?;
        Ok(result)
    }

    pub fn add<T: KeyedTracker>(&mut self, draft: T::Entry) -> Result<EntryId, TrackerError> {
        self.mutate(|campaign, ids| keyed::add::<T>(campaign, draft, ids))
    }

    pub fn edit<T: KeyedTracker>(&mut self, id: &str, draft: T::Entry) -> Result<(), TrackerError> {
        self.mutate(|campaign, ids| keyed::edit::<T>(campaign, id, draft, ids))
    }

    pub fn delete<T: KeyedTracker>(
        &mut self,
        id: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, TrackerError> {
        let label = keyed::get::<T>(self.current_campaign()?, id).map(|entry| entry.label().to_string());
        self.confirm_then_remove(<T::Entry as Record>::KIND, id, label, confirm, |campaign, ids| {
            Ok(keyed::delete::<T>(campaign, id, ids))
        })
    }

    pub fn delete_conflict(&mut self, id: &str, confirm: &mut dyn Confirm) -> Result<DeleteOutcome, TrackerError> {
        let label = conflicts::get(self.current_campaign()?, id).map(|c| c.title_identifier.clone());
        self.confirm_then_remove("Conflict", id, label, confirm, |campaign, ids| {
            Ok(conflicts::delete(campaign, id, ids))
        })
    }

    pub fn remove_item(
        &mut self,
        tier: LevelTier,
        rarity: Rarity,
        name: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, TrackerError> {
        let label = magic_items::list(self.current_campaign()?, tier, rarity)
            .iter()
            .find(|item| item.as_str() == name)
            .cloned();
        self.confirm_then_remove("Magic item", name, label, confirm, |campaign, _| {
            Ok(magic_items::remove(campaign, tier, rarity, name))
        })
    }

    pub fn remove_stage(
        &mut self,
        plan_id: &str,
        stage_id: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, TrackerError> {
        let plan = self
            .current_campaign()?
            .travel_plans
            .get(plan_id)
            .ok_or_else(|| TrackerError::not_found(TravelPlanEntry::KIND, plan_id))?;
        let label = plan
            .stages
            .iter()
            .find(|stage| stage.stage_id.as_str() == stage_id)
            .map(|stage| stage.label().to_string());
        self.confirm_then_remove(TravelStage::KIND, stage_id, label, confirm, |campaign, ids| {
            nested::remove_stage(campaign, plan_id, stage_id, ids)
        })
    }

    pub fn remove_facility(
        &mut self,
        bastion_id: &str,
        facility_id: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, TrackerError> {
        let bastion = self
            .current_campaign()?
            .bastions
            .get(bastion_id)
            .ok_or_else(|| TrackerError::not_found(BastionEntry::KIND, bastion_id))?;
        let label = bastion
            .special_facilities
            .iter()
            .find(|facility| facility.facility_id.as_str() == facility_id)
            .map(|facility| facility.label().to_string());
        self.confirm_then_remove(BastionFacility::KIND, facility_id, label, confirm, |campaign, ids| {
            nested::remove_facility(campaign, bastion_id, facility_id, ids)
        })
    }

    fn confirm_then_remove(
        &mut self,
        kind: &str,
        id: &str,
        label: Option<String>,
        confirm: &mut dyn Confirm,
        remove: impl FnOnce(&mut Campaign, &mut IdAllocator) -> Result<bool, TrackerError>,
    ) -> Result<DeleteOutcome, TrackerError> {
        let Some(label) = label else {
            warn!(kind, id, "Delete target not found or already removed");
            return Ok(DeleteOutcome::NotFound);
        };
        if !confirm.confirm(&format!("Delete {kind} '{label}'?")) {
            info!(kind, id, "Deletion declined");
            return Ok(DeleteOutcome::Declined);
        }
        let removed = self.mutate(remove)?;
        Ok(if removed { DeleteOutcome::Removed } else { DeleteOutcome::NotFound })
    }

    /// Write the whole document to the data file. The in-memory state is kept
    /// when the write fails.
    pub fn persist(&self) -> Result<(), TrackerError> {
        persistence::try_save(&self.data, &self.data_path).map_err(|source| TrackerError::Save {
            path: self.data_path.clone(),
            source,
        })
    }

    /// Record the selection as the active campaign and do the final save
    pub fn close(&mut self) -> Result<(), TrackerError> {
        self.data.active_campaign_id = self
            .selection
            .id()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default();
        info!(active = %self.data.active_campaign_id, "Closing session");
        self.persist()
    }

    pub fn export_to(&self, path: &Path) -> Result<(), TrackerError> {
        persistence::try_save(&self.data, path).map_err(|source| TrackerError::Save {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Exported campaign data");
        Ok(())
    }

    /// Replace everything with the contents of `path`, then save it as the
    /// primary data file
    pub fn import_from(&mut self, path: &Path) -> Result<(), TrackerError> {
        if !path.exists() {
            return Err(TrackerError::ImportMissing(path.to_path_buf()));
        }
        self.data = persistence::load(path);
        self.selection = resolve_selection(&self.data);
        info!(
            path = %path.display(),
            campaigns = self.data.campaigns.len(),
            "Imported campaign data"
        );
        self.persist()
    }
}

fn resolve_selection(data: &ApplicationData) -> Selection {
    if let Some((id, _)) = data.campaigns.get_key_value(data.active_campaign_id.as_str()) {
        return Selection::Selected(id.clone());
    }
    if !data.active_campaign_id.is_empty() {
        warn!(id = %data.active_campaign_id, "Stored active campaign no longer exists");
    }
    match data.first_campaign_id() {
        Some(id) => Selection::Selected(id.clone()),
        None => Selection::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conflict, NpcEntry};
    use crate::trackers::NpcTracker;
    use tempfile::TempDir;

    struct Answer(bool);

    impl Confirm for Answer {
        fn confirm(&mut self, _prompt: &str) -> bool {
            self.0
        }
    }

    fn session_in(dir: &TempDir) -> CampaignSession {
        CampaignSession::open(dir.path().join("campaigns.json"))
    }

    #[test]
    fn test_strahd_ismark_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        assert_eq!(session.selection(), &Selection::None);

        let campaign_id = session.create_campaign("Curse of Strahd").unwrap();
        let npc = NpcEntry { name: "Ismark".into(), alignment: "LG".into(), ..NpcEntry::default() };
        let npc_id = session.add::<NpcTracker>(npc).unwrap();
        session.close().unwrap();

        let reopened = session_in(&dir);
        assert_eq!(reopened.selection(), &Selection::Selected(campaign_id));
        let campaign = reopened.current_campaign().unwrap();
        assert_eq!(campaign.npcs.len(), 1);
        let stored = &campaign.npcs[&npc_id];
        assert_eq!(stored.name, "Ismark");
        assert_eq!(stored.entry_id, npc_id);
    }

    #[test]
    fn test_every_change_is_saved_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        session.create_campaign("Strahd").unwrap();
        let id = session
            .add::<NpcTracker>(NpcEntry { name: "Ireena".into(), ..NpcEntry::default() })
            .unwrap();

        // No close: the add alone must have reached the file
        let on_disk = persistence::load(session.data_path());
        let campaign = on_disk.campaigns.values().next().unwrap();
        assert!(campaign.npcs.contains_key(&id));
    }

    #[test]
    fn test_duplicate_and_blank_campaign_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        session.create_campaign("Strahd").unwrap();

        assert!(matches!(
            session.create_campaign("  Strahd "),
            Err(TrackerError::DuplicateCampaign { .. })
        ));
        assert!(matches!(session.create_campaign("   "), Err(TrackerError::Validation(_))));
        assert_eq!(session.campaigns().count(), 1);
    }

    #[test]
    fn test_operations_without_selection_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);

        assert!(matches!(session.current_campaign(), Err(TrackerError::NoCampaign)));
        let err = session.add::<NpcTracker>(NpcEntry { name: "x".into(), ..NpcEntry::default() });
        assert!(matches!(err, Err(TrackerError::NoCampaign)));
        assert!(matches!(
            session.delete_current_campaign(&mut Answer(true)),
            Err(TrackerError::NoCampaign)
        ));
    }

    #[test]
    fn test_declined_delete_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        session.create_campaign("Strahd").unwrap();
        let id = session
            .add::<NpcTracker>(NpcEntry { name: "Ismark".into(), ..NpcEntry::default() })
            .unwrap();

        let outcome = session.delete::<NpcTracker>(id.as_str(), &mut Answer(false)).unwrap();
        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(session.current_campaign().unwrap().npcs.len(), 1);

        let outcome = session.delete::<NpcTracker>(id.as_str(), &mut Answer(true)).unwrap();
        assert_eq!(outcome, DeleteOutcome::Removed);
        let outcome = session.delete::<NpcTracker>(id.as_str(), &mut Answer(true)).unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }

    #[test]
    fn test_conflict_delete_goes_through_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        session.create_campaign("Strahd").unwrap();
        let id = session
            .mutate(|campaign, ids| {
                let draft = Conflict { title_identifier: "Festival".into(), ..Conflict::default() };
                conflicts::add(campaign, draft, ids)
            })
            .unwrap();

        assert_eq!(session.delete_conflict(id.as_str(), &mut Answer(false)).unwrap(), DeleteOutcome::Declined);
        assert_eq!(session.delete_conflict(id.as_str(), &mut Answer(true)).unwrap(), DeleteOutcome::Removed);
        assert!(session.current_campaign().unwrap().campaign_conflicts.conflicts.is_empty());
    }

    #[test]
    fn test_nested_and_item_removal_ask_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        session.create_campaign("Strahd").unwrap();
        let plan = TravelPlanEntry { journey_name: "To Vallaki".into(), ..TravelPlanEntry::default() };
        let plan_id = session.add::<crate::trackers::TravelTracker>(plan).unwrap();
        let stage_id = session
            .mutate(|campaign, ids| {
                let stage = TravelStage {
                    start_location: "Barovia".into(),
                    end_location: "Vallaki".into(),
                    ..TravelStage::default()
                };
                nested::add_stage(campaign, plan_id.as_str(), stage, ids)
            })
            .unwrap();
        session
            .mutate(|campaign, _| magic_items::add(campaign, LevelTier::Levels1To4, Rarity::Common, "Potion of Healing"))
            .unwrap();

        let outcome = session.remove_stage(plan_id.as_str(), stage_id.as_str(), &mut Answer(false)).unwrap();
        assert_eq!(outcome, DeleteOutcome::Declined);
        let outcome = session.remove_stage(plan_id.as_str(), stage_id.as_str(), &mut Answer(true)).unwrap();
        assert_eq!(outcome, DeleteOutcome::Removed);
        assert!(matches!(
            session.remove_stage("tp_missing0", stage_id.as_str(), &mut Answer(true)),
            Err(TrackerError::NotFound { .. })
        ));

        let outcome = session
            .remove_item(LevelTier::Levels1To4, Rarity::Common, "Potion of Healing", &mut Answer(true))
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Removed);
        let outcome = session
            .remove_item(LevelTier::Levels1To4, Rarity::Common, "Potion of Healing", &mut Answer(true))
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }

    #[test]
    fn test_deleting_campaign_moves_selection_to_first_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        let first = session.create_campaign("Strahd").unwrap();
        session.create_campaign("Rime of the Frostmaiden").unwrap();

        assert_eq!(session.delete_current_campaign(&mut Answer(false)).unwrap(), DeleteOutcome::Declined);
        assert_eq!(session.campaigns().count(), 2);

        assert_eq!(session.delete_current_campaign(&mut Answer(true)).unwrap(), DeleteOutcome::Removed);
        assert_eq!(session.selection(), &Selection::Selected(first));

        session.delete_current_campaign(&mut Answer(true)).unwrap();
        assert_eq!(session.selection(), &Selection::None);
    }

    #[test]
    fn test_stale_active_id_falls_back_to_first_campaign() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        let first = session.create_campaign("Strahd").unwrap();
        let second = session.create_campaign("Frostmaiden").unwrap();
        session.close().unwrap();
        assert_eq!(session_in(&dir).selection(), &Selection::Selected(second));

        let mut data = persistence::load(session.data_path());
        data.active_campaign_id = "gone".into();
        assert!(persistence::save(&data, session.data_path()));
        assert_eq!(session_in(&dir).selection(), &Selection::Selected(first));
    }

    #[test]
    fn test_select_requires_existing_campaign() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        let first = session.create_campaign("Strahd").unwrap();
        session.create_campaign("Frostmaiden").unwrap();

        session.select(first.as_str()).unwrap();
        assert_eq!(session.current_campaign().unwrap().name, "Strahd");
        assert!(matches!(session.select("nope"), Err(TrackerError::NotFound { .. })));
    }

    #[test]
    fn test_export_then_import_into_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        session.create_campaign("Strahd").unwrap();
        let export_path = dir.path().join("backup").join("export.json");
        session.export_to(&export_path).unwrap();

        let other = tempfile::tempdir().unwrap();
        let mut fresh = session_in(&other);
        fresh.import_from(&export_path).unwrap();
        assert_eq!(fresh.current_campaign().unwrap().name, "Strahd");
        // Imported state is saved as the primary data file
        assert_eq!(persistence::load(fresh.data_path()).campaigns.len(), 1);

        let missing = other.path().join("missing.json");
        assert!(matches!(fresh.import_from(&missing), Err(TrackerError::ImportMissing(_))));
        assert_eq!(fresh.campaigns().count(), 1);
    }

    #[test]
    fn test_failed_save_keeps_in_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        // The data path is a directory, so every write fails
        let mut session = CampaignSession::open(dir.path());
        let err = session.create_campaign("Strahd").unwrap_err();
        assert!(matches!(err, TrackerError::Save { .. }));
        assert_eq!(session.campaigns().count(), 1);
    }
}
