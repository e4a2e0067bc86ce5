//! Conflicts live in an ordered list inside the campaign's singular container

use tracing::{info, warn};

use super::Record;
use crate::error::TrackerError;
use crate::models::{Campaign, Conflict, EntryId, IdAllocator, Identified};

pub fn list(campaign: &Campaign) -> &[Conflict] {
    &campaign.campaign_conflicts.conflicts
}

pub fn get<'a>(campaign: &'a Campaign, id: &str) -> Option<&'a Conflict> {
    list(campaign).iter().find(|c| c.conflict_id.as_str() == id)
}

/// Append a new conflict and return its id
pub fn add(campaign: &mut Campaign, mut draft: Conflict, ids: &IdAllocator) -> Result<EntryId, TrackerError> {
    draft.normalize();
    draft.validate()?;

    let conflicts = &mut campaign.campaign_conflicts.conflicts;
    let id = ids.allocate::<Conflict>(|candidate| conflicts.iter().any(|c| &c.conflict_id == candidate));
    draft.set_id(id.clone());
    conflicts.push(draft);

    info!(id = %id, "Added conflict");
    Ok(id)
}

pub fn edit(campaign: &mut Campaign, id: &str, mut draft: Conflict) -> Result<(), TrackerError> {
    draft.normalize();
    draft.validate()?;

    let Some(slot) = position(campaign, id).map(|i| &mut campaign.campaign_conflicts.conflicts[i]) else {
        warn!(id, "Conflict to edit not found");
        return Err(TrackerError::not_found(Conflict::KIND, id));
    };
    draft.conflict_id = slot.conflict_id.clone();
    *slot = draft;

    info!(id, "Updated conflict");
    Ok(())
}

/// Remove conflict `id`; `false` when no conflict carries it
pub fn delete(campaign: &mut Campaign, id: &str, ids: &mut IdAllocator) -> bool {
    match position(campaign, id) {
        Some(index) => {
            let removed = campaign.campaign_conflicts.conflicts.remove(index);
            ids.retire(removed.conflict_id);
            info!(id, "Deleted conflict");
            true
        }
        None => {
            warn!(id, "Conflict to delete not found");
            false
        }
    }
}

fn position(campaign: &Campaign, id: &str) -> Option<usize> {
    list(campaign).iter().position(|c| c.conflict_id.as_str() == id)
}
