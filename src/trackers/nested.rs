//! Child lists edited through their parent record
//!
//! Travel stages belong to a plan, special facilities to a bastion and
//! sensitive elements to a game expectations entry. A missing parent is a
//! `NotFound` for the parent's kind.

use tracing::{info, warn};

use super::Record;
use crate::error::TrackerError;
use crate::models::{
    BastionEntry, BastionFacility, Campaign, EntryId, GameExpectationsEntry, IdAllocator, SensitiveElement,
    TravelPlanEntry, TravelStage,
};

fn parent<'a, P: Record>(
    collection: &'a mut indexmap::IndexMap<EntryId, P>,
    id: &str,
) -> Result<&'a mut P, TrackerError> {
    collection.get_mut(id).ok_or_else(|| {
        warn!(kind = P::KIND, id, "Parent record not found");
        TrackerError::not_found(P::KIND, id)
    })
}

fn add_child<C: Record>(children: &mut Vec<C>, mut draft: C, ids: &IdAllocator) -> Result<EntryId, TrackerError> {
    draft.normalize();
    draft.validate()?;
    let id = ids.allocate::<C>(|candidate| children.iter().any(|c| c.id() == candidate));
    draft.set_id(id.clone());
    children.push(draft);
    info!(kind = C::KIND, id = %id, "Added record");
    Ok(id)
}

fn edit_child<C: Record>(children: &mut [C], id: &str, mut draft: C) -> Result<(), TrackerError> {
    draft.normalize();
    draft.validate()?;
    let Some(slot) = children.iter_mut().find(|c| c.id().as_str() == id) else {
        warn!(kind = C::KIND, id, "Edit target not found");
        return Err(TrackerError::not_found(C::KIND, id));
    };
    draft.set_id(slot.id().clone());
    *slot = draft;
    info!(kind = C::KIND, id, "Updated record");
    Ok(())
}

fn remove_child<C: Record>(children: &mut Vec<C>, id: &str, ids: &mut IdAllocator) -> bool {
    match children.iter().position(|c| c.id().as_str() == id) {
        Some(index) => {
            let removed = children.remove(index);
            ids.retire(removed.id().clone());
            info!(kind = C::KIND, id, "Removed record");
            true
        }
        None => {
            warn!(kind = C::KIND, id, "Remove target not found");
            false
        }
    }
}

// ==============================================================================
// Travel stages
// ==============================================================================

pub fn add_stage(
    campaign: &mut Campaign,
    plan_id: &str,
    draft: TravelStage,
    ids: &IdAllocator,
) -> Result<EntryId, TrackerError> {
    let plan: &mut TravelPlanEntry = parent(&mut campaign.travel_plans, plan_id)?;
    add_child(&mut plan.stages, draft, ids)
}

pub fn edit_stage(campaign: &mut Campaign, plan_id: &str, stage_id: &str, draft: TravelStage) -> Result<(), TrackerError> {
    let plan = parent(&mut campaign.travel_plans, plan_id)?;
    edit_child(&mut plan.stages, stage_id, draft)
}

/// `Ok(false)` when the plan exists but has no such stage
pub fn remove_stage(
    campaign: &mut Campaign,
    plan_id: &str,
    stage_id: &str,
    ids: &mut IdAllocator,
) -> Result<bool, TrackerError> {
    let plan = parent(&mut campaign.travel_plans, plan_id)?;
    Ok(remove_child(&mut plan.stages, stage_id, ids))
}

// ==============================================================================
// Bastion facilities
// ==============================================================================

pub fn add_facility(
    campaign: &mut Campaign,
    bastion_id: &str,
    draft: BastionFacility,
    ids: &IdAllocator,
) -> Result<EntryId, TrackerError> {
    let bastion: &mut BastionEntry = parent(&mut campaign.bastions, bastion_id)?;
    add_child(&mut bastion.special_facilities, draft, ids)
}

pub fn edit_facility(
    campaign: &mut Campaign,
    bastion_id: &str,
    facility_id: &str,
    draft: BastionFacility,
) -> Result<(), TrackerError> {
    let bastion = parent(&mut campaign.bastions, bastion_id)?;
    edit_child(&mut bastion.special_facilities, facility_id, draft)
}

pub fn remove_facility(
    campaign: &mut Campaign,
    bastion_id: &str,
    facility_id: &str,
    ids: &mut IdAllocator,
) -> Result<bool, TrackerError> {
    let bastion = parent(&mut campaign.bastions, bastion_id)?;
    Ok(remove_child(&mut bastion.special_facilities, facility_id, ids))
}

// ==============================================================================
// Sensitive elements
// ==============================================================================

pub fn add_sensitive_element(
    campaign: &mut Campaign,
    entry_id: &str,
    mut element: SensitiveElement,
) -> Result<(), TrackerError> {
    element.name = element.name.trim().to_string();
    if element.name.is_empty() {
        return Err(TrackerError::required("Element name"));
    }
    let entry: &mut GameExpectationsEntry = parent(&mut campaign.game_expectations, entry_id)?;
    info!(id = entry_id, element = %element.name, "Added sensitive element");
    entry.sensitive_elements.push(element);
    Ok(())
}

/// Remove every element named exactly `name`; `Ok(false)` when none matched
pub fn remove_sensitive_element(campaign: &mut Campaign, entry_id: &str, name: &str) -> Result<bool, TrackerError> {
    let entry: &mut GameExpectationsEntry = parent(&mut campaign.game_expectations, entry_id)?;
    let before = entry.sensitive_elements.len();
    entry.sensitive_elements.retain(|element| element.name != name);
    let removed = entry.sensitive_elements.len() != before;
    if !removed {
        warn!(id = entry_id, element = name, "Sensitive element not found");
    }
    Ok(removed)
}

// ==============================================================================
// Journal
// ==============================================================================

/// Suggested number for the next session: one past the highest recorded
pub fn next_session_number(campaign: &Campaign) -> u32 {
    campaign
        .campaign_journal
        .values()
        .map(|entry| entry.session_number)
        .max()
        .map_or(1, |highest| highest.saturating_add(1))
}
