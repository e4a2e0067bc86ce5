//! Generic CRUD over a campaign's keyed collections
//!
//! Every write goes through here so the stored key always equals the record's
//! own id. Edits replace a record's fields in place and keep its id and
//! position in the collection.

use tracing::{info, warn};

use super::{KeyedTracker, Record};
use crate::error::TrackerError;
use crate::models::{Campaign, EntryId, IdAllocator, Identified};

/// Records in display order
pub fn list<T: KeyedTracker>(campaign: &Campaign) -> Vec<&T::Entry> {
    let mut entries: Vec<&T::Entry> = T::collection(campaign).values().collect();
    T::sort_for_display(&mut entries);
    entries
}

pub fn get<'a, T: KeyedTracker>(campaign: &'a Campaign, id: &str) -> Option<&'a T::Entry> {
    T::collection(campaign).get(id)
}

/// Validate `draft`, give it a fresh id and insert it. Returns the new id.
pub fn add<T: KeyedTracker>(
    campaign: &mut Campaign,
    mut draft: T::Entry,
    ids: &IdAllocator,
) -> Result<EntryId, TrackerError> {
    draft.normalize();
    draft.validate()?;
    draft.assign_child_ids(ids);

    let collection = T::collection_mut(campaign);
    let id = ids.allocate::<T::Entry>(|candidate| collection.contains_key(candidate));
    draft.set_id(id.clone());
    collection.insert(id.clone(), draft);

    info!(kind = <T::Entry as Record>::KIND, id = %id, "Added record");
    Ok(id)
}

/// Replace the fields of record `id` with those of `draft`; the id is kept
pub fn edit<T: KeyedTracker>(
    campaign: &mut Campaign,
    id: &str,
    mut draft: T::Entry,
    ids: &IdAllocator,
) -> Result<(), TrackerError> {
    draft.normalize();
    draft.validate()?;
    draft.assign_child_ids(ids);

    let Some(slot) = T::collection_mut(campaign).get_mut(id) else {
        warn!(kind = <T::Entry as Record>::KIND, id, "Edit target not found");
        return Err(TrackerError::not_found(<T::Entry as Record>::KIND, id));
    };
    draft.set_id(slot.id().clone());
    *slot = draft;

    info!(kind = <T::Entry as Record>::KIND, id, "Updated record");
    Ok(())
}

/// Remove record `id`. Returns `false` (with a warning) when it is already gone.
pub fn delete<T: KeyedTracker>(campaign: &mut Campaign, id: &str, ids: &mut IdAllocator) -> bool {
    // shift_remove keeps the remaining entries in collection order
    match T::collection_mut(campaign).shift_remove_entry(id) {
        Some((key, _)) => {
            info!(kind = <T::Entry as Record>::KIND, id, "Deleted record");
            ids.retire(key);
            true
        }
        None => {
            warn!(kind = <T::Entry as Record>::KIND, id, "Delete target not found or already removed");
            false
        }
    }
}
