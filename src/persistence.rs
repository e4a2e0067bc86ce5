//! Reading and writing the campaign data file
//!
//! The whole `ApplicationData` tree is written as one pretty-printed JSON
//! document. Loading never fails: anything short of a readable, parseable
//! document yields an empty state.

use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::constants::data::{BACKUP_STAMP_FORMAT, INDENT, SCHEMA_VERSION};
use crate::error::PersistError;
use crate::models::{ApplicationData, lenient};

/// Save the full state, logging instead of propagating failures.
/// Returns whether the file was written.
pub fn save(state: &ApplicationData, path: &Path) -> bool {
    match try_save(state, path) {
        Ok(()) => true,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to save campaign data");
            false
        }
    }
}

/// Serialize and atomically replace the file at `path`
pub fn try_save(state: &ApplicationData, path: &Path) -> Result<(), PersistError> {
    let contents = to_pretty_json(state)?;
    write_atomically(path, &contents)?;
    info!(path = %path.display(), campaigns = state.campaigns.len(), "Saved campaign data");
    Ok(())
}

/// Load the state at `path`, falling back to an empty state on any failure.
/// A file that exists but cannot be used is copied aside first so the next
/// save cannot destroy it.
pub fn load(path: &Path) -> ApplicationData {
    if !path.exists() {
        info!(path = %path.display(), "Data file not found, starting with empty state");
        return ApplicationData::default();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read data file, starting with empty state");
            back_up(path);
            return ApplicationData::default();
        }
    };

    if contents.trim().is_empty() {
        warn!(path = %path.display(), "Data file is empty, starting with empty state");
        return ApplicationData::default();
    }

    let decoded = serde_json::from_str::<Value>(&contents).and_then(|mut value| {
        lenient::strip_nulls(&mut value);
        serde_json::from_value::<ApplicationData>(value)
    });
    match decoded {
        Ok(mut data) => {
            if data.schema_version > SCHEMA_VERSION {
                back_up(path);
            }
            upgrade_schema(&mut data);
            info!(path = %path.display(), campaigns = data.campaigns.len(), "Loaded campaign data");
            data
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Data file is corrupted, starting with empty state");
            back_up(path);
            ApplicationData::default()
        }
    }
}

/// Copy `path` to a timestamped sibling (`data.json.bak-20260101-120000`)
fn back_up(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    let stamp = Local::now().format(BACKUP_STAMP_FORMAT);
    let backup = path.with_file_name(format!("{file_name}.bak-{stamp}"));
    match fs::copy(path, &backup) {
        Ok(_) => {
            warn!(path = %path.display(), backup = %backup.display(), "Kept a copy of the unusable data file");
            Some(backup)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to back up data file");
            None
        }
    }
}

fn upgrade_schema(data: &mut ApplicationData) {
    match data.schema_version.cmp(&SCHEMA_VERSION) {
        Ordering::Less => {
            info!(from = data.schema_version, to = SCHEMA_VERSION, "Upgrading data file schema");
        }
        Ordering::Greater => {
            warn!(
                found = data.schema_version,
                supported = SCHEMA_VERSION,
                "Data file was written by a newer version; unknown fields will be dropped on save"
            );
        }
        Ordering::Equal => {}
    }
    data.schema_version = SCHEMA_VERSION;
}

fn to_pretty_json(state: &ApplicationData) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    state.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write to a sibling temp file, fsync, then rename over the destination
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "campaign-data.json".to_string());
    let tmp_path = dir.join(format!(".{file_name}.tmp-{}", std::process::id()));

    let result = (|| -> std::io::Result<()> {
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(contents)?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;

    fn sample_state() -> ApplicationData {
        let mut campaign = Campaign::new(EntryId::from("campaign1"), "Curse of Strahd");
        campaign.dm_name_global = "Test DM".to_string();

        let ge = GameExpectationsEntry {
            entry_id: EntryId::from("ge_00000001"),
            player_name: "Alice".to_string(),
            game_theme_flavor: "<p>Gothic <b>Horror</b></p>".to_string(),
            sensitive_elements: vec![SensitiveElement {
                name: "Spiders".to_string(),
                hard_limit: true,
                soft_limit: false,
            }],
            ..GameExpectationsEntry::default()
        };
        campaign.game_expectations.insert(ge.entry_id.clone(), ge);

        let plan = TravelPlanEntry {
            entry_id: EntryId::from("tp_00000001"),
            journey_name: "To the Woods".to_string(),
            stages: vec![
                TravelStage {
                    stage_id: EntryId::from("ts_00000001"),
                    stage_number_id: "1".to_string(),
                    start_location: "Village A".to_string(),
                    end_location: "Forest B".to_string(),
                    pace: Pace::Fast,
                    travel_time_value: 6,
                    travel_time_unit: TimeUnit::Hours,
                    ..TravelStage::default()
                },
                TravelStage {
                    stage_id: EntryId::from("ts_00000002"),
                    start_location: "Forest B".to_string(),
                    end_location: "Tower C".to_string(),
                    ..TravelStage::default()
                },
            ],
            ..TravelPlanEntry::default()
        };
        campaign.travel_plans.insert(plan.entry_id.clone(), plan);

        for (id, name) in [("npc_0000000b", "Ismark Kolyanovich"), ("npc_0000000a", "Ireena")] {
            let npc = NpcEntry {
                entry_id: EntryId::from(id),
                name: name.to_string(),
                alignment: "LG".to_string(),
                ..NpcEntry::default()
            };
            campaign.npcs.insert(npc.entry_id.clone(), npc);
        }

        let settlement = SettlementEntry {
            entry_id: EntryId::from("set_00000001"),
            name: "Barovia Village".to_string(),
            size: SettlementSize::Town,
            ..SettlementEntry::default()
        };
        campaign.settlements.insert(settlement.entry_id.clone(), settlement);

        let journal = CampaignJournalEntry {
            entry_id: EntryId::from("cj_00000001"),
            session_number: 1,
            session_date: "2024-10-31".to_string(),
            session_title: "Arrival in Barovia".to_string(),
            ..CampaignJournalEntry::default()
        };
        campaign.campaign_journal.insert(journal.entry_id.clone(), journal);

        let pc = DmCharacterEntry {
            entry_id: EntryId::from("dmc_00000001"),
            character_name: "Ezmerelda".to_string(),
            player_motivations: vec![PlayerMotivation::ProblemSolving, PlayerMotivation::Fighting],
            level: 5,
            ..DmCharacterEntry::default()
        };
        campaign.dm_characters.insert(pc.entry_id.clone(), pc);

        campaign.campaign_conflicts.conflicts.push(Conflict {
            conflict_id: EntryId::from("conf_00000001"),
            title_identifier: "Strahd's Domination".to_string(),
            antagonist_situation: "Count Strahd von Zarovich".to_string(),
            notes: String::new(),
        });
        campaign
            .magic_item_tracker
            .level_tier_1_4
            .common_items
            .push("Potion of Healing".to_string());

        let bastion = BastionEntry {
            entry_id: EntryId::from("bas_00000001"),
            bastion_name: "Old Mill".to_string(),
            level: 5,
            special_facilities: vec![BastionFacility {
                facility_id: EntryId::from("bf_00000001"),
                facility_type_name: "Library".to_string(),
                space: "Roomy".to_string(),
                ..BastionFacility::default()
            }],
            ..BastionEntry::default()
        };
        campaign.bastions.insert(bastion.entry_id.clone(), bastion);

        let mut state = ApplicationData {
            active_campaign_id: "campaign1".to_string(),
            ..ApplicationData::default()
        };
        state.campaigns.insert(campaign.campaign_id.clone(), campaign);
        state
    }

    #[test]
    fn test_round_trip_preserves_every_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let state = sample_state();

        assert!(save(&state, &path));
        let loaded = load(&path);
        assert_eq!(loaded, state);

        let npc_keys: Vec<&str> = loaded.campaigns["campaign1"].npcs.keys().map(EntryId::as_str).collect();
        assert_eq!(npc_keys, vec!["npc_0000000b", "npc_0000000a"]);
    }

    #[test]
    fn test_resave_of_loaded_document_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");

        assert!(save(&sample_state(), &first));
        assert!(save(&load(&first), &second));
        assert_eq!(fs::read_to_string(&first).unwrap(), fs::read_to_string(&second).unwrap());
    }

    #[test]
    fn test_output_is_indented_and_keyed_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        assert!(save(&sample_state(), &path));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"schema_version\": 1,"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["campaigns"]["campaign1"]["npcs"]["npc_0000000b"]["entry_id"], "npc_0000000b");
        assert_eq!(
            value["campaigns"]["campaign1"]["travel_plans"]["tp_00000001"]["stages"][1]["stage_id"],
            "ts_00000002"
        );
    }

    #[test]
    fn test_missing_file_gives_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(&dir.path().join("absent.json"));
        assert!(loaded.campaigns.is_empty());
        assert_eq!(loaded.active_campaign_id, "");
    }

    #[test]
    fn test_malformed_and_empty_files_give_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in [
            ("broken.json", "{\"campaigns\": {"),
            ("empty.json", ""),
            ("blank.json", "  \n\t"),
            ("array.json", "[1, 2, 3]"),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, contents).unwrap();
            assert_eq!(load(&path), ApplicationData::default(), "{name}");
        }
    }

    #[test]
    fn test_one_bad_record_does_not_abort_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{
                "campaigns": {
                    "c1": {
                        "campaign_id": "c1",
                        "name": "Strahd",
                        "npcs": {
                            "npc_good": {"entry_id": "npc_good", "name": "Ismark"},
                            "npc_bad": {"entry_id": "npc_bad", "name": ["not", "a", "string"]}
                        },
                        "campaign_journal": {"cj_1": {"session_number": "three"}},
                        "magic_item_tracker": null
                    }
                },
                "active_campaign_id": "c1"
            }"#,
        )
        .unwrap();

        let loaded = load(&path);
        let campaign = &loaded.campaigns["c1"];
        assert_eq!(campaign.npcs["npc_good"].name, "Ismark");
        assert_eq!(campaign.npcs["npc_bad"], NpcEntry {
            entry_id: EntryId::from("npc_bad"),
            ..NpcEntry::default()
        });
        assert_eq!(campaign.campaign_journal["cj_1"].entry_id, EntryId::from("cj_1"));
        assert_eq!(campaign.magic_item_tracker, MagicItemTracker::default());
        assert_eq!(loaded.active_campaign_id, "c1");
    }

    fn backups(dir: &Path, file_name: &str) -> Vec<PathBuf> {
        let prefix = format!("{file_name}.bak-");
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .map(|e| e.path())
            .collect()
    }

    #[test]
    fn test_null_scalars_keep_the_rest_of_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{
                "schema_version": null,
                "campaigns": {
                    "c1": {
                        "name": "Strahd",
                        "dm_name_global": null,
                        "npcs": {"npc_1": {"name": "Ismark", "secret": null}}
                    }
                },
                "active_campaign_id": null
            }"#,
        )
        .unwrap();

        let loaded = load(&path);
        let campaign = &loaded.campaigns["c1"];
        assert_eq!(campaign.name, "Strahd");
        assert_eq!(campaign.dm_name_global, "");
        assert_eq!(campaign.npcs["npc_1"].name, "Ismark");
        assert_eq!(campaign.npcs["npc_1"].secret, "");
        assert_eq!(loaded.active_campaign_id, "");
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_corrupt_file_is_copied_aside_before_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{\"campaigns\": {").unwrap();

        assert_eq!(load(&path), ApplicationData::default());
        let copies = backups(dir.path(), "data.json");
        assert_eq!(copies.len(), 1);
        assert_eq!(fs::read_to_string(&copies[0]).unwrap(), "{\"campaigns\": {");

        // A readable file is left alone
        assert!(save(&sample_state(), &path));
        load(&path);
        assert_eq!(backups(dir.path(), "data.json").len(), 1);
    }

    #[test]
    fn test_newer_schema_file_is_copied_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json");
        fs::write(&path, r#"{"schema_version": 99, "campaigns": {}, "future_field": true}"#).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        let copies = backups(dir.path(), "future.json");
        assert_eq!(copies.len(), 1);
        assert!(fs::read_to_string(&copies[0]).unwrap().contains("future_field"));
    }

    #[test]
    fn test_legacy_document_is_upgraded_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        fs::write(&path, r#"{"campaigns": {}, "active_campaign_id": ""}"#).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_save_failure_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        // Destination is an existing directory: the rename cannot replace it
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();

        assert!(!save(&sample_state(), &target));
        assert!(try_save(&sample_state(), &target).is_err());
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_save_creates_parent_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("data.json");

        assert!(save(&sample_state(), &path));
        assert!(save(&ApplicationData::default(), &path));
        assert!(load(&path).campaigns.is_empty());
    }
}
