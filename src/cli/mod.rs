//! Command-line front end
//!
//! Tracker commands work on the selected campaign. Every run that touches the
//! campaign data ends with the session close, which records the selection as
//! the active campaign and performs the final save.
//!
//! Listings print `id<TAB>label` lines; `show` prints the record as JSON.

mod fields;
mod prompt;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use crate::config::Settings;
use crate::error::TrackerError;
use crate::models::{
    BastionEntry, BastionFacility, Conflict, Identified, LevelTier, Rarity, SensitiveElement, TravelPlanEntry,
    TravelStage,
};
use crate::session::{CampaignSession, Confirm, DeleteOutcome};
use crate::trackers::{
    BastionTracker, CharacterTracker, ExpectationsTracker, JournalTracker, KeyedTracker, NpcTracker, Record,
    SettlementTracker, TravelTracker, conflicts, keyed, magic_items, nested,
};
use fields::Assignment;
use prompt::PromptConfirm;

#[derive(Parser)]
#[command(name = "campaign-ledger")]
#[command(about = "Campaign notes for tabletop RPG game masters")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Campaign data file (overrides the settings file)
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,
}

/// The keyed trackers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrackerKind {
    Expectations,
    Travel,
    Npcs,
    Settlements,
    Journal,
    Characters,
    Bastions,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create, select and delete campaigns
    Campaign {
        #[command(subcommand)]
        action: CampaignAction,
    },
    /// List a tracker's records
    List { tracker: TrackerKind },
    /// Print one record as JSON
    Show { tracker: TrackerKind, id: String },
    /// Create a record
    Add {
        tracker: TrackerKind,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<Assignment>,
    },
    /// Change fields of a record
    Edit {
        tracker: TrackerKind,
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<Assignment>,
    },
    /// Delete a record
    Delete { tracker: TrackerKind, id: String },
    /// Campaign conflicts
    Conflict {
        #[command(subcommand)]
        action: ConflictAction,
    },
    /// Magic item lists by level tier and rarity
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Stages of a travel plan
    Stage {
        #[command(subcommand)]
        action: StageAction,
    },
    /// Special facilities of a bastion
    Facility {
        #[command(subcommand)]
        action: FacilityAction,
    },
    /// Sensitive elements (lines and veils) of a game expectations entry
    Limit {
        #[command(subcommand)]
        action: LimitAction,
    },
    /// Journal helpers
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },
    /// Write all campaign data to a file
    Export { path: PathBuf },
    /// Replace all campaign data with the contents of a file
    Import { path: PathBuf },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum CampaignAction {
    List,
    Create { name: String },
    Select { id: String },
    /// Delete the selected campaign
    Delete,
    /// Print the selected campaign as JSON
    Show,
}

#[derive(Subcommand)]
pub enum ConflictAction {
    List,
    Add {
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<Assignment>,
    },
    Edit {
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<Assignment>,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ItemAction {
    List {
        #[arg(long)]
        tier: Option<LevelTier>,
        #[arg(long)]
        rarity: Option<Rarity>,
    },
    Add { tier: LevelTier, rarity: Rarity, name: String },
    Remove { tier: LevelTier, rarity: Rarity, name: String },
}

#[derive(Subcommand)]
pub enum StageAction {
    Add {
        plan: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<Assignment>,
    },
    Edit {
        plan: String,
        stage: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<Assignment>,
    },
    Remove { plan: String, stage: String },
}

#[derive(Subcommand)]
pub enum FacilityAction {
    Add {
        bastion: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<Assignment>,
    },
    Edit {
        bastion: String,
        facility: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<Assignment>,
    },
    Remove { bastion: String, facility: String },
}

#[derive(Subcommand)]
pub enum LimitAction {
    Add {
        entry: String,
        name: String,
        /// Never appears in the game
        #[arg(long)]
        hard: bool,
        /// Happens off-screen only
        #[arg(long)]
        soft: bool,
    },
    Remove { entry: String, name: String },
}

#[derive(Subcommand)]
pub enum JournalAction {
    /// Print the number the next session should get
    NextSession,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    SetDataFile { path: PathBuf },
}

/// Run one parsed command line
pub fn run(cli: Cli, settings: Settings) -> Result<()> {
    let Cli { command, data, yes } = cli;
    let command = match command {
        Commands::Config { action } => return run_config(action, settings),
        command => command,
    };

    let mut session = CampaignSession::open(settings.resolve_data_path(data));
    let mut confirm = PromptConfirm::new(yes);
    let outcome = dispatch(&mut session, command, &mut confirm);
    let closed = session.close().context("Failed to save campaign data on exit");
    outcome.and(closed)
}

macro_rules! with_tracker {
    ($kind:expr, $func:ident($($arg:expr),*)) => {
        match $kind {
            TrackerKind::Expectations => $func::<ExpectationsTracker>($($arg),*),
            TrackerKind::Travel => $func::<TravelTracker>($($arg),*),
            TrackerKind::Npcs => $func::<NpcTracker>($($arg),*),
            TrackerKind::Settlements => $func::<SettlementTracker>($($arg),*),
            TrackerKind::Journal => $func::<JournalTracker>($($arg),*),
            TrackerKind::Characters => $func::<CharacterTracker>($($arg),*),
            TrackerKind::Bastions => $func::<BastionTracker>($($arg),*),
        }
    };
}

fn dispatch(session: &mut CampaignSession, command: Commands, confirm: &mut dyn Confirm) -> Result<()> {
    match command {
        Commands::Campaign { action } => campaign(session, action, confirm),
        Commands::List { tracker } => with_tracker!(tracker, list_records(session)),
        Commands::Show { tracker, id } => with_tracker!(tracker, show_record(session, &id)),
        Commands::Add { tracker, sets } => with_tracker!(tracker, add_record(session, &sets)),
        Commands::Edit { tracker, id, sets } => with_tracker!(tracker, edit_record(session, &id, &sets)),
        Commands::Delete { tracker, id } => with_tracker!(tracker, delete_record(session, &id, confirm)),
        Commands::Conflict { action } => conflict(session, action, confirm),
        Commands::Item { action } => item(session, action, confirm),
        Commands::Stage { action } => stage(session, action, confirm),
        Commands::Facility { action } => facility(session, action, confirm),
        Commands::Limit { action } => limit(session, action),
        Commands::Journal { action: JournalAction::NextSession } => {
            println!("{}", nested::next_session_number(session.current_campaign()?));
            Ok(())
        }
        Commands::Export { path } => {
            session.export_to(&path)?;
            println!("Exported campaign data to {}", path.display());
            Ok(())
        }
        Commands::Import { path } => {
            session.import_from(&path)?;
            println!("Imported {} campaign(s) from {}", session.campaigns().count(), path.display());
            Ok(())
        }
        // Handled before the session opens
        Commands::Config { .. } => Ok(()),
    }
}

fn report(outcome: DeleteOutcome, kind: &str, id: &str) {
    match outcome {
        DeleteOutcome::Removed => println!("Deleted {kind} {id}"),
        DeleteOutcome::Declined => println!("Cancelled"),
        DeleteOutcome::NotFound => println!("{kind} {id} was already removed"),
    }
}

fn report_removed(removed: bool, kind: &str, id: &str) {
    report(if removed { DeleteOutcome::Removed } else { DeleteOutcome::NotFound }, kind, id);
}

// ==============================================================================
// Keyed trackers
// ==============================================================================

fn list_records<T: KeyedTracker>(session: &CampaignSession) -> Result<()> {
    for entry in keyed::list::<T>(session.current_campaign()?) {
        println!("{}\t{}", entry.id(), entry.label());
    }
    Ok(())
}

fn show_record<T: KeyedTracker>(session: &CampaignSession, id: &str) -> Result<()> {
    let entry = keyed::get::<T>(session.current_campaign()?, id)
        .ok_or_else(|| TrackerError::not_found(<T::Entry as Record>::KIND, id))?;
    println!("{}", serde_json::to_string_pretty(entry)?);
    Ok(())
}

fn add_record<T: KeyedTracker>(session: &mut CampaignSession, sets: &[Assignment]) -> Result<()> {
    let template = T::new_draft(session.current_campaign()?);
    let draft = fields::apply(&template, sets)?;
    let id = session.add::<T>(draft)?;
    println!("{id}");
    Ok(())
}

fn edit_record<T: KeyedTracker>(session: &mut CampaignSession, id: &str, sets: &[Assignment]) -> Result<()> {
    let current = keyed::get::<T>(session.current_campaign()?, id)
        .cloned()
        .ok_or_else(|| TrackerError::not_found(<T::Entry as Record>::KIND, id))?;
    let draft = fields::apply(&current, sets)?;
    session.edit::<T>(id, draft)?;
    println!("Updated {id}");
    Ok(())
}

fn delete_record<T: KeyedTracker>(session: &mut CampaignSession, id: &str, confirm: &mut dyn Confirm) -> Result<()> {
    let outcome = session.delete::<T>(id, confirm)?;
    report(outcome, <T::Entry as Record>::KIND, id);
    Ok(())
}

// ==============================================================================
// Campaigns and settings
// ==============================================================================

fn campaign(session: &mut CampaignSession, action: CampaignAction, confirm: &mut dyn Confirm) -> Result<()> {
    match action {
        CampaignAction::List => {
            let selected = session.selection().id().cloned();
            for campaign in session.campaigns() {
                let marker = if selected.as_ref() == Some(&campaign.campaign_id) { '*' } else { ' ' };
                println!("{marker} {}\t{}", campaign.campaign_id, campaign.name);
            }
        }
        CampaignAction::Create { name } => {
            let id = session.create_campaign(&name)?;
            println!("{id}");
        }
        CampaignAction::Select { id } => {
            session.select(&id)?;
            println!("Selected {id}");
        }
        CampaignAction::Delete => {
            let id = session.current_campaign()?.campaign_id.clone();
            let outcome = session.delete_current_campaign(confirm)?;
            report(outcome, "campaign", id.as_str());
        }
        CampaignAction::Show => {
            println!("{}", serde_json::to_string_pretty(session.current_campaign()?)?);
        }
    }
    Ok(())
}

fn run_config(action: ConfigAction, mut settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", Settings::path().display());
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigAction::SetDataFile { path } => {
            info!(path = %path.display(), "Changing data file");
            settings.data_file = Some(path);
            settings.save()?;
            println!("Data file set; takes effect on the next run");
        }
    }
    Ok(())
}

// ==============================================================================
// Conflicts, magic items, nested lists
// ==============================================================================

fn conflict(session: &mut CampaignSession, action: ConflictAction, confirm: &mut dyn Confirm) -> Result<()> {
    match action {
        ConflictAction::List => {
            for conflict in conflicts::list(session.current_campaign()?) {
                println!("{}\t{}", conflict.conflict_id, conflict.label());
            }
        }
        ConflictAction::Add { sets } => {
            let draft = fields::apply(&Conflict::default(), &sets)?;
            let id = session.mutate(|campaign, ids| conflicts::add(campaign, draft, ids))?;
            println!("{id}");
        }
        ConflictAction::Edit { id, sets } => {
            let current = conflicts::get(session.current_campaign()?, &id)
                .cloned()
                .ok_or_else(|| TrackerError::not_found(Conflict::KIND, id.as_str()))?;
            let draft = fields::apply(&current, &sets)?;
            session.mutate(|campaign, _| conflicts::edit(campaign, &id, draft))?;
            println!("Updated {id}");
        }
        ConflictAction::Delete { id } => {
            let outcome = session.delete_conflict(&id, confirm)?;
            report(outcome, Conflict::KIND, &id);
        }
    }
    Ok(())
}

fn item(session: &mut CampaignSession, action: ItemAction, confirm: &mut dyn Confirm) -> Result<()> {
    match action {
        ItemAction::List { tier, rarity } => {
            let campaign = session.current_campaign()?;
            let tiers = LevelTier::ALL.into_iter().filter(|t| tier.is_none_or(|wanted| wanted == *t));
            for t in tiers {
                for r in Rarity::ALL.into_iter().filter(|r| rarity.is_none_or(|wanted| wanted == *r)) {
                    for name in magic_items::list(campaign, t, r) {
                        println!("{t}\t{r}\t{name}");
                    }
                }
            }
        }
        ItemAction::Add { tier, rarity, name } => {
            let stored = session.mutate(|campaign, _| magic_items::add(campaign, tier, rarity, &name))?;
            println!("Added '{stored}' to {tier} / {rarity}");
        }
        ItemAction::Remove { tier, rarity, name } => {
            let outcome = session.remove_item(tier, rarity, &name, confirm)?;
            report(outcome, "Magic item", &name);
        }
    }
    Ok(())
}

fn stage(session: &mut CampaignSession, action: StageAction, confirm: &mut dyn Confirm) -> Result<()> {
    match action {
        StageAction::Add { plan, sets } => {
            let draft = fields::apply(&TravelStage::default(), &sets)?;
            let id = session.mutate(|campaign, ids| nested::add_stage(campaign, &plan, draft, ids))?;
            println!("{id}");
        }
        StageAction::Edit { plan, stage, sets } => {
            let current = session
                .current_campaign()?
                .travel_plans
                .get(plan.as_str())
                .ok_or_else(|| TrackerError::not_found(TravelPlanEntry::KIND, plan.as_str()))?
                .stages
                .iter()
                .find(|s| s.stage_id.as_str() == stage)
                .cloned()
                .ok_or_else(|| TrackerError::not_found(TravelStage::KIND, stage.as_str()))?;
            let draft = fields::apply(&current, &sets)?;
            session.mutate(|campaign, _| nested::edit_stage(campaign, &plan, &stage, draft))?;
            println!("Updated {stage}");
        }
        StageAction::Remove { plan, stage } => {
            let outcome = session.remove_stage(&plan, &stage, confirm)?;
            report(outcome, TravelStage::KIND, &stage);
        }
    }
    Ok(())
}

fn facility(session: &mut CampaignSession, action: FacilityAction, confirm: &mut dyn Confirm) -> Result<()> {
    match action {
        FacilityAction::Add { bastion, sets } => {
            let draft = fields::apply(&BastionFacility::default(), &sets)?;
            let id = session.mutate(|campaign, ids| nested::add_facility(campaign, &bastion, draft, ids))?;
            println!("{id}");
        }
        FacilityAction::Edit { bastion, facility, sets } => {
            let current = session
                .current_campaign()?
                .bastions
                .get(bastion.as_str())
                .ok_or_else(|| TrackerError::not_found(BastionEntry::KIND, bastion.as_str()))?
                .special_facilities
                .iter()
                .find(|f| f.facility_id.as_str() == facility)
                .cloned()
                .ok_or_else(|| TrackerError::not_found(BastionFacility::KIND, facility.as_str()))?;
            let draft = fields::apply(&current, &sets)?;
            session.mutate(|campaign, _| nested::edit_facility(campaign, &bastion, &facility, draft))?;
            println!("Updated {facility}");
        }
        FacilityAction::Remove { bastion, facility } => {
            let outcome = session.remove_facility(&bastion, &facility, confirm)?;
            report(outcome, BastionFacility::KIND, &facility);
        }
    }
    Ok(())
}

fn limit(session: &mut CampaignSession, action: LimitAction) -> Result<()> {
    match action {
        LimitAction::Add { entry, name, hard, soft } => {
            let element = SensitiveElement { name, hard_limit: hard, soft_limit: soft };
            session.mutate(|campaign, _| nested::add_sensitive_element(campaign, &entry, element))?;
            println!("Added sensitive element to {entry}");
        }
        LimitAction::Remove { entry, name } => {
            let removed = session.mutate(|campaign, _| nested::remove_sensitive_element(campaign, &entry, &name))?;
            report_removed(removed, "Sensitive element", &name);
        }
    }
    Ok(())
}
