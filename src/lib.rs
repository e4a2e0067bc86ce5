//! campaign-ledger: campaign notes for tabletop RPG game masters
//!
//! The record schema lives in [`models`], JSON persistence in [`persistence`],
//! per-tracker CRUD in [`trackers`] and the selected-campaign workflow in
//! [`session`]. The binary is a thin [`cli`] over these.

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod persistence;
pub mod session;
pub mod trackers;
