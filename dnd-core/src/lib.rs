//! Client core for the D&D character and campaign manager.
//!
//! This crate provides:
//! - 4d6-drop-lowest ability rolls and the score/modifier rules
//! - The class, race and background catalogs with derived combat stats
//! - A five-step character creation wizard with a bounded save
//! - An edit form for stored characters
//! - An injectable auth session context with periodic re-validation
//! - The campaign chat thread relayed to the Dungeon Master backend
//!
//! # Quick Start
//!
//! ```ignore
//! use dnd_core::{CharacterWizard, ClientConfig};
//! use dnd_core::catalog::{Background, CharacterClass, RaceType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let client = config.client(None)?;
//!
//!     let mut wizard = CharacterWizard::new();
//!     wizard.set_name("Thorin");
//!     wizard.next();
//!     wizard.select_race(RaceType::Dwarf);
//!     wizard.next();
//!     wizard.select_class(CharacterClass::Fighter);
//!     wizard.next();
//!     wizard.select_background(Background::Soldier);
//!     wizard.roll_stats();
//!     wizard.next();
//!
//!     let character = wizard.save(&client, config.save_timeout).await?;
//!     println!("Saved {}", character.id);
//!     Ok(())
//! }
//! ```

pub mod abilities;
pub mod campaign;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod derived;
pub mod dice;
pub mod edit;
mod inflight;
pub mod session;
pub mod store;
pub mod testing;
pub mod wizard;

pub use abilities::{modifier, Ability, AbilityScores};
pub use campaign::{campaign_from_detail, seed_chat_history, CampaignError};
pub use catalog::{hit_die_for, Background, CharacterClass, RaceType};
pub use chat::{ChatError, ChatMessage, ChatThread, Speaker};
pub use config::{ClientConfig, ConfigError};
pub use derived::DerivedCombatStats;
pub use dice::{roll_4d6_drop_lowest, roll_ability_scores, DieType};
pub use edit::{CharacterEdit, EditError};
pub use session::{AuthError, AuthEvent, AuthProvider, AuthState, SessionContext};
pub use store::{CampaignStore, CharacterStore, ChatRelay};
pub use wizard::{CharacterWizard, CreationStep, SaveError};
