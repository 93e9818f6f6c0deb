//! Core game logic for Vibe Coach.
//!
//! This crate owns the stateful side of the coach: the navigation state
//! machine, the conversation engine with its unlock economy, the end-of-session
//! summary, and the embedded content tables. It performs no IO of its own; the
//! model is reached through [`vibe_types::ReplyService`] and the tutorial flag
//! through [`TutorialFlag`].

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

pub mod content;
pub mod conversation;
mod roll;
pub mod session;
mod summary;
pub mod tutorial;

pub use content::{ContentError, ContentStore, DEFEAT_VERDICTS};
pub use conversation::{
    Conversation, ConversationError, FEEDBACK_UNLOCK_COST, FinalCall, GameResult, PendingTurn,
    SubmitRejection, SuggestionUnlock, TurnReport,
};
pub use roll::{ROLL_FRAMES, ROLL_TICK, Roll};
pub use session::{NavigationError, Session, View};
pub use summary::{Archetype, ArchetypeProfile, SessionSummary, TraitAxes};
pub use tutorial::{FlagStoreError, MemoryFlag, TutorialFlag, TutorialPrompt};
