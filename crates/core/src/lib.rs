//! friendlychat-core – Gemeinsame Typen, Ereignisse und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die Controller, Backends und
//! Frontend gemeinsam nutzen: das Nachrichtenmodell, Sammlungs-Ereignisse
//! und den globalen Fehlertyp.

pub mod error;
pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{FriendlyError, Result};
pub use event::KindEreignis;
pub use types::{AboId, Benutzer, ChatNachricht, NachrichtId, ANONYM};
