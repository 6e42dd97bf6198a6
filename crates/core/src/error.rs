//! Fehlertypen fuer FriendlyChat
//!
//! Fehler, die schon auf Ebene des Datenmodells entstehen. Die Backends
//! definieren eigene Fehler und konvertieren via `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer FriendlyChat
pub type Result<T> = std::result::Result<T, FriendlyError>;

/// Fehler des Datenmodells
#[derive(Debug, Error)]
pub enum FriendlyError {
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),
}
