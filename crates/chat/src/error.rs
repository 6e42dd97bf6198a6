//! Fehlertypen fuer das Chat-Crate

use thiserror::Error;

/// Chat-Fehlertypen
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Sammlung nicht verfuegbar: {0}")]
    SammlungNichtVerfuegbar(String),

    #[error("Upload fehlgeschlagen: {0}")]
    UploadFehlgeschlagen(String),

    #[error("Objekt nicht gefunden: {0}")]
    ObjektNichtGefunden(String),

    #[error("Ungueltiger Speicherpfad: {0}")]
    UngueltigerPfad(String),

    #[error("Konfiguration konnte nicht abgerufen werden: {0}")]
    ConfigAbruf(String),

    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Kern-Fehler: {0}")]
    Kern(#[from] friendlychat_core::FriendlyError),

    #[error("Serialisierungsfehler: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;
