//! Gemeinsame Datentypen fuer FriendlyChat
//!
//! Das Nachrichtenmodell wird unveraendert in der entfernten Sammlung
//! abgelegt. Die Feldnamen (`text`, `senderName`, `photoUrl`) sind das
//! einzige Wire-Format, das der Client vorgibt.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FriendlyError, Result};

/// Platzhalter-Benutzername solange niemand angemeldet ist
pub const ANONYM: &str = "anonymous";

// ---------------------------------------------------------------------------
// ChatNachricht
// ---------------------------------------------------------------------------

/// Eine Chat-Nachricht: entweder Text oder Foto, nie beides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatNachricht {
    pub text: Option<String>,
    pub sender_name: String,
    pub photo_url: Option<String>,
}

impl ChatNachricht {
    /// Erstellt eine Textnachricht
    pub fn text(text: impl Into<String>, sender_name: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            sender_name: sender_name.into(),
            photo_url: None,
        }
    }

    /// Erstellt eine Fotonachricht mit dem Download-Locator des Objektspeichers
    pub fn foto(photo_url: impl Into<String>, sender_name: impl Into<String>) -> Self {
        Self {
            text: None,
            sender_name: sender_name.into(),
            photo_url: Some(photo_url.into()),
        }
    }

    /// Gibt true zurueck wenn die Nachricht ein Foto traegt
    pub fn ist_foto(&self) -> bool {
        self.photo_url.is_some()
    }

    /// Prueft, dass genau eines von `text` und `photo_url` gesetzt ist
    pub fn pruefen(&self) -> Result<()> {
        match (&self.text, &self.photo_url) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (Some(_), Some(_)) => Err(FriendlyError::UngueltigeNachricht(
                "Text und Foto gleichzeitig gesetzt".into(),
            )),
            (None, None) => Err(FriendlyError::UngueltigeNachricht(
                "Weder Text noch Foto gesetzt".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// NachrichtId
// ---------------------------------------------------------------------------

/// Vom Server vergebener Schluessel eines Sammlungseintrags
///
/// Schluessel sind lexikographisch in Einfuegereihenfolge sortiert.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NachrichtId(pub String);

impl NachrichtId {
    /// Baut einen Schluessel aus Millisekunden-Zeitstempel und Zaehler
    pub fn aus_zeit_und_zaehler(millis: i64, zaehler: u64) -> Self {
        Self(format!("{:013}-{:010}", millis.max(0), zaehler))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NachrichtId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "msg:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AboId
// ---------------------------------------------------------------------------

/// Handle eines Sammlungs-Abonnements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AboId(pub Uuid);

impl AboId {
    /// Erstellt eine neue zufaellige AboId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AboId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AboId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "abo:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Angemeldete Identitaet, wie sie der Auth-Anbieter meldet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benutzer {
    pub uid: String,
    pub anzeigename: Option<String>,
}

impl Benutzer {
    pub fn neu(uid: impl Into<String>, anzeigename: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            anzeigename: Some(anzeigename.into()),
        }
    }

    /// Anzeigename oder der Platzhalter, falls der Anbieter keinen liefert
    pub fn name(&self) -> &str {
        self.anzeigename.as_deref().unwrap_or(ANONYM)
    }
}
