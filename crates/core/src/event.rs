//! Ereignisse einer geordneten Nachrichtensammlung
//!
//! Ein Abonnement liefert pro neu angehaengtem Eintrag genau ein
//! `Hinzugefuegt`, in Einfuegereihenfolge. Die uebrigen Varianten existieren,
//! weil Backends sie melden koennen; der Client reagiert nur auf
//! `Hinzugefuegt`.

use serde::{Deserialize, Serialize};

use crate::types::{ChatNachricht, NachrichtId};

/// Kind-Ereignis einer abonnierten Sammlung
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KindEreignis {
    /// Neuer Eintrag am Ende der Sammlung
    Hinzugefuegt {
        id: NachrichtId,
        nachricht: ChatNachricht,
    },
    /// Bestehender Eintrag wurde geaendert
    Geaendert {
        id: NachrichtId,
        nachricht: ChatNachricht,
    },
    /// Eintrag wurde entfernt
    Entfernt { id: NachrichtId },
    /// Eintrag hat seine Position gewechselt
    Verschoben { id: NachrichtId },
    /// Das Backend hat das Abonnement beendet
    Abgebrochen { grund: String },
}

impl KindEreignis {
    /// Kurzname fuer Logging
    pub fn art(&self) -> &'static str {
        match self {
            Self::Hinzugefuegt { .. } => "hinzugefuegt",
            Self::Geaendert { .. } => "geaendert",
            Self::Entfernt { .. } => "entfernt",
            Self::Verschoben { .. } => "verschoben",
            Self::Abgebrochen { .. } => "abgebrochen",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ist_serde_kompatibel() {
        let event = KindEreignis::Hinzugefuegt {
            id: NachrichtId::aus_zeit_und_zaehler(1, 1),
            nachricht: ChatNachricht::text("hi", "alice"),
        };
        let json = serde_json::to_string(&event).unwrap();
        let zurueck: KindEreignis = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, event);
    }

    #[test]
    fn art_fuer_logging() {
        let e = KindEreignis::Entfernt {
            id: NachrichtId("x".into()),
        };
        assert_eq!(e.art(), "entfernt");
    }
}
