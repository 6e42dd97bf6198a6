//! Backend-Traits fuer die entfernten Dienste
//!
//! Der Controller haelt jeden Dienst als `Arc<dyn ...>`-Handle. Konkrete
//! Implementierungen (gehostete SDKs, lokale Speicher) werden beim Start
//! injiziert, es gibt keine globalen Instanzen.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use friendlychat_core::{AboId, Benutzer, ChatNachricht, KindEreignis, NachrichtId};

use crate::error::ChatResult;

/// Geordnete, nur anhaengbare Nachrichtensammlung
#[async_trait]
pub trait NachrichtenSammlung: Send + Sync {
    /// Nachricht unter einem neu vergebenen Schluessel anhaengen
    async fn anhaengen(&self, nachricht: &ChatNachricht) -> ChatResult<NachrichtId>;

    /// Kind-Ereignisse abonnieren
    ///
    /// Bestehende Eintraege werden zuerst in Schluesselreihenfolge als
    /// `Hinzugefuegt` geliefert, danach jeder neue Eintrag.
    fn abonnieren(&self) -> (AboId, mpsc::UnboundedReceiver<KindEreignis>);

    /// Abonnement beenden. Unbekannte Ids werden ignoriert.
    fn abbestellen(&self, abo: AboId);
}

/// Objektspeicher fuer hochgeladene Binaerdaten
#[async_trait]
pub trait ObjektSpeicher: Send + Sync {
    /// Daten unter `pfad` ablegen und den Download-Locator zurueckgeben
    async fn hochladen(&self, pfad: &str, daten: &[u8]) -> ChatResult<String>;

    /// Daten laden
    async fn herunterladen(&self, pfad: &str) -> ChatResult<Vec<u8>>;

    /// Objekt loeschen
    async fn loeschen(&self, pfad: &str) -> ChatResult<()>;
}

/// Quelle fuer Remote-Config-Werte
#[async_trait]
pub trait ConfigQuelle: Send + Sync {
    /// Alle Werte vom Server laden
    async fn abrufen(&self) -> ChatResult<HashMap<String, String>>;
}

/// Authentifizierungs-Anbieter
///
/// Der eigentliche Anmeldeablauf liegt ausserhalb des Clients; hier kommt
/// nur der resultierende Zustand an.
pub trait AuthAnbieter: Send + Sync {
    /// Aktuellen und zukuenftigen Anmeldezustand beobachten
    fn beobachten(&self) -> watch::Receiver<Option<Benutzer>>;

    /// Aktuellen Benutzer abmelden
    fn abmelden(&self);
}
