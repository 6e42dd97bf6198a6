//! Lokaler Auth-Anbieter
//!
//! Ersetzt den externen Anmeldeablauf: `anmelden` und `abmelden` setzen den
//! Zustand direkt, Beobachter erhalten jede Aenderung ueber einen
//! `watch`-Kanal.

use tokio::sync::watch;
use uuid::Uuid;

use friendlychat_core::Benutzer;

use crate::backend::AuthAnbieter;

/// Auth-Anbieter ohne Identity-Provider
pub struct LokaleAuth {
    zustand: watch::Sender<Option<Benutzer>>,
}

impl LokaleAuth {
    pub fn neu() -> Self {
        let (zustand, _) = watch::channel(None);
        Self { zustand }
    }

    /// Benutzer mit Anzeigename anmelden
    pub fn anmelden(&self, anzeigename: &str) -> Benutzer {
        let benutzer = Benutzer::neu(Uuid::new_v4().to_string(), anzeigename);
        self.zustand.send_replace(Some(benutzer.clone()));
        tracing::info!(uid = %benutzer.uid, name = %anzeigename, "Benutzer angemeldet");
        benutzer
    }

    /// Aktuell angemeldeter Benutzer
    pub fn aktueller_benutzer(&self) -> Option<Benutzer> {
        self.zustand.borrow().clone()
    }
}

impl Default for LokaleAuth {
    fn default() -> Self {
        Self::neu()
    }
}

impl AuthAnbieter for LokaleAuth {
    fn beobachten(&self) -> watch::Receiver<Option<Benutzer>> {
        self.zustand.subscribe()
    }

    fn abmelden(&self) {
        let vorher = self.zustand.send_replace(None);
        if let Some(b) = vorher {
            tracing::info!(uid = %b.uid, "Benutzer abgemeldet");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn anmelden_benachrichtigt_beobachter() {
        let auth = LokaleAuth::neu();
        let mut rx = auth.beobachten();
        assert!(rx.borrow_and_update().is_none());

        auth.anmelden("alice");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().name(), "alice");

        auth.abmelden();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
        assert!(auth.aktueller_benutzer().is_none());
    }

    #[test]
    fn anmelden_ohne_beobachter() {
        let auth = LokaleAuth::neu();
        let b = auth.anmelden("bob");
        assert_eq!(auth.aktueller_benutzer(), Some(b));
    }
}
