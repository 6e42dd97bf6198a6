//! In-Memory-Nachrichtensammlung
//!
//! Verhaelt sich wie eine gehostete Echtzeit-Datenbank: Eintraege werden
//! als JSON unter zeitbasierten, aufsteigenden Schluesseln abgelegt und an
//! alle Abonnenten verteilt. Anhaengen und Abonnieren laufen unter derselben
//! Sperre, damit kein Abonnent einen Eintrag doppelt oder gar nicht sieht.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use friendlychat_core::{AboId, ChatNachricht, KindEreignis, NachrichtId};

use crate::backend::NachrichtenSammlung;
use crate::error::{ChatError, ChatResult};

/// Geordnete In-Memory-Sammlung mit Abonnenten-Registry
#[derive(Default)]
pub struct SpeicherSammlung {
    inner: Mutex<SammlungInner>,
    /// Aktive Abonnenten, indiziert nach AboId
    abonnenten: DashMap<AboId, mpsc::UnboundedSender<KindEreignis>>,
    /// Anzahl wirksamer Abbestellungen
    abbestellungen: AtomicUsize,
    /// Simulierter Backend-Fehler fuer `anhaengen`
    fehler: Mutex<Option<String>>,
}

#[derive(Default)]
struct SammlungInner {
    eintraege: BTreeMap<NachrichtId, serde_json::Value>,
    letzte_millis: i64,
    zaehler: u64,
}

impl SammlungInner {
    /// Naechsten Schluessel vergeben; monoton auch bei Uhr-Ruecksprung
    fn naechste_id(&mut self) -> NachrichtId {
        let jetzt = chrono::Utc::now().timestamp_millis();
        self.letzte_millis = self.letzte_millis.max(jetzt);
        self.zaehler += 1;
        NachrichtId::aus_zeit_und_zaehler(self.letzte_millis, self.zaehler)
    }
}

impl SpeicherSammlung {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Laesst alle folgenden `anhaengen`-Aufrufe fehlschlagen (`None` = normal)
    pub fn fehler_setzen(&self, fehler: Option<String>) {
        *self.fehler.lock() = fehler;
    }

    /// Alle Eintraege in Schluesselreihenfolge
    pub fn eintraege(&self) -> Vec<(NachrichtId, ChatNachricht)> {
        let inner = self.inner.lock();
        inner
            .eintraege
            .iter()
            .filter_map(|(id, wert)| {
                serde_json::from_value::<ChatNachricht>(wert.clone())
                    .ok()
                    .map(|n| (id.clone(), n))
            })
            .collect()
    }

    /// Rohes JSON eines Eintrags, wie es das Backend speichert
    pub fn roh(&self, id: &NachrichtId) -> Option<serde_json::Value> {
        self.inner.lock().eintraege.get(id).cloned()
    }

    /// Anzahl aktiver Abonnements
    pub fn aktive_abonnements(&self) -> usize {
        self.abonnenten.len()
    }

    /// Anzahl wirksamer Abbestellungen seit Erstellung
    pub fn abbestellungen(&self) -> usize {
        self.abbestellungen.load(Ordering::SeqCst)
    }

    /// Eintrag ersetzen und `Geaendert` verteilen
    pub fn aendern(&self, id: &NachrichtId, nachricht: &ChatNachricht) -> ChatResult<()> {
        let mut inner = self.inner.lock();
        let eintrag = inner
            .eintraege
            .get_mut(id)
            .ok_or_else(|| ChatError::UngueltigeEingabe(format!("Unbekannter Eintrag {id}")))?;
        *eintrag = serde_json::to_value(nachricht)?;
        self.verteilen(KindEreignis::Geaendert {
            id: id.clone(),
            nachricht: nachricht.clone(),
        });
        Ok(())
    }

    /// Eintrag entfernen und `Entfernt` verteilen
    pub fn entfernen(&self, id: &NachrichtId) -> bool {
        let mut inner = self.inner.lock();
        if inner.eintraege.remove(id).is_none() {
            return false;
        }
        self.verteilen(KindEreignis::Entfernt { id: id.clone() });
        true
    }

    /// Ereignis an alle Abonnenten senden, geschlossene Empfaenger aufraeumen
    ///
    /// Muss unter der `inner`-Sperre aufgerufen werden.
    fn verteilen(&self, ereignis: KindEreignis) {
        let mut getrennt = Vec::new();
        for eintrag in self.abonnenten.iter() {
            if eintrag.value().send(ereignis.clone()).is_err() {
                getrennt.push(*eintrag.key());
            }
        }
        for abo in getrennt {
            self.abonnenten.remove(&abo);
            tracing::debug!(abo = %abo, "Empfaenger geschlossen, Abonnement entfernt");
        }
    }
}

#[async_trait]
impl NachrichtenSammlung for SpeicherSammlung {
    async fn anhaengen(&self, nachricht: &ChatNachricht) -> ChatResult<NachrichtId> {
        if let Some(fehler) = self.fehler.lock().clone() {
            return Err(ChatError::SammlungNichtVerfuegbar(fehler));
        }
        nachricht.pruefen()?;

        let wert = serde_json::to_value(nachricht)?;

        let mut inner = self.inner.lock();
        let id = inner.naechste_id();
        inner.eintraege.insert(id.clone(), wert);
        self.verteilen(KindEreignis::Hinzugefuegt {
            id: id.clone(),
            nachricht: nachricht.clone(),
        });

        tracing::debug!(id = %id, abonnenten = self.abonnenten.len(), "Eintrag angehaengt");
        Ok(id)
    }

    fn abonnieren(&self) -> (AboId, mpsc::UnboundedReceiver<KindEreignis>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let abo = AboId::new();

        let inner = self.inner.lock();
        for (id, wert) in &inner.eintraege {
            match serde_json::from_value::<ChatNachricht>(wert.clone()) {
                Ok(nachricht) => {
                    // Empfaenger lebt noch, rx wird erst unten zurueckgegeben
                    let _ = tx.send(KindEreignis::Hinzugefuegt {
                        id: id.clone(),
                        nachricht,
                    });
                }
                Err(e) => {
                    tracing::warn!(id = %id, fehler = %e, "Eintrag nicht lesbar, uebersprungen");
                }
            }
        }
        self.abonnenten.insert(abo, tx);

        tracing::debug!(abo = %abo, bestand = inner.eintraege.len(), "Sammlung abonniert");
        (abo, rx)
    }

    fn abbestellen(&self, abo: AboId) {
        if self.abonnenten.remove(&abo).is_some() {
            self.abbestellungen.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(abo = %abo, "Abonnement beendet");
        }
    }
}
