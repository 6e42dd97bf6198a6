//! Remote-Config-Client
//!
//! Haelt drei Wertestaende: lokale Standardwerte, zuletzt abgerufene Werte
//! (mit Abrufzeitpunkt) und aktive Werte. Abgerufene Werte wirken erst nach
//! `aktivieren`. Gelesen wird aktiv vor Standard.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::backend::ConfigQuelle;
use crate::error::{ChatError, ChatResult};

/// Schluessel fuer die maximale Nachrichtenlaenge
pub const NACHRICHTENLAENGE_SCHLUESSEL: &str = "friendly_msg_length";

/// Standardlimit solange kein Wert abgerufen wurde
pub const STANDARD_NACHRICHTENLAENGE: usize = 1000;

/// Cache-Ablauf im Entwicklungsmodus: jeder Abruf geht zum Server
pub const CACHE_ABLAUF_ENTWICKLUNG: Duration = Duration::ZERO;

/// Cache-Ablauf im Normalbetrieb
pub const CACHE_ABLAUF_STANDARD: Duration = Duration::from_secs(3600);

/// Cache-Ablauf passend zum Betriebsmodus
pub fn cache_ablauf(entwicklungsmodus: bool) -> Duration {
    if entwicklungsmodus {
        CACHE_ABLAUF_ENTWICKLUNG
    } else {
        CACHE_ABLAUF_STANDARD
    }
}

#[derive(Debug, Clone)]
struct AbrufStand {
    werte: HashMap<String, String>,
    zeitpunkt: Instant,
    /// Noch nicht aktiviert
    ausstehend: bool,
}

/// Client-seitiger Remote-Config-Zustand
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    standardwerte: HashMap<String, String>,
    abgerufen: Option<AbrufStand>,
    aktiv: HashMap<String, String>,
}

impl RemoteConfig {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Lokale Standardwerte setzen (ersetzt vorhandene Standardwerte)
    pub fn standardwerte_setzen(&mut self, werte: HashMap<String, String>) {
        self.standardwerte = werte;
    }

    /// Ob ein Abruf beim Server noetig ist oder der Cache noch gilt
    pub fn abruf_noetig(&self, ablauf: Duration, jetzt: Instant) -> bool {
        match &self.abgerufen {
            None => true,
            Some(stand) => jetzt.saturating_duration_since(stand.zeitpunkt) >= ablauf,
        }
    }

    /// Ergebnis eines Server-Abrufs uebernehmen (noch nicht aktiv)
    pub fn abgerufen_uebernehmen(&mut self, werte: HashMap<String, String>, jetzt: Instant) {
        tracing::debug!(anzahl = werte.len(), "Config-Werte abgerufen");
        self.abgerufen = Some(AbrufStand {
            werte,
            zeitpunkt: jetzt,
            ausstehend: true,
        });
    }

    /// Abgerufene Werte aktivieren
    ///
    /// Gibt true zurueck wenn ausstehende Werte aktiviert wurden.
    pub fn aktivieren(&mut self) -> bool {
        match self.abgerufen.as_mut() {
            Some(stand) if stand.ausstehend => {
                self.aktiv = stand.werte.clone();
                stand.ausstehend = false;
                true
            }
            _ => false,
        }
    }

    /// Rohwert: aktiv, sonst Standard
    pub fn wert(&self, schluessel: &str) -> Option<&str> {
        self.aktiv
            .get(schluessel)
            .or_else(|| self.standardwerte.get(schluessel))
            .map(String::as_str)
    }

    /// Ganzzahlwert; fehlend oder nicht numerisch ergibt `None`
    pub fn long_wert(&self, schluessel: &str) -> Option<i64> {
        self.wert(schluessel).and_then(|w| w.trim().parse().ok())
    }
}

// ---------------------------------------------------------------------------
// StatischeConfigQuelle
// ---------------------------------------------------------------------------

/// Config-Quelle mit festen Werten, optional mit simuliertem Fehler
#[derive(Default)]
pub struct StatischeConfigQuelle {
    werte: Mutex<HashMap<String, String>>,
    fehler: Mutex<Option<String>>,
    abrufe: AtomicUsize,
}

impl StatischeConfigQuelle {
    pub fn neu(werte: HashMap<String, String>) -> Self {
        Self {
            werte: Mutex::new(werte),
            ..Default::default()
        }
    }

    /// Einzelnen Wert setzen
    pub fn setzen(&self, schluessel: &str, wert: &str) {
        self.werte
            .lock()
            .insert(schluessel.to_string(), wert.to_string());
    }

    /// Laesst alle folgenden Abrufe fehlschlagen (`None` = normal)
    pub fn fehler_setzen(&self, fehler: Option<String>) {
        *self.fehler.lock() = fehler;
    }

    /// Anzahl der bisherigen Abrufe
    pub fn abrufe(&self) -> usize {
        self.abrufe.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigQuelle for StatischeConfigQuelle {
    async fn abrufen(&self) -> ChatResult<HashMap<String, String>> {
        self.abrufe.fetch_add(1, Ordering::SeqCst);
        if let Some(fehler) = self.fehler.lock().clone() {
            return Err(ChatError::ConfigAbruf(fehler));
        }
        Ok(self.werte.lock().clone())
    }
}
