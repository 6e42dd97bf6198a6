//! ChatController – Zustandsmaschine des Chat-Bildschirms
//!
//! Alle Reize (Benutzeraktionen, Auth-Wechsel, Sammlungs-Ereignisse,
//! Upload- und Config-Ergebnisse) kommen als [`UiEreignis`] ueber einen
//! einzigen Kanal an und werden nacheinander in [`ChatController::verarbeiten`]
//! abgearbeitet. Backend-Aufrufe laufen in eigenen Tasks und melden ihr
//! Ergebnis als Ereignis zurueck. Die Nachrichtenliste gehoert allein dem
//! Controller-Task.
//!
//! Ausgaben fuer die Ansicht gehen als [`UiAusgabe`] ueber einen zweiten Kanal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use friendlychat_core::{AboId, Benutzer, ChatNachricht, KindEreignis, ANONYM};

use crate::backend::{AuthAnbieter, ConfigQuelle, NachrichtenSammlung, ObjektSpeicher};
use crate::eingabe::Eingabefeld;
use crate::error::ChatResult;
use crate::remote_config::{
    cache_ablauf, RemoteConfig, NACHRICHTENLAENGE_SCHLUESSEL, STANDARD_NACHRICHTENLAENGE,
};
use crate::storage::foto_pfad;

/// MIME-Typ fuer die Fotoauswahl
pub const FOTO_MIME: &str = "image/jpeg";

// ---------------------------------------------------------------------------
// Oeffentliche Typen
// ---------------------------------------------------------------------------

/// Injizierte Dienst-Handles
#[derive(Clone)]
pub struct Dienste {
    pub sammlung: Arc<dyn NachrichtenSammlung>,
    pub speicher: Arc<dyn ObjektSpeicher>,
    pub config_quelle: Arc<dyn ConfigQuelle>,
    pub auth: Arc<dyn AuthAnbieter>,
}

/// Einstellungen des Controllers
#[derive(Debug, Clone, Default)]
pub struct ControllerEinstellungen {
    /// Im Entwicklungsmodus umgeht jeder Config-Abruf den Cache
    pub entwicklungsmodus: bool,
}

/// Anmeldezustand des Bildschirms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthZustand {
    Abgemeldet,
    Angemeldet(String),
}

/// Ergebnis des externen Anmeldeablaufs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnmeldeErgebnis {
    Erfolgreich,
    Abgebrochen,
}

/// Eingehende Ereignisse des Controllers
#[derive(Debug)]
pub enum UiEreignis {
    // --- Lebenszyklus ---
    Fortgesetzt,
    Pausiert,
    Beendet,

    // --- Auth ---
    /// Anmeldezustand laut Auth-Beobachter der Generation `beobachter`
    AuthGeaendert {
        beobachter: u64,
        benutzer: Option<Benutzer>,
    },
    Anmeldung(AnmeldeErgebnis),

    // --- Benutzeraktionen ---
    TextGeaendert(String),
    SendenGedrueckt,
    AbmeldenGewaehlt,
    FotoAuswahlGedrueckt,
    FotoAusgewaehlt { dateiname: String, daten: Vec<u8> },
    FotoAuswahlAbgebrochen,

    // --- Rueckmeldungen der Backends ---
    Kind { abo: AboId, ereignis: KindEreignis },
    UploadAbgeschlossen { pfad: String, ergebnis: ChatResult<String> },
    ConfigAbgerufen(ChatResult<HashMap<String, String>>),
}

/// Ausgaben an die Ansicht
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAusgabe {
    /// Einstiegspunkt zur Anmeldung anzeigen
    AnmeldungAnzeigen,
    /// Kurzer Hinweis fuer den Benutzer
    Hinweis(String),
    /// System-Auswahl fuer Fotos oeffnen
    FotoAuswahlAnzeigen { mime: &'static str, nur_lokal: bool },
    /// Nachricht an die Liste angehaengt
    NachrichtAngezeigt(ChatNachricht),
    /// Liste geleert
    NachrichtenGeleert,
    /// Eingabefeld geleert
    EingabeGeleert,
    SendenAktiviert(bool),
    Laengenlimit(usize),
    /// Bildschirm schliessen
    Schliessen,
}

/// Ob die Ereignisschleife weiterlaeuft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steuerung {
    Weiter,
    Beenden,
}

// ---------------------------------------------------------------------------
// ChatController
// ---------------------------------------------------------------------------

/// Aktives Sammlungs-Abonnement samt Weiterleitungs-Task
struct AktivesAbo {
    id: AboId,
    weiterleitung: JoinHandle<()>,
}

/// Controller des Chat-Bildschirms
pub struct ChatController {
    dienste: Dienste,
    einstellungen: ControllerEinstellungen,
    remote_config: RemoteConfig,
    eingabe: Eingabefeld,
    zustand: AuthZustand,
    benutzername: String,
    nachrichten: Vec<ChatNachricht>,
    abo: Option<AktivesAbo>,
    auth_beobachter: Option<JoinHandle<()>>,
    /// Steigt bei jedem An- und Abhaengen des Auth-Beobachters
    auth_generation: u64,
    fortschritt_sichtbar: bool,
    ereignis_tx: mpsc::UnboundedSender<UiEreignis>,
    ereignis_rx: mpsc::UnboundedReceiver<UiEreignis>,
    ausgabe_tx: mpsc::UnboundedSender<UiAusgabe>,
}

impl ChatController {
    /// Erstellt den Controller und gibt den Empfaenger fuer Ansichts-Ausgaben zurueck
    ///
    /// Setzt die Config-Standardwerte und das Startlimit von 1000 Zeichen.
    pub fn neu(
        dienste: Dienste,
        einstellungen: ControllerEinstellungen,
    ) -> (Self, mpsc::UnboundedReceiver<UiAusgabe>) {
        let (ereignis_tx, ereignis_rx) = mpsc::unbounded_channel();
        let (ausgabe_tx, ausgabe_rx) = mpsc::unbounded_channel();

        let mut remote_config = RemoteConfig::neu();
        remote_config.standardwerte_setzen(HashMap::from([(
            NACHRICHTENLAENGE_SCHLUESSEL.to_string(),
            STANDARD_NACHRICHTENLAENGE.to_string(),
        )]));

        let controller = Self {
            dienste,
            einstellungen,
            remote_config,
            eingabe: Eingabefeld::neu(STANDARD_NACHRICHTENLAENGE),
            zustand: AuthZustand::Abgemeldet,
            benutzername: ANONYM.to_string(),
            nachrichten: Vec::new(),
            abo: None,
            auth_beobachter: None,
            auth_generation: 0,
            fortschritt_sichtbar: false,
            ereignis_tx,
            ereignis_rx,
            ausgabe_tx,
        };
        (controller, ausgabe_rx)
    }

    /// Sender, ueber den die Ansicht Ereignisse einspeist
    pub fn ereignis_sender(&self) -> mpsc::UnboundedSender<UiEreignis> {
        self.ereignis_tx.clone()
    }

    /// Startet den initialen Config-Abruf
    pub fn starten(&mut self) {
        self.laengenlimit_anwenden();
        self.config_abrufen();
    }

    /// Ereignisschleife bis `Beendet` oder abgebrochener Anmeldung
    pub async fn ausfuehren(mut self) {
        tracing::info!("Chat-Controller gestartet");
        while let Some(ereignis) = self.ereignis_rx.recv().await {
            if self.verarbeiten(ereignis) == Steuerung::Beenden {
                break;
            }
        }
        tracing::info!("Chat-Controller beendet");
    }

    /// Wartet auf das naechste Ereignis und verarbeitet es
    pub async fn naechstes_verarbeiten(&mut self) -> Option<Steuerung> {
        let ereignis = self.ereignis_rx.recv().await?;
        Some(self.verarbeiten(ereignis))
    }

    /// Verarbeitet ein einzelnes Ereignis
    pub fn verarbeiten(&mut self, ereignis: UiEreignis) -> Steuerung {
        match ereignis {
            UiEreignis::Fortgesetzt => self.auth_beobachter_anhaengen(),
            UiEreignis::Pausiert => {
                self.auth_beobachter_entfernen();
                self.nachrichten_leeren();
                self.abo_trennen();
            }
            UiEreignis::Beendet => {
                self.auth_beobachter_entfernen();
                self.abo_trennen();
                return Steuerung::Beenden;
            }

            UiEreignis::AuthGeaendert { beobachter, .. } if beobachter != self.auth_generation => {
                tracing::trace!(
                    beobachter,
                    aktuell = self.auth_generation,
                    "Auth-Ereignis eines alten Beobachters verworfen"
                );
            }
            UiEreignis::AuthGeaendert {
                benutzer: Some(benutzer),
                ..
            } => {
                self.angemeldet_initialisieren(benutzer.name());
            }
            UiEreignis::AuthGeaendert { benutzer: None, .. } => {
                self.abgemeldet_aufraeumen();
                self.ausgeben(UiAusgabe::AnmeldungAnzeigen);
            }
            UiEreignis::Anmeldung(AnmeldeErgebnis::Erfolgreich) => {
                self.ausgeben(UiAusgabe::Hinweis("Angemeldet!".into()));
            }
            UiEreignis::Anmeldung(AnmeldeErgebnis::Abgebrochen) => {
                tracing::info!("Anmeldung abgebrochen, Bildschirm wird geschlossen");
                self.ausgeben(UiAusgabe::Hinweis("Anmeldung abgebrochen".into()));
                self.ausgeben(UiAusgabe::Schliessen);
                self.auth_beobachter_entfernen();
                self.abo_trennen();
                return Steuerung::Beenden;
            }

            UiEreignis::TextGeaendert(text) => {
                self.eingabe.text_setzen(&text);
                self.ausgeben(UiAusgabe::SendenAktiviert(self.eingabe.senden_aktiviert()));
            }
            UiEreignis::SendenGedrueckt => self.text_senden(),
            UiEreignis::AbmeldenGewaehlt => self.dienste.auth.abmelden(),
            UiEreignis::FotoAuswahlGedrueckt => {
                self.ausgeben(UiAusgabe::FotoAuswahlAnzeigen {
                    mime: FOTO_MIME,
                    nur_lokal: true,
                });
            }
            UiEreignis::FotoAusgewaehlt { dateiname, daten } => {
                self.foto_hochladen(&dateiname, daten);
            }
            UiEreignis::FotoAuswahlAbgebrochen => {
                tracing::debug!("Fotoauswahl abgebrochen");
            }

            UiEreignis::Kind { abo, ereignis } => self.kind_ereignis(abo, ereignis),
            UiEreignis::UploadAbgeschlossen { pfad, ergebnis } => match ergebnis {
                Ok(download_url) => {
                    let nachricht = ChatNachricht::foto(download_url, self.benutzername.clone());
                    self.veroeffentlichen(nachricht);
                }
                Err(e) => {
                    tracing::debug!(pfad = %pfad, fehler = %e, "Foto-Upload fehlgeschlagen");
                }
            },
            UiEreignis::ConfigAbgerufen(Ok(werte)) => {
                self.remote_config.abgerufen_uebernehmen(werte, Instant::now());
                self.remote_config.aktivieren();
                self.laengenlimit_anwenden();
            }
            UiEreignis::ConfigAbgerufen(Err(e)) => {
                tracing::warn!(fehler = %e, "Fehler beim Abrufen der Konfiguration");
                self.laengenlimit_anwenden();
            }
        }
        Steuerung::Weiter
    }

    // --- Zustandsabfragen --------------------------------------------------

    pub fn zustand(&self) -> &AuthZustand {
        &self.zustand
    }

    pub fn benutzername(&self) -> &str {
        &self.benutzername
    }

    /// Lokaler Spiegel der Sammlung
    pub fn nachrichten(&self) -> &[ChatNachricht] {
        &self.nachrichten
    }

    pub fn eingabe(&self) -> &Eingabefeld {
        &self.eingabe
    }

    pub fn ist_abonniert(&self) -> bool {
        self.abo.is_some()
    }

    pub fn fortschritt_sichtbar(&self) -> bool {
        self.fortschritt_sichtbar
    }

    #[cfg(test)]
    pub(crate) fn auth_generation(&self) -> u64 {
        self.auth_generation
    }

    // --- Auth --------------------------------------------------------------

    fn auth_beobachter_anhaengen(&mut self) {
        if self.auth_beobachter.is_some() {
            return;
        }
        self.auth_generation += 1;
        let beobachter = self.auth_generation;
        let mut rx = self.dienste.auth.beobachten();
        let tx = self.ereignis_tx.clone();
        self.auth_beobachter = Some(tokio::spawn(async move {
            // Aktueller Zustand sofort, danach jede Aenderung
            let aktuell = rx.borrow_and_update().clone();
            if tx
                .send(UiEreignis::AuthGeaendert {
                    beobachter,
                    benutzer: aktuell,
                })
                .is_err()
            {
                return;
            }
            while rx.changed().await.is_ok() {
                let benutzer = rx.borrow_and_update().clone();
                if tx
                    .send(UiEreignis::AuthGeaendert {
                        beobachter,
                        benutzer,
                    })
                    .is_err()
                {
                    break;
                }
            }
        }));
        tracing::debug!(beobachter, "Auth-Beobachter angehaengt");
    }

    fn auth_beobachter_entfernen(&mut self) {
        if let Some(task) = self.auth_beobachter.take() {
            task.abort();
            // Bereits eingereihte Ereignisse dieses Beobachters verfallen
            self.auth_generation += 1;
            tracing::debug!("Auth-Beobachter entfernt");
        }
    }

    fn angemeldet_initialisieren(&mut self, name: &str) {
        self.benutzername = name.to_string();
        self.zustand = AuthZustand::Angemeldet(self.benutzername.clone());
        tracing::info!(benutzer = %self.benutzername, "Angemeldet");
        self.abo_anhaengen();
    }

    fn abgemeldet_aufraeumen(&mut self) {
        self.benutzername = ANONYM.to_string();
        self.zustand = AuthZustand::Abgemeldet;
        self.nachrichten_leeren();
        self.abo_trennen();
    }

    // --- Nachrichtenspiegel ------------------------------------------------

    fn abo_anhaengen(&mut self) {
        if self.abo.is_some() {
            return;
        }
        let (id, mut rx) = self.dienste.sammlung.abonnieren();
        let tx = self.ereignis_tx.clone();
        let weiterleitung = tokio::spawn(async move {
            while let Some(ereignis) = rx.recv().await {
                if tx.send(UiEreignis::Kind { abo: id, ereignis }).is_err() {
                    break;
                }
            }
        });
        self.abo = Some(AktivesAbo { id, weiterleitung });
        tracing::debug!(abo = %id, "Nachrichten abonniert");
    }

    fn abo_trennen(&mut self) {
        if let Some(abo) = self.abo.take() {
            self.dienste.sammlung.abbestellen(abo.id);
            abo.weiterleitung.abort();
            tracing::debug!(abo = %abo.id, "Nachrichten-Abonnement getrennt");
        }
    }

    fn nachrichten_leeren(&mut self) {
        self.nachrichten.clear();
        self.ausgeben(UiAusgabe::NachrichtenGeleert);
    }

    fn kind_ereignis(&mut self, abo: AboId, ereignis: KindEreignis) {
        if self.abo.as_ref().map(|a| a.id) != Some(abo) {
            tracing::trace!(
                abo = %abo,
                art = ereignis.art(),
                "Ereignis eines alten Abonnements verworfen"
            );
            return;
        }
        match ereignis {
            KindEreignis::Hinzugefuegt { id, nachricht } => {
                tracing::trace!(id = %id, "Nachricht empfangen");
                self.nachrichten.push(nachricht.clone());
                self.ausgeben(UiAusgabe::NachrichtAngezeigt(nachricht));
            }
            KindEreignis::Abgebrochen { grund } => {
                tracing::warn!(abo = %abo, grund = %grund, "Abonnement vom Backend abgebrochen");
            }
            andere => {
                tracing::trace!(art = andere.art(), "Kind-Ereignis ignoriert");
            }
        }
    }

    // --- Senden ------------------------------------------------------------

    fn text_senden(&mut self) {
        if !self.eingabe.senden_aktiviert() {
            tracing::debug!("Senden ohne Inhalt ignoriert");
            return;
        }
        let nachricht = ChatNachricht::text(self.eingabe.text(), self.benutzername.clone());
        self.veroeffentlichen(nachricht);

        self.eingabe.leeren();
        self.ausgeben(UiAusgabe::EingabeGeleert);
        self.ausgeben(UiAusgabe::SendenAktiviert(false));
    }

    fn foto_hochladen(&mut self, dateiname: &str, daten: Vec<u8>) {
        let pfad = match foto_pfad(dateiname) {
            Ok(pfad) => pfad,
            Err(e) => {
                tracing::debug!(fehler = %e, "Foto ohne gueltigen Dateinamen ignoriert");
                return;
            }
        };
        let speicher = Arc::clone(&self.dienste.speicher);
        let tx = self.ereignis_tx.clone();
        tokio::spawn(async move {
            let ergebnis = speicher.hochladen(&pfad, &daten).await;
            // Controller kann inzwischen beendet sein
            let _ = tx.send(UiEreignis::UploadAbgeschlossen { pfad, ergebnis });
        });
    }

    /// Haengt die Nachricht an die Sammlung an, ohne auf das Ergebnis zu warten
    fn veroeffentlichen(&self, nachricht: ChatNachricht) {
        let sammlung = Arc::clone(&self.dienste.sammlung);
        tokio::spawn(async move {
            match sammlung.anhaengen(&nachricht).await {
                Ok(id) => tracing::debug!(id = %id, "Nachricht veroeffentlicht"),
                Err(e) => {
                    tracing::debug!(fehler = %e, "Nachricht konnte nicht veroeffentlicht werden")
                }
            }
        });
    }

    // --- Remote Config -----------------------------------------------------

    /// Config abrufen; bei gueltigem Cache wird sofort aktiviert
    pub fn config_abrufen(&mut self) {
        let ablauf = cache_ablauf(self.einstellungen.entwicklungsmodus);
        if !self.remote_config.abruf_noetig(ablauf, Instant::now()) {
            tracing::debug!(ablauf_s = ablauf.as_secs(), "Config-Cache gueltig, kein Abruf");
            self.remote_config.aktivieren();
            self.laengenlimit_anwenden();
            return;
        }

        let quelle = Arc::clone(&self.dienste.config_quelle);
        let tx = self.ereignis_tx.clone();
        tokio::spawn(async move {
            let ergebnis = quelle.abrufen().await;
            let _ = tx.send(UiEreignis::ConfigAbgerufen(ergebnis));
        });
    }

    fn laengenlimit_anwenden(&mut self) {
        let limit = match self.remote_config.long_wert(NACHRICHTENLAENGE_SCHLUESSEL) {
            Some(wert) if wert > 0 => usize::try_from(wert).unwrap_or(usize::MAX),
            andere => {
                tracing::warn!(
                    wert = ?andere,
                    "Ungueltiges Nachrichtenlimit, bisheriges Limit bleibt"
                );
                self.eingabe.max_laenge()
            }
        };
        self.eingabe.laengenfilter_setzen(limit);
        self.ausgeben(UiAusgabe::Laengenlimit(limit));
        tracing::debug!(friendly_msg_length = limit, "Nachrichtenlimit angewendet");
    }

    fn ausgeben(&self, ausgabe: UiAusgabe) {
        if self.ausgabe_tx.send(ausgabe).is_err() {
            tracing::trace!("Keine Ansicht verbunden, Ausgabe verworfen");
        }
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        self.auth_beobachter_entfernen();
        if let Some(abo) = self.abo.take() {
            self.dienste.sammlung.abbestellen(abo.id);
            abo.weiterleitung.abort();
        }
    }
}
