//! friendlychat-app – Bibliotheks-Root
//!
//! Verdrahtet Konfiguration, lokale Backends, Chat-Controller und das
//! Terminal-Frontend.

pub mod config;
pub mod terminal;

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use friendlychat_chat::{
    AnmeldeErgebnis, ChatController, ControllerEinstellungen, Dienste, DiskObjektSpeicher,
    LokaleAuth, SpeicherSammlung, StatischeConfigQuelle, UiAusgabe, UiEreignis,
};

use config::AppConfig;
use terminal::{ausgabe_formatieren, Befehl};

/// Haelt den Client-Zustand zusammen
pub struct App {
    pub config: AppConfig,
}

impl App {
    /// Erstellt einen neuen Client aus der gegebenen Konfiguration
    pub fn neu(config: AppConfig) -> Self {
        Self { config }
    }

    /// Startet Controller und Terminal und laeuft bis `/quit`, Ctrl-C oder
    /// abgebrochener Anmeldung
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            name = %self.config.app.name,
            entwicklungsmodus = self.config.app.entwicklungsmodus,
            speicher = %self.config.speicher.verzeichnis.display(),
            "Client startet"
        );

        let config_quelle = StatischeConfigQuelle::neu(self.config.remote_config.werte_als_text());
        config_quelle.fehler_setzen(self.config.remote_config.fehler.clone());

        let auth = Arc::new(LokaleAuth::neu());
        let dienste = Dienste {
            sammlung: Arc::new(SpeicherSammlung::neu()),
            speicher: Arc::new(DiskObjektSpeicher::new(&self.config.speicher.verzeichnis)),
            config_quelle: Arc::new(config_quelle),
            auth: auth.clone(),
        };

        let (mut controller, ausgaben) = ChatController::neu(
            dienste,
            ControllerEinstellungen {
                entwicklungsmodus: self.config.app.entwicklungsmodus,
            },
        );
        let ereignisse = controller.ereignis_sender();

        controller.starten();
        ereignisse.send(UiEreignis::Fortgesetzt)?;

        let anzeige = tokio::spawn(ausgaben_anzeigen(ausgaben));
        let zeilen = stdin_lesen()?;
        tokio::spawn(eingaben_verarbeiten(zeilen, ereignisse.clone(), auth));

        let shutdown = ereignisse;
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C empfangen, Client wird beendet");
                let _ = shutdown.send(UiEreignis::Beendet);
            }
        });

        // Der Controller gibt beim Beenden seinen Ausgabe-Sender frei,
        // danach laeuft die Anzeige leer
        controller.ausfuehren().await;
        if let Err(e) = anzeige.await {
            tracing::warn!(fehler = %e, "Anzeige-Task abgebrochen");
        }
        tracing::info!("Client beendet");
        Ok(())
    }
}

/// Gibt Controller-Ausgaben auf stdout aus
async fn ausgaben_anzeigen(mut ausgaben: mpsc::UnboundedReceiver<UiAusgabe>) {
    while let Some(ausgabe) = ausgaben.recv().await {
        if let Some(zeile) = ausgabe_formatieren(&ausgabe) {
            println!("{zeile}");
        }
    }
}

/// Liest stdin auf einem eigenen Thread
///
/// Ein blockierender Lesevorgang haelt so das Runtime-Ende nicht auf; der
/// Thread endet spaetestens mit dem Prozess.
fn stdin_lesen() -> Result<mpsc::UnboundedReceiver<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("friendlychat-stdin".to_string())
        .spawn(move || {
            for zeile in std::io::stdin().lock().lines() {
                match zeile {
                    Ok(zeile) => {
                        if tx.send(zeile).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(fehler = %e, "stdin nicht lesbar");
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

/// Uebersetzt Eingabezeilen in Controller-Ereignisse
///
/// Endet nach `/quit` oder `/abbrechen`, bei geschlossener Eingabe oder
/// wenn der Controller nicht mehr empfaengt.
async fn eingaben_verarbeiten(
    mut zeilen: mpsc::UnboundedReceiver<String>,
    ereignisse: mpsc::UnboundedSender<UiEreignis>,
    auth: Arc<LokaleAuth>,
) {
    while let Some(zeile) = zeilen.recv().await {
        let befehl = Befehl::parsen(&zeile);
        let letzter = matches!(befehl, Befehl::Beenden | Befehl::AnmeldungAbbrechen);

        let ereignis_liste = match befehl {
            Befehl::Leer => continue,
            Befehl::Ungueltig(meldung) => {
                println!("* {meldung}");
                continue;
            }
            Befehl::Anmelden(name) => {
                auth.anmelden(&name);
                vec![UiEreignis::Anmeldung(AnmeldeErgebnis::Erfolgreich)]
            }
            Befehl::AnmeldungAbbrechen => {
                vec![UiEreignis::Anmeldung(AnmeldeErgebnis::Abgebrochen)]
            }
            Befehl::Abmelden => vec![UiEreignis::AbmeldenGewaehlt],
            Befehl::Foto(pfad) => {
                vec![UiEreignis::FotoAuswahlGedrueckt, foto_lesen(&pfad).await]
            }
            Befehl::Beenden => vec![UiEreignis::Beendet],
            Befehl::Text(text) => {
                vec![UiEreignis::TextGeaendert(text), UiEreignis::SendenGedrueckt]
            }
        };

        for ereignis in ereignis_liste {
            if ereignisse.send(ereignis).is_err() {
                // Controller beendet
                return;
            }
        }
        if letzter {
            return;
        }
    }

    let _ = ereignisse.send(UiEreignis::Beendet);
}

/// Liest eine Bilddatei als Ergebnis der Fotoauswahl
async fn foto_lesen(pfad: &Path) -> UiEreignis {
    match tokio::fs::read(pfad).await {
        Ok(daten) => UiEreignis::FotoAusgewaehlt {
            dateiname: pfad.to_string_lossy().into_owned(),
            daten,
        },
        Err(e) => {
            tracing::warn!(pfad = %pfad.display(), fehler = %e, "Foto nicht lesbar");
            UiEreignis::FotoAuswahlAbgebrochen
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn eingabe_kanaele() -> (
        mpsc::UnboundedSender<String>,
        mpsc::UnboundedReceiver<String>,
        mpsc::UnboundedSender<UiEreignis>,
        mpsc::UnboundedReceiver<UiEreignis>,
    ) {
        let (zeilen_tx, zeilen_rx) = mpsc::unbounded_channel();
        let (ereignis_tx, ereignis_rx) = mpsc::unbounded_channel();
        (zeilen_tx, zeilen_rx, ereignis_tx, ereignis_rx)
    }

    async fn endet_ohne_weitere_eingabe(
        zeilen_rx: mpsc::UnboundedReceiver<String>,
        ereignis_tx: mpsc::UnboundedSender<UiEreignis>,
    ) {
        // Eingabe bleibt offen, die Verarbeitung muss trotzdem enden
        tokio::time::timeout(
            Duration::from_secs(2),
            eingaben_verarbeiten(zeilen_rx, ereignis_tx, Arc::new(LokaleAuth::neu())),
        )
        .await
        .expect("Eingabeverarbeitung endet nicht");
    }

    #[tokio::test]
    async fn quit_beendet_eingabe_sofort() {
        let (zeilen_tx, zeilen_rx, ereignis_tx, mut ereignis_rx) = eingabe_kanaele();
        zeilen_tx.send("/quit".into()).unwrap();
        zeilen_tx.send("nach dem Ende".into()).unwrap();

        endet_ohne_weitere_eingabe(zeilen_rx, ereignis_tx).await;

        assert!(matches!(ereignis_rx.recv().await, Some(UiEreignis::Beendet)));
        assert!(ereignis_rx.recv().await.is_none());
        drop(zeilen_tx);
    }

    #[tokio::test]
    async fn abbrechen_beendet_eingabe_sofort() {
        let (zeilen_tx, zeilen_rx, ereignis_tx, mut ereignis_rx) = eingabe_kanaele();
        zeilen_tx.send("/abbrechen".into()).unwrap();

        endet_ohne_weitere_eingabe(zeilen_rx, ereignis_tx).await;

        assert!(matches!(
            ereignis_rx.recv().await,
            Some(UiEreignis::Anmeldung(AnmeldeErgebnis::Abgebrochen))
        ));
        assert!(ereignis_rx.recv().await.is_none());
        drop(zeilen_tx);
    }

    #[tokio::test]
    async fn text_wird_zu_eingabe_und_senden() {
        let (zeilen_tx, zeilen_rx, ereignis_tx, mut ereignis_rx) = eingabe_kanaele();
        zeilen_tx.send("hallo".into()).unwrap();
        drop(zeilen_tx);

        eingaben_verarbeiten(zeilen_rx, ereignis_tx, Arc::new(LokaleAuth::neu())).await;

        assert!(matches!(
            ereignis_rx.recv().await,
            Some(UiEreignis::TextGeaendert(ref t)) if t == "hallo"
        ));
        assert!(matches!(ereignis_rx.recv().await, Some(UiEreignis::SendenGedrueckt)));
        // Ende der Eingabe beendet den Client
        assert!(matches!(ereignis_rx.recv().await, Some(UiEreignis::Beendet)));
    }

    #[tokio::test]
    async fn anmelden_setzt_benutzer() {
        let (zeilen_tx, zeilen_rx, ereignis_tx, mut ereignis_rx) = eingabe_kanaele();
        let auth = Arc::new(LokaleAuth::neu());
        zeilen_tx.send("/anmelden alice".into()).unwrap();
        drop(zeilen_tx);

        eingaben_verarbeiten(zeilen_rx, ereignis_tx, auth.clone()).await;

        assert_eq!(auth.aktueller_benutzer().unwrap().name(), "alice");
        assert!(matches!(
            ereignis_rx.recv().await,
            Some(UiEreignis::Anmeldung(AnmeldeErgebnis::Erfolgreich))
        ));
    }
}
