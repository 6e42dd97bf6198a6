//! friendlychat-chat – Chat-Bildschirm, Backends und Remote Config
//!
//! Dieses Crate implementiert:
//! - ChatController: Zustandsmaschine fuer Anmeldung, Nachrichtenspiegel,
//!   Text- und Fotoversand sowie das Nachrichtenlimit
//! - Backend-Traits fuer Sammlung, Objektspeicher, Config-Quelle und Auth
//! - Lokale Backends: SpeicherSammlung, SpeicherObjekte, DiskObjektSpeicher,
//!   StatischeConfigQuelle, LokaleAuth
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use friendlychat_chat::{
//!     ChatController, ControllerEinstellungen, Dienste, LokaleAuth, SpeicherObjekte,
//!     SpeicherSammlung, StatischeConfigQuelle, UiEreignis,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let dienste = Dienste {
//!         sammlung: Arc::new(SpeicherSammlung::neu()),
//!         speicher: Arc::new(SpeicherObjekte::neu()),
//!         config_quelle: Arc::new(StatischeConfigQuelle::default()),
//!         auth: Arc::new(LokaleAuth::neu()),
//!     };
//!
//!     let (mut controller, _ausgaben) =
//!         ChatController::neu(dienste, ControllerEinstellungen::default());
//!     controller.starten();
//!     controller.ereignis_sender().send(UiEreignis::Fortgesetzt).unwrap();
//!     controller.ausfuehren().await;
//! }
//! ```

pub mod auth;
pub mod backend;
pub mod controller;
pub mod eingabe;
pub mod error;
pub mod remote_config;
pub mod sammlung;
pub mod storage;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use auth::LokaleAuth;
pub use backend::{AuthAnbieter, ConfigQuelle, NachrichtenSammlung, ObjektSpeicher};
pub use controller::{
    AnmeldeErgebnis, AuthZustand, ChatController, ControllerEinstellungen, Dienste, Steuerung,
    UiAusgabe, UiEreignis,
};
pub use eingabe::Eingabefeld;
pub use error::{ChatError, ChatResult};
pub use remote_config::{RemoteConfig, StatischeConfigQuelle};
pub use sammlung::SpeicherSammlung;
pub use storage::{foto_pfad, DiskObjektSpeicher, SpeicherObjekte};
