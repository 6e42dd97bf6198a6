//! FriendlyChat – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Client.

use anyhow::Result;
use friendlychat_app::{config::AppConfig, App};
use friendlychat_observability::logging_initialisieren;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("FRIENDLYCHAT_CONFIG").unwrap_or_else(|_| "friendlychat.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = AppConfig::laden(&config_pfad)?;

    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "FriendlyChat wird initialisiert"
    );

    App::neu(config).starten().await
}
