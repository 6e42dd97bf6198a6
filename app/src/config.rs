//! Client-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Client ohne Konfigurationsdatei
//! lauffaehig ist.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use friendlychat_observability::logging::{log_format_gueltig, log_level_gueltig};

/// Vollstaendige Client-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Allgemeine Einstellungen
    pub app: AppEinstellungen,
    /// Ablage fuer hochgeladene Fotos
    pub speicher: SpeicherEinstellungen,
    /// Werte der lokalen Remote-Config-Quelle
    pub remote_config: RemoteConfigEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppEinstellungen {
    /// Anzeigename des Clients
    pub name: String,
    /// Entwicklungsmodus: Config-Abrufe umgehen den Cache
    pub entwicklungsmodus: bool,
}

impl Default for AppEinstellungen {
    fn default() -> Self {
        Self {
            name: "FriendlyChat".into(),
            entwicklungsmodus: false,
        }
    }
}

/// Objektspeicher-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeicherEinstellungen {
    /// Basisverzeichnis; Fotos landen unter `<verzeichnis>/chat_photos/`
    pub verzeichnis: PathBuf,
}

impl Default for SpeicherEinstellungen {
    fn default() -> Self {
        Self {
            verzeichnis: PathBuf::from("data"),
        }
    }
}

/// Remote-Config-Einstellungen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfigEinstellungen {
    /// Vom Server gelieferte Werte (Zahlen oder Strings)
    pub werte: HashMap<String, toml::Value>,
    /// Wenn gesetzt, schlaegt jeder Abruf mit dieser Meldung fehl
    pub fehler: Option<String>,
}

impl RemoteConfigEinstellungen {
    /// Werte als Strings, wie sie eine Config-Quelle liefert
    pub fn werte_als_text(&self) -> HashMap<String, String> {
        self.werte
            .iter()
            .map(|(k, v)| {
                let text = match v {
                    toml::Value::String(s) => s.clone(),
                    andere => andere.to_string(),
                };
                (k.clone(), text)
            })
            .collect()
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl AppConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };
        config.pruefen()?;
        Ok(config)
    }

    /// Prueft Werte, die serde allein nicht abfangen kann
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Ungueltiges Log-Level: '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Ungueltiges Log-Format: '{}'", self.logging.format);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.app.name, "FriendlyChat");
        assert!(!cfg.app.entwicklungsmodus);
        assert_eq!(cfg.speicher.verzeichnis, PathBuf::from("data"));
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.remote_config.werte.is_empty());
        assert!(cfg.pruefen().is_ok());
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [app]
            entwicklungsmodus = true

            [remote_config.werte]
            friendly_msg_length = 140
            begruessung = "Hallo"
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert!(cfg.app.entwicklungsmodus);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.app.name, "FriendlyChat");
        assert_eq!(cfg.logging.format, "text");

        let werte = cfg.remote_config.werte_als_text();
        assert_eq!(werte["friendly_msg_length"], "140");
        assert_eq!(werte["begruessung"], "Hallo");
    }

    #[test]
    fn ungueltiges_log_level_abgelehnt() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "laut".into();
        assert!(cfg.pruefen().is_err());
    }

    #[test]
    fn laden_ohne_datei_liefert_standard() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("fehlt.toml");
        let cfg = AppConfig::laden(pfad.to_str().unwrap()).unwrap();
        assert_eq!(cfg.app.name, "FriendlyChat");
    }

    #[test]
    fn laden_aus_datei() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("friendlychat.toml");
        std::fs::write(
            &pfad,
            "[speicher]\nverzeichnis = \"/tmp/fotos\"\n[remote_config]\nfehler = \"offline\"\n",
        )
        .unwrap();

        let cfg = AppConfig::laden(pfad.to_str().unwrap()).unwrap();
        assert_eq!(cfg.speicher.verzeichnis, PathBuf::from("/tmp/fotos"));
        assert_eq!(cfg.remote_config.fehler.as_deref(), Some("offline"));
    }

    #[test]
    fn kaputte_datei_ist_fehler() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("kaputt.toml");
        std::fs::write(&pfad, "[app\nname = ").unwrap();
        assert!(AppConfig::laden(pfad.to_str().unwrap()).is_err());
    }
}
