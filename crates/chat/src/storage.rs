//! Objektspeicher-Backends fuer Foto-Uploads
//!
//! Fotos landen unter `chat_photos/<dateiname>`. Beide Backends liefern nach
//! dem Ablegen einen Download-Locator zurueck, der in der Nachricht steht.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::backend::ObjektSpeicher;
use crate::error::{ChatError, ChatResult};

/// Namensraum fuer Chat-Fotos im Objektspeicher
pub const FOTO_PRAEFIX: &str = "chat_photos";

/// Speicherpfad fuer ein ausgewaehltes Foto
///
/// Verwendet nur das letzte Pfadsegment des Dateinamens, unveraendert.
pub fn foto_pfad(dateiname: &str) -> ChatResult<String> {
    let segment = dateiname.rsplit(['/', '\\']).next().unwrap_or_default();

    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(ChatError::UngueltigerPfad(format!(
            "Kein Dateiname in '{dateiname}'"
        )));
    }

    Ok(format!("{FOTO_PRAEFIX}/{segment}"))
}

/// Lehnt leere, absolute oder aus dem Speicher herausfuehrende Pfade ab
fn pfad_pruefen(pfad: &str) -> ChatResult<()> {
    if pfad.trim().is_empty() {
        return Err(ChatError::UngueltigerPfad("Pfad darf nicht leer sein".into()));
    }
    let ok = Path::new(pfad)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !ok {
        return Err(ChatError::UngueltigerPfad(pfad.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// DiskObjektSpeicher
// ---------------------------------------------------------------------------

/// Disk-basierter Objektspeicher
///
/// Speichert Objekte unter `base_dir/<pfad>`, Locator ist eine `file://`-URL.
#[derive(Debug, Clone)]
pub struct DiskObjektSpeicher {
    base_dir: PathBuf,
}

impl DiskObjektSpeicher {
    /// Neuen DiskObjektSpeicher mit dem angegebenen Basisverzeichnis erstellen
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Vollstaendigen Dateipfad aus relativem Pfad berechnen
    fn full_path(&self, pfad: &str) -> ChatResult<PathBuf> {
        pfad_pruefen(pfad)?;
        Ok(self.base_dir.join(pfad))
    }
}

#[async_trait]
impl ObjektSpeicher for DiskObjektSpeicher {
    async fn hochladen(&self, pfad: &str, daten: &[u8]) -> ChatResult<String> {
        let full = self.full_path(pfad)?;

        // Elternverzeichnis anlegen falls noetig
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full, daten).await?;
        tracing::debug!(path = %full.display(), bytes = daten.len(), "Objekt gespeichert");

        let absolut = tokio::fs::canonicalize(&full).await?;
        Ok(format!("file://{}", absolut.display()))
    }

    async fn herunterladen(&self, pfad: &str) -> ChatResult<Vec<u8>> {
        let full = self.full_path(pfad)?;
        match tokio::fs::read(&full).await {
            Ok(daten) => {
                tracing::debug!(path = %full.display(), bytes = daten.len(), "Objekt gelesen");
                Ok(daten)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ChatError::ObjektNichtGefunden(pfad.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn loeschen(&self, pfad: &str) -> ChatResult<()> {
        let full = self.full_path(pfad)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                tracing::debug!(path = %full.display(), "Objekt geloescht");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Bereits geloescht – kein Fehler
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// SpeicherObjekte
// ---------------------------------------------------------------------------

/// In-Memory-Objektspeicher mit `mem://`-Locatoren
#[derive(Default)]
pub struct SpeicherObjekte {
    objekte: DashMap<String, Vec<u8>>,
    fehler: Mutex<Option<String>>,
}

impl SpeicherObjekte {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Laesst alle folgenden Uploads fehlschlagen (`None` = normal)
    pub fn fehler_setzen(&self, fehler: Option<String>) {
        *self.fehler.lock() = fehler;
    }

    pub fn anzahl(&self) -> usize {
        self.objekte.len()
    }
}

#[async_trait]
impl ObjektSpeicher for SpeicherObjekte {
    async fn hochladen(&self, pfad: &str, daten: &[u8]) -> ChatResult<String> {
        pfad_pruefen(pfad)?;
        if let Some(fehler) = self.fehler.lock().clone() {
            return Err(ChatError::UploadFehlgeschlagen(fehler));
        }
        self.objekte.insert(pfad.to_string(), daten.to_vec());
        Ok(format!("mem://{pfad}"))
    }

    async fn herunterladen(&self, pfad: &str) -> ChatResult<Vec<u8>> {
        self.objekte
            .get(pfad)
            .map(|d| d.value().clone())
            .ok_or_else(|| ChatError::ObjektNichtGefunden(pfad.to_string()))
    }

    async fn loeschen(&self, pfad: &str) -> ChatResult<()> {
        self.objekte.remove(pfad);
        Ok(())
    }
}
