//! Unit-Tests fuer die Objektspeicher-Backends

use crate::backend::ObjektSpeicher;
use crate::error::ChatError;
use crate::storage::{foto_pfad, DiskObjektSpeicher, SpeicherObjekte};

fn temp_storage() -> (DiskObjektSpeicher, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Temp-Verzeichnis konnte nicht erstellt werden");
    let storage = DiskObjektSpeicher::new(dir.path());
    (storage, dir)
}

#[test]
fn test_foto_pfad_nimmt_letztes_segment() {
    assert_eq!(foto_pfad("bild.jpg").unwrap(), "chat_photos/bild.jpg");
    assert_eq!(
        foto_pfad("/sdcard/DCIM/Camera/IMG_0001.jpg").unwrap(),
        "chat_photos/IMG_0001.jpg"
    );
    assert_eq!(foto_pfad(r"C:\Bilder\urlaub.jpg").unwrap(), "chat_photos/urlaub.jpg");
}

#[test]
fn test_foto_pfad_behaelt_leerzeichen() {
    assert_eq!(foto_pfad("DCIM/ a.jpg").unwrap(), "chat_photos/ a.jpg");
    assert_eq!(foto_pfad("urlaub 2024.jpg ").unwrap(), "chat_photos/urlaub 2024.jpg ");
}

#[test]
fn test_foto_pfad_ohne_dateiname_fehler() {
    assert!(matches!(foto_pfad(""), Err(ChatError::UngueltigerPfad(_))));
    assert!(matches!(foto_pfad("ordner/"), Err(ChatError::UngueltigerPfad(_))));
    assert!(matches!(foto_pfad("a/.."), Err(ChatError::UngueltigerPfad(_))));
}

#[tokio::test]
async fn test_hochladen_und_herunterladen() {
    let (storage, dir) = temp_storage();

    let data = b"JPEG-Inhalt";
    let locator = storage
        .hochladen("chat_photos/bild.jpg", data)
        .await
        .expect("Hochladen fehlgeschlagen");

    assert!(locator.starts_with("file://"));
    assert!(locator.ends_with("chat_photos/bild.jpg"));
    assert!(dir.path().join("chat_photos/bild.jpg").exists());

    let gelesen = storage
        .herunterladen("chat_photos/bild.jpg")
        .await
        .expect("Herunterladen fehlgeschlagen");
    assert_eq!(gelesen, data);
}

#[tokio::test]
async fn test_hochladen_ueberschreibt_vorhandenes_objekt() {
    let (storage, _dir) = temp_storage();

    storage.hochladen("datei.jpg", b"original").await.unwrap();
    storage.hochladen("datei.jpg", b"ueberschrieben").await.unwrap();

    let gelesen = storage.herunterladen("datei.jpg").await.unwrap();
    assert_eq!(gelesen, b"ueberschrieben");
}

#[tokio::test]
async fn test_pfad_ausserhalb_abgelehnt() {
    let (storage, _dir) = temp_storage();

    let result = storage.hochladen("../ausbruch.jpg", b"x").await;
    assert!(matches!(result, Err(ChatError::UngueltigerPfad(_))));

    let result = storage.hochladen("/etc/passwd", b"x").await;
    assert!(matches!(result, Err(ChatError::UngueltigerPfad(_))));
}

#[tokio::test]
async fn test_herunterladen_nicht_vorhanden() {
    let (storage, _dir) = temp_storage();

    let result = storage.herunterladen("existiert_nicht.jpg").await;
    assert!(matches!(result, Err(ChatError::ObjektNichtGefunden(_))));
}

#[tokio::test]
async fn test_loeschen_nicht_vorhanden_kein_fehler() {
    let (storage, _dir) = temp_storage();

    assert!(storage.loeschen("existiert_nicht.jpg").await.is_ok());
}

#[tokio::test]
async fn test_binaere_daten_intakt() {
    let (storage, _dir) = temp_storage();

    let binaerdaten: Vec<u8> = (0u8..=255).collect();
    storage.hochladen("binaer.bin", &binaerdaten).await.unwrap();

    let gelesen = storage.herunterladen("binaer.bin").await.unwrap();
    assert_eq!(gelesen, binaerdaten);
}

#[tokio::test]
async fn test_speicher_objekte_locator_und_fehler() {
    let speicher = SpeicherObjekte::neu();

    let locator = speicher.hochladen("chat_photos/a.jpg", b"abc").await.unwrap();
    assert_eq!(locator, "mem://chat_photos/a.jpg");
    assert_eq!(speicher.herunterladen("chat_photos/a.jpg").await.unwrap(), b"abc");

    speicher.fehler_setzen(Some("Quota".into()));
    let result = speicher.hochladen("chat_photos/b.jpg", b"def").await;
    assert!(matches!(result, Err(ChatError::UploadFehlgeschlagen(_))));
    assert_eq!(speicher.anzahl(), 1);

    speicher.loeschen("chat_photos/a.jpg").await.unwrap();
    assert_eq!(speicher.anzahl(), 0);
}
