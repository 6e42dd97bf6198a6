//! Texteingabe mit Laengenfilter
//!
//! Das Limit zaehlt Unicode-Skalarwerte. Ein geaendertes Limit gilt fuer
//! folgende Eingaben; bereits vorhandener Text wird nicht gekuerzt.

use crate::remote_config::STANDARD_NACHRICHTENLAENGE;

/// Zustand des Nachrichten-Eingabefelds
#[derive(Debug, Clone)]
pub struct Eingabefeld {
    text: String,
    max_laenge: usize,
}

impl Eingabefeld {
    pub fn neu(max_laenge: usize) -> Self {
        Self {
            text: String::new(),
            max_laenge,
        }
    }

    /// Neuen Feldinhalt uebernehmen, auf `max_laenge` Zeichen begrenzt
    pub fn text_setzen(&mut self, text: &str) {
        self.text = text.chars().take(self.max_laenge).collect();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn max_laenge(&self) -> usize {
        self.max_laenge
    }

    pub fn laengenfilter_setzen(&mut self, max_laenge: usize) {
        self.max_laenge = max_laenge;
    }

    /// Senden ist moeglich sobald nach Trimmen etwas uebrig bleibt
    pub fn senden_aktiviert(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn leeren(&mut self) {
        self.text.clear();
    }
}

impl Default for Eingabefeld {
    fn default() -> Self {
        Self::neu(STANDARD_NACHRICHTENLAENGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn senden_nur_mit_inhalt() {
        let mut feld = Eingabefeld::default();
        assert!(!feld.senden_aktiviert());

        feld.text_setzen("   \t ");
        assert!(!feld.senden_aktiviert());

        feld.text_setzen("  hallo ");
        assert!(feld.senden_aktiviert());
    }

    #[test]
    fn laengenfilter_begrenzt_zeichen() {
        let mut feld = Eingabefeld::neu(5);
        feld.text_setzen("äöüßxyz");
        assert_eq!(feld.text(), "äöüßx");
        assert_eq!(feld.text().chars().count(), 5);
    }

    #[test]
    fn neues_limit_gilt_fuer_folgende_eingaben() {
        let mut feld = Eingabefeld::neu(10);
        feld.text_setzen("0123456789");
        feld.laengenfilter_setzen(3);
        // Vorhandener Text bleibt
        assert_eq!(feld.text(), "0123456789");

        feld.text_setzen("abcdef");
        assert_eq!(feld.text(), "abc");
    }

    #[test]
    fn leeren_deaktiviert_senden() {
        let mut feld = Eingabefeld::default();
        feld.text_setzen("x");
        feld.leeren();
        assert_eq!(feld.text(), "");
        assert!(!feld.senden_aktiviert());
        assert_eq!(feld.max_laenge(), 1000);
    }
}
