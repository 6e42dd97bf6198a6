//! Terminal-Frontend: Eingabezeilen parsen, Ausgaben formatieren

use std::path::PathBuf;

use friendlychat_chat::UiAusgabe;
use friendlychat_core::ChatNachricht;

/// Ein Befehl aus einer Eingabezeile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Befehl {
    /// `/anmelden <name>`
    Anmelden(String),
    /// `/abbrechen` – Anmeldung abbrechen
    AnmeldungAbbrechen,
    /// `/abmelden`
    Abmelden,
    /// `/foto <pfad>`
    Foto(PathBuf),
    /// `/quit`
    Beenden,
    /// Alles andere wird als Nachricht gesendet
    Text(String),
    /// Leere Zeile
    Leer,
    /// Befehl mit fehlendem Argument oder unbekannter Befehl
    Ungueltig(String),
}

impl Befehl {
    pub fn parsen(zeile: &str) -> Self {
        let zeile = zeile.trim_end_matches(['\r', '\n']);
        if zeile.trim().is_empty() {
            return Self::Leer;
        }
        let Some(rest) = zeile.strip_prefix('/') else {
            return Self::Text(zeile.to_string());
        };

        let (befehl, argument) = match rest.split_once(char::is_whitespace) {
            Some((b, a)) => (b, a.trim()),
            None => (rest, ""),
        };

        match (befehl, argument) {
            ("anmelden", "") => Self::Ungueltig("Aufruf: /anmelden <name>".into()),
            ("anmelden", name) => Self::Anmelden(name.to_string()),
            ("abbrechen", _) => Self::AnmeldungAbbrechen,
            ("abmelden", _) => Self::Abmelden,
            ("foto", "") => Self::Ungueltig("Aufruf: /foto <pfad>".into()),
            ("foto", pfad) => Self::Foto(PathBuf::from(pfad)),
            ("quit", _) => Self::Beenden,
            (anderer, _) => Self::Ungueltig(format!("Unbekannter Befehl: /{anderer}")),
        }
    }
}

/// Anzeigezeile fuer eine Nachricht
pub fn nachricht_formatieren(nachricht: &ChatNachricht) -> String {
    match (&nachricht.text, &nachricht.photo_url) {
        (Some(text), _) => format!("[{}] {}", nachricht.sender_name, text),
        (None, Some(url)) => format!("[{}] <Foto: {}>", nachricht.sender_name, url),
        (None, None) => format!("[{}] <leer>", nachricht.sender_name),
    }
}

/// Anzeigezeile fuer eine Controller-Ausgabe; `None` wenn nichts anzuzeigen ist
pub fn ausgabe_formatieren(ausgabe: &UiAusgabe) -> Option<String> {
    match ausgabe {
        UiAusgabe::AnmeldungAnzeigen => {
            Some("Bitte anmelden: /anmelden <name> oder /abbrechen".into())
        }
        UiAusgabe::Hinweis(text) => Some(format!("* {text}")),
        UiAusgabe::FotoAuswahlAnzeigen { mime, .. } => {
            Some(format!("* Fotoauswahl ({mime}) wird gelesen ..."))
        }
        UiAusgabe::NachrichtAngezeigt(nachricht) => Some(nachricht_formatieren(nachricht)),
        UiAusgabe::NachrichtenGeleert => Some("* Verlauf geleert".into()),
        UiAusgabe::Laengenlimit(limit) => Some(format!("* Nachrichtenlimit: {limit} Zeichen")),
        UiAusgabe::Schliessen => Some("* Auf Wiedersehen".into()),
        UiAusgabe::EingabeGeleert | UiAusgabe::SendenAktiviert(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn befehle_parsen() {
        assert_eq!(
            Befehl::parsen("/anmelden alice"),
            Befehl::Anmelden("alice".into())
        );
        assert_eq!(
            Befehl::parsen("/anmelden  Alice Liddell "),
            Befehl::Anmelden("Alice Liddell".into())
        );
        assert_eq!(Befehl::parsen("/abbrechen"), Befehl::AnmeldungAbbrechen);
        assert_eq!(Befehl::parsen("/abmelden"), Befehl::Abmelden);
        assert_eq!(
            Befehl::parsen("/foto bilder/katze.jpg"),
            Befehl::Foto(PathBuf::from("bilder/katze.jpg"))
        );
        assert_eq!(Befehl::parsen("/quit\n"), Befehl::Beenden);
    }

    #[test]
    fn text_und_leere_zeilen() {
        assert_eq!(Befehl::parsen("hallo welt"), Befehl::Text("hallo welt".into()));
        assert_eq!(Befehl::parsen("  "), Befehl::Leer);
        assert_eq!(Befehl::parsen(""), Befehl::Leer);
    }

    #[test]
    fn ungueltige_befehle() {
        assert!(matches!(Befehl::parsen("/anmelden"), Befehl::Ungueltig(_)));
        assert!(matches!(Befehl::parsen("/foto   "), Befehl::Ungueltig(_)));
        assert!(matches!(Befehl::parsen("/tanzen"), Befehl::Ungueltig(_)));
    }

    #[test]
    fn nachrichten_formatieren() {
        assert_eq!(
            nachricht_formatieren(&ChatNachricht::text("hallo", "alice")),
            "[alice] hallo"
        );
        assert_eq!(
            nachricht_formatieren(&ChatNachricht::foto("file:///x.jpg", "bob")),
            "[bob] <Foto: file:///x.jpg>"
        );
    }

    #[test]
    fn stille_ausgaben() {
        assert_eq!(ausgabe_formatieren(&UiAusgabe::EingabeGeleert), None);
        assert_eq!(ausgabe_formatieren(&UiAusgabe::SendenAktiviert(true)), None);
        assert_eq!(
            ausgabe_formatieren(&UiAusgabe::Laengenlimit(140)).as_deref(),
            Some("* Nachrichtenlimit: 140 Zeichen")
        );
    }
}
