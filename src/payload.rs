//! Builders for structured code content: URLs, Wi-Fi credentials, contacts
//! and geographic locations.
//!
//! Each builder validates its input and returns the exact string to hand to
//! [`Generator::set_content`](crate::generator::Generator::set_content).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("latitude {0} is outside -90..=90")]
    Latitude(f64),
    #[error("longitude {0} is outside -180..=180")]
    Longitude(f64),
    #[error("unknown Wi-Fi authentication '{0}' (expected WPA, WEP or nopass)")]
    UnknownAuth(String),
    #[error("an open network takes no password")]
    UnexpectedPassword,
}

/// `https://` is prepended when `input` has no scheme.
pub fn url(input: &str) -> Result<String, PayloadError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PayloadError::Empty("url"));
    }
    if has_scheme(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{trimmed}"))
    }
}

/// RFC 3986 scheme: a letter, then letters, digits, `+`, `-` or `.`, then `:`.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        // "localhost:8080" is a host and port, not a scheme
        && !input[scheme.len() + 1..].starts_with(|c: char| c.is_ascii_digit())
}

// ============================================================================
// Wi-Fi
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WifiAuth {
    #[default]
    Wpa,
    Wep,
    Open,
}

impl WifiAuth {
    fn as_str(self) -> &'static str {
        match self {
            WifiAuth::Wpa => "WPA",
            WifiAuth::Wep => "WEP",
            WifiAuth::Open => "nopass",
        }
    }
}

impl fmt::Display for WifiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WifiAuth {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wpa" | "wpa2" | "wpa3" => Ok(WifiAuth::Wpa),
            "wep" => Ok(WifiAuth::Wep),
            "nopass" | "open" | "none" => Ok(WifiAuth::Open),
            _ => Err(PayloadError::UnknownAuth(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Wifi {
    pub ssid: String,
    pub password: Option<String>,
    pub auth: WifiAuth,
    pub hidden: bool,
}

/// Backslash-escape the characters the `WIFI:` and `MECARD`-style formats
/// treat as delimiters.
fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn wifi(network: &Wifi) -> Result<String, PayloadError> {
    if network.ssid.is_empty() {
        return Err(PayloadError::Empty("ssid"));
    }
    let password = network.password.as_deref().filter(|p| !p.is_empty());
    if network.auth == WifiAuth::Open && password.is_some() {
        return Err(PayloadError::UnexpectedPassword);
    }

    let mut out = format!("WIFI:T:{};S:{};", network.auth, escape_field(&network.ssid));
    if let Some(password) = password {
        out.push_str(&format!("P:{};", escape_field(password)));
    }
    if network.hidden {
        out.push_str("H:true;");
    }
    out.push(';');
    Ok(out)
}

// ============================================================================
// Geo
// ============================================================================

/// `geo:` URI (RFC 5870) for a WGS-84 point.
pub fn geo(latitude: f64, longitude: f64) -> Result<String, PayloadError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(PayloadError::Latitude(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(PayloadError::Longitude(longitude));
    }
    Ok(format!("geo:{latitude},{longitude}"))
}

// ============================================================================
// Contact
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub organization: Option<String>,
}

/// vCard text values escape `\`, `;` and `,`.
fn escape_vcard(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
}

/// A vCard 3.0 card with CRLF line endings.
pub fn contact(card: &Contact) -> Result<String, PayloadError> {
    let name = card.name.trim();
    if name.is_empty() {
        return Err(PayloadError::Empty("name"));
    }

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", escape_vcard(name)),
    ];
    let optional = [
        ("ORG", &card.organization),
        ("TEL", &card.phone),
        ("EMAIL", &card.email),
    ];
    for (key, value) in optional {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            lines.push(format!("{key}:{}", escape_vcard(value)));
        }
    }
    lines.push("END:VCARD".to_string());
    Ok(lines.join("\r\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_adds_missing_scheme() {
        assert_eq!(url("example.com/a").unwrap(), "https://example.com/a");
        assert_eq!(url("  http://x.org ").unwrap(), "http://x.org");
        assert_eq!(url("mailto:me@x.org").unwrap(), "mailto:me@x.org");
        assert_eq!(url("localhost:8080").unwrap(), "https://localhost:8080");
    }

    #[test]
    fn url_rejects_blank() {
        assert_eq!(url("   "), Err(PayloadError::Empty("url")));
    }

    #[test]
    fn wifi_escapes_special_characters() {
        let network = Wifi {
            ssid: "cafe;net".into(),
            password: Some(r#"p:a"ss\"#.into()),
            auth: WifiAuth::Wpa,
            hidden: true,
        };
        assert_eq!(
            wifi(&network).unwrap(),
            r#"WIFI:T:WPA;S:cafe\;net;P:p\:a\"ss\\;H:true;;"#
        );
    }

    #[test]
    fn open_wifi_has_no_password_field() {
        let network = Wifi {
            ssid: "guest".into(),
            auth: WifiAuth::Open,
            ..Wifi::default()
        };
        assert_eq!(wifi(&network).unwrap(), "WIFI:T:nopass;S:guest;;");
    }

    #[test]
    fn open_wifi_with_password_is_rejected() {
        let network = Wifi {
            ssid: "guest".into(),
            password: Some("secret".into()),
            auth: WifiAuth::Open,
            hidden: false,
        };
        assert_eq!(wifi(&network), Err(PayloadError::UnexpectedPassword));
    }

    #[test]
    fn wifi_auth_parses_aliases() {
        assert_eq!("WPA2".parse::<WifiAuth>().unwrap(), WifiAuth::Wpa);
        assert_eq!("open".parse::<WifiAuth>().unwrap(), WifiAuth::Open);
        assert!(matches!(
            "psk".parse::<WifiAuth>(),
            Err(PayloadError::UnknownAuth(_))
        ));
    }

    #[test]
    fn geo_checks_ranges() {
        assert_eq!(geo(52.5, 13.4).unwrap(), "geo:52.5,13.4");
        assert_eq!(geo(-90.0, 180.0).unwrap(), "geo:-90,180");
        assert_eq!(geo(91.0, 0.0), Err(PayloadError::Latitude(91.0)));
        assert_eq!(geo(0.0, -180.5), Err(PayloadError::Longitude(-180.5)));
    }

    #[test]
    fn contact_skips_blank_fields() {
        let card = Contact {
            name: "Ada Lovelace".into(),
            phone: Some("+44 20 0000".into()),
            email: Some("  ".into()),
            organization: Some("Analytical, Ltd".into()),
        };
        assert_eq!(
            contact(&card).unwrap(),
            "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Ada Lovelace\r\nORG:Analytical\\, Ltd\r\nTEL:+44 20 0000\r\nEND:VCARD"
        );
    }

    #[test]
    fn contact_requires_name() {
        assert_eq!(contact(&Contact::default()), Err(PayloadError::Empty("name")));
    }
}
