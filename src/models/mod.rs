use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Appointments ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: u64,
    pub title: Option<String>,
    pub location: Option<String>,
    /// `None` when the backend sent no date or an unparseable one; such
    /// appointments are excluded from the calendar and the buckets.
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub date: Option<DateTime<Utc>>,
    pub client_id: Option<u64>,
    pub realtor_id: u64,
    pub property_id: Option<u64>,
    pub notes: Option<String>,
}

// ─── Properties ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: u64,
    pub title: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub price: Option<f64>,
    pub beds: Option<u32>,
    pub baths: Option<u32>,
    pub sqft: Option<u32>,
    pub status: Option<String>,
    pub listed_at: Option<DateTime<Utc>>,
    pub photo_url: Option<String>,
}

// ─── Clients ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: u64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Pipeline stage, e.g. "lead", "viewing", "offer", "closed".
    pub stage: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

// ─── Messages ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    User,
    Client,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub sender_kind: ParticipantKind,
    pub sender_id: u64,
    pub body: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub read: Option<bool>,
}

/// A message sender resolved against the fetched user/client lists.
/// Tagged so rendering handles both sides exhaustively instead of
/// duck-typing on whichever fields happen to be present.
#[derive(Debug, Clone, Copy)]
pub enum Participant<'a> {
    User(&'a User),
    Client(&'a Client),
}

impl Participant<'_> {
    pub fn display_name(&self) -> &str {
        match self {
            Participant::User(u) => u.name.as_deref().unwrap_or("Unnamed agent"),
            Participant::Client(c) => c.name.as_deref().unwrap_or("Unnamed client"),
        }
    }
}

// ─── Activity feed ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: u64,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

// ─── User / Profile ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub agency: Option<String>,
    pub avatar_url: Option<String>,
}

// ─── Theme settings ─────────────────────────────────────────────────────────

/// Raw CMS theme record. Every field is optional on the wire; the theme
/// module resolves each one to a concrete value with documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub tertiary_color: Option<String>,
    pub text_color: Option<String>,
    pub link_color: Option<String>,
    pub navigation_color: Option<String>,
    pub header_color: Option<String>,
    pub section_color: Option<String>,
    pub heading_font: Option<String>,
    pub heading_font_weight: Option<String>,
    pub body_font: Option<String>,
    pub body_font_weight: Option<String>,
    pub logo: Option<String>,
}

// ─── Lenient date parsing ───────────────────────────────────────────────────

/// Accepts an RFC 3339 timestamp, `null`, or garbage; garbage becomes
/// `None` with a warning instead of failing the whole response body.
mod lenient_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(err) => {
                tracing::warn!("skipping unparseable appointment date {s:?}: {err}");
                None
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_with_bad_date_still_deserializes() {
        let json = r#"{"id":7,"title":"Viewing","date":"not-a-date","realtorId":1}"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.id, 7);
        assert!(appt.date.is_none());
    }

    #[test]
    fn appointment_date_parses_rfc3339() {
        let json = r#"{"id":7,"date":"2024-02-29T10:30:00Z","realtorId":1}"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        let date = appt.date.unwrap();
        assert_eq!(date.to_rfc3339(), "2024-02-29T10:30:00+00:00");
    }

    #[test]
    fn appointment_without_realtor_is_rejected() {
        let json = r#"{"id":7,"title":"Viewing","date":"2024-02-29T10:30:00Z"}"#;
        assert!(serde_json::from_str::<Appointment>(json).is_err());
    }

    #[test]
    fn sender_kind_is_lowercase_on_the_wire() {
        let json = r#"{"id":1,"senderKind":"client","senderId":4}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.sender_kind, ParticipantKind::Client);
    }
}
