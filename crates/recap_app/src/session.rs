use chrono::{Local, NaiveDateTime};
use recap_core::SessionId;
use uuid::Uuid;

/// Session ids look like `20260101_120000042`: local time to the second
/// followed by a three digit suffix so two jobs started in the same second
/// rarely collide.
pub fn generate_session_id(now: NaiveDateTime, suffix: u16) -> SessionId {
    SessionId::new(format!("{}{:03}", now.format("%Y%m%d_%H%M%S"), suffix % 1000))
}

/// Label shown as the job's start time.
pub fn started_at_label(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A fresh id and start label for a job submitted now.
pub fn new_session() -> (SessionId, String) {
    let now = Local::now().naive_local();
    let suffix = (Uuid::new_v4().as_u128() % 1000) as u16;
    (generate_session_id(now, suffix), started_at_label(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .and_then(|date| date.and_hms_opt(12, 3, 4))
            .expect("valid time")
    }

    #[test]
    fn session_id_is_timestamp_and_padded_suffix() {
        assert_eq!(generate_session_id(noon(), 42).as_str(), "20260102_120304042");
        assert_eq!(generate_session_id(noon(), 1999).as_str(), "20260102_120304999");
    }

    #[test]
    fn started_label_is_readable() {
        assert_eq!(started_at_label(noon()), "2026-01-02 12:03:04");
    }

    #[test]
    fn new_session_ids_have_expected_shape() {
        let (session_id, _) = new_session();
        let id = session_id.as_str();
        assert_eq!(id.len(), "YYYYMMDD_HHMMSSNNN".len());
        assert!(id
            .chars()
            .enumerate()
            .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() }));
    }
}
