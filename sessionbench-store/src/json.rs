//! JSON Output

use crate::catalog::CatalogState;

/// Serialize a catalog snapshot as pretty-printed JSON.
pub fn generate_json_history(state: &CatalogState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_summary_rows;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_json_history() {
        let rows = parse_summary_rows(
            "k,\"n\",s,1,1,0,1,1,\"1\",1\n",
            "S1",
            DateTime::<Utc>::from(std::time::UNIX_EPOCH),
        );
        let state = CatalogState {
            rows,
            session_ids: vec!["S1".into()],
            latest_session_id: Some("S1".into()),
        };

        let json = generate_json_history(&state).unwrap();
        let back: CatalogState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert!(json.contains("\"latest_session_id\": \"S1\""));
    }
}
