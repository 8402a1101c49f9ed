use crate::error::DirectoryError;
use chrono::{DateTime, Utc};
use orgview_core::Relationship;
use serde::{Deserialize, Serialize};

/// Contact submitted through the add-connection form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionRequest {
    pub name: String,
    pub email: String,
    pub designation: String,
    #[serde(alias = "connectionChampion")]
    pub connection_champion: String,
    /// Defaults to a direct connection when omitted.
    pub relationship: Option<Relationship>,
}

impl ConnectionRequest {
    pub fn validate(&self) -> Result<(), DirectoryError> {
        if self.name.trim().is_empty() {
            return Err(DirectoryError::InvalidConnection("name is required".to_string()));
        }
        if self.connection_champion.trim().is_empty() {
            return Err(DirectoryError::InvalidConnection(
                "connection champion is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn relationship(&self) -> Relationship {
        self.relationship.unwrap_or(Relationship::Direct)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: usize,
    pub created_at: DateTime<Utc>,
    /// Whether the name matched an employee already in the directory.
    pub matched_employee: bool,
    #[serde(flatten)]
    pub request: ConnectionRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_form_field_names() {
        let request: ConnectionRequest = serde_json::from_str(
            r#"{"name": "Emma Wilson", "email": "e@x.com", "connectionChampion": "Mike"}"#,
        )
        .unwrap();
        assert_eq!(request.connection_champion, "Mike");
        assert_eq!(request.relationship(), Relationship::Direct);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let missing_name = ConnectionRequest {
            connection_champion: "Mike".to_string(),
            ..ConnectionRequest::default()
        };
        assert!(matches!(
            missing_name.validate(),
            Err(DirectoryError::InvalidConnection(_))
        ));

        let missing_champion = ConnectionRequest {
            name: "Someone".to_string(),
            ..ConnectionRequest::default()
        };
        assert!(missing_champion.validate().is_err());
    }
}
