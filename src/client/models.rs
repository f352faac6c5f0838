//! Platform Data Types
//!
//! Typed views over the GraphQL `data` payloads. Each query requests a
//! different subset of fields, so most fields are optional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single transaction record (XP gain, skill level, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// XP in bytes, or a skill level in percent
    pub amount: f64,
    /// When the transaction was recorded
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Transaction type (`xp`, `skill_go`, ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Curriculum path of the object
    #[serde(default)]
    pub path: Option<String>,
    /// The project/exercise the transaction is attached to
    #[serde(default)]
    pub object: Option<TransactionObject>,
}

impl Transaction {
    /// XP transaction at a point in time
    pub fn xp(amount: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            amount,
            created_at: Some(created_at),
            kind: Some("xp".to_string()),
            path: None,
            object: None,
        }
    }

    /// Skill transaction (`type` is the raw `skill_*` name)
    pub fn skill(kind: impl Into<String>, amount: f64) -> Self {
        Self {
            amount,
            created_at: None,
            kind: Some(kind.into()),
            path: None,
            object: None,
        }
    }

    /// Builder method: attach the owning object
    pub fn object(mut self, name: impl Into<String>, kind: impl Into<String>) -> Self {
        self.object = Some(TransactionObject {
            name: name.into(),
            kind: kind.into(),
        });
        self
    }
}

/// Object (project, exercise, piscine) a transaction belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionObject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Identity fields of the signed-in user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    /// Name shown in the welcome banner: `lastName firstName`, else the login
    pub fn display_name(&self) -> String {
        let name = [self.last_name.as_deref(), self.first_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            self.login.clone().unwrap_or_else(|| "student".to_string())
        } else {
            name
        }
    }
}

/// Audit statistics of the signed-in user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    /// `totalUp / totalDown`; null until the user has been audited
    #[serde(default)]
    pub audit_ratio: Option<f64>,
    /// XP earned by auditing others (bytes)
    #[serde(default)]
    pub total_up: f64,
    /// XP received from audits (bytes)
    #[serde(default)]
    pub total_down: f64,
}

// ============================================
// Query payloads
// ============================================

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub user: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct AuditResponse {
    #[serde(default)]
    pub user: Vec<AuditStats>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionResponse {
    #[serde(default)]
    pub transaction: Vec<Transaction>,
}

impl TransactionResponse {
    /// Sum of all amounts
    pub fn total(&self) -> f64 {
        self.transaction.iter().map(|t| t.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transactions() {
        let json = r#"{"transaction": [
            {"amount": 1500, "createdAt": "2024-01-15T10:20:30.123456+00:00", "path": "/oujda/module/go-reloaded",
             "object": {"name": "go-reloaded", "type": "project"}},
            {"amount": 25, "type": "skill_go"}
        ]}"#;

        let parsed: TransactionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.transaction.len(), 2);

        let first = &parsed.transaction[0];
        assert_eq!(first.amount, 1500.0);
        assert!(first.created_at.is_some());
        assert_eq!(first.object.as_ref().unwrap().kind, "project");

        let second = &parsed.transaction[1];
        assert_eq!(second.kind.as_deref(), Some("skill_go"));
        assert_eq!(parsed.total(), 1525.0);
    }

    #[test]
    fn test_display_name() {
        let user = User {
            login: Some("jdoe".into()),
            first_name: Some("John".into()),
            last_name: Some("Doe".into()),
        };
        assert_eq!(user.display_name(), "Doe John");

        let anonymous = User {
            login: Some("jdoe".into()),
            ..Default::default()
        };
        assert_eq!(anonymous.display_name(), "jdoe");
    }

    #[test]
    fn test_audit_ratio_nullable() {
        let parsed: AuditResponse =
            serde_json::from_str(r#"{"user": [{"auditRatio": null, "totalUp": 0, "totalDown": 0}]}"#)
                .unwrap();
        assert_eq!(parsed.user[0].audit_ratio, None);
    }
}
