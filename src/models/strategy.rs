use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the strategies table.
#[derive(Debug, Clone, FromRow)]
pub struct StrategyRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A strategy with its rules in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub rules: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Strategy {
    pub fn from_row(row: StrategyRow, rules: Vec<String>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            rules,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Body of strategy create and full-replace requests.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStrategy {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<String>,
    pub is_active: Option<bool>,
}

impl NewStrategy {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        Ok(())
    }

    /// Rules trimmed, blanks dropped, order kept.
    pub fn normalized_rules(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_rules_keeps_order() {
        let s = NewStrategy {
            name: "Breakout".into(),
            description: None,
            rules: vec![
                " wait for close above range ".into(),
                "".into(),
                "volume > 20d avg".into(),
                "   ".into(),
            ],
            is_active: None,
        };
        assert_eq!(
            s.normalized_rules(),
            vec!["wait for close above range", "volume > 20d avg"]
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        let s = NewStrategy {
            name: " ".into(),
            description: None,
            rules: vec![],
            is_active: None,
        };
        assert!(s.validate().is_err());
    }
}
