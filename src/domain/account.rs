use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted shape of a budget account row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetAccountRecord {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl BudgetAccountRecord {
    pub fn new(name: impl Into<String>, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_id,
            created_at: Utc::now(),
        }
    }
}

/// Persisted membership row linking a user to a budget account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountMemberRecord {
    pub budget_account_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Editor,
    Viewer,
}

impl MemberRole {
    /// Unknown stored roles degrade to read-only access.
    pub fn from_stored(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => MemberRole::Owner,
            "editor" | "member" => MemberRole::Editor,
            _ => MemberRole::Viewer,
        }
    }

    pub fn can_edit(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Editor)
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MemberRole::Owner => "owner",
            MemberRole::Editor => "editor",
            MemberRole::Viewer => "viewer",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountMember {
    pub user_id: Uuid,
    pub role: MemberRole,
}

/// A budget account together with its members, as handed to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetAccount {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub members: Vec<AccountMember>,
}

impl BudgetAccount {
    /// Maps the stored account row and its membership rows into the caller-facing value.
    ///
    /// Membership rows for other accounts are ignored. The owner is always listed first
    /// with the `Owner` role, even when no membership row exists for them.
    pub fn from_records(record: &BudgetAccountRecord, members: &[AccountMemberRecord]) -> Self {
        let mut mapped = vec![AccountMember {
            user_id: record.owner_id,
            role: MemberRole::Owner,
        }];
        for member in members
            .iter()
            .filter(|member| member.budget_account_id == record.id)
            .filter(|member| member.user_id != record.owner_id)
        {
            if mapped.iter().any(|existing| existing.user_id == member.user_id) {
                continue;
            }
            mapped.push(AccountMember {
                user_id: member.user_id,
                role: MemberRole::from_stored(&member.role),
            });
        }
        Self {
            id: record.id,
            name: record.name.clone(),
            owner_id: record.owner_id,
            members: mapped,
        }
    }

    pub fn role_of(&self, user_id: Uuid) -> Option<MemberRole> {
        self.members
            .iter()
            .find(|member| member.user_id == user_id)
            .map(|member| member.role)
    }
}
