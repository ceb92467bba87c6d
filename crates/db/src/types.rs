use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[default]
    #[sea_orm(string_value = "developer")]
    Developer,
}

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "onhold")]
    OnHold,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkItemStatus {
    #[default]
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inprogress")]
    InProgress,
    #[sea_orm(string_value = "committed")]
    Committed,
    #[sea_orm(string_value = "done")]
    Done,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "removed")]
    Removed,
}

impl WorkItemStatus {
    /// Maps a remote board state to the local status. Comparison is
    /// case-insensitive; callers fall back to `New` on an unrecognized state.
    pub fn from_remote_state(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "new" | "to do" | "todo" | "proposed" => Some(Self::New),
            "active" | "approved" => Some(Self::Active),
            "in progress" | "inprogress" | "doing" => Some(Self::InProgress),
            "committed" => Some(Self::Committed),
            "done" => Some(Self::Done),
            "completed" => Some(Self::Completed),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }

    /// Statuses counted as finished work in the project status report.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Committed | Self::Done | Self::Completed)
    }
}

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkItemKind {
    #[default]
    #[sea_orm(string_value = "task")]
    Task,
    #[sea_orm(string_value = "bug")]
    Bug,
    #[sea_orm(string_value = "feature")]
    Feature,
    #[sea_orm(string_value = "backlog")]
    Backlog,
}

impl WorkItemKind {
    /// Maps a remote work item type name onto the local kind allow-list.
    /// Remote systems use compound names ("Product Backlog Item"), so this
    /// is a contains-match. Types outside the allow-list return `None` and
    /// are skipped by the reconciler.
    pub fn from_remote_kind(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.contains("backlog") {
            Some(Self::Backlog)
        } else if normalized.contains("feature") {
            Some(Self::Feature)
        } else if normalized.contains("bug") {
            Some(Self::Bug)
        } else if normalized.contains("task") {
            Some(Self::Task)
        } else {
            None
        }
    }
}

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkItemPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TShirtSize {
    #[sea_orm(string_value = "xs")]
    Xs,
    #[sea_orm(string_value = "s")]
    S,
    #[sea_orm(string_value = "m")]
    M,
    #[sea_orm(string_value = "l")]
    L,
    #[sea_orm(string_value = "xl")]
    Xl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_state_mapping_is_case_insensitive() {
        assert_eq!(
            WorkItemStatus::from_remote_state("Committed"),
            Some(WorkItemStatus::Committed)
        );
        assert_eq!(
            WorkItemStatus::from_remote_state("DONE"),
            Some(WorkItemStatus::Done)
        );
        assert_eq!(
            WorkItemStatus::from_remote_state("To Do"),
            Some(WorkItemStatus::New)
        );
        assert_eq!(WorkItemStatus::from_remote_state("Blocked By Vendor"), None);
    }

    #[test]
    fn completed_set_matches_report_semantics() {
        assert!(WorkItemStatus::Committed.is_completed());
        assert!(WorkItemStatus::Done.is_completed());
        assert!(WorkItemStatus::Completed.is_completed());
        assert!(!WorkItemStatus::New.is_completed());
        assert!(!WorkItemStatus::Resolved.is_completed());
    }

    #[test]
    fn remote_kind_mapping_uses_contains_semantics() {
        assert_eq!(
            WorkItemKind::from_remote_kind("Product Backlog Item"),
            Some(WorkItemKind::Backlog)
        );
        assert_eq!(WorkItemKind::from_remote_kind("Bug"), Some(WorkItemKind::Bug));
        assert_eq!(
            WorkItemKind::from_remote_kind("task"),
            Some(WorkItemKind::Task)
        );
        assert_eq!(WorkItemKind::from_remote_kind("Epic"), None);
    }
}
