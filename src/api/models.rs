use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default, alias = "totalPages")]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

// ============================================================================
// Employees
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub current_establishment_id: Option<String>,
    #[serde(default)]
    pub current_establishment_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeListResponse {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Filters for the employee list; blank values are left out of the request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeListParams {
    pub search: Option<String>,
    pub establishment_id: Option<String>,
    pub nationality: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl EmployeeListParams {
    pub fn to_pairs(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("search", self.search.clone()),
            ("establishment_id", self.establishment_id.clone()),
            ("nationality", self.nationality.clone()),
            ("status", self.status.clone()),
            ("sort_by", self.sort_by.clone()),
            ("page", self.page.map(|p| p.to_string())),
            ("limit", self.limit.map(|l| l.to_string())),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSearchResponse {
    #[serde(default)]
    pub employees: Vec<Employee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameSuggestionsResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Exists,
    NotExists,
}

impl VoteType {
    pub fn from_str_arg(s: &str) -> Option<Self> {
        match s {
            "exists" | "up" => Some(Self::Exists),
            "not_exists" | "down" => Some(Self::NotExists),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVoteRequest {
    pub vote_type: VoteType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    #[serde(default)]
    pub total_votes: u32,
    #[serde(default)]
    pub exists_votes: u32,
    #[serde(default)]
    pub not_exists_votes: u32,
    #[serde(default)]
    pub user_vote: Option<VoteType>,
}

impl ValidationStats {
    /// Share of "exists" votes in percent, 0 when nobody voted
    pub fn exists_ratio(&self) -> u32 {
        if self.total_votes == 0 {
            0
        } else {
            (u64::from(self.exists_votes) * 100 / u64::from(self.total_votes)) as u32
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalRequest {
    pub reason: String,
}

/// Deletion request for an employee profile with a supporting document
#[derive(Debug, Clone)]
pub struct DeletionRequest {
    pub reason: String,
    pub contact_email: Option<String>,
    pub document: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub message: String,
}

// ============================================================================
// Establishments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Establishment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstablishmentListResponse {
    #[serde(default)]
    pub establishments: Vec<Establishment>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstablishmentListParams {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub zone: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl EstablishmentListParams {
    pub fn to_pairs(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("search", self.search.clone()),
            ("category_id", self.category_id.map(|c| c.to_string())),
            ("zone", self.zone.clone()),
            ("page", self.page.map(|p| p.to_string())),
            ("limit", self.limit.map(|l| l.to_string())),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstablishmentCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<EstablishmentCategory>,
}
