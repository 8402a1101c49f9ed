use crate::types::{ConnectionCountsDto, RelationshipDto};
use orgview_core as core;
use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
#[serde(default)]
pub struct SearchRequest {
    pub q: String,
    pub department: Option<String>,
    pub country: Option<String>,
}

impl SearchRequest {
    pub fn filter(&self) -> core::SearchFilter {
        core::SearchFilter {
            department: self.department.clone(),
            country: self.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct EmployeeDto {
    pub name: String,
    pub position: String,
    pub department: String,
    pub country: String,
    pub ldap: String,
    pub manager_name: String,
    pub location: String,
    pub photo_url: String,
    pub relationship_with_qt: RelationshipDto,
    pub representative_from_qt: Option<String>,
}

impl From<&core::EmployeeRecord> for EmployeeDto {
    fn from(value: &core::EmployeeRecord) -> Self {
        Self {
            name: value.name.clone(),
            position: value.position.clone(),
            department: value.department.clone(),
            country: value.country.clone(),
            ldap: value.ldap.clone(),
            manager_name: value.manager_name.clone(),
            location: value.location.clone(),
            photo_url: value.photo_url.clone(),
            relationship_with_qt: value.relationship_with_qt.into(),
            representative_from_qt: value.representative_from_qt.clone(),
        }
    }
}

/// Hierarchy node as served by `/api/hierarchy/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct PersonNodeDto {
    pub name: String,
    pub position: String,
    pub department: String,
    pub country: String,
    pub location: String,
    pub photo_url: String,
    pub relationship_with_qt: RelationshipDto,
    pub representative_from_qt: Option<String>,
    pub children: Vec<PersonNodeDto>,
}

impl From<&core::PersonNode> for PersonNodeDto {
    fn from(value: &core::PersonNode) -> Self {
        Self {
            name: value.name.clone(),
            position: value.position.clone(),
            department: value.department.clone(),
            country: value.country.clone(),
            location: value.location.clone(),
            photo_url: value.photo_url.clone(),
            relationship_with_qt: value.relationship_with_qt.into(),
            representative_from_qt: value.representative_from_qt.clone(),
            children: value.children.iter().map(|c| c.as_ref().into()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct LocationBucketDto {
    pub location: String,
    pub count: u32,
    pub people: Vec<EmployeeDto>,
    pub country: String,
}

impl From<&core::LocationBucket> for LocationBucketDto {
    fn from(value: &core::LocationBucket) -> Self {
        Self {
            location: value.location.clone(),
            count: value.count as u32,
            people: value.people.iter().map(EmployeeDto::from).collect(),
            country: value.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct FiltersDto {
    pub departments: Vec<String>,
    pub countries: Vec<String>,
}

impl From<core::DirectoryFilters> for FiltersDto {
    fn from(value: core::DirectoryFilters) -> Self {
        Self {
            departments: value.departments,
            countries: value.countries,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
#[serde(default)]
pub struct AutocompleteRequest {
    pub q: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct SuggestionDto {
    pub name: String,
    pub position: String,
    pub department: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct StatsDto {
    pub total_employees: u32,
    pub departments: u32,
    pub countries: u32,
    pub connections: ConnectionCountsDto,
    /// RFC 3339 timestamp of the last directory load.
    pub last_sync: String,
    pub data_source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
#[serde(default)]
pub struct AddConnectionRequest {
    pub name: String,
    pub email: String,
    pub designation: String,
    #[serde(alias = "connectionChampion")]
    pub connection_champion: String,
    pub relationship: Option<RelationshipDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct ConnectionDto {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub designation: String,
    pub connection_champion: String,
    pub created_at: String,
    pub matched_employee: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct AddConnectionResponse {
    pub success: bool,
    pub message: String,
    pub data: ConnectionDto,
    pub total_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct SystemInfoDto {
    pub success: bool,
    pub data_source: String,
    pub total_employees: u32,
    pub last_updated: String,
    pub last_sync: String,
    pub representatives: Vec<String>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct ReloadResponse {
    pub success: bool,
    pub message: String,
    pub total_employees: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct HealthDto {
    pub status: String,
    pub employees_loaded: u32,
    pub new_connections: u32,
    pub version: String,
}
