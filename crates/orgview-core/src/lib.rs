pub mod analytics;
pub mod error;
pub mod person;
pub mod relationship;

pub use analytics::{
    BusinessOpportunityStats, Champion, ChampionConnection, ContactSummary, OpportunityBanner,
    analyze_business_opportunities, analyze_representatives, initials, is_representative,
};
pub use error::CoreError;
pub use person::{EmployeeRecord, LocationBucket, PersonNode, PreOrder};
pub use relationship::{ConnectionCounts, Relationship};

use serde::{Deserialize, Serialize};

/// Department and country values present in the directory, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryFilters {
    pub departments: Vec<String>,
    pub countries: Vec<String>,
}

/// Optional exact-match narrowing applied after a text search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub department: Option<String>,
    pub country: Option<String>,
}

impl SearchFilter {
    pub fn matches(&self, record: &EmployeeRecord) -> bool {
        let department_ok = self
            .department
            .as_deref()
            .filter(|d| !d.is_empty())
            .is_none_or(|d| record.department == d);
        let country_ok = self
            .country
            .as_deref()
            .filter(|c| !c.is_empty())
            .is_none_or(|c| record.country == c);
        department_ok && country_ok
    }
}
