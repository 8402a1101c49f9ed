//! Flat employee directory and the hierarchy views derived from it.
//!
//! Reporting lines are expressed through `manager_name`. Every derived view
//! (subordinates, hierarchy trees, location buckets) keeps directory order, and
//! managers that are not part of the directory are ignored.

pub mod connections;
pub mod error;

pub use connections::{ConnectionRecord, ConnectionRequest};
pub use error::DirectoryError;

use chrono::{DateTime, Utc};
use orgview_core::{
    ConnectionCounts, DirectoryFilters, EmployeeRecord, LocationBucket, PersonNode,
    is_representative,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SAMPLE_DIRECTORY: &str = include_str!("../data/sample_directory.json");

/// Where the records came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataOrigin {
    Bundled,
    File(PathBuf),
}

impl DataOrigin {
    pub fn label(&self) -> String {
        match self {
            DataOrigin::Bundled => "Sample Data".to_string(),
            DataOrigin::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryStats {
    pub total_employees: usize,
    pub departments: usize,
    pub countries: usize,
    pub connections: ConnectionCounts,
    pub loaded_at: DateTime<Utc>,
    pub data_source: String,
}

#[derive(Debug, Clone)]
pub struct Directory {
    records: Vec<EmployeeRecord>,
    connections: Vec<ConnectionRecord>,
    origin: DataOrigin,
    loaded_at: DateTime<Utc>,
}

/// Names compare trimmed and case-insensitively.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Directory {
    pub fn from_records(records: Vec<EmployeeRecord>, origin: DataOrigin) -> Self {
        tracing::info!(employees = records.len(), source = %origin.label(), "Loaded directory");
        Self {
            records,
            connections: Vec::new(),
            origin,
            loaded_at: Utc::now(),
        }
    }

    /// The dataset bundled with the crate.
    pub fn sample() -> Result<Self, DirectoryError> {
        let records: Vec<EmployeeRecord> = serde_json::from_str(SAMPLE_DIRECTORY)?;
        Ok(Self::from_records(records, DataOrigin::Bundled))
    }

    /// Load a JSON array of employee records.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<EmployeeRecord> = serde_json::from_str(&content)?;
        Ok(Self::from_records(records, DataOrigin::File(path.to_path_buf())))
    }

    /// Re-read the backing file. The bundled dataset just resets its timestamp.
    pub fn reload(&mut self) -> Result<usize, DirectoryError> {
        let fresh = match &self.origin {
            DataOrigin::Bundled => Self::sample()?,
            DataOrigin::File(path) => Self::load(path)?,
        };
        self.records = fresh.records;
        self.loaded_at = fresh.loaded_at;
        Ok(self.records.len())
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn origin(&self) -> &DataOrigin {
        &self.origin
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn find_person(&self, name: &str) -> Option<&EmployeeRecord> {
        let wanted = normalize_name(name);
        self.records.iter().find(|p| normalize_name(&p.name) == wanted)
    }

    fn find_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_name(name);
        self.records
            .iter()
            .position(|p| normalize_name(&p.name) == wanted)
    }

    /// Everyone reporting to `name`, directly or indirectly, depth-first in directory order.
    pub fn subordinates(&self, name: &str) -> Vec<&EmployeeRecord> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(name.to_string());
        self.collect_reports(name, &mut seen, &mut found);
        found
    }

    fn collect_reports<'a>(
        &'a self,
        manager: &str,
        seen: &mut HashSet<String>,
        found: &mut Vec<&'a EmployeeRecord>,
    ) {
        for person in self.records.iter().filter(|p| p.manager_name == manager) {
            // Reporting cycles in the source data would otherwise recurse forever.
            if !seen.insert(person.name.clone()) {
                tracing::warn!(person = %person.name, "Skipping repeated person in reporting chain");
                continue;
            }
            found.push(person);
            self.collect_reports(&person.name, seen, found);
        }
    }

    /// The person plus everyone below them.
    fn team(&self, name: &str) -> Result<Vec<&EmployeeRecord>, DirectoryError> {
        let person = self
            .find_person(name)
            .ok_or_else(|| DirectoryError::PersonNotFound(name.to_string()))?;
        let mut team = vec![person];
        team.extend(self.subordinates(&person.name));
        Ok(team)
    }

    /// Reporting tree rooted at `name`.
    pub fn hierarchy(&self, name: &str) -> Result<PersonNode, DirectoryError> {
        let team = self.team(name)?;
        let members: HashSet<&str> = team.iter().map(|p| p.name.as_str()).collect();

        let mut reports: HashMap<&str, Vec<&EmployeeRecord>> = HashMap::new();
        for person in &team[1..] {
            if members.contains(person.manager_name.as_str()) {
                reports
                    .entry(person.manager_name.as_str())
                    .or_default()
                    .push(person);
            }
        }

        let mut placed = HashSet::new();
        let root = build_node(team[0], &reports, &mut placed);
        tracing::debug!(root = %root.name, people = root.subtree_size(), "Built hierarchy");
        Ok(root)
    }

    /// People in the team grouped by location, in first-seen order.
    pub fn map_data(&self, name: &str) -> Result<Vec<LocationBucket>, DirectoryError> {
        let team = self.team(name)?;
        let mut buckets: Vec<LocationBucket> = Vec::new();

        for person in team {
            let location = person.display_location();
            match buckets.iter_mut().find(|b| b.location == location) {
                Some(bucket) => {
                    bucket.count += 1;
                    bucket.people.push(person.clone());
                }
                None => buckets.push(LocationBucket {
                    location: location.to_string(),
                    count: 1,
                    people: vec![person.clone()],
                    country: person.country.clone(),
                }),
            }
        }
        Ok(buckets)
    }

    pub fn filters(&self) -> DirectoryFilters {
        let departments: BTreeSet<&str> = self
            .records
            .iter()
            .map(|p| p.department.as_str())
            .filter(|d| !d.is_empty())
            .collect();
        let countries: BTreeSet<&str> = self
            .records
            .iter()
            .map(|p| p.country.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        DirectoryFilters {
            departments: departments.into_iter().map(str::to_string).collect(),
            countries: countries.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn stats(&self) -> DirectoryStats {
        let departments: HashSet<&str> = self.records.iter().map(|p| p.department.as_str()).collect();
        let countries: HashSet<&str> = self.records.iter().map(|p| p.country.as_str()).collect();
        DirectoryStats {
            total_employees: self.records.len(),
            departments: departments.len(),
            countries: countries.len(),
            connections: self.records.iter().map(|p| p.relationship_with_qt).collect(),
            loaded_at: self.loaded_at,
            data_source: self.origin.label(),
        }
    }

    /// Distinct representatives named anywhere in the directory, sorted.
    pub fn representatives(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .records
            .iter()
            .filter_map(|p| p.representative_from_qt.as_deref())
            .filter(|rep| is_representative(Some(*rep)))
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    pub fn connections(&self) -> &[ConnectionRecord] {
        &self.connections
    }

    /// Record a new connection. A matching employee picks up the champion and relationship.
    pub fn add_connection(
        &mut self,
        request: ConnectionRequest,
    ) -> Result<ConnectionRecord, DirectoryError> {
        request.validate()?;

        let matched = self.find_index(&request.name);
        if let Some(index) = matched {
            let person = &mut self.records[index];
            person.representative_from_qt = Some(request.connection_champion.trim().to_string());
            person.relationship_with_qt = request.relationship();
            tracing::info!(
                person = %person.name,
                champion = %request.connection_champion,
                relationship = %person.relationship_with_qt,
                "Updated employee connection"
            );
        }

        let record = ConnectionRecord {
            id: self.connections.len() + 1,
            created_at: Utc::now(),
            matched_employee: matched.is_some(),
            request,
        };
        tracing::info!(id = record.id, name = %record.request.name, "Added connection");
        self.connections.push(record.clone());
        Ok(record)
    }
}

fn build_node(
    person: &EmployeeRecord,
    reports: &HashMap<&str, Vec<&EmployeeRecord>>,
    placed: &mut HashSet<String>,
) -> PersonNode {
    placed.insert(person.name.clone());
    let mut node = person.to_person_node();
    if let Some(direct) = reports.get(person.name.as_str()) {
        for report in direct {
            if placed.contains(&report.name) {
                continue;
            }
            node.children.push(Arc::new(build_node(report, reports, placed)));
        }
    }
    node
}
