use orgview_api::{
    AddConnectionRequest, AddConnectionResponse, ApiError, AutocompleteRequest, ConnectionDto,
    EmployeeDto, FiltersDto, HealthDto, ReloadResponse, SearchRequest, StatsDto, SuggestionDto,
    SystemInfoDto,
};
use orgview_core::{EmployeeRecord, LocationBucket, PersonNode, SearchFilter};
use orgview_directory::{ConnectionRecord, ConnectionRequest, Directory, DirectoryError};
use orgview_search::{DEFAULT_AUTOCOMPLETE_LIMIT, SearchEngine};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn directory_error(err: DirectoryError) -> ApiError {
    match err {
        DirectoryError::PersonNotFound(name) => {
            ApiError::not_found(format!("Person not found: {name}"))
        }
        DirectoryError::InvalidConnection(message) => ApiError::invalid_argument(message),
        other => ApiError::internal(other.to_string()),
    }
}

fn clamp_usize_to_u32(v: usize) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

fn connection_dto(record: &ConnectionRecord) -> ConnectionDto {
    ConnectionDto {
        id: clamp_usize_to_u32(record.id),
        name: record.request.name.clone(),
        email: record.request.email.clone(),
        designation: record.request.designation.clone(),
        connection_champion: record.request.connection_champion.clone(),
        created_at: record.created_at.to_rfc3339(),
        matched_employee: record.matched_employee,
    }
}

struct ServiceState {
    directory: Directory,
    search_engine: SearchEngine,
}

/// Headless backend over the employee directory.
///
/// The HTTP server and the in-process data source both call into this; every
/// method returns API-shaped results so the two stay in agreement.
#[derive(Clone)]
pub struct DirectoryService {
    state: Arc<Mutex<ServiceState>>,
}

impl DirectoryService {
    pub fn new(directory: Directory) -> Self {
        let search_engine = SearchEngine::new(directory.records());
        tracing::info!(
            employees = directory.len(),
            source = %directory.origin().label(),
            "Directory service ready"
        );
        Self {
            state: Arc::new(Mutex::new(ServiceState {
                directory,
                search_engine,
            })),
        }
    }

    /// Service over the bundled sample directory.
    pub fn sample() -> Result<Self, DirectoryError> {
        Ok(Self::new(Directory::sample()?))
    }

    pub fn open(path: &Path) -> Result<Self, DirectoryError> {
        Ok(Self::new(Directory::load(path)?))
    }

    /// Re-read the backing file and re-index search.
    pub fn reload(&self) -> Result<ReloadResponse, ApiError> {
        let mut state = self.state.lock();
        let count = state.directory.reload().map_err(directory_error)?;
        let ServiceState {
            directory,
            search_engine,
        } = &mut *state;
        search_engine.index_records(directory.records());
        Ok(ReloadResponse {
            success: true,
            message: format!("Reload completed. Loaded {count} employees."),
            total_employees: clamp_usize_to_u32(count),
        })
    }

    pub fn search_records(&self, query: &str, filter: &SearchFilter) -> Vec<EmployeeRecord> {
        self.state.lock().search_engine.search(query, filter)
    }

    pub fn search(&self, req: SearchRequest) -> Vec<EmployeeDto> {
        let results = self.search_records(&req.q, &req.filter());
        tracing::debug!(query = %req.q, results = results.len(), "Search");
        results.iter().map(EmployeeDto::from).collect()
    }

    /// The person a free-text query most likely names.
    pub fn best_match(&self, query: &str) -> Option<EmployeeRecord> {
        let results = self.search_records(query, &SearchFilter::default());
        SearchEngine::best_match(query, &results).cloned()
    }

    pub fn hierarchy(&self, name: &str) -> Result<PersonNode, ApiError> {
        self.state
            .lock()
            .directory
            .hierarchy(name)
            .map_err(directory_error)
    }

    pub fn map_data(&self, name: &str) -> Result<Vec<LocationBucket>, ApiError> {
        self.state
            .lock()
            .directory
            .map_data(name)
            .map_err(directory_error)
    }

    pub fn filters(&self) -> FiltersDto {
        self.state.lock().directory.filters().into()
    }

    pub fn autocomplete(&self, req: AutocompleteRequest) -> Vec<SuggestionDto> {
        let limit = req
            .limit
            .map(|l| l as usize)
            .unwrap_or(DEFAULT_AUTOCOMPLETE_LIMIT);
        self.state
            .lock()
            .search_engine
            .autocomplete(&req.q, limit)
            .into_iter()
            .map(|s| SuggestionDto {
                name: s.name,
                position: s.position,
                department: s.department,
                score: s.score,
            })
            .collect()
    }

    pub fn stats(&self) -> StatsDto {
        let stats = self.state.lock().directory.stats();
        StatsDto {
            total_employees: clamp_usize_to_u32(stats.total_employees),
            departments: clamp_usize_to_u32(stats.departments),
            countries: clamp_usize_to_u32(stats.countries),
            connections: stats.connections.into(),
            last_sync: stats.loaded_at.to_rfc3339(),
            data_source: stats.data_source,
        }
    }

    pub fn add_connection(
        &self,
        req: AddConnectionRequest,
    ) -> Result<AddConnectionResponse, ApiError> {
        let request = ConnectionRequest {
            name: req.name,
            email: req.email,
            designation: req.designation,
            connection_champion: req.connection_champion,
            relationship: req.relationship.map(Into::into),
        };

        let mut state = self.state.lock();
        let ServiceState {
            directory,
            search_engine,
        } = &mut *state;
        let record = directory.add_connection(request).map_err(directory_error)?;
        if record.matched_employee {
            search_engine.index_records(directory.records());
        }

        Ok(AddConnectionResponse {
            success: true,
            message: "Connection added successfully".to_string(),
            data: connection_dto(&record),
            total_connections: clamp_usize_to_u32(directory.connections().len()),
        })
    }

    pub fn system_info(&self) -> SystemInfoDto {
        let state = self.state.lock();
        let directory = &state.directory;
        let loaded_at = directory.loaded_at().to_rfc3339();
        SystemInfoDto {
            success: true,
            data_source: directory.origin().label(),
            total_employees: clamp_usize_to_u32(directory.len()),
            last_updated: loaded_at.clone(),
            last_sync: loaded_at,
            representatives: directory.representatives(),
            version: VERSION.to_string(),
        }
    }

    pub fn health(&self) -> HealthDto {
        let state = self.state.lock();
        HealthDto {
            status: "healthy".to_string(),
            employees_loaded: clamp_usize_to_u32(state.directory.len()),
            new_connections: clamp_usize_to_u32(state.directory.connections().len()),
            version: VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgview_api::RelationshipDto;
    use orgview_core::Relationship;

    fn service() -> DirectoryService {
        DirectoryService::sample().unwrap()
    }

    #[test]
    fn test_hierarchy_unknown_person_is_not_found() {
        let err = service().hierarchy("Nobody Here").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.message.contains("Nobody Here"));
    }

    #[test]
    fn test_hierarchy_is_case_insensitive() {
        let root = service().hierarchy("sarah williams").unwrap();
        assert_eq!(root.name, "Sarah Williams");
        assert!(root.has_children());
    }

    #[test]
    fn test_search_and_filters_agree() {
        let service = service();
        let filters = service.filters();
        assert!(filters.departments.windows(2).all(|w| w[0] <= w[1]));
        assert!(filters.countries.contains(&"UK".to_string()));

        let uk = service.search(SearchRequest {
            q: String::new(),
            department: None,
            country: Some("UK".to_string()),
        });
        assert!(!uk.is_empty());
        assert!(uk.iter().all(|e| e.country == "UK"));
    }

    #[test]
    fn test_autocomplete_respects_limit() {
        let service = service();
        let hits = service.autocomplete(AutocompleteRequest {
            q: "a".to_string(),
            limit: Some(3),
        });
        assert!(hits.len() <= 3);
        assert!(!hits.is_empty());
    }

    #[test]
    fn test_add_connection_updates_directory_and_counts() {
        let service = service();
        let before = service.health().new_connections;

        let response = service
            .add_connection(AddConnectionRequest {
                name: "sarah williams".to_string(),
                connection_champion: "Mike".to_string(),
                relationship: Some(RelationshipDto::Indirect),
                ..Default::default()
            })
            .unwrap();

        assert!(response.success);
        assert!(response.data.matched_employee);
        assert_eq!(response.total_connections, before + 1);

        let root = service.hierarchy("Sarah Williams").unwrap();
        assert_eq!(root.relationship_with_qt, Relationship::Indirect);
        assert_eq!(root.representative_from_qt.as_deref(), Some("Mike"));
    }

    #[test]
    fn test_add_connection_requires_champion() {
        let err = service()
            .add_connection(AddConnectionRequest {
                name: "Someone New".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.code, "invalid_argument");
    }

    #[test]
    fn test_system_info_lists_representatives() {
        let info = service().system_info();
        assert_eq!(info.data_source, "Sample Data");
        assert!(info.representatives.contains(&"Mike".to_string()));
        assert!(!info.representatives.contains(&"No".to_string()));
        assert_eq!(info.version, VERSION);
    }
}
