mod dto;
mod errors;
mod types;

pub use dto::{
    AddConnectionRequest, AddConnectionResponse, AutocompleteRequest, ConnectionDto, EmployeeDto,
    FiltersDto, HealthDto, LocationBucketDto, PersonNodeDto, ReloadResponse, SearchRequest,
    StatsDto, SuggestionDto, SystemInfoDto,
};
pub use errors::ApiError;
pub use types::{ConnectionCountsDto, RelationshipDto};
