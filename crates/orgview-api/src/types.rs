use orgview_core as core;
use serde::{Deserialize, Serialize};
use specta::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Type)]
pub enum RelationshipDto {
    Direct,
    Indirect,
    #[default]
    None,
}

impl From<core::Relationship> for RelationshipDto {
    fn from(value: core::Relationship) -> Self {
        match value {
            core::Relationship::Direct => Self::Direct,
            core::Relationship::Indirect => Self::Indirect,
            core::Relationship::None => Self::None,
        }
    }
}

impl From<RelationshipDto> for core::Relationship {
    fn from(value: RelationshipDto) -> Self {
        match value {
            RelationshipDto::Direct => Self::Direct,
            RelationshipDto::Indirect => Self::Indirect,
            RelationshipDto::None => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type)]
pub struct ConnectionCountsDto {
    // u32 keeps these as plain `number` on the TypeScript side.
    pub direct: u32,
    pub indirect: u32,
    pub none: u32,
}

impl From<core::ConnectionCounts> for ConnectionCountsDto {
    fn from(value: core::ConnectionCounts) -> Self {
        Self {
            direct: value.direct as u32,
            indirect: value.indirect as u32,
            none: value.none as u32,
        }
    }
}
