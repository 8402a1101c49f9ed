//! Location markers for the team map.

use orgview_core::{Champion, ConnectionCounts, EmployeeRecord, LocationBucket, Relationship};
use orgview_graph::{Color, marker_colors};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const MIN_MARKER_RADIUS: f32 = 8.0;
pub const MAX_MARKER_RADIUS: f32 = 25.0;
pub const RADIUS_PER_PERSON: f32 = 3.0;
/// Fraction of the marker span added on every side of the fitted bounds.
pub const BOUNDS_PADDING: f64 = 0.1;

const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("New York", 40.7128, -74.0060),
    ("San Francisco", 37.7749, -122.4194),
    ("Chicago", 41.8781, -87.6298),
    ("Austin", 30.2672, -97.7431),
    ("Seattle", 47.6062, -122.3321),
    ("Denver", 39.7392, -104.9903),
    ("London", 51.5074, -0.1278),
    ("Manchester", 53.4808, -2.2426),
    ("Berlin", 52.5200, 13.4050),
    ("Munich", 48.1351, 11.5820),
    ("Hamburg", 53.5511, 9.9937),
    ("Lisbon", 38.7223, -9.1393),
    ("Porto", 41.1579, -8.6291),
    ("Braga", 41.5518, -8.4229),
    ("Mumbai", 19.0760, 72.8777),
    ("Bangalore", 12.9716, 77.5946),
    ("Delhi", 28.7041, 77.1025),
    ("Chennai", 13.0827, 80.2707),
    ("Pune", 18.5204, 73.8567),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

pub fn city_coordinates(location: &str) -> Option<GeoPoint> {
    CITY_COORDINATES
        .iter()
        .find(|(city, _, _)| *city == location)
        .map(|&(_, lat, lng)| GeoPoint { lat, lng })
}

pub fn marker_radius(count: usize) -> f32 {
    (count as f32 * RADIUS_PER_PERSON).clamp(MIN_MARKER_RADIUS, MAX_MARKER_RADIUS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub location: String,
    pub country: String,
    pub point: GeoPoint,
    pub people: Vec<EmployeeRecord>,
    pub counts: ConnectionCounts,
    pub fill: Color,
    pub border: Color,
    pub radius: f32,
    pub highlighted: bool,
}

impl MapMarker {
    fn from_bucket(bucket: &LocationBucket, point: GeoPoint) -> Self {
        let counts: ConnectionCounts = bucket
            .people
            .iter()
            .map(|p| p.relationship_with_qt)
            .collect();
        let (fill, border) = marker_colors(counts.strongest());
        Self {
            location: bucket.location.clone(),
            country: bucket.country.clone(),
            point,
            people: bucket.people.clone(),
            counts,
            fill,
            border,
            radius: marker_radius(bucket.count),
            highlighted: false,
        }
    }

    pub fn strongest(&self) -> Relationship {
        self.counts.strongest()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.people.iter().any(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl MapBounds {
    pub fn around<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        for p in points {
            bounds.south = bounds.south.min(p.lat);
            bounds.north = bounds.north.max(p.lat);
            bounds.west = bounds.west.min(p.lng);
            bounds.east = bounds.east.max(p.lng);
        }
        Some(bounds)
    }

    /// Grow each side by `ratio` of the span.
    pub fn padded(self, ratio: f64) -> Self {
        let lat = (self.north - self.south) * ratio;
        let lng = (self.east - self.west) * ratio;
        Self {
            south: self.south - lat,
            west: self.west - lng,
            north: self.north + lat,
            east: self.east + lng,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lng)
    }
}

/// Markers for one team, plus the viewport that fits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    markers: Vec<MapMarker>,
    bounds: Option<MapBounds>,
    /// Locations dropped for lack of coordinates.
    skipped: Vec<String>,
}

impl MapView {
    pub fn from_buckets(buckets: &[LocationBucket]) -> Self {
        let mut markers = Vec::with_capacity(buckets.len());
        let mut skipped = Vec::new();
        for bucket in buckets {
            match city_coordinates(&bucket.location) {
                Some(point) => markers.push(MapMarker::from_bucket(bucket, point)),
                None => {
                    tracing::warn!(location = %bucket.location, "No coordinates found for location");
                    skipped.push(bucket.location.clone());
                }
            }
        }
        let bounds =
            MapBounds::around(markers.iter().map(|m| &m.point)).map(|b| b.padded(BOUNDS_PADDING));
        Self {
            markers,
            bounds,
            skipped,
        }
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    pub fn bounds(&self) -> Option<MapBounds> {
        self.bounds
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Mark every marker holding one of the champion's connections. Returns how many.
    pub fn highlight(&mut self, champion: &Champion) -> usize {
        let mut count = 0;
        for marker in &mut self.markers {
            marker.highlighted = champion.connections.iter().any(|c| marker.contains(&c.name));
            if marker.highlighted {
                count += 1;
            }
        }
        count
    }

    pub fn clear_highlight(&mut self) {
        for marker in &mut self.markers {
            marker.highlighted = false;
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for marker in &self.markers {
            let _ = writeln!(
                out,
                "{}{} ({}) - {} people [D:{} I:{} N:{}] r={} {}",
                if marker.highlighted { "* " } else { "  " },
                marker.location,
                marker.country,
                marker.people.len(),
                marker.counts.direct,
                marker.counts.indirect,
                marker.counts.none,
                marker.radius,
                marker.fill,
            );
        }
        for location in &self.skipped {
            let _ = writeln!(out, "  {location} - not on map");
        }
        out
    }
}
