use std::fmt;

use geojson::feature::Id;
use geojson::{Feature, Geometry, JsonObject, Value};

use crate::map::geometry::point_in_ring;

/// A closed ring of (lon, lat) coordinates
pub type Ring = Vec<(f64, f64)>;

/// Stable identifier for a country within one load
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CountryId(String);

impl CountryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id derived from the position in the loaded list
    pub fn positional(position: usize) -> Self {
        Self(format!("#{position}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lon/lat bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    fn of_ring(ring: &[(f64, f64)]) -> Option<Self> {
        let mut iter = ring.iter();
        let &(lon, lat) = iter.next()?;
        let mut bbox = Self {
            min_lon: lon,
            min_lat: lat,
            max_lon: lon,
            max_lat: lat,
        };
        for &(lon, lat) in iter {
            bbox.min_lon = bbox.min_lon.min(lon);
            bbox.max_lon = bbox.max_lon.max(lon);
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lat = bbox.max_lat.max(lat);
        }
        Some(bbox)
    }

    fn union(self, other: Self) -> Self {
        Self {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    #[inline(always)]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// One polygon: exterior ring followed by holes
#[derive(Clone, Debug)]
struct Polygon {
    rings: Vec<Ring>,
    bbox: BBox,
}

impl Polygon {
    /// Even-odd over all rings, so holes cancel out the exterior
    fn contains(&self, lon: f64, lat: f64) -> bool {
        if !self.bbox.contains(lon, lat) {
            return false;
        }
        self.rings
            .iter()
            .filter(|ring| point_in_ring(ring, lon, lat))
            .count()
            % 2
            == 1
    }
}

/// A country's geometry and descriptive properties.
///
/// Built once from a converted topology feature and never mutated.
#[derive(Clone, Debug)]
pub struct CountryFeature {
    pub id: CountryId,
    pub name: String,
    pub properties: JsonObject,
    polygons: Vec<Polygon>,
    bbox: Option<BBox>,
}

impl CountryFeature {
    /// Build from a GeoJSON feature found at `position` in the converted list
    pub fn from_feature(position: usize, feature: Feature) -> Self {
        let properties = feature.properties.unwrap_or_default();

        let id = match &feature.id {
            Some(Id::String(s)) => CountryId::new(s.clone()),
            Some(Id::Number(n)) => CountryId::new(n.to_string()),
            None => CountryId::positional(position),
        };

        let name = ["NAME", "name"]
            .iter()
            .find_map(|key| properties.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .or_else(|| feature.id.as_ref().map(|_| id.to_string()))
            .unwrap_or_else(|| "Unknown".to_string());

        let mut polygons = Vec::new();
        if let Some(geometry) = &feature.geometry {
            collect_polygons(geometry, &mut polygons);
        }
        let bbox = polygons.iter().map(|p| p.bbox).reduce(BBox::union);

        Self {
            id,
            name,
            properties,
            polygons,
            bbox,
        }
    }

    /// Whether (lon, lat) falls inside any of this country's polygons
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        match &self.bbox {
            Some(bbox) if bbox.contains(lon, lat) => self.polygons.iter().any(|p| p.contains(lon, lat)),
            _ => false,
        }
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.bbox
    }

    /// All rings of all polygons, for border drawing
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.polygons.iter().flat_map(|p| p.rings.iter())
    }
}

fn to_ring(coords: &[Vec<f64>]) -> Ring {
    coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
}

fn push_polygon(rings: &[Vec<Vec<f64>>], out: &mut Vec<Polygon>) {
    let rings: Vec<Ring> = rings.iter().map(|r| to_ring(r)).filter(|r| !r.is_empty()).collect();
    if let Some(bbox) = rings.first().and_then(|r| BBox::of_ring(r)) {
        out.push(Polygon { rings, bbox });
    }
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => push_polygon(rings, out),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                push_polygon(rings, out);
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Axis-aligned square country centred on (lon, lat)
    pub(crate) fn square(position: usize, name: &str, lon: f64, lat: f64, half: f64) -> CountryFeature {
        let ring = vec![
            vec![lon - half, lat - half],
            vec![lon + half, lat - half],
            vec![lon + half, lat + half],
            vec![lon - half, lat + half],
            vec![lon - half, lat - half],
        ];
        let mut properties = JsonObject::new();
        properties.insert("NAME".into(), json!(name));
        let feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        };
        CountryFeature::from_feature(position, feature)
    }

    fn feature(id: Option<Id>, properties: serde_json::Value) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id,
            properties: properties.as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn test_name_prefers_upper_case_key() {
        let c = CountryFeature::from_feature(0, feature(None, json!({"NAME": "Alba", "name": "alba"})));
        assert_eq!(c.name, "Alba");
    }

    #[test]
    fn test_name_falls_back_to_lower_case_then_id() {
        let lower = CountryFeature::from_feature(0, feature(None, json!({"name": "Borea"})));
        assert_eq!(lower.name, "Borea");

        let by_id = CountryFeature::from_feature(0, feature(Some(Id::String("250".into())), json!({})));
        assert_eq!(by_id.name, "250");

        let unknown = CountryFeature::from_feature(3, feature(None, json!({})));
        assert_eq!(unknown.name, "Unknown");
    }

    #[test]
    fn test_id_from_feature_or_position() {
        let numeric = CountryFeature::from_feature(0, feature(Some(Id::Number(76.into())), json!({})));
        assert_eq!(numeric.id.as_str(), "76");

        let positional = CountryFeature::from_feature(7, feature(None, json!({"name": "Cresh"})));
        assert_eq!(positional.id, CountryId::new("#7"));
    }

    #[test]
    fn test_extra_properties_are_kept() {
        let c = CountryFeature::from_feature(0, feature(None, json!({"name": "Alba", "pop": 12})));
        assert_eq!(c.properties.get("pop"), Some(&json!(12)));
    }

    #[test]
    fn test_contains_square() {
        let c = square(0, "Alba", 10.0, 20.0, 5.0);
        assert!(c.contains(10.0, 20.0));
        assert!(c.contains(14.0, 16.0));
        assert!(!c.contains(16.0, 20.0));
        assert!(!c.contains(10.0, 26.0));
    }

    #[test]
    fn test_hole_is_excluded() {
        let outer = vec![vec![0.0, 0.0], vec![10.0, 0.0], vec![10.0, 10.0], vec![0.0, 10.0], vec![0.0, 0.0]];
        let hole = vec![vec![4.0, 4.0], vec![6.0, 4.0], vec![6.0, 6.0], vec![4.0, 6.0], vec![4.0, 4.0]];
        let f = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![outer, hole]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        let c = CountryFeature::from_feature(0, f);
        assert!(c.contains(2.0, 2.0));
        assert!(!c.contains(5.0, 5.0));
    }

    #[test]
    fn test_without_geometry_contains_nothing() {
        let c = CountryFeature::from_feature(0, feature(None, json!({"name": "Nowhere"})));
        assert!(c.bbox().is_none());
        assert!(!c.contains(0.0, 0.0));
        assert_eq!(c.rings().count(), 0);
    }
}
