//! TopoJSON decoding.
//!
//! A topology stores every boundary once as an "arc" and lets geometries refer
//! to arcs by index. Converting an object back into standalone GeoJSON means
//! decoding the (optionally quantized, delta-encoded) arcs and stitching them
//! into lines and rings.

use std::collections::HashMap;

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Position, Value};
use serde::Deserialize;

use crate::error::{LoadError, TopologyError};

/// Quantization transform: `x * scale + translate` per axis
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    #[inline(always)]
    fn apply(&self, x: f64, y: f64) -> Position {
        vec![
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        ]
    }
}

/// Raw topology document as it appears on the wire
#[derive(Debug, Deserialize)]
pub struct Topology {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub objects: HashMap<String, TopoObject>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub transform: Option<Transform>,
}

/// A geometry object inside the topology, with its feature metadata
#[derive(Debug, Deserialize)]
pub struct TopoObject {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: Option<JsonObject>,
    /// `None` for geometry objects whose type is null
    #[serde(flatten)]
    pub shape: Option<Shape>,
}

/// Geometry variants; line and polygon types reference arcs by index
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    GeometryCollection { geometries: Vec<TopoObject> },
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    LineString { arcs: Vec<i64> },
    MultiLineString { arcs: Vec<Vec<i64>> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
}

/// Parse a topology document. The buffer is used as scratch space by simd-json.
pub fn parse(bytes: &mut [u8]) -> Result<Topology, LoadError> {
    let topology: Topology = simd_json::serde::from_slice(bytes)?;
    if topology.kind != "Topology" {
        return Err(TopologyError::NotATopology(topology.kind).into());
    }
    Ok(topology)
}

impl Topology {
    /// Convert a named object into GeoJSON features.
    ///
    /// A `GeometryCollection` yields one feature per member geometry; any other
    /// geometry yields a single feature.
    pub fn feature_collection(&self, object: &str) -> Result<FeatureCollection, TopologyError> {
        let obj = self
            .objects
            .get(object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;

        let decoder = ArcDecoder::new(self)?;

        let features = match &obj.shape {
            Some(Shape::GeometryCollection { geometries }) => geometries
                .iter()
                .map(|g| decoder.feature(g))
                .collect::<Result<Vec<_>, _>>()?,
            _ => vec![decoder.feature(obj)?],
        };

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }
}

/// Arc table decoded to absolute coordinates
struct ArcDecoder {
    arcs: Vec<Vec<Position>>,
    transform: Option<Transform>,
}

impl ArcDecoder {
    fn new(topology: &Topology) -> Result<Self, TopologyError> {
        let transform = topology.transform;
        let arcs = topology
            .arcs
            .iter()
            .map(|arc| decode_arc(arc, transform.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { arcs, transform })
    }

    fn feature(&self, obj: &TopoObject) -> Result<Feature, TopologyError> {
        Ok(Feature {
            bbox: None,
            geometry: obj.shape.as_ref().map(|s| self.geometry(s)).transpose()?,
            id: obj.id.as_ref().and_then(feature_id),
            properties: Some(obj.properties.clone().unwrap_or_default()),
            foreign_members: None,
        })
    }

    fn geometry(&self, shape: &Shape) -> Result<Geometry, TopologyError> {
        let value = match shape {
            Shape::GeometryCollection { geometries } => Value::GeometryCollection(
                geometries
                    .iter()
                    .filter_map(|g| g.shape.as_ref())
                    .map(|s| self.geometry(s))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Shape::Point { coordinates } => Value::Point(self.point(coordinates)?),
            Shape::MultiPoint { coordinates } => Value::MultiPoint(
                coordinates
                    .iter()
                    .map(|c| self.point(c))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Shape::LineString { arcs } => Value::LineString(self.line(arcs)?),
            Shape::MultiLineString { arcs } => Value::MultiLineString(
                arcs.iter()
                    .map(|l| self.line(l))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Shape::Polygon { arcs } => Value::Polygon(self.polygon(arcs)?),
            Shape::MultiPolygon { arcs } => Value::MultiPolygon(
                arcs.iter()
                    .map(|p| self.polygon(p))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        Ok(Geometry::new(value))
    }

    /// Points are quantized but not delta-encoded
    fn point(&self, coords: &[f64]) -> Result<Position, TopologyError> {
        let [x, y, ..] = coords else {
            return Err(TopologyError::ShortPosition(coords.len()));
        };
        Ok(match &self.transform {
            Some(t) => t.apply(*x, *y),
            None => vec![*x, *y],
        })
    }

    /// Stitch arcs end to end, dropping each shared junction point once
    fn line(&self, refs: &[i64]) -> Result<Vec<Position>, TopologyError> {
        let mut points: Vec<Position> = Vec::new();

        for &r in refs {
            let (idx, reversed) = if r < 0 { (!r, true) } else { (r, false) };
            let arc = usize::try_from(idx)
                .ok()
                .and_then(|i| self.arcs.get(i))
                .ok_or(TopologyError::ArcOutOfRange(r))?;

            points.pop();
            if reversed {
                points.extend(arc.iter().rev().cloned());
            } else {
                points.extend(arc.iter().cloned());
            }
        }

        if points.len() < 2 {
            if let Some(first) = points.first().cloned() {
                points.push(first);
            }
        }
        Ok(points)
    }

    /// Rings need at least four positions to be valid GeoJSON
    fn ring(&self, refs: &[i64]) -> Result<Vec<Position>, TopologyError> {
        let mut points = self.line(refs)?;
        if let Some(first) = points.first().cloned() {
            while points.len() < 4 {
                points.push(first.clone());
            }
        }
        Ok(points)
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<Position>>, TopologyError> {
        rings.iter().map(|r| self.ring(r)).collect()
    }
}

/// Undo delta encoding and quantization for one arc
fn decode_arc(arc: &[Vec<f64>], transform: Option<&Transform>) -> Result<Vec<Position>, TopologyError> {
    let mut x = 0.0;
    let mut y = 0.0;
    arc.iter()
        .map(|p| {
            let [dx, dy, ..] = p.as_slice() else {
                return Err(TopologyError::ShortPosition(p.len()));
            };
            Ok(match transform {
                Some(t) => {
                    x += dx;
                    y += dy;
                    t.apply(x, y)
                }
                None => vec![*dx, *dy],
            })
        })
        .collect()
}

fn feature_id(value: &serde_json::Value) -> Option<Id> {
    match value {
        serde_json::Value::String(s) => Some(Id::String(s.clone())),
        serde_json::Value::Number(n) => Some(Id::Number(n.clone())),
        _ => None,
    }
}
