//! Vectorization output model and its GeoJSON rendering.

use super::options::VisualizationStyle;
use geo::{LineString, Polygon};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Counts of contours seen and dropped at each filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteringStats {
    pub total_detected: usize,
    pub filtered_by_pixels: usize,
    pub filtered_by_area: usize,
    /// Contours that could not be repaired into any simple polygon
    pub repair_failures: usize,
    /// Contours with fewer than three distinct vertices or zero area
    pub degenerate: usize,
    /// Smaller loops dropped while repairing pinched boundaries
    pub discarded_fragments: usize,
    pub kept: usize,
}

/// Parameters echoed into the collection metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingParams {
    pub morphology_kernel: usize,
    pub min_area_pixels: f64,
    pub min_area_meters: f64,
    pub adaptive_threshold: bool,
    pub keep_holes: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub block_count: usize,
    /// Sum of block ground areas, rounded to 2 decimals
    pub total_area_m2: f64,
    /// Mean block confidence, rounded to 3 decimals
    pub avg_confidence: f64,
    pub threshold_used: f32,
    pub processing_params: ProcessingParams,
    pub filtering_stats: FilteringStats,
    /// No transform was available; ground areas and CRS are omitted
    pub transform_missing: bool,
}

/// One detected mining block.
#[derive(Clone, Debug, PartialEq)]
pub struct MineBlock {
    /// 1-based, in descending `area_px` order
    pub block_index: usize,
    pub block_id: String,
    pub name: String,
    pub tile_id: Option<String>,
    pub polygon: Polygon<f64>,
    /// Closed boundary ring in pixel coordinates
    pub pixel_ring: Vec<[f64; 2]>,
    pub area_px: u64,
    pub area_m2: Option<f64>,
    pub avg_confidence: f64,
    /// Polygon centroid, also the label anchor
    pub centroid: [f64; 2],
    /// `[min_x, min_y, max_x, max_y]`
    pub bbox: [f64; 4],
    pub persistent_id: String,
    pub crs: Option<String>,
    pub analysis_id: Option<String>,
}

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

impl MineBlock {
    /// GeoJSON `Polygon` geometry object.
    pub fn geometry_json(&self) -> Value {
        let mut rings = vec![ring_coords(self.polygon.exterior())];
        rings.extend(self.polygon.interiors().iter().map(ring_coords));
        json!({ "type": "Polygon", "coordinates": rings })
    }

    pub fn properties_json(&self) -> Value {
        let mut props = Map::new();
        props.insert("block_id".into(), json!(self.block_id));
        props.insert("block_index".into(), json!(self.block_index));
        props.insert("name".into(), json!(self.name));
        props.insert(
            "tile_id".into(),
            json!(self.tile_id.as_deref().unwrap_or_default()),
        );
        props.insert("area_px".into(), json!(self.area_px));
        props.insert("avg_confidence".into(), json!(self.avg_confidence));
        props.insert("label_position".into(), json!(self.centroid));
        props.insert("pixel_coords".into(), json!(self.pixel_ring));
        props.insert("bbox".into(), json!(self.bbox));
        props.insert("persistent_id".into(), json!(self.persistent_id));
        props.insert("centroid_lon".into(), json!(self.centroid[0]));
        props.insert("centroid_lat".into(), json!(self.centroid[1]));
        if let Some(area) = self.area_m2 {
            props.insert("area_m2".into(), json!(area));
        }
        if let Some(crs) = &self.crs {
            props.insert("crs".into(), json!(crs));
        }
        if let Some(id) = &self.analysis_id {
            props.insert("analysis_id".into(), json!(id));
        }
        Value::Object(props)
    }

    pub fn to_feature(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": self.geometry_json(),
            "properties": self.properties_json(),
        })
    }
}

/// Numbered blocks plus aggregate metadata and rendering hints.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionFeatureCollection {
    pub blocks: Vec<MineBlock>,
    pub metadata: CollectionMetadata,
    pub visualization: VisualizationStyle,
}

impl DetectionFeatureCollection {
    pub fn empty(metadata: CollectionMetadata, visualization: VisualizationStyle) -> Self {
        Self {
            blocks: Vec::new(),
            metadata,
            visualization,
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// GeoJSON `FeatureCollection` with `metadata` and `visualization` members.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.blocks.iter().map(MineBlock::to_feature).collect::<Vec<_>>(),
            "metadata": self.metadata,
            "visualization": self.visualization,
        })
    }
}

impl Serialize for DetectionFeatureCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_geojson().serialize(serializer)
    }
}
