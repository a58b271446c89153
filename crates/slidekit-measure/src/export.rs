//! GeoJSON export and import of saved measurements.
//!
//! Each record becomes a `Feature` whose geometry is the record geometry
//! and whose properties carry the raw value, the calibration snapshot and a
//! formatted label for viewers that do not understand the other fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use slidekit_core::{CalibrationState, Error, MeasurementError, MeasurementUnit, Result};

use crate::geometry::calculate_value;
use crate::model::{MeasurementGeometry, MeasurementId, MeasurementType};
use crate::store::{Measurement, MeasurementStore};

const FEATURE_COLLECTION: &str = "FeatureCollection";
const FEATURE: &str = "Feature";

/// Relative slack allowed between a stored value and its geometry
const VALUE_TOLERANCE: f64 = 1e-9;

/// GeoJSON `FeatureCollection`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<Feature>,
}

/// GeoJSON `Feature` holding one measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub id: MeasurementId,
    pub geometry: MeasurementGeometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    pub slide_id: String,
    pub scan_id: String,
    pub measurement_type: MeasurementType,
    pub value: f64,
    pub unit: MeasurementUnit,
    pub mpp: Option<f64>,
    pub mpp_source: String,
    pub calibration_state: CalibrationState,
    pub created_at: DateTime<Utc>,
    /// Formatted calibrated value; informational, ignored on import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<&Measurement> for Feature {
    fn from(m: &Measurement) -> Self {
        Self {
            feature_type: FEATURE.to_string(),
            id: m.id(),
            geometry: m.geometry().clone(),
            properties: FeatureProperties {
                slide_id: m.slide_id().to_string(),
                scan_id: m.scan_id().to_string(),
                measurement_type: m.kind(),
                value: m.value(),
                unit: m.unit(),
                mpp: m.mpp(),
                mpp_source: m.mpp_source().to_string(),
                calibration_state: m.calibration_state(),
                created_at: m.created_at(),
                label: Some(m.label()),
            },
        }
    }
}

impl TryFrom<&Feature> for Measurement {
    type Error = Error;

    fn try_from(feature: &Feature) -> Result<Self> {
        if feature.feature_type != FEATURE {
            return Err(Error::other(format!(
                "expected a {} but found {}",
                FEATURE, feature.feature_type
            )));
        }

        let props = &feature.properties;
        // Rejects geometry that does not fit the declared kind
        let points = feature.geometry.defining_points(props.measurement_type)?;

        let expected = calculate_value(props.measurement_type, &points);
        let tolerance = VALUE_TOLERANCE * expected.abs().max(1.0);
        if !props.value.is_finite() || (props.value - expected).abs() > tolerance {
            return Err(MeasurementError::InvalidGeometry {
                reason: format!(
                    "measurement {} has value {} but its geometry gives {}",
                    feature.id, props.value, expected
                ),
            }
            .into());
        }

        Ok(Measurement {
            id: feature.id,
            slide_id: props.slide_id.clone(),
            scan_id: props.scan_id.clone(),
            kind: props.measurement_type,
            geometry: feature.geometry.clone(),
            value: props.value,
            unit: props.unit,
            mpp: props.mpp,
            mpp_source: props.mpp_source.clone(),
            calibration_state: props.calibration_state,
            created_at: props.created_at,
        })
    }
}

/// Converts every record in `store`, in insertion order.
pub fn to_feature_collection(store: &MeasurementStore) -> FeatureCollection {
    FeatureCollection {
        collection_type: FEATURE_COLLECTION.to_string(),
        features: store.iter().map(Feature::from).collect(),
    }
}

/// Parses records back out of a collection.
pub fn from_feature_collection(collection: &FeatureCollection) -> Result<Vec<Measurement>> {
    if collection.collection_type != FEATURE_COLLECTION {
        return Err(Error::other(format!(
            "expected a {} but found {}",
            FEATURE_COLLECTION, collection.collection_type
        )));
    }

    collection
        .features
        .iter()
        .map(Measurement::try_from)
        .collect()
}

pub fn to_geojson_string(store: &MeasurementStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_feature_collection(store))?)
}

pub fn from_geojson_str(content: &str) -> Result<Vec<Measurement>> {
    let collection: FeatureCollection = serde_json::from_str(content)?;
    from_feature_collection(&collection)
}

/// Writes the store as a GeoJSON file.
pub fn write_geojson(store: &MeasurementStore, path: &Path) -> Result<()> {
    std::fs::write(path, to_geojson_string(store)?)?;
    tracing::info!("Exported {} measurements to {}", store.len(), path.display());
    Ok(())
}

/// Reads measurements from a GeoJSON file.
pub fn read_geojson(path: &Path) -> Result<Vec<Measurement>> {
    let content = std::fs::read_to_string(path)?;
    let measurements = from_geojson_str(&content)?;
    tracing::debug!("Read {} measurements from {}", measurements.len(), path.display());
    Ok(measurements)
}
