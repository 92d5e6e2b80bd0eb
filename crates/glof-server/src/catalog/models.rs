use serde::{Deserialize, Deserializer, Serialize};

/// Row of the glacial lake inventory CSV
#[derive(Debug, Clone, Deserialize)]
pub struct LakeRow {
    #[serde(rename = "Lake Name")]
    pub name: String,
    #[serde(rename = "State/UT")]
    pub state: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

/// Row of the historical GLOF events CSV
#[derive(Debug, Clone, Deserialize)]
pub struct GlofEventRow {
    pub lake_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: i32,
    pub region: String,
    pub outburst_count: u32,
    pub glof_period: String,
    pub lake_type: String,
    pub weather_conditions: String,
    #[serde(deserialize_with = "flag_from_int")]
    pub glof_occurred: bool,
}

/// `0` / `1` column to bool; any other integer counts as true
fn flag_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(value != 0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lake {
    pub name: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LakeRow> for Lake {
    fn from(row: LakeRow) -> Self {
        Self {
            name: row.name.trim().to_string(),
            state: row.state.trim().to_string(),
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlofEvent {
    pub lake_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: i32,
    pub region: String,
    pub outburst_count: u32,
    pub glof_period: String,
    pub lake_type: String,
    pub weather_conditions: String,
    pub glof_occurred: bool,
}

impl From<GlofEventRow> for GlofEvent {
    fn from(row: GlofEventRow) -> Self {
        Self {
            lake_name: row.lake_name,
            latitude: row.latitude,
            longitude: row.longitude,
            elevation: row.elevation_m,
            region: row.region,
            outburst_count: row.outburst_count,
            glof_period: row.glof_period,
            lake_type: row.lake_type,
            weather_conditions: row.weather_conditions,
            glof_occurred: row.glof_occurred,
        }
    }
}
