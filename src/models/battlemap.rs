use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// A point or extent on the map grid
pub type XY = [i32; 2];

/// Kind of a shape placed on the map
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    #[default]
    Drawing,
    Zone,
    Token,
}

/// A single shape of a battle map
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Shape {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ShapeType,
    #[schema(value_type = Vec<i32>)]
    pub at: XY,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[schema(value_type = Vec<Vec<i32>>)]
    pub points: Vec<XY>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<i32>>)]
    pub size: Option<XY>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Complete state of a battle map.
///
/// Every update carries the whole map, there are no partial updates.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BattleMap {
    pub id: String,
    pub grid: bool,
    pub background: Vec<Shape>,
    pub explanations: Vec<Shape>,
    pub tokens: Vec<Shape>,
}

/// Published state of a battle map as it flows through a live session
pub type Snapshot = Arc<BattleMap>;
