use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{parse_json, TiledError};
use crate::geometry::Rect;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TiledMap {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub layers: Vec<TiledLayer>,
    #[serde(default)]
    pub tilesets: Vec<TilesetRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TiledLayer {
    TileLayer(TileLayer),
    ObjectGroup(ObjectLayer),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileLayer {
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectLayer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub objects: Vec<TiledObject>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TiledObject {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", alias = "class", default)]
    pub kind: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub gid: u32,
    #[serde(default)]
    pub properties: Vec<TiledProperty>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TiledProperty {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TilesetRef {
    pub firstgid: u32,
    #[serde(default)]
    pub source: Option<String>,
}

impl TiledMap {
    pub fn load(path: &Path) -> Result<Self, TiledError> {
        let raw = fs::read_to_string(path).map_err(|source| TiledError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        parse_json(&raw, &path.display().to_string())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TiledError> {
        parse_json(raw, "<memory>")
    }

    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter().filter_map(|layer| match layer {
            TiledLayer::TileLayer(tiles) => Some(tiles),
            _ => None,
        })
    }

    pub fn object_layers(&self) -> impl Iterator<Item = &ObjectLayer> {
        self.layers.iter().filter_map(|layer| match layer {
            TiledLayer::ObjectGroup(objects) => Some(objects),
            _ => None,
        })
    }

    /// Every object in layer order, then object order within the layer.
    pub fn objects(&self) -> impl Iterator<Item = (&ObjectLayer, &TiledObject)> {
        self.object_layers()
            .flat_map(|layer| layer.objects.iter().map(move |object| (layer, object)))
    }

    /// Map size in tiles, taken from the first tile layer and falling back to
    /// the map header.
    pub fn size_in_tiles(&self) -> Option<(u32, u32)> {
        if let Some(layer) = self.tile_layers().next() {
            return Some((layer.width, layer.height));
        }
        (self.width > 0 && self.height > 0).then_some((self.width, self.height))
    }
}

impl TiledObject {
    /// Pixel rectangle covered by the object, truncating toward zero.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x as i32,
            self.y as i32,
            (self.x + self.width) as i32,
            (self.y + self.height) as i32,
        )
    }

    pub fn property(&self, name: &str) -> Option<&TiledProperty> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn bool_property(&self, name: &str) -> Option<bool> {
        self.property(name)?.value.as_bool()
    }

    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.property(name)?.value.as_str()
    }

    /// Integer property; Tiled may export numbers as floats, which truncate.
    /// A property that exists but is not numeric counts as absent.
    pub fn int_property(&self, name: &str) -> Option<i64> {
        let property = self.property(name)?;
        let value = property
            .value
            .as_i64()
            .or_else(|| property.value.as_f64().map(|value| value as i64));
        if value.is_none() {
            warn!(
                object_id = self.id,
                property = name,
                value = %property.value,
                "non_numeric_int_property"
            );
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_map() -> TiledMap {
        let raw = json!({
            "width": 4,
            "height": 3,
            "layers": [
                { "type": "tilelayer", "name": "ground", "width": 4, "height": 3,
                  "data": [1, 1, 1, 1, 2, 2, 2, 2, 0, 0, 0, 3] },
                { "type": "objectgroup", "name": "collisions", "objects": [
                    { "id": 1, "x": 16.5, "y": 0, "width": 16, "height": 15.9 }
                ]},
                { "type": "imagelayer", "name": "sky" },
                { "type": "objectgroup", "name": "spawns", "objects": [
                    { "id": 2, "type": "enemy_spawn", "x": 32, "y": 16,
                      "properties": [
                        { "name": "followsPlayer", "type": "bool", "value": true },
                        { "name": "label", "type": "string", "value": "boss" },
                        { "name": "amount", "type": "float", "value": 4.0 },
                        { "name": "broken", "type": "string", "value": "many" }
                      ]},
                    { "id": 3, "class": "potion_spawn", "x": 0, "y": 0 }
                ]}
            ],
            "tilesets": [{ "firstgid": 1, "source": "floor.json" }]
        })
        .to_string();
        TiledMap::from_json_str(&raw).expect("parse map")
    }

    #[test]
    fn layers_are_split_by_type() {
        let map = sample_map();
        assert_eq!(map.layers.len(), 4);
        assert_eq!(map.tile_layers().count(), 1);
        assert_eq!(map.object_layers().count(), 2);
        assert!(matches!(map.layers[2], TiledLayer::Unsupported));
        assert_eq!(map.size_in_tiles(), Some((4, 3)));
    }

    #[test]
    fn objects_iterate_in_layer_then_object_order() {
        let map = sample_map();
        let ids: Vec<u32> = map.objects().map(|(_, object)| object.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let (layer, _) = map.objects().next().expect("first object");
        assert_eq!(layer.name, "collisions");
    }

    #[test]
    fn class_is_accepted_as_object_type() {
        let map = sample_map();
        let potion = map.objects().find(|(_, o)| o.id == 3).expect("potion").1;
        assert_eq!(potion.kind, "potion_spawn");
    }

    #[test]
    fn typed_property_accessors() {
        let map = sample_map();
        let enemy = map.objects().find(|(_, o)| o.id == 2).expect("enemy").1;
        assert_eq!(enemy.bool_property("followsPlayer"), Some(true));
        assert_eq!(enemy.string_property("label"), Some("boss"));
        assert_eq!(enemy.int_property("amount"), Some(4));
        assert_eq!(enemy.int_property("broken"), None);
        assert_eq!(enemy.int_property("missing"), None);
        assert_eq!(enemy.bool_property("label"), None);
    }

    #[test]
    fn object_rect_truncates_edges() {
        let map = sample_map();
        let collider = map.objects().next().expect("collider").1;
        assert_eq!(collider.rect(), Rect::new(16, 0, 32, 15));
    }

    #[test]
    fn parse_error_reports_json_path() {
        let raw = r#"{ "layers": [ { "type": "tilelayer", "width": "wide", "height": 1 } ] }"#;
        let error = TiledMap::from_json_str(raw).expect_err("invalid width");
        match error {
            TiledError::Parse { json_path, .. } => assert!(json_path.starts_with("layers[0]")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = TiledMap::load(&dir.path().join("nope.json")).expect_err("missing");
        assert!(matches!(error, TiledError::ReadFile { .. }));
    }
}
