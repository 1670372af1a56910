//! Model entries as stored by the CMS backend.
//!
//! The data has been edited by hand for a while, so entries come with one of
//! two spellings for the identifier (`id` / `modelId`) and the display name
//! (`name` / `title`), and coordinates either as an object or as a single
//! `"lat, lng"` string. The collection keeps every item exactly as it was
//! read; an edit only writes the fields of the entry it changes, so writing
//! a collection back changes nothing the editor did not touch.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub const ITEMS_KEY: &str = "items";

#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("expected an array of entries or an object with an `items` array")]
    UnexpectedShape,
    #[error("entry {index}: {message}")]
    InvalidEntry { index: usize, message: String },
    #[error("entry has no `id` or `modelId`")]
    MissingId,
    #[error("an entry with id `{0}` already exists")]
    DuplicateId(String),
    #[error("no entry with id `{0}`")]
    UnknownId(String),
}

/// Any JSON number or string. Numbers are keyed by their JSON text, so
/// `1.5` and ids beyond `i64` work like any other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(serde_json::Number),
    Text(String),
}

impl EntryId {
    /// Identity used for uniqueness: `7` and `"7"` name the same entry.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Id typed into the entry form: whole numbers stay numeric.
    pub fn from_input(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        Some(match (input.parse::<i64>(), input.parse::<u64>()) {
            (Ok(n), _) => n.into(),
            (_, Ok(n)) => n.into(),
            _ => EntryId::Text(input.to_owned()),
        })
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{n}"),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntryId {
    fn from(n: i64) -> Self {
        EntryId::Number(n.into())
    }
}

impl From<u64> for EntryId {
    fn from(n: u64) -> Self {
        EntryId::Number(n.into())
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        EntryId::Text(s.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    Pair { latitude: f64, longitude: f64 },
    Text(String),
    /// Any other shape, kept as it was written.
    Other(Value),
}

impl Coordinates {
    pub fn lat_lng(&self) -> Option<(f64, f64)> {
        match self {
            Coordinates::Pair {
                latitude,
                longitude,
            } => Some((*latitude, *longitude)),
            Coordinates::Text(s) => parse_lat_lng(s),
            Coordinates::Other(_) => None,
        }
    }

    /// Coordinates typed into the entry form; stored structured when they parse.
    pub fn from_input(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        Some(match parse_lat_lng(input) {
            Some((latitude, longitude)) => Coordinates::Pair {
                latitude,
                longitude,
            },
            None => Coordinates::Text(input.to_owned()),
        })
    }
}

/// `"48.52, 9.05"` or `"48.52;9.05"`.
pub fn parse_lat_lng(s: &str) -> Option<(f64, f64)> {
    let (lat, lng) = s.split_once([',', ';'])?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)).then_some((lat, lng))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum IdKey {
    #[default]
    Id,
    ModelId,
}

impl IdKey {
    fn as_str(self) -> &'static str {
        match self {
            IdKey::Id => "id",
            IdKey::ModelId => "modelId",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum NameKey {
    #[default]
    Name,
    Title,
}

impl NameKey {
    fn as_str(self) -> &'static str {
        match self {
            NameKey::Name => "name",
            NameKey::Title => "title",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawEntry")]
pub struct ModelEntry {
    pub id: EntryId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub model_path: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub icon: Option<String>,
    /// Fields this editor does not interpret, kept in their original order.
    pub extra: Map<String, Value>,
    id_key: IdKey,
    name_key: NameKey,
}

impl ModelEntry {
    pub fn new(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            description: None,
            model_path: None,
            coordinates: None,
            icon: None,
            extra: Map::new(),
            id_key: IdKey::Id,
            name_key: NameKey::Name,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_model_path(mut self, path: impl Into<String>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn key(&self) -> String {
        self.id.key()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Take over the field spellings of the entry being replaced.
    fn adopt_spelling(&mut self, previous: &ModelEntry) {
        self.id_key = previous.id_key;
        self.name_key = previous.name_key;
        for (k, v) in &previous.extra {
            if !self.extra.contains_key(k) {
                self.extra.insert(k.clone(), v.clone());
            }
        }
    }

    /// The interpreted fields under their spelling, `None` when unset.
    fn known_fields(&self) -> [(&'static str, Option<Value>); 6] {
        fn json<T: Serialize>(v: &Option<T>) -> Option<Value> {
            v.as_ref().and_then(|v| serde_json::to_value(v).ok())
        }
        [
            (self.id_key.as_str(), serde_json::to_value(&self.id).ok()),
            (self.name_key.as_str(), json(&self.name)),
            ("description", json(&self.description)),
            ("modelPath", json(&self.model_path)),
            ("coordinates", json(&self.coordinates)),
            ("icon", json(&self.icon)),
        ]
    }

    /// A fresh JSON object: known fields first, then the extras.
    pub fn to_object(&self) -> Map<String, Value> {
        let mut obj = Map::new();
        for (key, value) in self.known_fields() {
            if let Some(value) = value {
                obj.insert(key.into(), value);
            }
        }
        for (k, v) in &self.extra {
            if !obj.contains_key(k) {
                obj.insert(k.clone(), v.clone());
            }
        }
        obj
    }

    /// Write into `source`, the object `previous` was read from, only the
    /// fields that differ between the two. Untouched keys keep their
    /// position and their exact value.
    fn merge_into(&self, previous: &ModelEntry, source: &Map<String, Value>) -> Map<String, Value> {
        let mut obj = source.clone();
        for ((key, new), (_, old)) in self.known_fields().into_iter().zip(previous.known_fields()) {
            if new == old {
                continue;
            }
            match new {
                Some(value) => {
                    obj.insert(key.into(), value);
                }
                None => obj.retain(|k, _| k != key),
            }
        }
        for (k, v) in &self.extra {
            if obj.get(k) != Some(v) {
                obj.insert(k.clone(), v.clone());
            }
        }
        obj
    }
}

impl Serialize for ModelEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_object().serialize(serializer)
    }
}

#[derive(Deserialize)]
struct RawEntry {
    id: Option<EntryId>,
    #[serde(rename = "modelId")]
    model_id: Option<EntryId>,
    name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "modelPath")]
    model_path: Option<String>,
    coordinates: Option<Coordinates>,
    icon: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawEntry> for ModelEntry {
    type Error = EntryError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let mut extra = raw.extra;
        let (id, id_key) = match (raw.id, raw.model_id) {
            (Some(id), alias) => {
                if let Some(alias) = alias {
                    extra.insert("modelId".into(), serde_json::to_value(alias).unwrap_or(Value::Null));
                }
                (id, IdKey::Id)
            }
            (None, Some(id)) => (id, IdKey::ModelId),
            (None, None) => return Err(EntryError::MissingId),
        };
        let (name, name_key) = match (raw.name, raw.title) {
            (Some(name), alias) => {
                if let Some(alias) = alias {
                    extra.insert("title".into(), Value::String(alias));
                }
                (Some(name), NameKey::Name)
            }
            (None, Some(title)) => (Some(title), NameKey::Title),
            (None, None) => (None, NameKey::Name),
        };
        Ok(ModelEntry {
            id,
            name,
            description: raw.description,
            model_path: raw.model_path,
            coordinates: raw.coordinates,
            icon: raw.icon,
            extra,
            id_key,
            name_key,
        })
    }
}

/// The document the CMS edits: a bare array of entries, or an object whose
/// `items` array holds them next to other top-level fields.
///
/// `items` holds every entry exactly as read; `entries` is the parsed view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryCollection {
    entries: Vec<ModelEntry>,
    items: Vec<Value>,
    envelope: Option<Map<String, Value>>,
}

impl EntryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, EntryError> {
        let value: Value = serde_json::from_str(text).map_err(|e| EntryError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, EntryError> {
        let (items, envelope) = match value {
            Value::Array(items) => (items, None),
            Value::Object(mut map) => {
                let items = match map.get_mut(ITEMS_KEY) {
                    Some(Value::Array(items)) => std::mem::take(items),
                    _ => return Err(EntryError::UnexpectedShape),
                };
                (items, Some(map))
            }
            _ => return Err(EntryError::UnexpectedShape),
        };
        let mut collection = EntryCollection {
            entries: Vec::with_capacity(items.len()),
            items: Vec::with_capacity(items.len()),
            envelope,
        };
        for (index, item) in items.into_iter().enumerate() {
            let entry = ModelEntry::deserialize(&item).map_err(|e| EntryError::InvalidEntry {
                index,
                message: e.to_string(),
            })?;
            collection.push(entry, item)?;
        }
        Ok(collection)
    }

    pub fn to_value(&self) -> Value {
        let items = Value::Array(self.items.clone());
        match &self.envelope {
            Some(map) => {
                let mut map = map.clone();
                // overwriting keeps `items` at its original position
                map.insert(ITEMS_KEY.into(), items);
                Value::Object(map)
            }
            None => items,
        }
    }

    /// Two-space indented JSON, the format the editor shows.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.to_value()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ModelEntry> {
        self.entries.iter().find(|e| e.key() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn position(&self, id: &str) -> Result<usize, EntryError> {
        self.entries
            .iter()
            .position(|e| e.key() == id)
            .ok_or_else(|| EntryError::UnknownId(id.to_owned()))
    }

    fn push(&mut self, entry: ModelEntry, item: Value) -> Result<(), EntryError> {
        let key = entry.key();
        if self.contains(&key) {
            return Err(EntryError::DuplicateId(key));
        }
        self.entries.push(entry);
        self.items.push(item);
        Ok(())
    }

    /// Append a new entry. Rejected, without changes, when the id is taken.
    pub fn add(&mut self, entry: ModelEntry) -> Result<(), EntryError> {
        let item = Value::Object(entry.to_object());
        self.push(entry, item)
    }

    /// Replace the entry with the same id, keeping its position and spelling.
    /// Only the fields that changed are rewritten.
    pub fn update(&mut self, mut entry: ModelEntry) -> Result<(), EntryError> {
        let pos = self.position(&entry.key())?;
        let previous = &self.entries[pos];
        entry.adopt_spelling(previous);
        let item = match &self.items[pos] {
            Value::Object(source) => Value::Object(entry.merge_into(previous, source)),
            _ => Value::Object(entry.to_object()),
        };
        self.items[pos] = item;
        self.entries[pos] = entry;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<ModelEntry, EntryError> {
        let pos = self.position(id)?;
        self.items.remove(pos);
        Ok(self.entries.remove(pos))
    }
}
