//! Sample types with checked-in expected documents.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use json_typeschema::{Document, MapStyle, Reflect, Settings};
use once_cell::sync::Lazy;
use serde_json::Value;

pub struct Fixture {
    pub name: &'static str,
    pub settings: Settings,
    derive: fn(&Settings) -> json_typeschema::Result<Document>,
}

impl Fixture {
    pub fn derive(&self) -> json_typeschema::Result<Document> {
        (self.derive)(&self.settings)
    }
}

fn fixture<T: Reflect + ?Sized>(name: &'static str, settings: Settings) -> Fixture {
    fn derive<T: Reflect + ?Sized>(settings: &Settings) -> json_typeschema::Result<Document> {
        let mut doc = Document::with_settings(settings.clone());
        doc.read_type::<T>()?;
        Ok(doc)
    }
    Fixture { name, settings, derive: derive::<T> }
}

pub static FIXTURES: Lazy<Vec<Fixture>> = Lazy::new(|| {
    let additional = Settings::default().with_map_style(MapStyle::AdditionalSchema);
    vec![
        fixture::<bool>("boolean_root", Settings::default()),
        fixture::<Vec<String>>("string_list_root", Settings::default()),
        fixture::<Basic>("basic", Settings::default()),
        fixture::<Tagged>("tagged", Settings::default()),
        fixture::<Collections>("collections", Settings::default()),
        fixture::<Collections>("collections_additional_schema", additional),
    ]
});

#[derive(Reflect)]
struct Basic {
    #[schema(skip)]
    omitted: String,
    flag: bool,
    count: i32,
    ratio: f32,
    label: String,
    payload: Vec<u8>,
    #[schema(required)]
    anything: Value,
    created_at: DateTime<Utc>,
}

#[derive(Reflect)]
struct Tagged {
    #[schema(rename = "string", description = "blah", min_length = 3, max_length = 10, pattern = "m{3,10}")]
    text: String,
    #[schema(min = 1.5, max = 42)]
    float: f32,
    #[schema(exclusive_min = -10, exclusive_max = 0, required)]
    int: i64,
    #[schema(rename = "answer", const = 42)]
    answer_to_life: i32,
    #[schema(enum = "apple|banana|pear")]
    fruit: String,
}

#[derive(Reflect)]
struct Item {
    #[schema(required)]
    foo: String,
}

#[derive(Reflect)]
struct Collections {
    tags: Vec<String>,
    #[schema(required)]
    loose_list: Vec<Value>,
    items: Vec<Option<Item>>,
    labels: HashMap<String, String>,
    extras: BTreeMap<String, Value>,
}
