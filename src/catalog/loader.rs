//! Catalog sources.
//!
//! A [`CatalogSource`] supplies the entity snapshot once at startup.
//! [`FileCatalog`] reads JSON arrays, JSON Lines and CSV files; the field
//! names of the hosted charity table (`charityId`, `focusAreas`) are accepted
//! as aliases.
//!
//! ```csv
//! charityId,name,description,focusAreas,website
//! 1,Ocean Trust,protects marine wildlife,"environment,wildlife",https://ocean.example
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::{debug, info};
use serde::Deserialize;

use crate::catalog::entity::{Entity, EntityId, parse_categories};
use crate::catalog::validate_unique_ids;
use crate::error::{AlmonerError, Result};

/// Supplier of the catalog snapshot.
pub trait CatalogSource {
    /// Load every entity, in source order.
    fn load(&self) -> Result<Vec<Entity>>;
}

/// Catalog held in memory, mostly useful for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    entities: Vec<Entity>,
}

impl InMemoryCatalog {
    pub fn new(entities: Vec<Entity>) -> Self {
        InMemoryCatalog { entities }
    }
}

impl CatalogSource for InMemoryCatalog {
    fn load(&self) -> Result<Vec<Entity>> {
        validate_unique_ids(&self.entities)?;
        Ok(self.entities.clone())
    }
}

/// On-disk catalog formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogFormat {
    /// A JSON array of records
    Json,
    /// One JSON record per line
    JsonLines,
    /// CSV with a header row
    Csv,
}

impl CatalogFormat {
    /// Infer the format from a file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(CatalogFormat::Json),
            Some("jsonl") | Some("ndjson") => Ok(CatalogFormat::JsonLines),
            Some("csv") => Ok(CatalogFormat::Csv),
            _ => Err(AlmonerError::catalog(format!(
                "Unsupported catalog file extension: {}",
                path.as_ref().display()
            ))),
        }
    }
}

/// Categories either as a comma-separated string or a JSON array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryField {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(alias = "charityId", alias = "charity_id")]
    id: EntityId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "focusAreas", alias = "focus_areas")]
    categories: Option<CategoryField>,
    #[serde(default)]
    website: Option<String>,
}

impl From<JsonRecord> for Entity {
    fn from(record: JsonRecord) -> Self {
        let categories = match record.categories {
            Some(CategoryField::Text(text)) => parse_categories(&text),
            Some(CategoryField::List(list)) => list,
            None => Vec::new(),
        };
        let entity = Entity::new(record.id, record.name)
            .with_description(record.description.unwrap_or_default())
            .with_categories(categories);
        match record.website {
            Some(website) => entity.with_website(website),
            None => entity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "charityId", alias = "charity_id")]
    id: EntityId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "focusAreas", alias = "focus_areas")]
    categories: Option<String>,
    #[serde(default)]
    website: Option<String>,
}

impl From<CsvRecord> for Entity {
    fn from(record: CsvRecord) -> Self {
        let entity = Entity::new(record.id, record.name)
            .with_description(record.description.unwrap_or_default())
            .with_categories_str(record.categories.as_deref().unwrap_or_default());
        match record.website {
            Some(website) => entity.with_website(website),
            None => entity,
        }
    }
}

/// Catalog read from a file.
#[derive(Clone, Debug)]
pub struct FileCatalog {
    path: PathBuf,
    format: CatalogFormat,
}

impl FileCatalog {
    /// Create a file catalog, inferring the format from the extension.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = CatalogFormat::from_path(&path)?;
        Ok(FileCatalog {
            path: path.as_ref().to_path_buf(),
            format,
        })
    }

    /// Create a file catalog with an explicit format.
    pub fn with_format<P: AsRef<Path>>(path: P, format: CatalogFormat) -> Self {
        FileCatalog {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> CatalogFormat {
        self.format
    }

    fn read_json(&self) -> Result<Vec<Entity>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let records: Vec<JsonRecord> = serde_json::from_reader(reader).map_err(|e| {
            AlmonerError::catalog(format!(
                "Failed to parse catalog JSON from '{}': {e}",
                self.path.display()
            ))
        })?;
        Ok(records.into_iter().map(Entity::from).collect())
    }

    fn read_json_lines(&self) -> Result<Vec<Entity>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut entities = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: JsonRecord = serde_json::from_str(&line).map_err(|e| {
                AlmonerError::catalog(format!(
                    "Failed to parse JSON at line {} of '{}': {e}",
                    line_num + 1,
                    self.path.display()
                ))
            })?;
            entities.push(Entity::from(record));
        }

        Ok(entities)
    }

    fn read_csv(&self) -> Result<Vec<Entity>> {
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut entities = Vec::new();
        for record in reader.deserialize::<CsvRecord>() {
            entities.push(Entity::from(record?));
        }
        Ok(entities)
    }
}

impl CatalogSource for FileCatalog {
    fn load(&self) -> Result<Vec<Entity>> {
        debug!("reading {:?} catalog from {}", self.format, self.path.display());

        let entities = match self.format {
            CatalogFormat::Json => self.read_json()?,
            CatalogFormat::JsonLines => self.read_json_lines()?,
            CatalogFormat::Csv => self.read_csv()?,
        };
        validate_unique_ids(&entities)?;

        info!(
            "loaded {} entities from {}",
            entities.len(),
            self.path.display()
        );
        Ok(entities)
    }
}
