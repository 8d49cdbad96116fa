//! Named campus locations and their normalized map positions.
//!
//! The registry is read from a JSON file of the form
//! `{ "_format": "norm", "points": { "Kupe": [0.7615, 0.4172], ... } }`. Lookups accept any
//! casing and spacing of a name, a small alias table, and room codes such as `K12` which resolve
//! to the house their first letter names.
use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

use crate::coords::NormPoint;
use crate::error::{Result, RouteError};

/// Tag stored in registry files holding normalized coordinates.
pub const NORM_FORMAT: &str = "norm";

/// House pins used when no registry file is available.
pub const DEFAULT_LOCATIONS: &[(&str, NormPoint)] = &[
    ("Te Kanawa", NormPoint::new(0.4339, 0.4215)),
    ("Kupe", NormPoint::new(0.7615, 0.4172)),
    ("Rutherford", NormPoint::new(0.8116, 0.5930)),
    ("Mansfield", NormPoint::new(0.8597, 0.6933)),
    ("Batten", NormPoint::new(0.8096, 0.8299)),
    ("Hillary", NormPoint::new(0.5571, 0.5044)),
    ("Snell", NormPoint::new(0.3437, 0.6105)),
    ("Upham", NormPoint::new(0.2054, 0.6177)),
];

/// Shorthand names, already normalized, mapped to canonical keys.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("tk", "Te Kanawa"),
    ("te kanawa", "Te Kanawa"),
    ("tekanawa", "Te Kanawa"),
];

/// Room code prefixes and the house each belongs to.
pub const CODE_PREFIXES: &[(&str, &str)] = &[
    ("K", "Kupe"),
    ("M", "Mansfield"),
    ("R", "Rutherford"),
    ("T", "Te Kanawa"),
    ("U", "Upham"),
    ("S", "Snell"),
    ("H", "Hillary"),
    ("B", "Batten"),
];

/// Preferred map file names, in order.
pub const MAP_FILE_NAMES: &[&str] = &["macleans_map.jpg", "macleans_map.jpeg", "macleans_map.png"];

const MAP_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

const CODE_PATTERN: &str = r"^[A-Za-z]{1,2}\d{1,3}$";

fn code_regex() -> Option<&'static Regex> {
    static CODE_RE: OnceLock<Option<Regex>> = OnceLock::new();
    CODE_RE
        .get_or_init(|| match Regex::new(CODE_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Room code pattern failed to compile: {}", e);
                None
            }
        })
        .as_ref()
}

/// Collapses runs of whitespace and lowercases.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Checks whether `token` looks like a room code (one or two letters, then up to three digits).
pub fn is_code(token: &str) -> bool {
    let token = token.trim();
    !token.is_empty() && code_regex().is_some_and(|re| re.is_match(token))
}

/// The house a room code belongs to, by its first matching prefix.
pub fn house_for_code(code: &str) -> Option<&'static str> {
    let code = code.trim().to_uppercase();
    CODE_PREFIXES
        .iter()
        .find(|(prefix, _)| code.starts_with(*prefix))
        .map(|&(_, house)| house)
}

/// Rejects positions that are not finite or lie outside the unit square.
fn check_point(name: &str, p: NormPoint) -> Result<()> {
    let in_unit = |v: f64| (0.0..=1.0).contains(&v);
    if in_unit(p.x) && in_unit(p.y) {
        Ok(())
    } else {
        Err(RouteError::RegistryFormat(format!(
            "{} lies outside the map at {}",
            name, p
        )))
    }
}

#[derive(Serialize, Deserialize)]
struct RegistryFile {
    #[serde(rename = "_format")]
    format: String,
    points: BTreeMap<String, NormPoint>,
}

/// Mapping from location name to normalized position.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationRegistry {
    points: BTreeMap<String, NormPoint>,
    aliases: BTreeMap<String, String>,
    codes: BTreeMap<String, NormPoint>,
}

impl Default for LocationRegistry {
    fn default() -> LocationRegistry {
        LocationRegistry::new(
            DEFAULT_LOCATIONS
                .iter()
                .map(|&(name, p)| (name.to_owned(), p)),
        )
    }
}

impl LocationRegistry {
    /// A registry with the given points and the default alias table.
    pub fn new(points: impl IntoIterator<Item = (String, NormPoint)>) -> LocationRegistry {
        LocationRegistry {
            points: points.into_iter().collect(),
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|&(alias, key)| (alias.to_owned(), key.to_owned()))
                .collect(),
            codes: BTreeMap::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = (String, String)>) -> Self {
        self.aliases = aliases
            .into_iter()
            .map(|(alias, key)| (normalize_name(&alias), key))
            .collect();
        self
    }

    /// Parses a registry from its JSON text. Every position must lie in the unit square.
    pub fn from_json(text: &str) -> Result<LocationRegistry> {
        let file: RegistryFile = serde_json::from_str(text)?;
        if file.format != NORM_FORMAT {
            return Err(RouteError::RegistryFormat(format!(
                "expected _format \"{}\", found \"{}\"",
                NORM_FORMAT, file.format
            )));
        }
        for (name, p) in &file.points {
            check_point(name, *p)?;
        }
        Ok(LocationRegistry::new(file.points))
    }

    pub fn to_json(&self) -> Result<String> {
        let file = RegistryFile {
            format: NORM_FORMAT.to_owned(),
            points: self.points.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Loads a registry file.
    pub fn load(path: impl AsRef<Path>) -> Result<LocationRegistry> {
        let text = fs::read_to_string(path)?;
        LocationRegistry::from_json(&text)
    }

    /// Loads a registry file, falling back to [DEFAULT_LOCATIONS] if it is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> LocationRegistry {
        let path = path.as_ref();
        if !path.exists() {
            info!("No registry at {}, using default locations", path.display());
            return LocationRegistry::default();
        }
        match LocationRegistry::load(path) {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Ignoring registry {}: {}", path.display(), e);
                LocationRegistry::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Loads room codes from a `{ "CODE": [x, y] }` file. Codes are upper-cased; positions
    /// outside the unit square are rejected.
    pub fn load_codes(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = fs::read_to_string(path)?;
        let codes: BTreeMap<String, NormPoint> = serde_json::from_str(&text)?;
        for (code, p) in &codes {
            check_point(code, *p)?;
        }
        self.codes = codes
            .into_iter()
            .map(|(code, p)| (code.trim().to_uppercase(), p))
            .collect();
        Ok(())
    }

    pub fn save_codes(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(&self.codes)?)?;
        Ok(())
    }

    pub fn set_code(&mut self, code: &str, p: NormPoint) {
        self.codes.insert(code.trim().to_uppercase(), p);
    }

    pub fn insert(&mut self, name: impl Into<String>, p: NormPoint) -> Option<NormPoint> {
        self.points.insert(name.into(), p)
    }

    pub fn remove(&mut self, name: &str) -> Option<NormPoint> {
        let key = self.key_for(name)?;
        self.points.remove(&key)
    }

    pub fn get(&self, key: &str) -> Option<NormPoint> {
        self.points.get(key).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The canonical key for `name`: a case and whitespace insensitive match, then an alias.
    pub fn key_for(&self, name: &str) -> Option<String> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        if let Some(key) = self.points.keys().find(|k| normalize_name(k) == wanted) {
            return Some(key.clone());
        }
        self.aliases
            .get(&wanted)
            .filter(|key| self.points.contains_key(*key))
            .cloned()
    }

    /// The position of a location name, alias or room code.
    pub fn resolve(&self, name: &str) -> Option<NormPoint> {
        if let Some(key) = self.key_for(name) {
            return self.get(&key);
        }
        if !is_code(name) {
            return None;
        }
        let code = name.trim().to_uppercase();
        if let Some(p) = self.codes.get(&code) {
            return Some(*p);
        }
        house_for_code(&code).and_then(|house| self.get(house))
    }
}

/// Finds the campus map in `dir`: one of [MAP_FILE_NAMES] if present, else the largest image.
pub fn find_map_image(dir: impl AsRef<Path>) -> Option<PathBuf> {
    let dir = dir.as_ref();
    if let Some(p) = MAP_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
    {
        return Some(p);
    }
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| MAP_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .filter_map(|entry| {
            let size = entry.metadata().ok()?.len();
            Some((size, entry.into_path()))
        })
        .max()
        .map(|(_, path)| path)
}
