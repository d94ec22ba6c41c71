//! People and action templates the generator draws from.

use std::{collections::HashSet, path::Path};

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::base::types::{Res, Void};

/// Placeholder for the single participant of a solo template.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Placeholder for the joined participant list of a group template.
pub const NAMES_PLACEHOLDER: &str = "{names}";

/// Catalog compiled into the binary.
const BUILTIN_CATALOG: &str = include_str!("../../content/catalog.toml");

/// Grammatical gender, which picks the solo template pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub gender: Gender,
}

impl Person {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self { name: name.into(), gender }
    }
}

/// Solo templates partitioned by gender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoloTemplates {
    #[serde(default)]
    pub male: Vec<String>,
    #[serde(default)]
    pub female: Vec<String>,
}

impl SoloTemplates {
    pub fn for_gender(&self, gender: Gender) -> &[String] {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }
}

/// Raw, unvalidated catalog as it appears on disk.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    people: Vec<Person>,
    #[serde(default)]
    solo: SoloTemplates,
    #[serde(default)]
    group: Vec<String>,
    #[serde(default)]
    weights: Vec<u32>,
}

/// A validated, read-only content catalog.
///
/// Every gender present among the people has a non-empty solo pool, and group
/// events are only reachable when there are group templates and enough people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    people: Vec<Person>,
    solo: SoloTemplates,
    group: Vec<String>,
    weights: Vec<u32>,
}

impl Catalog {
    /// Builds a catalog, failing on any configuration error.
    pub fn new(people: Vec<Person>, solo: SoloTemplates, group: Vec<String>, weights: Vec<u32>) -> Res<Self> {
        let catalog = Self { people, solo, group, weights };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads the catalog from `path`, or the built-in one when no path is given.
    pub fn load(path: Option<&Path>) -> Res<Self> {
        match path {
            Some(path) => {
                info!("Loading catalog from `{}` ...", path.display());

                let file: CatalogFile = config::Config::builder()
                    .add_source(config::File::from(path.to_path_buf()))
                    .build()?
                    .try_deserialize()?;

                Self::from_file(file).map_err(|e| anyhow!("Invalid catalog `{}`: {}", path.display(), e))
            }
            None => Self::builtin(),
        }
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Res<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    /// Parses and validates a catalog from TOML text.
    pub fn from_toml(text: &str) -> Res<Self> {
        let file: CatalogFile = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Self::from_file(file)
    }

    fn from_file(file: CatalogFile) -> Res<Self> {
        Self::new(file.people, file.solo, file.group, file.weights)
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn solo(&self) -> &SoloTemplates {
        &self.solo
    }

    pub fn group(&self) -> &[String] {
        &self.group
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// Whether any non-solo category has a positive weight.
    fn group_reachable(&self) -> bool {
        self.weights.iter().skip(1).any(|w| *w > 0)
    }

    fn validate(&self) -> Void {
        if self.people.is_empty() {
            bail!("Catalog configuration error: the people list is empty.");
        }

        let mut seen = HashSet::new();
        for person in &self.people {
            if person.name.trim().is_empty() {
                bail!("Catalog configuration error: a person has an empty name.");
            }

            if !seen.insert(person.name.as_str()) {
                warn!("Catalog lists `{}` more than once; group events may repeat the name.", person.name);
            }
        }

        let genders: HashSet<Gender> = self.people.iter().map(|p| p.gender).collect();
        for gender in genders {
            if self.solo.for_gender(gender).is_empty() {
                bail!("Catalog configuration error: no solo templates for gender `{:?}`.", gender);
            }
        }

        for template in self.solo.male.iter().chain(self.solo.female.iter()) {
            if !template.contains(NAME_PLACEHOLDER) {
                bail!("Catalog configuration error: solo template `{}` has no `{}` placeholder.", template, NAME_PLACEHOLDER);
            }
        }

        if self.group_reachable() {
            if self.group.is_empty() {
                bail!("Catalog configuration error: group events are weighted but there are no group templates.");
            }

            if self.people.len() < 2 {
                bail!("Catalog configuration error: group events need at least two people.");
            }
        }

        Ok(())
    }
}
