//! Random event generation.
//!
//! An event is a short sentence about one or more people from the catalog:
//! - A weighted draw decides between a solo and a group event.
//! - Participants are drawn without repetition.
//! - Names are substituted into a randomly chosen template.
//!
//! The generator is pure apart from its injected randomness, and cheap to clone.

pub mod catalog;
pub mod format;
pub mod random;
pub mod select;

use std::sync::Arc;

use tracing::debug;

use crate::base::{config::Config, types::Res};

use catalog::{Catalog, NAME_PLACEHOLDER, NAMES_PLACEHOLDER};
use format::{ConjunctionFormatter, NameListFormatter};
use random::{RandomProvider, RandomSource};
use select::{pick_unique, random_from, weighted_choice};

/// Category index of solo events; any other category is a group event.
pub const SOLO_CATEGORY: usize = 0;

/// Smallest number of participants in a group event.
pub const MIN_GROUP_SIZE: usize = 2;

/// Largest number of participants in a group event.
pub const MAX_GROUP_SIZE: usize = 4;

/// Event generator for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct EventGenerator {
    catalog: Arc<Catalog>,
    random: RandomProvider,
    formatter: Arc<dyn NameListFormatter>,
}

impl EventGenerator {
    /// Creates a generator backed by the thread-local CSPRNG and the Russian name formatter.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            random: RandomProvider::default(),
            formatter: Arc::new(ConjunctionFormatter::default()),
        }
    }

    /// Loads the configured catalog and name formatter.
    pub fn from_config(config: &Config) -> Res<Self> {
        let catalog = Catalog::load(config.catalog_path.as_deref())?;

        Ok(Self::new(catalog).with_formatter(ConjunctionFormatter::new(config.conjunction.clone())))
    }

    /// Replaces the randomness source.
    pub fn with_random(mut self, random: impl RandomSource) -> Self {
        self.random = RandomProvider::new(Arc::new(random));
        self
    }

    /// Replaces the randomness provider with an already shared one.
    pub fn with_random_provider(mut self, random: RandomProvider) -> Self {
        self.random = random;
        self
    }

    /// Replaces the name list formatter.
    pub fn with_formatter(mut self, formatter: impl NameListFormatter) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Generates one event sentence.
    pub fn generate_event(&self) -> String {
        let category = weighted_choice(self.catalog.weights(), &*self.random);

        let event = if category == SOLO_CATEGORY { self.generate_solo() } else { self.generate_group() };

        debug!(category, "Generated event: {}", event);

        event
    }

    fn generate_solo(&self) -> String {
        let Some(person) = pick_unique(self.catalog.people(), 1, &*self.random).into_iter().next() else {
            return String::new();
        };

        // Validated catalogs always have a pool for every gender in use.
        let template = random_from(self.catalog.solo().for_gender(person.gender), &*self.random).unwrap_or(NAME_PLACEHOLDER);

        template.replace(NAME_PLACEHOLDER, &person.name)
    }

    fn generate_group(&self) -> String {
        let count = self.random.range_inclusive(MIN_GROUP_SIZE, MAX_GROUP_SIZE);
        let chosen = pick_unique(self.catalog.people(), count, &*self.random);

        let names: Vec<&str> = chosen.iter().map(|p| p.name.as_str()).collect();
        let names = self.formatter.format(&names);

        match random_from(self.catalog.group(), &*self.random) {
            Some(template) if template.contains(NAMES_PLACEHOLDER) => template.replace(NAMES_PLACEHOLDER, &names),
            Some(template) => format!("{names} {template}"),
            None => names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{
        catalog::{Gender, Person, SoloTemplates},
        random::{SeededRandom, testing::ScriptedRandom},
    };

    fn group_catalog(template: &str) -> Catalog {
        Catalog::new(
            vec![Person::new("Аня", Gender::Female), Person::new("Боря", Gender::Male), Person::new("Вера", Gender::Female)],
            SoloTemplates {
                male: vec!["{name} улыбнулся".to_string()],
                female: vec!["{name} улыбнулась".to_string()],
            },
            vec![template.to_string()],
            vec![0, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_solo_event() {
        let catalog = Catalog::new(
            vec![Person::new("Иван", Gender::Male)],
            SoloTemplates {
                male: vec!["{name} улыбнулся".to_string()],
                female: vec![],
            },
            vec![],
            vec![1, 0],
        )
        .unwrap();
        let generator = EventGenerator::new(catalog);

        for _ in 0..100 {
            assert_eq!(generator.generate_event(), "Иван улыбнулся");
        }
    }

    #[test]
    fn test_solo_event_uses_gender_pool() {
        let catalog = Catalog::new(
            vec![Person::new("Аня", Gender::Female)],
            SoloTemplates {
                male: vec!["{name} улыбнулся".to_string()],
                female: vec!["{name} улыбнулась".to_string()],
            },
            vec![],
            vec![1],
        )
        .unwrap();
        let generator = EventGenerator::new(catalog);

        assert_eq!(generator.generate_event(), "Аня улыбнулась");
    }

    #[test]
    fn test_group_event_with_placeholder() {
        let generator = EventGenerator::new(group_catalog("{names} пошли пить чай")).with_random(ScriptedRandom::new(&[0.5], &[3, 0]));

        assert_eq!(generator.generate_event(), "Аня, Боря и Вера пошли пить чай");
    }

    #[test]
    fn test_group_event_appends_template() {
        let generator = EventGenerator::new(group_catalog("пошли пить чай")).with_random(ScriptedRandom::new(&[0.5], &[3, 0]));

        assert_eq!(generator.generate_event(), "Аня, Боря и Вера пошли пить чай");
    }

    #[test]
    fn test_group_event_draws_two() {
        // Count 2, then slot 2 of [Аня, Боря, Вера] and slot 0 of [Аня, Боря].
        let generator = EventGenerator::new(group_catalog("{names} пошли пить чай")).with_random(ScriptedRandom::new(&[0.9], &[2, 2, 0, 0]));

        assert_eq!(generator.generate_event(), "Вера и Аня пошли пить чай");
    }

    #[test]
    fn test_group_event_custom_formatter() {
        let generator = EventGenerator::new(group_catalog("{names} пошли пить чай"))
            .with_random(ScriptedRandom::new(&[0.5], &[3, 0]))
            .with_formatter(ConjunctionFormatter::new("and"));

        assert_eq!(generator.generate_event(), "Аня, Боря and Вера пошли пить чай");
    }

    #[test]
    fn test_group_sizes_stay_in_range() {
        let catalog = Catalog::builtin().unwrap();
        let generator = EventGenerator::new(catalog.clone()).with_random(SeededRandom::new(2024));

        for _ in 0..500 {
            let event = generator.generate_event();
            let mentioned = catalog.people().iter().filter(|p| event.contains(&p.name)).count();

            assert!((1..=MAX_GROUP_SIZE).contains(&mentioned), "unexpected participants in `{event}`");
        }
    }

    #[test]
    fn test_events_are_non_empty_and_mention_someone() {
        let catalog = Catalog::builtin().unwrap();
        let generator = EventGenerator::new(catalog.clone());

        for _ in 0..1000 {
            let event = generator.generate_event();

            assert!(!event.is_empty());
            assert!(catalog.people().iter().any(|p| event.contains(&p.name)), "no catalog name in `{event}`");
            assert!(!event.contains(NAME_PLACEHOLDER) && !event.contains(NAMES_PLACEHOLDER));
        }
    }
}
