//! Static diplomatic matrix

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use super::country::Country;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    War,
    Peace,
}

/// Pairwise relations between countries. Anything not listed as war is peace.
#[derive(Debug, Clone, Default)]
pub struct Diplomacy {
    wars: AHashSet<(Country, Country)>,
}

impl Diplomacy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of belligerent pairs. Relations are symmetric.
    pub fn from_wars(pairs: impl IntoIterator<Item = (Country, Country)>) -> Self {
        let mut diplomacy = Self::new();
        for (a, b) in pairs {
            diplomacy.declare_war(a, b);
        }
        diplomacy
    }

    pub fn declare_war(&mut self, a: Country, b: Country) {
        if a == b {
            return;
        }
        self.wars.insert((a, b));
        self.wars.insert((b, a));
    }

    pub fn relation(&self, a: Country, b: Country) -> Relation {
        if self.wars.contains(&(a, b)) {
            Relation::War
        } else {
            Relation::Peace
        }
    }

    pub fn is_at_war(&self, a: Country, b: Country) -> bool {
        a != b && self.relation(a, b) == Relation::War
    }

    /// The country's main opponent: the first belligerent in [`Country::ALL`] order
    pub fn primary_enemy(&self, country: Country) -> Option<Country> {
        Country::ALL
            .into_iter()
            .find(|&other| self.is_at_war(country, other))
    }

    /// All belligerent pairs with the lower-ordered country first
    pub fn war_pairs(&self) -> Vec<(Country, Country)> {
        let mut pairs: Vec<_> = self.wars.iter().copied().filter(|(a, b)| a < b).collect();
        pairs.sort();
        pairs
    }
}
