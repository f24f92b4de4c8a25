use indexmap::IndexSet;
use rand::{Rng, seq::IndexedRandom};

/// Ordered list of categories with one pinned theme kept last and out of the raffle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBoard {
    categories: Vec<String>,
    pinned: String,
}

impl CategoryBoard {
    /// Empty board for the given pinned theme.
    pub fn new(pinned: impl Into<String>) -> Self {
        Self {
            categories: Vec::new(),
            pinned: pinned.into(),
        }
    }

    /// Build the board from themes in store order.
    ///
    /// Duplicates and blank themes are dropped; the pinned theme, when present, moves to the end
    /// while the others keep their relative order.
    pub fn from_themes(
        themes: impl IntoIterator<Item = Option<String>>,
        pinned: impl Into<String>,
    ) -> Self {
        let pinned = pinned.into();
        let unique = themes
            .into_iter()
            .flatten()
            .filter(|theme| !theme.trim().is_empty())
            .collect::<IndexSet<_>>();

        let has_pinned = unique.contains(&pinned);
        let mut categories = unique
            .into_iter()
            .filter(|theme| *theme != pinned)
            .collect::<Vec<_>>();
        if has_pinned {
            categories.push(pinned.clone());
        }

        Self { categories, pinned }
    }

    /// Categories in display order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Theme always displayed last.
    pub fn pinned(&self) -> &str {
        &self.pinned
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn contains(&self, theme: &str) -> bool {
        self.categories.iter().any(|category| category == theme)
    }

    /// Categories eligible for a random draw.
    pub fn raffle_pool(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(String::as_str)
            .filter(|category| *category != self.pinned)
            .collect()
    }

    /// Draw one eligible category uniformly, or `None` when nothing is eligible.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.raffle_pool().choose(rng).copied()
    }
}
