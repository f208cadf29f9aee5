//! Garment catalog and mood filtering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by catalog lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown garment: {0}")]
    UnknownGarment(String),

    #[error("Unknown mood: {0}")]
    UnknownMood(String),
}

/// Mood category of a garment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Chill,
    Sporty,
    Bold,
    Business,
}

impl Mood {
    /// All moods, in filter-chip order.
    pub const ALL: [Mood; 4] = [Mood::Chill, Mood::Sporty, Mood::Bold, Mood::Business];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Chill => "chill",
            Mood::Sporty => "sporty",
            Mood::Bold => "bold",
            Mood::Business => "business",
        }
    }

    /// Chip label.
    pub fn label(self) -> &'static str {
        match self {
            Mood::Chill => "Chill",
            Mood::Sporty => "Sporty",
            Mood::Bold => "Bold",
            Mood::Business => "Business",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownMood(s.to_string()))
    }
}

/// Catalog filter: every garment, or one mood.
///
/// `all` is a UI-only value; no garment has it as its mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MoodFilter {
    #[default]
    All,
    Only(Mood),
}

impl MoodFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            MoodFilter::All => "all",
            MoodFilter::Only(mood) => mood.as_str(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodFilter::All => "All",
            MoodFilter::Only(mood) => mood.label(),
        }
    }

    pub fn matches(self, mood: Mood) -> bool {
        match self {
            MoodFilter::All => true,
            MoodFilter::Only(wanted) => wanted == mood,
        }
    }

    /// Filter chips: `all` first, then every mood.
    pub fn chips() -> [MoodFilter; 5] {
        [
            MoodFilter::All,
            MoodFilter::Only(Mood::Chill),
            MoodFilter::Only(Mood::Sporty),
            MoodFilter::Only(Mood::Bold),
            MoodFilter::Only(Mood::Business),
        ]
    }
}

impl From<Mood> for MoodFilter {
    fn from(mood: Mood) -> Self {
        MoodFilter::Only(mood)
    }
}

impl fmt::Display for MoodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(MoodFilter::All);
        }
        s.parse().map(MoodFilter::Only)
    }
}

impl From<MoodFilter> for String {
    fn from(filter: MoodFilter) -> Self {
        filter.as_str().to_string()
    }
}

impl TryFrom<String> for MoodFilter {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentItem {
    pub id: String,
    pub title: String,
    /// Image resource the page loads (relative URL).
    pub image_src: String,
    pub mood: Mood,
}

impl GarmentItem {
    pub fn new(id: &str, title: &str, image_src: &str, mood: Mood) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            image_src: image_src.to_string(),
            mood,
        }
    }
}

/// Ordered list of garments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<GarmentItem>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn new(items: Vec<GarmentItem>) -> Self {
        Self { items }
    }

    /// The shipped wardrobe: two garments per mood.
    pub fn builtin() -> Self {
        Self::new(vec![
            GarmentItem::new("chill-hoodie", "Cloud Hoodie", "/clothing/chill/chill.PNG", Mood::Chill),
            GarmentItem::new("chill-layer", "Layered Knit", "/clothing/chill/chill.PNG", Mood::Chill),
            GarmentItem::new("sporty-top", "Arena Jacket", "/clothing/sporty/sporty.PNG", Mood::Sporty),
            GarmentItem::new("sporty-set", "Sprint Set", "/clothing/sporty/sporty.PNG", Mood::Sporty),
            GarmentItem::new("bold-dress", "Statement Dress", "/clothing/bold/IMG_5667.PNG", Mood::Bold),
            GarmentItem::new("bold-suit", "Red Carpet Suit", "/clothing/bold/IMG_5667.PNG", Mood::Bold),
            GarmentItem::new(
                "business-blazer",
                "Boardroom Blazer",
                "/clothing/business/bussines.PNG",
                Mood::Business,
            ),
            GarmentItem::new(
                "business-dress",
                "Power Dress",
                "/clothing/business/bussines.PNG",
                Mood::Business,
            ),
        ])
    }

    pub fn items(&self) -> &[GarmentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&GarmentItem, CatalogError> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| CatalogError::UnknownGarment(id.to_string()))
    }

    /// Items matching the filter, in catalog order.
    pub fn filter(&self, filter: MoodFilter) -> Vec<&GarmentItem> {
        self.items.iter().filter(|item| filter.matches(item.mood)).collect()
    }

    /// First item of the given mood.
    pub fn first_of(&self, mood: Mood) -> Option<&GarmentItem> {
        self.items.iter().find(|item| item.mood == mood)
    }
}
