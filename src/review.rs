//! The review record and its fixed field set

use serde::Deserialize;
use std::fmt;

/// Value stored for any field whose content could not be located
pub const NOT_AVAILABLE: &str = "Not Available";

/// The eleven fields of a review, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Artist,
    Album,
    Score,
    Year,
    Reviewer,
    Genre,
    Label,
    ReviewDate,
    Summary,
    ReviewText,
    #[serde(alias = "best_new_flag")]
    BestNew,
}

impl Field {
    /// All fields in persisted column order
    pub const ALL: [Field; 11] = [
        Field::Artist,
        Field::Album,
        Field::Score,
        Field::Year,
        Field::Reviewer,
        Field::Genre,
        Field::Label,
        Field::ReviewDate,
        Field::Summary,
        Field::ReviewText,
        Field::BestNew,
    ];

    /// Name used in the rule table
    pub fn name(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Score => "score",
            Self::Year => "year",
            Self::Reviewer => "reviewer",
            Self::Genre => "genre",
            Self::Label => "label",
            Self::ReviewDate => "review_date",
            Self::Summary => "summary",
            Self::ReviewText => "review_text",
            Self::BestNew => "best_new",
        }
    }

    /// Column name in the `reviews` table
    pub fn column(&self) -> &'static str {
        match self {
            Self::ReviewText => "review",
            other => other.name(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One harvested album review
///
/// Every field always holds either trimmed text or [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub artist: String,
    pub album: String,
    pub score: String,
    pub year: String,
    pub reviewer: String,
    pub genre: String,
    pub label: String,
    pub review_date: String,
    pub summary: String,
    pub review_text: String,
    pub best_new: String,
}

impl Review {
    /// Builds a review by asking `value` for each field in column order
    pub fn from_fn(mut value: impl FnMut(Field) -> String) -> Self {
        Self {
            artist: value(Field::Artist),
            album: value(Field::Album),
            score: value(Field::Score),
            year: value(Field::Year),
            reviewer: value(Field::Reviewer),
            genre: value(Field::Genre),
            label: value(Field::Label),
            review_date: value(Field::ReviewDate),
            summary: value(Field::Summary),
            review_text: value(Field::ReviewText),
            best_new: value(Field::BestNew),
        }
    }

    /// Returns the value of a single field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Artist => &self.artist,
            Field::Album => &self.album,
            Field::Score => &self.score,
            Field::Year => &self.year,
            Field::Reviewer => &self.reviewer,
            Field::Genre => &self.genre,
            Field::Label => &self.label,
            Field::ReviewDate => &self.review_date,
            Field::Summary => &self.summary,
            Field::ReviewText => &self.review_text,
            Field::BestNew => &self.best_new,
        }
    }

    /// All values in column order
    pub fn values(&self) -> [&str; 11] {
        Field::ALL.map(|field| self.get(field))
    }

    /// Returns true if the field fell back to [`NOT_AVAILABLE`]
    pub fn is_missing(&self, field: Field) -> bool {
        self.get(field) == NOT_AVAILABLE
    }
}
