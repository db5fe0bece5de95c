//! Recipe model.
//!
//! # Responsibility
//! - Define the stored recipe record and its create/update inputs.
//! - Own the fixed-point `Price` type and its text/JSON forms.
//!
//! # Invariants
//! - `title` is trimmed, non-blank and at most 255 chars.
//! - `price` has two decimal places and at most five digits (`999.99`).
//! - `time_minutes` is never negative.

use crate::model::attribute::{normalize_attribute_name, AttributeInput, AttributeKind, Ingredient, Tag};
use crate::model::user::UserId;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Maximum stored title / link length.
pub const RECIPE_TEXT_MAX_CHARS: usize = 255;

/// Storage-assigned recipe identifier.
pub type RecipeId = i64;

/// Field-level validation failures for recipe, tag and ingredient input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    BlankTitle,
    TooLong { field: &'static str, max: usize },
    NegativeTime(i64),
    InvalidPrice(String),
    PriceOutOfRange,
    BlankAttributeName(AttributeKind),
    AttributeNameTooLong { kind: AttributeKind, max: usize },
    /// Image uploads need a file.
    MissingImage,
}

impl RecipeValidationError {
    /// Input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankTitle => "title",
            Self::TooLong { field, .. } => field,
            Self::NegativeTime(_) => "time_minutes",
            Self::InvalidPrice(_) | Self::PriceOutOfRange => "price",
            Self::BlankAttributeName(kind) => kind.field(),
            Self::AttributeNameTooLong { kind, .. } => kind.field(),
            Self::MissingImage => "image",
        }
    }
}

impl Display for RecipeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title may not be blank"),
            Self::TooLong { field, max } => {
                write!(f, "{field} must contain at most {max} characters")
            }
            Self::NegativeTime(value) => {
                write!(f, "time_minutes must be >= 0, got {value}")
            }
            Self::InvalidPrice(value) => write!(f, "a valid price is required, got `{value}`"),
            Self::PriceOutOfRange => write!(
                f,
                "price must have at most {} digits and {} decimal places",
                Price::MAX_DIGITS,
                Price::DECIMAL_PLACES
            ),
            Self::BlankAttributeName(kind) => write!(f, "{} name may not be blank", kind.label()),
            Self::AttributeNameTooLong { kind, max } => {
                write!(f, "{} name must contain at most {max} characters", kind.label())
            }
            Self::MissingImage => write!(f, "no file was submitted"),
        }
    }
}

impl Error for RecipeValidationError {}

/// Fixed-point price with two decimal places, stored as integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price {
    cents: i64,
}

impl Price {
    pub const MAX_DIGITS: usize = 5;
    pub const DECIMAL_PLACES: usize = 2;
    pub const MAX_CENTS: i64 = 99_999;

    /// Builds a price from integer cents.
    pub fn from_cents(cents: i64) -> Result<Self, RecipeValidationError> {
        if cents < 0 {
            return Err(RecipeValidationError::InvalidPrice(cents.to_string()));
        }
        if cents > Self::MAX_CENTS {
            return Err(RecipeValidationError::PriceOutOfRange);
        }
        Ok(Self { cents })
    }

    pub fn cents(self) -> i64 {
        self.cents
    }

    /// Parses decimal text such as `5.50`, `5.5`, `5` or `.5`.
    pub fn parse(raw: &str) -> Result<Self, RecipeValidationError> {
        let text = raw.trim();
        let invalid = || RecipeValidationError::InvalidPrice(raw.to_string());

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let fraction = fraction.trim_end_matches('0');
        let whole = whole.trim_start_matches('0');
        if fraction.len() > Self::DECIMAL_PLACES
            || whole.len() > Self::MAX_DIGITS - Self::DECIMAL_PLACES
        {
            return Err(RecipeValidationError::PriceOutOfRange);
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut fraction_value: i64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| invalid())?
        };
        if fraction.len() == 1 {
            fraction_value *= 10;
        }

        Self::from_cents(whole_value * 100 + fraction_value)
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl FromStr for Price {
    type Err = RecipeValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a decimal price as string or number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Price, E> {
        Price::parse(value).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Price, E> {
        Price::parse(&value.to_string()).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Price, E> {
        Price::parse(&value.to_string()).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Price, E> {
        if !value.is_finite() {
            return Err(E::custom(RecipeValidationError::InvalidPrice(
                value.to_string(),
            )));
        }
        Price::parse(&value.to_string()).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

/// Stored recipe with its linked tags and ingredients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub time_minutes: i64,
    pub price: Price,
    pub link: String,
    /// Media path relative to the media root.
    pub image: Option<String>,
    /// Linked tags ordered by name.
    pub tags: Vec<Tag>,
    /// Linked ingredients ordered by name.
    pub ingredients: Vec<Ingredient>,
}

/// Input for creating one recipe with nested tags and ingredients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    pub time_minutes: i64,
    pub price: Price,
    pub link: String,
    pub description: String,
    pub tags: Vec<AttributeInput>,
    pub ingredients: Vec<AttributeInput>,
}

impl RecipeDraft {
    pub fn new(title: impl Into<String>, time_minutes: i64, price: Price) -> Self {
        Self {
            title: title.into(),
            time_minutes,
            price,
            link: String::new(),
            description: String::new(),
            tags: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    /// Validates scalar fields and returns normalized copies of text fields.
    pub fn normalized(&self) -> Result<Self, RecipeValidationError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            time_minutes: validate_time(self.time_minutes)?,
            price: self.price,
            link: normalize_link(&self.link)?,
            description: self.description.clone(),
            tags: normalize_inputs(AttributeKind::Tag, &self.tags)?,
            ingredients: normalize_inputs(AttributeKind::Ingredient, &self.ingredients)?,
        })
    }
}

/// Partial recipe update; `None` leaves a field untouched.
///
/// `tags: Some(vec![])` clears the tag set, `tags: None` keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<AttributeInput>>,
    pub ingredients: Option<Vec<AttributeInput>>,
}

impl RecipeChanges {
    /// Validates present fields and returns normalized copies.
    pub fn normalized(&self) -> Result<Self, RecipeValidationError> {
        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            time_minutes: self.time_minutes.map(validate_time).transpose()?,
            price: self.price,
            link: self.link.as_deref().map(normalize_link).transpose()?,
            description: self.description.clone(),
            tags: self
                .tags
                .as_deref()
                .map(|tags| normalize_inputs(AttributeKind::Tag, tags))
                .transpose()?,
            ingredients: self
                .ingredients
                .as_deref()
                .map(|ingredients| normalize_inputs(AttributeKind::Ingredient, ingredients))
                .transpose()?,
        })
    }

    /// Applies present scalar fields onto a loaded recipe.
    pub fn apply_to(&self, recipe: &mut Recipe) {
        if let Some(title) = &self.title {
            recipe.title = title.clone();
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price = price;
        }
        if let Some(link) = &self.link {
            recipe.link = link.clone();
        }
        if let Some(description) = &self.description {
            recipe.description = description.clone();
        }
    }
}

fn normalize_title(raw: &str) -> Result<String, RecipeValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecipeValidationError::BlankTitle);
    }
    if trimmed.chars().count() > RECIPE_TEXT_MAX_CHARS {
        return Err(RecipeValidationError::TooLong {
            field: "title",
            max: RECIPE_TEXT_MAX_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

fn normalize_link(raw: &str) -> Result<String, RecipeValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > RECIPE_TEXT_MAX_CHARS {
        return Err(RecipeValidationError::TooLong {
            field: "link",
            max: RECIPE_TEXT_MAX_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

fn validate_time(value: i64) -> Result<i64, RecipeValidationError> {
    if value < 0 {
        return Err(RecipeValidationError::NegativeTime(value));
    }
    Ok(value)
}

fn normalize_inputs(
    kind: AttributeKind,
    inputs: &[AttributeInput],
) -> Result<Vec<AttributeInput>, RecipeValidationError> {
    inputs
        .iter()
        .map(|input| normalize_attribute_name(kind, &input.name).map(AttributeInput::new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Price, RecipeChanges, RecipeDraft, RecipeValidationError};

    #[test]
    fn price_parses_common_decimal_forms() {
        assert_eq!(Price::parse("5.50").unwrap().cents(), 550);
        assert_eq!(Price::parse("5.5").unwrap().cents(), 550);
        assert_eq!(Price::parse("5").unwrap().cents(), 500);
        assert_eq!(Price::parse(".25").unwrap().cents(), 25);
        assert_eq!(Price::parse("007.10").unwrap().cents(), 710);
    }

    #[test]
    fn price_rejects_extra_precision_and_overflow() {
        assert_eq!(
            Price::parse("1.005"),
            Err(RecipeValidationError::PriceOutOfRange)
        );
        assert_eq!(
            Price::parse("1000"),
            Err(RecipeValidationError::PriceOutOfRange)
        );
        assert!(matches!(
            Price::parse("-1"),
            Err(RecipeValidationError::InvalidPrice(_))
        ));
        assert!(matches!(
            Price::parse("abc"),
            Err(RecipeValidationError::InvalidPrice(_))
        ));
    }

    #[test]
    fn price_displays_two_decimal_places() {
        assert_eq!(Price::from_cents(505).unwrap().to_string(), "5.05");
        assert_eq!(Price::from_cents(99_999).unwrap().to_string(), "999.99");
    }

    #[test]
    fn price_json_is_a_string_and_accepts_numbers() {
        let price = Price::from_cents(550).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"5.50\"");

        let parsed: Price = serde_json::from_str("5.5").unwrap();
        assert_eq!(parsed.cents(), 550);
        let parsed: Price = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(parsed.cents(), 1200);
        assert!(serde_json::from_str::<Price>("\"1000\"").is_err());
    }

    #[test]
    fn draft_normalization_trims_title_and_checks_time() {
        let draft = RecipeDraft::new("  Soup ", 10, Price::default());
        assert_eq!(draft.normalized().unwrap().title, "Soup");

        let negative = RecipeDraft::new("Soup", -1, Price::default());
        assert_eq!(
            negative.normalized().unwrap_err(),
            RecipeValidationError::NegativeTime(-1)
        );
    }

    #[test]
    fn changes_normalization_keeps_absent_fields_absent() {
        let changes = RecipeChanges {
            title: Some(" New ".to_string()),
            ..RecipeChanges::default()
        };
        let normalized = changes.normalized().unwrap();
        assert_eq!(normalized.title.as_deref(), Some("New"));
        assert!(normalized.tags.is_none());
        assert!(normalized.price.is_none());
    }
}
