//! Garment records and their validated attribute types
//!
//! A `Garment` is only ever built from a `GarmentDraft` by the catalog, so every
//! garment the rest of the crate sees has already passed validation. Drafts keep
//! every attribute optional: upload flows and classifiers often know only part
//! of an item, and a missing attribute must be rejected rather than defaulted.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog-assigned garment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GarmentId(u64);

impl GarmentId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GarmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{:06}", self.0)
    }
}

/// Outfit slot a garment fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Bottom,
    Outerwear,
    Footwear,
    Accessory,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Top,
        Category::Bottom,
        Category::Outerwear,
        Category::Footwear,
        Category::Accessory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Outerwear => "outerwear",
            Category::Footwear => "footwear",
            Category::Accessory => "accessory",
        }
    }

    /// Whether every outfit needs exactly one garment of this category
    pub fn is_mandatory(self) -> bool {
        matches!(self, Category::Top | Category::Bottom | Category::Footwear)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Category::Top),
            "bottom" => Ok(Category::Bottom),
            "outerwear" => Ok(Category::Outerwear),
            "footwear" | "shoes" => Ok(Category::Footwear),
            "accessory" => Ok(Category::Accessory),
            _ => Err(ValidationError::UnknownCategory(raw.to_string())),
        }
    }
}

/// Normalized color token (`"Navy Blue"` → `"navy-blue"`, `"gray"` → `"grey"`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    const MAX_LEN: usize = 32;

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let mut token = String::with_capacity(raw.len());
        let mut pending_sep = false;

        for ch in raw.trim().chars() {
            if ch.is_whitespace() || ch == '_' || ch == '-' {
                pending_sep = !token.is_empty();
            } else if ch.is_ascii_alphabetic() {
                if pending_sep {
                    token.push('-');
                    pending_sep = false;
                }
                token.push(ch.to_ascii_lowercase());
            } else {
                return Err(ValidationError::InvalidColor(raw.to_string()));
            }
        }

        if token.is_empty() || token.len() > Self::MAX_LEN {
            return Err(ValidationError::InvalidColor(raw.to_string()));
        }

        // Spelling variants collapse onto one token so the compatibility table stays small
        let token = match token.as_str() {
            "gray" => "grey".to_string(),
            "off-white" => "cream".to_string(),
            _ => token.replace("gray", "grey"),
        };

        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Color::parse(&raw)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// Formality on a 0 (loungewear) to 10 (black tie) scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Formality(u8);

impl Formality {
    pub const MAX: u8 = 10;

    pub fn new(raw: i64) -> Result<Self, ValidationError> {
        if (0..=i64::from(Self::MAX)).contains(&raw) {
            Ok(Self(raw as u8))
        } else {
            Err(ValidationError::FormalityOutOfRange(raw))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Formality {
    type Error = ValidationError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Formality::new(raw)
    }
}

impl From<Formality> for u8 {
    fn from(formality: Formality) -> Self {
        formality.0
    }
}

/// Opaque handle to an image held by external storage; never decoded here
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyImageRef);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        ImageRef::new(raw)
    }
}

impl From<ImageRef> for String {
    fn from(image_ref: ImageRef) -> Self {
        image_ref.0
    }
}

pub(crate) fn validate_price(price: f64) -> Result<f64, ValidationError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(ValidationError::InvalidPrice(price))
    }
}

/// A validated clothing item owned by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garment {
    id: GarmentId,
    category: Category,
    color: Color,
    formality: Formality,
    price: f64,
    image_ref: ImageRef,
}

impl Garment {
    pub fn id(&self) -> GarmentId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn formality(&self) -> Formality {
        self.formality
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn image_ref(&self) -> &ImageRef {
        &self.image_ref
    }

    /// Re-check invariants the typed fields cannot carry (price range after deserialization)
    pub(crate) fn check(&self) -> Result<(), ValidationError> {
        validate_price(self.price).map(|_| ())
    }
}

/// Unvalidated garment attributes as supplied by an upload flow or classifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GarmentDraft {
    pub category: Option<Category>,
    pub color: Option<String>,
    pub formality: Option<i64>,
    pub price: Option<f64>,
    pub image_ref: Option<String>,
}

impl GarmentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn formality(mut self, formality: i64) -> Self {
        self.formality = Some(formality);
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Validate every attribute and stamp the given id
    ///
    /// Fields are checked in declaration order so the first reported error is stable.
    pub(crate) fn validate(&self, id: GarmentId) -> Result<Garment, ValidationError> {
        let category = self.category.ok_or(ValidationError::MissingField("category"))?;
        let color = self
            .color
            .as_deref()
            .ok_or(ValidationError::MissingField("color"))
            .and_then(Color::parse)?;
        let formality = self
            .formality
            .ok_or(ValidationError::MissingField("formality"))
            .and_then(Formality::new)?;
        let price = self
            .price
            .ok_or(ValidationError::MissingField("price"))
            .and_then(validate_price)?;
        let image_ref = self
            .image_ref
            .clone()
            .ok_or(ValidationError::MissingField("image_ref"))
            .and_then(ImageRef::new)?;

        Ok(Garment {
            id,
            category,
            color,
            formality,
            price,
            image_ref,
        })
    }
}
