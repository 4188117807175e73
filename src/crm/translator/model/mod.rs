use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crm::translator::error::{Result, TranslatorError};

/// Locale identifier (LCID) of a language column, e.g. `1033` for en-US.
///
/// Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LanguageCode(u32);

impl LanguageCode {
    /// Creates a language code, rejecting zero.
    pub fn new(code: u32) -> Result<Self> {
        if code == 0 {
            return Err(TranslatorError::InvalidLanguageCode(code.to_string()));
        }
        Ok(Self(code))
    }

    /// Returns the raw locale identifier.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for LanguageCode {
    type Error = TranslatorError;

    fn try_from(code: u32) -> Result<Self> {
        Self::new(code)
    }
}

impl From<LanguageCode> for u32 {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl FromStr for LanguageCode {
    type Err = TranslatorError;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let code = trimmed
            .parse::<u32>()
            .map_err(|_| TranslatorError::InvalidLanguageCode(trimmed.to_string()))?;
        Self::new(code)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text of one label in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedLabel {
    pub language_code: LanguageCode,
    pub label: String,
}

impl LocalizedLabel {
    pub fn new(language_code: LanguageCode, label: impl Into<String>) -> Self {
        Self {
            language_code,
            label: label.into(),
        }
    }
}

/// Localized label set for one field of one catalog object. Language codes
/// are unique within the set; see [`labels`](crate::crm::translator::labels)
/// for the operations that maintain that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredLabel")]
pub struct Label {
    pub localized_labels: Vec<LocalizedLabel>,
}

/// Label as found in a snapshot, possibly repeating a language.
#[derive(Deserialize)]
struct StoredLabel {
    #[serde(default)]
    localized_labels: Vec<LocalizedLabel>,
}

impl From<StoredLabel> for Label {
    fn from(stored: StoredLabel) -> Self {
        stored
            .localized_labels
            .into_iter()
            .map(|localized| (localized.language_code, localized.label))
            .collect()
    }
}

impl Label {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<(LanguageCode, String)> for Label {
    fn from_iter<I: IntoIterator<Item = (LanguageCode, String)>>(iter: I) -> Self {
        let mut label = Label::new();
        for (code, text) in iter {
            crate::crm::translator::labels::upsert(&mut label, code, &text);
        }
        label
    }
}

/// Attribute kinds reported by the metadata store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    Boolean,
    Customer,
    DateTime,
    Decimal,
    Double,
    Integer,
    Lookup,
    Memo,
    Money,
    Owner,
    PartyList,
    Picklist,
    State,
    Status,
    String,
    Uniqueidentifier,
    CalendarRules,
    Virtual,
    BigInt,
    ManagedProperty,
    EntityName,
    /// Multi-select choice list. Stored as a virtual column upstream.
    MultiSelectPicklist,
}

/// Which labeled property a translation row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    DisplayName,
    DisplayCollectionName,
    Description,
}

impl FieldKind {
    /// The literal tag written to the `Type` column.
    pub fn tag(self) -> &'static str {
        match self {
            FieldKind::DisplayName => "DisplayName",
            FieldKind::DisplayCollectionName => "DisplayCollectionName",
            FieldKind::Description => "Description",
        }
    }

    /// Parses a tag, returning `None` for anything outside the closed set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "DisplayName" => Some(FieldKind::DisplayName),
            "DisplayCollectionName" => Some(FieldKind::DisplayCollectionName),
            "Description" => Some(FieldKind::Description),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Attribute (column) definition within a catalog entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    pub logical_name: String,
    #[serde(default)]
    pub entity_logical_name: String,
    #[serde(default)]
    pub metadata_id: Option<Uuid>,
    #[serde(default)]
    pub attribute_type: Option<AttributeType>,
    #[serde(default)]
    pub display_name: Option<Label>,
    #[serde(default)]
    pub description: Option<Label>,
    /// Logical name of the attribute this one is a sub-field of, if any.
    #[serde(default)]
    pub attribute_of: Option<String>,
    #[serde(default = "default_renameable")]
    pub is_renameable: bool,
}

impl AttributeMetadata {
    pub fn new(logical_name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            logical_name: logical_name.into(),
            entity_logical_name: String::new(),
            metadata_id: Some(Uuid::new_v4()),
            attribute_type: Some(attribute_type),
            display_name: None,
            description: None,
            attribute_of: None,
            is_renameable: true,
        }
    }

    /// Returns the label set backing the given field kind. Attributes carry
    /// no plural name.
    pub fn label(&self, kind: FieldKind) -> Option<&Label> {
        match kind {
            FieldKind::DisplayName => self.display_name.as_ref(),
            FieldKind::Description => self.description.as_ref(),
            FieldKind::DisplayCollectionName => None,
        }
    }

    /// Returns the label set for `kind`, creating an empty one if missing.
    pub fn label_mut(&mut self, kind: FieldKind) -> Option<&mut Label> {
        let slot = match kind {
            FieldKind::DisplayName => &mut self.display_name,
            FieldKind::Description => &mut self.description,
            FieldKind::DisplayCollectionName => return None,
        };
        Some(slot.get_or_insert_with(Label::new))
    }
}

/// Entity (table) definition in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub logical_name: String,
    #[serde(default)]
    pub metadata_id: Option<Uuid>,
    #[serde(default)]
    pub display_name: Option<Label>,
    #[serde(default)]
    pub display_collection_name: Option<Label>,
    #[serde(default)]
    pub description: Option<Label>,
    #[serde(default = "default_renameable")]
    pub is_renameable: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeMetadata>,
}

impl EntityMetadata {
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            metadata_id: Some(Uuid::new_v4()),
            display_name: None,
            display_collection_name: None,
            description: None,
            is_renameable: true,
            attributes: Vec::new(),
        }
    }

    pub fn label(&self, kind: FieldKind) -> Option<&Label> {
        match kind {
            FieldKind::DisplayName => self.display_name.as_ref(),
            FieldKind::DisplayCollectionName => self.display_collection_name.as_ref(),
            FieldKind::Description => self.description.as_ref(),
        }
    }

    /// Returns the label set for `kind`, creating an empty one if missing.
    pub fn label_mut(&mut self, kind: FieldKind) -> &mut Label {
        let slot = match kind {
            FieldKind::DisplayName => &mut self.display_name,
            FieldKind::DisplayCollectionName => &mut self.display_collection_name,
            FieldKind::Description => &mut self.description,
        };
        slot.get_or_insert_with(Label::new)
    }

    /// Finds an attribute by logical name, ignoring ASCII case.
    pub fn attribute_mut(&mut self, logical_name: &str) -> Option<&mut AttributeMetadata> {
        self.attributes
            .iter_mut()
            .find(|attribute| attribute.logical_name.eq_ignore_ascii_case(logical_name))
    }

    /// Adds an attribute, stamping it with this entity's logical name.
    pub fn with_attribute(mut self, mut attribute: AttributeMetadata) -> Self {
        attribute.entity_logical_name = self.logical_name.clone();
        self.attributes.push(attribute);
        self
    }
}

fn default_renameable() -> bool {
    true
}
