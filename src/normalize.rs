//! Field normalization for recipe records.
//!
//! Source records follow schema.org/Recipe loosely: any field may be missing,
//! null, a scalar, or a list, and instructions may be HowToStep objects.
//! Everything is flattened to plain text before indexing, and the
//! concatenation order of `embedding_text` is a compatibility contract with
//! documents already in the store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar JSON value as it appears in recipe fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Integer(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Null => Ok(()),
        }
    }
}

/// A recipe field holding either one scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl FieldValue {
    /// Flatten to text: scalars render as-is, lists are comma-joined.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::One(scalar) => scalar.to_string(),
            FieldValue::Many(items) => items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// One entry of the instructions list: a schema.org HowToStep object (only
/// its `text` matters), a bare scalar, or any other JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstructionStep {
    Step { text: String },
    Plain(Scalar),
    Other(serde_json::Value),
}

impl InstructionStep {
    fn as_text(&self) -> String {
        match self {
            InstructionStep::Step { text } => text.clone(),
            InstructionStep::Plain(scalar) => scalar.to_string(),
            InstructionStep::Other(value) => value.to_string(),
        }
    }
}

/// The instructions field: a list of steps, or any single loose value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instructions {
    Steps(Vec<InstructionStep>),
    Value(FieldValue),
}

impl Instructions {
    /// Steps are space-joined (not comma-joined like other list fields).
    pub fn to_text(&self) -> String {
        match self {
            Instructions::Steps(steps) => steps
                .iter()
                .map(InstructionStep::as_text)
                .collect::<Vec<_>>()
                .join(" "),
            Instructions::Value(value) => value.to_text(),
        }
    }
}

/// A recipe as read from the source collection. Every field is optional and
/// loosely shaped; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeRecord {
    pub name: Option<FieldValue>,
    pub description: Option<FieldValue>,
    pub recipe_ingredient: Option<FieldValue>,
    pub recipe_instructions: Option<Instructions>,
    pub prep_time: Option<FieldValue>,
    pub cook_time: Option<FieldValue>,
    pub total_time: Option<FieldValue>,
    pub recipe_category: Option<FieldValue>,
    pub cooking_method: Option<FieldValue>,
    pub recipe_cuisine: Option<FieldValue>,
}

/// Flattened text form of a recipe: the shape stored in the document store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizedRecipe {
    pub name: String,
    pub description: String,
    pub recipe_ingredient: String,
    pub recipe_instructions: String,
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
    pub recipe_category: String,
    pub cooking_method: String,
    pub recipe_cuisine: String,
}

impl NormalizedRecipe {
    /// Concatenated text fed to the embedding model.
    ///
    /// Field order is fixed; changing it would change every future embedding
    /// relative to documents already indexed, silently degrading retrieval.
    /// Empty fields stay in the join, exactly like the stored documents were
    /// built originally.
    pub fn embedding_text(&self) -> String {
        [
            self.name.as_str(),
            self.description.as_str(),
            self.recipe_ingredient.as_str(),
            self.recipe_instructions.as_str(),
            self.prep_time.as_str(),
            self.cook_time.as_str(),
            self.total_time.as_str(),
            self.recipe_category.as_str(),
            self.cooking_method.as_str(),
            self.recipe_cuisine.as_str(),
        ]
        .join(" ")
    }
}

/// Flatten a loose record into plain text fields. Pure and infallible:
/// absent fields become empty strings.
pub fn normalize(record: &RecipeRecord) -> NormalizedRecipe {
    fn text(field: &Option<FieldValue>) -> String {
        field.as_ref().map(FieldValue::to_text).unwrap_or_default()
    }

    NormalizedRecipe {
        name: text(&record.name),
        description: text(&record.description),
        recipe_ingredient: text(&record.recipe_ingredient),
        recipe_instructions: record
            .recipe_instructions
            .as_ref()
            .map(Instructions::to_text)
            .unwrap_or_default(),
        prep_time: text(&record.prep_time),
        cook_time: text(&record.cook_time),
        total_time: text(&record.total_time),
        recipe_category: text(&record.recipe_category),
        cooking_method: text(&record.cooking_method),
        recipe_cuisine: text(&record.recipe_cuisine),
    }
}
