use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Syncable data types the transaction layer can mark as encrypted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Bookmarks,
    Preferences,
    Passwords,
    AutofillProfile,
    Autofill,
    Themes,
    TypedUrls,
    Extensions,
    SearchEngines,
    Sessions,
    Apps,
    DeviceInfo,
    Nigori,
}

impl ModelType {
    /// Types that carry their own encryption scheme and are always treated
    /// as encrypted.
    pub fn sensitive_types() -> ModelTypeSet {
        [ModelType::Passwords, ModelType::Nigori].into_iter().collect()
    }
}

/// Ordered set of [`ModelType`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelTypeSet(BTreeSet<ModelType>);

impl ModelTypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, model_type: ModelType) {
        self.0.insert(model_type);
    }

    pub fn put_all(&mut self, other: &ModelTypeSet) {
        self.0.extend(other.iter());
    }

    pub fn has(&self, model_type: ModelType) -> bool {
        self.0.contains(&model_type)
    }

    pub fn has_all(&self, other: &ModelTypeSet) -> bool {
        other.0.is_subset(&self.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = ModelType> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ModelType> for ModelTypeSet {
    fn from_iter<I: IntoIterator<Item = ModelType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
