//! Schema retrieval
//!
//! The generator consumes views through the `ViewSource` trait so callers
//! can back it with an API, a file dump, or a fixture set. The built-in
//! `InMemorySource` covers the file and test cases.

use std::collections::BTreeMap;

use crate::error::{GeneratorError, Result};
use crate::schema::{DataModel, View, ViewId};

/// Supplies views and data models to the generator
pub trait ViewSource {
    /// Fetch one view by id
    fn retrieve_view(&self, id: &ViewId) -> Result<View>;

    /// Fetch a data model and all views it contains
    fn retrieve_model(&self, space: &str, external_id: &str, version: &str) -> Result<DataModel>;

    /// Views known to this source, in stable order, optionally filtered
    /// to one space
    fn list_views(&self, space: Option<&str>) -> Result<Vec<View>>;
}

/// A source holding a fixed set of models, typically loaded from JSON
#[derive(Debug, Default)]
pub struct InMemorySource {
    models: BTreeMap<(String, String, String), DataModel>,
    views: BTreeMap<ViewId, View>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_model(&mut self, model: DataModel) {
        for view in &model.views {
            self.views.insert(view.id.clone(), view.clone());
        }
        let key = (
            model.space.clone(),
            model.external_id.clone(),
            model.version.clone(),
        );
        self.models.insert(key, model);
    }

    /// Parse a serialized model and add it
    pub fn add_model_json(&mut self, json: &str) -> Result<DataModel> {
        let model: DataModel = serde_json::from_str(json)?;
        self.add_model(model.clone());
        Ok(model)
    }
}

impl ViewSource for InMemorySource {
    fn retrieve_view(&self, id: &ViewId) -> Result<View> {
        self.views
            .get(id)
            .cloned()
            .ok_or_else(|| GeneratorError::ViewNotFound {
                identifier: id.to_string(),
            })
    }

    fn retrieve_model(&self, space: &str, external_id: &str, version: &str) -> Result<DataModel> {
        let key = (
            space.to_string(),
            external_id.to_string(),
            version.to_string(),
        );
        self.models
            .get(&key)
            .cloned()
            .ok_or_else(|| GeneratorError::ModelNotFound {
                identifier: format!("{}:{}/{}", space, external_id, version),
            })
    }

    fn list_views(&self, space: Option<&str>) -> Result<Vec<View>> {
        Ok(self
            .views
            .values()
            .filter(|v| space.map_or(true, |s| v.id.space == s))
            .cloned()
            .collect())
    }
}
