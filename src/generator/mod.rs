//! SDK generation
//!
//! Composes the pipeline: dedupe -> classify (per view) -> dependency
//! resolution -> per-view rendering -> assembly of the full file index.
//!
//! A single view that fails classification is reported through the
//! injected logger and skipped; its class never enters the per-view output
//! map or the dependency map. Everything else aborts the run.

pub mod manifest;
pub mod output;
pub mod templates;

use std::collections::{BTreeMap, BTreeSet};

use crate::classify::{Classifier, Field, ViewFields};
use crate::config::GeneratorConfig;
use crate::dedupe::dedupe;
use crate::error::Result;
use crate::graph::ViewGraph;
use crate::names::{to_pascal_case, ApiClass};
use crate::schema::{DataModel, View};

use templates::{
    ApiClassBinding, ClientApiBinding, ClientBinding, CoreBinding, DataClassBinding,
    DataClassesInitBinding, DependencyBinding, EdgeApiBinding, InitModuleBinding,
    TemplateEngine, API_CLASS_TEMPLATE, API_CORE_TEMPLATE, CLIENT_TEMPLATE, CORE_TEMPLATE,
    DATA_CLASSES_INIT_TEMPLATE, DATA_CLASS_TEMPLATE,
};

// =============================================================================
// Results
// =============================================================================

/// One view the run skipped, with the underlying cause
#[derive(Debug, Clone)]
pub struct SkippedView {
    pub view: String,
    pub reason: String,
}

/// Summary of one generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Data-class names generated, in output order
    pub generated: Vec<String>,
    pub skipped: Vec<SkippedView>,
}

/// The full generated SDK: an index of relative file path -> file text
#[derive(Debug)]
pub struct GeneratedSdk {
    pub files: BTreeMap<String, String>,
    /// class -> classes it references via edge fields (kept views only)
    pub dependency_map: BTreeMap<String, BTreeSet<String>>,
    pub report: GenerationReport,
}

// =============================================================================
// Generator
// =============================================================================

/// Logger sink for recoverable per-view failures
pub type Logger<'a> = Box<dyn FnMut(&str) + 'a>;

/// Generates a complete SDK from a data-model snapshot
pub struct SdkGenerator<'a> {
    config: GeneratorConfig,
    engine: TemplateEngine,
    logger: Option<Logger<'a>>,
}

impl<'a> SdkGenerator<'a> {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            engine: TemplateEngine::new(),
            logger: None,
        }
    }

    /// Install a logger that receives one line per skipped view
    pub fn with_logger(mut self, logger: Logger<'a>) -> Self {
        self.logger = Some(logger);
        self
    }

    fn report(&mut self, line: &str) {
        tracing::warn!("{}", line);
        if let Some(logger) = self.logger.as_mut() {
            logger(line);
        }
    }

    /// Generate the full SDK for one data model.
    pub fn generate(&mut self, model: &DataModel) -> Result<GeneratedSdk> {
        let top_level_package = self.config.package.python_package();
        let path_prefix = self.config.package.package_path()?;

        let views = dedupe(model.views.clone());
        let classifier = Classifier::new(&views);

        // Fixed, sorted work order keeps the output independent of the
        // snapshot's view ordering.
        let mut sorted: Vec<&View> = views.iter().collect();
        sorted.sort_by(|a, b| {
            a.id.external_id
                .cmp(&b.id.external_id)
                .then_with(|| a.id.version.cmp(&b.id.version))
        });

        let mut report = GenerationReport::default();
        let mut entries: Vec<(ApiClass, ViewFields, &View)> = Vec::with_capacity(sorted.len());
        for view in sorted {
            match ViewFields::from_view(&classifier, view) {
                Ok(fields) => {
                    entries.push((ApiClass::from_name(view.display_name()), fields, view));
                }
                Err(err) if err.is_per_view() => {
                    self.report(&format!(
                        "skipping view '{}': {}",
                        view.display_name(),
                        err
                    ));
                    report.skipped.push(SkippedView {
                        view: view.display_name().to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let graph_entries: Vec<(ApiClass, ViewFields)> = entries
            .iter()
            .map(|(api, fields, _)| (api.clone(), fields.clone()))
            .collect();
        let graph = ViewGraph::build(&graph_entries);

        let mut files: BTreeMap<String, String> = BTreeMap::new();

        // Per-view artifacts: one data-class module and one API module
        for (api, fields, view) in &entries {
            let data = self.render_data_class(&top_level_package, api, fields, view, &graph)?;
            files.insert(
                format!("{}/data_classes/_{}.py", path_prefix, api.file_name),
                data,
            );

            let api_file = self.render_api_class(&top_level_package, api, fields, view)?;
            files.insert(format!("{}/_api/{}.py", path_prefix, api.file_name), api_file);

            report.generated.push(api.data_class.clone());
        }

        // Aggregate artifacts
        self.assemble(
            &mut files,
            &top_level_package,
            &path_prefix,
            model,
            &graph,
        )?;

        files.insert(
            "pyproject.toml".to_string(),
            manifest::render_manifest(&self.engine, &self.config, model)?,
        );

        Ok(GeneratedSdk {
            files,
            dependency_map: graph.dependency_map().clone(),
            report,
        })
    }

    fn render_data_class(
        &self,
        top_level_package: &str,
        api: &ApiClass,
        fields: &ViewFields,
        view: &View,
        graph: &ViewGraph,
    ) -> Result<String> {
        // Imports only reference views that were actually kept
        let dependencies: Vec<DependencyBinding> = fields
            .unique_dependencies()
            .into_iter()
            .filter(|target| graph.api_class(&target.class_name).is_some())
            .map(|target| DependencyBinding {
                class_name: target.class_name.clone(),
                write_class: target.write_class.clone(),
                file_name: target.file_name.clone(),
            })
            .collect();

        let binding = DataClassBinding {
            top_level_package,
            class_name: &api.data_class,
            write_class: api.write_class(),
            list_class: &api.list_class,
            file_name: &api.file_name,
            source_space: &view.id.space,
            source_external_id: &view.id.external_id,
            source_version: &view.id.version,
            fields: signature_order(fields),
            dependencies,
        };
        self.engine.render(DATA_CLASS_TEMPLATE, &binding)
    }

    fn render_api_class(
        &self,
        top_level_package: &str,
        api: &ApiClass,
        fields: &ViewFields,
        view: &View,
    ) -> Result<String> {
        let edge_apis: Vec<EdgeApiBinding> = fields
            .one_to_many()
            .filter_map(|field| {
                let edge = field.edge.as_ref()?;
                Some(EdgeApiBinding {
                    api_suffix: edge.api_suffix.clone()?,
                    attribute: edge.api_attribute.clone()?,
                    target_class: edge.class_name.clone(),
                    target_file: edge.file_name.clone(),
                })
            })
            .collect();

        let binding = ApiClassBinding {
            top_level_package,
            api_class: &api.api_class,
            class_name: &api.data_class,
            write_class: api.write_class(),
            list_class: &api.list_class,
            file_name: &api.file_name,
            source_space: &view.id.space,
            source_external_id: &view.id.external_id,
            edge_apis,
        };
        self.engine.render(API_CLASS_TEMPLATE, &binding)
    }

    fn assemble(
        &self,
        files: &mut BTreeMap<String, String>,
        top_level_package: &str,
        path_prefix: &str,
        model: &DataModel,
        graph: &ViewGraph,
    ) -> Result<()> {
        // Data-classes init, dependency order so imports resolve forward
        // references before they are needed.
        let modules: Vec<InitModuleBinding> = graph
            .topo_order()
            .into_iter()
            .filter_map(|name| graph.api_class(&name).cloned())
            .map(|api| InitModuleBinding {
                file_name: api.file_name.clone(),
                data_class: api.data_class.clone(),
                write_class: api.write_class(),
                list_class: api.list_class.clone(),
            })
            .collect();
        files.insert(
            format!("{}/data_classes/__init__.py", path_prefix),
            self.engine.render(
                DATA_CLASSES_INIT_TEMPLATE,
                &DataClassesInitBinding {
                    top_level_package,
                    modules,
                },
            )?,
        );

        // Aggregate client over every kept view, alphabetical by accessor
        let apis: Vec<ClientApiBinding> = graph
            .classes()
            .map(|api| ClientApiBinding {
                api_class: api.api_class.clone(),
                api_attribute: api.api_attribute.clone(),
                file_name: api.file_name.clone(),
            })
            .collect();
        let client_name = self.client_name(model);
        files.insert(
            format!("{}/_api_client.py", path_prefix),
            self.engine.render(
                CLIENT_TEMPLATE,
                &ClientBinding {
                    top_level_package,
                    client_name: &client_name,
                    model_space: &model.space,
                    model_external_id: &model.external_id,
                    model_version: &model.version,
                    first_api_attribute: apis
                        .first()
                        .map(|a| a.api_attribute.clone())
                        .unwrap_or_else(|| "example".to_string()),
                    apis,
                },
            )?,
        );

        // Static core variants, selected by serialization-library version
        let core = CoreBinding {
            top_level_package,
            pydantic_v2: self.config.package.pydantic_v2,
        };
        files.insert(
            format!("{}/data_classes/_core.py", path_prefix),
            self.engine.render(CORE_TEMPLATE, &core)?,
        );
        files.insert(
            format!("{}/_api/_core.py", path_prefix),
            self.engine.render(API_CORE_TEMPLATE, &core)?,
        );

        // Package inits are trivial glue, assembled directly
        files.insert(
            format!("{}/__init__.py", path_prefix),
            format!(
                "from {}._api_client import {}\n\n__all__ = [\"{}\"]\n",
                top_level_package, client_name, client_name
            ),
        );
        files.insert(format!("{}/_api/__init__.py", path_prefix), String::new());

        Ok(())
    }

    fn client_name(&self, model: &DataModel) -> String {
        match &self.config.package.client_name {
            Some(name) => name.clone(),
            None => format!("{}Client", to_pascal_case(&model.external_id)),
        }
    }
}

/// Order fields the way a Python signature requires: parameters without a
/// default first, then defaulted ones, alphabetical within each group.
fn signature_order(fields: &ViewFields) -> Vec<&Field> {
    let mut ordered: Vec<&Field> = fields.iter().collect();
    ordered.sort_by_key(|f| (f.default.is_some(), f.name.clone()));
    ordered
}
