//! Viewgen
//!
//! Generates a typed Python client SDK from a data-model schema of views,
//! and synthesizes mock instances for developing against that SDK before
//! any real data exists.
//!
//! ## Features
//!
//! - **Property Classification**: Maps schema property types to Python
//!   read and write types, rejecting what it cannot express
//! - **Content Deduplication**: SHA256 fingerprints collapse views that
//!   differ only in version
//! - **Dependency Resolution**: Cross-view relations become an explicit
//!   graph, ordered for import generation
//! - **Deterministic Output**: Identical schemas (and seeds) reproduce
//!   identical SDKs and mock batches byte for byte
//!
//! ## Generated layout
//!
//! ```text
//! my_package/
//! ├── __init__.py
//! ├── _api_client.py
//! ├── _api/
//! │   ├── __init__.py
//! │   ├── _core.py
//! │   └── person.py
//! └── data_classes/
//!     ├── __init__.py
//!     ├── _core.py
//!     └── _person.py
//! pyproject.toml
//! ```

pub mod classify;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod generator;
pub mod graph;
pub mod mock;
pub mod names;
pub mod schema;
pub mod source;

pub use classify::{Classifier, Field, ViewFields};
pub use config::GeneratorConfig;
pub use dedupe::{dedupe, Fingerprint};
pub use error::{GeneratorError, Result};
pub use generator::{GeneratedSdk, GenerationReport, SdkGenerator};
pub use graph::ViewGraph;
pub use mock::{MockData, MockGenerator};
pub use names::ApiClass;
pub use schema::{DataModel, View, ViewId};
pub use source::{InMemorySource, ViewSource};
