//! fontcat-core: a file-backed catalog of installed typefaces.
//!
//! The catalog records where each `(family, style)` face lives on disk,
//! persists that record in a small parenthesized text format and answers
//! lookups for a layout engine.
//!
//! ## Pieces
//!
//! - [`value`], [`codec`] and [`order`]: the record model, its text form and
//!   the canonical order that makes saved files byte-stable.
//! - [`store`]: tolerant loading and canonical saving of each table.
//! - [`scan`]: walking font directories and reading face names.
//! - [`filter`]: rebuilding a catalog from what is still on disk, recovering
//!   faces whose files changed size.
//! - [`delta`]: the entries a local catalog adds to the global reference.
//! - [`catalog`] and [`query`]: the context object tying it together.
//!
//! ```rust,no_run
//! use fontcat_core::catalog::Catalog;
//! use fontcat_core::config::CatalogConfig;
//! use fontcat_core::services::Services;
//!
//! let mut catalog = Catalog::new(CatalogConfig::from_env()?, Services::system());
//! for family in catalog.families() {
//!     for style in catalog.styles(&family) {
//!         println!("{family} {style}: {:?}", catalog.search(&family, &style));
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod catalog;
pub mod codec;
pub mod config;
pub mod delta;
pub mod features;
pub mod filter;
#[cfg(feature = "fontations")]
pub mod fontations;
pub mod order;
pub mod output;
pub mod paths;
pub mod query;
pub mod scan;
pub mod services;
pub mod store;
pub mod table;
pub mod value;

pub use catalog::Catalog;
pub use config::CatalogConfig;
pub use paths::{FontPaths, PathExpr, SearchPaths};
pub use services::{CacheListener, FeatureGuesser, FontIntrospector, Services};
pub use value::{FontKey, Location, Value};
