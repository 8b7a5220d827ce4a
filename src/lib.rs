//! Translate the component schemas of an OpenAPI document into flat proto3
//! message and enum definitions.
//!
//! ```no_run
//! use oapi2proto::{GeneratorConfig, document, generate, lower};
//!
//! let doc = document::read_document("openapi.yaml".as_ref(), None)?;
//! let registry = lower::lower_document(doc);
//! let proto = generate(&registry, &GeneratorConfig::default())?;
//! println!("{proto}");
//! # Ok::<(), oapi2proto::Error>(())
//! ```
pub mod cli;
pub mod config;
pub mod context;
pub mod document;
pub mod emit;
pub mod error;
pub mod ir;
pub mod lower;
pub mod naming;
pub mod path_de;
pub mod resolve;
pub mod type_map;

pub use config::{AnyOfMode, GeneratorConfig};
pub use emit::generate;
pub use error::{Error, Result};
pub use ir::{Registry, SchemaNode};
