/// How `anyOf` alternatives become fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AnyOfMode {
    /// One `oneof any_of { ... }` group with a field per alternative.
    #[default]
    Oneof,
    /// A single `repeated` field typed after the first alternative; the others are dropped.
    Repeat,
}

/// Run-wide settings read by the generator. Parsing is the CLI's job.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub package: String,
    /// Value of `option go_package`.
    pub go_package: String,
    /// `optional` on nullable scalar fields.
    pub use_optional: bool,
    pub any_of_mode: AnyOfMode,
    /// Alphabetical schema and field order instead of declaration order.
    pub sort: bool,
    /// Reference named registry types instead of flattening a copy of them.
    pub named_refs: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: "api.v1".to_string(),
            go_package: "example.com/project/api/v1;v1".to_string(),
            use_optional: true,
            any_of_mode: AnyOfMode::Oneof,
            sort: true,
            named_refs: false,
        }
    }
}
