//! Minimal CLI: OpenAPI (JSON | YAML) → proto3
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::{Value, json};

use crate::config::{AnyOfMode, GeneratorConfig};
use crate::document::{self, SourceFormat};
use crate::emit::generate;
use crate::ir::{Registry, SchemaKind, SchemaNode};
use crate::lower::lower_document;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// translate OpenAPI component schemas into flat proto3 messages and enums
#[derive(Parser, Debug)]
#[command(name = "oapi2proto", version)]
pub struct CommandLineInterface {
    /// debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// translate and emit proto3 definitions
    Proto(ProtoOut),
    /// print the classified schema registry as JSON
    Inspect(InspectOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// input format; by default taken from the file extension, else JSON then YAML is tried
    #[arg(long, value_enum)]
    format: Option<SourceFormat>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct GeneratorSettings {
    /// proto package
    #[arg(long, default_value = "api.v1")]
    package: String,

    /// go_package option value
    #[arg(long, default_value = "example.com/project/api/v1;v1")]
    go_package: String,

    /// emit 'optional' for nullable scalars
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    use_optional: bool,

    /// anyOf handling
    #[arg(long, value_enum, default_value_t = AnyOfMode::Oneof)]
    anyof: AnyOfMode,

    /// sort fields & schemas alphabetically for stability
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    sort: bool,

    /// reference named schemas by name instead of flattening a copy per use
    #[arg(long, default_value_t = false)]
    named_refs: bool,
}

#[derive(clap::Parser, Debug)]
struct ProtoOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    generator: GeneratorSettings,

    /// output .proto file (stdout if omitted); single input only
    #[arg(short, long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// output directory receiving one `<input stem>.proto` per input
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct InspectOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Stdin,
    File(PathBuf),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl GeneratorSettings {
    fn to_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            package: self.package.clone(),
            go_package: self.go_package.clone(),
            use_optional: self.use_optional,
            any_of_mode: self.anyof,
            sort: self.sort,
            named_refs: self.named_refs,
        }
    }
}

impl InputSettings {
    fn sources(&self) -> anyhow::Result<Vec<Source>> {
        resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")
    }
}

impl Source {
    fn label(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }

    fn stem(&self) -> String {
        match self {
            Source::Stdin => "stdin".to_string(),
            Source::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "schema".to_string()),
        }
    }

    fn load(&self, format: Option<SourceFormat>) -> anyhow::Result<Registry> {
        let doc = match self {
            Source::Stdin => {
                let mut src = String::new();
                std::io::stdin().read_to_string(&mut src).context("failed to read stdin")?;
                document::parse_document(&src, format)?
            }
            Source::File(path) => document::read_document(path, format)?,
        };
        Ok(lower_document(doc))
    }

    fn translate(&self, format: Option<SourceFormat>, config: &GeneratorConfig) -> anyhow::Result<String> {
        let registry = self.load(format).with_context(|| format!("failed to load {}", self.label()))?;
        tracing::debug!(input = %self.label(), schemas = registry.len(), "loaded registry");
        generate(&registry, config).with_context(|| format!("failed to translate {}", self.label()))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Proto(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let sources = target.input_settings.sources()?;
                let format = target.input_settings.format;
                let config = target.generator.to_config();
                match (&target.out_dir, sources.as_slice()) {
                    (None, [single]) => {
                        let proto = single.translate(format, &config)?;
                        write_or_print(target.out.as_deref(), &proto)
                    }
                    (None, _) => bail!(
                        "{} inputs given; use --out-dir to write one .proto per input",
                        sources.len()
                    ),
                    (Some(out_dir), _) => translate_batch(&sources, format, &config, out_dir),
                }
            }
            Command::Inspect(target) => {
                let sources = target.input_settings.sources()?;
                let format = target.input_settings.format;
                let mut views = serde_json::Map::new();
                for source in &sources {
                    let registry = source
                        .load(format)
                        .with_context(|| format!("failed to load {}", source.label()))?;
                    views.insert(source.label(), registry_summary(&registry));
                }
                // a single input prints its registry directly
                let view = if views.len() == 1 {
                    views.into_iter().map(|(_, view)| view).next().unwrap_or(Value::Null)
                } else {
                    Value::Object(views)
                };
                let src = serde_json::to_string_pretty(&view)?;
                write_or_print(target.out.as_deref(), &src)
            }
        }
    }
}

/// Translate every source independently, in parallel; report all failures.
fn translate_batch(
    sources: &[Source],
    format: Option<SourceFormat>,
    config: &GeneratorConfig,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let targets = output_paths(sources, out_dir)?;
    let results: Vec<(String, anyhow::Result<PathBuf>)> = sources
        .par_iter()
        .zip(targets.par_iter())
        .map(|(source, target)| {
            let result = source
                .translate(format, config)
                .and_then(|proto| write_output(target, &proto).map(|()| target.clone()));
            (source.label(), result)
        })
        .collect();

    let mut failed = 0usize;
    for (label, result) in results {
        match result {
            Ok(path) => tracing::info!(input = %label, output = %path.display(), "generated"),
            Err(error) => {
                failed += 1;
                eprintln!("{} {label}: {error:#}", "failed:".red().bold());
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} inputs failed", sources.len());
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<Source>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<Source>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if pattern == "-" {
            out.push(Source::Stdin);
        } else if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(Source::File(entry?));
                matched_any = true;
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(Source::File(PathBuf::from(pattern)));
        }
    }

    Ok(out)
}

/// `<out_dir>/<stem>.proto` per source; two inputs sharing a stem is an error.
fn output_paths(sources: &[Source], out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = std::collections::HashMap::<String, String>::new();
    let mut paths = Vec::with_capacity(sources.len());
    for source in sources {
        let stem = source.stem();
        if let Some(previous) = seen.insert(stem.clone(), source.label()) {
            bail!("{previous} and {} would both write {stem}.proto", source.label());
        }
        paths.push(out_dir.join(format!("{stem}.proto")));
    }
    Ok(paths)
}

fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn write_or_print(out: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => write_output(path, contents),
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}

fn registry_summary(registry: &Registry) -> Value {
    let mut map = serde_json::Map::new();
    for (name, node) in registry.iter() {
        map.insert(name.to_string(), node_summary(node));
    }
    Value::Object(map)
}

fn node_summary(node: &SchemaNode) -> Value {
    let mut o = json!({ "kind": node.kind_label() });
    if node.nullable {
        o["nullable"] = Value::Bool(true);
    }
    match &node.kind {
        SchemaKind::Reference(target) => o["target"] = Value::from(target.as_str()),
        SchemaKind::Scalar(scalar) => {
            o["type"] = Value::from(format!("{:?}", scalar.kind).to_lowercase());
            if let Some(format) = &scalar.format {
                o["format"] = Value::from(format.as_str());
            }
        }
        SchemaKind::Enumeration(e) => o["values"] = json!(e.values),
        SchemaKind::Array(items) => {
            o["items"] = items.as_deref().map(node_summary).unwrap_or(Value::Null);
        }
        SchemaKind::Object(obj) => {
            let props: serde_json::Map<String, Value> = obj
                .properties
                .iter()
                .map(|(name, prop)| (name.clone(), node_summary(prop)))
                .collect();
            o["properties"] = Value::Object(props);
            if !obj.required.is_empty() {
                o["required"] = json!(obj.required);
            }
            if let Some(additional) = obj.additional.as_deref() {
                o["additionalProperties"] = node_summary(additional);
            }
            composition_summary(&mut o, &obj.composition);
        }
        SchemaKind::Composition(composition) => composition_summary(&mut o, composition),
        SchemaKind::Untyped => {}
    }
    o
}

fn composition_summary(o: &mut Value, composition: &crate::ir::Composition) {
    for (key, branches) in [
        ("allOf", &composition.all_of),
        ("oneOf", &composition.one_of),
        ("anyOf", &composition.any_of),
    ] {
        if !branches.is_empty() {
            o[key] = Value::Array(branches.iter().map(node_summary).collect());
        }
    }
}
