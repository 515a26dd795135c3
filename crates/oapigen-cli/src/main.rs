use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use oapigen_core::config::{self, CONFIG_FILE_NAME, OapigenConfig, TagAttachment};
use oapigen_core::error::ParseError;
use oapigen_core::ir::{IrModelKind, IrSpec};
use oapigen_core::parse::{self, Dialect};
use oapigen_core::transform::{self, ExtractOptions};
use oapigen_core::{CodeGenerator, GeneratedFile};
use oapigen_go::{GENERATED_HEADER, GoClientGenerator, GoConfig};

#[derive(Parser)]
#[command(
    name = "oapigen",
    about = "Generate Go HTTP clients from OpenAPI 3.x and Swagger 2.0 documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Go client package
    Generate(GenerateArgs),

    /// Load a document and report what would be generated
    Validate {
        /// Path to the API description (YAML or JSON)
        input: PathBuf,

        /// Read the document as this dialect instead of sniffing it
        #[arg(long, value_parser = parse_dialect)]
        schema: Option<Dialect>,
    },

    /// Print a summary of the extracted services and models
    Inspect {
        /// Path to the API description (YAML or JSON)
        input: PathBuf,

        /// Read the document as this dialect instead of sniffing it
        #[arg(long, value_parser = parse_dialect)]
        schema: Option<Dialect>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Write a default .oapigen.yaml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Flags of `generate`; each one overrides the config file.
#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Path to the API description (YAML or JSON)
    input: Option<PathBuf>,

    /// Read the document as this dialect instead of sniffing it
    #[arg(long, value_parser = parse_dialect)]
    schema: Option<Dialect>,

    /// Go package name [default: derived from the API title]
    #[arg(short, long)]
    package: Option<String>,

    /// Output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Delete previously generated .go files from the output directory first
    #[arg(long)]
    clean: bool,

    /// Attach tagged operations only to the service their tag names
    #[arg(long)]
    by_name_tags: bool,

    /// Do not run gofmt on the output
    #[arg(long)]
    no_gofmt: bool,
}

impl GenerateArgs {
    fn apply(self, mut cfg: OapigenConfig) -> OapigenConfig {
        if let Some(input) = self.input {
            cfg.input = input.to_string_lossy().into_owned();
        }
        if let Some(schema) = self.schema {
            cfg.dialect = Some(schema);
        }
        if let Some(package) = self.package {
            cfg.package = Some(package);
        }
        if let Some(out) = self.out {
            cfg.output = out.to_string_lossy().into_owned();
        }
        if self.clean {
            cfg.clean = true;
        }
        if self.by_name_tags {
            cfg.tags.attachment = TagAttachment::ByName;
        }
        if self.no_gofmt {
            cfg.gofmt = false;
        }
        cfg
    }
}

/// `openapi` or `swagger`, in any case.
fn parse_dialect(value: &str) -> Result<Dialect, String> {
    value.parse().map_err(|e: ParseError| e.to_string())
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),

        Commands::Validate { input, schema } => cmd_validate(input, schema),

        Commands::Inspect {
            input,
            schema,
            format,
        } => cmd_inspect(input, schema, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oapigen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OapigenConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    Ok(config::load_config(&config_path)?)
}

fn load_spec(path: &Path, dialect: Option<Dialect>, attachment: TagAttachment) -> Result<IrSpec> {
    let spec = parse::load(path, dialect)?;
    let options = ExtractOptions {
        tag_attachment: attachment,
    };
    let ir = transform::transform_with_options(&spec, &options);
    log::debug!(
        "{}: {} services, {} methods, {} models",
        path.display(),
        ir.services.len(),
        ir.method_count(),
        ir.models.len()
    );
    Ok(ir)
}

fn report_diagnostics(ir: &IrSpec) {
    for diagnostic in &ir.diagnostics {
        eprintln!("  warning: {diagnostic}");
    }
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

/// Delete `.go` files in `dir` that start with the generated-code header.
///
/// Hand-written files next to the generated ones are left alone.
fn clean_generated(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        // Not UTF-8, so not ours.
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        if content.starts_with(GENERATED_HEADER) {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            log::debug!("removed {}", path.display());
            removed += 1;
        }
    }
    Ok(removed)
}

/// Try to run gofmt on the output directory.
fn try_run_gofmt(output_dir: &Path) {
    match Command::new("gofmt")
        .args(["-w", "."])
        .current_dir(output_dir)
        .output()
    {
        Ok(result) if result.status.success() => {
            eprintln!("  formatted with gofmt");
        }
        Ok(result) => {
            eprintln!(
                "  warning: gofmt had issues (non-zero exit): {}",
                String::from_utf8_lossy(&result.stderr).trim()
            );
        }
        Err(_) => {
            eprintln!(
                "  note: gofmt not found, run `gofmt -w .` in {} to format",
                output_dir.display()
            );
        }
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let cfg = args.apply(try_load_config()?.unwrap_or_default());
    let ir = load_spec(Path::new(&cfg.input), cfg.dialect, cfg.tags.attachment)?;
    report_diagnostics(&ir);

    let go_config = GoConfig::for_spec(&ir, cfg.package.as_deref());
    let files = GoClientGenerator.generate(&ir, &go_config)?;

    let output_dir = PathBuf::from(&cfg.output);
    eprintln!(
        "Generating package {} → {}",
        go_config.package,
        output_dir.display()
    );

    if cfg.clean {
        let removed = clean_generated(&output_dir)?;
        if removed > 0 {
            eprintln!("  removed {removed} previously generated files");
        }
    }

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    write_files(&output_dir, &files)?;

    if cfg.gofmt {
        try_run_gofmt(&output_dir);
    }

    eprintln!("Generated {} files in {}", files.len(), output_dir.display());
    Ok(())
}

fn cmd_validate(input: PathBuf, schema: Option<Dialect>) -> Result<()> {
    let spec = parse::load(&input, schema)?;

    eprintln!("Valid OpenAPI {} document: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());
    eprintln!("  Schemas: {}", spec.components.schemas.len());

    let ir = transform::transform(&spec);
    eprintln!("  Services: {}", ir.services.len());
    eprintln!("  Methods: {}", ir.method_count());
    eprintln!("  Models: {}", ir.models.len());
    report_diagnostics(&ir);

    if ir.diagnostics.is_empty() {
        eprintln!("Validation successful.");
    } else {
        eprintln!(
            "Validation finished with {} warnings.",
            ir.diagnostics.len()
        );
    }
    Ok(())
}

fn cmd_inspect(input: PathBuf, schema: Option<Dialect>, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let ir = load_spec(&input, schema, cfg.tags.attachment)?;

    let summary = build_inspect_summary(&ir);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(ir: &IrSpec) -> serde_json::Value {
    let services: Vec<serde_json::Value> = ir
        .services
        .iter()
        .map(|service| {
            let methods: Vec<serde_json::Value> = service
                .methods
                .iter()
                .map(|method| {
                    serde_json::json!({
                        "name": method.name.as_str(),
                        "method": method.method.as_str(),
                        "path": method.path,
                        "parameters": method.parameters().map(|p| p.name.as_str()).collect::<Vec<_>>(),
                        "body": method.request_body.as_ref().map(|b| b.body_type.to_string()),
                        "response": method.response.as_ref().map(|t| t.to_string()),
                    })
                })
                .collect();
            serde_json::json!({
                "name": service.name.as_str(),
                "tag": service.original_name,
                "methods": methods,
            })
        })
        .collect();

    let models: Vec<serde_json::Value> = ir
        .models
        .iter()
        .map(|model| match &model.kind {
            IrModelKind::Struct(properties) => serde_json::json!({
                "name": model.name.as_str(),
                "kind": "struct",
                "fields": properties.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            }),
            IrModelKind::Alias(ty) => serde_json::json!({
                "name": model.name.as_str(),
                "kind": "alias",
                "type": ty.to_string(),
            }),
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": ir.info.title,
            "version": ir.info.version,
        },
        "servers": ir.servers.iter().map(|s| &s.url).collect::<Vec<_>>(),
        "services": services,
        "models": models,
        "diagnostics": ir.diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
