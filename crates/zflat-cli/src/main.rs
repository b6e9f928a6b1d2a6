//! zflat CLI - flatten scene documents onto a horizontal plane.

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use zflat_flatten::partition_selection;

mod config;
mod convert;
mod length;

#[derive(Parser)]
#[command(name = "zflat")]
#[command(about = "Flatten selected scene geometry onto one Z plane", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten the document's selection and write the result
    Flatten {
        /// Input .zflat.json document
        input: PathBuf,
        /// Output document (default: <input>.flat.json next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Target height, e.g. `0`, `12.5 mm`, `3"`, `1,5 cm`
        #[arg(long = "z", allow_hyphen_values = true)]
        z: Option<String>,
        /// Leave construction lines and points where they are
        #[arg(long)]
        no_guides: bool,
        /// Fail instead of skipping instances that cannot be made unique
        #[arg(long)]
        strict: bool,
        /// TOML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Display information about a document
    Info {
        /// Path to the .zflat.json document
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Flatten {
            input,
            output,
            z,
            no_guides,
            strict,
            config,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input));
            let options = FlattenOptions {
                z,
                no_guides,
                strict,
                config,
            };
            flatten_file(&input, &output, &options)?;
        }
        Commands::Info { file } => {
            show_info(&file)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("could not set up logging: {e}"))
}

struct FlattenOptions {
    z: Option<String>,
    no_guides: bool,
    strict: bool,
    config: Option<PathBuf>,
}

fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("scene.json");
    let stem = name
        .strip_suffix(".zflat.json")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(name);
    input.with_file_name(format!("{stem}.flat.json"))
}

fn read_document(path: &Path) -> Result<zflat_ir::Document> {
    let json =
        fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
    zflat_ir::Document::from_json(&json)
        .with_context(|| format!("invalid document {}", path.display()))
}

fn flatten_file(input: &Path, output: &Path, options: &FlattenOptions) -> Result<()> {
    let doc = read_document(input)?;
    let convert::Loaded {
        mut scene,
        selection,
    } = convert::scene_from_document(&doc)?;
    debug!(entities = selection.len(), "document loaded");

    let mut settings = config::load_settings(options.config.as_deref())?;
    if let Some(z) = &options.z {
        settings.target_z = length::parse_length(z, scene.units())
            .with_context(|| format!("invalid --z value '{z}'"))?;
    }
    if options.no_guides {
        settings.flatten_guides = false;
    }
    if options.strict {
        settings.skip_failed_instances = false;
    }

    let report = zflat_flatten::flatten(&mut scene, &selection, &settings)
        .context("flatten failed")?;

    let out = convert::document_from_scene(&scene, &selection)?;
    fs::write(output, out.to_json()?)
        .with_context(|| format!("could not write {}", output.display()))?;
    info!(output = %output.display(), "document written");

    println!("{}", report.summary());
    println!("Wrote {}", output.display());
    Ok(())
}

fn show_info(file: &Path) -> Result<()> {
    let doc = read_document(file)?;
    let loaded = convert::scene_from_document(&doc)?;
    let scene = &loaded.scene;

    let mut edges = 0;
    let mut faces = 0;
    let mut curves = 0;
    let mut guides = 0;
    for (_, def) in scene.definitions() {
        edges += def.edges.len();
        faces += def.faces.len();
        curves += def.curves.len();
        guides += def.guides.len();
    }

    println!("zflat document: {}", file.display());
    println!("  Version: {}", doc.version);
    println!("  Units: {}", scene.units().suffix());
    println!("  Definitions: {}", scene.definitions().count());
    println!("  Instances: {}", scene.instances().count());
    println!("  Edges: {edges}");
    println!("  Faces: {faces}");
    println!("  Curves: {curves}");
    println!("  Guides: {guides}");

    let partition = partition_selection(&loaded.selection);
    println!("\nSelection: {} entities", loaded.selection.len());
    println!("  Instances: {}", partition.instances.len());
    println!("  Edges: {}", partition.edges.len());
    println!("  Faces: {}", partition.faces.len());
    println!("  Guides: {}", partition.guides.len());
    if partition.ignored > 0 {
        println!("  Ignored: {}", partition.ignored);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_name() {
        assert_eq!(
            default_output(Path::new("/tmp/deck.zflat.json")),
            PathBuf::from("/tmp/deck.flat.json")
        );
        assert_eq!(
            default_output(Path::new("deck.json")),
            PathBuf::from("deck.flat.json")
        );
        assert_eq!(default_output(Path::new("deck")), PathBuf::from("deck.flat.json"));
    }

    #[test]
    fn test_cli_parses_flatten_flags() {
        let cli = Cli::try_parse_from([
            "zflat", "-vv", "flatten", "in.json", "--z", "-3 cm", "--no-guides", "-o", "out.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Flatten {
                input,
                output,
                z,
                no_guides,
                strict,
                config,
            } => {
                assert_eq!(input, PathBuf::from("in.json"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert_eq!(z.as_deref(), Some("-3 cm"));
                assert!(no_guides);
                assert!(!strict);
                assert!(config.is_none());
            }
            Commands::Info { .. } => panic!("expected flatten"),
        }
    }
}
