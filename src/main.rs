// ABOUTME: Entry point for the vdbexport binary.
// ABOUTME: Parses CLI arguments, initializes tracing, loads a tree fixture, and exports or lists VDBs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use vdbexport_core::lexicon::tree::VIRTUAL_DATABASE;
use vdbexport_core::{ExportOptions, NodeRef, VdbExporter};
use vdbexport_store::{MemoryTree, load_fixture};

#[derive(Parser)]
#[command(name = "vdbexport")]
#[command(about = "Export virtual database definitions as vdb.xml manifests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one VDB from a tree fixture
    Export {
        /// YAML or JSON tree fixture
        fixture: PathBuf,

        /// Path of the VDB node (required when the fixture holds several)
        #[arg(long)]
        vdb: Option<String>,

        /// Indent the output
        #[arg(long)]
        pretty: bool,

        /// Spaces per nesting level when pretty printing
        #[arg(long)]
        indent: Option<usize>,

        /// Sort data roles by name
        #[arg(long)]
        sort_data_roles: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the manifest model as JSON instead of XML
        #[arg(long)]
        model_json: bool,
    },

    /// List the VDB nodes in a tree fixture
    List {
        /// YAML or JSON tree fixture
        fixture: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vdbexport=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            fixture,
            vdb,
            pretty,
            indent,
            sort_data_roles,
            output,
            model_json,
        } => {
            let mut options =
                ExportOptions::from_env().context("failed to read export options")?;
            if pretty {
                options.pretty_print = true;
            }
            if let Some(indent) = indent {
                options.indent = indent;
            }
            if indent.is_some() && !options.pretty_print {
                tracing::warn!("--indent has no effect without pretty printing");
            }
            if sort_data_roles {
                options.sort_data_roles = true;
            }

            let tree = load_tree(&fixture)?;
            let node = select_vdb(&tree, vdb.as_deref())?;
            let exporter = VdbExporter::new(options);

            let text = if model_json {
                let manifest = exporter.build_manifest(&tree, &node)?;
                serde_json::to_string_pretty(&manifest)?
            } else {
                exporter.export(&tree, &node)?
            };

            match output {
                Some(path) => {
                    fs::write(&path, format!("{}\n", text))
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!("wrote {}", path.display());
                }
                None => println!("{}", text),
            }
        }
        Commands::List { fixture } => {
            let tree = load_tree(&fixture)?;
            for node in tree.nodes_of_type(VIRTUAL_DATABASE) {
                println!("{}", node.path);
            }
        }
    }

    Ok(())
}

fn load_tree(fixture: &Path) -> anyhow::Result<MemoryTree> {
    load_fixture(fixture).with_context(|| format!("failed to load fixture {}", fixture.display()))
}

/// The VDB to export: the requested path, or the only VDB in the tree.
fn select_vdb(tree: &MemoryTree, requested: Option<&str>) -> anyhow::Result<NodeRef> {
    if let Some(path) = requested {
        return match tree.node(path) {
            Some(node) if tree.node_type(path) == Some(VIRTUAL_DATABASE) => Ok(node),
            Some(_) => bail!("{} is not a virtual database node", path),
            None => bail!("no node at {}", path),
        };
    }

    let mut candidates = tree.nodes_of_type(VIRTUAL_DATABASE);
    match candidates.len() {
        0 => bail!("fixture contains no virtual database nodes"),
        1 => Ok(candidates.remove(0)),
        _ => {
            let paths: Vec<&str> = candidates.iter().map(|c| c.path.as_str()).collect();
            bail!(
                "fixture contains several virtual databases, pick one with --vdb: {}",
                paths.join(", ")
            )
        }
    }
}
