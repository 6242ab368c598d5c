use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glgen::config::GeneratorConfig;
use glgen::process_registry;
use glgen_registry::docs::Documentation;
use glgen_registry::Registry;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glgen")]
#[command(about = "Resolution pipeline for OpenGL-family binding generation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Run the pipeline over a pre-parsed registry dump and show what the
     * resolved namespaces contain */
    Analyze {
        /* Pre-parsed registry dump (JSON) */
        #[arg(short = 'r', long = "registry", value_name = "FILE")]
        registry: PathBuf,

        /* Pre-parsed documentation dump (JSON) */
        #[arg(short = 'd', long = "docs", value_name = "FILE")]
        docs: Option<PathBuf>,

        /* List every enum group per namespace */
        #[arg(long = "print-groups")]
        print_groups: bool,

        /* List every vendor bucket per namespace */
        #[arg(long = "print-vendors")]
        print_vendors: bool,
    },

    /* Print the sorted function-pointer load table for the registry's family */
    Pointers {
        /* Pre-parsed registry dump (JSON) */
        #[arg(short = 'r', long = "registry", value_name = "FILE")]
        registry: PathBuf,
    },
}

fn load_registry(path: &PathBuf) -> anyhow::Result<Registry> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read registry dump {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse registry dump {}", path.display()))
}

fn load_docs(path: Option<&PathBuf>) -> anyhow::Result<Documentation> {
    let Some(path) = path else {
        return Ok(Documentation::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read documentation dump {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse documentation dump {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            registry,
            docs,
            print_groups,
            print_vendors,
        } => {
            let registry = load_registry(&registry)?;
            let docs = load_docs(docs.as_ref())?;
            let config = GeneratorConfig::for_file(registry.file);
            let output = process_registry(&registry, &docs, &config)?;

            for namespace in &output.namespaces {
                let function_count: usize = namespace
                    .vendors
                    .values()
                    .map(|bucket| bucket.functions.len())
                    .sum();
                let overload_count: usize = namespace
                    .vendors
                    .values()
                    .flat_map(|bucket| &bucket.functions)
                    .map(|function| function.overloads.len())
                    .sum();
                println!(
                    "{}: {} vendors, {} functions, {} overloads, {} groups",
                    namespace.api,
                    namespace.vendors.len(),
                    function_count,
                    overload_count,
                    namespace.groups.len(),
                );

                if print_vendors {
                    for (vendor, bucket) in &namespace.vendors {
                        let label = if vendor.is_empty() { "(core)" } else { vendor };
                        println!("  {label}: {} functions", bucket.functions.len());
                    }
                }

                if print_groups {
                    for group in &namespace.groups {
                        let marker = if group.is_flags { " [flags]" } else { "" };
                        println!("  {}{marker}: {} members", group.name, group.members.len());
                    }
                }
            }
        }

        Commands::Pointers { registry } => {
            let registry = load_registry(&registry)?;
            let config = GeneratorConfig::for_file(registry.file);
            let output = process_registry(&registry, &Documentation::default(), &config)?;

            for table in &output.pointers {
                println!("{:?}: {} entry points", table.file, table.functions.len());
                for function in &table.functions {
                    println!("  {}", function.entry_point);
                }
            }
        }
    }

    Ok(())
}
