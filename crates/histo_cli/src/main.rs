//! histocartography-rs CLI for building cell graphs and explaining graph classifiers.

mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use histo_core::ExecutionContext;
use histo_data::{GraphDataLoader, Instance, InstanceDataset};
use histo_explain::{
    ExplanationGraph, ExplanationMetadata, SingleInstanceExplainer, TrainParams,
};
use histo_graph::{GraphBuilder, KnnGraphBuilder};
use histo_models::registry::{default_registry, BoxedModel, ModelRequest, ModelType};

use crate::config::PipelineConfig;

/// Backend type for explanation.
type ExplainBackend = Autodiff<NdArray>;

#[derive(Parser)]
#[command(name = "histo")]
#[command(author, version)]
#[command(about = "Cell graph construction and GNN explanations for histopathology images")]
#[command(long_about = "histocartography-rs: build cell graphs from detected objects and explain
graph classifiers with single-instance GNN-Explainer masks.

EXAMPLES:
  # Build the graph of one instance
  histo build-graph --config config.json --instance data/img_0.json

  # Explain every instance of a directory
  histo explain --config config.json --data data/ --out explanations/ --epochs 500

  # List model variants
  histo models")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the cell graph of one instance
    BuildGraph {
        /// Pipeline configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: PathBuf,

        /// Instance file (JSON)
        #[arg(long, value_name = "FILE")]
        instance: PathBuf,

        /// Write the graph as JSON instead of printing a summary
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Explain the model's predictions on a directory of instances
    Explain {
        /// Pipeline configuration (JSON)
        #[arg(long, value_name = "FILE")]
        config: PathBuf,

        /// Directory of instance files
        #[arg(long, value_name = "DIR")]
        data: PathBuf,

        /// Output directory for explanation metadata
        #[arg(long, value_name = "DIR")]
        out: PathBuf,

        /// Number of mask optimization epochs
        #[arg(long, default_value = "500", value_name = "N")]
        epochs: usize,

        /// Learning rate for the mask optimizer
        #[arg(long, default_value = "0.01", value_name = "LR")]
        lr: f64,

        /// Model checkpoint (.mpk)
        #[arg(long, value_name = "FILE")]
        checkpoint: Option<PathBuf>,

        /// Explain at most this many instances
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// List available model variants
    Models,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::BuildGraph {
            config,
            instance,
            output,
        } => handle_build_graph(&config, &instance, output.as_deref()),
        Commands::Explain {
            config,
            data,
            out,
            epochs,
            lr,
            checkpoint,
            limit,
        } => handle_explain(&config, &data, &out, epochs, lr, checkpoint.as_deref(), limit),
        Commands::Models => handle_models(),
    }
}

fn handle_build_graph(config: &Path, instance: &Path, output: Option<&Path>) -> Result<()> {
    let config = PipelineConfig::from_file(config)?;
    let builder = KnnGraphBuilder::new(config.graph)?;

    let instance = Instance::from_file(instance)
        .with_context(|| format!("Failed to load instance {}", instance.display()))?;
    let graph = builder
        .build(&instance.objects, instance.image_size)
        .with_context(|| format!("Failed to build graph for '{}'", instance.name))?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, serde_json::to_string_pretty(&graph)?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote graph of '{}' to {}", instance.name, path.display());
        }
        None => {
            let summary = json!({
                "name": instance.name,
                "label": instance.label,
                "number_of_nodes": graph.number_of_nodes(),
                "number_of_edges": graph.number_of_edges(),
                "num_node_features": graph.num_node_features(),
                "builder": builder.name(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_explain(
    config: &Path,
    data: &Path,
    out: &Path,
    epochs: usize,
    lr: f64,
    checkpoint: Option<&Path>,
    limit: Option<usize>,
) -> Result<()> {
    let config = PipelineConfig::from_file(config)?;
    let builder = KnnGraphBuilder::new(config.graph.clone())?;

    let mut dataset = InstanceDataset::from_dir(data)?;
    if let Some(limit) = limit {
        dataset = dataset.take(limit);
    }
    if dataset.is_empty() {
        bail!("No instance files found in {}", data.display());
    }
    let loader = GraphDataLoader::new(dataset, builder);

    let context = ExecutionContext::<ExplainBackend>::default();
    let train_params = TrainParams::new(epochs, lr);
    let explainer =
        SingleInstanceExplainer::new(train_params.clone(), config.explainer.clone(), context.clone())?;
    let registry = default_registry::<ExplainBackend>();

    println!(
        "Explaining {} instances with {} ({} epochs, lr {})",
        loader.len(),
        config.model_type,
        epochs,
        lr
    );

    let mut model: Option<BoxedModel<ExplainBackend>> = None;
    for (index, item) in loader.iter().enumerate() {
        let (sample, label) = item.with_context(|| format!("Failed to load instance #{index}"))?;

        if model.is_none() {
            let mut request = ModelRequest::new(&config.model_params, sample.graph.num_node_features());
            if let Some(path) = checkpoint {
                request = request.with_checkpoint(path);
            }
            let created = registry
                .create(config.model_type.as_str(), &request, context.device())
                .context("Failed to create model")?;
            model = Some(created);
        }
        let Some(model) = model.as_deref() else {
            bail!("model was not created");
        };

        let output = explainer
            .explain(model, &sample.graph, label)
            .with_context(|| format!("Failed to explain '{}'", sample.name))?;
        let explanation =
            ExplanationGraph::from_output(&output, &sample.graph, config.explainer.adj_thresh)?;
        let metadata = ExplanationMetadata::new(
            &config.explainer_section,
            &train_params,
            &sample.graph,
            &output,
            &explanation,
        )?;

        let path = out.join(format!("{}.json", sample.name));
        metadata
            .write_json(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        println!(
            "  {:<24} label {}  nodes {:>5} -> {:<5} edges {:>6} -> {:<6} final loss {:.4}",
            sample.name,
            label,
            sample.graph.number_of_nodes(),
            explanation.number_of_nodes(),
            sample.graph.number_of_edges(),
            explanation.number_of_edges(),
            output.loss_history.last().copied().unwrap_or(f32::NAN),
        );
    }

    println!("Wrote explanations to {}", out.display());
    Ok(())
}

fn handle_models() -> Result<()> {
    let registry = default_registry::<ExplainBackend>();
    println!("Available models:\n");
    for name in registry.list() {
        let description = match name.parse::<ModelType>() {
            Ok(ModelType::CellGraphModel) => "GIN-style message passing with sum readout",
            Ok(ModelType::GcnGraphModel) => "Normalized graph convolution with mean readout",
            Err(_) => "",
        };
        println!("  {:<20} {}", name, description);
    }
    Ok(())
}
