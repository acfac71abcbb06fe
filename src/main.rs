//! Entender CLI - transformer interpretability server
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `graph` - Print an attention graph scene as JSON
//! - `info`  - Show version and model info

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use entender::{
    api::{create_router, AppState},
    attention::extract_attention,
    config::Config,
    error::{EntenderError, Result},
    graph::AttentionGraph,
    layers::{Model, ModelConfig},
    layout::{spring_layout, LAYOUT_SEED},
    scene::Scene,
    tokenizer::Tokenizer,
};

/// Entender - transformer interpretability server
///
/// Chat with a hosted language model and visualize token saliency and
/// attention graphs computed against a local transformer.
#[derive(Parser)]
#[command(name = "entender")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    ///
    /// Examples:
    ///   entender serve
    ///   entender serve --port 8080 --layers 4 --heads 8
    Serve {
        /// Host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Number of transformer layers in the local model
        #[arg(long, default_value = "2")]
        layers: usize,

        /// Number of attention heads per layer
        #[arg(long, default_value = "4")]
        heads: usize,

        /// Hidden dimension of the local model (must be divisible by heads)
        #[arg(long, default_value = "32")]
        hidden_dim: usize,

        /// Seed for model weight initialization
        #[arg(long, default_value = "42")]
        seed: u64,
    },
    /// Print an attention graph scene as JSON
    ///
    /// Examples:
    ///   entender graph "The cat sat"
    ///   entender graph "sat" --context "The cat" --layer 1 --head 2
    Graph {
        /// Text to visualize
        text: String,

        /// Context prefixed to the text
        #[arg(long, default_value = "")]
        context: String,

        /// Layer selection
        #[arg(long, default_value = "0")]
        layer: usize,

        /// Head selection
        #[arg(long, default_value = "0")]
        head: usize,

        /// Edge inclusion threshold (strict)
        #[arg(long, default_value = "0.01")]
        threshold: f32,
    },
    /// Show version info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            layers,
            heads,
            hidden_dim,
            seed,
        } => {
            serve(&host, port, layers, heads, hidden_dim, seed).await?;
        }
        Commands::Graph {
            text,
            context,
            layer,
            head,
            threshold,
        } => {
            print_graph(&text, &context, layer, head, threshold)?;
        }
        Commands::Info => {
            println!("Entender v{}", entender::VERSION);
            println!("Transformer interpretability server");
            println!();
            println!("Features:");
            println!("  - Chat via hosted OpenAI-compatible API");
            println!("  - Gradient token saliency (cached)");
            println!("  - 3D attention graph scenes");
        }
    }

    Ok(())
}

fn build_model(layers: usize, heads: usize, hidden_dim: usize, seed: u64) -> Result<(Model, Tokenizer)> {
    let tokenizer = Tokenizer::demo()?;
    let config = ModelConfig {
        vocab_size: tokenizer.vocab_size(),
        hidden_dim,
        num_heads: heads,
        num_layers: layers,
        intermediate_dim: hidden_dim * 2,
        eps: 1e-5,
    };
    let model = Model::seeded(config, seed)?;
    Ok((model, tokenizer))
}

async fn serve(
    host: &str,
    port: u16,
    layers: usize,
    heads: usize,
    hidden_dim: usize,
    seed: u64,
) -> Result<()> {
    println!("Starting Entender interpretability server...");

    let config = Config::from_env();
    let (model, tokenizer) = build_model(layers, heads, hidden_dim, seed)?;
    println!(
        "Local model: {} layers, {} heads, {} parameters",
        layers,
        heads,
        model.num_parameters()
    );
    if config.chat_api_key.is_none() {
        println!("Note: {} not set, /chat will be unavailable", entender::config::CHAT_API_KEY_VAR);
    }

    let mut state = AppState::new(model, tokenizer);
    if let Some(client) = config.chat_client() {
        state = state.with_chat(client);
    }
    let app = create_router(state);

    let addr: SocketAddr =
        format!("{host}:{port}")
            .parse()
            .map_err(|e| EntenderError::InvalidArgument {
                reason: format!("Invalid address: {e}"),
            })?;

    println!("Server listening on http://{addr}");
    println!();
    println!("Endpoints:");
    println!("  GET  /health          - Health check");
    println!("  GET  /metrics         - Prometheus metrics");
    println!("  GET  /layer-head-info - Model dimensions");
    println!("  POST /chat            - Chat completion");
    println!("  POST /saliency        - Token saliency");
    println!("  POST /attention-graph - 3D attention scene");
    println!();

    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| EntenderError::InvalidArgument {
                reason: format!("Failed to bind: {e}"),
            })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| EntenderError::InvalidArgument {
            reason: format!("Server error: {e}"),
        })?;

    Ok(())
}

fn print_graph(text: &str, context: &str, layer: usize, head: usize, threshold: f32) -> Result<()> {
    let (model, tokenizer) = build_model(2, 4, 32, 42)?;
    let (stack, token_ids) = extract_attention(&model, &tokenizer, text, context)?;
    let matrix = stack.matrix(layer, head)?;
    let graph = AttentionGraph::from_matrix(matrix, threshold)?;
    let positions = spring_layout(&graph, LAYOUT_SEED);
    let labels = tokenizer.labels(&token_ids);
    let scene = Scene::build(&graph, &positions, &labels, layer, head)?;

    let json = serde_json::to_string_pretty(&scene).map_err(|e| EntenderError::InvalidArgument {
        reason: format!("Failed to serialize scene: {e}"),
    })?;
    println!("{json}");
    Ok(())
}
