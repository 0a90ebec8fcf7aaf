use anyhow::Context;
use clap::{Parser, Subcommand};
use hybridrec::{Catalog, EngineConfig, ProductId, RecommendationService, Strategy, UserId};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Hybrid product recommendations over a similarity graph
#[derive(Parser, Debug)]
#[command(name = "hybridrec")]
#[command(about = "Hybrid product recommender", long_about = None)]
struct Args {
    /// Catalog JSON to load; the bundled sample store when omitted
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    /// Engine configuration JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hybrid recommendations for a user
    Recommend {
        #[arg(short, long)]
        user: String,

        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        /// Run a single strategy instead of the hybrid
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Products similar to a product
    Similar {
        #[arg(short, long)]
        product: String,

        #[arg(long, default_value_t = 0.0)]
        min_weight: f32,

        #[arg(short, long)]
        limit: Option<usize>,

        /// Include two-hop similarity estimates
        #[arg(long)]
        transitive: bool,
    },
    /// Fewest-hops chain between two products
    Path {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(long, default_value_t = 3)]
        max_hops: usize,
    },
    /// Groups of products connected by sufficiently similar edges
    Clusters {
        #[arg(long, default_value_t = 0.5)]
        min_weight: f32,
    },
    /// Statistics for every component
    Stats,
}

/// Integer-looking ids fall back to the integer form when no string product matches
fn product_id(service: &RecommendationService, raw: &str) -> ProductId {
    let as_string = ProductId::from(raw);
    if service.has_product(&as_string) {
        return as_string;
    }
    raw.parse::<u64>().map(ProductId::from).unwrap_or(as_string)
}

fn scored(items: Vec<(ProductId, f32)>) -> serde_json::Value {
    items
        .into_iter()
        .map(|(id, score)| json!({ "id": id, "score": score }))
        .collect()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("failed to load catalog from {}", path.display()))?,
        None => Catalog::sample()?,
    };

    let service = RecommendationService::new(config)?;
    service.load_catalog(&catalog)?;
    info!("hybridrec v{} ready", env!("CARGO_PKG_VERSION"));

    let output = match args.command {
        Command::Recommend { user, count, strategy } => {
            let user = UserId::from(user);
            match strategy {
                Some(name) => {
                    let strategy: Strategy = name.parse()?;
                    json!({
                        "user": user,
                        "strategy": strategy,
                        "result": scored(service.run_strategy(strategy, &user, count)),
                    })
                }
                None => serde_json::to_value(service.explain(&user, count))?,
            }
        }
        Command::Similar {
            product,
            min_weight,
            limit,
            transitive,
        } => {
            let product = product_id(&service, &product);
            let result = if transitive {
                service.transitive_similar(&product, min_weight, limit.unwrap_or(10))
            } else {
                service.similar_products(&product, min_weight, limit)
            };
            json!({ "product": product, "result": scored(result) })
        }
        Command::Path { from, to, max_hops } => {
            let from = product_id(&service, &from);
            let to = product_id(&service, &to);
            let chain = service.shortest_chain(&from, &to, max_hops);
            json!({
                "from": from,
                "to": to,
                "hops": chain.len().saturating_sub(1),
                "chain": chain,
            })
        }
        Command::Clusters { min_weight } => {
            let clusters = service.clusters(min_weight);
            json!({ "min_weight": min_weight, "count": clusters.len(), "clusters": clusters })
        }
        Command::Stats => serde_json::to_value(service.statistics())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
