use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use cropknn_api::RestApi;
use cropknn_core::{ClassifierConfig, KnnClassifier, Measurements, Recommendation, ReferenceDataset, DEFAULT_K};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Explainable k-nearest-neighbors crop recommendation
#[derive(Parser, Debug)]
#[command(name = "cropknn")]
#[command(about = "Recommend crops from soil and climate readings", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Classify one set of readings
    Recommend(RecommendArgs),
    /// Print the built-in reference table
    Dataset {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Default number of neighbors per query
    #[arg(short, long, default_value_t = DEFAULT_K)]
    k: usize,
}

#[derive(Args, Debug)]
struct RecommendArgs {
    /// Nitrogen index
    #[arg(long, allow_negative_numbers = true, default_value_t = Measurements::REFERENCE_QUERY.nitrogen)]
    n: f64,

    /// Phosphorus index
    #[arg(long, allow_negative_numbers = true, default_value_t = Measurements::REFERENCE_QUERY.phosphorus)]
    p: f64,

    /// Potassium index
    #[arg(long = "k-nutrient", allow_negative_numbers = true, default_value_t = Measurements::REFERENCE_QUERY.potassium)]
    potassium: f64,

    /// Temperature in degrees Celsius
    #[arg(long, allow_negative_numbers = true, default_value_t = Measurements::REFERENCE_QUERY.temperature)]
    temperature: f64,

    /// Relative humidity percentage
    #[arg(long, allow_negative_numbers = true, default_value_t = Measurements::REFERENCE_QUERY.humidity)]
    humidity: f64,

    /// Soil pH
    #[arg(long, allow_negative_numbers = true, default_value_t = Measurements::REFERENCE_QUERY.ph)]
    ph: f64,

    /// Rainfall in millimeters
    #[arg(long, allow_negative_numbers = true, default_value_t = Measurements::REFERENCE_QUERY.rainfall)]
    rainfall: f64,

    /// Number of neighbors to vote
    #[arg(long, default_value_t = DEFAULT_K)]
    neighbors: usize,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl RecommendArgs {
    fn measurements(&self) -> Measurements {
        Measurements::new(
            self.n,
            self.p,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Recommend(args) => recommend(args),
        Command::Dataset { json } => print_dataset(json),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    info!("Starting cropknn v{}", env!("CARGO_PKG_VERSION"));

    let dataset = ReferenceDataset::builtin()?;
    info!("Reference dataset loaded: {} examples, {} crops", dataset.len(), dataset.labels().len());

    let classifier = Arc::new(KnnClassifier::new(dataset, ClassifierConfig { k: args.k })?);
    info!("Default neighbors per query: {}", classifier.k());

    let host = args.host.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, http_port);
        RestApi::run_blocking(classifier, host, http_port)
    });

    info!("HTTP API: http://{}:{}/", args.host, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        joined = tokio::task::spawn_blocking(move || http_handle.join()) => {
            match joined? {
                Ok(served) => {
                    served.context("HTTP server failed")?;
                    info!("HTTP server stopped");
                }
                Err(_) => anyhow::bail!("HTTP server thread panicked"),
            }
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn recommend(args: RecommendArgs) -> anyhow::Result<()> {
    let classifier = KnnClassifier::new(
        ReferenceDataset::builtin()?,
        ClassifierConfig { k: args.neighbors },
    )?;
    let recommendation = classifier.explain(&args.measurements())?;

    if args.json {
        let stats = recommendation.stats(classifier.dataset().len());
        let payload = serde_json::json!({
            "result": recommendation.predictions,
            "neighbors": recommendation.neighbors,
            "narration": recommendation.narration(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_recommendation(&recommendation);
    }

    Ok(())
}

fn print_recommendation(recommendation: &Recommendation) {
    println!("{:<6}{:<36}{:>10}", "Rank", "Crop", "Confidence");
    for (rank, result) in recommendation.predictions.iter().enumerate() {
        println!("{:<6}{:<36}{:>9}%", rank + 1, result.crop, result.confidence);
    }

    println!();
    println!("Nearest neighbors ({}):", recommendation.k);
    for neighbor in &recommendation.neighbors {
        println!("  {:<36}{:>10.2}", neighbor.label, neighbor.distance);
    }

    if let Some(sentence) = recommendation.narration() {
        println!();
        println!("{}", sentence);
    }
}

fn print_dataset(json: bool) -> anyhow::Result<()> {
    let dataset = ReferenceDataset::builtin()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dataset)?);
        return Ok(());
    }

    println!(
        "{:>6}{:>6}{:>6}{:>8}{:>8}{:>6}{:>9}  {}",
        "N", "P", "K", "temp", "humid", "ph", "rain", "label"
    );
    for example in &dataset {
        let m = &example.measurements;
        println!(
            "{:>6}{:>6}{:>6}{:>8}{:>8}{:>6}{:>9}  {}",
            m.nitrogen, m.phosphorus, m.potassium, m.temperature, m.humidity, m.ph, m.rainfall,
            example.label
        );
    }
    println!("{} examples, {} crops", dataset.len(), dataset.labels().len());

    Ok(())
}
