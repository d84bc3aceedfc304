use anyhow::{Context, Result, anyhow};
use catalog::CatalogIndex;
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::{RecommendationEngine, RecommendationRequest, RecommendationResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// CineBlend - Hybrid Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "cine-recs")]
#[command(about = "Hybrid movie recommendation engine blending semantic and memory signals", long_about = None)]
struct Cli {
    /// Path to the JSON catalog file
    #[arg(short, long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations for a user
    Recommend {
        /// User ID to recommend for
        #[arg(long)]
        user_id: String,

        /// Strategy: smart, behavioral, hyper-personalized, or hybrid
        #[arg(long, default_value = "smart")]
        strategy: String,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Free-text query to match against
        #[arg(long)]
        query: Option<String>,

        /// Mood label folded into the query embedding
        #[arg(long)]
        mood: Option<String>,

        /// Restrict candidates to these genre ids
        #[arg(long, value_delimiter = ',')]
        genres: Vec<u16>,

        /// Diversity factor in [0,1]; higher spreads genres more
        #[arg(long)]
        diversity: Option<f32>,

        /// Show the scoring breakdown for each recommendation
        #[arg(long)]
        explain: bool,

        /// Emit the raw result as JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },

    /// Show a movie from the catalog
    Movie {
        /// Movie ID to display
        #[arg(long)]
        id: u32,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// User ID to recommend for
        #[arg(long, default_value = "bench-user")]
        user_id: String,

        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading catalog from {}...", cli.catalog.display());
    let start = Instant::now();
    let index = Arc::new(
        CatalogIndex::load_from_json(&cli.catalog).context("Failed to load catalog file")?,
    );
    let (movies, users) = index.counts();
    println!(
        "{} Loaded {} movies, {} users with taste data in {:?}",
        "✓".green(),
        movies,
        users,
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend {
            user_id,
            strategy,
            limit,
            query,
            mood,
            genres,
            diversity,
            explain,
            json,
        } => {
            let mut request = RecommendationRequest::new(user_id)
                .with_strategy(strategy)
                .with_limit(limit)
                .with_genres(genres);
            if let Some(query) = query {
                request = request.with_query(query);
            }
            if let Some(mood) = mood {
                request = request.with_mood(mood);
            }
            if let Some(diversity) = diversity {
                request = request.with_diversity_factor(diversity);
            }
            handle_recommend(index, request, explain, json).await?
        }
        Commands::Movie { id } => handle_movie(index, id)?,
        Commands::Benchmark { user_id, requests } => {
            handle_benchmark(index, user_id, requests).await?
        }
    }

    Ok(())
}

fn build_engine(index: Arc<CatalogIndex>) -> RecommendationEngine {
    // The catalog index backs all four collaborator seams
    RecommendationEngine::new(index.clone(), index.clone(), index.clone(), index)
}

/// Handle the 'recommend' command
async fn handle_recommend(
    index: Arc<CatalogIndex>,
    request: RecommendationRequest,
    explain: bool,
    json: bool,
) -> Result<()> {
    let engine = build_engine(index);

    let start = Instant::now();
    let result = engine.generate_recommendations(&request).await?;
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_recommendations(&result, explain);
    println!(
        "\nStrategy: {} | confidence {:.2} | diversity {:.2} | {:?}",
        result.metadata.source.cyan(),
        result.metadata.confidence,
        result.metadata.diversity_score,
        elapsed
    );
    if !result.metadata.errors.is_empty() {
        println!("{}", "Degraded collaborators:".yellow());
        for (component, detail) in &result.metadata.errors {
            println!("  - {}: {}", component.yellow(), detail);
        }
    }
    Ok(())
}

/// Handle the 'movie' command
fn handle_movie(index: Arc<CatalogIndex>, id: u32) -> Result<()> {
    let movie = index
        .get_movie(id)
        .ok_or_else(|| anyhow!("Movie {} not found in catalog", id))?;

    print!("{}", format!("{} (id {})\n", movie.title, movie.id).bold().blue());
    if let Some(year) = movie.year {
        println!("{}Year: {}", "• ".green(), year);
    }
    let genres = movie
        .genres
        .iter()
        .map(|g| format!("#{}", g))
        .collect::<Vec<_>>()
        .join(", ");
    println!("{}Genres: {}", "• ".green(), genres);
    println!("{}Rating: {:.1}/10", "• ".green(), movie.rating);
    if let Some(popularity) = movie.popularity {
        println!("{}Popularity: {} interactions", "• ".cyan(), popularity);
    }
    if !movie.overview.is_empty() {
        println!("{}{}", "• ".cyan(), movie.overview);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(index: Arc<CatalogIndex>, user_id: String, requests: usize) -> Result<()> {
    let engine = Arc::new(build_engine(index));
    let strategies = ["smart", "behavioral", "hyper-personalized", "hybrid"];

    let mut handles = vec![];
    for _ in 0..requests {
        let engine = engine.clone();
        let strategy = strategies[rand::random::<u32>() as usize % strategies.len()];
        let request = RecommendationRequest::new(user_id.clone()).with_strategy(strategy);
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            engine.generate_recommendations(&request).await?;
            Ok::<_, engine::RecommendError>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }

    let total_time: std::time::Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(result: &RecommendationResult, explain: bool) {
    print!("{}", "Movie Recommendations:\n".bold().blue());
    for (rank, scored) in result.movies.iter().enumerate() {
        let movie = &scored.movie;
        let genres = movie
            .genres
            .iter()
            .map(|g| format!("#{}", g))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}. {} ({}) [{}] - Confidence: {:.2} ({:?})",
            (rank + 1).to_string().green(),
            movie.title,
            movie.year.unwrap_or(0),
            genres,
            scored.confidence,
            scored.discovery
        );
        println!("   {}", scored.reason);
        if explain {
            println!(
                "   semantic {:.3} | boost {:.3} | categories {:?}",
                scored.semantic_score, scored.affinity_boost, scored.categories
            );
        }
    }
}
