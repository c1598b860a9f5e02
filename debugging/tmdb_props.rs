//! Fetch the raw TMDB JSON behind one catalog intent and print it.
//! Usage:
//!   cargo run --bin tmdb_props -- popular [page]
//!   cargo run --bin tmdb_props -- search <query> [page]
//!   cargo run --bin tmdb_props -- detail|credits|videos <tmdb_id>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use moviedb::endpoint::Endpoint;
use moviedb::tmdb::TmdbClient;
use std::env;

fn parse_page(arg: Option<&String>) -> Result<u32> {
    match arg {
        Some(v) => v.parse().context("page must be a positive integer"),
        None => Ok(1),
    }
}

fn parse_id(arg: Option<&String>) -> Result<i64> {
    arg.ok_or_else(|| anyhow::anyhow!("missing tmdb_id"))?
        .parse()
        .context("tmdb_id must be an integer")
}

fn parse_endpoint(args: &[String]) -> Result<Endpoint> {
    let kind = args.get(1).map(|s| s.to_lowercase()).unwrap_or_default();
    let endpoint = match kind.as_str() {
        "popular" => Endpoint::Popular {
            page: parse_page(args.get(2))?,
        },
        "search" => Endpoint::Search {
            query: args
                .get(2)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("missing search query"))?,
            page: parse_page(args.get(3))?,
        },
        "detail" => Endpoint::MovieDetail {
            id: parse_id(args.get(2))?,
        },
        "credits" => Endpoint::MovieCredits {
            id: parse_id(args.get(2))?,
        },
        "videos" => Endpoint::MovieVideos {
            id: parse_id(args.get(2))?,
        },
        other => anyhow::bail!("unknown intent '{}'", other),
    };
    Ok(endpoint)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin tmdb_props -- popular [page]");
        eprintln!("       cargo run --bin tmdb_props -- search <query> [page]");
        eprintln!("       cargo run --bin tmdb_props -- detail|credits|videos <tmdb_id>");
        std::process::exit(1);
    }

    let endpoint = parse_endpoint(&args)?;
    let client = TmdbClient::from_env()?;
    eprintln!("GET {}", endpoint.path());
    let value = client.fetch_value(&endpoint).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
