//! Fetch a movie and its poster.
//!
//! ```text
//! TMDB_API_KEY=... RUST_LOG=tmdb_rest=debug cargo run --example fetch_movie -- 550
//! ```

use anyhow::{Context, Result};
use tmdb_rest::{logging, Param, TmdbApi};

fn main() -> Result<()> {
    logging::init_tracing("tmdb_rest=info")?;

    let api_key = std::env::var("TMDB_API_KEY").context("TMDB_API_KEY is not set")?;
    let movie_id = std::env::args().nth(1).unwrap_or_else(|| "550".to_string());

    let api = TmdbApi::from_env(api_key)?;

    let mut params = Param::new();
    params.insert("language".to_string(), tmdb_rest::json!("en-US"));
    let movie = api.get(&format!("movie/{movie_id}"), &params)?;

    let title = movie.get_string("title").unwrap_or_default();
    println!("{movie_id}: {title} ({} {})", movie.status_code(), movie.message());

    if let Some(poster_path) = movie.get_string("poster_path") {
        let file_name = format!("{movie_id}.jpg");
        let mut file = std::fs::File::create(&file_name)
            .with_context(|| format!("failed to create {file_name}"))?;
        let written = api.download_to(&format!("https://image.tmdb.org/t/p/w342{poster_path}"), &mut file)?;
        println!("saved poster to {file_name} ({written} bytes)");
    }

    Ok(())
}
