//! unite-scout CLI — fetch and print builds for a character.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use unite_scout::browser::chromium::ChromiumLauncher;
use unite_scout::config::Config;
use unite_scout::model::CharacterInfo;
use unite_scout::pipeline::AcquisitionPipeline;
use unite_scout::scrape::selectors;

#[derive(Parser)]
#[command(
    name = "unite-scout",
    about = "Build lookup for Pokémon UNITE characters",
    version
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch builds for a character
    Fetch {
        /// Character name, e.g. "pikachu"
        name: String,
        /// Print the raw merged record as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "unite_scout=debug"
    } else {
        "unite_scout=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Fetch { name, json } => fetch(&name, json).await,
    }
}

async fn fetch(name: &str, json: bool) -> Result<()> {
    let config = Config::from_env();
    let launcher = Arc::new(ChromiumLauncher::new(config.viewport));
    let pipeline = AcquisitionPipeline::new(config.clone(), launcher)?;

    let info = pipeline.fetch(name).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    print_character(&info, &config);
    Ok(())
}

fn print_character(info: &CharacterInfo, config: &Config) {
    println!("{} — {} ({})", info.name, info.role, info.damage_type);

    let displayable: Vec<_> = info.displayable_builds().collect();
    if displayable.is_empty() {
        println!("no builds could be loaded for this character right now; try again later");
        return;
    }

    for build in &displayable {
        println!();
        println!("# {}", build.build_name.as_deref().unwrap_or("(unnamed build)"));
        if let Some(path) = &build.path {
            println!("{path}");
        }
        println!("moves:");
        for mv in &build.moves {
            match &mv.level {
                Some(level) => println!("  {} (lv. {level})", mv.name),
                None => println!("  {}", mv.name),
            }
        }
        if !build.held_items.is_empty() {
            let items: Vec<&str> = build.held_items.iter().map(|i| i.name.as_str()).collect();
            println!("held items: {}", items.join(", "));
        }
        if let Some(item) = &build.battle_item {
            println!("battle item: {}", item.name);
        }
        if !build.emblem_loadout_url.is_empty() {
            println!("emblems: {}", build.emblem_loadout_url);
        }
    }

    if info.builds.len() > displayable.len() {
        let url = selectors::character_page_url(&config.site_base, &info.name.to_lowercase());
        println!();
        println!("other build combinations exist on the site: {url}");
    }
}
