use clap::Parser;
use rental_hub::{Config, FileStorage, FilterCriteria, RentalApp, Role};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_TENANT: &str = "tenant@test.com";

#[derive(Parser, Debug)]
#[command(name = "rental-hub")]
#[command(about = "Rental listings with cross-tab sync", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "rental-hub.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏠 Rental Hub");
    info!("============");

    let storage = FileStorage::open(&config.data_dir, config.poll_interval()).await?;
    let mut app = RentalApp::open(storage, config.clone()).await?;

    if app.session().is_none() {
        app.login(DEMO_TENANT, Role::Tenant).await;
    }

    let user = app.session().cloned();
    if let Some(user) = &user {
        info!("Signed in as {} ({:?})", user.name, user.role);
    }

    // Like the first listing so the picks have something to go on
    if user.as_ref().is_some_and(|u| u.role == Role::Tenant) && app.liked_ids().is_empty() {
        if let Some(first) = app.properties().first().map(|p| p.id.clone()) {
            app.toggle_like(&first).await?;
        }
    }

    let picks = app.recommend(&FilterCriteria::default());
    info!("\n✨ {} picks\n", picks.len());

    for (i, property) in picks.iter().enumerate() {
        println!("{}. {} ({} / month)", i + 1, property.title, property.rent);
        println!("   {} · {} · {}", property.city, property.property_type, property.furnished_type);
        println!("   Rating: {:.1}", property.rating);
        println!("   Owner: {}", property.owner_email);
        if let Some(video) = property.video_source() {
            println!("   Video: {:?}", video);
        }
        println!("   ID: {}", property.id);
        println!();
    }

    info!("💾 Data stored in {}", config.data_dir.display());

    Ok(())
}
