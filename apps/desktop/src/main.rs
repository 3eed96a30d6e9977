use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, FormPhase, FormState, Services, Settings};
use shared::domain::{Coordinates, FormField, ItemId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Query the collect point services and register a point")]
struct Args {
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    geo_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the recyclable item catalog.
    Items,
    /// List federative units, ordered by name.
    States,
    /// List the cities of one state.
    Cities {
        #[arg(long)]
        state: String,
    },
    /// Fill the form and create a collect point.
    Submit(SubmitArgs),
}

#[derive(clap::Args, Debug)]
struct SubmitArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    whatsapp: String,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,
    /// Item id to collect; repeat for several.
    #[arg(long = "item")]
    items: Vec<i64>,
    /// Print the payload without sending it.
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn settings(&self) -> Settings {
        let mut settings = load_settings();
        if let Some(v) = &self.api_url {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = &self.geo_url {
            settings.geo_base_url = v.clone();
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let settings = args.settings();
    let services = Services::from_settings(&settings)?;

    match args.command {
        Command::Items => {
            for item in services.catalog.list_items().await? {
                println!("{:>4}  {}  ({})", item.id.0, item.title, item.image_url);
            }
        }
        Command::States => {
            for state in services.geo.list_states().await? {
                println!("{}", state.label());
            }
        }
        Command::Cities { state } => {
            for city in services.geo.list_cities(&state).await? {
                println!("{city}");
            }
        }
        Command::Submit(submit) => run_submit(&services, &settings, submit).await?,
    }

    Ok(())
}

async fn run_submit(services: &Services, settings: &Settings, args: SubmitArgs) -> Result<()> {
    let mut form = FormState::new(settings.fallback_center());
    form.set_field(FormField::Name, args.name);
    form.set_field(FormField::Email, args.email);
    form.set_field(FormField::Whatsapp, args.whatsapp);

    if let Some(request) = form.select_state(args.state) {
        let outcome = services.fetch(request).await;
        form.apply(outcome);
        if let Some(err) = form.cities().error() {
            tracing::warn!(error = %err, "city list unavailable; sending the city as given");
        }
    }
    form.select_city(args.city);
    for id in args.items {
        form.toggle_item(ItemId(id));
    }
    form.set_map_position(Coordinates::new(args.latitude, args.longitude));

    let payload = form.begin_submit().context("submission rejected")?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    if args.dry_run {
        return Ok(());
    }

    let result = services.submit(&payload).await;
    form.finish_submit(result);
    match form.phase() {
        FormPhase::Submitted => {
            println!("Collect point created!");
            Ok(())
        }
        FormPhase::Failed(err) => Err(err.clone()).context("collect point was not created"),
        other => bail!("unexpected form phase after submit: {other:?}"),
    }
}
