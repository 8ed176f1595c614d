//! `safar` binary: HTTP server, Telegram bot and a search command

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use safar::catalog::{TourCatalog, TurtoparClient};
use safar::channels::{ChatwootClient, TelegramBot, TelegramLeadNotifier};
use safar::config::{load_settings, Settings};
use safar::consultant::TourConsultant;
use safar::leads::{InMemoryLeadBook, LeadSink, NotifyingLeadSink};
use safar::location::LocationCache;
use safar::logging::init_logging;
use safar::search::{SearchRequest, TourSearch};
use safar::server::{serve, AppState};
use safar::OpenAIProvider;
use std::sync::Arc;
use teloxide::Bot;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "safar", version, about = "Tour sales assistant")]
struct Cli {
    /// Settings overlay loaded from `config/{env}`
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (helpdesk webhook, API, dashboard)
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the Telegram bot
    Bot,
    /// Run one tour search and print the outcome as JSON
    Search {
        #[arg(long)]
        destination: String,
        #[arg(long)]
        origin: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        duration: Option<i64>,
        /// Departure date, DD.MM.YYYY
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "price_asc")]
        sort: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.env.as_deref()).context("failed to load settings")?;
    init_logging(&settings.logging)?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            run_server(settings).await
        }
        Command::Bot => run_bot(settings).await,
        Command::Search {
            destination,
            origin,
            budget,
            duration,
            date,
            sort,
        } => {
            let request = SearchRequest {
                origin_city: origin,
                destination: Some(destination),
                departure_date: date,
                budget_max: budget,
                duration_days: duration,
                sort_by: sort,
            };
            run_search(&settings, request).await
        }
    }
}

fn catalog(settings: &Settings) -> Arc<dyn TourCatalog> {
    Arc::new(
        TurtoparClient::new(settings.catalog.base_url.clone()).with_timeouts(
            settings.catalog.locations_timeout(),
            settings.catalog.tours_timeout(),
        ),
    )
}

fn lead_sink(settings: &Settings) -> Arc<dyn LeadSink> {
    let book: Arc<dyn LeadSink> = Arc::new(InMemoryLeadBook::new());
    match (&settings.telegram.bot_token, settings.telegram.leads_chat_id) {
        (Some(token), Some(chat_id)) => {
            info!(chat_id, "Leads will be forwarded to Telegram");
            let notifier = TelegramLeadNotifier::new(Bot::new(token.clone()), chat_id);
            Arc::new(NotifyingLeadSink::new(book, Arc::new(notifier)))
        }
        _ => book,
    }
}

async fn consultant(settings: &Settings) -> Result<Arc<TourConsultant>> {
    let api_key = settings
        .llm
        .api_key
        .clone()
        .context("llm.api_key (or OPENAI_API_KEY) is required")?;

    let mut provider = OpenAIProvider::new(api_key.clone());
    if let Some(api_base) = &settings.llm.api_base {
        provider = provider.with_api_base(api_key, api_base.clone());
    }
    let provider = provider
        .with_model(settings.llm.model.clone())
        .with_temperature(settings.llm.temperature);

    let consultant =
        TourConsultant::build(settings, Box::new(provider), catalog(settings), lead_sink(settings))
            .await?;
    Ok(Arc::new(consultant))
}

async fn run_server(settings: Settings) -> Result<()> {
    let consultant = consultant(&settings).await?;

    let token = match &settings.chatwoot.api_token {
        Some(token) => token.clone(),
        None => {
            warn!("chatwoot.api_token is not set; webhook replies will be rejected by the helpdesk");
            String::new()
        }
    };
    let helpdesk = ChatwootClient::new(
        settings.chatwoot.base_url.clone(),
        token,
        settings.chatwoot.account_id,
    );

    serve(&settings.server, AppState::new(consultant, Arc::new(helpdesk))).await?;
    Ok(())
}

async fn run_bot(settings: Settings) -> Result<()> {
    let token = settings
        .telegram
        .bot_token
        .clone()
        .context("telegram.bot_token (or TELEGRAM_BOT_TOKEN) is required")?;
    let consultant = consultant(&settings).await?;

    TelegramBot::new(Bot::new(token), consultant).run().await;
    Ok(())
}

async fn run_search(settings: &Settings, request: SearchRequest) -> Result<()> {
    let search = TourSearch::new(Arc::new(LocationCache::new(catalog(settings))));
    let outcome = search.search(&request).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
