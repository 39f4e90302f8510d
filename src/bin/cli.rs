//! Content CLI
//!
//! Query the content backend through the caching stores and submit
//! newsletter and inquiry forms. Results are printed as pretty JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use content_client::{
    client::{ApiClients, ContentApi, InquiryApi, NewsletterApi, ReqwestTransport, Transport},
    error::{AppError, Result},
    models::{
        BusinessInquiry, Config, ContentEntity, DonationInquiry, MediaInquiry, QueryParams,
        SubscribeRequest,
    },
    resilience::{ErrorHandler, LogTracker},
    store::{CollectionStore, FetchOptions, Stores},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Content backend client
#[derive(Parser, Debug)]
#[command(name = "content", version, about = "Content backend client")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "content.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Retry failed fetches with exponential backoff using `[retry]`
    #[arg(long)]
    retry: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Domain {
    Events,
    News,
    Services,
    Research,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum InquiryKind {
    Business,
    Media,
    Donation,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = 10)]
    page_size: u32,

    /// Only records in this category
    #[arg(long)]
    category: Option<String>,

    /// Only featured records
    #[arg(long)]
    featured: bool,

    /// Sort key passed to the backend
    #[arg(long)]
    sort_by: Option<String>,
}

impl ListArgs {
    fn params(&self) -> QueryParams {
        let params = QueryParams::page(self.page, self.page_size);
        match &self.sort_by {
            Some(key) => params.with_sort(key),
            None => params,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a page of records
    List {
        domain: Domain,
        #[command(flatten)]
        args: ListArgs,
    },

    /// Fetch one record by slug or id
    Get {
        domain: Domain,

        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        slug: Option<String>,

        #[arg(long)]
        id: Option<String>,
    },

    /// Full-text search
    Search { domain: Domain, query: String },

    /// Upcoming events (today or later)
    Upcoming {
        #[arg(long, default_value_t = 50)]
        page_size: u32,
    },

    /// Past events
    Past {
        #[arg(long, default_value_t = 50)]
        page_size: u32,
    },

    /// Subscribe to the newsletter
    Subscribe {
        email: String,
        #[arg(long)]
        name: Option<String>,
    },

    /// Unsubscribe from the newsletter
    Unsubscribe { email: String },

    /// Confirm a newsletter subscription
    Confirm { token: String },

    /// Submit an inquiry read from a JSON file
    Inquiry {
        kind: InquiryKind,
        #[arg(long)]
        file: PathBuf,
    },

    /// Validate configuration
    Validate,
}

/// Run `$body` with `$store` and `$client` bound to the domain's store and client.
macro_rules! with_domain {
    ($domain:expr, $stores:expr, $clients:expr, |$store:ident, $client:ident| $body:expr) => {
        match $domain {
            Domain::Events => {
                let ($store, $client) = (&**$stores.events, &$clients.events);
                $body
            }
            Domain::News => {
                let ($store, $client) = (&**$stores.news, &$clients.news);
                $body
            }
            Domain::Services => {
                let ($store, $client) = (&**$stores.services, &$clients.services);
                $body
            }
            Domain::Research => {
                let ($store, $client) = (&**$stores.research, &$clients.research);
                $body
            }
        }
    };
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Turn a store's `None` into the failure it recorded.
fn store_result<T: ContentEntity, R>(store: &CollectionStore<T>, value: Option<R>) -> Result<R> {
    value.ok_or_else(|| {
        store
            .last_error()
            .unwrap_or_else(|| AppError::network(format!("{} request failed", store.name())))
    })
}

async fn list<T: ContentEntity>(store: &CollectionStore<T>, args: &ListArgs) -> Result<Value> {
    let params = args.params();

    if args.featured {
        let items = store.fetch_featured(params).await;
        let items = store_result(store, items)?;
        return Ok(json!({ "items": items, "total": items.len() }));
    }

    let page = match &args.category {
        Some(category) => {
            store
                .fetch_by_category(category.clone(), params, FetchOptions::cached())
                .await
        }
        None => store.fetch(params, FetchOptions::cached()).await,
    };
    store_result(store, page)?;

    let state = store.snapshot();
    Ok(json!({
        "items": state.items,
        "total": state.total,
        "page": state.page,
        "page_size": state.page_size,
        "total_pages": state.total_pages(),
    }))
}

async fn get<T: ContentEntity, C: ContentApi<T>>(
    store: &CollectionStore<T>,
    client: &C,
    slug: Option<&str>,
    id: Option<&str>,
) -> Result<Value> {
    let item = match (slug, id) {
        (Some(slug), _) => {
            let item = store.fetch_by_slug(slug, FetchOptions::cached()).await;
            store_result(store, item)?
        }
        (None, Some(id)) => client.get_by_id(id).await?.item,
        (None, None) => return Err(AppError::validation("either --slug or --id is required")),
    };
    Ok(serde_json::to_value(item)?)
}

async fn search<T: ContentEntity>(store: &CollectionStore<T>, query: &str) -> Result<Value> {
    let page = store.search(query, QueryParams::default()).await;
    let page = store_result(store, page)?;
    Ok(json!({ "query": query.trim(), "items": page.items, "total": page.count }))
}

async fn events_window(stores: &Stores, page_size: u32, upcoming: bool) -> Result<Value> {
    let page = stores
        .events
        .fetch_events(QueryParams::page(1, page_size), FetchOptions::cached())
        .await;
    store_result(&**stores.events, page)?;

    let events = if upcoming {
        stores.events.upcoming_events()
    } else {
        stores.events.past_events()
    };
    Ok(json!({ "items": events, "total": events.len() }))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::load_or_default(&cli.config)
    };
    config.apply_env();
    log::debug!("Using API at {}", config.api.base_url);

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config.api.user_agent)?);
    let clients = ApiClients::new(&config, Arc::clone(&transport))?;
    let stores = if cli.retry {
        let handler = ErrorHandler::new().with_tracker(Arc::new(LogTracker));
        Stores::with_error_handling(&config, transport, handler)?
    } else {
        Stores::new(&config, transport)?
    };

    let output = match cli.command {
        Command::List { domain, args } => {
            with_domain!(domain, stores, clients, |store, _client| list(store, &args).await)?
        }

        Command::Get { domain, slug, id } => with_domain!(domain, stores, clients, |store, client| {
            get(store, client, slug.as_deref(), id.as_deref()).await
        })?,

        Command::Search { domain, query } => {
            with_domain!(domain, stores, clients, |store, _client| search(store, &query).await)?
        }

        Command::Upcoming { page_size } => events_window(&stores, page_size, true).await?,

        Command::Past { page_size } => events_window(&stores, page_size, false).await?,

        Command::Subscribe { email, name } => {
            let request = SubscribeRequest {
                name,
                source: Some("cli".to_string()),
                ..SubscribeRequest::new(email)
            };
            serde_json::to_value(clients.newsletter.subscribe(&request).await?)?
        }

        Command::Unsubscribe { email } => {
            serde_json::to_value(clients.newsletter.unsubscribe(&email).await?)?
        }

        Command::Confirm { token } => {
            serde_json::to_value(clients.newsletter.confirm(&token).await?)?
        }

        Command::Inquiry { kind, file } => {
            let response = match kind {
                InquiryKind::Business => {
                    let inquiry: BusinessInquiry = read_json(&file)?;
                    clients.inquiries.submit_business(&inquiry).await?
                }
                InquiryKind::Media => {
                    let inquiry: MediaInquiry = read_json(&file)?;
                    clients.inquiries.submit_media(&inquiry).await?
                }
                InquiryKind::Donation => {
                    let inquiry: DonationInquiry = read_json(&file)?;
                    clients.inquiries.submit_donation(&inquiry).await?
                }
            };
            serde_json::to_value(response)?
        }

        Command::Validate => json!({ "valid": true, "config": config }),
    };

    print_json(&output)
}
