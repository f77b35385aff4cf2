use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use content_graph_api::ContentGraphApi;
use content_graph_core::context::{parse_instant, RequestedDimensions};
use content_graph_core::resolver::{ObjectLookup, SetQuery, TaxonomyField};
use content_graph_core::{ObjectKind, RequestContext, DEFAULT_LANGUAGE, DEFAULT_SEARCH_LIMIT};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const CLI_CONTRACT_VERSION: &str = "cli.v1";

#[derive(Debug, Parser)]
#[command(name = "cg")]
#[command(about = "Content Graph CLI")]
struct Cli {
    #[arg(long, global = true, env = "CONTENT_GRAPH_SNAPSHOT", default_value = "./catalog.json")]
    snapshot: PathBuf,

    #[command(flatten)]
    request: RequestArgs,

    /// Log filter directive, e.g. `debug` or `content_graph_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct RequestArgs {
    #[arg(long, global = true, env = "CONTENT_GRAPH_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    language: String,
    /// Comma-separated customer types.
    #[arg(long, global = true, default_value = "")]
    customer_types: String,
    /// Comma-separated device types.
    #[arg(long, global = true, default_value = "")]
    device_types: String,
    /// Comma-separated regions.
    #[arg(long, global = true, default_value = "")]
    regions: String,
    /// RFC 3339 instant or `YYYY-MM-DD` date to evaluate availability at.
    #[arg(long, global = true)]
    time_travel: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Snapshot fingerprint and collection sizes.
    Info,
    Get(GetArgs),
    List(ListArgs),
    ListByGenre(TaxonomyArgs),
    ListByTag(TaxonomyArgs),
    Set(SetArgs),
    Search(SearchArgs),
    Season(LookupArgs),
    Brand(LookupArgs),
    PersonCredits(IdArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Movie,
    Episode,
    Season,
    Brand,
    LiveStream,
    Article,
    Set,
    Person,
    Genre,
    Tag,
    CallToAction,
}

impl KindArg {
    fn into_kind(self) -> ObjectKind {
        match self {
            Self::Movie => ObjectKind::Movie,
            Self::Episode => ObjectKind::Episode,
            Self::Season => ObjectKind::Season,
            Self::Brand => ObjectKind::Brand,
            Self::LiveStream => ObjectKind::LiveStream,
            Self::Article => ObjectKind::Article,
            Self::Set => ObjectKind::Set,
            Self::Person => ObjectKind::Person,
            Self::Genre => ObjectKind::Genre,
            Self::Tag => ObjectKind::Tag,
            Self::CallToAction => ObjectKind::CallToAction,
        }
    }
}

#[derive(Debug, Args)]
struct LookupArgs {
    #[arg(long, required_unless_present = "external_id")]
    uid: Option<String>,
    #[arg(long)]
    external_id: Option<String>,
}

impl LookupArgs {
    fn lookup(&self) -> ObjectLookup {
        ObjectLookup { uid: self.uid.clone(), external_id: self.external_id.clone() }
    }
}

#[derive(Debug, Args)]
struct GetArgs {
    #[arg(long)]
    kind: KindArg,
    #[command(flatten)]
    lookup: LookupArgs,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    kind: KindArg,
}

#[derive(Debug, Args)]
struct TaxonomyArgs {
    #[arg(long)]
    id: String,
    #[arg(long, default_value = "movie")]
    kind: KindArg,
}

#[derive(Debug, Args)]
struct SetArgs {
    #[arg(long)]
    id: String,
    /// Resolve set-reference objects as themselves instead of the set they point at.
    #[arg(long, default_value_t = false)]
    no_follow: bool,
    #[arg(long, default_value_t = 0)]
    depth: usize,
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[arg(long)]
    query: String,
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,
}

#[derive(Debug, Args)]
struct IdArgs {
    #[arg(long)]
    id: String,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// An unparseable `--time-travel` is ignored, like the header it mirrors.
fn request_context(args: &RequestArgs) -> RequestContext {
    let time_travel = args.time_travel.as_deref().and_then(|raw| {
        let parsed = parse_instant(raw);
        if parsed.is_none() {
            tracing::warn!(value = raw, "ignoring unparseable --time-travel value");
        }
        parsed
    });
    RequestContext::new()
        .with_language(&args.language)
        .with_dimensions(RequestedDimensions::new(
            &args.customer_types,
            &args.device_types,
            &args.regions,
        ))
        .with_time_travel(time_travel)
}

fn with_contract_version(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            let version = Value::String(CLI_CONTRACT_VERSION.to_string());
            object.insert("contract_version".to_string(), version);
            Value::Object(object)
        }
        other => serde_json::json!({
            "contract_version": CLI_CONTRACT_VERSION,
            "payload": other
        }),
    }
}

fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let value = serde_json::to_value(value).context("failed to serialize output")?;
    println!("{}", serde_json::to_string_pretty(&with_contract_version(value))?);
    Ok(())
}

fn not_found(kind: &str, key: Option<&str>) -> anyhow::Error {
    anyhow!("{kind} not found: {}", key.unwrap_or("<none>"))
}

fn run(api: &ContentGraphApi, ctx: &RequestContext, command: Command) -> Result<()> {
    match command {
        Command::Info => emit_json(&api.info()),
        Command::Get(args) => {
            let kind = args.kind.into_kind();
            let lookup = args.lookup.lookup();
            let object = api
                .get_object(ctx, kind, &lookup)?
                .ok_or_else(|| not_found(kind.as_str(), lookup.key()))?;
            emit_json(&object)
        }
        Command::List(args) => {
            let kind = args.kind.into_kind();
            match kind {
                ObjectKind::Genre => emit_json(&api.list_genres(ctx)),
                ObjectKind::Article => emit_json(&api.list_articles(ctx)),
                kind if kind.is_media() || kind == ObjectKind::Set => {
                    emit_json(&api.list_by_kind(ctx, kind))
                }
                other => Err(anyhow!("{} objects cannot be listed", other.as_str())),
            }
        }
        Command::ListByGenre(args) => {
            let listing = api
                .list_by_metadata(ctx, TaxonomyField::Genre, &args.id, args.kind.into_kind())
                .ok_or_else(|| not_found("Genre", Some(&args.id)))?;
            emit_json(&listing)
        }
        Command::ListByTag(args) => {
            let listing = api
                .list_by_metadata(ctx, TaxonomyField::Tag, &args.id, args.kind.into_kind())
                .ok_or_else(|| not_found("Tag", Some(&args.id)))?;
            emit_json(&listing)
        }
        Command::Set(args) => {
            let query = SetQuery { follow_references: !args.no_follow, depth: args.depth };
            let set =
                api.get_set(ctx, &args.id, query).ok_or_else(|| not_found("Set", Some(&args.id)))?;
            emit_json(&set)
        }
        Command::Search(args) => emit_json(&api.search(ctx, &args.query, Some(args.limit))),
        Command::Season(args) => {
            let lookup = args.lookup();
            let season = api
                .season_with_episodes(ctx, &lookup)
                .ok_or_else(|| not_found("Season", lookup.key()))?;
            emit_json(&season)
        }
        Command::Brand(args) => {
            let lookup = args.lookup();
            let brand = api
                .brand_with_seasons(ctx, &lookup)
                .ok_or_else(|| not_found("Brand", lookup.key()))?;
            emit_json(&brand)
        }
        Command::PersonCredits(args) => {
            let person = api
                .person_credits(ctx, &args.id)
                .ok_or_else(|| not_found("Person", Some(&args.id)))?;
            emit_json(&person)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());
    let ctx = request_context(&cli.request);
    let api = ContentGraphApi::open(&cli.snapshot)?;
    run(&api, &ctx, cli.command)
}
