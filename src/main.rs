use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rusqlite::types::Value;
use std::path::PathBuf;

use annograph::catalog::{Catalog, FilterState, Namespace};
use annograph::config::{self, AmbiguityReduction, QueryConfig};
use annograph::query_planner::{CompileRequest, Mode, QueryCompiler, QueryParameters};
use annograph::sql_generator::{generate_sql, RenderOptions};
use annograph::store::{KnowledgeStore, ResultExecutor};
use annograph::zone_index::ZoneIndexer;

/// Annograph - join-graph query compiler for a genomic knowledge database
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Knowledge database file, attached as `db`
    #[arg(long)]
    knowledge: PathBuf,

    /// Query configuration YAML; `ANNOGRAPH_*` variables are used otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog YAML replacing the built-in knowledge base catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// SQL scripts run after the input schema is created, e.g. to load `main`
    #[arg(long = "load")]
    scripts: Vec<PathBuf>,

    /// LD profile selecting gene region boundaries
    #[arg(long)]
    ld_profile: Option<String>,

    /// Coordinate base of reported positions (0 or 1)
    #[arg(long)]
    coordinate_base: Option<u8>,

    /// How to narrow ambiguous group membership
    #[arg(long)]
    reduce_ambiguous_knowledge: Option<AmbiguityReduction>,

    #[arg(long)]
    allow_ambiguous_knowledge: bool,

    #[arg(long)]
    alternate_model_filtering: bool,

    /// Log query plans instead of running queries
    #[arg(long)]
    debug_query: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the knowledge database tables
    Init,
    /// Rebuild zone tables from their intervals
    Zones {
        /// Also rebuild `db.biopolymer_zone`
        #[arg(long)]
        biopolymers: bool,
    },
    /// Print the compiled SQL
    Sql(QueryArgs),
    /// Print the store's query plan for the compiled SQL
    Explain(QueryArgs),
    /// Run the query and print tab-separated rows
    Run(QueryArgs),
    /// Print the compiled plan as JSON
    Plan(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long, default_value = "filter")]
    mode: Mode,

    #[arg(long, default_value = "main")]
    focus: Namespace,

    /// Output column, repeatable
    #[arg(long = "column", short = 'c')]
    columns: Vec<String>,

    /// `COLUMN SUFFIX`, e.g. `gene_label IS NOT NULL`
    #[arg(long, value_parser = parse_having)]
    having: Vec<(String, String)>,

    /// `ALIAS.COLUMN SUFFIX`, e.g. `m_l.pos >= ?1`
    #[arg(long = "where", value_parser = parse_where)]
    conditions: Vec<(String, String, String)>,

    /// Positional parameter value, repeatable
    #[arg(long = "bind")]
    bindings: Vec<String>,

    /// Report positions in the configured coordinate base
    #[arg(long)]
    apply_offset: bool,

    #[arg(long)]
    user_knowledge: bool,

    /// Only drop repeated rows that are adjacent
    #[arg(long)]
    allow_duplicates: bool,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            ld_profile: cli.ld_profile.clone(),
            coordinate_base: cli.coordinate_base,
            reduce_ambiguous_knowledge: cli.reduce_ambiguous_knowledge,
            allow_ambiguous_knowledge: cli.allow_ambiguous_knowledge,
            alternate_model_filtering: cli.alternate_model_filtering,
            debug_query: cli.debug_query,
        }
    }
}

impl QueryArgs {
    fn request(&self) -> CompileRequest {
        let mut request = CompileRequest::new(self.mode, self.focus)
            .select(self.columns.iter().cloned())
            .apply_offset(self.apply_offset)
            .user_knowledge(self.user_knowledge);
        for (column, suffix) in &self.having {
            request = request.having(column, suffix);
        }
        for (alias, column, suffix) in &self.conditions {
            request = request.where_column(alias, column, suffix);
        }
        request
    }

    fn bindings(&self) -> Vec<Value> {
        self.bindings.iter().map(|value| parse_binding(value)).collect()
    }
}

fn parse_having(arg: &str) -> Result<(String, String), String> {
    let (column, suffix) = arg
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("expected 'COLUMN SUFFIX', got '{}'", arg))?;
    Ok((column.to_string(), suffix.trim().to_string()))
}

fn parse_where(arg: &str) -> Result<(String, String, String), String> {
    let (target, suffix) = parse_having(arg)?;
    let (alias, column) = target
        .split_once('.')
        .ok_or_else(|| format!("expected 'ALIAS.COLUMN SUFFIX', got '{}'", arg))?;
    Ok((alias.to_string(), column.to_string(), suffix))
}

fn parse_binding(value: &str) -> Value {
    if let Ok(i) = value.parse::<i64>() {
        Value::Integer(i)
    } else if let Ok(r) = value.parse::<f64>() {
        Value::Real(r)
    } else {
        Value::Text(value.to_string())
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(t) => t.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<QueryConfig> {
    let mut config = match &cli.config {
        Some(path) => QueryConfig::from_yaml_file(path)?,
        None => QueryConfig::from_env()?,
    };
    config.merge(cli.into())?;
    Ok(config)
}

fn open_store(cli: &Cli) -> anyhow::Result<KnowledgeStore> {
    let store = KnowledgeStore::open(&cli.knowledge)?;
    store.create_input_schema()?;
    for script in &cli.scripts {
        let sql = std::fs::read_to_string(script)
            .with_context(|| format!("reading {}", script.display()))?;
        store
            .connection()
            .execute_batch(&sql)
            .with_context(|| format!("running {}", script.display()))?;
        log::info!("loaded {}", script.display());
    }
    Ok(store)
}

#[derive(Clone, Copy)]
enum Output {
    Sql,
    Explain,
    Rows,
    Plan,
}

fn query(
    cli: &Cli,
    store: &KnowledgeStore,
    config: QueryConfig,
    args: &QueryArgs,
    output: Output,
) -> anyhow::Result<()> {
    let owned;
    let catalog: &Catalog = match &cli.catalog {
        Some(path) => {
            owned = Catalog::from_yaml_file(path)?;
            &owned
        }
        None => Catalog::knowledge_base()?,
    };
    let filter_state = FilterState::from_store(store)?;
    let parameters = QueryParameters::resolve(config, store)?;
    let (plan, user_plan) = QueryCompiler::new(catalog, &filter_state, &parameters)
        .compile_with_user_knowledge(&args.request())?;
    let executor = ResultExecutor::new(store).with_debug_query(parameters.config.debug_query);
    let bindings = args.bindings();

    match output {
        Output::Sql => {
            for plan in std::iter::once(&plan).chain(&user_plan) {
                println!("{}", generate_sql(plan, &RenderOptions::default()));
            }
        }
        Output::Plan => {
            for plan in std::iter::once(&plan).chain(&user_plan) {
                println!("{}", serde_json::to_string_pretty(plan)?);
            }
        }
        Output::Explain => {
            for step in executor.explain(&plan, user_plan.as_ref(), &bindings)? {
                println!("{}", step);
            }
        }
        Output::Rows => {
            let header: Vec<&str> = plan.columns().collect();
            println!("{}", header.join("\t"));
            let mut result =
                executor.prepare(&plan, user_plan.as_ref(), args.allow_duplicates, &bindings)?;
            for row in result.rows() {
                let fields: Vec<String> = row?.iter().map(format_value).collect();
                println!("{}", fields.join("\t"));
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli).context("Configuration error")?;
    let mut store = open_store(&cli)?;

    match &cli.command {
        Command::Init => {
            store.create_knowledge_schema()?;
            log::info!("knowledge schema ready in {}", cli.knowledge.display());
        }
        Command::Zones { biopolymers } => {
            let indexer = ZoneIndexer::new();
            for namespace in [Namespace::Main, Namespace::Alt] {
                indexer.refresh_region_zones(&mut store, namespace)?;
            }
            if *biopolymers {
                indexer.refresh_biopolymer_zones(&mut store)?;
            }
        }
        Command::Sql(args) => query(&cli, &store, config, args, Output::Sql)?,
        Command::Explain(args) => query(&cli, &store, config, args, Output::Explain)?,
        Command::Run(args) => query(&cli, &store, config, args, Output::Rows)?,
        Command::Plan(args) => query(&cli, &store, config, args, Output::Plan)?,
    }
    Ok(())
}
