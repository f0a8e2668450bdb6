use std::error::Error;
use std::path::{Path, PathBuf};

use atty::Stream;
use clap::{Parser, Subcommand};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing_subscriber::EnvFilter;
use zorgkompas::{
    Category, ContentStore, NavigationState, SearchConfig, SearchEngine, SearchResults, View,
    dutch_reading_link,
};

#[derive(Parser, Debug)]
#[command(
    name = "zorgkompas",
    about = "Dutch/French guide to elder care in France",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable tables.
    #[arg(long, global = true)]
    json: bool,

    /// Dataset document to use instead of the embedded one.
    #[arg(long, global = true, env = "ZORGKOMPAS_DATA")]
    data: Option<PathBuf>,

    /// Alias table and citation pattern to use instead of the embedded ones.
    #[arg(long, global = true, env = "ZORGKOMPAS_SEARCH_CONFIG")]
    search_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the dashboard categories in display order.
    Categories,
    /// Show one category with its linked definitions and contacts.
    Category {
        /// Category id, e.g. `thuis-blijven`.
        id: String,
    },
    /// Glossary of French care terms, optionally filtered.
    Definitions { query: Option<String> },
    /// Useful phone numbers, optionally filtered.
    Contacts { query: Option<String> },
    /// Official directories (annuaires), optionally filtered.
    Directories { query: Option<String> },
    /// Search all collections at once.
    Search {
        /// Free text in Dutch or French.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show the terms a query expands to.
    Expand {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Print a link that opens a French page machine-translated into Dutch.
    TranslateLink { url: String },
    /// Run the HTTP dashboard.
    #[cfg(feature = "web")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
        /// Public base URL used for canonical links.
        #[arg(long)]
        base_url: Option<String>,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.command.default_log_level());
    let engine = load_engine(cli.data.as_deref(), cli.search_config.as_deref())?;
    match cli.command {
        Command::Categories => handle_categories(engine, cli.json),
        Command::Category { id } => handle_category(engine, &id, cli.json),
        Command::Definitions { query } => handle_list(engine, View::Glossary, query, cli.json),
        Command::Contacts { query } => handle_list(engine, View::Contacts, query, cli.json),
        Command::Directories { query } => {
            handle_list(engine, View::Directories, query, cli.json)
        }
        Command::Search { query } => handle_search(engine, &query.join(" "), cli.json),
        Command::Expand { query } => handle_expand(engine, &query.join(" "), cli.json),
        Command::TranslateLink { url } => handle_translate_link(&url, cli.json),
        #[cfg(feature = "web")]
        Command::Serve { addr, base_url } => {
            let config = zorgkompas::web::WebConfig {
                addr,
                base_url: base_url.unwrap_or_else(|| format!("http://{addr}")),
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(zorgkompas::web::serve_engine(engine, config))?;
            Ok(())
        }
    }
}

impl Command {
    fn default_log_level(&self) -> &'static str {
        match self {
            #[cfg(feature = "web")]
            Command::Serve { .. } => "info",
            _ => "warn",
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Embedded data unless overridden; custom loads live for the whole process.
fn load_engine(
    data: Option<&Path>,
    search_config: Option<&Path>,
) -> Result<&'static SearchEngine<'static>, Box<dyn Error>> {
    if data.is_none() && search_config.is_none() {
        return Ok(SearchEngine::embedded());
    }
    let store: &'static ContentStore = match data {
        Some(path) => Box::leak(Box::new(ContentStore::from_path(path)?)),
        None => ContentStore::embedded(),
    };
    let config = match search_config {
        Some(path) => SearchConfig::from_path(path)?,
        None => SearchConfig::embedded().clone(),
    };
    let engine = SearchEngine::new(store, &config)?;
    Ok(Box::leak(Box::new(engine)))
}

fn handle_categories(engine: &SearchEngine<'static>, as_json: bool) -> Result<(), Box<dyn Error>> {
    let store = engine.store();
    if as_json {
        println!("{}", serde_json::to_string_pretty(store.categories())?);
    } else {
        print_category_table(engine, store.categories());
    }
    Ok(())
}

fn handle_category(
    engine: &SearchEngine<'static>,
    id: &str,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let store = engine.store();
    let mut state = NavigationState::new();
    let _ = state.select_category(store, id);
    let Some(category) = state.selected_category(store) else {
        eprintln!("Unknown category \"{id}\"; showing the overview instead.");
        return handle_categories(engine, as_json);
    };

    let definitions: Vec<_> = store.related_definitions(category).collect();
    let contacts: Vec<_> = store.related_contacts(category).collect();
    if as_json {
        let payload = json!({
            "category": category,
            "definitions": definitions,
            "contacts": contacts,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "{} ({})",
        engine.normalize(Some(&category.label_nl)),
        engine.normalize(Some(&category.label_fr))
    );
    render_markdown_block("Omschrijving", &engine.normalize(Some(&category.description)));
    if !definitions.is_empty() {
        println!("\nBegrippen:");
        print_definitions(engine, &definitions);
    }
    if !contacts.is_empty() {
        println!("\nNuttige nummers:");
        print_contacts(engine, &contacts);
    }
    Ok(())
}

fn handle_list(
    engine: &SearchEngine<'static>,
    view: View,
    query: Option<String>,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut state = NavigationState::new();
    let _ = state.navigate_to(view, query.as_deref());
    let results = engine.results_for(&state);

    if as_json {
        let payload = match view {
            View::Glossary => json!({ "query": results.query, "terms": results.terms, "definitions": results.definitions }),
            View::Contacts => json!({ "query": results.query, "terms": results.terms, "contacts": results.contacts }),
            _ => json!({ "query": results.query, "terms": results.terms, "directories": results.directories }),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let count = match view {
        View::Glossary => results.definitions.len(),
        View::Contacts => results.contacts.len(),
        _ => results.directories.len(),
    };
    if count == 0 {
        println!("{}: nothing matched \"{}\".", view.title_nl(), results.query);
        return Ok(());
    }
    match view {
        View::Glossary => print_definitions(engine, &results.definitions),
        View::Contacts => print_contacts(engine, &results.contacts),
        _ => print_directories(engine, &results),
    }
    Ok(())
}

fn handle_search(
    engine: &SearchEngine<'static>,
    query: &str,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let results = engine.search(query);
    if as_json {
        let payload = json!({
            "best_view": results.best_view(),
            "total": results.total(),
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let Some(best) = results.best_view() else {
        println!("Nothing matched \"{}\".", results.query);
        return Ok(());
    };
    println!(
        "{} results for \"{}\" (start with {}):",
        results.total(),
        results.query,
        best.title_nl()
    );
    if !results.definitions.is_empty() {
        println!("\n{}:", View::Glossary.title_nl());
        print_definitions(engine, &results.definitions);
    }
    if !results.contacts.is_empty() {
        println!("\n{}:", View::Contacts.title_nl());
        print_contacts(engine, &results.contacts);
    }
    if !results.directories.is_empty() {
        println!("\n{}:", View::Directories.title_nl());
        print_directories(engine, &results);
    }
    Ok(())
}

fn handle_expand(
    engine: &SearchEngine<'static>,
    query: &str,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let terms = engine.expand(query);
    if as_json {
        let payload = json!({ "query": query.trim(), "terms": terms });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if terms.is_empty() {
        println!("Empty query: every record matches.");
    } else {
        for term in &terms {
            println!("{term}");
        }
    }
    Ok(())
}

fn handle_translate_link(url: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let url = url.trim();
    if url.is_empty() {
        return Err("URL cannot be empty".into());
    }
    let link = dutch_reading_link(url);
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "url": url, "link": link }))?
        );
    } else {
        println!("{link}");
    }
    Ok(())
}

fn print_category_table(engine: &SearchEngine<'static>, categories: &[Category]) {
    if categories.is_empty() {
        println!("The dataset has no categories.");
        return;
    }
    let store = engine.store();
    let rows: Vec<_> = categories
        .iter()
        .map(|category| {
            vec![
                category.id.clone(),
                engine.normalize(Some(&category.label_nl)),
                engine.normalize(Some(&category.label_fr)),
                store.related_definitions(category).count().to_string(),
                store.related_contacts(category).count().to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NEDERLANDS", "FRANÇAIS", "BEGRIPPEN", "NUMMERS"], &rows);

    let emergency: Vec<_> = store
        .emergency_contacts()
        .map(|entry| {
            format!(
                "{}: {}",
                engine.normalize(Some(&entry.record.naam)),
                engine.normalize(Some(&entry.record.nummer))
            )
        })
        .collect();
    if !emergency.is_empty() {
        println!();
        println!("Nood of spoed? {}", emergency.join(" | "));
    }
}

fn print_definitions(
    engine: &SearchEngine<'static>,
    entries: &[&zorgkompas::Entry<zorgkompas::Definition>],
) {
    for entry in entries {
        let record = &entry.record;
        println!(
            "- {} ({}) [{}]",
            engine.normalize(Some(&record.term_nl)),
            engine.normalize(Some(&record.term_fr)),
            entry.key
        );
        println!("    {}", engine.normalize(Some(&record.uitleg)));
        println!("    Bron: {}", record.url);
        println!("    Nederlands: {}", dutch_reading_link(&record.url));
    }
}

fn print_contacts(
    engine: &SearchEngine<'static>,
    entries: &[&zorgkompas::Entry<zorgkompas::Contact>],
) {
    let rows: Vec<_> = entries
        .iter()
        .map(|entry| {
            let record = &entry.record;
            vec![
                engine.normalize(Some(&record.nummer)),
                engine.normalize(Some(&record.naam)),
                engine.normalize(Some(&record.tijden)),
                engine.normalize(record.email.as_deref()),
            ]
        })
        .collect();
    print_table(&["NUMMER", "NAAM", "BEREIKBAAR", "E-MAIL"], &rows);
}

fn print_directories(engine: &SearchEngine<'static>, results: &SearchResults<'_>) {
    for entry in &results.directories {
        let record = &entry.record;
        println!("- {} [{}]", engine.normalize(Some(&record.naam)), entry.key);
        println!("    {}", engine.normalize(Some(&record.uitleg)));
        println!("    {}", record.url);
    }
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    for line in [&header_cells, &rule].into_iter().chain(rows) {
        println!("{}", format_row(line, &widths));
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let last = cells.len().saturating_sub(1);
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (cell, width))| {
            if index == last {
                cell.clone()
            } else {
                let padding = width.saturating_sub(display_width(cell));
                format!("{cell}{}", " ".repeat(padding))
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn render_markdown_block(title: &str, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    println!("\n{title}:");
    if stdout_is_tty() {
        let skin = MadSkin::default();
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}");
    }
}
