//! Browse an RDF graph as a collapsible tree with predicate columns.
//!
//! Run the binary on an N-Triples file to launch the interactive view.
//! Run with `--dump` to print the visible rows as tab-separated text.

use std::io::{self, stderr, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use rdf_tree::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    sample::SAMPLE_NTRIPLES,
    state::{ActiveView, AppState},
};
use rdf_tree::config::{self, AppConfig};
use rdf_tree::core::columns::ColumnRegistry;
use rdf_tree::core::format::CellFormat;
use rdf_tree::core::graph::{Containment, MemoryGraph};
use rdf_tree::core::ntriples;
use rdf_tree::core::projection::{RootPolicy, TreeProjection};
use rdf_tree::core::term::{vocab, Resource};
use rdf_tree::ui::{dump, layout::AppLayout, popup, theme::Theme, tree_widget::TreeWidget};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Tree-based RDF graph browser")]
struct Cli {
    /// N-Triples file to open (a small sample graph when omitted).
    file: Option<PathBuf>,

    /// Resource shown at the top of the tree (`<iri>`, `prefix:name` or `_:label`).
    #[arg(long)]
    root: Option<String>,

    /// Predicate linking a parent to its children; repeatable.
    #[arg(long = "child", default_value = "rdfs:member")]
    children: Vec<String>,

    /// Do not treat `rdf:_1`, `rdf:_2`, … as ordered children.
    #[arg(long)]
    no_containers: bool,

    /// Column to show, as `IRI` or `IRI=Label`; repeatable.
    #[arg(long = "column")]
    columns: Vec<String>,

    /// List the root's children at the top level instead of the root itself.
    #[arg(long)]
    hide_root: bool,

    /// Start with the root collapsed.
    #[arg(long)]
    collapse_root: bool,

    /// Text placed between multiple values in one cell.
    #[arg(long)]
    separator: Option<String>,

    /// Depth used by expand-all (and by `--dump`).
    #[arg(long)]
    expand_depth: Option<usize>,

    /// Print the rows as tab-separated text and exit.
    #[arg(long)]
    dump: bool,
}

// ───────────────────────────────────────── setup ─────────────

fn cell_format(cli: &Cli, config: &AppConfig) -> CellFormat {
    let mut format = CellFormat::default();
    for (prefix, namespace) in &config.prefixes {
        format.bind_prefix(prefix.as_str(), namespace.as_str());
    }
    format.separator = cli
        .separator
        .clone()
        .unwrap_or_else(|| config.separator.clone());
    format
}

/// Turn a user-typed name into a resource.
fn resolve(format: &CellFormat, name: &str) -> Resource {
    match name.trim().strip_prefix("_:") {
        Some(label) => Resource::blank(label),
        None => Resource::iri(format.expand(name)),
    }
}

/// Split `IRI=Label`; a bracketed `<iri>` may itself contain `=`.
fn parse_column_arg(arg: &str) -> (&str, Option<&str>) {
    let split_at = match arg.find('>') {
        Some(end) if arg.starts_with('<') => arg[end..].find('=').map(|i| end + i),
        _ => arg.find('='),
    };
    match split_at {
        Some(i) => (&arg[..i], Some(&arg[i + 1..])),
        None => (arg, None),
    }
}

/// Local part of a compacted name, used as a default column label.
fn default_label(format: &CellFormat, predicate: &Resource) -> String {
    let compact = format.resource(predicate);
    let local = compact
        .rsplit(|c: char| matches!(c, ':' | '/' | '#'))
        .find(|s| !s.is_empty())
        .unwrap_or(compact.as_str());
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => compact.clone(),
    }
}

fn build_columns(cli: &Cli, config: &AppConfig, format: &CellFormat) -> ColumnRegistry {
    let mut columns = ColumnRegistry::new();
    if cli.columns.is_empty() {
        columns.add_column(Resource::iri(vocab::RDFS_LABEL), "Label", true);
        columns.add_column(Resource::iri(vocab::RDF_TYPE), "Type", true);
    } else {
        for arg in &cli.columns {
            let (name, label) = parse_column_arg(arg);
            let predicate = resolve(format, name);
            let label = label
                .map(str::to_string)
                .unwrap_or_else(|| default_label(format, &predicate));
            columns.add_column(predicate, label, true);
        }
    }

    columns.set_visibility_where(false, |c| {
        c.predicate
            .as_iri()
            .is_some_and(|iri| config.hidden_columns.iter().any(|h| h == iri))
    });
    let order: Vec<Resource> = config.column_order.iter().map(Resource::iri).collect();
    columns.arrange(&order);
    columns
}

fn load_graph(cli: &Cli, format: &CellFormat) -> Result<(MemoryGraph, String)> {
    let predicates = cli.children.iter().map(|c| resolve(format, c)).collect();
    let containment = Containment::new(predicates).with_containers(!cli.no_containers);
    let mut graph = MemoryGraph::new(containment);

    let source = match &cli.file {
        Some(path) => {
            let count = ntriples::load_file(&mut graph, path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!(path = %path.display(), triples = count, "graph loaded");
            path.display().to_string()
        }
        None => {
            ntriples::load_str(&mut graph, SAMPLE_NTRIPLES).context("built-in sample is invalid")?;
            "sample graph".to_string()
        }
    };
    Ok((graph, source))
}

fn pick_root(cli: &Cli, graph: &MemoryGraph, format: &CellFormat) -> Result<Resource> {
    if let Some(name) = &cli.root {
        return Ok(resolve(format, name));
    }
    match graph.roots().into_iter().next() {
        Some(root) => Ok(root),
        None => match graph.subjects().first() {
            Some(first) => Ok(first.clone()),
            None => bail!("the graph is empty; nothing to show"),
        },
    }
}

// ───────────────────────────────────────── main ──────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only shows output when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let mut user_config = AppConfig::load();
    if let Some(depth) = cli.expand_depth {
        user_config.expand_depth = depth.max(1);
    }

    // ── build the projection ──────────────────────────────────
    let format = cell_format(&cli, &user_config);
    let (graph, source) = load_graph(&cli, &format)?;
    let root = pick_root(&cli, &graph, &format)?;
    let columns = build_columns(&cli, &user_config, &format);
    let policy = if cli.hide_root || !user_config.show_root {
        RootPolicy::Hidden
    } else {
        RootPolicy::Shown
    };

    let mut projection = TreeProjection::new(graph.into_shared(), root)
        .with_format(format)
        .with_columns(columns)
        .with_root_policy(policy)
        .with_root_expanded(!cli.collapse_root);

    // ── dump mode ─────────────────────────────────────────────
    if cli.dump {
        projection.expand_all(user_config.expand_depth);
        let stdout = io::stdout();
        let mut out = stdout.lock();
        dump::write_tsv(&projection, &mut out)?;
        out.flush()?;
        return Ok(());
    }

    let mut state = AppState::new(projection, source, user_config);
    state.config_file = Some(config::config_path());

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let mut events = spawn_event_reader(Duration::from_millis(100));

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| {
            state.terminal_area = frame.area();
            let layout = AppLayout::from_area(frame.area());

            let title = format!(
                " {} · {} ",
                state.source,
                state.projection.format().resource(state.projection.root())
            );
            let tree_block = Block::default()
                .title(title)
                .title_style(Theme::title_style())
                .borders(Borders::ALL)
                .border_style(Theme::border_style());

            let tree_widget = TreeWidget::new(&state.projection).block(tree_block);
            frame.render_stateful_widget(tree_widget, layout.tree_area, &mut state.tree_state);

            let hint = state.config.status_bar_hint();
            let status_text = match state.active_view {
                ActiveView::Tree => state.status_message.as_deref().unwrap_or(&hint),
                ActiveView::ColumnsMenu => "",
            };
            let status = Paragraph::new(status_text).style(Theme::status_bar_style());
            frame.render_widget(status, layout.status_area);

            if state.active_view == ActiveView::ColumnsMenu {
                frame.render_widget(
                    popup::ColumnsPopup {
                        columns: state.projection.columns(),
                        format: state.projection.format(),
                        selected: state.columns_selected,
                    },
                    frame.area(),
                );
            }
        })?;

        match events.recv().await {
            Some(AppEvent::Key(k)) => handler::handle_key(&mut state, k),
            Some(AppEvent::Mouse(m)) => handler::handle_mouse(&mut state, m),
            Some(AppEvent::Resize(_, _)) => {}
            None => {
                tracing::warn!("terminal event stream ended");
                break;
            }
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("rdf-tree").chain(args.iter().copied()))
    }

    #[test]
    fn column_args_split_on_first_unbracketed_equals() {
        assert_eq!(parse_column_arg("rdfs:label=Name"), ("rdfs:label", Some("Name")));
        assert_eq!(parse_column_arg("rdfs:label"), ("rdfs:label", None));
        assert_eq!(
            parse_column_arg("<http://x.org/?a=b>=Q"),
            ("<http://x.org/?a=b>", Some("Q"))
        );
    }

    #[test]
    fn default_labels_use_local_name() {
        let format = CellFormat::default();
        assert_eq!(default_label(&format, &Resource::iri(vocab::RDF_TYPE)), "Type");
        assert_eq!(
            default_label(&format, &Resource::iri("http://example.org/ns#year")),
            "Year"
        );
    }

    #[test]
    fn child_predicate_defaults_to_member() {
        let c = cli(&[]);
        assert_eq!(c.children, ["rdfs:member"]);
        let format = CellFormat::default();
        let (graph, source) = load_graph(&c, &format).unwrap();
        assert_eq!(source, "sample graph");
        // The sample has a cycle through the catalogue, so the first
        // subject is used.
        assert_eq!(
            pick_root(&c, &graph, &format).unwrap(),
            Resource::iri("http://example.org/catalogue")
        );
    }

    #[test]
    fn hidden_columns_from_config() {
        let mut config = AppConfig::default();
        config.hidden_columns.push(vocab::RDF_TYPE.to_string());
        let c = cli(&["--column", "rdf:type", "--column", "rdfs:label=Name"]);
        let columns = build_columns(&c, &config, &CellFormat::default());
        assert_eq!(columns.len(), 2);
        assert_eq!(columns.column_count(), 1);
        assert_eq!(columns.nth_column(0).unwrap().label, "Name");
    }

    #[test]
    fn saved_column_order_is_applied() {
        let mut config = AppConfig::default();
        config.column_order = vec![vocab::RDF_TYPE.to_string()];
        let columns = build_columns(&cli(&[]), &config, &CellFormat::default());
        assert_eq!(columns.nth_column(0).unwrap().label, "Type");
        assert_eq!(columns.nth_column(1).unwrap().label, "Label");
    }

    #[test]
    fn root_names_resolve() {
        let format = CellFormat::default();
        assert_eq!(resolve(&format, "_:b0"), Resource::blank("b0"));
        assert_eq!(resolve(&format, "rdf:Seq"), Resource::iri(format!("{}Seq", vocab::RDF)));
        assert_eq!(resolve(&format, "<http://x.org/a>"), Resource::iri("http://x.org/a"));
    }
}
