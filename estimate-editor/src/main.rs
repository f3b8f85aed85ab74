use dotenvy::dotenv;
use estimate_editor::commands::{parse_command, Command, HELP};
use estimate_editor::config::get_configuration;
use estimate_editor::editor::EstimateEditor;
use estimate_editor::models::CatalogScope;
use estimate_editor::observability::init_tracing;
use estimate_editor::search::SearchState;
use estimate_editor::startup::build_editor;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

enum Input {
    Line(Option<String>),
    Search(Option<CatalogScope>),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "estimate-editor",
        &configuration.logging.level,
        configuration.logging.json,
    );

    let mut editor = build_editor(&configuration).map_err(|e| {
        tracing::error!("Failed to build editor: {}", e);
        anyhow::anyhow!("Failed to build editor: {}", e)
    })?;

    info!(
        "Editing estimate {} at {}",
        configuration.document_store.estimate_id, configuration.document_store.base_url
    );
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            scope = editor.pump_search() => Input::Search(scope),
        };

        match input {
            Input::Line(None) => break,
            Input::Line(Some(line)) => match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => println!("{}", HELP),
                Ok(Command::Show) => print_estimate(&mut editor),
                Ok(Command::Html) => match editor.render_html() {
                    Ok(html) => println!("{}", html),
                    Err(e) => eprintln!("Failed to render estimate: {}", e),
                },
                Ok(Command::Event(event)) => {
                    editor.dispatch(event).await;
                    print_estimate(&mut editor);
                }
                Err(message) => println!("error: {} (try 'help')", message),
            },
            Input::Search(Some(scope)) => print_suggestions(&editor, scope),
            Input::Search(None) => {}
        }
    }

    info!("Editor closed");
    Ok(())
}

fn print_suggestions(editor: &EstimateEditor, scope: CatalogScope) {
    let search = editor.search(scope);
    match search.state() {
        SearchState::Error(message) => println!("[{}] search failed: {}", scope, message),
        _ if search.results().is_empty() => println!("[{}] no matches", scope),
        _ => {
            for (index, entry) in search.results().iter().enumerate() {
                println!(
                    "[{}] {:>3}. {}  cost {:.2}  retail {:.2}",
                    scope,
                    index + 1,
                    entry.name,
                    entry.unit_cost,
                    entry.unit_retail
                );
            }
            if search.has_more() {
                println!("[{}] more results available: more {}", scope, scope);
            }
        }
    }
}

fn print_estimate(editor: &mut EstimateEditor) {
    for row in editor.rows().iter().filter(|r| !r.hidden) {
        println!(
            "{}{} {:>6} {:<30} qty {:>8}  cost {:>9.2}  retail {:>9.2}  total {:>10}{}",
            "  ".repeat(row.depth as usize),
            row.toggle_label(),
            row.id,
            row.name,
            row.quantity,
            row.unit_cost,
            row.unit_retail,
            row.line_total_label(),
            if row.shortage { "  SHORT" } else { "" }
        );
    }

    let totals = editor.totals();
    println!(
        "cost {:.2}  retail {:.2}  profit {:.2}  markup {:.2}%  margin {:.2}%",
        totals.cost, totals.retail, totals.profit, totals.markup_pct, totals.margin_pct
    );

    for notice in editor.drain_notices() {
        println!("{:?}: {}", notice.level, notice.message);
    }
}
