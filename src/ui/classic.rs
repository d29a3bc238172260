use anyhow::Result;
use crossterm::style::Stylize;
use reedline::{
    FileBackedHistory, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    Reedline, Signal,
};
use std::borrow::Cow;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::config::Config;
use crate::ui::list_presenter::ListPresenter;
use crate::ui::table_display::display_characters;
use crate::utils::app_paths::AppPaths;

const HISTORY_SIZE: usize = 200;

struct SearchPrompt;

impl Prompt for SearchPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("search")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "> ".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => "N> ".into(),
                reedline::PromptViMode::Insert => "I> ".into(),
            },
            PromptEditMode::Custom(str) => format!("{str}> ").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

/// Meta commands understood by the line-mode REPL
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Help,
    Clear,
    All,
    Quit,
    Search(String),
}

fn parse_line(line: &str) -> ReplCommand {
    match line.trim() {
        "\\help" | "\\h" => ReplCommand::Help,
        "\\clear" => ReplCommand::Clear,
        "\\all" => ReplCommand::All,
        "\\quit" | "\\q" => ReplCommand::Quit,
        term => ReplCommand::Search(term.to_string()),
    }
}

pub fn print_help() {
    println!("{}", "Catalog CLI - line mode".blue().bold());
    println!();
    println!("{}", "Type a character name and press Enter to search.".yellow());
    println!("An empty line lists every character.");
    println!();
    println!("{}", "Commands:".yellow());
    println!("  {}  - Reload the full listing", "\\all".green());
    println!("  {} - Clear screen", "\\clear".green());
    println!("  {}  - Show this help", "\\help".green());
    println!("  {}  - Exit (also Ctrl+D)", "\\quit".green());
    println!();
}

fn render(presenter: &ListPresenter, config: &Config) {
    let view = presenter.snapshot();
    if !view.error_message.is_empty() {
        eprintln!(
            "{}",
            format!("{} {}", config.display.icons.error, view.error_message).red()
        );
        return;
    }
    display_characters(
        &view.characters,
        view.page_info.as_ref(),
        &config.display.icons,
    );
}

fn connected_banner(config: &Config) -> String {
    format!(
        "{} Connected to catalog: {}",
        config.display.icons.info, config.api.endpoint
    )
}

/// Run the reedline REPL until the user quits
pub fn run_classic(presenter: ListPresenter, runtime: &Runtime, config: &Config) -> Result<()> {
    print_help();

    let mut line_editor = Reedline::create();
    match AppPaths::history_file().and_then(|path| {
        FileBackedHistory::with_file(HISTORY_SIZE, path).map_err(|e| anyhow::anyhow!("{e}"))
    }) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => warn!(target: "classic", "Search history disabled: {}", e),
    }

    println!("{}", connected_banner(config).cyan());

    if config.behavior.load_on_start {
        runtime.block_on(presenter.on_activate());
        render(&presenter, config);
    }

    let prompt = SearchPrompt;
    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => match parse_line(&buffer) {
                ReplCommand::Help => print_help(),
                ReplCommand::Clear => print!("{esc}[2J{esc}[1;1H", esc = 27 as char),
                ReplCommand::Quit => break,
                ReplCommand::All => {
                    runtime.block_on(presenter.load_initial());
                    render(&presenter, config);
                }
                ReplCommand::Search(term) => {
                    info!(target: "classic", "Search submitted: {:?}", term);
                    presenter.set_search_term(term);
                    runtime.block_on(presenter.submit_search());
                    render(&presenter, config);
                }
            },
            Signal::CtrlD | Signal::CtrlC => break,
        }
    }

    println!("\nGoodbye!");
    Ok(())
}
