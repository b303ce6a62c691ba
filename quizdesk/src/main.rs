use anyhow::{anyhow, Context, Result};
use crossterm::style::Stylize;
use quizdesk::actions::roster::{
    build_roster_table, render_students, roster_columns, ROSTER_TABLE_ID, STUDENT_ID_ATTR,
};
use quizdesk::actions::statistics::{
    build_statistics_table, parse_results, render_results, statistics_columns,
    STATISTICS_TABLE_ID,
};
use quizdesk::actions::{
    ActionDispatcher, ActionOutcome, RosterBinder, RowAction, StatisticsBinder, Student,
};
use quizdesk::api_client::{QuizProgress, QuizRequest, QuizServiceClient};
use quizdesk::config::Config;
use quizdesk::table::{NodeId, Page, SortableTableController, TableRegistration};
use quizdesk::table_display::render_table;
use quizdesk::utils::app_paths::AppPaths;
use quizdesk::utils::logging::init_tracing;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Flags that take the next argument as their value
const VALUE_FLAGS: &[&str] = &[
    "--sort",
    "--delete",
    "--reset-password",
    "--reset-result",
    "--upload",
    "--create-quiz",
    "--submit-quiz",
    "--log-target",
    "--log-level",
];

fn print_help() {
    println!("{}", "quizdesk - roster and quiz statistics tables".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  quizdesk [OPTIONS] [FILE.json]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}              - Treat FILE as quiz results", "--stats".green());
    println!(
        "  {}      - Click the header of COLUMN (repeat to toggle)",
        "--sort <COLUMN>".green()
    );
    println!("  {}         - Delete a student", "--delete <ID>".green());
    println!("  {} - Reset a student's password", "--reset-password <ID>".green());
    println!("  {}   - Let a student retake the quiz", "--reset-result <ID>".green());
    println!("  {}       - Upload a roster CSV", "--upload <FILE.csv>".green());
    println!(
        "  {}  - Create a quiz, e.g. math:5:High School,cs:3",
        "--create-quiz <SPEC>".green()
    );
    println!(
        "  {} - Submit answers (JSON array, null = unanswered)",
        "--submit-quiz <FILE>".green()
    );
    println!("  {}          - Delete the current quiz", "--delete-quiz".green());
    println!(
        "  {}    - Generate config file with defaults",
        "--generate-config".green()
    );
    println!("  {}               - Print captured logs on exit", "--logs".green());
    println!("  {}  - Only logs from TARGET", "--log-target <TARGET>".green());
    println!("  {}   - Only logs at LEVEL or above", "--log-level <LEVEL>".green());
    println!();
}

/// Values following every occurrence of `flag`
fn flag_values(args: &[String], flag: &str) -> Vec<String> {
    args.iter()
        .enumerate()
        .filter(|(_, arg)| *arg == flag)
        .filter_map(|(i, _)| args.get(i + 1).cloned())
        .collect()
}

/// Arguments that are neither flags nor a flag's value
fn positional_args(args: &[String]) -> Vec<&str> {
    let mut positional = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
        } else if !arg.starts_with('-') {
            positional.push(arg.as_str());
        }
    }
    positional
}

fn input_file(args: &[String]) -> Result<PathBuf> {
    match positional_args(args).first() {
        Some(path) => Ok(PathBuf::from(path)),
        None => AppPaths::default_roster_file(),
    }
}

fn service_client(config: &Config) -> Result<QuizServiceClient> {
    QuizServiceClient::with_timeout(&config.service.base_url, config.request_timeout())
}

fn report(outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::PasswordReset(password) => {
            println!("{}", format!("New password for the student: {}", password).green())
        }
        ActionOutcome::Uploaded {
            message,
            errors,
            added,
        } => {
            println!("{}", message.green());
            if !errors.is_empty() {
                println!("{}", "Errors:".yellow());
                for error in errors {
                    println!("  {}", format!("• {}", error).yellow());
                }
            }
            if added > 0 {
                println!("{} students now on the roster", added);
            }
        }
        ActionOutcome::QuizSubmitted { message, summary } => {
            println!("{}", message.green().bold());
            for line in summary {
                println!("  {}", line);
            }
        }
        ActionOutcome::QuizCreated(message) | ActionOutcome::QuizDeleted(message) => {
            println!("{}", message.green().bold())
        }
        ActionOutcome::Failed(message) => eprintln!("{}", message.red()),
        ActionOutcome::Cancelled => println!("{}", "Cancelled".yellow()),
        outcome => println!("{}", format!("{:?}", outcome).green()),
    }
}

fn show_progress(progress: &QuizProgress) {
    print!(
        "\r{:>3.0}% {:<40}",
        progress.display_percentage(),
        progress.display_text()
    );
    let _ = std::io::stdout().flush();
}

fn read_answers(path: &Path) -> Result<Vec<Option<String>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&contents).context("Answers must be a JSON array of strings or null")
}

/// Quiz creation, submission and deletion; none of them needs a table.
/// Returns whether any ran.
fn run_quiz_actions(args: &[String], config: &Config) -> Result<bool> {
    let create = flag_values(args, "--create-quiz");
    let submit = flag_values(args, "--submit-quiz");
    let delete = args.iter().any(|a| a == "--delete-quiz");
    if create.is_empty() && submit.is_empty() && !delete {
        return Ok(false);
    }

    let client = service_client(config)?;
    let dispatcher = ActionDispatcher::new(&client, &confirm_on_stdin);

    for spec in create {
        let request: QuizRequest = spec.parse()?;
        println!("{}", "Generating quiz from question bank...".blue());
        let outcome =
            dispatcher.create_quiz(&request, config.progress_poll_interval(), &mut show_progress);
        println!();
        report(outcome);
    }
    for path in submit {
        let answers = read_answers(Path::new(&path))?;
        report(dispatcher.submit_quiz(&answers));
    }
    if delete {
        report(dispatcher.delete_quiz());
    }
    Ok(true)
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Error creating config directory")?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .context("Error writing config file")?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

fn confirm_on_stdin(message: &str) -> bool {
    print!("{} (y/n) [n]: ", message);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}

fn find_row(page: &Page, table_id: &str, student_id: &str) -> Option<NodeId> {
    page.body(table_id)?
        .rows
        .iter()
        .find(|row| match row.attribute(STUDENT_ID_ATTR) {
            Some(id) => id == student_id,
            None => row.cell_text(0) == Some(student_id),
        })
        .map(|row| row.id())
}

fn build_page(
    file: &Path,
    stats: bool,
    config: &Config,
    controller: &mut SortableTableController,
) -> Result<(Page, &'static str)> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Could not read {}", file.display()))?;
    let mut page = Page::new();

    let (table_id, registration) = if stats {
        let results = parse_results(&contents).context("Invalid results file")?;
        let mut table = build_statistics_table();
        if let Some(body) = table.body.as_mut() {
            render_results(body, &results);
        }
        page.insert_table(table);
        let registration = TableRegistration::new(STATISTICS_TABLE_ID, statistics_columns())
            .default_sort(config.tables.default_statistics_sort.as_deref())
            .empty_state_colspan(config.tables.statistics_empty_colspan)
            .rebind_with(StatisticsBinder);
        (STATISTICS_TABLE_ID, registration)
    } else {
        let students: Vec<Student> =
            serde_json::from_str(&contents).context("Invalid roster file")?;
        let mut table = build_roster_table();
        if let Some(body) = table.body.as_mut() {
            render_students(body, &students);
        }
        page.insert_table(table);
        let registration = TableRegistration::new(ROSTER_TABLE_ID, roster_columns())
            .default_sort(config.tables.default_roster_sort.as_deref())
            .empty_state_colspan(config.tables.roster_empty_colspan)
            .rebind_with(RosterBinder);
        (ROSTER_TABLE_ID, registration)
    };

    controller.register(&mut page, registration);
    controller.rebind(&mut page, table_id);
    Ok((page, table_id))
}

fn run_remote_actions(
    args: &[String],
    page: &mut Page,
    controller: &SortableTableController,
    table_id: &str,
    config: &Config,
) -> Result<()> {
    let requested: Vec<(RowAction, String)> = [
        ("--delete", RowAction::Delete),
        ("--reset-password", RowAction::ResetPassword),
        ("--reset-result", RowAction::RetryQuiz),
    ]
    .iter()
    .flat_map(|(flag, action)| {
        flag_values(args, flag)
            .into_iter()
            .map(move |id| (*action, id))
    })
    .collect();
    let uploads = flag_values(args, "--upload");

    if requested.is_empty() && uploads.is_empty() {
        return Ok(());
    }

    let client = service_client(config)?;
    let dispatcher = ActionDispatcher::new(&client, &confirm_on_stdin);

    for csv_file in uploads {
        if table_id != ROSTER_TABLE_ID {
            eprintln!("{}", "--upload needs the roster table".yellow());
            continue;
        }
        report(dispatcher.upload_students(page, controller, Path::new(&csv_file)));
    }

    for (action, student_id) in requested {
        let row_id = find_row(page, table_id, &student_id)
            .ok_or_else(|| anyhow!("No student {} in this table", student_id))?;
        let Some(command) = page.click_control(table_id, row_id, action) else {
            eprintln!(
                "{}",
                format!("{:?} is not available in this table", action).yellow()
            );
            continue;
        };

        report(dispatcher.dispatch(page, controller, table_id, row_id, &command));
    }
    Ok(())
}

fn main() -> Result<()> {
    let event_log = init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--generate-config") {
        return generate_config();
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}", format!("Using default config: {:#}", e).yellow());
        Config::default()
    });

    let ran_quiz_actions = run_quiz_actions(&args, &config)?;
    if ran_quiz_actions && positional_args(&args).is_empty() {
        return Ok(());
    }

    let stats = args.iter().any(|a| a == "--stats");
    let file = input_file(&args)?;

    let mut controller = SortableTableController::new(config.display.indicators.clone());
    let (mut page, table_id) = build_page(&file, stats, &config, &mut controller)?;

    for column in flag_values(&args, "--sort") {
        if controller
            .click_header_by_key(&mut page, table_id, &column)
            .is_none()
        {
            eprintln!("{}", format!("'{}' is not a sortable column", column).yellow());
        }
    }

    run_remote_actions(&args, &mut page, &controller, table_id, &config)?;

    if let Some(table) = page.table(table_id) {
        println!("{}", render_table(table));
    }

    if args.iter().any(|a| a == "--logs") {
        let mut events = match flag_values(&args, "--log-target").first() {
            Some(target) => event_log.for_target(target),
            None => event_log.recent(100),
        };
        if let Some(level) = flag_values(&args, "--log-level").first() {
            let level: Level = level
                .parse()
                .map_err(|_| anyhow!("Unknown log level '{}'", level))?;
            let severe = event_log.at_least(level);
            events.retain(|e| severe.contains(e));
        }
        for event in events {
            eprintln!("{}", event.format_for_display());
        }
    }

    Ok(())
}
