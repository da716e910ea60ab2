use itertools::Itertools;
use rustybase::common::Result;
use rustybase::config::KernelConfig;
use rustybase::frontend::{CommandResult, Frontend};
use rustybase::storage::{MemoryStore, Record};
use rustybase::types::AttributeSpec;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

const PROMPT: &str = "> ";
const CONTINUATION_PROMPT: &str = ". ";

fn init_logging(level: log::LevelFilter) {
    let max_level = match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };

    // Also forwards records from the `log` macros used by the library.
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = KernelConfig::load(path.as_deref())?;
    init_logging(config.level_filter()?);

    let mut frontend = Frontend::new(MemoryStore::new(&config)?);
    let mut editor = DefaultEditor::new()?;

    loop {
        let command = match input(&mut editor) {
            Ok(command) => command,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if command.is_empty() {
            continue;
        }
        if command.eq_ignore_ascii_case("exit") {
            break;
        }
        let _ = editor.add_history_entry(command.as_str());
        match frontend.execute(&command) {
            Ok(result) => print_result(result),
            Err(err) => println!("oops, {}", err),
        }
    }
    Ok(())
}

/// Reads one command. A line ending in a backslash continues on the next line.
fn input(editor: &mut DefaultEditor) -> std::result::Result<String, ReadlineError> {
    let mut result = String::new();
    let mut prompt = PROMPT;
    loop {
        let line = editor.readline(prompt)?;
        let trimmed = line.trim();
        match trimmed.strip_suffix('\\') {
            Some(partial) => {
                result.push_str(partial);
                result.push(' ');
                prompt = CONTINUATION_PROMPT;
            }
            None => {
                result.push_str(trimmed);
                break;
            }
        }
    }
    Ok(result)
}

fn print_result(result: CommandResult) {
    match result {
        CommandResult::Created { name } => println!("[console] Created relation '{}'.", name),
        CommandResult::Dropped { name } => println!("[console] Dropped relation '{}'.", name),
        CommandResult::Opened { name, rel } => {
            println!("[console] Opened relation '{}' as {}.", name, rel)
        }
        CommandResult::Closed { name } => println!("[console] Closed relation '{}'.", name),
        CommandResult::Inserted { name, rid } => {
            println!("[console] Inserted record {} into '{}'.", rid, name)
        }
        CommandResult::Selected { target, count } => {
            println!("[console] Wrote {} records into '{}'.", count, target)
        }
        CommandResult::Printed {
            name: _,
            attributes,
            records,
        } => {
            print_attributes(&attributes);
            print_records(&records);
        }
    }
}

fn print_attributes(attributes: &[AttributeSpec]) {
    println!("  [{}]", attributes.iter().map(|a| a.to_string()).join(", "));
}

fn print_records(records: &[Record]) {
    records.iter().for_each(|record| println!("  {}", record));
}
