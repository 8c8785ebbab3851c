//! Interactive counting loop. A USB scanner types the code followed by
//! ENTER, so every plain line is a scan; lines starting with `:` are
//! commands.

use crate::utils::prompt_confirm;
use anyhow::Result;
use colored::*;
use inventory_scan::export::write_session_exports;
use inventory_scan::{scanned_inventory, Rejection, ScanAction, ScanResult, Workspace};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, error};

const HELP: &str = "\
  <code>            add the scanned code (EAN 1 or EAN 2)
  :qty N            set the quantity added per scan
  :remove CODE [N]  take N (default 1) off a counted product
  :undo             revert the last scan if it was an addition
  :new NAME         create a session and switch to it
  :switch NAME      switch to another session
  :reset [NAME]     clear a session (default: current)
  :delete NAME      delete a session
  :sessions         list sessions
  :list             counted products
  :unknown          unknown codes
  :log [N]          last N events (default 10)
  :summary          totals for the current session
  :import PATH      load a new catalog
  :export           write the CSV exports of the current session
  :quit             leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Empty,
    Scan(String),
    Quantity(i64),
    Remove { code: String, quantity: i64 },
    Undo,
    New(String),
    Switch(String),
    Reset(Option<String>),
    Delete(String),
    Sessions,
    List,
    Unknown,
    Log(usize),
    Summary,
    Import(PathBuf),
    Export,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Line, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Line::Empty);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Line::Scan(line.to_string()));
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let required = |what: &str| {
        if rest.is_empty() {
            Err(format!(":{} needs {}", name, what))
        } else {
            Ok(rest.to_string())
        }
    };

    match name {
        "qty" | "q" => parse_int(&required("a quantity")?).map(Line::Quantity),
        "remove" | "rm" => {
            let args = required("a code")?;
            let mut parts = args.split_whitespace();
            let code = parts.next().unwrap_or_default().to_string();
            let quantity = match parts.next() {
                Some(n) => parse_int(n)?,
                None => 1,
            };
            Ok(Line::Remove { code, quantity })
        }
        "undo" => Ok(Line::Undo),
        "new" => required("a session name").map(Line::New),
        "switch" | "sw" => required("a session name").map(Line::Switch),
        "reset" => Ok(Line::Reset((!rest.is_empty()).then(|| rest.to_string()))),
        "delete" | "del" => required("a session name").map(Line::Delete),
        "sessions" => Ok(Line::Sessions),
        "list" | "ls" => Ok(Line::List),
        "unknown" => Ok(Line::Unknown),
        "log" => match rest {
            "" => Ok(Line::Log(10)),
            n => n
                .parse::<usize>()
                .map(Line::Log)
                .map_err(|_| format!("'{}' is not a count", n)),
        },
        "summary" | "sum" => Ok(Line::Summary),
        "import" => required("a path").map(|p| Line::Import(PathBuf::from(p))),
        "export" => Ok(Line::Export),
        "help" | "h" | "?" => Ok(Line::Help),
        "quit" | "exit" => Ok(Line::Quit),
        other => Err(format!("unknown command ':{}' (try :help)", other)),
    }
}

fn parse_int(value: &str) -> Result<i64, String> {
    value
        .parse::<i64>()
        .map_err(|_| format!("'{}' is not a whole number", value))
}

pub struct Console {
    workspace: Workspace,
    export_dir: PathBuf,
    quantity: i64,
}

impl Console {
    pub fn new(workspace: Workspace, export_dir: PathBuf, quantity: i64) -> Self {
        Self {
            workspace,
            export_dir,
            quantity: quantity.max(1),
        }
    }

    pub fn run<R: BufRead>(&mut self, input: &mut R) -> Result<()> {
        println!("Scan codes, or type {} for commands.", ":help".bold());
        let mut line = String::new();

        loop {
            print!(
                "{} {} ",
                format!("[{} x{}]", self.workspace.sessions.current_name(), self.quantity).cyan(),
                ">".bold()
            );
            io::stdout().flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                println!();
                break;
            }

            match parse_line(&line) {
                Ok(Line::Quit) => break,
                Ok(parsed) => {
                    if let Err(err) = self.dispatch(parsed, input) {
                        error!("{:#}", err);
                    }
                }
                Err(msg) => println!("{}", msg.yellow()),
            }
        }

        Ok(())
    }

    fn dispatch<R: BufRead>(&mut self, line: Line, input: &mut R) -> Result<()> {
        match line {
            Line::Empty | Line::Quit => {}
            Line::Scan(code) => {
                let outcome = self.workspace.scan(&code, self.quantity);
                self.show(outcome.map(|r| r.into_iter().collect()));
            }
            Line::Quantity(n) => {
                if n <= 0 {
                    println!("{}", Rejection::NonPositiveQuantity(n).to_string().yellow());
                } else {
                    self.quantity = n;
                }
            }
            Line::Remove { code, quantity } => {
                let primary = self
                    .workspace
                    .catalog()
                    .and_then(|c| c.resolve(&code))
                    .map(str::to_string)
                    .unwrap_or(code);
                let outcome = self.workspace.remove(&primary, quantity);
                self.show(outcome.map(|r| vec![r]));
            }
            Line::Undo => self.undo(),
            Line::New(name) => {
                let outcome = self.workspace.sessions.create_session(&name);
                self.report(outcome);
            }
            Line::Switch(name) => {
                let outcome = self.workspace.sessions.switch_current(&name);
                self.report(outcome);
            }
            Line::Reset(name) => {
                let name = name.unwrap_or_else(|| self.workspace.sessions.current_name().to_string());
                let question = format!("Clear every count of session '{}'?", name);
                if prompt_confirm(input, &question, Some(false))? {
                    let outcome = self.workspace.sessions.reset_session(&name);
                    self.report(outcome);
                }
            }
            Line::Delete(name) => {
                let outcome = self.workspace.sessions.delete_session(&name);
                self.report(outcome);
            }
            Line::Sessions => self.print_sessions(),
            Line::List => self.print_inventory(),
            Line::Unknown => self.print_unknown(),
            Line::Log(n) => self.print_log(n),
            Line::Summary => self.print_summary(),
            Line::Import(path) => {
                if let Ok(catalog) = self.workspace.import_catalog(&path) {
                    println!(
                        "{} {} products, {} scannable codes",
                        "Catalog loaded:".green(),
                        catalog.len(),
                        catalog.alias_count()
                    );
                }
            }
            Line::Export => self.export()?,
            Line::Help => println!("{}", HELP),
        }
        Ok(())
    }

    fn undo(&mut self) {
        let last = self
            .workspace
            .sessions
            .current()
            .scan_log()
            .last()
            .filter(|e| e.action == ScanAction::Add)
            .map(|e| (e.resolved_primary_code.clone(), e.quantity_delta as i64));

        match last {
            Some((primary, quantity)) => {
                let outcome = self.workspace.remove(&primary, quantity);
                self.show(outcome.map(|r| vec![r]));
            }
            None => println!("{}", "Nothing to undo".yellow()),
        }
    }

    fn report(&self, outcome: Result<(), Rejection>) {
        match outcome {
            Ok(()) => println!(
                "{} {}",
                "Current session:".green(),
                self.workspace.sessions.current_name()
            ),
            Err(reason) => {
                debug!("Declined: {}", reason);
                println!("{}", reason.to_string().yellow());
            }
        }
    }

    fn show(&self, outcome: Result<Vec<ScanResult>, Rejection>) {
        let results = match outcome {
            Ok(results) => results,
            Err(reason) => {
                debug!("Declined: {}", reason);
                println!("{}", reason.to_string().yellow());
                return;
            }
        };

        for result in results {
            match result {
                ScanResult::Matched {
                    product,
                    scanned_code,
                    quantity,
                    total,
                    via_alias,
                } => {
                    let via = if via_alias {
                        format!(" via EAN 2 {}", scanned_code)
                    } else {
                        String::new()
                    };
                    println!(
                        "{} {} ({}) +{} = {}{}",
                        "✓".green(),
                        product.name.bold(),
                        product.reference,
                        quantity,
                        total.to_string().green(),
                        via.dimmed()
                    );
                }
                ScanResult::Unknown {
                    code,
                    quantity,
                    total,
                } => println!(
                    "{} Unknown code: {} (+{}, {} so far)",
                    "⚠".yellow(),
                    code.yellow().bold(),
                    quantity,
                    total
                ),
                ScanResult::Removed {
                    primary_code,
                    product,
                    quantity,
                    remaining,
                } => {
                    let label = product
                        .map(|p| format!("{} ({})", p.name, p.reference))
                        .unwrap_or(primary_code);
                    println!(
                        "{} {} -{} = {}",
                        "↺".cyan(),
                        label.bold(),
                        quantity,
                        remaining
                    );
                }
            }
        }
    }

    fn print_sessions(&self) {
        let sessions = &self.workspace.sessions;
        for name in sessions.names() {
            let summary = sessions.get(name).map(|l| l.summary()).unwrap_or_default();
            let marker = if name == sessions.current_name() { "*" } else { " " };
            println!(
                "{} {}: {} units, {} products, {} unknown",
                marker.green(),
                name.bold(),
                summary.total_units,
                summary.distinct_products,
                summary.unknown_units
            );
        }
    }

    fn print_inventory(&self) {
        let Some(catalog) = self.workspace.catalog() else {
            println!("{}", Rejection::NoCatalog.to_string().yellow());
            return;
        };
        let ledger = self.workspace.sessions.current();
        let mut any = false;
        for (product, quantity) in scanned_inventory(catalog, ledger) {
            any = true;
            println!(
                "{:>6}  {:<14} {:<12} {} {} {} {}",
                quantity.to_string().green(),
                product.primary_code,
                product.reference,
                product.name,
                product.color,
                product.size,
                product.shoe_size
            );
        }
        if !any {
            println!("{}", "Nothing counted yet".dimmed());
        }
    }

    fn print_unknown(&self) {
        let unknown = self.workspace.sessions.current().unknown_sorted();
        if unknown.is_empty() {
            println!("{}", "No unknown codes".dimmed());
        }
        for (code, quantity) in unknown {
            println!("{:>6}  {}", quantity.to_string().yellow(), code);
        }
    }

    fn print_log(&self, n: usize) {
        for event in self.workspace.sessions.current().recent(n) {
            let action = match event.action {
                ScanAction::Add => event.action.as_str().green(),
                ScanAction::Remove => event.action.as_str().cyan(),
                ScanAction::Unknown => event.action.as_str().yellow(),
            };
            println!(
                "{}  {:<7} {:<14} {:<14} {}",
                event.timestamp,
                action,
                event.scanned_code,
                event.resolved_primary_code,
                event.quantity_delta
            );
        }
    }

    fn print_summary(&self) {
        let summary = self.workspace.sessions.current().summary();
        println!(
            "{}: {} units over {} products, {} unknown units ({} codes), {} events",
            self.workspace.sessions.current_name().bold(),
            summary.total_units.to_string().green(),
            summary.distinct_products,
            summary.unknown_units.to_string().yellow(),
            summary.distinct_unknown,
            summary.events
        );
    }

    fn export(&self) -> Result<()> {
        let Some(catalog) = self.workspace.catalog() else {
            println!("{}", Rejection::NoCatalog.to_string().yellow());
            return Ok(());
        };
        let sessions = &self.workspace.sessions;
        let paths = write_session_exports(
            &self.export_dir,
            sessions.current_name(),
            catalog,
            sessions.current(),
        )?;
        for path in paths {
            println!("{} {}", "Wrote".green(), path.display());
        }
        Ok(())
    }
}
