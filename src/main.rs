mod auth;
mod config;
mod export;
mod form;
mod models;
mod store;
mod tui;
mod view_model;

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use auth::{CredentialCheck, StaticCredentials};
use config::Config;
use form::{Field, FormController, Submit};
use models::resolve_status;
use store::HttpRecordStore;
use view_model::{StatusFilter, ViewModel, resolve_sort};

#[derive(Parser)]
#[command(name = "apptrack")]
#[command(about = "Job application tracker - search, edit, and export your applications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config
    Init {
        /// Base URL of the tracker service
        #[arg(long, default_value = "http://localhost:5000")]
        api_base: String,
    },

    /// Open a session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Close the session
    Logout,

    /// List applications
    List {
        /// Match companies, positions, or locations
        #[arg(long)]
        search: Option<String>,

        /// Filter by status (pending, interview, offer, rejected)
        #[arg(short, long)]
        status: Option<String>,

        /// Sort order (date-asc, date-desc, company-asc, company-desc, salary-asc, salary-desc)
        #[arg(long, default_value = "date-desc")]
        sort: String,
    },

    /// Show collection statistics
    Stats,

    /// Add an application
    Add {
        #[arg(long)]
        company: String,

        #[arg(long)]
        position: String,

        #[arg(long)]
        location: Option<String>,

        /// e.g. "$80,000"
        #[arg(long)]
        salary: Option<String>,

        /// pending, interview, offer, rejected
        #[arg(long)]
        status: Option<String>,

        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Edit an application; only the given fields change
    Edit {
        /// Application ID
        id: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        position: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        salary: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: String,
    },

    /// Export all applications to CSV
    Export {
        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Browse applications interactively
    Browse,
}

fn open_view_model() -> Result<ViewModel> {
    let config = Config::load()?;
    let store = HttpRecordStore::new(&config.api_base);
    let mut vm = ViewModel::new(Box::new(store));
    vm.load()?;
    Ok(vm)
}

fn apply_field(form: &mut FormController, field: Field, value: Option<String>) -> Result<()> {
    let Some(value) = value else { return Ok(()) };
    if field == Field::Status {
        // Reject bad status text up front instead of silently keeping the
        // old value.
        resolve_status(&value)?;
    }
    form.set(field, &value);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { api_base } => {
            let config = Config {
                api_base,
                ..Config::default()
            };
            config.save()?;
            println!("Config written to {}", Config::default_path().display());
        }

        Commands::Login { username, password } => {
            let config = Config::load()?;
            let check = StaticCredentials::from_config(&config);
            if !check.authenticate(&username, &password) {
                bail!("Invalid username or password");
            }
            auth::open_session()?;
            println!("Logged in as {}.", username);
        }

        Commands::Logout => {
            auth::close_session()?;
            println!("Logged out.");
        }

        Commands::List { search, status, sort } => {
            auth::ensure_logged_in()?;
            let mut vm = open_view_model()?;
            if let Some(term) = search {
                vm.set_search_term(&term);
            }
            if let Some(name) = status {
                vm.set_filter(StatusFilter::Only(resolve_status(&name)?));
            }
            vm.set_sort(resolve_sort(&sort)?);

            let rows = vm.visible();
            if rows.is_empty() {
                println!("No applications found.");
            } else {
                println!(
                    "{:<26} {:<24} {:<24} {:<18} {:<10} {:<12} {:>12}",
                    "ID", "COMPANY", "POSITION", "LOCATION", "STATUS", "DATE", "SALARY"
                );
                println!("{}", "-".repeat(132));
                for rec in rows {
                    println!(
                        "{:<26} {:<24} {:<24} {:<18} {:<10} {:<12} {:>12}",
                        truncate(rec.id.as_deref().unwrap_or("-"), 24),
                        truncate(&rec.company, 22),
                        truncate(&rec.position, 22),
                        truncate(&rec.location, 16),
                        rec.status.label(),
                        rec.date_only(),
                        truncate(&rec.salary, 12),
                    );
                }
            }
        }

        Commands::Stats => {
            auth::ensure_logged_in()?;
            let vm = open_view_model()?;
            let stats = vm.stats();
            println!("Total applications: {}", stats.total);
            println!("Response rate:      {}%", stats.response_rate);
            println!("Pending:            {}", stats.pending);
            println!("Interviews:         {}", stats.interview);
            println!("Offers:             {}", stats.offer);
            println!("Rejected:           {}", stats.rejected);
        }

        Commands::Add {
            company,
            position,
            location,
            salary,
            status,
            date,
            notes,
        } => {
            auth::ensure_logged_in()?;
            let mut vm = open_view_model()?;
            let mut form = FormController::new();
            form.open_create();
            form.set(Field::Company, &company);
            form.set(Field::Position, &position);
            apply_field(&mut form, Field::Location, location)?;
            apply_field(&mut form, Field::Salary, salary)?;
            apply_field(&mut form, Field::Status, status)?;
            apply_field(&mut form, Field::Date, date)?;
            apply_field(&mut form, Field::Notes, notes)?;

            match form.submit(&mut vm)? {
                Submit::Saved => {
                    if let Some(added) = vm.records().last() {
                        println!(
                            "Added application at {} ({})",
                            added.company,
                            added.id.as_deref().unwrap_or("-")
                        );
                    }
                }
                Submit::Blocked => bail!("Company and position are required"),
            }
        }

        Commands::Edit {
            id,
            company,
            position,
            location,
            salary,
            status,
            date,
            notes,
        } => {
            auth::ensure_logged_in()?;
            let mut vm = open_view_model()?;
            let mut form = FormController::new();
            form.open_edit(&vm, &id);
            if !form.is_open() {
                bail!("Application '{}' not found", id);
            }
            apply_field(&mut form, Field::Company, company)?;
            apply_field(&mut form, Field::Position, position)?;
            apply_field(&mut form, Field::Location, location)?;
            apply_field(&mut form, Field::Salary, salary)?;
            apply_field(&mut form, Field::Status, status)?;
            apply_field(&mut form, Field::Date, date)?;
            apply_field(&mut form, Field::Notes, notes)?;

            match form.submit(&mut vm)? {
                Submit::Saved => println!("Updated application {}", id),
                Submit::Blocked => bail!("Company and position are required"),
            }
        }

        Commands::Delete { id } => {
            auth::ensure_logged_in()?;
            let mut vm = open_view_model()?;
            vm.remove(&id)?;
            println!("Deleted application {}", id);
        }

        Commands::Export { output } => {
            auth::ensure_logged_in()?;
            let vm = open_view_model()?;
            let path = output.unwrap_or_else(|| PathBuf::from(export::DEFAULT_FILENAME));
            export::write_csv(vm.records(), &path)?;
            println!("Exported {} application(s) to {}", vm.records().len(), path.display());
        }

        Commands::Browse => {
            auth::ensure_logged_in()?;
            let mut vm = open_view_model()?;
            tui::run_browse(&mut vm)?;
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
