#![forbid(unsafe_code)]

//! `catadmin`: command-line admin console for the catalog backend.

use catadmin_console::config::{ConfigOverrides, ConsoleConfig, env_var};
use catadmin_console::render;
use catadmin_console::{
    AuthSession, CatalogClient, CategoryController, CategoryDto, ConsoleError, FileTokenStore,
    IssueDto, ParentChange, ProductController, Registration, UreqTransport,
};
use catadmin_core::{CategoryId, ProductId};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

type Client = CatalogClient<UreqTransport, FileTokenStore>;

/// Catalog admin console
#[derive(Parser, Debug)]
#[command(name = "catadmin", version)]
#[command(about = "Manage catalog categories and products")]
struct Cli {
    /// Backend base URL (env CATADMIN_BASE_URL, default http://localhost:8003)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Where the session tokens are kept (env CATADMIN_SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Request timeout in milliseconds (env CATADMIN_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Tree depth cap (env CATADMIN_MAX_DEPTH, default 10)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Raise log verbosity to debug
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session tokens
    Login {
        #[arg(long)]
        email: String,
        /// Falls back to CATADMIN_PASSWORD
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account; log in separately afterwards
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    #[command(subcommand)]
    Categories(CategoryCommand),
    #[command(subcommand)]
    Products(ProductCommand),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    /// Falls back to CATADMIN_PASSWORD
    #[arg(long)]
    password: Option<String>,
    /// Defaults to the password itself
    #[arg(long)]
    confirm_password: Option<String>,
    /// Agree to the terms and conditions
    #[arg(long)]
    accept_terms: bool,
}

impl RegisterArgs {
    fn into_registration(self) -> Registration {
        let password = self
            .password
            .or_else(|| env_var("CATADMIN_PASSWORD"))
            .unwrap_or_default();
        let confirm_password = self.confirm_password.unwrap_or_else(|| password.clone());
        Registration {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            password,
            confirm_password,
            accept_terms: self.accept_terms,
        }
    }
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Render the category hierarchy
    Tree {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Flat list as loaded from the backend
    List {
        #[arg(long)]
        json: bool,
    },
    /// Legal parents for a new category or for the one being edited
    Candidates {
        #[arg(long)]
        editing: Option<String>,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        parent: ParentArgs,
    },
    Delete {
        id: String,
    },
    /// Report integrity problems in the loaded hierarchy
    Lint {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct ParentArgs {
    /// New parent id
    #[arg(long)]
    parent: Option<String>,
    /// Make the category a root
    #[arg(long)]
    root: bool,
}

impl ParentArgs {
    fn change(&self) -> Result<ParentChange, ConsoleError> {
        if self.root {
            return Ok(ParentChange::Root);
        }
        match &self.parent {
            Some(raw) => Ok(ParentChange::Set(CategoryId::try_new(raw.as_str())?)),
            None => Ok(ParentChange::Keep),
        }
    }
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Delete {
        id: String,
    },
}

fn init_logging(verbose: u8) {
    let filter = if verbose > 0 {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        env_var("CATADMIN_LOG")
            .or_else(|| env_var("RUST_LOG"))
            .and_then(|raw| tracing_subscriber::EnvFilter::try_new(raw).ok())
            .unwrap_or_else(|| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ConsoleError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|_| ConsoleError::InvalidInput("output could not be encoded"))?;
    println!("{text}");
    Ok(())
}

fn optional_category(raw: Option<&str>) -> Result<Option<CategoryId>, ConsoleError> {
    raw.map(CategoryId::try_new).transpose().map_err(ConsoleError::from)
}

fn run_categories(
    client: Client,
    max_depth: usize,
    command: CategoryCommand,
) -> Result<(), ConsoleError> {
    let mut controller = CategoryController::new(client, max_depth);
    controller.reload()?;
    match command {
        CategoryCommand::Tree { search, json } => {
            let rows = controller.tree_rows(search.as_deref());
            if json {
                print_json(&rows)?;
            } else {
                print!("{}", render::tree_text(&rows));
            }
        }
        CategoryCommand::List { json } => {
            if json {
                let rows: Vec<CategoryDto> =
                    controller.categories().iter().map(CategoryDto::from).collect();
                print_json(&rows)?;
            } else {
                print!(
                    "{}",
                    render::category_lines(controller.categories().iter().map(|node| (
                        node.id.as_str(),
                        node.name.as_str(),
                        node.parent_id.as_ref().map(CategoryId::as_str),
                    )))
                );
            }
        }
        CategoryCommand::Candidates { editing } => {
            let editing = optional_category(editing.as_deref())?;
            let candidates = controller.parent_candidates(editing.as_ref())?;
            print!(
                "{}",
                render::category_lines(candidates.iter().map(|node| (
                    node.id.as_str(),
                    node.name.as_str(),
                    node.parent_id.as_ref().map(CategoryId::as_str),
                )))
            );
        }
        CategoryCommand::Add { name, parent } => {
            let parent = optional_category(parent.as_deref())?;
            controller.create(&name, parent)?;
            println!("Category created");
        }
        CategoryCommand::Edit { id, name, parent } => {
            let id = CategoryId::try_new(id)?;
            controller.update(&id, name.as_deref(), parent.change()?)?;
            println!("Category updated");
        }
        CategoryCommand::Delete { id } => {
            let id = CategoryId::try_new(id)?;
            controller.delete(&id)?;
            println!("Category deleted");
        }
        CategoryCommand::Lint { json } => {
            let issues: Vec<IssueDto> = controller.lint().iter().map(IssueDto::from).collect();
            if json {
                print_json(&issues)?;
            } else {
                print!("{}", render::issues_text(&issues));
            }
        }
    }
    Ok(())
}

fn run_products(client: Client, command: ProductCommand) -> Result<(), ConsoleError> {
    let mut controller = ProductController::new(client);
    controller.reload()?;
    match command {
        ProductCommand::List {
            search,
            category,
            json,
        } => {
            let category = optional_category(category.as_deref())?;
            let rows = controller.rows(&search, category.as_ref());
            if json {
                print_json(&rows)?;
            } else {
                print!("{}", render::products_text(&rows));
            }
        }
        ProductCommand::Delete { id } => {
            let id = ProductId::try_new(id)?;
            controller.delete(&id)?;
            println!("Product deleted");
        }
    }
    Ok(())
}

fn run(cli: Cli, config: ConsoleConfig) -> Result<(), ConsoleError> {
    let transport = UreqTransport::new(&config.base_url, config.timeout);
    let session = AuthSession::new(transport, FileTokenStore::new(config.session_file.clone()));
    match cli.command {
        Command::Login { email, password } => {
            let password = password
                .or_else(|| env_var("CATADMIN_PASSWORD"))
                .ok_or(ConsoleError::InvalidInput("Password is required"))?;
            let outcome = session.login(&email, &password)?;
            match outcome.user_type {
                Some(kind) => println!("Logged in as {email} ({kind})"),
                None => println!("Logged in as {email}"),
            }
            Ok(())
        }
        Command::Register(args) => {
            let registration = args.into_registration();
            session.register(&registration)?;
            println!("Registration successful. Run `catadmin login` to sign in.");
            Ok(())
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Categories(command) => {
            run_categories(CatalogClient::new(session), config.max_depth, command)
        }
        Command::Products(command) => run_products(CatalogClient::new(session), command),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        session_file: cli.session_file.clone(),
        timeout_ms: cli.timeout_ms,
        max_depth: cli.max_depth,
    };
    let config = match ConsoleConfig::from_process_env(overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };
    tracing::debug!(base_url = %config.base_url, "configuration resolved");

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(code = err.code(), "command failed");
            eprintln!("error [{}]: {err}", err.code());
            ExitCode::FAILURE
        }
    }
}
