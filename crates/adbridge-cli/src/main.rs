//! Adbridge - Active Directory user lifecycle tool
//!
//! Finds, creates, updates and removes directory users over LDAP.

mod commands;
mod config;

use adbridge_core::error::ErrorBody;
use adbridge_directory::{LdapConfig, LdapDirectory, UserService};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use commands::CommandContext;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "adbridge")]
#[command(author = "Adbridge Team")]
#[command(version = adbridge_core::VERSION)]
#[command(about = "Active Directory user lifecycle management", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ADBRIDGE_CONFIG")]
    config: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ADBRIDGE_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a user
    Find {
        user: String,
        /// Attributes to return (comma separated); all when omitted
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Check whether a user exists
    Exists { user: String },

    /// Create a user with a generated password
    Add(commands::add::AddArgs),

    /// Update a user's attributes, name or account state
    Update(commands::update::UpdateArgs),

    /// Check a user's credentials
    Auth {
        user: String,
        /// Password to check
        #[arg(long, env = "ADBRIDGE_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Check whether a user belongs to a group
    MemberOf { user: String, group: String },

    /// List the members of a group
    Members { group: String },

    /// Set a user's password
    SetPassword {
        user: String,
        #[arg(long, env = "ADBRIDGE_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Mark a user's password as never expiring
    NeverExpires { user: String },

    /// Enable a user
    Enable { user: String },

    /// Disable a user
    Disable { user: String },

    /// Clear a user's lockout
    Unlock { user: String },

    /// Move a user to another location (DN fragment or path like EMEA/Sales)
    Move { user: String, location: String },

    /// Show a user's location
    Location { user: String },

    /// Delete a user
    Remove { user: String },
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let output = cli.output;

    if let Err(e) = run(cli).await {
        report(&e, output);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref().unwrap_or(&config.logging.level), &config.logging.format);

    debug!("Using directory {} ({})", config.ldap.server_url, config.directory.base_dn);

    let directory = LdapDirectory::new(LdapConfig::from(&config));
    let ctx = CommandContext {
        service: UserService::new(Arc::new(directory), &config),
        output_format: cli.output,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Find { user, fields } => commands::lookup::find(&ctx, &user, fields).await,
        Commands::Exists { user } => commands::lookup::exists(&ctx, &user).await,
        Commands::Add(args) => commands::add::execute(&ctx, args).await,
        Commands::Update(args) => commands::update::execute(&ctx, args).await,
        Commands::Auth { user, password } => commands::auth::authenticate(&ctx, &user, &password).await,
        Commands::MemberOf { user, group } => commands::auth::member_of(&ctx, &user, &group).await,
        Commands::Members { group } => commands::lookup::members(&ctx, &group).await,
        Commands::SetPassword { user, password } => {
            commands::account::set_password(&ctx, &user, &password).await
        }
        Commands::NeverExpires { user } => commands::account::never_expires(&ctx, &user).await,
        Commands::Enable { user } => commands::account::enable(&ctx, &user).await,
        Commands::Disable { user } => commands::account::disable(&ctx, &user).await,
        Commands::Unlock { user } => commands::account::unlock(&ctx, &user).await,
        Commands::Move { user, location } => commands::account::move_user(&ctx, &user, &location).await,
        Commands::Location { user } => commands::lookup::location(&ctx, &user).await,
        Commands::Remove { user } => commands::account::remove(&ctx, &user).await,
    }
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so command output stays parseable
    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn report(err: &anyhow::Error, output: OutputFormat) {
    let body = match err.downcast_ref::<adbridge_core::Error>() {
        Some(e) => ErrorBody::from(e),
        None => ErrorBody {
            error: true,
            code: "InternalError".to_string(),
            status: 500,
            message: format!("{:#}", err),
            resource: None,
        },
    };

    match output {
        OutputFormat::Json => println!("{}", body.to_json()),
        OutputFormat::Text => eprintln!("{}: {}", body.code.red().bold(), body.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_find_fields() {
        let cli = Cli::try_parse_from(["adbridge", "find", "jdoe", "--fields", "mail,title"]).unwrap();
        match cli.command {
            Commands::Find { user, fields } => {
                assert_eq!(user, "jdoe");
                assert_eq!(fields, vec!["mail", "title"]);
            }
            _ => panic!("expected find"),
        }
    }

    #[test]
    fn test_report_maps_directory_errors() {
        let err = anyhow::Error::new(adbridge_core::Error::UserNotFound("jdoe".into()));
        let body = ErrorBody::from(err.downcast_ref::<adbridge_core::Error>().unwrap());
        assert_eq!(body.status, 404);
        assert_eq!(body.resource.as_deref(), Some("jdoe"));
    }
}
