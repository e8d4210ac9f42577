// Use modules from the library crate
use artifetch::{commands, logging};

use anyhow::Result;
use clap::Parser;
use commands::download::DownloadArgs;
use commands::repo::RepoAddArgs;

#[derive(Parser)]
#[command(
    name = "artifetch",
    about = "Resolve dependency locators and copy the artifacts into an output directory",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Resolve locators and copy every artifact into an output directory
    ///
    /// Locators use the mvn scheme:
    ///   mvn://group:artifact:version[:classifier][:type][?query]
    ///
    /// Query keys:
    ///   scope=<scope>          Scope recorded on the artifact (default: compile)
    ///   transitive=<bool>      Only "true" (any case) is true (default: true)
    ///   exclude=<group:art>    Exclude from the whole batch, repeatable
    ///
    /// The built-in resolver does not read POM files: it fetches the listed
    /// artifacts only, so transitive=true and transitive=false download the
    /// same files. Exclusions still drop matching transitive roots.
    ///
    /// Any other scheme (https://, file://, ...) is passed through untouched.
    ///
    /// Examples:
    ///   artifetch download mvn://org.slf4j:slf4j-api:2.0.13 -o libs
    ///   artifetch download 'mvn://junit:junit:4.13.2?scope=test&transitive=false' -o libs
    Download(DownloadArgs),

    /// Show how locators are categorized without contacting any repository
    ///
    /// Example:
    ///   artifetch inspect mvn://org.example:lib-a:1.0 'mvn://org.example:lib-b:2.0?transitive=false'
    Inspect {
        /// Dependency locators
        #[arg(required = true, value_name = "LOCATOR")]
        locators: Vec<String>,
    },

    /// Manage remote repositories
    Repo {
        #[command(subcommand)]
        command: RepoCommand,
    },
}

#[derive(Parser)]
enum RepoCommand {
    /// Add a repository, or replace the one with the same id
    ///
    /// Examples:
    ///   artifetch repo add nexus https://nexus.example.com/repository/maven-public
    ///   artifetch repo add snaps https://repo.example.com/snapshots --snapshots --no-releases
    Add(RepoAddArgs),

    /// Remove a repository
    ///
    /// Example:
    ///   artifetch repo remove nexus
    Remove {
        /// Repository id to remove
        id: String,
    },

    /// List repositories in resolution order
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Download(args) => {
            logging::init(args.debug)?;
            commands::download::run(args).await
        }

        Command::Inspect { locators } => commands::inspect::run(&locators),

        Command::Repo { command } => match command {
            RepoCommand::Add(args) => commands::repo::add(args),
            RepoCommand::Remove { id } => commands::repo::remove(&id),
            RepoCommand::List => commands::repo::list(),
        },
    }
}
