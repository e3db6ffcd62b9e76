use clap::{ArgAction, Parser, Subcommand};
use commands::{auth, browse, detail, init, list, profile, search};

mod app;
mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Marquee - browse the catalog, keep your list, queue the trailers")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the backend connection settings
    #[command(long_about = "Create or overwrite the configuration file with the backend project id and API key. Values not passed as flags are prompted for.")]
    Init {
        /// Backend project id
        #[arg(long)]
        project_id: Option<String>,

        /// Backend API key
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Sign in with email and password
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account
    Signup {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,

        /// Display name (prompted when omitted)
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign in anonymously as a guest
    Guest,
    /// Sign out and discard the stored session
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// List the whole catalog, newest first
    Browse,
    /// Show one title: details, episodes, related titles, list membership
    Show {
        /// Catalog id of the title
        id: String,
    },
    /// Find titles by category tag
    Search {
        /// Category tags to match (any of them)
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        category: Vec<String>,
    },
    /// Manage "My List"
    List {
        #[command(subcommand)]
        cmd: ListCommands,
    },
    /// Show the user profile, optionally updating the avatar
    Profile {
        /// New avatar image reference
        #[arg(long)]
        avatar: Option<String>,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Show "My List" with each id resolved against the catalog
    Show,
    /// Toggle a title in or out of "My List"
    Toggle {
        /// Catalog id of the title
        id: String,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let result = match cli.command {
        Commands::Init {
            project_id,
            api_key,
        } => init::run_init(project_id, api_key, &output),
        Commands::Login { email } => auth::run_login(email, &output).await,
        Commands::Signup { email, name } => auth::run_signup(email, name, &output).await,
        Commands::Guest => auth::run_guest(&output).await,
        Commands::Logout => auth::run_logout(&output).await,
        Commands::Whoami => auth::run_whoami(&output).await,
        Commands::Browse => browse::run_browse(&output).await,
        Commands::Show { id } => detail::run_show(&id, &output).await,
        Commands::Search { category } => search::run_search(category, &output).await,
        Commands::List { cmd } => match cmd {
            ListCommands::Show => list::run_list_show(&output).await,
            ListCommands::Toggle { id } => list::run_list_toggle(&id, &output).await,
        },
        Commands::Profile { avatar } => profile::run_profile(avatar, &output).await,
    };

    if let Err(e) = &result {
        output.error(format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}
