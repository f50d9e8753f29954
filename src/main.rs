use clap::Parser;
use securepass::cli::commands::update::Changes;
use securepass::cli::{Cli, Commands};

fn main() {
    securepass::logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => securepass::cli::commands::init::execute(&cli),
        Commands::Add {
            ref website,
            ref username,
            ref url,
            ref notes,
        } => securepass::cli::commands::add::execute(&cli, website, username, url, notes),
        Commands::List { show_passwords } => {
            securepass::cli::commands::list::execute(&cli, show_passwords)
        }
        Commands::Show { ref id } => securepass::cli::commands::show::execute(&cli, id),
        Commands::Search {
            ref term,
            show_passwords,
        } => securepass::cli::commands::list::execute_search(&cli, term, show_passwords),
        Commands::Update {
            ref id,
            ref website,
            ref username,
            ref url,
            ref notes,
            password,
        } => {
            let changes = Changes {
                website: website.as_deref(),
                username: username.as_deref(),
                url: url.as_deref(),
                notes: notes.as_deref(),
                password,
            };
            securepass::cli::commands::update::execute(&cli, id, &changes)
        }
        Commands::Delete { ref id, force } => {
            securepass::cli::commands::delete::execute(&cli, id, force)
        }
        Commands::Passwd => securepass::cli::commands::passwd::execute(&cli),
        Commands::Export { ref path } => securepass::cli::commands::export::execute(&cli, path),
        Commands::Import { ref path, force } => {
            securepass::cli::commands::import_cmd::execute(&cli, path, force)
        }
        Commands::Config { ref action } => {
            securepass::cli::commands::config_cmd::execute(&cli, action)
        }
    };

    if let Err(e) = result {
        securepass::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
