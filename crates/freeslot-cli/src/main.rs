use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use freeslot_auth::GoogleTokenProvider;
use freeslot_core::{AppError, Config, ConfigError};
use freeslot_schedule::{DisplayMode, QueryRequest, RowStyle};

#[derive(Parser)]
#[command(name = "freeslot")]
#[command(about = "Show free time across your Google calendars", version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print free (or busy) times for a range of dates
    Show {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Start of each day's window (HH:MM)
        #[arg(long)]
        from: Option<String>,

        /// End of each day's window (HH:MM)
        #[arg(long)]
        to: Option<String>,

        /// List busy blocks instead of free gaps
        #[arg(long)]
        busy: bool,

        /// Calendar id to leave out; repeatable
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,

        /// Output format: html or text
        #[arg(short, long)]
        format: Option<String>,

        /// IANA time zone, e.g. Europe/Berlin
        #[arg(long)]
        tz: Option<String>,

        /// Write the result to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List calendar ids and names, for use with --exclude
    Calendars,
    /// Sign in to Google now
    Login,
    /// Forget the stored Google token
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) = freeslot_core::init(level) {
        eprintln!("{:#}", e);
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            match &e {
                AppError::Input(input) => eprintln!("{}\n{}", input.user_message(), input),
                _ => eprintln!("{}", e.user_message()),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), AppError> {
    let (config, _) = Config::load_validated().map_err(|e| match e.downcast::<ConfigError>() {
        Ok(config_err) => AppError::Config(config_err),
        Err(other) => AppError::Config(ConfigError::Invalid(format!("{:#}", other))),
    })?;

    match command {
        Commands::Show {
            start,
            end,
            from,
            to,
            busy,
            exclude,
            format,
            tz,
            output,
        } => {
            let style = match format {
                Some(f) => f.parse::<RowStyle>()?,
                None => config.display.format,
            };
            let mode = if busy {
                DisplayMode::Busy
            } else {
                config.display.mode
            };
            let mut excluded = config.calendar.excluded.clone();
            excluded.extend(exclude);

            let request = QueryRequest {
                start_date: start,
                end_date: end,
                start_time: from,
                end_time: to,
                time_zone: tz,
                mode,
                excluded,
            };

            let tokens = GoogleTokenProvider::from_config(&config);
            let rendered = freeslot_cli::run_query(&request, &config, &tokens, style).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered)?;
                    tracing::info!("Wrote {} bytes to {}", rendered.len(), path.display());
                    eprintln!("Saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Calendars => {
            let tokens = GoogleTokenProvider::from_config(&config);
            let calendars =
                freeslot_cli::list_calendars(&tokens, &config.calendar.api_base_url).await?;
            for calendar in calendars {
                let excluded = config.calendar.excluded.contains(&calendar.id);
                println!("{}", freeslot_cli::calendar_line(&calendar, excluded));
            }
        }
        Commands::Login => {
            GoogleTokenProvider::from_config(&config).login().await?;
            println!("Signed in to Google Calendar.");
        }
        Commands::Logout => {
            GoogleTokenProvider::from_config(&config).logout()?;
            println!("Signed out.");
        }
    }

    Ok(())
}
