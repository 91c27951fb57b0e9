use clap::{Parser, Subcommand, ValueEnum};

mod config;
mod matcher;
mod model;
mod render;
mod trace;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "query-telemetry")]
#[command(
    about = "Count instrumented method calls inside the timespans of a telemetry trace",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print per-timespan and per-line call counts for a telemetry CSV.
    Report {
        /// The telemetry CSV file (`-` for stdin).
        #[arg(short = 'f', long)]
        file: String,

        /// A regex that selects the methods whose calls you want to track.
        #[arg(short = 'r', long, default_value = config::DEFAULT_METHOD_NAME_REGEX)]
        method_name_regex: String,

        /// Only main-thread zones whose name contains this substring are analyzed.
        #[arg(long, default_value = config::DEFAULT_ZONE_FILTER)]
        zone_filter: String,

        /// Reject a second "Main Thread" track naming a different thread.
        #[arg(long)]
        strict_main_thread: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report {
            file,
            method_name_regex,
            zone_filter,
            strict_main_thread,
            format,
        } => {
            let policy = if strict_main_thread {
                trace::MainThreadPolicy::Strict
            } else {
                trace::MainThreadPolicy::LastWriteWins
            };
            let config = config::AnalysisConfig::new(&method_name_regex)?
                .with_zone_filter(zone_filter)
                .with_main_thread_policy(policy);

            // 1) Collect every timespan and call; matching waits for the whole log.
            let collected = trace::parse_trace_file(&file, &config)?;

            // 2) Match + aggregate.
            let data = model::build_report_data(&collected, &config.method_name_filter);

            // 3) Render.
            let out = match format {
                OutputFormat::Text => render::render_text_report(&data),
                OutputFormat::Json => render::render_json_report(&data)?,
            };
            print!("{}", out);
        }
    }

    Ok(())
}
