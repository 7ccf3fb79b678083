use massspring::network::codec;
use massspring::{bench_step, load_file, Runner, Server, World, DEFAULT_HOST, DEFAULT_PORT};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "massspring", version, about = "Mass/spring N-body simulator")]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Step a scenario headless and print mass messages
    Run {
        /// Scenario file, or a name under the bundled scenarios directory
        scenario: String,

        /// Number of steps to run
        #[arg(short, long, default_value = "1000")]
        steps: usize,

        /// Print positions every this many steps (0 prints only the last)
        #[arg(short, long, default_value = "100")]
        every: usize,
    },

    /// Step a scenario and stream positions over TCP
    Serve {
        scenario: String,

        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Microseconds to sleep between steps
        #[arg(long, default_value = "0")]
        pace_us: u64,

        /// Stop stepping and shut the server down after this many steps
        #[arg(short, long)]
        steps: Option<u64>,
    },

    /// Time all-pairs steps for growing body counts
    Bench {
        #[arg(short, long, default_value = "5")]
        steps: usize,
    },
}

fn parse_level(s: &str) -> Level {
    match s.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

// bundled scenarios live next to the manifest, like "pendulum.yaml"
fn resolve_scenario(name: &str) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.exists() {
        return direct;
    }
    let bundled = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    let candidate = bundled.join(name);
    if candidate.extension().is_none() {
        candidate.with_extension("yaml")
    } else {
        candidate
    }
}

fn load(name: &str) -> Result<World> {
    let path = resolve_scenario(name);
    load_file(&path).with_context(|| format!("failed to load scenario {}", path.display()))
}

fn run(name: &str, steps: usize, every: usize) -> Result<()> {
    let mut world = load(name)?;
    let mut warnings = 0usize;

    for i in 1..=steps {
        warnings += world.step().diagnostics.len();
        if (every != 0 && i % every == 0) || i == steps {
            print!("{}", codec::encode_masses(&world.snapshot()));
        }
    }

    info!(steps, time = world.time(), warnings, "run finished");
    Ok(())
}

fn serve(name: &str, host: &str, port: u16, pace_us: u64, steps: Option<u64>) -> Result<()> {
    let world = load(name)?.into_shared();
    let server = Server::bind((host, port), world.clone())
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    let shutdown = server.shutdown_handle()?;
    let runner = Runner::spawn(world, Duration::from_micros(pace_us), steps);
    let serving = thread::spawn(move || server.serve());

    // unbounded runs serve until the process is killed
    let ran = match steps {
        Some(_) => runner.wait(),
        None => {
            serving.join().map_err(|_| anyhow!("server thread panicked"))?;
            return Ok(());
        }
    };
    info!(steps = ran, "simulation stopped");

    shutdown.shutdown();
    let clients = serving.join().map_err(|_| anyhow!("server thread panicked"))?;
    info!(clients, "served");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run { scenario, steps, every } => run(&scenario, steps, every),
        Commands::Serve { scenario, host, port, pace_us, steps } => serve(&scenario, &host, port, pace_us, steps),
        Commands::Bench { steps } => {
            bench_step(&[50, 100, 200, 400, 800], steps)?;
            Ok(())
        }
    }
}
