use arcray::app::Playground;
use arcray::config;
use arcray::sys::runtime::{self, Script, ServiceOptions};
use arcray::sys::script::Swipe;
use arcray::sys::server::SOCKET_PATH;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::time::{Duration, Instant};
use uigeom::{Point, Size};

#[derive(Parser, Debug)]
#[command(name = "arcray", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Number of carousel children
    #[arg(short = 'n', long, default_value_t = 7)]
    items: usize,

    #[arg(long, default_value_t = 400.0)]
    width: f64,

    #[arg(long, default_value_t = 300.0)]
    height: f64,

    /// Horizontal swipe to play, in px; repeat for more (negative moves to later children)
    #[arg(short = 's', long = "swipe", allow_negative_numbers = true)]
    swipes: Vec<f64>,

    /// Take pointer commands from the control socket instead of playing swipes
    #[arg(short = 'i', long)]
    interactive: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Write the default config file if none exists
    WriteConfig,
    /// Send a command to an interactive arcray, e.g. `send down 200 100`
    Send {
        #[arg(required = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::WriteConfig) => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        Some(Commands::Send { ref words }) => send_command(&words.join(" ")),
        None => run(cli),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_or_default();
    let size = Size::new(cli.width, cli.height);
    let mut playground = Playground::new(config, size, cli.items)?;

    let script = if cli.interactive {
        None
    } else {
        let distances = if cli.swipes.is_empty() {
            vec![-240.0, 90.0]
        } else {
            cli.swipes
        };
        let from = Point::new(size.width / 2.0, size.height / 3.0);
        Some(Script {
            swipes: distances.into_iter().map(|d| Swipe::new(from, d)).collect(),
            pause: Duration::from_secs(1),
            linger: Duration::from_millis(1500),
        })
    };

    let (tx, rx) = async_channel::bounded(32);

    runtime::start_background_services(
        tx,
        ServiceOptions {
            socket: cli.interactive,
            script,
        },
    );

    let start = Instant::now();
    while let Ok(event) = rx.recv_blocking() {
        if !playground.update(event, start.elapsed()) {
            break;
        }
    }

    let carousel = playground.carousel();
    log::info!(
        "Stopped on child {:?} ({})",
        carousel.current_index(),
        carousel.phase()
    );
    Ok(())
}

fn send_command(cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to arcray at {}: {}. Is it running with --interactive?",
            SOCKET_PATH,
            e
        )
    })?;
    writeln!(stream, "{}", cmd)?;
    Ok(())
}
