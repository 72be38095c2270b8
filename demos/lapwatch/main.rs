//! Full-screen lapwatch.
//!
//! ```text
//! lapwatch --initial 90 --step 1 --log-file lapwatch.log
//! ```
//!
//! Logs go to `--log-file` only, since the terminal belongs to the UI. Set
//! `RUST_LOG=bubbletea_lapwatch=trace` to see every tick.

use bubbletea_lapwatch::prelude::*;
use bubbletea_rs::{Cmd, Model, Msg, Program};
use clap::Parser;
use lipgloss_extras::lipgloss::{Color, Style};
use once_cell::sync::OnceCell;
use std::fs::File;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "lapwatch", about = "Countdown stopwatch with laps")]
struct Args {
    /// Initial time in seconds
    #[arg(short, long, default_value_t = 60)]
    initial: u64,

    /// Seconds removed per tick
    #[arg(short, long, default_value = "1")]
    step: NonZeroU64,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

static CONFIG: OnceCell<CountdownConfig> = OnceCell::new();

struct App {
    lapwatch: TimerWidget,
    status: Option<String>,
}

impl Model for App {
    fn init() -> (Self, Option<Cmd>) {
        let config = CONFIG.get().copied().unwrap_or_default();
        let app = App {
            lapwatch: TimerWidget::with_config(config),
            status: None,
        };
        (app, None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let id = self.lapwatch.countdown().id();
        if let Some(lap) = msg.downcast_ref::<LapMsg>() {
            if lap.id == id {
                tracing::info!(index = lap.lap.index, overall = lap.lap.overall, "lap");
                self.status = Some(format!("Lap {} recorded", lap.lap.index));
            }
            return None;
        }
        if let Some(done) = msg.downcast_ref::<CompleteMsg>() {
            if done.id == id {
                tracing::info!("countdown finished");
                self.status = None;
            }
        }
        self.lapwatch.update(msg)
    }

    fn view(&self) -> String {
        let mut out = self.lapwatch.view();
        if let Some(status) = &self.status {
            out.push_str("\n\n");
            out.push_str(&Style::new().foreground(Color::from("#626262")).render(status));
        }
        out.push('\n');
        out
    }
}

fn init_logging(path: &Path) -> Result<WorkerGuard, std::io::Error> {
    let file = File::create(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Held until exit so buffered lines are flushed.
    let _guard = match &args.log_file {
        Some(path) => Some(init_logging(path)?),
        None => None,
    };

    let config = CountdownConfig {
        initial_time: args.initial,
        step: args.step,
    };
    tracing::info!(initial = config.initial_time, step = config.step.get(), "starting lapwatch");
    CONFIG
        .set(config)
        .map_err(|_| "configuration already set")?;

    let program = Program::<App>::builder().alt_screen(true).build()?;
    program.run().await?;

    Ok(())
}
