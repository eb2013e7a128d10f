//! # configtree demo application
//!
//! A sample CLI tool that edits a small nested configuration with
//! configtree. It exists to demonstrate and manually verify the library.
//!
//! ## Running
//!
//! | Feature               | How to exercise it                                                  |
//! |-----------------------|---------------------------------------------------------------------|
//! | Show the tree         | `cargo run --example configtree_demo -- -s`                          |
//! | List fields           | `cargo run --example configtree_demo -- -l`                          |
//! | Edit everything       | `cargo run --example configtree_demo`                                |
//! | Edit one section      | `cargo run --example configtree_demo -- colors.walls`                |
//! | One-shot assignment   | `cargo run --example configtree_demo -- age=43 colors.walls.east=#0f0` |
//! | Reset                 | `cargo run --example configtree_demo -- --reset`                     |
//! | Clean the store       | `cargo run --example configtree_demo -- -c`                          |
//! | Colored `--show`      | `cargo run --example configtree_demo --features color -- -s`         |
//! | Logs                  | `RUST_LOG=configtree=debug cargo run --example configtree_demo -- -s` |

mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use configtree::{Config, ConfigArgs, Lines, Render};

/// configtree demo: I manage your configuration.
///
/// With no argument, you are prompted for each field. Name a section or
/// field to edit only that part, or pass `path=value` pairs to set fields
/// directly.
#[derive(Parser, Debug)]
#[command(name = "configtree-demo")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

#[cfg(feature = "color")]
fn renderer() -> Box<dyn Render> {
    Box::new(configtree::ColorRender)
}

#[cfg(not(feature = "color"))]
fn renderer() -> Box<dyn Render> {
    Box::new(configtree::PlainRender)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let action = cli.config.into_action().unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });

    let mut config = Config::load(&config::declaration()).unwrap_or_else(|e| {
        eprintln!("Failed to load config:\n{e}");
        std::process::exit(1);
    });

    let mut lines = Lines::stdio();
    configtree::ops::handle_and_print(&mut config, &action, &mut lines, renderer().as_ref())
        .unwrap_or_else(|e| {
            eprintln!("Config error:\n{e}");
            std::process::exit(1);
        });
}
