use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use walker_cli::{run, CommandKind, CommonOptions};
use walker_engine::nav::TileCoord;
use walker_engine::resolve_app_paths;

fn main() -> ExitCode {
    init_tracing();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let mut assets_dir: Option<PathBuf> = None;
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--assets" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --assets".to_string())?;
                assets_dir = Some(PathBuf::from(value));
                index += 2;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let kind = match command {
        "list" => {
            if !command_args.is_empty() {
                return Err("list takes no arguments".to_string());
            }
            CommandKind::List
        }
        "inspect" => {
            let [world] = command_args else {
                return Err("inspect requires exactly one world id".to_string());
            };
            CommandKind::Inspect {
                world: world.clone(),
            }
        }
        "route" => {
            let [world, x1, y1, x2, y2] = command_args else {
                return Err("route requires <world> <x1> <y1> <x2> <y2>".to_string());
            };
            CommandKind::Route {
                world: world.clone(),
                from: TileCoord::new(parse_coord("x1", x1)?, parse_coord("y1", y1)?),
                to: TileCoord::new(parse_coord("x2", x2)?, parse_coord("y2", y2)?),
            }
        }
        "replay" => {
            let [world, script] = command_args else {
                return Err("replay requires <world> <script>".to_string());
            };
            CommandKind::Replay {
                world: world.clone(),
                script: PathBuf::from(script),
            }
        }
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    let options = CommonOptions {
        assets_dir: assets_dir.unwrap_or_else(default_assets_dir),
    };
    run(kind, &options, &mut io::stdout())
}

fn parse_coord(name: &str, value: &str) -> Result<i32, String> {
    value
        .parse::<i32>()
        .map_err(|_| format!("invalid {name} value '{value}' (expected i32)"))
}

/// Project assets when the root can be located, else `./assets`.
fn default_assets_dir() -> PathBuf {
    resolve_app_paths()
        .map(|paths| paths.assets_dir)
        .unwrap_or_else(|_| CommonOptions::default().assets_dir)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "walker_cli - inspect and replay Source Walker worlds",
        "",
        "Usage:",
        "  walker_cli [--assets <dir>] list",
        "  walker_cli [--assets <dir>] inspect <world>",
        "  walker_cli [--assets <dir>] route <world> <x1> <y1> <x2> <y2>",
        "  walker_cli [--assets <dir>] replay <world> <script>",
        "",
        "Replay script lines:",
        "  click <x> <y> | key <code> | tick <ms> | drag <x0> <y0> <x1> <y1>",
        "  resize <w> <h> | exit        (# starts a comment)",
        "",
        "Defaults:",
        "  --assets <project root>/assets",
    ]
    .join("\n")
}
