use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use walker_engine::nav::{
    find_path, MoveEvent, NavConfig, NavEvent, NavInput, NavKey, SessionSnapshot, TileCoord,
    Vec2, WorldSession,
};
use walker_engine::{load_catalog, Catalog, CatalogWorld, World};

pub const DEFAULT_ASSETS_DIR: &str = "assets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonOptions {
    pub assets_dir: PathBuf,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    List,
    Inspect {
        world: String,
    },
    Route {
        world: String,
        from: TileCoord,
        to: TileCoord,
    },
    Replay {
        world: String,
        script: PathBuf,
    },
}

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Click(TileCoord),
    Key(NavKey),
    Tick(Duration),
    Drag { from: Vec2, to: Vec2 },
    Resize { width: f32, height: f32 },
    Exit,
}

pub fn parse_script_commands(content: &str) -> Vec<String> {
    let mut commands = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        commands.push(trimmed.to_string());
    }
    commands
}

pub fn parse_script_command(line: &str) -> Result<ScriptCommand, String> {
    let mut parts = line.split_whitespace();
    let verb = parts
        .next()
        .ok_or_else(|| "empty script command".to_string())?;
    let args = parts.collect::<Vec<_>>();

    let command = match verb {
        "click" => {
            expect_arg_count(verb, &args, 2)?;
            ScriptCommand::Click(TileCoord::new(
                parse_number(verb, args[0])?,
                parse_number(verb, args[1])?,
            ))
        }
        "key" => {
            expect_arg_count(verb, &args, 1)?;
            let key = NavKey::from_code(args[0])
                .ok_or_else(|| format!("unknown key code '{}'", args[0]))?;
            ScriptCommand::Key(key)
        }
        "tick" => {
            expect_arg_count(verb, &args, 1)?;
            ScriptCommand::Tick(Duration::from_millis(parse_number(verb, args[0])?))
        }
        "drag" => {
            expect_arg_count(verb, &args, 4)?;
            ScriptCommand::Drag {
                from: Vec2::new(parse_number(verb, args[0])?, parse_number(verb, args[1])?),
                to: Vec2::new(parse_number(verb, args[2])?, parse_number(verb, args[3])?),
            }
        }
        "resize" => {
            expect_arg_count(verb, &args, 2)?;
            ScriptCommand::Resize {
                width: parse_number(verb, args[0])?,
                height: parse_number(verb, args[1])?,
            }
        }
        "exit" => {
            expect_arg_count(verb, &args, 0)?;
            ScriptCommand::Exit
        }
        other => return Err(format!("unknown script command '{other}'")),
    };
    Ok(command)
}

fn expect_arg_count(verb: &str, args: &[&str], expected: usize) -> Result<(), String> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(format!(
            "'{verb}' takes {expected} argument(s), got {}",
            args.len()
        ))
    }
}

fn parse_number<T: std::str::FromStr>(verb: &str, raw: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("invalid number '{raw}' for '{verb}'"))
}

pub fn run<W: Write>(kind: CommandKind, opts: &CommonOptions, stdout: &mut W) -> Result<(), String> {
    let catalog = load_catalog(&opts.assets_dir).map_err(|error| {
        format!(
            "failed to load catalog from '{}': {error}",
            opts.assets_dir.display()
        )
    })?;

    match kind {
        CommandKind::List => write_list(&catalog, stdout),
        CommandKind::Inspect { world } => {
            let entry = find_world(&catalog, &world)?;
            write_inspect(entry, stdout)
        }
        CommandKind::Route { world, from, to } => {
            let entry = find_world(&catalog, &world)?;
            write_route(&entry.world, from, to, stdout)
        }
        CommandKind::Replay { world, script } => {
            let entry = find_world(&catalog, &world)?;
            let content = read_script(&script)?;
            replay(entry, &content, stdout)
        }
    }
}

fn find_world<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a CatalogWorld, String> {
    catalog.find(id).ok_or_else(|| {
        let known = catalog
            .worlds()
            .iter()
            .map(|world| world.entry.id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown world '{id}' (known: {known})")
    })
}

fn read_script(path: &Path) -> Result<String, String> {
    fs::read_to_string(path)
        .map_err(|error| format!("failed to read script file '{}': {error}", path.display()))
}

fn write_list<W: Write>(catalog: &Catalog, out: &mut W) -> Result<(), String> {
    emit(out, &format!("fingerprint {}", catalog.fingerprint()))?;
    for (index, entry) in catalog.worlds().iter().enumerate() {
        let grid = entry.world.grid();
        emit(
            out,
            &format!(
                "{} {} {}x{} poi={} name=\"{}\"",
                index + 1,
                entry.entry.id,
                grid.cols(),
                grid.rows(),
                entry.world.overlay().len(),
                entry.entry.name
            ),
        )?;
    }
    Ok(())
}

fn write_inspect<W: Write>(entry: &CatalogWorld, out: &mut W) -> Result<(), String> {
    let world = &entry.world;
    let grid = world.grid();
    emit(out, &format!("world {} \"{}\"", world.id(), world.title()))?;
    emit(out, &format!("size {}x{}", grid.cols(), grid.rows()))?;
    emit(out, &format!("spawn {}", world.spawn()))?;
    emit(
        out,
        &format!("background {}", world.background().unwrap_or("none")),
    )?;
    emit(out, &format!("reachable {}", world.reachable_tiles()))?;
    for (at, content) in world.overlay().iter() {
        emit(
            out,
            &format!("poi {at} {} \"{}\"", content.id, content.title),
        )?;
    }
    emit(out, "map")?;
    for line in ascii_map(world) {
        emit(out, &line)?;
    }
    Ok(())
}

/// Layout rows with `@` on the spawn and `*` on points of interest.
fn ascii_map(world: &World) -> Vec<String> {
    let grid = world.grid();
    (0..grid.rows())
        .map(|y| {
            (0..grid.cols())
                .map(|x| {
                    let at = TileCoord::new(x as i32, y as i32);
                    if at == world.spawn() {
                        '@'
                    } else if world.overlay().contains(at) {
                        '*'
                    } else {
                        grid.tile_at(at).map_or('?', |kind| kind.code())
                    }
                })
                .collect()
        })
        .collect()
}

fn write_route<W: Write>(
    world: &World,
    from: TileCoord,
    to: TileCoord,
    out: &mut W,
) -> Result<(), String> {
    match find_path(world.grid(), world.overlay(), from, to) {
        Some(path) => {
            emit(out, &format!("steps {}", path.len()))?;
            if !path.is_empty() {
                emit(out, &format_path(&path))?;
            }
            Ok(())
        }
        None => emit(out, "unreachable"),
    }
}

fn replay<W: Write>(entry: &CatalogWorld, content: &str, out: &mut W) -> Result<(), String> {
    let mut commands = Vec::new();
    for (index, line) in parse_script_commands(content).into_iter().enumerate() {
        let command = parse_script_command(&line)
            .map_err(|error| format!("script command {} ('{line}'): {error}", index + 1))?;
        commands.push((line, command));
    }

    let mut session = WorldSession::enter(entry.world.clone(), NavConfig::default());
    for (line, command) in commands {
        let events = apply_script_command(&mut session, &command);
        emit(out, &format!("> {line}"))?;
        for event in &events {
            emit(out, &format!("  {}", format_event(event)))?;
        }
        if command == ScriptCommand::Exit {
            break;
        }
    }

    for line in format_snapshot(&session.snapshot()) {
        emit(out, &line)?;
    }
    session.exit();
    Ok(())
}

fn apply_script_command(session: &mut WorldSession, command: &ScriptCommand) -> Vec<NavEvent> {
    match command {
        ScriptCommand::Click(tile) => session.handle(NavInput::TileClicked(*tile)),
        ScriptCommand::Key(key) => session.handle(NavInput::KeyPressed(*key)),
        ScriptCommand::Tick(dt) => session.tick(*dt),
        ScriptCommand::Drag { from, to } => {
            let mut events = session.handle(NavInput::PointerDown(*from));
            events.extend(session.handle(NavInput::PointerMove(*to)));
            events.extend(session.handle(NavInput::PointerUp(*to)));
            events
        }
        ScriptCommand::Resize { width, height } => session.handle(NavInput::Resized {
            width: *width,
            height: *height,
        }),
        ScriptCommand::Exit => session.handle(NavInput::ExitRequested),
    }
}

pub fn format_event(event: &NavEvent) -> String {
    match event {
        NavEvent::Movement(MoveEvent::PathStarted { from, goal, steps }) => {
            format!("path_started from={from} goal={goal} steps={steps}")
        }
        NavEvent::Movement(MoveEvent::Moved { from, to }) => format!("moved {from} -> {to}"),
        NavEvent::Movement(MoveEvent::PathFinished { at }) => format!("path_finished at={at}"),
        NavEvent::Movement(MoveEvent::StepBlocked { at, target }) => {
            format!("step_blocked at={at} target={target}")
        }
        NavEvent::PanelOpened { at, content_id } => {
            format!("panel_opened at={at} content={content_id}")
        }
        NavEvent::PanelClosed { content_id } => format!("panel_closed content={content_id}"),
        NavEvent::ExitRequested => "exit_requested".to_string(),
        NavEvent::Panned { offset } => format!("panned offset={}", format_vec(*offset)),
    }
}

fn format_snapshot(snapshot: &SessionSnapshot) -> Vec<String> {
    vec![
        format!("position {}", snapshot.position),
        format!("locked {}", snapshot.locked),
        format!(
            "path {}",
            snapshot
                .active_path
                .as_deref()
                .map_or_else(|| "none".to_string(), format_path)
        ),
        format!(
            "panel {}",
            snapshot
                .open_panel
                .as_ref()
                .map_or("none", |entry| entry.id.as_str())
        ),
        format!("offset {}", format_vec(snapshot.offset)),
    ]
}

fn format_path(path: &[TileCoord]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_vec(value: Vec2) -> String {
    format!("({:.1}, {:.1})", value.x, value.y)
}

fn emit<W: Write>(out: &mut W, line: &str) -> Result<(), String> {
    writeln!(out, "{line}").map_err(|error| format!("failed to write output: {error}"))
}
