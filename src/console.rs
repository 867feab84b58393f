//! Interactive text front end driving a [`LineupSession`].

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::backend::{BroadcastChannel, LayoutStore};
use crate::drag::{DragGestures, DragState, DropOutcome, DropZone};
use crate::session::LineupSession;
use crate::sync::{LoadOutcome, SaveOutcome};
use crate::ui::render_lineup;

pub const HELP: &str = "\
Commands:
  pick <id>             start dragging a player
  drop <zone>           release over a zone (player-list or <row>-<col>)
  cancel                release over nothing
  move <id> <row>-<col> drag a player onto a cell
  return <id>           drag a player back to the roster
  rename <id> <name>    change a player's name
  save <name>           save the grid under a new name
  load <name>           replace the grid with a saved layout
  layouts               list saved layouts
  show                  print the lineup
  help                  print this help
  quit                  leave";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pick(String),
    Drop(String),
    Cancel,
    Move { id: String, row: usize, col: usize },
    Return(String),
    Rename { id: String, name: String },
    Save(String),
    Load(String),
    Layouts,
    Show,
    Help,
    Quit,
}

fn required<'a>(arg: Option<&'a str>, what: &str) -> Result<&'a str, String> {
    arg.map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| format!("Missing {}", what))
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        if line.is_empty() {
            return Err("Empty input".to_string());
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, Some(rest.trim())),
            None => (line, None),
        };
        match verb.to_ascii_lowercase().as_str() {
            "pick" => Ok(Command::Pick(required(rest, "player id")?.to_string())),
            "drop" => Ok(Command::Drop(required(rest, "zone id")?.to_string())),
            "cancel" => Ok(Command::Cancel),
            "move" => {
                let rest = required(rest, "player id and cell")?;
                let (id, cell) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "Usage: move <id> <row>-<col>".to_string())?;
                match DropZone::parse(cell) {
                    Some(DropZone::Cell { row, col }) => Ok(Command::Move {
                        id: id.to_string(),
                        row,
                        col,
                    }),
                    _ => Err(format!("Invalid cell '{}' - expected <row>-<col>", cell.trim())),
                }
            }
            "return" => Ok(Command::Return(required(rest, "player id")?.to_string())),
            "rename" => {
                let rest = required(rest, "player id and name")?;
                let (id, name) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "Usage: rename <id> <name>".to_string())?;
                Ok(Command::Rename {
                    id: id.to_string(),
                    name: name.trim().to_string(),
                })
            }
            "save" => Ok(Command::Save(required(rest, "layout name")?.to_string())),
            "load" => Ok(Command::Load(required(rest, "layout name")?.to_string())),
            "layouts" => Ok(Command::Layouts),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{}' - type help", other)),
        }
    }
}

fn describe(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Applied(m) => format!("{} {}", m.kind(), m.player_id()),
        DropOutcome::Rejected(e) => format!("Rejected: {}", e),
        DropOutcome::Cancelled => "Cancelled".to_string(),
    }
}

/// Run one command. Returns `false` when the console should exit.
pub async fn execute<C, L>(session: &mut LineupSession<C, L>, command: Command) -> bool
where
    C: BroadcastChannel,
    L: LayoutStore,
{
    match command {
        Command::Pick(id) => match session.on_pick_up(&id).await {
            Ok(()) => {
                if let DragState::Dragging(p) = session.drag_state() {
                    println!("Dragging {} {}", p.number, p.name);
                }
            }
            Err(e) => println!("{}", e),
        },
        Command::Drop(zone) => {
            let outcome = session.on_drop(Some(zone.as_str())).await;
            println!("{}", describe(&outcome));
        }
        Command::Cancel => {
            let outcome = session.on_drop(None).await;
            println!("{}", describe(&outcome));
        }
        Command::Move { id, row, col } => match session.move_player(&id, row, col).await {
            Ok(outcome) => println!("{}", describe(&outcome)),
            Err(e) => println!("{}", e),
        },
        Command::Return(id) => match session.return_player(&id).await {
            Ok(outcome) => println!("{}", describe(&outcome)),
            Err(e) => println!("{}", e),
        },
        Command::Rename { id, name } => {
            if let Err(e) = session.rename_player(&id, &name).await {
                println!("{}", e);
            }
        }
        Command::Save(name) => match session.save_layout(&name).await {
            SaveOutcome::Saved => println!("Saved '{}'", name.trim()),
            SaveOutcome::Alerted(alert) => println!("!! {}", alert),
            SaveOutcome::Failed => println!("Save failed, see log"),
        },
        Command::Load(name) => match session.load_layout(&name).await {
            LoadOutcome::Loaded(_) => println!("Loaded '{}'", name.trim()),
            LoadOutcome::Missing => println!("No layout named '{}'", name.trim()),
            LoadOutcome::Malformed | LoadOutcome::Failed => println!("Load failed, see log"),
        },
        Command::Layouts => {
            let names = session.refresh_layouts().await;
            if names.is_empty() {
                println!("No saved layouts");
            } else {
                println!("{}", names.join(", "));
            }
        }
        Command::Show => print!("{}", render_lineup(&session.state())),
        Command::Help => println!("{}", HELP),
        Command::Quit => return false,
    }
    true
}

/// Read commands from stdin while applying peer mutations as they arrive.
pub async fn run_console<C, L>(mut session: LineupSession<C, L>) -> anyhow::Result<()>
where
    C: BroadcastChannel,
    L: LayoutStore,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print!("{}", render_lineup(&session.state()));
    println!("Type help for commands.");
    let mut channel_open = true;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Ok(command) => {
                        if !execute(&mut session, command).await {
                            break;
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            applied = session.recv_remote(), if channel_open => {
                match applied {
                    Ok(true) => print!("{}", render_lineup(&session.state())),
                    Ok(false) => {}
                    Err(e) => {
                        log::error!("[console] sync channel lost: {}", e);
                        channel_open = false;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves_and_returns() {
        assert_eq!(
            Command::parse("move 15 2-1"),
            Ok(Command::Move {
                id: "15".to_string(),
                row: 2,
                col: 1
            })
        );
        assert_eq!(Command::parse("RETURN 6"), Ok(Command::Return("6".to_string())));
        assert_eq!(Command::parse("drop player-list"), Ok(Command::Drop("player-list".to_string())));
    }

    #[test]
    fn rename_keeps_spaces_in_name() {
        assert_eq!(
            Command::parse("rename 9 VAN DER BERG"),
            Ok(Command::Rename {
                id: "9".to_string(),
                name: "VAN DER BERG".to_string()
            })
        );
    }

    #[test]
    fn reports_bad_input() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("move 15").is_err());
        assert!(Command::parse("move 15 player-list").is_err());
        assert!(Command::parse("save").is_err());
        assert!(Command::parse("jump 3").is_err());
    }
}
