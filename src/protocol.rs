//! Ultra Text Protocol (UTP): a line-oriented command loop for front ends.
//!
//! The protocol follows the conventions of the Go Text Protocol: every
//! command line may start with a numeric id, a success is answered with
//! `=[id] response` and a failure with `?[id] message`, each followed by a
//! blank line. Moves use the global notation of [`crate::board`] (`e5`).
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `clear_board [x|o]` - Start a new game, `x` moving first by default
//! - `depth <n>` - Set the search depth (1..=10)
//! - `play <side> <move>` - Play a move for the side to move
//! - `genmove <side>` - Search, play and print a move
//! - `undo` - Take back the last move
//! - `showboard` - Print the board, whose turn it is and the moves so far
//! - `legal_moves` - List the legal moves
//! - `evaluate` - Static evaluation of the current board
//! - `final_status` - `X wins`, `O wins`, `draw` or `undecided`
//!
//! ## Example
//!
//! ```
//! use ultra_ttt::protocol::UtpEngine;
//!
//! let mut engine = UtpEngine::with_depth(2);
//! let mut out = Vec::new();
//! engine.run("1 play x e5\n2 genmove o\n".as_bytes(), &mut out).unwrap();
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.contains("=1"));
//! assert!(text.contains("=2 "));
//! ```

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{trace, warn};

use crate::board::{Move, Side};
use crate::constants::{DEFAULT_DEPTH, MAX_DEPTH, MIN_DEPTH};
use crate::position::Game;
use crate::search::Searcher;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "clear_board",
    "depth",
    "evaluate",
    "final_status",
    "genmove",
    "known_command",
    "legal_moves",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "undo",
    "version",
];

/// Reply to one command: `Ok` for `=`, `Err` for `?`.
type Reply = std::result::Result<String, String>;

/// Protocol engine state.
pub struct UtpEngine {
    /// Current game
    game: Game,
    /// Search depth used by `genmove`
    depth: u32,
    searcher: Searcher,
}

impl Default for UtpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UtpEngine {
    /// Create an engine searching at the default depth.
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_DEPTH)
    }

    /// Create an engine searching `depth` plies per move.
    pub fn with_depth(depth: u32) -> Self {
        Self {
            game: Game::default(),
            depth: depth.clamp(MIN_DEPTH, MAX_DEPTH),
            searcher: Searcher::new(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            trace!(?id, %command, ?args, "command");

            let reply = self.execute(&command, args);
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            let written = match reply {
                Ok(message) => writeln!(output, "={id_str} {message}\n"),
                Err(message) => {
                    warn!(%command, %message, "command failed");
                    writeln!(output, "?{id_str} {message}\n")
                }
            };
            written.context("failed to write response")?;
            output.flush().context("failed to flush response")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional numeric command id from the start of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    fn parse_side(arg: Option<&&str>) -> std::result::Result<Side, String> {
        let arg = arg.ok_or("missing argument")?;
        arg.parse::<Side>().map_err(|e| e.to_string())
    }

    /// Execute one command.
    fn execute(&mut self, command: &str, args: &[&str]) -> Reply {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok("1".to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let cmd = args.first().ok_or("missing argument")?;
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "clear_board" => {
                let first = if args.is_empty() {
                    Side::X
                } else {
                    Self::parse_side(args.first())?
                };
                self.game.clear(first);
                Ok(String::new())
            }

            "depth" => {
                let arg = args.first().ok_or("missing argument")?;
                match arg.parse::<u32>() {
                    Ok(depth) if (MIN_DEPTH..=MAX_DEPTH).contains(&depth) => {
                        self.depth = depth;
                        Ok(String::new())
                    }
                    Ok(depth) => Err(format!(
                        "depth {depth} is outside {MIN_DEPTH}..={MAX_DEPTH}"
                    )),
                    Err(_) => Err("invalid depth".to_string()),
                }
            }

            "play" => {
                if args.len() < 2 {
                    return Err("missing arguments".to_string());
                }
                let side = Self::parse_side(args.first())?;
                let mv: Move = args[1].parse().map_err(|e: crate::EngineError| e.to_string())?;
                self.game.play(side, mv).map_err(|e| e.to_string())?;
                Ok(String::new())
            }

            "genmove" => {
                let side = Self::parse_side(args.first())?;
                if side != self.game.to_move() {
                    return Err(format!("it is {}'s turn", self.game.to_move()));
                }
                if self.game.is_over() {
                    return Err(format!("game is over: {}", self.game.outcome()));
                }

                let game = &self.game;
                let result = self
                    .searcher
                    .search(game.board(), game.active(), side, self.depth)
                    .map_err(|e| e.to_string())?;
                let Some(mv) = result.best_move else {
                    return Ok("none".to_string());
                };
                self.game.play(side, mv).map_err(|e| e.to_string())?;
                Ok(mv.to_string())
            }

            "undo" => match self.game.undo() {
                Some(_) => Ok(String::new()),
                None => Err("nothing to undo".to_string()),
            },

            "showboard" => {
                let history = self
                    .game
                    .moves()
                    .map(|(side, mv)| format!("{side} {mv}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(format!(
                    "\n{}to move: {}, active: {}, status: {}\nmoves: {}",
                    self.game.board(),
                    self.game.to_move(),
                    self.game.active(),
                    self.game.outcome(),
                    if history.is_empty() { "none" } else { history.as_str() }
                ))
            }

            "legal_moves" => Ok(self
                .game
                .legal_moves()
                .iter()
                .map(Move::to_string)
                .collect::<Vec<_>>()
                .join(" ")),

            "evaluate" => Ok(format!(
                "{:.1}",
                self.searcher.evaluator().evaluate(self.game.board())
            )),

            "final_status" => Ok(self.game.outcome().to_string()),

            _ => Err(format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{ActiveBoard, Pos};

    fn run_script(engine: &mut UtpEngine, script: &str) -> String {
        let mut out = Vec::new();
        engine.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = UtpEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = UtpEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut engine = UtpEngine::new();
        assert_eq!(engine.execute("name", &[]), Ok("ultra-ttt".to_string()));
    }

    #[test]
    fn test_known_command() {
        let mut engine = UtpEngine::new();
        assert_eq!(engine.execute("known_command", &["genmove"]), Ok("true".to_string()));
        assert_eq!(engine.execute("known_command", &["komi"]), Ok("false".to_string()));
        assert!(engine.execute("known_command", &[]).is_err());
    }

    #[test]
    fn test_depth_command() {
        let mut engine = UtpEngine::new();
        assert!(engine.execute("depth", &["3"]).is_ok());
        assert_eq!(engine.depth, 3);
        assert!(engine.execute("depth", &["0"]).is_err());
        assert!(engine.execute("depth", &["11"]).is_err());
        assert!(engine.execute("depth", &["deep"]).is_err());
        assert_eq!(engine.depth, 3);
    }

    #[test]
    fn test_play_and_clear() {
        let mut engine = UtpEngine::with_depth(1);
        assert!(engine.execute("play", &["x", "a1"]).is_ok());
        assert_eq!(engine.game().active(), ActiveBoard::At(Pos::new(0, 0).unwrap()));

        // Wrong subboard, wrong side, occupied
        assert!(engine.execute("play", &["o", "e5"]).is_err());
        assert!(engine.execute("play", &["x", "b1"]).is_err());
        assert!(engine.execute("play", &["o", "a1"]).is_err());

        assert!(engine.execute("clear_board", &["o"]).is_ok());
        assert_eq!(engine.game().move_count(), 0);
        assert_eq!(engine.game().to_move(), Side::O);
    }

    #[test]
    fn test_showboard_lists_moves() {
        let mut engine = UtpEngine::with_depth(1);
        let empty = engine.execute("showboard", &[]).unwrap();
        assert!(empty.ends_with("moves: none"));

        engine.execute("play", &["x", "e5"]).unwrap();
        engine.execute("play", &["o", "d4"]).unwrap();
        let reply = engine.execute("showboard", &[]).unwrap();
        assert!(reply.contains("to move: X"));
        assert!(reply.ends_with("moves: X e5, O d4"));
    }

    #[test]
    fn test_genmove_plays_in_active_subboard() {
        let mut engine = UtpEngine::with_depth(2);
        engine.execute("play", &["x", "e5"]).unwrap();
        let reply = engine.execute("genmove", &["o"]).unwrap();
        let mv: Move = reply.parse().unwrap();
        assert_eq!(mv.board, Pos::CENTER);
        assert_eq!(engine.game().move_count(), 2);
        assert!(engine.execute("genmove", &["o"]).is_err());
    }

    #[test]
    fn test_run_formats_responses() {
        let mut engine = UtpEngine::with_depth(1);
        let text = run_script(&mut engine, "# comment\n7 name\nbogus\nundo\nquit\nname\n");
        assert!(text.contains("=7 ultra-ttt\n\n"));
        assert!(text.contains("? unknown command: bogus\n\n"));
        assert!(text.contains("? nothing to undo\n\n"));
        // Nothing after quit is processed
        assert_eq!(text.matches("ultra-ttt").count(), 1);
    }
}
