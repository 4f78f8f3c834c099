//! Line-oriented console front end.
//!
//! Each line maps to one coordinator command, the way a menu click or a
//! toolbar button would.

use maestro_engine::menu::{self, Menu};
use maestro_ipc::{ControlCommand, CoordinatorCommand, MenuAction};

pub const HELP: &str = "\
commands:
  play | next | prev | stop     control the active broadcaster
  select <id>                   switch broadcaster
  mini                          toggle the mini player
  back | forward                page history
  menu <item-id>                activate a menu item
  list                          show broadcasters
  quit";

/// What a console line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Send(CoordinatorCommand),
    List,
    Help,
    Quit,
}

/// Parse one console line. Unknown input yields `Err` with a message.
pub fn parse(line: &str, menus: &[Menu]) -> Result<Option<ConsoleInput>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();

    let input = match (word, argument) {
        ("play" | "pause", None) => control(ControlCommand::PlayPause),
        ("next", None) => control(ControlCommand::NextTrack),
        ("prev" | "previous", None) => control(ControlCommand::PreviousTrack),
        ("stop", None) => control(ControlCommand::Stop),
        ("select", Some(id)) => {
            ConsoleInput::Send(CoordinatorCommand::SelectBroadcaster(id.to_string()))
        }
        ("mini", None) => ConsoleInput::Send(CoordinatorCommand::Menu(MenuAction::ToggleMiniPlayer)),
        ("back", None) => ConsoleInput::Send(CoordinatorCommand::Menu(MenuAction::PreviousPage)),
        ("forward", None) => ConsoleInput::Send(CoordinatorCommand::Menu(MenuAction::NextPage)),
        ("menu", Some(id)) => match menu::action_for(menus, id) {
            Some(action) => ConsoleInput::Send(CoordinatorCommand::Menu(action)),
            None => return Err(format!("no menu item '{id}'")),
        },
        ("list", None) => ConsoleInput::List,
        ("help" | "?", None) => ConsoleInput::Help,
        ("quit" | "exit", None) => ConsoleInput::Quit,
        _ => return Err(format!("unrecognized input '{}'", line.trim())),
    };

    Ok(Some(input))
}

fn control(command: ControlCommand) -> ConsoleInput {
    ConsoleInput::Send(CoordinatorCommand::Control(command))
}
