//! Per-tick input snapshots
//!
//! "Pressed" fields are edge-triggered (true only on the tick the key went
//! down); "held" fields are level-triggered. Key mapping lives outside the
//! crate; the host fills these structs each frame.

use serde::{Deserialize, Serialize};

/// One player's controls for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    /// Held up (climb through one-way ledges while rising)
    pub up: bool,
    pub down: bool,
    /// Jump pressed this tick
    pub jump: bool,
    /// Shoot pressed this tick
    pub shoot_pressed: bool,
    /// Shoot currently held (auto-fire, gated by cooldown)
    pub shoot_held: bool,
}

impl PlayerInput {
    pub fn wants_shot(&self) -> bool {
        self.shoot_pressed || self.shoot_held
    }
}

/// Menu navigation for a single tick (all edge-triggered)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuInput {
    pub up: bool,
    pub down: bool,
    pub confirm: bool,
    pub back: bool,
    /// Direct one-player start
    pub select_one: bool,
    /// Direct two-player start
    pub select_two: bool,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub players: [PlayerInput; 2],
    pub menu: MenuInput,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Input for player `num` (1-based); absent slots read as idle
    pub fn player(&self, num: u8) -> PlayerInput {
        match num {
            1 | 2 => self.players[(num - 1) as usize],
            _ => PlayerInput::default(),
        }
    }

    pub fn with_player(mut self, num: u8, input: PlayerInput) -> Self {
        if let 1 | 2 = num {
            self.players[(num - 1) as usize] = input;
        }
        self
    }

    pub fn confirm() -> Self {
        Self {
            menu: MenuInput {
                confirm: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn pause() -> Self {
        Self {
            pause: true,
            ..Default::default()
        }
    }
}

/// Input collaborator: produces the snapshot for the current frame
pub trait InputSource {
    fn player_input(&mut self, player_num: u8) -> PlayerInput;
    fn menu_input(&mut self) -> MenuInput;
    fn pause_pressed(&mut self) -> bool;

    /// Gather everything the session needs for one tick
    fn snapshot(&mut self) -> TickInput {
        TickInput {
            players: [self.player_input(1), self.player_input(2)],
            menu: self.menu_input(),
            pause: self.pause_pressed(),
        }
    }
}

/// Plays back a fixed list of tick inputs, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: Vec<TickInput>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(frames: Vec<TickInput>) -> Self {
        Self { frames, cursor: 0 }
    }

    fn current(&self) -> TickInput {
        self.frames.get(self.cursor).copied().unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn player_input(&mut self, player_num: u8) -> PlayerInput {
        self.current().player(player_num)
    }

    fn menu_input(&mut self) -> MenuInput {
        self.current().menu
    }

    fn pause_pressed(&mut self) -> bool {
        self.current().pause
    }

    fn snapshot(&mut self) -> TickInput {
        let input = self.current();
        self.cursor += 1;
        input
    }
}
