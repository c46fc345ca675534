use glam::Vec2;
use serde::Deserialize;
use std::{fs, path::Path};
use tilecraft_world::{Binding, InputSnapshot};

#[derive(Debug, Deserialize)]
struct ScriptedInputFile {
    steps: Vec<ScriptedStep>,
}

/// One step of a script. Held keys stay down for the whole step; one-shot
/// actions are pressed on the first frame of the step only.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct ScriptedStep {
    duration: f32,
    left: bool,
    right: bool,
    jump: bool,
    run: bool,
    mine: bool,
    place: bool,
    spawn_npc: bool,
    fire: bool,
    hotbar: Option<u8>,
    scroll: i32,
    /// Cursor offset from the player centre, in tiles.
    aim: Option<[f32; 2]>,
}

pub struct ScriptedInputPlayer {
    steps: Vec<ScriptedStep>,
    index: usize,
    time_in_step: f32,
    entered: bool,
    finished: bool,
}

impl ScriptedInputPlayer {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let file: ScriptedInputFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("scripted input file contains no steps");
        }
        Ok(Self {
            steps: file.steps,
            index: 0,
            time_in_step: 0.0,
            entered: true,
            finished: false,
        })
    }

    /// All steps have played out; the last step keeps its held keys.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Input for the next frame. `player_center` anchors the aim offset.
    pub fn advance(&mut self, dt: f32, player_center: Vec2) -> InputSnapshot {
        let fresh = std::mem::take(&mut self.entered);
        let step = self.steps.get(self.index).cloned().unwrap_or_default();

        self.time_in_step += dt;
        while !self.finished && self.time_in_step >= self.steps[self.index].duration {
            self.time_in_step -= self.steps[self.index].duration;
            if self.index + 1 < self.steps.len() {
                self.index += 1;
                self.entered = true;
            } else {
                self.time_in_step = 0.0;
                self.finished = true;
            }
        }

        step.into_snapshot(fresh, player_center)
    }
}

impl ScriptedStep {
    fn into_snapshot(self, fresh: bool, player_center: Vec2) -> InputSnapshot {
        let mut input = InputSnapshot::new();
        for (on, binding) in [
            (self.left, Binding::MoveLeft),
            (self.right, Binding::MoveRight),
            (self.jump, Binding::Jump),
            (self.run, Binding::Run),
        ] {
            if on {
                input = input.hold(binding);
            }
        }
        if let Some(aim) = self.aim {
            input = input.with_cursor(player_center + Vec2::from_array(aim));
        }
        if !fresh {
            return input;
        }

        for (on, binding) in [
            (self.mine, Binding::Mine),
            (self.place, Binding::Place),
            (self.spawn_npc, Binding::SpawnNpc),
            (self.fire, Binding::Fire),
        ] {
            if on {
                input = input.press(binding);
            }
        }
        if let Some(slot) = self.hotbar {
            input = input.press(Binding::Hotbar(slot));
        }
        input.with_scroll(self.scroll)
    }
}
