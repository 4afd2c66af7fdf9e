//! Collaborators the engine drives but does not implement: display, sprite
//! banks, audio, cutscene playback and input.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Button {
    Left,
    Right,
}

/// One player input, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputEvent {
    pub x: i16,
    pub y: i16,
    pub button: Button,
}

impl InputEvent {
    pub fn left(x: i16, y: i16) -> Self {
        Self {
            x,
            y,
            button: Button::Left,
        }
    }

    pub fn right(x: i16, y: i16) -> Self {
        Self {
            x,
            y,
            button: Button::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Speaker {
    Joe,
    Person(u16),
}

/// Flags raised by input handling and polled at walk steps and cutscene
/// lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Interrupts {
    pub cutaway_quit: bool,
    pub talk_quit: bool,
    pub quit: bool,
}

impl Interrupts {
    pub fn any(&self) -> bool {
        self.cutaway_quit || self.talk_quit || self.quit
    }
}

pub trait Frontend {
    fn render_room(&mut self, name: &str, room: u16);
    fn fade_in(&mut self, room: u16);
    fn fade_out(&mut self, room: u16);
    /// Plays a cutscene and returns the cutscene it chains to, if any.
    fn play_cutscene(&mut self, name: &str) -> Option<String>;
    fn play_dialogue(&mut self, name: &str);
    fn load_bank(&mut self, file: &str, bank: u16);
    /// The returned size is that of the frame now held in `dst_slot`.
    fn unpack_sprite_frame(&mut self, src_frame: u16, dst_slot: u16, bank: u16) -> FrameSize;
    fn play_sound(&mut self, id: u16);
    fn play_music(&mut self, tune: u16);
    fn stop_music(&mut self);
    fn speak(&mut self, text: &str, speaker: Speaker, voice: Option<&str>);
    fn special_move(&mut self, id: i16);
    fn poll_input(&mut self) -> Option<InputEvent>;
    /// Repaints one frame; input handling may raise interrupt flags.
    fn update(&mut self, interrupts: &mut Interrupts);
}

/// Frontend without a display. It records every call, replays queued
/// input, and follows configured cutscene chains.
#[derive(Debug, Default)]
pub struct HeadlessFrontend {
    calls: Vec<String>,
    inputs: VecDeque<InputEvent>,
    cutscene_links: HashMap<String, String>,
    frame_size: FrameSize,
    frames: u64,
    interrupt_at_frame: Option<u64>,
}

impl HeadlessFrontend {
    pub fn new() -> Self {
        Self {
            frame_size: FrameSize {
                width: 32,
                height: 64,
            },
            ..Self::default()
        }
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.inputs.push_back(event);
    }

    pub fn link_cutscene(&mut self, from: &str, to: &str) {
        self.cutscene_links
            .insert(from.to_ascii_uppercase(), to.to_string());
    }

    /// Raises `cutaway_quit` once `frame` display updates have happened.
    pub fn interrupt_at_frame(&mut self, frame: u64) {
        self.interrupt_at_frame = Some(frame);
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn record(&mut self, call: String) {
        log::trace!("frontend {call}");
        self.calls.push(call);
    }
}

impl Frontend for HeadlessFrontend {
    fn render_room(&mut self, name: &str, room: u16) {
        self.record(format!("render_room {name} {room}"));
    }

    fn fade_in(&mut self, room: u16) {
        self.record(format!("fade_in {room}"));
    }

    fn fade_out(&mut self, room: u16) {
        self.record(format!("fade_out {room}"));
    }

    fn play_cutscene(&mut self, name: &str) -> Option<String> {
        self.record(format!("cutscene {name}"));
        self.cutscene_links.get(&name.to_ascii_uppercase()).cloned()
    }

    fn play_dialogue(&mut self, name: &str) {
        self.record(format!("dialogue {name}"));
    }

    fn load_bank(&mut self, file: &str, bank: u16) {
        self.record(format!("load_bank {file} {bank}"));
    }

    fn unpack_sprite_frame(&mut self, src_frame: u16, dst_slot: u16, bank: u16) -> FrameSize {
        self.record(format!("unpack {src_frame} {dst_slot} {bank}"));
        self.frame_size
    }

    fn play_sound(&mut self, id: u16) {
        self.record(format!("sound {id}"));
    }

    fn play_music(&mut self, tune: u16) {
        self.record(format!("music {tune}"));
    }

    fn stop_music(&mut self) {
        self.record("music stop".to_string());
    }

    fn speak(&mut self, text: &str, speaker: Speaker, voice: Option<&str>) {
        let who = match speaker {
            Speaker::Joe => "joe".to_string(),
            Speaker::Person(object) => format!("person {object}"),
        };
        match voice {
            Some(voice) => self.record(format!("speak {who} [{voice}] {text}")),
            None => self.record(format!("speak {who} {text}")),
        }
    }

    fn special_move(&mut self, id: i16) {
        self.record(format!("special_move {id}"));
    }

    fn poll_input(&mut self) -> Option<InputEvent> {
        self.inputs.pop_front()
    }

    fn update(&mut self, interrupts: &mut Interrupts) {
        self.frames += 1;
        if self.interrupt_at_frame == Some(self.frames) {
            interrupts.cutaway_quit = true;
        }
    }
}
