use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

/// Playback state of the scripted background animation scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SceneFlag {
    #[default]
    Stop,
    Play,
    /// Finish the current cycle, then stop.
    RequestStop,
}

impl SceneFlag {
    pub fn code(self) -> u16 {
        match self {
            SceneFlag::Stop => 0,
            SceneFlag::Play => 1,
            SceneFlag::RequestStop => 2,
        }
    }

    pub fn from_code(code: u16) -> Option<SceneFlag> {
        match code {
            0 => Some(SceneFlag::Stop),
            1 => Some(SceneFlag::Play),
            2 => Some(SceneFlag::RequestStop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneState {
    pub flag: SceneFlag,
}

impl SceneState {
    pub fn play(&mut self) {
        self.flag = SceneFlag::Play;
    }

    pub fn request_stop(&mut self) {
        if self.flag == SceneFlag::Play {
            self.flag = SceneFlag::RequestStop;
        }
    }

    /// Advances a pending stop; called once per idle tick.
    pub fn update(&mut self) {
        if self.flag == SceneFlag::RequestStop {
            self.flag = SceneFlag::Stop;
        }
    }

    pub fn write_state<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<BigEndian>(self.flag.code())
    }

    pub fn read_state<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let code = reader.read_u16::<BigEndian>()?;
        let flag = SceneFlag::from_code(code).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, format!("unknown scene flag {code}"))
        })?;
        Ok(Self { flag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_request_completes_on_update() {
        let mut scene = SceneState::default();
        scene.request_stop();
        assert_eq!(scene.flag, SceneFlag::Stop);
        scene.play();
        scene.request_stop();
        assert_eq!(scene.flag, SceneFlag::RequestStop);
        scene.update();
        assert_eq!(scene.flag, SceneFlag::Stop);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let bytes = [0x00, 0x07];
        assert!(SceneState::read_state(&mut &bytes[..]).is_err());
        let bytes = [0x00, 0x02];
        assert_eq!(
            SceneState::read_state(&mut &bytes[..]).unwrap().flag,
            SceneFlag::RequestStop
        );
    }
}
