use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::config::{SongOverride, SongTable};
use crate::frontend::Frontend;

/// Music bookkeeping that survives a save: the last song that replaced
/// the background tune.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SoundState {
    last_override: u16,
}

impl SoundState {
    pub fn last_override(&self) -> u16 {
        self.last_override
    }

    /// Non-positive songs stop the music. Songs mapped to a sound effect
    /// play it instead of touching the background tune.
    pub fn play_song<F: Frontend + ?Sized>(&mut self, song: i16, songs: &SongTable, frontend: &mut F) {
        if song <= 0 {
            frontend.stop_music();
            return;
        }
        let song = song as u16;
        let Some(entry) = songs.get(song) else {
            self.last_override = song;
            frontend.play_music(song);
            return;
        };
        if entry.sfx > 0 {
            frontend.play_sound(entry.sfx);
            return;
        }
        if entry.mode != SongOverride::Replace && self.last_override == song {
            log::debug!("sound: song {song} already playing");
            return;
        }
        self.last_override = song;
        frontend.play_music(entry.tunes.first().copied().unwrap_or(song));
    }

    /// Restarts the last override song, used after a restore.
    pub fn play_last_song<F: Frontend + ?Sized>(&mut self, songs: &SongTable, frontend: &mut F) {
        if self.last_override > 0 {
            let song = self.last_override;
            self.last_override = 0;
            self.play_song(song as i16, songs, frontend);
        }
    }

    pub fn write_state<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<BigEndian>(self.last_override)
    }

    pub fn read_state<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            last_override: reader.read_u16::<BigEndian>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SongEntry;
    use crate::frontend::HeadlessFrontend;

    fn table() -> SongTable {
        let mut songs = SongTable::default();
        songs.songs.insert(
            3,
            SongEntry {
                tunes: vec![40, 41],
                mode: SongOverride::KeepPlaying,
                sfx: 0,
            },
        );
        songs.songs.insert(
            9,
            SongEntry {
                tunes: Vec::new(),
                mode: SongOverride::Replace,
                sfx: 12,
            },
        );
        songs
    }

    #[test]
    fn songs_map_to_tunes_and_effects() {
        let songs = table();
        let mut sound = SoundState::default();
        let mut frontend = HeadlessFrontend::new();
        sound.play_song(3, &songs, &mut frontend);
        sound.play_song(3, &songs, &mut frontend);
        sound.play_song(9, &songs, &mut frontend);
        sound.play_song(77, &songs, &mut frontend);
        sound.play_song(-1, &songs, &mut frontend);
        assert_eq!(frontend.calls(), ["music 40", "sound 12", "music 77", "music stop"]);
        assert_eq!(sound.last_override(), 77);
    }

    #[test]
    fn last_song_survives_a_round_trip() {
        let songs = table();
        let mut sound = SoundState::default();
        let mut frontend = HeadlessFrontend::new();
        sound.play_song(3, &songs, &mut frontend);
        let mut bytes = Vec::new();
        sound.write_state(&mut bytes).unwrap();
        let mut restored = SoundState::read_state(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored, sound);
        restored.play_last_song(&songs, &mut frontend);
        assert_eq!(frontend.calls(), ["music 40", "music 40"]);
    }
}
