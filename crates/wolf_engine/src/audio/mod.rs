//! Audio registry and mixer
//!
//! Sounds are registered once by name with their source urls, base volume
//! and loop flag, then played by name through an [`AudioBackend`]. Playback
//! volume is the product of the sound's base volume, the volume passed to
//! [`SoundRegistry::play`] and the effective volume of its [`VolumeGroup`].
//!
//! Decoding and output belong to the backend; [`SilentBackend`] records
//! requests for hosts without audio and for tests.

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

/// Audio errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// No sound registered under this name
    #[error("Sound {0} not found")]
    SoundNotFound(String),

    /// Sound registered without any source url
    #[error("Sound {0} has no source")]
    NoSource(String),

    /// The backend could not play the sound
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Volume group categories for independent volume control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeGroup {
    /// Master volume (affects all sounds)
    Master,
    /// Sound effects
    Sfx,
    /// Background music
    Music,
    /// User interface sounds
    Ui,
}

/// Volume levels and mute state per group
#[derive(Debug, Clone)]
pub struct Mixer {
    volumes: HashMap<VolumeGroup, f32>,
    muted: HashMap<VolumeGroup, bool>,
}

impl Mixer {
    /// Every group at full volume
    pub fn new() -> Self {
        Self {
            volumes: HashMap::new(),
            muted: HashMap::new(),
        }
    }

    /// Set volume for a group, clamped to 0.0..=1.0
    pub fn set_volume(&mut self, group: VolumeGroup, volume: f32) {
        self.volumes.insert(group, volume.clamp(0.0, 1.0));
    }

    /// Volume of a group
    pub fn volume(&self, group: VolumeGroup) -> f32 {
        self.volumes.get(&group).copied().unwrap_or(1.0)
    }

    /// Mute or unmute a group
    pub fn set_muted(&mut self, group: VolumeGroup, muted: bool) {
        self.muted.insert(group, muted);
    }

    /// Whether a group is muted
    pub fn is_muted(&self, group: VolumeGroup) -> bool {
        self.muted.get(&group).copied().unwrap_or(false)
    }

    /// Group volume scaled by master, zero when either is muted
    pub fn effective_volume(&self, group: VolumeGroup) -> f32 {
        if self.is_muted(group) || self.is_muted(VolumeGroup::Master) {
            return 0.0;
        }
        if group == VolumeGroup::Master {
            return self.volume(group);
        }
        self.volume(group) * self.volume(VolumeGroup::Master)
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

/// Registered sound
#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    /// Source urls; the first one is played
    pub urls: Vec<String>,
    /// Base volume
    pub volume: f32,
    /// Whether playback loops by default
    pub looping: bool,
    /// Mixer group
    pub group: VolumeGroup,
}

/// Handle of a playing sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(pub u64);

/// Audio output
pub trait AudioBackend {
    /// Start playing `url`
    fn play(&mut self, url: &str, volume: f32, looping: bool)
        -> Result<PlaybackHandle, AudioError>;

    /// Stop a playing sound
    fn stop(&mut self, handle: PlaybackHandle) -> Result<(), AudioError>;
}

/// Sounds by name
#[derive(Debug, Clone, Default)]
pub struct SoundRegistry {
    sounds: HashMap<String, Sound>,
    mixer: Mixer,
}

impl SoundRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a sound effect
    pub fn register(
        &mut self,
        name: impl Into<String>,
        urls: impl IntoIterator<Item = impl Into<String>>,
        volume: f32,
        looping: bool,
    ) {
        self.register_in_group(name, urls, volume, looping, VolumeGroup::Sfx);
    }

    /// Register or replace a sound in a mixer group
    pub fn register_in_group(
        &mut self,
        name: impl Into<String>,
        urls: impl IntoIterator<Item = impl Into<String>>,
        volume: f32,
        looping: bool,
        group: VolumeGroup,
    ) {
        let name = name.into();
        debug!("Registered sound '{}'", name);
        self.sounds.insert(
            name,
            Sound {
                urls: urls.into_iter().map(Into::into).collect(),
                volume,
                looping,
                group,
            },
        );
    }

    /// Registered sound
    pub fn get(&self, name: &str) -> Option<&Sound> {
        self.sounds.get(name)
    }

    /// Whether a sound is registered
    pub fn contains(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    /// The mixer
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// The mixer, mutably
    pub fn mixer_mut(&mut self) -> &mut Mixer {
        &mut self.mixer
    }

    /// Play a registered sound; `looping` overrides the registered flag
    pub fn play(
        &self,
        backend: &mut dyn AudioBackend,
        name: &str,
        volume: f32,
        looping: Option<bool>,
    ) -> Result<PlaybackHandle, AudioError> {
        let sound = self
            .sounds
            .get(name)
            .ok_or_else(|| AudioError::SoundNotFound(name.to_string()))?;
        let url = sound
            .urls
            .first()
            .ok_or_else(|| AudioError::NoSource(name.to_string()))?;
        let volume = sound.volume * volume * self.mixer.effective_volume(sound.group);
        backend.play(url, volume, looping.unwrap_or(sound.looping))
    }
}

/// One request received by [`SilentBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    /// Handle returned for the request
    pub handle: PlaybackHandle,
    /// Source url
    pub url: String,
    /// Final volume
    pub volume: f32,
    /// Whether playback loops
    pub looping: bool,
}

/// Backend that records requests without producing sound
#[derive(Debug, Clone, Default)]
pub struct SilentBackend {
    next_handle: u64,
    played: Vec<PlayRequest>,
    playing: Vec<PlaybackHandle>,
}

impl SilentBackend {
    /// Empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Every play request so far
    pub fn played(&self) -> &[PlayRequest] {
        &self.played
    }

    /// Handles not stopped yet
    pub fn playing(&self) -> &[PlaybackHandle] {
        &self.playing
    }
}

impl AudioBackend for SilentBackend {
    fn play(
        &mut self,
        url: &str,
        volume: f32,
        looping: bool,
    ) -> Result<PlaybackHandle, AudioError> {
        self.next_handle += 1;
        let handle = PlaybackHandle(self.next_handle);
        self.played.push(PlayRequest {
            handle,
            url: url.to_string(),
            volume,
            looping,
        });
        self.playing.push(handle);
        Ok(handle)
    }

    fn stop(&mut self, handle: PlaybackHandle) -> Result<(), AudioError> {
        let before = self.playing.len();
        self.playing.retain(|&h| h != handle);
        if self.playing.len() == before {
            return Err(AudioError::PlaybackFailed(format!(
                "handle {} is not playing",
                handle.0
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_play_combines_volumes() {
        let mut sounds = SoundRegistry::new();
        sounds.register("laser", ["laser.ogg", "laser.mp3"], 0.5, false);
        sounds.mixer_mut().set_volume(VolumeGroup::Master, 0.8);
        sounds.mixer_mut().set_volume(VolumeGroup::Sfx, 0.5);

        let mut backend = SilentBackend::new();
        let handle = sounds.play(&mut backend, "laser", 1.0, Some(true)).unwrap();

        let request = &backend.played()[0];
        assert_eq!(request.handle, handle);
        assert_eq!(request.url, "laser.ogg");
        assert_relative_eq!(request.volume, 0.2);
        assert!(request.looping);
    }

    #[test]
    fn test_unknown_and_empty_sounds_fail() {
        let mut sounds = SoundRegistry::new();
        sounds.register("silence", Vec::<String>::new(), 1.0, false);
        let mut backend = SilentBackend::new();

        assert_eq!(
            sounds.play(&mut backend, "missing", 1.0, None),
            Err(AudioError::SoundNotFound("missing".to_string()))
        );
        assert_eq!(
            sounds.play(&mut backend, "silence", 1.0, None),
            Err(AudioError::NoSource("silence".to_string()))
        );
        assert!(backend.played().is_empty());
    }

    #[test]
    fn test_muted_group_plays_at_zero() {
        let mut mixer = Mixer::new();
        mixer.set_volume(VolumeGroup::Music, 1.5);
        assert_relative_eq!(mixer.volume(VolumeGroup::Music), 1.0);
        mixer.set_muted(VolumeGroup::Master, true);
        assert_relative_eq!(mixer.effective_volume(VolumeGroup::Music), 0.0);
        mixer.set_muted(VolumeGroup::Master, false);
        assert_relative_eq!(mixer.effective_volume(VolumeGroup::Music), 1.0);
    }
}
