use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Music,
    Gun,
    Bomb,
    PreAppearance,
    Appearance,
    Damage,
}

const CUE_COUNT: usize = 6;

impl Cue {
    const fn index(self) -> usize {
        match self {
            Cue::Music => 0,
            Cue::Gun => 1,
            Cue::Bomb => 2,
            Cue::PreAppearance => 3,
            Cue::Appearance => 4,
            Cue::Damage => 5,
        }
    }

    /// Fraction of the master volume each cue plays at.
    pub const fn volume_ratio(self) -> f32 {
        match self {
            Cue::Music => 1.0,
            Cue::Gun => 0.25,
            Cue::Bomb => 0.65,
            Cue::PreAppearance => 0.3,
            Cue::Appearance => 0.5,
            Cue::Damage => 1.0,
        }
    }

    const fn is_looping(self) -> bool {
        matches!(self, Cue::Music | Cue::Gun)
    }
}

/// Tracks which cues are playing and how often each one-shot was triggered.
/// There is no playback backend; every transition is reported through
/// `tracing` at debug level.
#[derive(Debug, Clone)]
pub struct SoundBoard {
    music_enabled: bool,
    volume: f32,
    playing: [bool; CUE_COUNT],
    trigger_counts: [u32; CUE_COUNT],
}

impl SoundBoard {
    pub fn new(music_enabled: bool) -> Self {
        Self {
            music_enabled,
            volume: 0.0,
            playing: [false; CUE_COUNT],
            trigger_counts: [0; CUE_COUNT],
        }
    }

    #[cfg(test)]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn cue_volume(&self, cue: Cue) -> f32 {
        self.volume * cue.volume_ratio()
    }

    pub fn is_playing(&self, cue: Cue) -> bool {
        self.playing[cue.index()]
    }

    #[cfg(test)]
    pub fn trigger_count(&self, cue: Cue) -> u32 {
        self.trigger_counts[cue.index()]
    }

    /// Music starts when the volume rises from zero and stops when it drops
    /// back to zero.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.volume == 0.0 && volume > 0.0 {
            self.start_music();
        } else if self.volume > 0.0 && volume == 0.0 {
            self.stop(Cue::Music);
        }
        self.volume = volume;
        debug!(volume, "sound_volume_set");
    }

    /// Starts the gun loop unless it is already running.
    pub fn play_gun(&mut self) {
        if !self.is_playing(Cue::Gun) {
            self.start(Cue::Gun);
        }
    }

    pub fn stop_gun(&mut self) {
        self.stop(Cue::Gun);
    }

    /// Plays a one-shot from the beginning, cutting off a running instance.
    pub fn play_restart(&mut self, cue: Cue) {
        if cue.is_looping() {
            debug!(?cue, "sound_restart_ignored_for_loop");
            return;
        }
        self.trigger_counts[cue.index()] = self.trigger_counts[cue.index()].saturating_add(1);
        debug!(?cue, volume = self.cue_volume(cue), "sound_cue");
    }

    pub fn stop_all(&mut self) {
        for cue in [Cue::Music, Cue::Gun] {
            self.stop(cue);
        }
    }

    fn start_music(&mut self) {
        if self.music_enabled {
            self.start(Cue::Music);
        }
    }

    fn start(&mut self, cue: Cue) {
        self.playing[cue.index()] = true;
        self.trigger_counts[cue.index()] = self.trigger_counts[cue.index()].saturating_add(1);
        debug!(?cue, volume = self.cue_volume(cue), "sound_loop_started");
    }

    fn stop(&mut self, cue: Cue) {
        if self.playing[cue.index()] {
            self.playing[cue.index()] = false;
            debug!(?cue, "sound_loop_stopped");
        }
    }
}
