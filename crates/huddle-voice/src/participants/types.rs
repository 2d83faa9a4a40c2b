use std::fmt;

/// Transport-assigned id, stable for the duration of one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One member of the call, local or remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    pub is_local: bool,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub is_screen_sharing: bool,
    /// Filled in from the speaking detector when a snapshot is taken.
    pub is_speaking: bool,
}

impl Participant {
    /// A remote participant with audio on and nothing else.
    pub fn remote(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(id),
            display_name: display_name.into(),
            is_local: false,
            audio_enabled: true,
            video_enabled: false,
            is_screen_sharing: false,
            is_speaking: false,
        }
    }

    pub fn local(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            is_local: true,
            ..Self::remote(id, display_name)
        }
    }

    /// Apply the fields present in `update`, leaving the rest untouched.
    pub fn merge(&mut self, update: &ParticipantUpdate) {
        if let Some(name) = &update.display_name {
            self.display_name = name.clone();
        }
        if let Some(audio) = update.audio_enabled {
            self.audio_enabled = audio;
        }
        if let Some(video) = update.video_enabled {
            self.video_enabled = video;
        }
        if let Some(sharing) = update.is_screen_sharing {
            self.is_screen_sharing = sharing;
        }
    }
}

/// Partial participant state carried by a "participant updated" event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantUpdate {
    pub id: ParticipantId,
    pub display_name: Option<String>,
    pub audio_enabled: Option<bool>,
    pub video_enabled: Option<bool>,
    pub is_screen_sharing: Option<bool>,
}

impl ParticipantUpdate {
    pub fn new(id: impl Into<ParticipantId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn audio(mut self, enabled: bool) -> Self {
        self.audio_enabled = Some(enabled);
        self
    }

    pub fn video(mut self, enabled: bool) -> Self {
        self.video_enabled = Some(enabled);
        self
    }

    pub fn screen_sharing(mut self, sharing: bool) -> Self {
        self.is_screen_sharing = Some(sharing);
        self
    }
}
