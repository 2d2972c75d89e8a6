//! Discrete signals emitted while the player runs.
//!
//! Buffered per runtime and drained by the host with `take_events()`. Each
//! tick discards the events the previous tick already exposed.

use serde::{Deserialize, Serialize};

use crate::player::Repeat;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlayerEvent {
    /// An animation became current, possibly through an intro blend.
    Started { animation: String, blended: bool },
    /// A play-through completed. `remaining` is `None` on the final one.
    /// Endless animations report every loop of one tick at once in `laps`.
    PlaythroughEnded {
        animation: String,
        remaining: Option<Repeat>,
        laps: u64,
    },
    /// All repeats of an animation are done.
    Finished { animation: String },
    /// Playback was stopped explicitly.
    Stopped { animation: Option<String> },
}

impl PlayerEvent {
    pub fn animation(&self) -> Option<&str> {
        match self {
            PlayerEvent::Started { animation, .. }
            | PlayerEvent::PlaythroughEnded { animation, .. }
            | PlayerEvent::Finished { animation } => Some(animation),
            PlayerEvent::Stopped { animation } => animation.as_deref(),
        }
    }
}
