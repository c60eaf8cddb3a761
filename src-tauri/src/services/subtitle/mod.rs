//! Floating subtitle captions for pet replies.
//!
//! `split` cuts a reply into clause fragments, `machine` sequences them as a
//! pure state machine that emits effects, and `manager` carries those effects
//! out on the caption/input windows with runtime timers.

mod machine;
mod manager;
mod split;

pub use machine::{
    CaptionEffect, JitterSource, RandomJitter, SubtitleMachine, SubtitleState, DEFAULT_INPUT_SIZE,
    DEFAULT_INTERVAL, FADE_DURATION, LINGER_DELAY,
};
pub use manager::{
    SubtitleManager, SubtitleOpacityPayload, SubtitleTextPayload, EVT_SUBTITLE_FOCUS_INPUT,
    EVT_SUBTITLE_OPACITY, EVT_SUBTITLE_TEXT,
};
pub use split::split_sentences;
