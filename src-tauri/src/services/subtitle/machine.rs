use std::ops::RangeInclusive;
use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::services::anchor_layout::{place_below, place_beside, Point, Rect, Size};

use super::split::split_sentences;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2500);
pub const FADE_DURATION: Duration = Duration::from_millis(300);
/// How long the last fragment stays up before fading out.
pub const LINGER_DELAY: Duration = Duration::from_millis(3000);
const MIN_INTERVAL: Duration = Duration::from_millis(100);

pub const CAPTION_GAP: f64 = 5.0;
pub const INPUT_GAP: f64 = 5.0;
pub const JITTER_X: RangeInclusive<i32> = -20..=30;
pub const JITTER_Y: RangeInclusive<i32> = -30..=20;
/// Text field plus send button.
pub const DEFAULT_INPUT_SIZE: Size = Size {
    width: 185.0,
    height: 30.0,
};

/// Source of the caption's per-update placement offset.
pub trait JitterSource: Send {
    fn next_offset(&mut self) -> (i32, i32);
}

pub struct RandomJitter {
    rng: StdRng,
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl JitterSource for RandomJitter {
    fn next_offset(&mut self) -> (i32, i32) {
        (self.rng.gen_range(JITTER_X), self.rng.gen_range(JITTER_Y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleState {
    Idle,
    /// Fragment `index` is on screen; the ticker may or may not be armed.
    Showing { index: usize },
    /// Last fragment is on screen and the delayed hide is pending.
    Waiting,
    Fading,
    Hidden,
}

/// Side effects the runtime must carry out, in order.
///
/// `epoch` values must be handed back unchanged to `tick`, `linger_elapsed`
/// and `fade_finished`; events from an older epoch are ignored. `StopTicker`
/// only stops the ticker started for the same epoch.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionEffect {
    SetOpacity(f64),
    SetText(String),
    FadeIn(Duration),
    FadeOut(Duration),
    HideCaption,
    MoveCaption(Point),
    MoveInput(Point),
    ShowInput,
    HideInput,
    FocusInput,
    StartTicker { epoch: u64, interval: Duration },
    StopTicker { epoch: u64 },
    ScheduleHide { epoch: u64, delay: Duration },
    ScheduleFadeEnd { epoch: u64, after: Duration },
}

pub struct SubtitleMachine<J: JitterSource = RandomJitter> {
    sentences: Vec<String>,
    cursor: usize,
    state: SubtitleState,
    epoch: u64,
    ticker_armed: bool,
    input_visible: bool,
    /// Bumped by every `hide`; replies requested before it are dropped.
    session: u64,
    anchor: Option<Rect>,
    input_size: Size,
    jitter: J,
}

impl Default for SubtitleMachine<RandomJitter> {
    fn default() -> Self {
        Self::new(RandomJitter::default())
    }
}

impl<J: JitterSource> SubtitleMachine<J> {
    pub fn new(jitter: J) -> Self {
        Self {
            sentences: Vec::new(),
            cursor: 0,
            state: SubtitleState::Idle,
            epoch: 0,
            ticker_armed: false,
            input_visible: false,
            session: 0,
            anchor: None,
            input_size: DEFAULT_INPUT_SIZE,
            jitter,
        }
    }

    pub fn state(&self) -> SubtitleState {
        self.state
    }

    #[cfg(test)]
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    #[cfg(test)]
    pub fn current_sentence(&self) -> Option<&str> {
        match self.state {
            SubtitleState::Showing { index } => self.sentences.get(index).map(String::as_str),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_ticker_armed(&self) -> bool {
        self.ticker_armed
    }

    /// Subtitle mode counts as visible while its input window is up.
    pub fn is_visible(&self) -> bool {
        self.input_visible
    }

    pub fn is_caption_visible(&self) -> bool {
        matches!(
            self.state,
            SubtitleState::Showing { .. } | SubtitleState::Waiting | SubtitleState::Fading
        )
    }

    /// Start displaying `text`, replacing whatever utterance was queued.
    ///
    /// Text without any fragment leaves the current sequence untouched.
    pub fn show(&mut self, text: &str, interval: Duration) -> Vec<CaptionEffect> {
        let sentences = split_sentences(text);
        let mut effects = Vec::new();
        if sentences.is_empty() {
            return effects;
        }

        self.sentences = sentences;
        self.cursor = 0;

        if self.ticker_armed {
            self.ticker_armed = false;
            effects.push(CaptionEffect::StopTicker { epoch: self.epoch });
        }
        self.epoch += 1;

        self.display(0, &mut effects);

        // A single fragment stays up until hidden explicitly.
        if self.sentences.len() > 1 {
            self.ticker_armed = true;
            effects.push(CaptionEffect::StartTicker {
                epoch: self.epoch,
                interval: interval.max(MIN_INTERVAL),
            });
        }
        effects
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// `show` for a reply requested during `session`. Dropped if the
    /// subtitles were hidden since, or the input is no longer up.
    pub fn show_reply(
        &mut self,
        session: u64,
        text: &str,
        interval: Duration,
    ) -> Option<Vec<CaptionEffect>> {
        if session != self.session || !self.input_visible {
            return None;
        }
        Some(self.show(text, interval))
    }

    pub fn tick(&mut self, epoch: u64) -> Vec<CaptionEffect> {
        let mut effects = Vec::new();
        if epoch != self.epoch || !self.ticker_armed {
            return effects;
        }

        self.cursor += 1;
        if self.cursor < self.sentences.len() {
            self.display(self.cursor, &mut effects);
        } else {
            self.ticker_armed = false;
            self.state = SubtitleState::Waiting;
            effects.push(CaptionEffect::StopTicker { epoch: self.epoch });
            effects.push(CaptionEffect::ScheduleHide {
                epoch: self.epoch,
                delay: LINGER_DELAY,
            });
        }
        effects
    }

    pub fn linger_elapsed(&mut self, epoch: u64) -> Vec<CaptionEffect> {
        let mut effects = Vec::new();
        if epoch == self.epoch && self.state == SubtitleState::Waiting {
            self.begin_fade_out(&mut effects);
        }
        effects
    }

    pub fn fade_finished(&mut self, epoch: u64) -> Vec<CaptionEffect> {
        let mut effects = Vec::new();
        if epoch == self.epoch && self.state == SubtitleState::Fading {
            self.state = SubtitleState::Hidden;
            effects.push(CaptionEffect::HideCaption);
        }
        effects
    }

    /// Stop the sequence, fade the caption out and hide the input window.
    pub fn hide(&mut self) -> Vec<CaptionEffect> {
        let mut effects = Vec::new();
        self.session += 1;

        if self.ticker_armed {
            self.ticker_armed = false;
            effects.push(CaptionEffect::StopTicker { epoch: self.epoch });
        }

        if matches!(
            self.state,
            SubtitleState::Showing { .. } | SubtitleState::Waiting
        ) {
            self.epoch += 1;
            self.begin_fade_out(&mut effects);
        }

        if self.input_visible {
            self.input_visible = false;
            effects.push(CaptionEffect::HideInput);
        }
        effects
    }

    pub fn show_input(&mut self) -> Vec<CaptionEffect> {
        self.input_visible = true;
        let mut effects = vec![CaptionEffect::ShowInput];
        self.reposition(&mut effects);
        effects.push(CaptionEffect::FocusInput);
        effects
    }

    /// Record the pet's new geometry and follow it if anything is on screen.
    pub fn anchor_moved(&mut self, anchor: Rect) -> Vec<CaptionEffect> {
        self.anchor = Some(anchor);
        let mut effects = Vec::new();
        if self.input_visible || self.is_caption_visible() {
            self.reposition(&mut effects);
        }
        effects
    }

    pub fn set_input_size(&mut self, size: Size) -> Vec<CaptionEffect> {
        self.input_size = size;
        match self.anchor {
            Some(anchor) if self.input_visible => {
                vec![CaptionEffect::MoveInput(place_below(
                    anchor,
                    self.input_size,
                    INPUT_GAP,
                ))]
            }
            _ => Vec::new(),
        }
    }

    fn display(&mut self, index: usize, effects: &mut Vec<CaptionEffect>) {
        if self.is_caption_visible() {
            effects.push(CaptionEffect::SetOpacity(0.0));
        }
        effects.push(CaptionEffect::SetText(self.sentences[index].clone()));
        self.reposition(effects);
        effects.push(CaptionEffect::FadeIn(FADE_DURATION));
        self.state = SubtitleState::Showing { index };
    }

    fn begin_fade_out(&mut self, effects: &mut Vec<CaptionEffect>) {
        self.state = SubtitleState::Fading;
        effects.push(CaptionEffect::FadeOut(FADE_DURATION));
        effects.push(CaptionEffect::ScheduleFadeEnd {
            epoch: self.epoch,
            after: FADE_DURATION,
        });
    }

    fn reposition(&mut self, effects: &mut Vec<CaptionEffect>) {
        let Some(anchor) = self.anchor else { return };
        let jitter = self.jitter.next_offset();
        effects.push(CaptionEffect::MoveCaption(place_beside(
            anchor,
            CAPTION_GAP,
            jitter,
        )));
        effects.push(CaptionEffect::MoveInput(place_below(
            anchor,
            self.input_size,
            INPUT_GAP,
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cycles through a fixed list of offsets.
    struct ScriptedJitter {
        offsets: Vec<(i32, i32)>,
        next: usize,
    }

    impl ScriptedJitter {
        fn new(offsets: Vec<(i32, i32)>) -> Self {
            Self { offsets, next: 0 }
        }
    }

    impl JitterSource for ScriptedJitter {
        fn next_offset(&mut self) -> (i32, i32) {
            let offset = self.offsets[self.next % self.offsets.len()];
            self.next += 1;
            offset
        }
    }

    const REPLY: &str = "你好，今天天气不错。真的吗？";

    fn machine() -> SubtitleMachine<ScriptedJitter> {
        SubtitleMachine::new(ScriptedJitter::new(vec![(0, 0)]))
    }

    fn anchor() -> Rect {
        Rect::new(Point::new(100.0, 300.0), Size::new(200.0, 200.0))
    }

    fn texts(effects: &[CaptionEffect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                CaptionEffect::SetText(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn caption_moves(effects: &[CaptionEffect]) -> Vec<Point> {
        effects
            .iter()
            .filter_map(|e| match e {
                CaptionEffect::MoveCaption(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn input_moves(effects: &[CaptionEffect]) -> Vec<Point> {
        effects
            .iter()
            .filter_map(|e| match e {
                CaptionEffect::MoveInput(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn multi_fragment_reply_advances_one_per_tick() {
        let mut m = machine();
        let interval = Duration::from_millis(500);

        let effects = m.show(REPLY, interval);
        assert_eq!(
            effects,
            vec![
                CaptionEffect::SetText("你好，".to_string()),
                CaptionEffect::FadeIn(FADE_DURATION),
                CaptionEffect::StartTicker { epoch: 1, interval },
            ]
        );
        assert_eq!(m.state(), SubtitleState::Showing { index: 0 });

        let effects = m.tick(1);
        assert_eq!(texts(&effects), vec!["今天天气不错。"]);
        assert_eq!(effects[0], CaptionEffect::SetOpacity(0.0));
        assert_eq!(m.current_sentence(), Some("今天天气不错。"));

        let effects = m.tick(1);
        assert_eq!(texts(&effects), vec!["真的吗？"]);
        assert_eq!(m.state(), SubtitleState::Showing { index: 2 });

        let effects = m.tick(1);
        assert_eq!(
            effects,
            vec![
                CaptionEffect::StopTicker { epoch: 1 },
                CaptionEffect::ScheduleHide {
                    epoch: 1,
                    delay: LINGER_DELAY
                },
            ]
        );
        assert_eq!(m.state(), SubtitleState::Waiting);
        assert!(!m.is_ticker_armed());

        // Ticker is stopped; stray ticks do nothing.
        assert!(m.tick(1).is_empty());

        let effects = m.linger_elapsed(1);
        assert_eq!(
            effects,
            vec![
                CaptionEffect::FadeOut(FADE_DURATION),
                CaptionEffect::ScheduleFadeEnd {
                    epoch: 1,
                    after: FADE_DURATION
                },
            ]
        );
        assert_eq!(m.fade_finished(1), vec![CaptionEffect::HideCaption]);
        assert_eq!(m.state(), SubtitleState::Hidden);
        assert!(!m.is_caption_visible());
    }

    #[test]
    fn single_fragment_never_arms_ticker() {
        let mut m = machine();
        let effects = m.show("hello", DEFAULT_INTERVAL);

        assert_eq!(texts(&effects), vec!["hello"]);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, CaptionEffect::StartTicker { .. })));
        assert!(!m.is_ticker_armed());

        // Stays up: no tick and no delayed hide apply.
        assert!(m.tick(1).is_empty());
        assert!(m.linger_elapsed(1).is_empty());
        assert_eq!(m.state(), SubtitleState::Showing { index: 0 });
    }

    #[test]
    fn empty_reply_is_a_no_op() {
        let mut m = machine();
        assert!(m.show("", DEFAULT_INTERVAL).is_empty());
        assert!(m.show("  ", DEFAULT_INTERVAL).is_empty());
        assert_eq!(m.state(), SubtitleState::Idle);
        assert!(m.sentences().is_empty());
    }

    #[test]
    fn empty_reply_keeps_running_sequence() {
        let mut m = machine();
        m.show(REPLY, DEFAULT_INTERVAL);
        assert!(m.show("", DEFAULT_INTERVAL).is_empty());
        assert_eq!(m.sentences().len(), 3);
        assert!(m.is_ticker_armed());
        assert!(!m.tick(1).is_empty());
        assert_eq!(m.state(), SubtitleState::Showing { index: 1 });
    }

    #[test]
    fn new_reply_replaces_queue_and_invalidates_old_events() {
        let mut m = machine();
        m.show(REPLY, DEFAULT_INTERVAL);
        m.tick(1);

        let effects = m.show("第二条。回复！", DEFAULT_INTERVAL);
        // Stops the ticker of the replaced reply, not the one it starts.
        assert_eq!(effects[0], CaptionEffect::StopTicker { epoch: 1 });
        assert_eq!(effects[1], CaptionEffect::SetOpacity(0.0));
        assert_eq!(texts(&effects), vec!["第二条。"]);
        assert!(effects.contains(&CaptionEffect::StartTicker {
            epoch: 2,
            interval: DEFAULT_INTERVAL
        }));
        assert_eq!(m.sentences(), &["第二条。", "回复！"]);

        assert!(m.tick(1).is_empty());
        assert_eq!(texts(&m.tick(2)), vec!["回复！"]);
    }

    #[test]
    fn reshow_during_fade_out_wins_over_stale_fade_end() {
        let mut m = machine();
        m.show("only", DEFAULT_INTERVAL);
        m.hide();
        assert_eq!(m.state(), SubtitleState::Fading);

        m.show("again", DEFAULT_INTERVAL);
        assert!(m.fade_finished(2).is_empty());
        assert_eq!(m.current_sentence(), Some("again"));
    }

    #[test]
    fn hide_is_idempotent() {
        let mut m = machine();
        m.anchor_moved(anchor());
        m.show(REPLY, DEFAULT_INTERVAL);
        m.show_input();

        let effects = m.hide();
        assert_eq!(effects[0], CaptionEffect::StopTicker { epoch: 1 });
        assert!(effects.contains(&CaptionEffect::FadeOut(FADE_DURATION)));
        assert_eq!(effects.last(), Some(&CaptionEffect::HideInput));
        assert!(!m.is_visible());

        assert!(m.hide().is_empty());
        assert!(machine().hide().is_empty());
    }

    #[test]
    fn hide_cancels_pending_delayed_hide() {
        let mut m = machine();
        m.show("a，b", DEFAULT_INTERVAL);
        m.tick(1);
        m.tick(1);
        assert_eq!(m.state(), SubtitleState::Waiting);

        let effects = m.hide();
        assert!(effects.contains(&CaptionEffect::ScheduleFadeEnd {
            epoch: 2,
            after: FADE_DURATION
        }));
        assert!(m.linger_elapsed(1).is_empty());
        assert!(m.fade_finished(1).is_empty());
        assert_eq!(m.fade_finished(2), vec![CaptionEffect::HideCaption]);
    }

    #[test]
    fn caption_jitters_but_input_stays_put() {
        let mut m = SubtitleMachine::new(ScriptedJitter::new(vec![(30, -30), (-20, 20)]));
        m.anchor_moved(anchor());
        let shown = m.show_input();
        assert_eq!(
            shown.first(),
            Some(&CaptionEffect::ShowInput)
        );
        assert_eq!(shown.last(), Some(&CaptionEffect::FocusInput));
        assert_eq!(caption_moves(&shown), vec![Point::new(335.0, 270.0)]);

        let moved = m.anchor_moved(anchor());
        assert_eq!(caption_moves(&moved), vec![Point::new(285.0, 320.0)]);

        // Centered below: 100 + 100 - 92.5, rounded.
        let expected_input = Point::new(108.0, 505.0);
        assert_eq!(input_moves(&shown), vec![expected_input]);
        assert_eq!(input_moves(&moved), vec![expected_input]);
    }

    #[test]
    fn anchor_move_with_nothing_visible_only_records() {
        let mut m = machine();
        assert!(m.anchor_moved(anchor()).is_empty());

        let effects = m.show("hi", DEFAULT_INTERVAL);
        assert_eq!(caption_moves(&effects), vec![Point::new(305.0, 300.0)]);
    }

    #[test]
    fn input_resize_recenters_visible_input() {
        let mut m = machine();
        m.anchor_moved(anchor());
        assert!(m.set_input_size(Size::new(100.0, 30.0)).is_empty());

        m.show_input();
        assert_eq!(
            m.set_input_size(Size::new(120.0, 30.0)),
            vec![CaptionEffect::MoveInput(Point::new(140.0, 505.0))]
        );
    }

    #[test]
    fn random_jitter_stays_in_bounds() {
        let mut jitter = RandomJitter::default();
        for _ in 0..1000 {
            let (x, y) = jitter.next_offset();
            assert!(JITTER_X.contains(&x));
            assert!(JITTER_Y.contains(&y));
        }
    }

    #[test]
    fn reply_is_dropped_after_hide() {
        let mut m = machine();
        m.show_input();
        let session = m.session();

        m.hide();
        assert_eq!(m.show_reply(session, REPLY, DEFAULT_INTERVAL), None);
        assert_eq!(m.state(), SubtitleState::Idle);

        // Reopening the input starts over; the old reply still does not show.
        m.show_input();
        assert_eq!(m.show_reply(session, REPLY, DEFAULT_INTERVAL), None);
    }

    #[test]
    fn reply_shows_while_input_is_up() {
        let mut m = machine();
        m.show_input();
        let session = m.session();

        let effects = m.show_reply(session, REPLY, DEFAULT_INTERVAL).unwrap();
        assert_eq!(texts(&effects), vec!["你好，"]);
        assert_eq!(m.state(), SubtitleState::Showing { index: 0 });
    }

    #[test]
    fn final_tick_stops_only_its_own_ticker() {
        let mut m = machine();
        m.show("a，b", DEFAULT_INTERVAL);
        m.tick(1);
        let last = m.tick(1);
        assert!(last.contains(&CaptionEffect::StopTicker { epoch: 1 }));

        let next = m.show("c，d", DEFAULT_INTERVAL);
        assert!(next.contains(&CaptionEffect::StartTicker {
            epoch: 2,
            interval: DEFAULT_INTERVAL
        }));
        assert!(!next.iter().any(|e| matches!(e, CaptionEffect::StopTicker { .. })));
    }

    #[test]
    fn closing_input_lets_open_chat_show_it_again() {
        let mut m = machine();
        m.show_input();
        assert!(m.is_visible());

        assert_eq!(m.hide(), vec![CaptionEffect::HideInput]);
        assert!(!m.is_visible());
        assert_eq!(m.show_input()[0], CaptionEffect::ShowInput);
    }
}
