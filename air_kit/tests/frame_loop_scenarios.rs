//! Frame loop scenarios driven by scripted fakes and a hand-driven clock.

use std::collections::VecDeque;
use std::time::Duration;

use air_kit::{
    place_all, DebounceState, DisplaySink, FrameLoop, FrameSource, HudState, Instrument,
    InstrumentKind, LoopConfig, LoopExit, ManualClock, SoundHandle, SoundPlayer,
};
use image::{Rgb, RgbImage};
use region_mask::{assign_region, ColumnMapping};

const W: u32 = 1280;
const H: u32 = 720;
const RED:  Rgb<u8> = Rgb([230, 20, 20]);
const SKIN: Rgb<u8> = Rgb([180, 150, 120]);

const HAT:   SoundHandle = SoundHandle::new(0);
const SNARE: SoundHandle = SoundHandle::new(1);

// ════════════════════════════════════════════════════════════════════════════
// Fakes
// ════════════════════════════════════════════════════════════════════════════

/// Yields frames stamped with a time offset; the shared clock jumps to each
/// offset as the frame is pulled.
struct Script {
    clock:  ManualClock,
    frames: VecDeque<(u64, RgbImage)>,
}

impl Script {
    fn new(clock: &ManualClock) -> Self {
        Script { clock: clock.clone(), frames: VecDeque::new() }
    }

    fn at(mut self, ms: u64, frame: RgbImage) -> Self {
        self.frames.push_back((ms, frame));
        self
    }
}

impl FrameSource for Script {
    fn next_frame(&mut self) -> Option<RgbImage> {
        let (ms, frame) = self.frames.pop_front()?;
        self.clock.set_elapsed(Duration::from_millis(ms));
        Some(frame)
    }
}

#[derive(Default)]
struct Screen {
    keys:   VecDeque<Option<char>>,
    states: Vec<DebounceState>,
    firing: Vec<Vec<bool>>,
    last:   Option<RgbImage>,
}

impl Screen {
    fn with_keys(keys: &[Option<char>]) -> Self {
        Screen { keys: keys.iter().copied().collect(), ..Default::default() }
    }
}

impl DisplaySink for Screen {
    fn show(&mut self, frame: &RgbImage, hud: &HudState<'_>) {
        self.states.push(hud.state);
        self.firing.push(hud.instruments.iter().map(|i| i.is_firing()).collect());
        self.last = Some(frame.clone());
    }

    fn poll_key(&mut self) -> Option<char> {
        self.keys.pop_front().flatten()
    }
}

#[derive(Default)]
struct Recorder(Vec<SoundHandle>);

impl SoundPlayer for Recorder {
    fn play(&mut self, sound: SoundHandle) { self.0.push(sound); }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn kit() -> Vec<Instrument> {
    let mut v = vec![
        Instrument::new(InstrumentKind::Hat,   HAT),
        Instrument::new(InstrumentKind::Snare, SNARE),
    ];
    place_all(&mut v, W, H, ColumnMapping::Legacy).unwrap();
    v
}

/// A frame with the regions of the listed instrument indices fully red.
fn frame_with(hits: &[usize]) -> RgbImage {
    let mut frame = RgbImage::from_pixel(W, H, SKIN);
    for &index in hits {
        let rect = assign_region(index, 2, W, H, ColumnMapping::Legacy).unwrap();
        let tl = rect.top_left();
        for y in 0..rect.height() {
            for x in 0..rect.width() {
                frame.put_pixel(tl.x as u32 + x, tl.y as u32 + y, RED);
            }
        }
    }
    frame
}

fn unmirrored() -> LoopConfig {
    LoopConfig { mirror: false, ..LoopConfig::default() }
}

fn cooling(state: DebounceState) -> bool {
    matches!(state, DebounceState::Cooling { .. })
}

// ════════════════════════════════════════════════════════════════════════════
// Scenarios
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn one_contact_one_sound() {
    let clock = ManualClock::new();
    let mut script = Script::new(&clock).at(0, frame_with(&[0]));
    for i in 1..9 {
        script = script.at(i * 20, frame_with(&[0]));
    }
    script = script.at(250, frame_with(&[]));

    let mut fl = FrameLoop::new(kit(), unmirrored(), clock.clone()).unwrap();
    let mut screen = Screen::default();
    let mut rec = Recorder::default();

    // Frame 1: Hat saturated.
    assert_eq!(fl.step(&mut script, &mut screen, &mut rec).unwrap(), None);
    assert_eq!(rec.0, vec![HAT]);
    assert_eq!(fl.state(), DebounceState::Cooling { remaining: Duration::from_millis(200) });
    assert!(fl.instruments()[0].is_firing());
    assert!(!fl.instruments()[1].is_firing());

    // Frames 2-9: still saturated, all within the cooldown.
    for _ in 1..9 {
        assert_eq!(fl.step(&mut script, &mut screen, &mut rec).unwrap(), None);
    }
    assert_eq!(rec.0, vec![HAT]);
    assert!(screen.states[1..9].iter().all(|s| cooling(*s)));
    assert_eq!(fl.stats().evaluated, 1);

    // Frame 10: past the cooldown, region empty.
    assert_eq!(fl.step(&mut script, &mut screen, &mut rec).unwrap(), None);
    assert_eq!(fl.state(), DebounceState::Armed);
    assert!(!fl.instruments()[0].is_firing());
    assert_eq!(rec.0, vec![HAT]);
    assert_eq!(fl.stats().frames, 10);
    assert_eq!(fl.stats().evaluated, 2);

    assert_eq!(
        fl.step(&mut script, &mut screen, &mut rec).unwrap(),
        Some(LoopExit::EndOfStream)
    );
}

#[test]
fn cooldown_is_global() {
    let clock = ManualClock::new();
    let mut script = Script::new(&clock)
        .at(0,   frame_with(&[0]))
        .at(50,  frame_with(&[1]))
        .at(250, frame_with(&[1]));

    let mut fl = FrameLoop::new(kit(), unmirrored(), clock).unwrap();
    let mut rec = Recorder::default();
    let exit = fl.run(&mut script, &mut Screen::default(), &mut rec).unwrap();

    assert_eq!(exit, LoopExit::EndOfStream);
    assert_eq!(rec.0, vec![HAT, SNARE]);
    assert_eq!(fl.stats().cooldowns, 2);
}

#[test]
fn simultaneous_contacts_both_sound() {
    let clock = ManualClock::new();
    let mut script = Script::new(&clock).at(0, frame_with(&[0, 1]));

    let mut fl = FrameLoop::new(kit(), unmirrored(), clock).unwrap();
    let mut rec = Recorder::default();
    fl.run(&mut script, &mut Screen::default(), &mut rec).unwrap();

    assert_eq!(rec.0, vec![HAT, SNARE]);
    assert_eq!(fl.stats().fires, 2);
    assert_eq!(fl.stats().cooldowns, 1);
}

#[test]
fn held_contact_retriggers_after_cooldown() {
    let clock = ManualClock::new();
    let mut script = Script::new(&clock)
        .at(0,   frame_with(&[0]))
        .at(100, frame_with(&[0]))
        .at(199, frame_with(&[0]))
        .at(200, frame_with(&[0]));

    let mut fl = FrameLoop::new(kit(), unmirrored(), clock).unwrap();
    let mut rec = Recorder::default();
    fl.run(&mut script, &mut Screen::default(), &mut rec).unwrap();

    assert_eq!(rec.0, vec![HAT, HAT]);
}

#[test]
fn quit_is_honoured_while_cooling() {
    let clock = ManualClock::new();
    let mut script = Script::new(&clock)
        .at(0,  frame_with(&[0]))
        .at(30, frame_with(&[0]))
        .at(60, frame_with(&[0]));

    let mut fl = FrameLoop::new(kit(), unmirrored(), clock).unwrap();
    let mut screen = Screen::with_keys(&[None, Some('Q')]);
    let exit = fl.run(&mut script, &mut screen, &mut Recorder::default()).unwrap();

    assert_eq!(exit, LoopExit::Quit);
    assert_eq!(fl.stats().frames, 2);
    assert!(cooling(fl.state()));
}

#[test]
fn other_keys_do_not_quit() {
    let clock = ManualClock::new();
    let mut script = Script::new(&clock)
        .at(0,  frame_with(&[]))
        .at(10, frame_with(&[]));

    let config = LoopConfig { quit_key: 'x', ..unmirrored() };
    let mut fl = FrameLoop::new(kit(), config, clock).unwrap();
    let mut screen = Screen::with_keys(&[Some('q'), Some('m')]);
    let exit = fl.run(&mut script, &mut screen, &mut Recorder::default()).unwrap();

    assert_eq!(exit, LoopExit::EndOfStream);
}

#[test]
fn stream_ending_while_cooling_is_clean() {
    let clock = ManualClock::new();
    let mut script = Script::new(&clock)
        .at(0,  frame_with(&[0]))
        .at(40, frame_with(&[0]));

    let mut fl = FrameLoop::new(kit(), unmirrored(), clock).unwrap();
    let mut rec = Recorder::default();
    let exit = fl.run(&mut script, &mut Screen::default(), &mut rec).unwrap();

    assert_eq!(exit, LoopExit::EndOfStream);
    assert!(cooling(fl.state()));
    assert_eq!(rec.0, vec![HAT]);
}

#[test]
fn frames_are_mirrored_before_evaluation() {
    // The raw frame shows red where the hat region is; once mirrored it
    // lands on the snare region.
    let clock = ManualClock::new();
    let mut script = Script::new(&clock).at(0, frame_with(&[0]));

    let mut fl = FrameLoop::new(kit(), LoopConfig::default(), clock).unwrap();
    let mut screen = Screen::default();
    let mut rec = Recorder::default();
    fl.run(&mut script, &mut screen, &mut rec).unwrap();

    assert_eq!(rec.0, vec![SNARE]);
    assert_eq!(screen.firing, vec![vec![false, true]]);
    let shown = screen.last.unwrap();
    assert_eq!(*shown.get_pixel(W - 1 - 320, 540), RED);
    assert_eq!(*shown.get_pixel(320, 540), SKIN);
}

#[test]
fn icons_are_drawn_on_every_frame() {
    let clock = ManualClock::new();
    let mut script = Script::new(&clock)
        .at(0,  frame_with(&[0]))
        .at(20, frame_with(&[]));

    let icon = RgbImage::from_pixel(200, 100, Rgb([0, 0, 40]));
    let mut insts = vec![
        Instrument::new(InstrumentKind::Hat, HAT).with_icon(icon).unwrap(),
        Instrument::new(InstrumentKind::Snare, SNARE),
    ];
    place_all(&mut insts, W, H, ColumnMapping::Legacy).unwrap();

    let mut fl = FrameLoop::new(insts, unmirrored(), clock).unwrap();
    let mut screen = Screen::default();
    fl.run(&mut script, &mut screen, &mut Recorder::default()).unwrap();

    // Second frame is shown while cooling, icon still added.
    assert!(cooling(screen.states[1]));
    let shown = screen.last.unwrap();
    assert_eq!(*shown.get_pixel(320, 540), Rgb([180, 150, 160]));
    assert_eq!(*shown.get_pixel(960, 540), SKIN);
}
