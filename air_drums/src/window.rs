//! Software-rendered display using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                                                          │
//! │                 mirrored camera frame                    │
//! │                                                          │
//! │     Hi-hat                          Snare                │
//! │   ┌──────────┐                    ┌──────────┐           │
//! │   │  icon    │                    │  icon    │  ← gold   │
//! │   └──────────┘                    └──────────┘  while    │
//! │                                                 firing   │
//! ├──────────────────────────────────────────────────────────┤
//! │ ARMED  fires 3  frames 812            q=quit  m=mask     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! `M` swaps the frame for a mask view showing each region's matching pixels.

use std::collections::VecDeque;
use std::sync::mpsc::Sender;

use air_kit::{DebounceState, DisplaySink, HudState};
use image::{GrayImage, Rgb, RgbImage};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, WindowOptions};
use region_mask::Rect;

use crate::sim::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const STATUS_H:   usize = 28;
const GLYPH_SCALE:    usize = 3;
const BORDER_IDLE:    u32   = 0xFF4FC3F7;
const BORDER_FIRING:  u32   = 0xFFFFD700;  // gold
const STATUS_BG:      u32   = 0xFF0F3460;
const TEXT_COLOR:     u32   = 0xFFEEEEEE;
const COOLING_COLOR:  u32   = 0xFFFFBBAA;
const LEGEND_COLOR:   u32   = 0xFF888888;
const MASK_HIT_COLOR: u32   = 0xFFFFFFFF;

// ════════════════════════════════════════════════════════════════════════════
// Canvas — the framebuffer and its drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { buf: vec![0xFF000000; width * height], width, height }
    }

    pub fn pixels(&self) -> &[u32] { &self.buf }
    pub fn width(&self)  -> usize  { self.width }
    pub fn height(&self) -> usize  { self.height }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    /// Copy `frame` to the top-left corner, optionally dimmed toward black.
    pub fn blit_rgb(&mut self, frame: &RgbImage, dim: f32) {
        let w = (frame.width() as usize).min(self.width);
        let h = (frame.height() as usize).min(self.height);
        for y in 0..h {
            for x in 0..w {
                let c = rgb_to_argb(*frame.get_pixel(x as u32, y as u32));
                self.buf[y * self.width + x] = if dim > 0.0 { blend(c, 0xFF000000, dim) } else { c };
            }
        }
    }

    /// Paint the hits of `mask` with its top-left corner at `(x0, y0)`.
    pub fn blit_mask(&mut self, mask: &GrayImage, x0: usize, y0: usize) {
        for (x, y, px) in mask.enumerate_pixels() {
            if px.0[0] != 0 {
                self.set_pixel(x0 + x as usize, y0 + y as usize, MASK_HIT_COLOR);
            }
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x + w).min(self.width) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y + h).min(self.height) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    /// 3×5 bitmap font, each dot drawn as a `scale`×`scale` square.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > self.width { break; }
        }
    }

    /// Region outline, clipped to the frame area.  Thicker while firing.
    fn draw_region(&mut self, rect: Rect, frame_w: u32, frame_h: u32, firing: bool) {
        let Some((x, y, w, h)) = rect.clip(frame_w, frame_h) else { return; };
        let (x, y, w, h) = (x as usize, y as usize, w as usize, h as usize);
        let color = if firing { BORDER_FIRING } else { BORDER_IDLE };
        self.draw_border(x, y, w, h, color);
        if firing && w > 2 && h > 2 {
            self.draw_border(x + 1, y + 1, w - 2, h - 2, color);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Window
// ════════════════════════════════════════════════════════════════════════════

pub struct Window {
    window:    minifb::Window,
    canvas:    Canvas,
    frame_w:   usize,
    frame_h:   usize,
    sim_tx:    Option<Sender<SimInput>>,
    show_mask: bool,
    keys:      VecDeque<char>,
    legend:    String,
}

impl Window {
    /// A window for `width`×`height` frames plus the status bar.
    ///
    /// With `sim_tx`, the mouse is forwarded to the simulated camera.
    pub fn new(
        title:    &str,
        width:    u32,
        height:   u32,
        quit_key: char,
        sim_tx:   Option<Sender<SimInput>>,
    ) -> Result<Self, String> {
        let (frame_w, frame_h) = (width as usize, height as usize);
        let mut window = minifb::Window::new(
            title,
            frame_w, frame_h + STATUS_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        let mut legend = format!("{}=quit  m=mask", quit_key.to_ascii_lowercase());
        if sim_tx.is_some() {
            legend.push_str("  hold mouse=stick");
        }

        Ok(Window {
            window,
            canvas: Canvas::new(frame_w, frame_h + STATUS_H),
            frame_w,
            frame_h,
            sim_tx,
            show_mask: false,
            keys: VecDeque::new(),
            legend,
        })
    }

    fn forward_pointer(&self) {
        let Some(tx) = &self.sim_tx else { return; };
        if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let down = self.window.get_mouse_down(MouseButton::Left);
            let (x, y) = (x.max(0.0) as u32, y.max(0.0) as u32);
            if (y as usize) < self.frame_h {
                let _ = tx.send(SimInput::Pointer { x, y, down });
            } else {
                let _ = tx.send(SimInput::Pointer { x, y, down: false });
            }
        }
    }

    fn collect_keys(&mut self) {
        for key in self.window.get_keys_pressed(KeyRepeat::No) {
            if key == Key::M {
                self.show_mask = !self.show_mask;
            }
            if let Some(c) = key_to_char(key) {
                self.keys.push_back(c);
            }
        }
    }
}

impl DisplaySink for Window {
    fn show(&mut self, frame: &RgbImage, hud: &HudState<'_>) {
        let (fw, fh) = (self.frame_w as u32, self.frame_h as u32);

        // ── Frame or mask view ────────────────────────────────────────────
        if self.show_mask {
            self.canvas.blit_rgb(frame, 0.75);
            for inst in hud.instruments {
                if let (Some(rect), Some(occ)) = (inst.region(), inst.last_occupancy()) {
                    if let Some((x, y, _, _)) = rect.clip(fw, fh) {
                        self.canvas.blit_mask(&occ.mask, x as usize, y as usize);
                    }
                }
            }
        } else {
            self.canvas.blit_rgb(frame, 0.0);
        }

        // ── Region outlines + labels ──────────────────────────────────────
        for inst in hud.instruments {
            let Some(rect) = inst.region() else { continue; };
            self.canvas.draw_region(rect, fw, fh, inst.is_firing());
            let tl = rect.top_left();
            let label_y = tl.y - (5 * GLYPH_SCALE as i32 + 4);
            if tl.x >= 0 && label_y >= 0 {
                self.canvas.draw_label(inst.kind().name(), tl.x as usize, label_y as usize, TEXT_COLOR, GLYPH_SCALE);
            }
        }

        // ── Status bar ────────────────────────────────────────────────────
        let status_color = if hud.state.is_armed() { TEXT_COLOR } else { COOLING_COLOR };
        self.canvas.fill_rect(0, self.frame_h, self.frame_w, STATUS_H, STATUS_BG);
        self.canvas.draw_label(&status_line(hud), 10, self.frame_h + 7, status_color, GLYPH_SCALE);
        let legend_x = self.frame_w.saturating_sub(self.legend.len() * 4 * GLYPH_SCALE + 10);
        self.canvas.draw_label(&self.legend, legend_x, self.frame_h + 7, LEGEND_COLOR, GLYPH_SCALE);

        self.window
            .update_with_buffer(self.canvas.pixels(), self.canvas.width(), self.canvas.height())
            .ok();

        self.forward_pointer();
        self.collect_keys();
    }

    fn poll_key(&mut self) -> Option<char> {
        self.keys.pop_front()
    }

    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

pub fn status_line(hud: &HudState<'_>) -> String {
    let state = match hud.state {
        DebounceState::Armed => "ARMED".to_string(),
        DebounceState::Cooling { remaining } => format!("COOLING {}ms", remaining.as_millis()),
    };
    format!("{}  fires {}  frames {}", state, hud.stats.fires, hud.stats.frames)
}

pub fn rgb_to_argb(px: Rgb<u8>) -> u32 {
    let [r, g, b] = px.0;
    0xFF000000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Letters and digits as lowercase characters; everything else is ignored.
pub fn key_to_char(key: Key) -> Option<char> {
    let c = match key {
        Key::A => 'a', Key::B => 'b', Key::C => 'c', Key::D => 'd', Key::E => 'e',
        Key::F => 'f', Key::G => 'g', Key::H => 'h', Key::I => 'i', Key::J => 'j',
        Key::K => 'k', Key::L => 'l', Key::M => 'm', Key::N => 'n', Key::O => 'o',
        Key::P => 'p', Key::Q => 'q', Key::R => 'r', Key::S => 's', Key::T => 't',
        Key::U => 'u', Key::V => 'v', Key::W => 'w', Key::X => 'x', Key::Y => 'y',
        Key::Z => 'z',
        Key::Key0 => '0', Key::Key1 => '1', Key::Key2 => '2', Key::Key3 => '3',
        Key::Key4 => '4', Key::Key5 => '5', Key::Key6 => '6', Key::Key7 => '7',
        Key::Key8 => '8', Key::Key9 => '9',
        _ => return None,
    };
    Some(c)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use air_kit::LoopStats;
    use image::Luma;
    use region_mask::Point;
    use std::time::Duration;

    #[test]
    fn argb_packing() {
        assert_eq!(rgb_to_argb(Rgb([0x12, 0x34, 0x56])), 0xFF123456);
        assert_eq!(rgb_to_argb(Rgb([0, 0, 0])), 0xFF000000);
    }

    #[test]
    fn keys_map_to_lowercase_chars() {
        assert_eq!(key_to_char(Key::Q), Some('q'));
        assert_eq!(key_to_char(Key::Key7), Some('7'));
        assert_eq!(key_to_char(Key::Escape), None);
        assert_eq!(key_to_char(Key::Space), None);
    }

    #[test]
    fn status_shows_state_and_counts() {
        let stats = LoopStats { frames: 812, evaluated: 700, fires: 3, cooldowns: 2 };
        let armed = HudState { state: DebounceState::Armed, stats, instruments: &[] };
        assert_eq!(status_line(&armed), "ARMED  fires 3  frames 812");

        let cooling = HudState {
            state: DebounceState::Cooling { remaining: Duration::from_millis(120) },
            stats,
            instruments: &[],
        };
        assert!(status_line(&cooling).starts_with("COOLING 120ms"));
    }

    #[test]
    fn blit_copies_and_clips() {
        let mut canvas = Canvas::new(4, 3);
        let frame = RgbImage::from_pixel(6, 2, Rgb([255, 0, 0]));
        canvas.blit_rgb(&frame, 0.0);
        assert_eq!(canvas.get(3, 1), Some(0xFFFF0000));
        assert_eq!(canvas.get(0, 2), Some(0xFF000000));
        assert_eq!(canvas.get(4, 0), None);
    }

    #[test]
    fn dimmed_blit_darkens() {
        let mut canvas = Canvas::new(1, 1);
        canvas.blit_rgb(&RgbImage::from_pixel(1, 1, Rgb([200, 100, 0])), 0.5);
        assert_eq!(canvas.get(0, 0), Some(0xFF643200));
    }

    #[test]
    fn mask_hits_are_drawn_at_offset() {
        let mut canvas = Canvas::new(10, 10);
        let mut mask = GrayImage::new(3, 2);
        mask.put_pixel(1, 1, Luma([255]));
        canvas.blit_mask(&mask, 4, 5);
        assert_eq!(canvas.get(5, 6), Some(MASK_HIT_COLOR));
        assert_eq!(canvas.get(4, 5), Some(0xFF000000));
    }

    #[test]
    fn border_is_clipped_to_canvas() {
        let mut canvas = Canvas::new(8, 8);
        canvas.draw_border(5, 5, 10, 10, 0xFFFFFFFF);
        assert_eq!(canvas.get(5, 7), Some(0xFFFFFFFF));
        assert_eq!(canvas.get(7, 5), Some(0xFFFFFFFF));
        assert_eq!(canvas.get(6, 6), Some(0xFF000000));
        canvas.draw_border(0, 0, 0, 3, 0xFF00FF00);
        assert_eq!(canvas.get(0, 0), Some(0xFF000000));
    }

    #[test]
    fn firing_region_gets_double_gold_border() {
        let mut canvas = Canvas::new(20, 20);
        let rect = Rect::new(Point::new(2, 2), Point::new(12, 10)).unwrap();
        canvas.draw_region(rect, 20, 20, true);
        assert_eq!(canvas.get(2, 2), Some(BORDER_FIRING));
        assert_eq!(canvas.get(3, 3), Some(BORDER_FIRING));
        assert_eq!(canvas.get(5, 5), Some(0xFF000000));

        let mut canvas = Canvas::new(20, 20);
        canvas.draw_region(rect, 20, 20, false);
        assert_eq!(canvas.get(2, 2), Some(BORDER_IDLE));
        assert_eq!(canvas.get(3, 3), Some(0xFF000000));
    }

    #[test]
    fn label_draws_scaled_glyphs() {
        let mut canvas = Canvas::new(40, 20);
        canvas.draw_label("1", 0, 0, 0xFFFFFFFF, 2);
        // Top row of '1' is 0b010: middle dot only.
        assert_eq!(canvas.get(2, 0), Some(0xFFFFFFFF));
        assert_eq!(canvas.get(3, 1), Some(0xFFFFFFFF));
        assert_eq!(canvas.get(0, 0), Some(0xFF000000));
        // Bottom row 0b111 spans all three columns.
        assert_eq!(canvas.get(5, 9), Some(0xFFFFFFFF));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF102030, 0xFFFFFFFF, 0.0), 0xFF102030);
        assert_eq!(blend(0xFF102030, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }
}
