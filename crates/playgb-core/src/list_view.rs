use crate::host::{ButtonState, Buttons, Color, DrawMode, Font, Graphics, Rect};

pub const ROW_HEIGHT: i32 = 32;
/// Left text inset inside a row.
pub const INSET: i32 = 14;

const SCROLL_INSET: i32 = 2;
const SCROLL_INDICATOR_WIDTH: i32 = 2;
const MIN_THUMB_HEIGHT: i32 = 40;

const SCROLL_DURATION: f32 = 0.15;

const REPEAT_DELAY: f32 = 0.3;
const REPEAT_INTERVAL: f32 = 0.15;
const REPEAT_LEVEL_DURATION: f32 = 1.5;
const MAX_REPEAT_LEVEL: u32 = 3;

const CRANK_THRESHOLD: f32 = 30.0;
const CRANK_RESET_TIME: f32 = 2.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListItemKind {
    Button { title: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub height: i32,
    /// Top of the item in content coordinates; set by layout.
    pub offset_y: i32,
    pub kind: ListItemKind,
}

impl ListItem {
    pub fn button(title: impl Into<String>) -> Self {
        Self {
            height: ROW_HEIGHT,
            offset_y: 0,
            kind: ListItemKind::Button {
                title: title.into(),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Default)]
struct ScrollAnimation {
    active: bool,
    start: i32,
    end: i32,
    time: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct KeyRepeat {
    direction: Option<Direction>,
    /// Time since the last step.
    time: f32,
    /// Time spent at the current level.
    level_time: f32,
    level: u32,
    repeating: bool,
}

impl KeyRepeat {
    fn start(&mut self, direction: Direction) {
        *self = Self {
            direction: Some(direction),
            ..Self::default()
        };
    }

    /// Advances a held key; returns `true` when a repeat step is due.
    fn advance(&mut self, dt: f32) -> bool {
        self.time += dt;
        self.level_time += dt;

        if self.repeating
            && self.level < MAX_REPEAT_LEVEL
            && self.level_time >= REPEAT_LEVEL_DURATION
        {
            self.level += 1;
            self.level_time = 0.0;
        }

        let threshold = if self.repeating {
            REPEAT_INTERVAL / (self.level + 1) as f32
        } else {
            REPEAT_DELAY
        };

        if self.time >= threshold {
            self.time = 0.0;
            self.repeating = true;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct CrankAccumulator {
    change: f32,
    idle: f32,
}

impl CrankAccumulator {
    fn advance(&mut self, change: f32, dt: f32) -> Option<Direction> {
        if change == 0.0 {
            self.idle += dt;
            if self.idle >= CRANK_RESET_TIME {
                self.change = 0.0;
            }
            return None;
        }

        self.idle = 0.0;
        self.change += change;
        if self.change >= CRANK_THRESHOLD {
            self.change = 0.0;
            Some(Direction::Down)
        } else if self.change <= -CRANK_THRESHOLD {
            self.change = 0.0;
            Some(Direction::Up)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scrollbar {
    pub offset: i32,
    pub height: i32,
}

/// What the last draw put on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DrawnModel {
    selected: Option<usize>,
    content_offset: i32,
    scrollbar: Option<Scrollbar>,
}

pub struct ListView {
    items: Vec<ListItem>,
    frame: Rect,
    selected: Option<usize>,
    content_offset: i32,
    content_size: i32,
    scroll: ScrollAnimation,
    repeat: KeyRepeat,
    crank: CrankAccumulator,
    model: Option<DrawnModel>,
    needs_display: bool,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new(Rect::new(0, 0, 200, 200))
    }
}

impl ListView {
    pub fn new(frame: Rect) -> Self {
        Self {
            items: Vec::new(),
            frame,
            selected: None,
            content_offset: 0,
            content_size: 0,
            scroll: ScrollAnimation::default(),
            repeat: KeyRepeat::default(),
            crank: CrankAccumulator::default(),
            model: None,
            needs_display: true,
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn content_offset(&self) -> i32 {
        self.content_offset
    }

    pub fn content_size(&self) -> i32 {
        self.content_size
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn is_animating(&self) -> bool {
        self.scroll.active
    }

    /// Moves or resizes the viewport. A height change re-centres the
    /// current selection so the offset stays within the new range.
    pub fn set_frame(&mut self, frame: Rect) {
        if frame == self.frame {
            return;
        }
        let resized = frame.height != self.frame.height;
        self.frame = frame;
        self.needs_display = true;

        if resized {
            match self.selected {
                Some(index) => self.select(index, false),
                None => self.content_offset = self.content_offset.min(self.max_offset()),
            }
        }
    }

    /// Replaces the items and reloads, keeping the selection index in range.
    pub fn set_items(&mut self, items: Vec<ListItem>) {
        self.items = items;
        self.reload();
    }

    /// Forces the next [`ListView::draw`] to repaint.
    pub fn invalidate(&mut self) {
        self.needs_display = true;
    }

    fn layout(&mut self) {
        let mut y = 0;
        for item in &mut self.items {
            item.offset_y = y;
            y += item.height;
        }
        self.content_size = y;
    }

    pub fn reload(&mut self) {
        self.layout();

        match (self.items.len(), self.selected) {
            (0, _) => {
                self.selected = None;
                self.content_offset = 0;
                self.scroll.active = false;
            }
            (_, None) => self.select(0, false),
            (len, Some(index)) if index >= len => self.select(len - 1, false),
            (_, Some(index)) => self.select(index, false),
        }

        self.needs_display = true;
    }

    fn max_offset(&self) -> i32 {
        (self.content_size - self.frame.height).max(0)
    }

    fn centered_offset(&self, item: &ListItem) -> i32 {
        let viewport = self.frame.height;
        let offset = item.offset_y - (viewport / 2 - item.height / 2);
        offset.clamp(0, self.max_offset())
    }

    /// Selects `index` and scrolls it to the centre, animated or snapped.
    /// Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize, animated: bool) {
        let Some(item) = self.items.get(index) else {
            return;
        };
        let target = self.centered_offset(item);
        self.selected = Some(index);

        if animated && target != self.content_offset {
            self.scroll = ScrollAnimation {
                active: true,
                start: self.content_offset,
                end: target,
                time: 0.0,
            };
        } else {
            self.scroll.active = false;
            self.content_offset = target;
        }
    }

    fn step(&mut self, direction: Direction) {
        let next = match (direction, self.selected) {
            (_, None) => Some(0),
            (Direction::Up, Some(index)) => index.checked_sub(1),
            (Direction::Down, Some(index)) => Some(index + 1),
        };
        if let Some(next) = next.filter(|&i| i < self.items.len()) {
            self.select(next, true);
        }
    }

    /// Advances animation and applies this tick's navigation input.
    pub fn update(&mut self, buttons: ButtonState, crank_change: f32, dt: f32) {
        self.advance_scroll(dt);

        if buttons.pushed.contains(Buttons::UP) {
            self.repeat.start(Direction::Up);
            self.step(Direction::Up);
        } else if buttons.pushed.contains(Buttons::DOWN) {
            self.repeat.start(Direction::Down);
            self.step(Direction::Down);
        } else {
            let held = match self.repeat.direction {
                Some(Direction::Up) => buttons.current.contains(Buttons::UP),
                Some(Direction::Down) => buttons.current.contains(Buttons::DOWN),
                None => false,
            };
            if !held {
                self.repeat = KeyRepeat::default();
            } else if self.repeat.advance(dt)
                && let Some(direction) = self.repeat.direction
            {
                self.step(direction);
            }
        }

        if let Some(direction) = self.crank.advance(crank_change, dt) {
            self.step(direction);
        }
    }

    fn advance_scroll(&mut self, dt: f32) {
        if !self.scroll.active {
            return;
        }
        self.scroll.time += dt;
        let t = (self.scroll.time / SCROLL_DURATION).min(1.0);
        let distance = (self.scroll.end - self.scroll.start) as f32;
        self.content_offset = self.scroll.start + (distance * ease_in_out_quad(t)).round() as i32;
        if t >= 1.0 {
            self.content_offset = self.scroll.end;
            self.scroll.active = false;
        }
    }

    pub fn scrollbar(&self) -> Option<Scrollbar> {
        let viewport = self.frame.height;
        if self.content_size <= viewport {
            return None;
        }
        let track = viewport - SCROLL_INSET * 2;
        let height = (viewport * viewport / self.content_size)
            .max(MIN_THUMB_HEIGHT)
            .min(track);
        let offset = (track - height) * self.content_offset / (self.content_size - viewport);
        Some(Scrollbar { offset, height })
    }

    /// Repaints when selection, offset or scrollbar changed since the last
    /// draw (or when invalidated). Returns whether anything was drawn.
    pub fn draw<G: Graphics + ?Sized>(&mut self, gfx: &mut G) -> bool {
        let current = DrawnModel {
            selected: self.selected,
            content_offset: self.content_offset,
            scrollbar: self.scrollbar(),
        };
        if !self.needs_display && self.model == Some(current) {
            return false;
        }
        self.needs_display = false;
        self.model = Some(current);

        let frame = self.frame;
        gfx.fill_rect(frame, Color::White);

        let font_height = gfx.font_height(Font::Subhead);
        for (index, item) in self.items.iter().enumerate() {
            let row_y = frame.y + item.offset_y - self.content_offset;
            if row_y + item.height <= frame.y || row_y >= frame.bottom() {
                continue;
            }

            let selected = self.selected == Some(index);
            if selected {
                let row = Rect::new(frame.x, row_y, frame.width, item.height);
                gfx.fill_rect(row.intersect(frame), Color::Black);
            }

            match &item.kind {
                ListItemKind::Button { title } => {
                    let mode = if selected {
                        DrawMode::FillWhite
                    } else {
                        DrawMode::FillBlack
                    };
                    let text_y = row_y + (item.height - font_height) / 2;
                    gfx.draw_text(Font::Subhead, title, frame.x + INSET, text_y, mode);
                }
            }
        }

        if let Some(bar) = current.scrollbar {
            let x = frame.x + frame.width - SCROLL_INSET - SCROLL_INDICATOR_WIDTH;
            let rect = Rect::new(
                x,
                frame.y + SCROLL_INSET + bar.offset,
                SCROLL_INDICATOR_WIDTH,
                bar.height,
            );
            gfx.fill_rect(rect, Color::Black);
        }

        true
    }
}

fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}
