//! Draws decoded picture commands: pen state, line rasterizer, flood fill and brushes.

use std::collections::VecDeque;

use log::trace;

use super::decoder::decode_picture;
use super::{PictureVisitor, PICTURE_HEIGHT, PICTURE_WIDTH};
use crate::game::ArchiveVersion;

const WIDTH: i32 = PICTURE_WIDTH as i32;
const HEIGHT: i32 = PICTURE_HEIGHT as i32;

/// Colour 15 is the untouched visual background, priority 4 the untouched priority background
pub const EMPTY_SCREEN: u8 = 15;
pub const EMPTY_PRIORITY: u8 = 4;

/// Pixel storage the tracer draws into. Coordinates passed in are always on the canvas.
pub trait PictureSink {
    fn screen_pixel(&self, x: usize, y: usize) -> u8;
    fn set_screen_pixel(&mut self, x: usize, y: usize, color: u8);
    fn priority_pixel(&self, x: usize, y: usize) -> u8;
    fn set_priority_pixel(&mut self, x: usize, y: usize, priority: u8);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PenState {
    pub screen_enabled: bool,
    pub screen_color: u8,
    pub priority_enabled: bool,
    pub priority_color: u8,
    pub pattern_code: u8,
    pub pattern_number: u8,
}

lazy_static! {
    static ref BINARY_LIST: [u16; 16] = {
        let mut list = [0u16; 16];
        for (i, bit) in list.iter_mut().enumerate() {
            *bit = 0x8000 >> i;
        }
        list
    };
}

/// First row of each brush size in CIRCLE_DATA
const CIRCLE_START: [usize; 8] = [0, 1, 4, 9, 16, 25, 37, 50];

#[rustfmt::skip]
const CIRCLE_DATA: [u16; 65] = [
    0x8000,
    0xe000, 0xe000, 0xe000,
    0x7000, 0xf800, 0xf800, 0xf800, 0x7000,
    0x3800, 0x7c00, 0xfe00, 0xfe00, 0xfe00, 0x7c00, 0x3800,
    0x1c00, 0x7f00, 0xff80, 0xff80, 0xff80, 0xff80, 0xff80, 0x7f00, 0x1c00,
    0x0e00, 0x3f80, 0x7fc0, 0x7fc0, 0xffe0, 0xffe0, 0xffe0, 0x7fc0, 0x7fc0, 0x3f80, 0x1f00, 0x0e00,
    0x0f80, 0x3fe0, 0x7ff0, 0x7ff0, 0xfff8, 0xfff8, 0xfff8, 0xfff8, 0xfff8, 0x7ff0, 0x7ff0, 0x3fe0, 0x0f80,
    0x07c0, 0x1ff0, 0x3ff8, 0x7ffc, 0x7ffc, 0xfffe, 0xfffe, 0xfffe, 0xfffe, 0xfffe, 0x7ffc, 0x7ffc, 0x3ff8, 0x1ff0, 0x07c0,
];

/// v3 interpreters draw the size 1 circle as a single row
const CIRCLE_DATA_V3_SIZE_1: [u16; 3] = [0x0000, 0xe000, 0x0000];

const SQUARE_BRUSH: u8 = 0x10;
const TEXTURED_BRUSH: u8 = 0x20;

pub struct PictureTracer<'a, S: PictureSink + ?Sized> {
    pen: PenState,
    version: ArchiveVersion,
    sink: &'a mut S,
}

impl<'a, S: PictureSink + ?Sized> PictureTracer<'a, S> {
    pub fn new(version: ArchiveVersion, sink: &'a mut S) -> PictureTracer<'a, S> {
        PictureTracer {
            pen: PenState::default(),
            version,
            sink,
        }
    }

    pub fn pen(&self) -> &PenState {
        &self.pen
    }

    /// Coordinates wrap to a byte before the canvas check
    fn put_pixel(&mut self, x: i32, y: i32) {
        let x = x & 0xff;
        let y = y & 0xff;
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if self.pen.screen_enabled {
            self.sink.set_screen_pixel(x, y, self.pen.screen_color);
        }
        if self.pen.priority_enabled {
            self.sink.set_priority_pixel(x, y, self.pen.priority_color);
        }
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let x1 = x1.clamp(0, WIDTH - 1);
        let x2 = x2.clamp(0, WIDTH - 1);
        let y1 = y1.clamp(0, HEIGHT - 1);
        let y2 = y2.clamp(0, HEIGHT - 1);

        if x1 == x2 {
            for y in y1.min(y2)..=y1.max(y2) {
                self.put_pixel(x1, y);
            }
            return;
        }
        if y1 == y2 {
            for x in x1.min(x2)..=x1.max(x2) {
                self.put_pixel(x, y1);
            }
            return;
        }

        let (step_y, delta_y) = if y2 < y1 { (-1, y1 - y2) } else { (1, y2 - y1) };
        let (step_x, delta_x) = if x2 < x1 { (-1, x1 - x2) } else { (1, x2 - x1) };

        let (mut remaining, detdelta, mut error_x, mut error_y) = if delta_y > delta_x {
            (delta_y, delta_y, delta_y / 2, 0)
        } else {
            (delta_x, delta_x, 0, delta_x / 2)
        };

        let (mut x, mut y) = (x1, y1);
        self.put_pixel(x, y);
        loop {
            error_y += delta_y;
            if error_y >= detdelta {
                error_y -= detdelta;
                y += step_y;
            }
            error_x += delta_x;
            if error_x >= detdelta {
                error_x -= detdelta;
                x += step_x;
            }
            self.put_pixel(x, y);
            remaining -= 1;
            if remaining <= 0 {
                break;
            }
        }
    }

    fn fillable(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= WIDTH || y >= HEIGHT {
            return false;
        }
        let screen = self.sink.screen_pixel(x as usize, y as usize);
        let priority = self.sink.priority_pixel(x as usize, y as usize);
        let pen = &self.pen;

        if pen.priority_enabled && !pen.screen_enabled && pen.priority_color != EMPTY_PRIORITY {
            return priority == EMPTY_PRIORITY;
        }
        if pen.screen_enabled && !pen.priority_enabled && pen.screen_color != EMPTY_SCREEN {
            return screen == EMPTY_SCREEN;
        }
        pen.screen_enabled && screen == EMPTY_SCREEN && pen.screen_color != EMPTY_SCREEN
    }

    fn flood_fill(&mut self, x: i32, y: i32) {
        if !self.pen.screen_enabled && !self.pen.priority_enabled {
            return;
        }

        let mut queue = VecDeque::new();
        queue.push_back((x, y));

        while let Some((px, py)) = queue.pop_front() {
            if !self.fillable(px, py) {
                continue;
            }
            let mut c = px - 1;
            while self.fillable(c, py) {
                c -= 1;
            }
            c += 1;

            let mut span_up = true;
            let mut span_down = true;
            while self.fillable(c, py) {
                self.put_pixel(c, py);
                if self.fillable(c, py - 1) {
                    if span_up {
                        queue.push_back((c, py - 1));
                        span_up = false;
                    }
                } else {
                    span_up = true;
                }
                if self.fillable(c, py + 1) {
                    if span_down {
                        queue.push_back((c, py + 1));
                        span_down = false;
                    }
                } else {
                    span_down = true;
                }
                c += 1;
            }
        }
    }

    fn plot_brush(&mut self, x: u8, y: u8) {
        let code = self.pen.pattern_code;
        let size = (code & 0x07) as i32;
        let (rows_data, first_row): (&[u16], usize) =
            if self.version == ArchiveVersion::V3 && size == 1 {
                (&CIRCLE_DATA_V3_SIZE_1, 0)
            } else {
                (&CIRCLE_DATA, CIRCLE_START[size as usize])
            };

        // bitmask columns are half a pixel wide
        let mut pen_x = (x as i32 * 2 - size).max(0);
        pen_x = pen_x.min(WIDTH * 2 - 2 * size);
        pen_x /= 2;
        let mut pen_y = (y as i32 - size).max(0);
        pen_y = pen_y.min(HEIGHT - 1 - 2 * size);

        let pen_width = 2 * size + 1;
        let square = code & SQUARE_BRUSH != 0;
        let textured = code & TEXTURED_BRUSH != 0;
        // every plot restarts the same texture sequence
        let mut texture: u8 = 0x01;

        for row in 0..pen_width {
            let mask = rows_data.get(first_row + row as usize).copied().unwrap_or(0);
            let mut column = pen_x;
            let mut counter = 0;
            while counter <= pen_width {
                if square || BINARY_LIST[(counter >> 1) as usize] & mask != 0 {
                    if textured {
                        let carry = texture & 0x01;
                        texture >>= 1;
                        if carry != 0 {
                            texture ^= 0xb8;
                        }
                    }
                    if !textured || texture & 0x03 == 0x01 {
                        self.put_pixel(column, pen_y + row);
                    }
                }
                column += 1;
                counter += 4;
            }
        }
    }
}

/// Signed nibble: bit 3 is the sign, bits 0-2 the magnitude
fn short_displacement(nibble: u8) -> i32 {
    let magnitude = (nibble & 0x07) as i32;
    if nibble & 0x08 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

impl<'a, S: PictureSink + ?Sized> PictureVisitor for PictureTracer<'a, S> {
    fn set_color(&mut self, color: u8) {
        self.pen.screen_color = color;
    }

    fn set_screen(&mut self, enabled: bool) {
        self.pen.screen_enabled = enabled;
    }

    fn set_priority_color(&mut self, priority: u8) {
        self.pen.priority_color = priority;
    }

    fn set_priority_toggle(&mut self, enabled: bool) {
        self.pen.priority_enabled = enabled;
    }

    fn draw_y_corner(&mut self, c: &[u8]) {
        if c.len() < 2 {
            return;
        }
        let (mut x1, mut y1) = (c[0] as i32, c[1] as i32);
        self.put_pixel(x1, y1);
        let mut it = c[2..].iter();
        while let Some(&y2) = it.next() {
            self.draw_line(x1, y1, x1, y2 as i32);
            y1 = y2 as i32;
            let Some(&x2) = it.next() else { break };
            self.draw_line(x1, y1, x2 as i32, y1);
            x1 = x2 as i32;
        }
    }

    fn draw_x_corner(&mut self, c: &[u8]) {
        if c.len() < 2 {
            return;
        }
        let (mut x1, mut y1) = (c[0] as i32, c[1] as i32);
        self.put_pixel(x1, y1);
        let mut it = c[2..].iter();
        while let Some(&x2) = it.next() {
            self.draw_line(x1, y1, x2 as i32, y1);
            x1 = x2 as i32;
            let Some(&y2) = it.next() else { break };
            self.draw_line(x1, y1, x1, y2 as i32);
            y1 = y2 as i32;
        }
    }

    fn draw_line_absolute(&mut self, c: &[u8]) {
        if c.len() < 2 {
            return;
        }
        let (mut x1, mut y1) = (c[0] as i32, c[1] as i32);
        self.put_pixel(x1, y1);
        for point in c[2..].chunks_exact(2) {
            let (x2, y2) = (point[0] as i32, point[1] as i32);
            self.draw_line(x1, y1, x2, y2);
            x1 = x2;
            y1 = y2;
        }
    }

    fn draw_line_short(&mut self, c: &[u8]) {
        if c.len() < 2 {
            return;
        }
        let (mut x1, mut y1) = (c[0] as i32, c[1] as i32);
        self.put_pixel(x1, y1);
        for &disp in &c[2..] {
            let dx = short_displacement(disp >> 4);
            let dy = short_displacement(disp & 0x0f);
            self.draw_line(x1, y1, x1 + dx, y1 + dy);
            x1 += dx;
            y1 += dy;
        }
    }

    fn draw_fill(&mut self, x: u8, y: u8) {
        trace!("fill at ({}, {}) with {:?}", x, y, self.pen);
        self.flood_fill(x as i32, y as i32);
    }

    fn set_pattern(&mut self, code: u8, number: u8) {
        self.pen.pattern_code = code;
        self.pen.pattern_number = number;
    }

    fn plot_pattern(&mut self, x: u8, y: u8) {
        self.plot_brush(x, y);
    }
}

/// Decodes `data` and draws it into `sink`
pub fn trace_picture<S: PictureSink + ?Sized>(version: ArchiveVersion, data: &[u8], sink: &mut S) {
    let mut tracer = PictureTracer::new(version, sink);
    decode_picture(data, &mut tracer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picture::Raster;
    use test_log::test;

    fn drawn(raster: &Raster) -> Vec<(usize, usize)> {
        let mut points = Vec::new();
        for y in 0..PICTURE_HEIGHT {
            for x in 0..PICTURE_WIDTH {
                if raster.screen_pixel(x, y) != EMPTY_SCREEN {
                    points.push((x, y));
                }
            }
        }
        points
    }

    fn with_tracer(version: ArchiveVersion, f: impl FnOnce(&mut PictureTracer<Raster>)) -> Raster {
        let mut raster = Raster::new();
        {
            let mut t = PictureTracer::new(version, &mut raster);
            t.set_color(1);
            t.set_screen(true);
            f(&mut t);
        }
        raster
    }

    #[test]
    fn horizontal_line_covers_both_ends() {
        let r = with_tracer(ArchiveVersion::V2, |t| t.draw_line_absolute(&[10, 10, 50, 10]));
        let points = drawn(&r);
        assert_eq!(points.len(), 41);
        assert!(points.iter().all(|&(x, y)| y == 10 && (10..=50).contains(&x)));
    }

    #[test]
    fn diagonal_line_is_symmetric_steps() {
        let r = with_tracer(ArchiveVersion::V2, |t| t.draw_line_absolute(&[0, 0, 4, 2]));
        assert_eq!(drawn(&r), vec![(0, 0), (1, 1), (2, 1), (3, 2), (4, 2)]);
    }

    #[test]
    fn lines_are_clipped_to_the_canvas() {
        let r = with_tracer(ArchiveVersion::V2, |t| t.draw_line_absolute(&[150, 200, 200, 200]));
        let points = drawn(&r);
        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|&(x, y)| y == 167 && x >= 150));
    }

    #[test]
    fn corners_alternate_axes() {
        let r = with_tracer(ArchiveVersion::V2, |t| t.draw_y_corner(&[5, 5, 7, 8]));
        assert_eq!(drawn(&r), vec![(5, 5), (5, 6), (5, 7), (6, 7), (7, 7), (8, 7)]);
        let r = with_tracer(ArchiveVersion::V2, |t| t.draw_x_corner(&[5, 5, 7, 6]));
        assert_eq!(drawn(&r), vec![(5, 5), (6, 5), (7, 5), (7, 6)]);
    }

    #[test]
    fn short_lines_use_signed_nibbles() {
        // (+2, 0) then (-1, +3)
        let r = with_tracer(ArchiveVersion::V2, |t| t.draw_line_short(&[20, 20, 0x20, 0x93]));
        let points = drawn(&r);
        assert!(points.contains(&(22, 20)));
        assert!(points.contains(&(21, 23)));
        assert_eq!(short_displacement(0x0f), -7);
        assert_eq!(short_displacement(0x07), 7);
        assert_eq!(short_displacement(0x08), 0);
    }

    #[test]
    fn fill_needs_an_enabled_plane() {
        let mut raster = Raster::new();
        let mut t = PictureTracer::new(ArchiveVersion::V2, &mut raster);
        t.set_color(2);
        t.draw_fill(0, 0);
        assert!(drawn(&raster).is_empty());
    }

    #[test]
    fn fill_covers_an_empty_canvas() {
        let r = with_tracer(ArchiveVersion::V2, |t| t.draw_fill(80, 80));
        assert_eq!(drawn(&r).len(), PICTURE_WIDTH * PICTURE_HEIGHT);
    }

    #[test]
    fn fill_with_background_colour_does_nothing() {
        let r = with_tracer(ArchiveVersion::V2, |t| {
            t.set_color(EMPTY_SCREEN);
            t.draw_fill(80, 80);
        });
        assert!(drawn(&r).is_empty());
    }

    #[test]
    fn priority_only_fill_checks_priority_plane() {
        let mut raster = Raster::new();
        {
            let mut t = PictureTracer::new(ArchiveVersion::V2, &mut raster);
            t.set_priority_color(9);
            t.set_priority_toggle(true);
            t.draw_line_absolute(&[0, 5, 159, 5]);
            t.draw_fill(0, 0);
        }
        let filled = (0..PICTURE_HEIGHT)
            .flat_map(|y| (0..PICTURE_WIDTH).map(move |x| (x, y)))
            .filter(|&(x, y)| raster.priority_pixel(x, y) == 9)
            .count();
        assert_eq!(filled, PICTURE_WIDTH * 6);
    }

    fn brush(version: ArchiveVersion, code: u8, number: u8) -> usize {
        let r = with_tracer(version, |t| {
            t.set_pattern(code, number);
            t.plot_pattern(80, 80);
        });
        drawn(&r).len()
    }

    #[test]
    fn brush_shapes() {
        assert_eq!(brush(ArchiveVersion::V2, 0x00, 0), 1);
        assert_eq!(brush(ArchiveVersion::V2, 0x01, 0), 3);
        assert_eq!(brush(ArchiveVersion::V3, 0x01, 0), 1);
        assert_eq!(brush(ArchiveVersion::V2, 0x02, 0), 8);
        assert_eq!(brush(ArchiveVersion::V2, 0x12, 0), 10);
        // 4 columns of 15 rows
        assert_eq!(brush(ArchiveVersion::V2, 0x17, 0), 60);
    }

    #[test]
    fn textured_brush_ignores_pattern_number() {
        assert_eq!(brush(ArchiveVersion::V2, 0x20, 0), 0);
        assert_eq!(brush(ArchiveVersion::V2, 0x20, 2), 0);
        assert_eq!(brush(ArchiveVersion::V2, 0x27, 0), 10);
        assert_eq!(brush(ArchiveVersion::V2, 0x37, 0), 15);
        assert_eq!(brush(ArchiveVersion::V2, 0x37, 9), 15);
    }

    #[test]
    fn brush_is_kept_on_the_canvas() {
        let r = with_tracer(ArchiveVersion::V2, |t| {
            t.set_pattern(0x12, 0);
            t.plot_pattern(0, 0);
        });
        let points = drawn(&r);
        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|&(x, y)| x < 2 && y < 5));
    }
}
