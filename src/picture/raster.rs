use std::io::{self, Write};

use super::tracer::{PictureSink, EMPTY_PRIORITY, EMPTY_SCREEN};
use super::{PICTURE_HEIGHT, PICTURE_WIDTH};

const PLANE_LEN: usize = PICTURE_WIDTH * PICTURE_HEIGHT;

/// Priorities below this value are control lines, not depths
const FIRST_PRIORITY: u8 = 4;

#[rustfmt::skip]
pub const EGA_PALETTE: [[u8; 3]; 16] = [
    [0x00, 0x00, 0x00], [0x00, 0x00, 0xaa], [0x00, 0xaa, 0x00], [0x00, 0xaa, 0xaa],
    [0xaa, 0x00, 0x00], [0xaa, 0x00, 0xaa], [0xaa, 0x55, 0x00], [0xaa, 0xaa, 0xaa],
    [0x55, 0x55, 0x55], [0x55, 0x55, 0xff], [0x55, 0xff, 0x55], [0x55, 0xff, 0xff],
    [0xff, 0x55, 0x55], [0xff, 0x55, 0xff], [0xff, 0xff, 0x55], [0xff, 0xff, 0xff],
];

/// The visual and priority planes of a picture, `y * 160 + x` addressed.
/// Writes outside the canvas are ignored, reads outside it return 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    screen: Vec<u8>,
    priority: Vec<u8>,
}

impl Default for Raster {
    fn default() -> Self {
        Raster::new()
    }
}

fn index(x: usize, y: usize) -> Option<usize> {
    if x < PICTURE_WIDTH && y < PICTURE_HEIGHT {
        Some(y * PICTURE_WIDTH + x)
    } else {
        None
    }
}

impl Raster {
    pub fn new() -> Raster {
        Raster {
            screen: vec![EMPTY_SCREEN; PLANE_LEN],
            priority: vec![EMPTY_PRIORITY; PLANE_LEN],
        }
    }

    pub fn screen(&self) -> &[u8] {
        &self.screen
    }

    pub fn priority(&self) -> &[u8] {
        &self.priority
    }

    /// Separates control lines from the priority plane. Returns `(priority, control)`:
    /// a control pixel takes the first real priority found below it in its column
    /// (4 when there is none) and the control plane holds its value, 15 elsewhere.
    pub fn split_priority_and_control(&self) -> (Vec<u8>, Vec<u8>) {
        let mut priority = vec![0u8; PLANE_LEN];
        let mut control = vec![0u8; PLANE_LEN];

        for y in 0..PICTURE_HEIGHT {
            for x in 0..PICTURE_WIDTH {
                let i = y * PICTURE_WIDTH + x;
                let pixel = self.priority[i];
                if pixel < FIRST_PRIORITY {
                    let below = (y + 1..PICTURE_HEIGHT)
                        .map(|y2| self.priority[y2 * PICTURE_WIDTH + x])
                        .find(|p| *p >= FIRST_PRIORITY)
                        .unwrap_or(FIRST_PRIORITY);
                    control[i] = pixel;
                    priority[i] = below;
                } else {
                    control[i] = EMPTY_SCREEN;
                    priority[i] = pixel;
                }
            }
        }
        (priority, control)
    }

    /// Writes a plane as a binary PPM using the EGA palette
    pub fn write_ppm<W: Write>(plane: &[u8], out: &mut W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", PICTURE_WIDTH, PICTURE_HEIGHT)?;
        let mut rgb = Vec::with_capacity(PLANE_LEN * 3);
        for p in plane.iter().take(PLANE_LEN) {
            rgb.extend_from_slice(&EGA_PALETTE[(*p & 0x0f) as usize]);
        }
        out.write_all(&rgb)
    }
}

impl PictureSink for Raster {
    fn screen_pixel(&self, x: usize, y: usize) -> u8 {
        index(x, y).map_or(0, |i| self.screen[i])
    }

    fn set_screen_pixel(&mut self, x: usize, y: usize, color: u8) {
        if let Some(i) = index(x, y) {
            self.screen[i] = color;
        }
    }

    fn priority_pixel(&self, x: usize, y: usize) -> u8 {
        index(x, y).map_or(0, |i| self.priority[i])
    }

    fn set_priority_pixel(&mut self, x: usize, y: usize, priority: u8) {
        if let Some(i) = index(x, y) {
            self.priority[i] = priority;
        }
    }
}
