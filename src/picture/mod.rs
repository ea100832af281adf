//! Picture resources: a stream of vector drawing commands rendered onto a 160x168
//! visual plane and a parallel priority plane.
//!
//! [`decode_picture`] walks the command stream and reports each command to a
//! [`PictureVisitor`]. [`PictureTracer`] is the visitor that draws: it keeps the pen state
//! and writes pixels through a [`PictureSink`], normally a [`Raster`]. [`PicturePrinter`]
//! is the visitor that lists the commands as text.

pub mod decoder;
pub mod printer;
pub mod raster;
pub mod tracer;

pub use decoder::decode_picture;
pub use printer::PicturePrinter;
pub use raster::Raster;
pub use tracer::{trace_picture, PenState, PictureSink, PictureTracer};

use crate::game::ArchiveVersion;

pub const PICTURE_WIDTH: usize = 160;
pub const PICTURE_HEIGHT: usize = 168;

/// Receives the commands of a picture in stream order.
///
/// Coordinate runs are passed as the raw argument bytes of the command; a trailing odd
/// byte is left for the visitor to ignore.
pub trait PictureVisitor {
    /// 0xF0 and 0xFC: visual colour
    fn set_color(&mut self, color: u8);
    /// 0xF0 enables drawing on the visual plane, 0xF1 disables it
    fn set_screen(&mut self, enabled: bool);
    /// 0xF2 and 0xFC: priority colour
    fn set_priority_color(&mut self, priority: u8);
    /// 0xF2 enables drawing on the priority plane, 0xF3 disables it
    fn set_priority_toggle(&mut self, enabled: bool);
    /// 0xF4: start point, then alternating y and x targets
    fn draw_y_corner(&mut self, coordinates: &[u8]);
    /// 0xF5: start point, then alternating x and y targets
    fn draw_x_corner(&mut self, coordinates: &[u8]);
    /// 0xF6: a list of points joined by lines
    fn draw_line_absolute(&mut self, coordinates: &[u8]);
    /// 0xF7: start point, then one byte per segment holding signed 4-bit dx and dy
    fn draw_line_short(&mut self, coordinates: &[u8]);
    /// 0xF8 and 0xFC: one call per seed point
    fn draw_fill(&mut self, x: u8, y: u8);
    /// 0xF9 sets the brush code; 0xFA with a textured brush also sets the texture number
    fn set_pattern(&mut self, code: u8, number: u8);
    /// 0xFA: one call per brush position
    fn plot_pattern(&mut self, x: u8, y: u8);
    /// 0xFF
    fn end(&mut self) {}
    /// The complete encoded bytes of the command about to be reported
    fn command_bytes(&mut self, _bytes: &[u8]) {}
}

/// Decodes and draws a picture onto a fresh raster
pub fn render(version: ArchiveVersion, data: &[u8]) -> Raster {
    let mut raster = Raster::new();
    trace_picture(version, data, &mut raster);
    raster
}
