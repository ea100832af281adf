use std::fmt::{Display, Error, Formatter};

use super::PictureVisitor;

/// Lists picture commands one per line, optionally preceded by their encoded bytes
#[derive(Debug, Default)]
pub struct PicturePrinter {
    lines: Vec<String>,
    show_bytes: bool,
}

impl PicturePrinter {
    pub fn new() -> PicturePrinter {
        PicturePrinter::default()
    }

    pub fn with_bytes() -> PicturePrinter {
        PicturePrinter {
            lines: Vec::new(),
            show_bytes: true,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn points(coordinates: &[u8]) -> String {
        let parts: Vec<String> = coordinates
            .chunks(2)
            .map(|pair| match pair {
                [x, y] => format!("({},{})", x, y),
                _ => format!("{}", pair[0]),
            })
            .collect();
        parts.join(" ")
    }
}

impl PictureVisitor for PicturePrinter {
    fn set_color(&mut self, color: u8) {
        self.lines.push(format!("color {}", color));
    }

    fn set_screen(&mut self, enabled: bool) {
        self.lines.push(format!("screen {}", if enabled { "on" } else { "off" }));
    }

    fn set_priority_color(&mut self, priority: u8) {
        self.lines.push(format!("priority {}", priority));
    }

    fn set_priority_toggle(&mut self, enabled: bool) {
        self.lines
            .push(format!("priority {}", if enabled { "on" } else { "off" }));
    }

    fn draw_y_corner(&mut self, coordinates: &[u8]) {
        self.lines
            .push(format!("y-corner {}", Self::points(coordinates)));
    }

    fn draw_x_corner(&mut self, coordinates: &[u8]) {
        self.lines
            .push(format!("x-corner {}", Self::points(coordinates)));
    }

    fn draw_line_absolute(&mut self, coordinates: &[u8]) {
        self.lines.push(format!("line {}", Self::points(coordinates)));
    }

    fn draw_line_short(&mut self, coordinates: &[u8]) {
        let start = Self::points(&coordinates[..coordinates.len().min(2)]);
        let steps: Vec<String> = coordinates
            .iter()
            .skip(2)
            .map(|d| format!("{:02x}", d))
            .collect();
        self.lines
            .push(format!("short-line {} {}", start, steps.join(" ")).trim_end().to_string());
    }

    fn draw_fill(&mut self, x: u8, y: u8) {
        self.lines.push(format!("fill ({},{})", x, y));
    }

    fn set_pattern(&mut self, code: u8, number: u8) {
        self.lines.push(format!("pattern {:#04x} {}", code, number));
    }

    fn plot_pattern(&mut self, x: u8, y: u8) {
        self.lines.push(format!("plot ({},{})", x, y));
    }

    fn end(&mut self) {
        self.lines.push("end".to_string());
    }

    fn command_bytes(&mut self, bytes: &[u8]) {
        if self.show_bytes {
            let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
            self.lines.push(format!("; {}", hex.join(" ")));
        }
    }
}

impl Display for PicturePrinter {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
