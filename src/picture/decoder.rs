use log::{debug, trace};

use super::PictureVisitor;

const SET_COLOR: u8 = 0xf0;
const SCREEN_OFF: u8 = 0xf1;
const SET_PRIORITY: u8 = 0xf2;
const PRIORITY_OFF: u8 = 0xf3;
const Y_CORNER: u8 = 0xf4;
const X_CORNER: u8 = 0xf5;
const LINE_ABSOLUTE: u8 = 0xf6;
const LINE_SHORT: u8 = 0xf7;
const FILL: u8 = 0xf8;
const SET_PATTERN: u8 = 0xf9;
const PLOT_PATTERN: u8 = 0xfa;
const SET_BOTH_AND_FILL: u8 = 0xfc;
const END: u8 = 0xff;

const TEXTURED: u8 = 0x20;

/// Walks a picture's command stream, calling `visitor` once per decoded command.
///
/// Opcodes are bytes >= 0xF0. Commands that take a list of arguments consume bytes up to
/// the next opcode. Decoding stops at 0xFF or at the end of the data; a command whose
/// fixed operands are cut off by the end of the data is dropped.
pub fn decode_picture(data: &[u8], visitor: &mut dyn PictureVisitor) {
    let mut it = 0;
    let mut pattern_code = 0u8;
    let mut pattern_number = 0u8;

    while it < data.len() {
        let command_start = it;
        let command = data[it];
        it += 1;

        match command {
            SET_COLOR | SET_PRIORITY | SET_PATTERN => {
                let Some(&operand) = data.get(it) else {
                    debug!("picture: {:#04x} at {:#06x} has no operand", command, command_start);
                    return;
                };
                it += 1;
                visitor.command_bytes(&data[command_start..it]);
                match command {
                    SET_COLOR => {
                        visitor.set_color(operand);
                        visitor.set_screen(true);
                    }
                    SET_PRIORITY => {
                        visitor.set_priority_color(operand);
                        visitor.set_priority_toggle(true);
                    }
                    _ => {
                        pattern_code = operand;
                        visitor.set_pattern(pattern_code, pattern_number);
                    }
                }
                continue;
            }
            SCREEN_OFF | PRIORITY_OFF => {
                visitor.command_bytes(&data[command_start..it]);
                if command == SCREEN_OFF {
                    visitor.set_screen(false);
                } else {
                    visitor.set_priority_toggle(false);
                }
                continue;
            }
            END => {
                visitor.command_bytes(&data[command_start..it]);
                visitor.end();
                return;
            }
            _ => {}
        }

        // 0xFC carries its two colours ahead of the fill list
        let mut args = it;
        if command == SET_BOTH_AND_FILL {
            if data.len() < it + 2 {
                debug!("picture: {:#04x} at {:#06x} is cut short", command, command_start);
                return;
            }
            args += 2;
            it += 2;
        }
        while it < data.len() && data[it] < 0xf0 {
            it += 1;
        }
        visitor.command_bytes(&data[command_start..it]);
        let run = &data[args..it];
        trace!("picture: {:#04x} with {} argument bytes", command, run.len());

        match command {
            Y_CORNER => visitor.draw_y_corner(run),
            X_CORNER => visitor.draw_x_corner(run),
            LINE_ABSOLUTE => visitor.draw_line_absolute(run),
            LINE_SHORT => visitor.draw_line_short(run),
            FILL | SET_BOTH_AND_FILL => {
                if command == SET_BOTH_AND_FILL {
                    visitor.set_color(data[command_start + 1]);
                    visitor.set_priority_color(data[command_start + 2]);
                }
                for pair in run.chunks_exact(2) {
                    visitor.draw_fill(pair[0], pair[1]);
                }
            }
            PLOT_PATTERN => {
                let mut p = 0;
                while p < run.len() {
                    if pattern_code & TEXTURED != 0 {
                        pattern_number = run[p] >> 1;
                        p += 1;
                        visitor.set_pattern(pattern_code, pattern_number);
                    }
                    if run.len() - p < 2 {
                        break;
                    }
                    visitor.plot_pattern(run[p], run[p + 1]);
                    p += 2;
                }
            }
            _ => debug!(
                "picture: skipping unknown command {:#04x} at {:#06x}",
                command, command_start
            ),
        }
    }
}
