//! Formatted console I/O.
//!
//! A small printf-style template language over a statically typed argument
//! list. `%d`, `%f`, `%s` and `%c` mark where the next argument goes; any
//! other `%` pair emits nothing and consumes no argument. Scanning reads one
//! input line per placeholder. The walkers are deliberately lenient: a
//! template that disagrees with its arguments skips instead of failing,
//! because the console has no error channel to report into.

use crate::num;

/// Byte-oriented output target.
pub trait Sink {
    fn put_byte(&mut self, b: u8);

    fn put_str(&mut self, s: &str) {
        for b in s.bytes() {
            self.put_byte(b);
        }
    }
}

impl<const N: usize> Sink for heapless::Vec<u8, N> {
    fn put_byte(&mut self, b: u8) {
        // A full buffer swallows the byte; length-limited sinks truncate.
        let _ = self.push(b);
    }
}

#[cfg(test)]
impl Sink for Vec<u8> {
    fn put_byte(&mut self, b: u8) {
        self.push(b);
    }
}

/// One line of input per call: the bytes before the terminator go into
/// `buf`, the return value is the count stored.
pub trait LineSource {
    fn read_line(&mut self, buf: &mut [u8]) -> usize;
}

/// A formatting argument.
#[derive(Clone, Copy, Debug)]
pub enum Arg<'a> {
    Int(i32),
    Fixed(f32),
    Str(&'a str),
    Char(char),
}

/// A scan destination. The slot type picks the conversion: `%d` and `%f`
/// both store into whichever slot comes next, as integer or fixed-point
/// according to the slot itself.
#[derive(Debug)]
pub enum Out<'a> {
    Int(&'a mut i32),
    Fixed(&'a mut f32),
}

/// Walk `template`, copying literal bytes to `sink` and rendering one
/// argument per recognized placeholder.
///
/// The argument's own variant selects the rendering; the specifier letter
/// only marks the position. A `%` with no following byte emits nothing, and
/// placeholders beyond the end of `args` are skipped silently.
pub fn format(sink: &mut (impl Sink + ?Sized), template: &str, args: &[Arg]) {
    let mut args = args.iter();
    let mut bytes = template.bytes();
    while let Some(b) = bytes.next() {
        if b != b'%' {
            sink.put_byte(b);
            continue;
        }
        let Some(spec) = bytes.next() else { break };
        match spec {
            b'd' | b'f' | b's' | b'c' => {
                let Some(arg) = args.next() else { continue };
                emit(sink, arg);
            }
            // Unknown specifier: both bytes swallowed, no argument consumed.
            _ => {}
        }
    }
}

fn emit(sink: &mut (impl Sink + ?Sized), arg: &Arg) {
    match arg {
        Arg::Int(v) => num::write_i32(sink, *v),
        Arg::Fixed(v) => num::write_fixed2(sink, *v),
        Arg::Str(s) => sink.put_str(s),
        Arg::Char(c) => {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                sink.put_byte(b);
            }
        }
    }
}

/// Line length read for each scanned field.
const SCAN_LINE: usize = 64;

/// Walk `template`, reading one line from `src` per placeholder and storing
/// converted values through `outs` in order.
///
/// Only `%d` and `%f` take a slot; any other placeholder letter still
/// consumes a line and discards it. Literal template bytes are not matched
/// against the input. Malformed numeric text degrades per [`crate::num`].
pub fn parse(src: &mut (impl LineSource + ?Sized), template: &str, outs: &mut [Out]) {
    let mut outs = outs.iter_mut();
    let mut bytes = template.bytes();
    while let Some(b) = bytes.next() {
        if b != b'%' {
            continue;
        }
        let Some(spec) = bytes.next() else { break };
        let mut line = [0u8; SCAN_LINE];
        let n = src.read_line(&mut line);
        match spec {
            b'd' | b'f' => {
                let Some(out) = outs.next() else { continue };
                match out {
                    Out::Int(slot) => **slot = num::parse_i32(&line[..n]),
                    Out::Fixed(slot) => **slot = num::parse_f32(&line[..n]),
                }
            }
            _ => {}
        }
    }
}
