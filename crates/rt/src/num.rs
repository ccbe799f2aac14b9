//! Decimal conversions for the formatted I/O layer.
//!
//! These are the pure half of the console: [`crate::fmt`] walks templates,
//! the functions here turn single numbers into bytes and back. Every
//! function is total. Malformed input degrades to a best-effort value
//! instead of failing, because the console has no error channel to report
//! into.

use crate::fmt::Sink;

/// Signed decimal. Widens internally so `i32::MIN` renders correctly.
pub fn write_i32(sink: &mut (impl Sink + ?Sized), v: i32) {
    if v < 0 {
        sink.put_byte(b'-');
    }
    write_u64(sink, (v as i64).unsigned_abs());
}

/// Fixed point with exactly two fractional digits, rounding half away from
/// zero at the second decimal. The sign comes from the input value, so
/// `-0.001` renders as `-0.00`.
pub fn write_fixed2(sink: &mut (impl Sink + ?Sized), v: f32) {
    let neg = v < 0.0;
    if neg {
        sink.put_byte(b'-');
    }
    let mag = if neg { -v } else { v };
    // Scale in f64 so the rounding step is not at the mercy of f32 slop.
    let scaled = (mag as f64 * 100.0 + 0.5) as u64;
    write_u64(sink, scaled / 100);
    sink.put_byte(b'.');
    let frac = (scaled % 100) as u8;
    sink.put_byte(b'0' + frac / 10);
    sink.put_byte(b'0' + frac % 10);
}

fn write_u64(sink: &mut (impl Sink + ?Sized), mut v: u64) {
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    for &b in &buf[i..] {
        sink.put_byte(b);
    }
}

/// Optional leading `-`, then digits; stops at the first non-digit byte.
/// Empty or unparseable input yields 0. Overflow wraps, which is as far as
/// the best-effort contract goes.
pub fn parse_i32(s: &[u8]) -> i32 {
    let mut i = 0;
    let mut sign = 1i32;
    if s.first() == Some(&b'-') {
        sign = -1;
        i = 1;
    }
    let mut n = 0i32;
    while i < s.len() && s[i].is_ascii_digit() {
        n = n.wrapping_mul(10).wrapping_add((s[i] - b'0') as i32);
        i += 1;
    }
    n.wrapping_mul(sign)
}

/// Optional leading `-`, digits, with digits after the first `.` scaled as
/// the fraction. Later dots are skipped rather than rejected; any other
/// byte stops the scan.
pub fn parse_f32(s: &[u8]) -> f32 {
    let mut i = 0;
    let mut sign = 1.0f32;
    if s.first() == Some(&b'-') {
        sign = -1.0;
        i = 1;
    }
    let mut value = 0.0f32;
    let mut divisor = 1.0f32;
    let mut dot_seen = false;
    while i < s.len() {
        let b = s[i];
        if b == b'.' {
            dot_seen = true;
            i += 1;
            continue;
        }
        if !b.is_ascii_digit() {
            break;
        }
        value = value * 10.0 + (b - b'0') as f32;
        if dot_seen {
            divisor *= 10.0;
        }
        i += 1;
    }
    sign * value / divisor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt_i32(v: i32) -> String {
        let mut out = Vec::new();
        write_i32(&mut out, v);
        String::from_utf8(out).unwrap()
    }

    fn fmt_fixed2(v: f32) -> String {
        let mut out = Vec::new();
        write_fixed2(&mut out, v);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn i32_zero_and_digits() {
        assert_eq!(fmt_i32(0), "0");
        assert_eq!(fmt_i32(7), "7");
        assert_eq!(fmt_i32(606), "606");
        assert_eq!(fmt_i32(-17), "-17");
    }

    #[test]
    fn i32_extremes() {
        assert_eq!(fmt_i32(i32::MAX), "2147483647");
        assert_eq!(fmt_i32(i32::MIN), "-2147483648");
    }

    #[test]
    fn fixed2_whole_numbers_pad() {
        assert_eq!(fmt_fixed2(3.0), "3.00");
        assert_eq!(fmt_fixed2(0.0), "0.00");
        assert_eq!(fmt_fixed2(1234.5), "1234.50");
    }

    #[test]
    fn fixed2_rounds_half_away_from_zero() {
        // 0.125 is exact in binary, so this pins the tie-break.
        assert_eq!(fmt_fixed2(0.125), "0.13");
        assert_eq!(fmt_fixed2(-0.125), "-0.13");
        assert_eq!(fmt_fixed2(0.124), "0.12");
    }

    #[test]
    fn fixed2_keeps_sign_of_tiny_negatives() {
        assert_eq!(fmt_fixed2(-0.001), "-0.00");
    }

    #[test]
    fn parse_i32_plain_and_signed() {
        assert_eq!(parse_i32(b"42"), 42);
        assert_eq!(parse_i32(b"-17"), -17);
        assert_eq!(parse_i32(b"0"), 0);
    }

    #[test]
    fn parse_i32_lenient_tail_and_garbage() {
        assert_eq!(parse_i32(b"12x4"), 12);
        assert_eq!(parse_i32(b"abc"), 0);
        assert_eq!(parse_i32(b""), 0);
        assert_eq!(parse_i32(b"-"), 0);
    }

    #[test]
    fn parse_i32_full_range() {
        assert_eq!(parse_i32(b"2147483647"), i32::MAX);
        assert_eq!(parse_i32(b"-2147483648"), i32::MIN);
        // Past the range the accumulator wraps; pin the behavior.
        assert_eq!(parse_i32(b"2147483648"), i32::MIN);
    }

    #[test]
    fn parse_f32_basic() {
        assert!((parse_f32(b"3.14") - 3.14).abs() < 1e-5);
        assert_eq!(parse_f32(b"-0.5"), -0.5);
        assert_eq!(parse_f32(b"7"), 7.0);
        assert_eq!(parse_f32(b""), 0.0);
    }

    #[test]
    fn parse_f32_extra_dots_are_skipped() {
        // Digits after the second dot still scale the fraction.
        assert!((parse_f32(b"1.2.3") - 1.23).abs() < 1e-5);
    }

    #[test]
    fn parse_f32_stops_at_garbage() {
        assert_eq!(parse_f32(b"2.x5"), 2.0);
    }

    #[test]
    fn i32_round_trip() {
        for v in [0, 1, -1, 606, -999, i32::MAX, i32::MIN] {
            let text = fmt_i32(v);
            assert_eq!(parse_i32(text.as_bytes()), v);
        }
    }
}
