// crates/media-core/src/rational.rs
//
// d2q: approximate a floating-point value as a bounded-denominator rational,
// the way the codec library's own `av_d2q` does (spec.md §4.2 step 3, used
// to stamp a forced video FPS). Plain continued-fraction convergents —
// ported from the well-known av_d2q algorithm rather than re-derived.

use ffmpeg_the_third::util::rational::Rational;

pub fn d2q(d: f64, max_den: i32) -> Rational {
    if d.is_nan() || max_den <= 0 {
        return Rational::new(0, 1);
    }
    let sign: i64 = if d < 0.0 { -1 } else { 1 };
    let mut x = d.abs();
    if x > i32::MAX as f64 {
        return Rational::new(sign as i32, 0);
    }

    let (mut num, mut den) = (0i64, 1i64);
    let (mut prev_num, mut prev_den) = (1i64, 0i64);

    for _ in 0..64 {
        let ipart = x.floor();
        let cand_num = ipart as i64 * num + prev_num;
        let cand_den = ipart as i64 * den + prev_den;
        if cand_den > max_den as i64 || cand_num > i32::MAX as i64 {
            break;
        }
        prev_num = num;
        prev_den = den;
        num = cand_num;
        den = cand_den;

        let frac = x - ipart;
        if frac < 1e-9 {
            break;
        }
        x = 1.0 / frac;
    }

    if den == 0 {
        den = 1;
    }
    Rational::new((sign * num) as i32, den as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approximates_common_fps_values() {
        let q = d2q(25.0, 1_000_000);
        assert_eq!(q.numerator(), 25);
        assert_eq!(q.denominator(), 1);
    }

    #[test]
    fn approximates_ntsc_fps() {
        let q = d2q(29.97, 1_000_000);
        let approx = q.numerator() as f64 / q.denominator() as f64;
        assert!((approx - 29.97).abs() < 0.001);
    }

    #[test]
    fn zero_is_exact() {
        let q = d2q(0.0, 1_000_000);
        assert_eq!(q.numerator(), 0);
    }
}
