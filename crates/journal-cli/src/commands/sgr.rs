//! ANSI colors and the balance bar used by `ls`

const DARK_GRAY: &str = "\x1b[1;30m";
const LIGHT_RED: &str = "\x1b[1;31m";
const LIGHT_GREEN: &str = "\x1b[1;32m";
const REVERSE: &str = "\x1b[7m";
const RESET: &str = "\x1b[0m";

/// Number of cells in a balance bar
const BARS: i64 = 30;

/// Select Graphic Rendition helper, scaled to the balance range being shown
#[derive(Debug, Clone, Copy)]
pub struct Sgr {
    pub min: i64,
    pub max: i64,
    pub enabled: bool,
}

impl Sgr {
    pub fn new(min: i64, max: i64, enabled: bool) -> Self {
        Self { min, max, enabled }
    }

    /// Horizontal bar centered on zero: negative balances grow to the left,
    /// positive to the right. Without colors the bar is drawn with `-`/`+`.
    pub fn bar(&self, n: i64) -> String {
        let bar_size = (self.max - self.min) / BARS;
        let pos = if bar_size > 0 { n / bar_size } else { 0 };

        let mut out = String::new();
        let mut fill = ' ';
        let mut open = false;
        let (start, end) = (-BARS / 2, BARS / 2);
        for i in start..end {
            if !open && i < 0 && i >= pos {
                self.symbol(&mut out, &mut fill, '-', &[REVERSE, LIGHT_GREEN]);
                open = true;
            } else if i > 0 {
                if !open && i <= pos {
                    self.symbol(&mut out, &mut fill, '+', &[REVERSE, LIGHT_RED]);
                    open = true;
                } else if open && i > pos {
                    self.symbol(&mut out, &mut fill, ' ', &[RESET]);
                    open = false;
                }
            }
            out.push(fill);
            if open && (i == 0 || i == end - 1) {
                self.symbol(&mut out, &mut fill, ' ', &[RESET]);
                open = false;
            }
        }
        out
    }

    fn symbol(&self, out: &mut String, fill: &mut char, symbol: char, codes: &[&str]) {
        if self.enabled {
            codes.iter().for_each(|c| out.push_str(c));
        } else {
            *fill = symbol;
        }
    }

    /// Wrap a formatted balance in the color matching its state
    pub fn paint(&self, text: &str, balance: i64, balanced: bool) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let color = if balanced {
            DARK_GRAY
        } else if balance < 0 {
            LIGHT_GREEN
        } else {
            LIGHT_RED
        };
        format!("{}{}{}", color, text, RESET)
    }
}

/// Printable width of `s`, ignoring escape sequences
pub fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip to the final byte of the sequence
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        let cases = [
            (4000, 0, 10000, true, "                \x1b[7m\x1b[1;31m            \x1b[0m  "),
            // Out of bounds
            (10000, 0, 5000, true, "                \x1b[7m\x1b[1;31m              \x1b[0m"),
            (-5000, -10000, 10000, true, "        \x1b[7m\x1b[1;32m        \x1b[0m              "),
            // Inverted scale draws nothing
            (-2000, -5000, -10000, true, "                              "),
            (0, 0, 1000, true, "                              "),
            (4000, 0, 10000, false, "                ++++++++++++  "),
            (-5000, -10000, 10000, false, "        --------              "),
            (0, 0, 1000, false, "                              "),
        ];
        for (i, (n, min, max, enabled, want)) in cases.into_iter().enumerate() {
            assert_eq!(Sgr::new(min, max, enabled).bar(n), want, "case #{}", i);
        }
    }

    #[test]
    fn test_paint() {
        let plain = Sgr::new(0, 0, false);
        assert_eq!(plain.paint("1.00", 100, false), "1.00");

        let color = Sgr::new(0, 0, true);
        assert_eq!(color.paint("0.00", 0, true), "\x1b[1;30m0.00\x1b[0m");
        assert_eq!(color.paint("-1.00", -100, false), "\x1b[1;32m-1.00\x1b[0m");
        assert_eq!(color.paint("1.00", 100, false), "\x1b[1;31m1.00\x1b[0m");
    }

    #[test]
    fn test_visible_width() {
        assert_eq!(visible_width("abc"), 3);
        assert_eq!(visible_width("\x1b[1;31mabc\x1b[0m"), 3);
        assert_eq!(visible_width("Lønn"), 4);
        let bar = Sgr::new(0, 10000, true).bar(4000);
        assert_eq!(visible_width(&bar), BARS as usize);
    }
}
