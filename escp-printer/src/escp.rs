//! ESC/P command encoder
//!
//! Builds ESC/P byte streams for dot-matrix receipt/report printers:
//! mode-state tracking, proportional column layout and justified text
//! with multi-line reflow. One encoder instance per print job.

use tracing::instrument;

use crate::encoding::encode_char;
use crate::profile::{PrinterProfile, PrinterType};

/// `ESC !` master-select bit for emphasized (bold) print
pub const BOLD: u8 = 0x08;
/// `ESC !` master-select bit for double-height print
pub const DOUBLE_HEIGHT: u8 = 0x10;
/// `ESC !` master-select bit for 12-cpi (elite) pitch
pub const CPI: u8 = 0x01;

const ESC: u8 = 0x1B;

/// Field justification for the single-field writer and the reflow loop
#[derive(Debug, Clone, Copy)]
enum Justify {
    Left,
    Center,
    Right,
}

/// ESC/P command encoder
///
/// Owns the output buffer and the running printer state. Mode flags
/// persist across calls; every toggle re-emits the full mode byte so the
/// device always sees a consistent style state.
pub struct Escp {
    printer_type: PrinterType,
    /// Combined `ESC !` mode byte, OR of the active flag bits
    master: u8,
    width10: usize,
    width12: usize,
    width15: usize,
    /// Current line width in characters
    width: usize,
    /// Column percentages; empty means full-width fields
    columns: Vec<u32>,
    /// Cycling index of the next column field
    cur_col: usize,
    /// Unused width left on the current line (diagnostic only)
    rest_width: usize,
    /// Line advances so far (diagnostic only)
    num_lines: usize,
    buf: Vec<u8>,
}

impl Escp {
    /// Create an encoder for a printer with the given pitch widths
    ///
    /// `width10`/`width12`/`width15` are the line capacities in characters
    /// at 10, 12 and 15 cpi. The current width starts at the 10-cpi value.
    /// The initialization sequence is emitted immediately.
    pub fn new(printer_type: PrinterType, width10: usize, width12: usize, width15: usize) -> Self {
        let mut buf = Vec::with_capacity(4096);
        // Initialize printer (ESC 0x04)
        buf.extend_from_slice(&[ESC, 0x04]);
        Self {
            printer_type,
            master: 0,
            width10,
            width12,
            width15,
            width: width10,
            columns: Vec::new(),
            cur_col: 0,
            rest_width: 0,
            num_lines: 0,
            buf,
        }
    }

    /// Create an encoder from a printer profile
    pub fn from_profile(profile: &PrinterProfile) -> Self {
        Self::new(
            profile.printer_type,
            profile.width10,
            profile.width12,
            profile.width15,
        )
    }

    /// Physical printer class this job targets
    pub fn printer_type(&self) -> PrinterType {
        self.printer_type
    }

    /// Current line width in characters
    pub fn width(&self) -> usize {
        self.width
    }

    /// Override the current line width
    pub fn set_width(&mut self, width: usize) -> &mut Self {
        self.width = width;
        self
    }

    /// Number of line advances emitted so far
    pub fn line_count(&self) -> usize {
        self.num_lines
    }

    /// Width left on the current line; meaningful after a line advance
    pub fn remaining_width(&self) -> usize {
        self.rest_width
    }

    // === Mode Control ===

    /// Current combined mode byte
    pub fn mode_byte(&self) -> u8 {
        self.master
    }

    /// Whether a mode flag (`BOLD`, `DOUBLE_HEIGHT`, `CPI`) is active
    pub fn is_mode_set(&self, flag: u8) -> bool {
        self.master & flag != 0
    }

    /// Enable or disable bold print
    pub fn bold(&mut self, on: bool) -> &mut Self {
        if on {
            self.master |= BOLD;
        } else {
            self.master &= !BOLD;
        }
        self.emit_mode();
        self
    }

    /// Enable or disable double-height print
    pub fn double_height(&mut self, on: bool) -> &mut Self {
        if on {
            self.master |= DOUBLE_HEIGHT;
        } else {
            self.master &= !DOUBLE_HEIGHT;
        }
        self.emit_mode();
        self
    }

    /// Double-width print - reserved capability, accepted and ignored
    ///
    /// Kept as a real entry point so callers written against the full
    /// interface keep working; the target profile does not support it.
    pub fn double_width(&mut self, _on: bool) -> &mut Self {
        self
    }

    /// Select 10 cpi (pica): clears the pitch flag, width becomes the
    /// 10-cpi capacity
    pub fn cpi10(&mut self) -> &mut Self {
        self.master &= !CPI;
        self.emit_mode();
        self.width = self.width10;
        self
    }

    /// Select 12 cpi (elite): sets the pitch flag, width becomes the
    /// 12-cpi capacity
    pub fn cpi12(&mut self) -> &mut Self {
        self.master |= CPI;
        self.emit_mode();
        self.width = self.width12;
        self
    }

    /// Select 15 cpi via the device-specific `ESC g` toggle
    ///
    /// Known asymmetry with [`cpi10`](Self::cpi10)/[`cpi12`](Self::cpi12):
    /// this does not touch the mode byte or the layout width, so text
    /// keeps being laid out at the previous width. Preserved as observed
    /// device behavior.
    pub fn cpi15(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x67]);
        self
    }

    /// Append `ESC !` followed by the combined mode byte
    fn emit_mode(&mut self) {
        self.buf.extend_from_slice(&[ESC, 0x21, self.master]);
    }

    // === Column Layout ===

    /// Replace the column layout and reset the column cursor
    ///
    /// Percentages divide the line into proportional fields; one character
    /// per column is held back for separators. An empty slice returns to
    /// full-width fields.
    pub fn set_columns(&mut self, percentages: &[u32]) -> &mut Self {
        self.columns = percentages.to_vec();
        self.cur_col = 0;
        self
    }

    /// Field width of a column under the current line width
    ///
    /// Returns 0 when no columns are configured or the index is out of
    /// range - callers must guard the zero case.
    pub fn column_width(&self, col: usize) -> usize {
        if self.columns.is_empty() {
            return 0;
        }
        let usable = self.width.saturating_sub(self.columns.len());
        match self.columns.get(col) {
            Some(&pct) => usable * pct as usize / 100,
            None => 0,
        }
    }

    /// Width of the next field, consuming one column slot when columns
    /// are active. The cursor wraps to 0 once it reaches the column count.
    fn field_width(&mut self) -> usize {
        if self.columns.is_empty() {
            return self.width;
        }
        if self.cur_col >= self.columns.len() {
            self.cur_col = 0;
        }
        let w = self.column_width(self.cur_col);
        self.cur_col += 1;
        w
    }

    // === Text Output ===

    /// Write a left-justified field
    ///
    /// With `overflow` and no columns active the text is appended raw,
    /// unpadded and untruncated. Otherwise the text is truncated or
    /// space-padded on the right to exactly the field width.
    pub fn left_text(&mut self, text: &str, overflow: bool) -> &mut Self {
        let w = self.field_width();
        if overflow && self.columns.is_empty() {
            self.put_text(text);
        } else {
            self.put_field(text, w, Justify::Left);
        }
        self
    }

    /// Write a center-justified field
    ///
    /// With `overflow` and no columns active, long text reflows onto
    /// multiple centered lines instead of being appended raw. Odd padding
    /// favors the right side.
    pub fn center_text(&mut self, text: &str, overflow: bool) -> &mut Self {
        let w = self.field_width();
        if overflow && self.columns.is_empty() {
            self.write_wrapped(text, w, Justify::Center);
        } else {
            self.put_field(text, w, Justify::Center);
        }
        self
    }

    /// Write a right-justified field
    ///
    /// With `overflow` and no columns active, long text reflows onto
    /// multiple right-justified lines.
    pub fn right_text(&mut self, text: &str, overflow: bool) -> &mut Self {
        let w = self.field_width();
        if overflow && self.columns.is_empty() {
            self.write_wrapped(text, w, Justify::Right);
        } else {
            self.put_field(text, w, Justify::Right);
        }
        self
    }

    /// Truncate or pad `text` to exactly `w` characters and append it
    fn put_field(&mut self, text: &str, w: usize, justify: Justify) {
        let len = text.chars().count();
        if len > w {
            let truncated: String = text.chars().take(w).collect();
            self.put_text(&truncated);
            return;
        }
        let pad = w - len;
        let left_pad = match justify {
            Justify::Left => 0,
            Justify::Center => pad / 2,
            Justify::Right => pad,
        };
        let mut field = String::with_capacity(w);
        for _ in 0..left_pad {
            field.push(' ');
        }
        field.push_str(text);
        for _ in left_pad..pad {
            field.push(' ');
        }
        self.put_text(&field);
    }

    /// Reflow text over as many lines as it needs
    ///
    /// Paragraphs (split on `'\n'`) are processed in order; slice `i` of a
    /// paragraph covers characters `[i*width, i*width + l)`. Every slice
    /// goes through the single-field writer and is followed by a line
    /// advance. Empty paragraphs produce no lines.
    #[instrument(skip(self, text))]
    fn write_wrapped(&mut self, text: &str, width: usize, justify: Justify) {
        debug_assert!(width > 0, "reflow width must be positive");
        if width == 0 {
            return;
        }
        for paragraph in text.split('\n') {
            let chars: Vec<char> = paragraph.chars().collect();
            let mut remaining = chars.len();
            let mut row = 0;
            while remaining > 0 {
                let len = if remaining >= width {
                    remaining -= width;
                    width
                } else {
                    let len = remaining;
                    remaining = 0;
                    len
                };
                let start = row * width;
                let slice: String = chars[start..start + len].iter().collect();
                self.put_field(&slice, width, justify);
                self.new_line();
                row += 1;
            }
        }
    }

    /// Encode and append laid-out text
    fn put_text(&mut self, s: &str) {
        self.buf.extend(s.chars().map(encode_char));
    }

    // === Line Control ===

    /// Fill the current line with `fill` and advance
    pub fn line(&mut self, fill: char) -> &mut Self {
        let row = fill.to_string().repeat(self.width);
        self.put_text(&row);
        self.new_line()
    }

    /// Advance a single line
    pub fn new_line(&mut self) -> &mut Self {
        self.feed(1)
    }

    /// Append `lines` newline bytes and reset the line state
    ///
    /// The column cursor returns to the first column and the remaining
    /// width tracker returns to the full line width. Counts as one line
    /// advance regardless of `lines`.
    pub fn feed(&mut self, lines: usize) -> &mut Self {
        for _ in 0..lines {
            self.buf.push(0x0A);
        }
        self.rest_width = self.width;
        self.cur_col = 0;
        self.num_lines += 1;
        self
    }

    // === Cash Drawer ===

    /// Pulse the cash-drawer kick signal
    pub fn open_drawer(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&Self::drawer_command());
        self
    }

    /// The raw drawer-kick command (`ESC p 0 25 250`), byte-for-byte
    pub fn drawer_command() -> [u8; 5] {
        [ESC, 0x70, 0x00, 0x19, 0xFA]
    }

    // === Build ===

    /// Borrow the encoded bytes so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the encoder and return the finished job
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for Escp {
    fn default() -> Self {
        Self::from_profile(&PrinterProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INIT: &[u8] = &[0x1B, 0x04];

    fn encoder(width: usize) -> Escp {
        Escp::new(PrinterType::NinePin, width, width, width)
    }

    /// Buffer contents after the init sequence
    fn tail(escp: &Escp) -> &[u8] {
        &escp.as_bytes()[INIT.len()..]
    }

    #[test]
    fn test_init_sequence_first() {
        let escp = encoder(20);
        assert_eq!(escp.as_bytes(), INIT);
    }

    #[test]
    fn test_left_text_pads_right() {
        let mut escp = encoder(10);
        escp.left_text("abc", false);
        assert_eq!(tail(&escp), b"abc       ");
    }

    #[test]
    fn test_right_text_pads_left() {
        let mut escp = encoder(6);
        escp.right_text("abc", false);
        assert_eq!(tail(&escp), b"   abc");
    }

    #[test]
    fn test_center_odd_pad_favors_right() {
        let mut escp = encoder(6);
        escp.center_text("abc", false);
        assert_eq!(tail(&escp), b" abc  ");
    }

    #[test]
    fn test_long_text_truncates() {
        let mut escp = encoder(5);
        escp.left_text("abcdefgh", false);
        assert_eq!(tail(&escp), b"abcde");

        let mut escp = encoder(5);
        escp.right_text("abcdefgh", false);
        assert_eq!(tail(&escp), b"abcde");
    }

    #[test]
    fn test_overflow_left_appends_raw() {
        let mut escp = encoder(4);
        escp.left_text("abcdefgh", true);
        assert_eq!(tail(&escp), b"abcdefgh");
    }

    #[test]
    fn test_mode_byte_accumulates() {
        let mut escp = encoder(10);
        escp.bold(true);
        assert_eq!(tail(&escp), &[0x1B, 0x21, BOLD]);
        escp.double_height(true);
        assert_eq!(&tail(&escp)[3..], &[0x1B, 0x21, BOLD | DOUBLE_HEIGHT]);
        escp.bold(false);
        assert_eq!(&tail(&escp)[6..], &[0x1B, 0x21, DOUBLE_HEIGHT]);
        assert!(escp.is_mode_set(DOUBLE_HEIGHT));
        assert!(!escp.is_mode_set(BOLD));
    }

    #[test]
    fn test_pitch_switch_updates_width_and_flag() {
        let mut escp = Escp::new(PrinterType::NinePin, 80, 96, 120);
        escp.cpi12();
        assert_eq!(escp.width(), 96);
        assert_eq!(escp.mode_byte(), CPI);
        escp.cpi10();
        assert_eq!(escp.width(), 80);
        assert_eq!(escp.mode_byte(), 0);
    }

    #[test]
    fn test_cpi15_leaves_width_alone() {
        let mut escp = Escp::new(PrinterType::NinePin, 80, 96, 120);
        escp.cpi15();
        assert_eq!(escp.width(), 80);
        assert_eq!(escp.mode_byte(), 0);
        assert_eq!(tail(&escp), &[0x1B, 0x67]);
        // A subsequent write still lays out at the 10-cpi width
        let before = escp.as_bytes().len();
        escp.left_text("x", false);
        assert_eq!(escp.as_bytes().len() - before, 80);
    }

    #[test]
    fn test_column_widths() {
        let mut escp = encoder(20);
        escp.set_columns(&[50, 50]);
        // (20 - 2) * 50 / 100 = 9
        assert_eq!(escp.column_width(0), 9);
        assert_eq!(escp.column_width(1), 9);
        // Out of range collapses to 0
        assert_eq!(escp.column_width(2), 0);
    }

    #[test]
    fn test_column_cursor_cycles() {
        let mut escp = encoder(20);
        escp.set_columns(&[50, 50]);
        escp.left_text("a", false)
            .left_text("b", false)
            .left_text("c", false);
        // Three consecutive 9-wide fields: the cursor wraps past the end
        assert_eq!(tail(&escp), b"a        b        c        ");
    }

    #[test]
    fn test_overflow_ignored_inside_columns() {
        let mut escp = encoder(20);
        escp.set_columns(&[50, 50]);
        escp.left_text("abcdefghijkl", true);
        assert_eq!(tail(&escp), b"abcdefghi");
    }

    #[test]
    fn test_center_reflow_slices_and_feeds() {
        let mut escp = encoder(4);
        escp.center_text("ABCDEFGHIJ", true);
        // Slices ABCD / EFGH / IJ, one line advance each
        assert_eq!(tail(&escp), b"ABCD\nEFGH\n IJ \n");
        assert_eq!(escp.line_count(), 3);
    }

    #[test]
    fn test_right_reflow() {
        let mut escp = encoder(4);
        escp.right_text("ABCDEF", true);
        assert_eq!(tail(&escp), b"ABCD\n  EF\n");
    }

    #[test]
    fn test_reflow_skips_empty_paragraphs() {
        let mut escp = encoder(4);
        escp.center_text("AB\n\nCD", true);
        assert_eq!(tail(&escp), b" AB \n CD \n");
        assert_eq!(escp.line_count(), 2);
    }

    #[test]
    fn test_drawer_kick_bytes() {
        assert_eq!(Escp::drawer_command(), [0x1B, 0x70, 0x00, 0x19, 0xFA]);
        let mut escp = encoder(10);
        escp.open_drawer();
        assert_eq!(tail(&escp), &[0x1B, 0x70, 0x00, 0x19, 0xFA]);
    }

    #[test]
    fn test_line_fills_width() {
        let mut escp = encoder(8);
        escp.line('-');
        assert_eq!(tail(&escp), b"--------\n");
        assert_eq!(escp.line_count(), 1);
    }

    #[test]
    fn test_feed_resets_line_state() {
        let mut escp = encoder(20);
        escp.set_columns(&[50, 50]);
        escp.left_text("a", false);
        escp.feed(2);
        assert_eq!(escp.line_count(), 1);
        assert_eq!(escp.remaining_width(), 20);
        // Cursor is back at the first column
        let before = escp.as_bytes().len();
        escp.left_text("b", false);
        assert_eq!(escp.as_bytes().len() - before, 9);
    }

    #[test]
    fn test_double_width_is_noop() {
        let mut escp = encoder(10);
        escp.double_width(true).double_width(false);
        assert_eq!(escp.as_bytes(), INIT);
        assert_eq!(escp.mode_byte(), 0);
    }

    #[test]
    fn test_non_ascii_is_single_byte() {
        let mut escp = encoder(6);
        escp.left_text("café", false);
        assert_eq!(tail(&escp), &[b'c', b'a', b'f', 0xE9, b' ', b' ']);
    }

    #[test]
    fn test_from_profile_uses_10cpi_width() {
        let profile = PrinterProfile {
            printer_type: PrinterType::TwentyFourPin,
            width10: 33,
            width12: 40,
            width15: 50,
        };
        let escp = Escp::from_profile(&profile);
        assert_eq!(escp.width(), 33);
        assert_eq!(escp.printer_type(), PrinterType::TwentyFourPin);
    }
}
