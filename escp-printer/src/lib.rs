//! # escp-printer
//!
//! ESC/P dot-matrix printer library - text layout and command encoding only.
//!
//! ## Scope
//!
//! This crate handles HOW a print job is encoded:
//! - ESC/P command building (mode byte, pitch switching, drawer kick)
//! - Proportional column layout over a fixed-pitch line
//! - Justified text with truncation, padding and multi-line reflow
//! - Windows-1252 device encoding
//!
//! Transport and document logic should stay in application code:
//! - Spool/device delivery of the finished buffer
//! - Receipt/report rendering (WHAT to print)
//!
//! ## Example
//!
//! ```
//! use escp_printer::{Escp, PrinterType};
//!
//! // Build an ESC/P job for a 40-column receipt printer
//! let mut escp = Escp::new(PrinterType::NinePin, 40, 48, 60);
//! escp.bold(true);
//! escp.center_text("CASH RECEIPT", false);
//! escp.new_line();
//! escp.bold(false);
//! escp.line('=');
//! escp.set_columns(&[60, 20, 20]);
//! escp.left_text("Item", false);
//! escp.right_text("Qty", false);
//! escp.right_text("Price", false);
//! escp.new_line();
//! escp.open_drawer();
//!
//! // Send to the spooler/device of your choice
//! let job: Vec<u8> = escp.build();
//! # assert!(job.starts_with(&[0x1B, 0x04]));
//! ```

mod encoding;
mod error;
mod escp;
mod profile;

// Re-exports
pub use encoding::{encode_char, to_cp1252};
pub use error::{ProfileError, ProfileResult};
pub use escp::{BOLD, CPI, DOUBLE_HEIGHT, Escp};
pub use profile::{PrinterProfile, PrinterType};
