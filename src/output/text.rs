//! Plain text report.
//!
//! One line per registered directory, in registration order:
//!
//! ```text
//! /home/user/photos [/home/user/photos/a.jpg /home/user/photos/b.jpg]
//! /mnt/backup []
//! ```

use std::io::{self, Write};

use yansi::Paint;

use crate::duplicates::{DirectoryReport, DuplicateReport};

/// Text formatter for a [`DuplicateReport`].
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    report: &'a DuplicateReport,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter. With `color`, directory names are printed bold.
    #[must_use]
    pub fn new(report: &'a DuplicateReport, color: bool) -> Self {
        Self { report, color }
    }

    /// Write every directory line to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for entry in self.report.entries() {
            self.write_entry(writer, entry)?;
        }
        writer.flush()
    }

    fn write_entry<W: Write>(&self, writer: &mut W, entry: &DirectoryReport) -> io::Result<()> {
        let display = entry.directory.display_path.display();
        if self.color {
            write!(writer, "{} [", display.bold())?;
        } else {
            write!(writer, "{} [", display)?;
        }

        for (i, path) in entry.duplicates.iter().enumerate() {
            if i > 0 {
                writer.write_all(b" ")?;
            }
            write!(writer, "{}", path.display())?;
        }
        writeln!(writer, "]")
    }

    /// Render the whole report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
