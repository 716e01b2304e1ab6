//! JSON lines output.

use crate::output::OutputFormatter;
use crate::raddec::Raddec;
use std::io::{self, Write};

/// Writes each raddec as one compact JSON object per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn write_raddec(&self, raddec: &Raddec, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *out, raddec)?;
        writeln!(out)
    }
}
