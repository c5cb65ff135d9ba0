use crate::packet::assembler::PacketAssembler;
use crate::prelude::Fix;
use crate::telemetry::ReassemblyStats;

/// Lazy adapter from a sequence of text lines to completed fixes.
///
/// When the line sequence ends, a complete packet still in progress is
/// yielded as the final fix. The iterator is fused afterwards; a fresh
/// instance is needed to start over.
pub struct Reassembler<I> {
    lines: I,
    assembler: PacketAssembler,
    finished: bool,
}

impl<I> Reassembler<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            assembler: PacketAssembler::new(),
            finished: false,
        }
    }

    pub fn stats(&self) -> ReassemblyStats {
        self.assembler.stats()
    }

    pub fn into_lines(self) -> I {
        self.lines
    }
}

impl<I, S> Iterator for Reassembler<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Fix;

    fn next(&mut self) -> Option<Fix> {
        if self.finished {
            return None;
        }
        for line in self.lines.by_ref() {
            if let Some(fix) = self.assembler.feed(line.as_ref()) {
                return Some(fix);
            }
        }
        self.finished = true;
        self.assembler.finish()
    }
}

impl<I, S> std::iter::FusedIterator for Reassembler<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
}
