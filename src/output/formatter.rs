// Tue Jan 13 2026 - Alex

use crate::pattern::ScanMatch;
use crate::qpu::{AluOpFields, BranchFields, DecodedFields, DecodedRecord, ImmediateFields};
use std::fmt::Write;

/// Pairs printed after each scan hit's offset.
pub const SCAN_DISPLAY_INSTRUCTIONS: usize = 4;

/// Plain-text lines in the classic qpu-sniff layout.
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }

    /// `offset: i0 i1 <fields>`, offset in words.
    pub fn format_record(&self, record: &DecodedRecord) -> String {
        let mut line = format!(
            "{:08x}: {:08x} {:08x} ",
            record.offset, record.instruction.i0, record.instruction.i1
        );
        line.push_str(&self.format_fields(&record.fields));
        line
    }

    pub fn format_fields(&self, fields: &DecodedFields) -> String {
        match fields {
            DecodedFields::AluOp(a) => Self::format_alu(a),
            DecodedFields::Branch(b) => Self::format_branch(b),
            DecodedFields::Immediate(i) => Self::format_imm32(i),
        }
    }

    fn format_alu(a: &AluOpFields) -> String {
        format!(
            "ra={:02}, rb={:02}, wa={:02}, wb={:02}, F={:x}, X={:x}, packbits=0x{:02x}; addop{:02}<{:x}> {:x}, {:x}; mulop{:02}<{:x}> {:x}, {:x}; op{:02}",
            a.ra, a.rb, a.wa, a.wb, a.f, a.x, a.packbits,
            a.addop, a.addcc, a.adda, a.addb,
            a.mulop, a.mulcc, a.mula, a.mulb,
            a.op
        )
    }

    fn format_branch(b: &BranchFields) -> String {
        // wb is printed in hex.
        format!(
            "addr=0x{:08x}, unknown={:x}, cond={:02}, pcrel={:x}, addreg={:x}, ra={:02}, X={:x}, wa={:02}, wb={:02x}",
            b.addr, b.unknown, b.cond, b.pcrel, b.addreg, b.ra, b.x, b.wa, b.wb
        )
    }

    fn format_imm32(i: &ImmediateFields) -> String {
        format!(
            "data=0x{:08x}, unknown=0x{:02x}, addcc={:x}, mulcc={:x}, F={:x}, X={:x}, wa={:02}, wb={:02}",
            i.data, i.unknown, i.addcc, i.mulcc, i.f, i.x, i.wa, i.wb
        )
    }

    /// `byte_offset: i0 i1 i0 i1 ...`
    pub fn format_match(&self, m: &ScanMatch) -> String {
        let mut line = format!("{:08x}:", m.byte_offset());
        for inst in m.instructions().take(SCAN_DISPLAY_INSTRUCTIONS) {
            let _ = write!(line, " {:08x} {:08x}", inst.i0, inst.i1);
        }
        line
    }

    pub fn fragment_header(&self, name: &str, total_words: usize) -> String {
        format!("Fragment {}, size {}", name, total_words)
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}
