//! Pure byte-block formatting, as used by the `PRINT`-family opcodes when
//! the value on top of the stack is a `Value::Block`/`Value::NBlock`.
//!
//! Grounded on `block.c`'s `blk_print`/`nblock_print`: chunksize/maxsize/
//! datalen on one line, then up to `blkmaxprint` octets (0 meaning "all")
//! rendered in `blkbase` and laid out per `blkfmt`, with a trailing `...`
//! if the block was truncated. The REPL loop that actually calls this on
//! a `PRINT` opcode is out of scope here; this module only owns turning a
//! block's bytes into the string the real calculator would write to
//! stdout, so the formatting logic itself stays testable and in scope.

use crate::config::{BlockBase, BlockFormat, ConfigSnapshot};
use crate::value::pointer::BlockData;
use std::fmt::Write as _;

/// Render one octet in the requested base.
fn render_octet(byte: u8, base: BlockBase) -> String {
    match base {
        BlockBase::Hex => format!("{byte:02x}"),
        BlockBase::Oct => format!("{byte:03o}"),
        BlockBase::Char => {
            if byte.is_ascii_graphic() || byte == b' ' {
                (byte as char).to_string()
            } else {
                format!("\\{byte:03o}")
            }
        }
        BlockBase::Binary => format!("{byte:08b}"),
        BlockBase::Raw => (byte as char).to_string(),
    }
}

/// Format the header line `blk_print` always emits: chunk/max/data sizes.
fn header(chunk: usize, maxsize: usize, datalen: usize) -> String {
    format!("chunksize = {chunk}, maxsize = {maxsize}, datalen = {datalen}")
}

/// Format a block's body (the octet dump) per `blkbase`/`blkfmt`,
/// truncated to `config.blkmaxprint` octets (0 means "print them all").
fn format_body(bytes: &[u8], config: &ConfigSnapshot) -> String {
    let limit = config.blkmaxprint as usize;
    let (shown, truncated) = if limit == 0 || bytes.len() <= limit {
        (bytes, false)
    } else {
        (&bytes[..limit], true)
    };

    let mut out = String::new();
    match config.blkfmt {
        BlockFormat::Line | BlockFormat::String => {
            for b in shown {
                let _ = write!(out, "{}", render_octet(*b, config.blkbase));
            }
        }
        BlockFormat::OdStyle => {
            for (i, chunk) in shown.chunks(16).enumerate() {
                let _ = write!(out, "{:06o} ", i * 16);
                for b in chunk {
                    let _ = write!(out, "{} ", render_octet(*b, config.blkbase));
                }
                out.push('\n');
            }
            out = out.trim_end_matches('\n').to_string();
        }
        BlockFormat::HdStyle => {
            for (i, chunk) in shown.chunks(16).enumerate() {
                let _ = write!(out, "{:08x}  ", i * 16);
                for b in chunk {
                    let _ = write!(out, "{} ", render_octet(*b, config.blkbase));
                }
                out.push_str(" |");
                for b in chunk {
                    let c = *b as char;
                    out.push(if c.is_ascii_graphic() { c } else { '.' });
                }
                out.push('|');
                out.push('\n');
            }
            out = out.trim_end_matches('\n').to_string();
        }
    }
    if truncated {
        out.push_str("...");
    }
    out
}

/// Format an anonymous block (`Value::Block`), matching `blk_print`.
///
/// `maxsize` is the block's allocated capacity; this implementation grows
/// `BlockData` lazily rather than pre-allocating in chunks, so callers
/// that want a faithful `maxsize` figure pass the same value as `datalen`
/// (no distinct chunk/max tracking is kept per `spec.md`'s dropped
/// `alloc`/`realloc`/chunked-growth surface, see DESIGN.md).
pub fn format_block(data: &BlockData, config: &ConfigSnapshot) -> String {
    let bytes = data.borrow();
    let mut out = header(bytes.len(), bytes.len(), bytes.len());
    out.push_str("\n\t");
    out.push_str(&format_body(&bytes, config));
    out
}

/// Format a named block (`Value::NBlock`), matching `nblock_print`.
///
/// The original keys named blocks by an allocation-order integer id in
/// a process-wide table (`nblocks[]` in `block.c`); this implementation
/// addresses a named block purely by its `Rc<NamedBlock>` handle (see
/// `value::pointer::NamedBlock`), so there is no id to report here.
pub fn format_named_block(name: &str, data: &BlockData, config: &ConfigSnapshot) -> String {
    let mut out = format!("block: {name}\n\t");
    let bytes = data.borrow();
    out.push_str(&header(bytes.len(), bytes.len(), bytes.len()));
    out.push_str("\n\t");
    out.push_str(&format_body(&bytes, config));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSnapshot;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn data(bytes: &[u8]) -> BlockData {
        Rc::new(RefCell::new(bytes.to_vec()))
    }

    #[test]
    fn hex_line_format_matches_blk_print_layout() {
        let mut cfg = ConfigSnapshot::default();
        cfg.blkbase = BlockBase::Hex;
        cfg.blkfmt = BlockFormat::Line;
        let rendered = format_block(&data(&[0xde, 0xad, 0xbe, 0xef]), &cfg);
        assert!(rendered.contains("datalen = 4"));
        assert!(rendered.ends_with("deadbeef"));
    }

    #[test]
    fn blkmaxprint_truncates_with_ellipsis() {
        let mut cfg = ConfigSnapshot::default();
        cfg.blkbase = BlockBase::Hex;
        cfg.blkfmt = BlockFormat::Line;
        cfg.blkmaxprint = 2;
        let rendered = format_block(&data(&[1, 2, 3, 4]), &cfg);
        assert!(rendered.ends_with("0102..."));
    }

    #[test]
    fn named_block_header_includes_name() {
        let cfg = ConfigSnapshot::default();
        let rendered = format_named_block("table", &data(&[0xff]), &cfg);
        assert!(rendered.starts_with("block: table\n"));
    }
}
