//! Dumps binary fixture files into C arrays.
//!
//! Reads a TOML manifest naming a set of binary files, reads each one in
//! full, and emits a header with one `unsigned char` array per file plus an
//! index table of `(name, pointer, size)` entries sorted by display name.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use genutil::{GeneratorTask, DO_NOT_EDIT};
use serde::Deserialize;

const VERSION: u32 = 5;

/// Symbol prefix shared by every emitted array; stripped again for the
/// display name in the index table.
const SYMBOL_PREFIX: &str = "dump_";

#[derive(Debug, Deserialize)]
struct Manifest {
    /// Optional subdirectory (relative to the output header) holding the
    /// listed files.
    src_dir: Option<String>,
    files: Vec<String>,
}

/// One binary file read in full, ready for emission.
#[derive(Debug)]
struct DumpItem {
    symbol: String,
    bytes: Vec<u8>,
}

impl DumpItem {
    fn display_name(&self) -> &str {
        &self.symbol[SYMBOL_PREFIX.len()..]
    }
}

/// Derives the emitted symbol name from a manifest filename.
fn symbol_name(file_name: &str) -> String {
    format!("{SYMBOL_PREFIX}{file_name}").replace('.', "_")
}

/// Generates `out_hdr` from the manifest at `input`, unless the header is
/// already up to date. `out_src` is accepted for interface uniformity with
/// the other generators in the host build and is unused.
pub fn generate(input: &Path, _out_src: Option<&Path>, out_hdr: &Path) -> Result<()> {
    let task = GeneratorTask::new(VERSION, [input.to_path_buf()], [out_hdr.to_path_buf()]);
    if !task.is_dirty()? {
        log::info!("{} up to date, skipping", out_hdr.display());
        return Ok(());
    }

    let manifest_str =
        fs::read_to_string(input).with_context(|| format!("reading manifest {}", input.display()))?;
    let manifest: Manifest = toml::from_str(&manifest_str)
        .with_context(|| format!("parsing manifest {}", input.display()))?;

    let base = out_hdr.parent().unwrap_or_else(|| Path::new("."));
    let src_dir = match manifest.src_dir.as_deref() {
        Some(dir) => base.join(dir),
        None => base.to_path_buf(),
    };

    let mut items = Vec::with_capacity(manifest.files.len());
    for file in &manifest.files {
        let path: PathBuf = src_dir.join(file);
        let bytes =
            fs::read(&path).with_context(|| format!("input file not found: '{}'", path.display()))?;
        items.push(DumpItem {
            symbol: symbol_name(file),
            bytes,
        });
    }

    let header = render_header(&task, &items)?;
    genutil::write_atomic(out_hdr, &header)?;
    log::info!("generated {} ({} items)", out_hdr.display(), items.len());
    Ok(())
}

fn render_header(task: &GeneratorTask, items: &[DumpItem]) -> Result<String> {
    let mut out = String::new();
    out.push_str("#pragma once\n");
    out.push_str(&task.version_marker());
    out.push('\n');
    out.push_str(DO_NOT_EDIT);
    out.push('\n');

    for item in items {
        writeln!(
            &mut out,
            "unsigned char {}[{}] = {{",
            item.symbol,
            item.bytes.len()
        )?;
        for (num, byte) in item.bytes.iter().enumerate() {
            write!(&mut out, "0x{byte:02x}, ")?;
            if (num + 1) % 16 == 0 {
                out.push('\n');
            }
        }
        out.push_str("\n};\n");
    }

    out.push_str("typedef struct { const char* name; const uint8_t* ptr; int size; } dump_item;\n");
    writeln!(&mut out, "#define DUMP_NUM_ITEMS ({})", items.len())?;
    out.push_str("dump_item dump_items[DUMP_NUM_ITEMS] = {\n");
    let mut index: Vec<&DumpItem> = items.iter().collect();
    index.sort_by(|a, b| a.display_name().cmp(b.display_name()));
    for item in index {
        writeln!(
            &mut out,
            "{{ \"{}\", {}, {} }},",
            item.display_name(),
            item.symbol,
            item.bytes.len()
        )?;
    }
    out.push_str("};\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::symbol_name;

    #[test]
    fn symbol_names_replace_dots() {
        assert_eq!(symbol_name("cpu.prg"), "dump_cpu_prg");
        assert_eq!(symbol_name("z80.tap.bin"), "dump_z80_tap_bin");
        assert_eq!(symbol_name("plain"), "dump_plain");
    }
}
