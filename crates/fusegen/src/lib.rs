//! Converts FUSE Z80 test-vector files into C headers.
//!
//! Reads a TOML manifest pairing input files with emitted identifiers, and
//! writes one `fuse_test_t` array plus a count constant per input file. The
//! parsing grammar lives in [`parser`].

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use genutil::{GeneratorTask, DO_NOT_EDIT};
use serde::Deserialize;

pub mod parser;

use parser::FuseTest;

const VERSION: u32 = 2;

#[derive(Debug, Deserialize)]
struct Manifest {
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    /// Input path, relative to the output header's directory.
    file: String,
    /// Identifier for the emitted array (`<name>[]` and `<name>_num`).
    name: String,
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
    let mut out = String::new();
    writeln!(&mut out, "{}", task.version_marker())?;
    writeln!(&mut out, "{DO_NOT_EDIT}")?;
    for entry in &manifest.files {
        let path = base.join(&entry.file);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("input file not found: '{}'", path.display()))?;
        let tests = parser::parse_tests(&text);
        render_array(&mut out, &entry.name, &tests)?;
        log::debug!("{}: {} test cases", entry.name, tests.len());
    }

    genutil::write_atomic(out_hdr, &out)?;
    log::info!("generated {}", out_hdr.display());
    Ok(())
}

/// Renders one `fuse_test_t NAME[]` array and its `NAME_num` count.
fn render_array(out: &mut String, name: &str, tests: &[FuseTest]) -> Result<()> {
    writeln!(out, "fuse_test_t {name}[] = {{")?;
    for test in tests {
        out.push_str("  {\n");
        writeln!(out, "    .desc = \"{}\",", test.desc)?;
        if let Some(events) = &test.events {
            out.push_str("    .events = {\n");
            for event in events {
                writeln!(
                    out,
                    "      {{ .tick={}, .type=EVENT_{}, .addr=0x{:04x}, .data=0x{:02x} }},",
                    event.tick, event.kind, event.addr, event.data
                )?;
            }
            out.push_str("    },\n");
            writeln!(out, "    .num_events = {},", events.len())?;
        }
        out.push_str("    .state = {\n");
        if let Some(regs) = &test.regs {
            writeln!(
                out,
                "      .af=0x{:04x}, .bc=0x{:04x}, .de=0x{:04x}, .hl=0x{:04x},",
                regs.af, regs.bc, regs.de, regs.hl
            )?;
            writeln!(
                out,
                "      .af_=0x{:04x}, .bc_=0x{:04x}, .de_=0x{:04x}, .hl_=0x{:04x},",
                regs.af_, regs.bc_, regs.de_, regs.hl_
            )?;
            writeln!(
                out,
                "      .ix=0x{:04x}, .iy=0x{:04x}, .sp=0x{:04x}, .pc=0x{:04x},",
                regs.ix, regs.iy, regs.sp, regs.pc
            )?;
        }
        if let Some(ext) = &test.ext {
            writeln!(
                out,
                "      .i=0x{:02x}, .r=0x{:02x}, .iff1={}, .iff2={}, .im={}, .halted={}, .ticks={}",
                ext.i, ext.r, ext.iff1, ext.iff2, ext.im, ext.halted, ext.ticks
            )?;
        }
        out.push_str("    },\n");
        if let Some(chunks) = &test.chunks {
            out.push_str("    .chunks = {\n");
            for chunk in chunks {
                write!(out, "      {{ .addr=0x{:04x}, .bytes = {{ ", chunk.addr)?;
                for byte in &chunk.bytes {
                    write!(out, "0x{byte:02x},")?;
                }
                writeln!(out, "}}, .num_bytes={}, }},", chunk.bytes.len())?;
            }
            out.push_str("    },\n");
        }
        let num_chunks = test.chunks.as_ref().map_or(0, Vec::len);
        writeln!(out, "    .num_chunks = {num_chunks},")?;
        out.push_str("  },\n");
    }
    out.push_str("};\n");
    writeln!(out, "const int {name}_num = {};", tests.len())?;
    Ok(())
}
