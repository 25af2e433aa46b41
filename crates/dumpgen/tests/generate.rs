//! End-to-end dump generation against a temp directory.

use std::fs;
use std::thread::sleep;
use std::time::Duration;

use tempfile::TempDir;

#[test]
fn every_byte_becomes_one_hex_literal() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("zota.bin"), [0u8, 1, 2]).unwrap();
    fs::write(dir.path().join("acorn.rom"), vec![0xabu8; 20]).unwrap();
    let manifest = dir.path().join("dumps.toml");
    fs::write(&manifest, "files = [\"zota.bin\", \"acorn.rom\"]\n").unwrap();
    let out_hdr = dir.path().join("dumps.h");

    dumpgen::generate(&manifest, None, &out_hdr).unwrap();
    let header = fs::read_to_string(&out_hdr).unwrap();

    assert!(header.starts_with("#pragma once\n// #version:5#\n// machine generated, do not edit!\n"));
    assert!(header.contains("unsigned char dump_zota_bin[3] = {"));
    assert!(header.contains("unsigned char dump_acorn_rom[20] = {"));
    // One hex literal per input byte, 3 + 20 in total.
    assert_eq!(header.matches("0x").count(), 23);
    assert!(header.contains("#define DUMP_NUM_ITEMS (2)"));
}

#[test]
fn index_table_is_sorted_by_display_name() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("zota.bin"), [1u8]).unwrap();
    fs::write(dir.path().join("acorn.rom"), [2u8]).unwrap();
    let manifest = dir.path().join("dumps.toml");
    // Declaration order is deliberately not alphabetical.
    fs::write(&manifest, "files = [\"zota.bin\", \"acorn.rom\"]\n").unwrap();
    let out_hdr = dir.path().join("dumps.h");

    dumpgen::generate(&manifest, None, &out_hdr).unwrap();
    let header = fs::read_to_string(&out_hdr).unwrap();

    // Arrays keep declaration order.
    let zota_array = header.find("unsigned char dump_zota_bin").unwrap();
    let acorn_array = header.find("unsigned char dump_acorn_rom").unwrap();
    assert!(zota_array < acorn_array);

    // The index table is sorted by display name.
    let acorn_entry = header.find("{ \"acorn_rom\", dump_acorn_rom, 1 },").unwrap();
    let zota_entry = header.find("{ \"zota_bin\", dump_zota_bin, 1 },").unwrap();
    assert!(acorn_entry < zota_entry);
}

#[test]
fn src_dir_is_resolved_relative_to_output_header() {
    let dir = TempDir::new().unwrap();
    let sub = dir.path().join("roms");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("game.tap"), [7u8, 8]).unwrap();
    let manifest = dir.path().join("dumps.toml");
    fs::write(&manifest, "src_dir = \"roms\"\nfiles = [\"game.tap\"]\n").unwrap();
    let out_hdr = dir.path().join("dumps.h");

    dumpgen::generate(&manifest, None, &out_hdr).unwrap();
    let header = fs::read_to_string(&out_hdr).unwrap();
    assert!(header.contains("unsigned char dump_game_tap[2] = {"));
}

#[test]
fn missing_input_is_fatal_and_preserves_previous_output() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("dumps.toml");
    fs::write(&manifest, "files = [\"absent.bin\"]\n").unwrap();
    let out_hdr = dir.path().join("dumps.h");
    fs::write(&out_hdr, "previous header\n").unwrap();

    // Out of date (no version marker), so generation runs and fails.
    let err = dumpgen::generate(&manifest, None, &out_hdr).unwrap_err();
    assert!(err.to_string().contains("input file not found"));
    assert_eq!(fs::read_to_string(&out_hdr).unwrap(), "previous header\n");
}

#[test]
fn second_run_skips_regeneration_until_input_changes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.bin"), [1u8]).unwrap();
    let manifest = dir.path().join("dumps.toml");
    fs::write(&manifest, "files = [\"a.bin\"]\n").unwrap();
    let out_hdr = dir.path().join("dumps.h");

    dumpgen::generate(&manifest, None, &out_hdr).unwrap();
    let first = fs::metadata(&out_hdr).unwrap().modified().unwrap();

    sleep(Duration::from_millis(20));
    dumpgen::generate(&manifest, None, &out_hdr).unwrap();
    let second = fs::metadata(&out_hdr).unwrap().modified().unwrap();
    assert_eq!(first, second, "up-to-date output must not be rewritten");

    sleep(Duration::from_millis(20));
    fs::write(&manifest, "files = [\"a.bin\"]\n# touched\n").unwrap();
    dumpgen::generate(&manifest, None, &out_hdr).unwrap();
    let third = fs::metadata(&out_hdr).unwrap().modified().unwrap();
    assert!(third > second, "touched manifest must trigger regeneration");
}
