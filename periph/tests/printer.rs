//! Whole-transaction tests for the line printers: function codes in,
//! capture files out.
use std::fs;
use std::path::{Path, PathBuf};

use base::charset::{ASCII_TO_CDC, ASCII_TO_EXT_BCD};
use base::prelude::*;

use periph::{DeviceFabric, FcStatus, FC6681_DEV_STATUS_REQ, FC6681_MASTER_CLEAR, FC6681_OUTPUT};
use periph::operator::{remove_paper, PrinterKind};
use periph::{ST_1612_READY, ST_INT_END, ST_INT_READY, ST_PRINT_READY};

fn chan(n: u8) -> ChannelId {
    ChannelId::new(n).expect("test channel number should be valid")
}

/// Push one data word through an open transaction.
fn send_word(fabric: &mut DeviceFabric, ch: ChannelId, word: PpWord) {
    assert!(
        fabric.channel_mut(ch).put(word),
        "channel {} should have been drained before the next word",
        ch
    );
    fabric.io(ch);
    assert!(
        !fabric.channel(ch).full,
        "device on channel {} did not drain the data word",
        ch
    );
}

/// Send a whole line as 501 words: display-code pairs.
fn send_display_pairs(fabric: &mut DeviceFabric, ch: ChannelId, text: &str) {
    assert_eq!(text.len() % 2, 0, "501 words carry two characters each");
    for pair in text.as_bytes().chunks(2) {
        let word = pack_chars(
            ASCII_TO_CDC[usize::from(pair[0])],
            ASCII_TO_CDC[usize::from(pair[1])],
        );
        send_word(fabric, ch, word);
    }
}

/// Send a whole line as 512 words: one ASCII byte each.
fn send_ascii_bytes(fabric: &mut DeviceFabric, ch: ChannelId, text: &str) {
    for byte in text.bytes() {
        send_word(fabric, ch, PpWord::from(byte));
    }
}

fn capture_1612(dir: &Path, ch: ChannelId) -> String {
    let path = dir.join(format!("LP1612_C{:02o}", ch.number()));
    fs::read_to_string(&path).expect("capture file should exist")
}

fn capture_5xx(dir: &Path, ch: ChannelId, eq: u8) -> String {
    let path = dir.join(format!("LP5xx_C{:02o}_E{:o}", ch.number(), eq));
    fs::read_to_string(&path).expect("capture file should exist")
}

/// The timestamped files a paper removal leaves behind.
fn archives(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .expect("archive directory should be readable")
        .map(|entry| entry.expect("directory entry should be readable").path())
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            name.starts_with("LP5xx_") && !name.starts_with("LP5xx_C")
        })
        .collect();
    found.sort();
    found
}

// 1612 function codes.
const FC_SELECT: PpWord = 0o600;
const FC_SINGLE_SPACE: PpWord = 0o601;
const FC_STATUS_REQ: PpWord = 0o607;

// 3000-series function codes (equipment 0 in the high bits).
const FC_RELEASE: PpWord = 0o0;
const FC_DOUBLE: PpWord = 0o2;
const FC_NO_SPACE: PpWord = 0o6;
const FC3555_FILL_MEMORY: PpWord = 0o12;
const FC3555_SEL_INT_READY: PpWord = 0o20;
const FC3555_REL_INT_READY: PpWord = 0o21;
const FC3555_SEL_INT_END: PpWord = 0o22;
const FC3555_REL_INT_END: PpWord = 0o23;
const FC3555_CLEAR_FORMAT: PpWord = 0o30;
const FC3555_SELECT_PREPRINT: PpWord = 0o50;

#[test]
fn lp1612_single_line_ascii() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o7);
    fabric
        .attach_lp1612(ch, 0, 0, &format!("{},,ascii", dir.path().display()))
        .expect("attach should succeed");

    assert_eq!(fabric.function(ch, FC_SELECT), FcStatus::Accepted);
    send_word(&mut fabric, ch, PpWord::from(ASCII_TO_EXT_BCD[usize::from(b'H')]));
    send_word(&mut fabric, ch, PpWord::from(ASCII_TO_EXT_BCD[usize::from(b'I')]));
    assert_eq!(fabric.function(ch, FC_SINGLE_SPACE), FcStatus::Accepted);
    fabric.disconnect(ch);

    assert_eq!(capture_1612(dir.path(), ch), "HI\n");
}

#[test]
fn lp1612_single_line_ansi() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o7);
    fabric
        .attach_lp1612(ch, 0, 0, &format!("{},,ansi", dir.path().display()))
        .expect("attach should succeed");

    assert_eq!(fabric.function(ch, FC_SELECT), FcStatus::Accepted);
    send_word(&mut fabric, ch, PpWord::from(ASCII_TO_EXT_BCD[usize::from(b'H')]));
    send_word(&mut fabric, ch, PpWord::from(ASCII_TO_EXT_BCD[usize::from(b'I')]));
    assert_eq!(fabric.function(ch, FC_SINGLE_SPACE), FcStatus::Accepted);
    fabric.disconnect(ch);

    assert_eq!(capture_1612(dir.path(), ch), "HI\n ");
}

#[test]
fn lp1612_status_request() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o7);
    fabric
        .attach_lp1612(ch, 0, 0, &format!("{},,ascii", dir.path().display()))
        .expect("attach should succeed");

    assert_eq!(fabric.function(ch, FC_STATUS_REQ), FcStatus::Accepted);
    fabric.io(ch);
    let reply = fabric.channel_mut(ch).take();
    assert_eq!(reply, Some(ST_1612_READY));
    // The status word is consumed by the reply.
    assert_eq!(fabric.channel(ch).status, 0);
    fabric.disconnect(ch);
    assert_eq!(capture_1612(dir.path(), ch), "");
}

#[test]
fn lp1612_is_hardwired_to_equipment_zero() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let params = format!("{},,ascii", dir.path().display());
    assert!(fabric.attach_lp1612(chan(0o7), 1, 0, &params).is_err());
    assert!(fabric.attach_lp1612(chan(0o7), 0, 2, &params).is_err());
    assert!(fabric.attach_lp1612(chan(0o7), 0, 0, &params).is_ok());
}

#[test]
fn lp501_postprint_single_ascii() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o6);
    fabric
        .attach_lp501(ch, 0, 0, &format!("{},3555,ascii", dir.path().display()))
        .expect("attach should succeed");

    assert_eq!(fabric.function(ch, FC6681_MASTER_CLEAR), FcStatus::Processed);
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_display_pairs(&mut fabric, ch, "AB");
    fabric.disconnect(ch);

    // Form feed from the master clear, the line, and the deferred
    // postprint advance.
    assert_eq!(capture_5xx(dir.path(), ch, 0), "\x0cAB\n");
}

#[test]
fn lp501_preprint_double_ansi() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o6);
    fabric
        .attach_lp501(ch, 0, 0, &format!("{},3555,ansi", dir.path().display()))
        .expect("attach should succeed");

    assert_eq!(fabric.function(ch, FC3555_CLEAR_FORMAT), FcStatus::Processed);
    assert_eq!(
        fabric.function(ch, FC3555_SELECT_PREPRINT),
        FcStatus::Processed
    );
    assert_eq!(fabric.function(ch, FC_DOUBLE), FcStatus::Processed);
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_display_pairs(&mut fabric, ch, "CD");
    fabric.disconnect(ch);

    // The double-space preamble went out at function time; preprint
    // mode leaves nothing for the disconnect.
    assert_eq!(capture_5xx(dir.path(), ch, 0), "\n0CD");
}

#[test]
fn lp501_preprint_disconnect_tab_is_opt_in() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o6);
    fabric
        .attach_lp501(ch, 0, 0, &format!("{},3555,ansi", dir.path().display()))
        .expect("attach should succeed");
    assert!(fabric.set_preprint_tab(ch, 0, true));

    assert_eq!(
        fabric.function(ch, FC3555_SELECT_PREPRINT),
        FcStatus::Processed
    );
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_display_pairs(&mut fabric, ch, "CD");
    fabric.disconnect(ch);

    assert_eq!(capture_5xx(dir.path(), ch, 0), "CD\t");
}

#[test]
fn lp512_no_space_overstrike_ansi() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o6);
    fabric
        .attach_lp512(ch, 0, 0, &format!("{},3555,ansi", dir.path().display()))
        .expect("attach should succeed");

    // An ordinary line first, so LINE1 starts with its own carriage
    // control.
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "X");
    fabric.disconnect(ch);

    // LINE1, then the driver decides the next line must overstrike.
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "LINE1");
    assert_eq!(fabric.function(ch, FC_NO_SPACE), FcStatus::Processed);
    fabric.disconnect(ch);

    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "LINE2");
    fabric.disconnect(ch);

    assert_eq!(capture_5xx(dir.path(), ch, 0), "X\n LINE1\n+LINE2\n ");
}

#[test]
fn lp3000_fill_image_memory_discards_data() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o6);
    fabric
        .attach_lp512(ch, 0, 0, &format!("{},3555,ascii", dir.path().display()))
        .expect("attach should succeed");

    assert_eq!(fabric.function(ch, FC3555_FILL_MEMORY), FcStatus::Processed);
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "IMAGE");
    fabric.disconnect(ch);

    // The image-memory load never reaches paper, and the flag is
    // one-shot.
    assert_eq!(capture_5xx(dir.path(), ch, 0), "");
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "REAL");
    fabric.disconnect(ch);
    assert_eq!(capture_5xx(dir.path(), ch, 0), "REAL\n");
}

#[test]
fn lp3000_status_shows_interrupts_only_while_enabled() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o6);
    fabric
        .attach_lp512(ch, 0, 0, &format!("{},3555,ascii", dir.path().display()))
        .expect("attach should succeed");

    let status = |fabric: &mut DeviceFabric| -> PpWord {
        assert_eq!(fabric.function(ch, FC6681_DEV_STATUS_REQ), FcStatus::Accepted);
        fabric.io(ch);
        fabric
            .channel_mut(ch)
            .take()
            .expect("status reply should be on the channel")
    };

    // Ready is always on; nothing else is armed yet.
    assert_eq!(status(&mut fabric), ST_PRINT_READY);

    // Arm the ready interrupt, then write: the transfer pre-sets the
    // latched bit.
    assert_eq!(
        fabric.function(ch, FC3555_SEL_INT_READY),
        FcStatus::Processed
    );
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "A");
    fabric.disconnect(ch);
    assert_eq!(status(&mut fabric), ST_PRINT_READY | ST_INT_READY);
    assert!(fabric.interrupt_summary(ch));

    // Re-arming after that output keeps the latched bit.
    assert_eq!(
        fabric.function(ch, FC3555_SEL_INT_READY),
        FcStatus::Processed
    );
    assert_eq!(status(&mut fabric), ST_PRINT_READY | ST_INT_READY);

    // Re-arming again with no intervening output drops it.
    assert_eq!(
        fabric.function(ch, FC3555_SEL_INT_READY),
        FcStatus::Processed
    );
    assert_eq!(status(&mut fabric), ST_PRINT_READY);

    // Releasing the interrupt clears enable and latch together.
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "B");
    fabric.disconnect(ch);
    assert_eq!(
        fabric.function(ch, FC3555_REL_INT_READY),
        FcStatus::Processed
    );
    assert_eq!(status(&mut fabric), ST_PRINT_READY);
    assert!(!fabric.interrupt_summary(ch));

    // The end-of-operation interrupt behaves the same way.
    assert_eq!(fabric.function(ch, FC3555_SEL_INT_END), FcStatus::Processed);
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "C");
    fabric.disconnect(ch);
    assert_eq!(status(&mut fabric), ST_PRINT_READY | ST_INT_END);
    assert_eq!(fabric.function(ch, FC3555_REL_INT_END), FcStatus::Processed);
    assert_eq!(status(&mut fabric), ST_PRINT_READY);
}

#[test]
fn paper_removal_archives_and_reopens() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o0);
    fabric
        .attach_lp512(ch, 0, 0, &format!("{},3555,ascii", dir.path().display()))
        .expect("attach should succeed");

    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "HELLO");
    fabric.disconnect(ch);
    assert_eq!(capture_5xx(dir.path(), ch, 0), "HELLO\n");

    remove_paper(&mut fabric, PrinterKind::Lp5xx, "0,0");

    // The active file is fresh and the bytes moved to the archive.
    assert_eq!(capture_5xx(dir.path(), ch, 0), "");
    let archived = archives(dir.path());
    assert_eq!(archived.len(), 1);
    let name = archived[0]
        .file_name()
        .and_then(|n| n.to_str())
        .expect("archive name should be valid UTF-8");
    assert!(name.ends_with("_00.txt"), "unexpected archive name {}", name);
    assert_eq!(
        fs::read_to_string(&archived[0]).expect("archive should be readable"),
        "HELLO\n"
    );

    // Removing again with nothing printed is a no-op.
    remove_paper(&mut fabric, PrinterKind::Lp5xx, "0,0");
    assert_eq!(archives(dir.path()).len(), 1);

    // And the printer keeps working on the fresh file.
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "NEXT");
    fabric.disconnect(ch);
    assert_eq!(capture_5xx(dir.path(), ch, 0), "NEXT\n");
}

#[test]
fn release_runs_the_removal_cycle_once() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o6);
    fabric
        .attach_lp512(ch, 0, 0, &format!("{},3555,ascii", dir.path().display()))
        .expect("attach should succeed");

    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "JOB");
    fabric.disconnect(ch);

    assert_eq!(fabric.function(ch, FC_RELEASE), FcStatus::Processed);
    assert_eq!(archives(dir.path()).len(), 1);
    assert_eq!(capture_5xx(dir.path(), ch, 0), "");

    // A second release with no new output leaves everything alone.
    assert_eq!(fabric.function(ch, FC_RELEASE), FcStatus::Processed);
    assert_eq!(archives(dir.path()).len(), 1);
    assert_eq!(capture_5xx(dir.path(), ch, 0), "");
}

#[test]
fn removal_of_empty_1612_capture_is_a_no_op() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o7);
    fabric
        .attach_lp1612(ch, 0, 0, &format!("{},,ascii", dir.path().display()))
        .expect("attach should succeed");

    remove_paper(&mut fabric, PrinterKind::Lp1612, "7,0");
    assert!(archives(dir.path()).is_empty());
    assert_eq!(capture_1612(dir.path(), ch), "");
}

#[test]
fn removal_with_bad_parameters_changes_nothing() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o6);
    fabric
        .attach_lp512(ch, 0, 0, &format!("{},3555,ascii", dir.path().display()))
        .expect("attach should succeed");
    assert_eq!(fabric.function(ch, FC6681_OUTPUT), FcStatus::Accepted);
    send_ascii_bytes(&mut fabric, ch, "KEEP");
    fabric.disconnect(ch);

    // Garbage, octal range errors, and absent devices all just log.
    remove_paper(&mut fabric, PrinterKind::Lp5xx, "nonsense");
    remove_paper(&mut fabric, PrinterKind::Lp5xx, "6,9");
    remove_paper(&mut fabric, PrinterKind::Lp5xx, "5,0");
    remove_paper(&mut fabric, PrinterKind::Lp1612, "6,0");
    assert!(archives(dir.path()).is_empty());
    assert_eq!(capture_5xx(dir.path(), ch, 0), "KEEP\n");
}

#[test]
fn only_one_printer_unit_per_equipment() {
    let dir = tempfile::tempdir().expect("should be able to create a temp dir");
    let mut fabric = DeviceFabric::new();
    let ch = chan(0o6);
    let params = format!("{},3555,ascii", dir.path().display());
    fabric
        .attach_lp501(ch, 0, 0, &params)
        .expect("first attach should succeed");
    assert!(fabric.attach_lp501(ch, 0, 1, &params).is_err());
    // A different equipment on the same channel is fine.
    fabric
        .attach_lp512(ch, 1, 0, &params)
        .expect("second equipment should attach");
}
