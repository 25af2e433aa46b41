//! Line-oriented parser for the FUSE test-vector format.
//!
//! Each record is a description line, an optional block of space-prefixed
//! event lines, a 12-token 16-bit register line, a 7-token extended register
//! line, and an optional block of memory chunk lines terminated by a `-1`
//! sentinel. The grammar is driven by a pull-based [`LineCursor`] and an
//! explicit per-record state machine instead of nested read-ahead.
//!
//! Lines whose token counts do not match an optional sub-block are skipped
//! silently; the corresponding fields stay unset and the emitter omits them.

/// Bus event recorded against a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub tick: u32,
    /// Event type tag as it appears in the input (`MR`, `MW`, `PR`, ...).
    pub kind: String,
    pub addr: u16,
    pub data: u8,
}

/// Main 16-bit register snapshot, in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regs16 {
    pub af: u16,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub af_: u16,
    pub bc_: u16,
    pub de_: u16,
    pub hl_: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
}

/// Extended register and interrupt-state snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegsExt {
    pub i: u8,
    pub r: u8,
    pub iff1: u8,
    pub iff2: u8,
    pub im: u8,
    pub halted: u8,
    pub ticks: u32,
}

/// One memory chunk: a start address and the bytes written there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemChunk {
    pub addr: u16,
    pub bytes: Vec<u8>,
}

/// One fully parsed test-vector record.
///
/// `events` and `chunks` are `None` when the corresponding block was absent
/// from the input, which controls whether the emitter writes the sub-block
/// at all; `Some(vec![])` means the block was present but held no valid
/// entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuseTest {
    pub desc: String,
    pub events: Option<Vec<Event>>,
    pub regs: Option<Regs16>,
    pub ext: Option<RegsExt>,
    pub chunks: Option<Vec<MemChunk>>,
}

/// Pull-based cursor over input lines: a lazy, finite, single-pass sequence
/// with one line of lookahead. Not restartable.
struct LineCursor<'a> {
    lines: std::iter::Peekable<std::str::Lines<'a>>,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().peekable(),
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.lines.next()
    }

    fn peek(&mut self) -> Option<&'a str> {
        self.lines.peek().copied()
    }

    /// Advances past blank separator lines to the next line with content.
    fn next_non_blank(&mut self) -> Option<&'a str> {
        loop {
            let line = self.next()?;
            if !line.trim().is_empty() {
                return Some(line);
            }
        }
    }
}

/// Per-record parse states; each record walks them in order.
enum State {
    ExpectDescription,
    ExpectEventsOrRegisters,
    ExpectExtendedRegisters,
    ExpectChunksOrNext,
}

/// Parses every record in `text`. One test is produced per description
/// line; malformed optional sub-blocks are dropped, never fatal.
pub fn parse_tests(text: &str) -> Vec<FuseTest> {
    let mut cursor = LineCursor::new(text);
    let mut tests = Vec::new();
    let mut current: Option<FuseTest> = None;
    let mut state = State::ExpectDescription;

    loop {
        match state {
            State::ExpectDescription => {
                let Some(line) = cursor.next_non_blank() else {
                    break;
                };
                let desc = line
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_owned();
                current = Some(FuseTest {
                    desc,
                    events: None,
                    regs: None,
                    ext: None,
                    chunks: None,
                });
                state = State::ExpectEventsOrRegisters;
            }
            State::ExpectEventsOrRegisters => {
                let test = current.as_mut().expect("record in progress");
                if cursor.peek().is_some_and(|line| line.starts_with(' ')) {
                    let mut events = Vec::new();
                    while cursor.peek().is_some_and(|line| line.starts_with(' ')) {
                        let line = cursor.next().expect("peeked line");
                        if let Some(event) = parse_event(line) {
                            events.push(event);
                        }
                    }
                    test.events = Some(events);
                }
                test.regs = cursor.next().and_then(parse_regs16);
                state = State::ExpectExtendedRegisters;
            }
            State::ExpectExtendedRegisters => {
                let test = current.as_mut().expect("record in progress");
                test.ext = cursor.next().and_then(parse_regs_ext);
                state = State::ExpectChunksOrNext;
            }
            State::ExpectChunksOrNext => {
                let test = current.as_mut().expect("record in progress");
                let mut line = cursor.next();
                if line.is_some_and(|l| l.split_whitespace().count() > 1) {
                    let mut chunks = Vec::new();
                    // Consume chunk lines up to a lone `-1` sentinel, a
                    // blank separator, or end of input.
                    while let Some(l) = line {
                        let tokens: Vec<&str> = l.split_whitespace().collect();
                        if tokens.is_empty() || tokens[0] == "-1" {
                            break;
                        }
                        if let Some(chunk) = parse_chunk(&tokens) {
                            chunks.push(chunk);
                        }
                        line = cursor.next();
                    }
                    test.chunks = Some(chunks);
                }
                tests.push(current.take().expect("record in progress"));
                state = State::ExpectDescription;
            }
        }
    }

    // Input ended mid-record; keep what was parsed.
    if let Some(test) = current {
        tests.push(test);
    }
    tests
}

fn parse_event(line: &str) -> Option<Event> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 4 {
        return None;
    }
    Some(Event {
        tick: tokens[0].parse().ok()?,
        kind: tokens[1].to_owned(),
        addr: u16::from_str_radix(tokens[2], 16).ok()?,
        data: u8::from_str_radix(tokens[3], 16).ok()?,
    })
}

fn parse_regs16(line: &str) -> Option<Regs16> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 12 {
        return None;
    }
    let mut regs = [0u16; 12];
    for (slot, token) in regs.iter_mut().zip(&tokens) {
        *slot = u16::from_str_radix(token, 16).ok()?;
    }
    Some(Regs16 {
        af: regs[0],
        bc: regs[1],
        de: regs[2],
        hl: regs[3],
        af_: regs[4],
        bc_: regs[5],
        de_: regs[6],
        hl_: regs[7],
        ix: regs[8],
        iy: regs[9],
        sp: regs[10],
        pc: regs[11],
    })
}

fn parse_regs_ext(line: &str) -> Option<RegsExt> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 7 {
        return None;
    }
    Some(RegsExt {
        i: u8::from_str_radix(tokens[0], 16).ok()?,
        r: u8::from_str_radix(tokens[1], 16).ok()?,
        iff1: tokens[2].parse().ok()?,
        iff2: tokens[3].parse().ok()?,
        im: tokens[4].parse().ok()?,
        halted: tokens[5].parse().ok()?,
        ticks: tokens[6].parse().ok()?,
    })
}

/// Parses one chunk line: a start address followed by byte values up to an
/// in-line `-1` sentinel.
fn parse_chunk(tokens: &[&str]) -> Option<MemChunk> {
    let addr = u16::from_str_radix(tokens[0], 16).ok()?;
    let mut bytes = Vec::new();
    for token in &tokens[1..] {
        if *token == "-1" {
            break;
        }
        bytes.push(u8::from_str_radix(token, 16).ok()?);
    }
    Some(MemChunk { addr, bytes })
}
