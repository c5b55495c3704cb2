//! Turns raw `LIST` lines into [`ListEntry`] values.
//!
//! MLSD fact lines are tried first, then `ls -l` output (with or without a
//! group column), then the IIS `<DIR>` format. A line none of them accept is
//! kept as an [`EntryKind::Unknown`] entry named after the whole line.

use crate::types::{EntryKind, ListEntry};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Some servers omit the group column, so it is optional.
    static ref UNIX_LINE: Regex = Regex::new(
        r"(?x)
        ^([dlcbps-][rwxsStT-]{9})[+@.]?\s+  # permissions
        (\d+)\s+                            # link count
        (\S+)\s+                            # owner
        (?:(\S+)\s+)?                       # group
        (\d+)\s+                            # size
        (\w{3}\s+\d{1,2}\s+[\d:]+)\s+       # date
        (.+)$                               # name, possibly `name -> target`
        "
    )
    .expect("unix listing pattern");

    static ref WINDOWS_LINE: Regex = Regex::new(
        r"(?x)
        ^(\d{2}-\d{2}-\d{2,4})\s+           # date
        (\d{1,2}:\d{2}(?:AM|PM)?)\s+        # time
        (<DIR>|\d+)\s+                      # size or <DIR>
        (.+)$                               # name
        "
    )
    .expect("windows listing pattern");
}

/// Parse every line of a `LIST` reply, dropping blanks and the `.`/`..` entries.
pub fn parse_listing<S: AsRef<str>>(lines: &[S]) -> Vec<ListEntry> {
    lines
        .iter()
        .flat_map(|chunk| chunk.as_ref().lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(parse_line)
        .filter(|e| e.name != "." && e.name != "..")
        .collect()
}

/// Parse a single listing line.
pub fn parse_line(line: &str) -> ListEntry {
    if line.contains(';') && line.contains('=') {
        if let Some(e) = parse_mlsd(line) {
            return e;
        }
    }

    if let Some(e) = parse_unix(line) {
        return e;
    }

    if let Some(e) = parse_windows(line) {
        return e;
    }

    ListEntry {
        name: line.to_string(),
        kind: EntryKind::Unknown,
        size: 0,
    }
}

// ─── MLSD ────────────────────────────────────────────────────────────

fn parse_mlsd(line: &str) -> Option<ListEntry> {
    let (facts, name) = if let Some(pos) = line.find("; ") {
        (&line[..pos + 1], &line[pos + 2..])
    } else if let Some(pos) = line.rfind(' ') {
        (&line[..pos], &line[pos + 1..])
    } else {
        return None;
    };

    if name.is_empty() {
        return None;
    }

    let mut kind = EntryKind::Unknown;
    let mut size = 0;
    for fact in facts.split(';') {
        let Some((key, value)) = fact.trim().split_once('=') else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "type" => {
                // `OS.unix=slink` may carry its target after a colon.
                let value = value.to_ascii_lowercase();
                let value = value.split(':').next().unwrap_or_default();
                kind = match value {
                    "file" => EntryKind::File,
                    "dir" | "cdir" | "pdir" => EntryKind::Directory,
                    "os.unix=slink" | "os.unix=symlink" => EntryKind::Symlink,
                    _ => EntryKind::Unknown,
                }
            }
            "size" => size = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    Some(ListEntry {
        name: name.to_string(),
        kind,
        size,
    })
}

// ─── Unix ────────────────────────────────────────────────────────────

fn parse_unix(line: &str) -> Option<ListEntry> {
    let caps = UNIX_LINE.captures(line)?;

    let perms = caps.get(1)?.as_str();
    let size = caps.get(5)?.as_str().parse::<u64>().unwrap_or(0);
    let raw_name = caps.get(7)?.as_str();

    let kind = match perms.as_bytes().first() {
        Some(b'd') => EntryKind::Directory,
        Some(b'l') => EntryKind::Symlink,
        Some(b'-') => EntryKind::File,
        _ => EntryKind::Unknown,
    };

    let name = match (kind, raw_name.find(" -> ")) {
        (EntryKind::Symlink, Some(pos)) => &raw_name[..pos],
        _ => raw_name,
    };

    Some(ListEntry {
        name: name.to_string(),
        kind,
        size,
    })
}

// ─── Windows ─────────────────────────────────────────────────────────

fn parse_windows(line: &str) -> Option<ListEntry> {
    let caps = WINDOWS_LINE.captures(line)?;

    let size_or_dir = caps.get(3)?.as_str();
    let name = caps.get(4)?.as_str().to_string();

    let entry = if size_or_dir == "<DIR>" {
        ListEntry::directory(name)
    } else {
        ListEntry::file(name, size_or_dir.parse().unwrap_or(0))
    };
    Some(entry)
}
