//! High score list (hack.end.c topten/prscore)
//!
//! The record file is shared by every player on the machine, one entry per
//! line in the classic text layout. Updates happen under the record lock and
//! are written through a temporary file.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::{acquire, Flags, LockBackend, LockError, LockPolicy};
use crate::consts::COLNO;

/// Name of the score file inside the playground
pub const RECORD: &str = "record";
const RECORD_LOCK: &str = "record.lock";

/// Most entries kept in the file
pub const ENTRYMAX: usize = 100;
/// Entries one uid may hold per character class
pub const PERSMAX: i32 = 1;
/// Scores below this are not recorded
pub const POINTSMIN: i64 = 1;

const NAMSZ: usize = 64;
const DTHSZ: usize = 128;

#[derive(Error, Debug)]
pub enum TopTenError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("Cannot write record file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One line of the record file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// `yymmdd`
    pub date: String,
    pub uid: u32,
    pub level: i32,
    pub maxlvl: i32,
    pub hp: i32,
    pub maxhp: i32,
    pub points: i64,
    /// First letter of the character class
    pub plchar: char,
    /// 'M' or 'F'
    pub sex: char,
    pub name: String,
    pub death: String,
}

impl ScoreEntry {
    /// Clamp name and death to their field sizes and drop sub-minimum scores
    pub fn normalized(mut self) -> Self {
        self.name = clip(&self.name, NAMSZ);
        self.death = clip(&self.death, DTHSZ);
        if self.points < POINTSMIN {
            self.points = 0;
        }
        self
    }

    /// Parse one record line. `None` when a field is missing or malformed.
    pub fn parse(line: &str) -> Option<ScoreEntry> {
        let mut rest = line;
        let date = next_token(&mut rest)?;
        if date.len() > 6 {
            return None;
        }
        let uid = next_token(&mut rest)?.parse().ok()?;
        let level = next_token(&mut rest)?.parse().ok()?;
        let maxlvl = next_token(&mut rest)?.parse().ok()?;
        let hp = next_token(&mut rest)?.parse().ok()?;
        let maxhp = next_token(&mut rest)?.parse().ok()?;
        let points = next_token(&mut rest)?.parse().ok()?;

        let mut chars = rest.trim_start().chars();
        let plchar = chars.next()?;
        let sex = chars.next()?;
        let (name, death) = chars.as_str().trim_start().split_once(',')?;
        let death = death.trim_end_matches(['\r', '\n']);
        if name.is_empty() || death.is_empty() {
            return None;
        }
        Some(ScoreEntry {
            date: date.to_string(),
            uid,
            level,
            maxlvl,
            hp,
            maxhp,
            points,
            plchar,
            sex,
            name: name.to_string(),
            death: death.to_string(),
        })
    }

    /// The record file line, without the newline
    pub fn to_line(&self) -> String {
        format!(
            "{:>6} {} {} {} {} {} {} {}{} {},{}",
            self.date,
            self.uid,
            self.level,
            self.maxlvl,
            self.hp,
            self.maxhp,
            self.points,
            self.plchar,
            self.sex,
            self.name,
            self.death
        )
    }

    fn same_player(&self, other: &ScoreEntry) -> bool {
        self.uid == other.uid && self.plchar == other.plchar
    }

    /// The one-line description shown in score listings
    pub fn describe(&self, rank: Option<usize>) -> String {
        let mut line = String::new();
        match rank {
            Some(rank) => {
                let _ = write!(line, "{rank:3}");
            }
            None => line.push_str("   "),
        }
        let _ = write!(line, " {:6} {:>8}", self.points, self.name);
        if self.plchar == 'X' {
            line.push(' ');
        } else {
            let _ = write!(line, "-{} ", self.plchar);
        }

        let mut killed = false;
        if let Some(after) = self.death.strip_prefix("escaped") {
            if after == " (with amulet)" {
                line.push_str("escaped the dungeon with amulet");
            } else {
                let _ = write!(line, "escaped the dungeon [max level {}]", self.maxlvl);
            }
        } else {
            let mut quit = false;
            let mut starv = false;
            if self.death.starts_with("quit") {
                quit = true;
                if self.maxhp < 3 * self.hp && self.maxlvl < 4 {
                    line.push_str("cravenly gave up");
                } else {
                    line.push_str("quit");
                }
            } else if self.death == "choked" {
                let pronoun = if self.sex == 'F' { "her" } else { "his" };
                let _ = write!(line, "choked on {pronoun} food");
            } else if self.death.starts_with("starv") {
                line.push_str("starved to death");
                starv = true;
            } else {
                line.push_str("was killed");
                killed = true;
            }
            let where_ = if killed || starv { "" } else { " dungeon" };
            let _ = write!(line, " on{where_} level {}", self.level);
            if self.maxlvl != self.level {
                let _ = write!(line, " [max {}]", self.maxlvl);
            }
            if quit {
                line.push_str(self.death.get(4..).unwrap_or(""));
            }
        }
        if killed {
            let article = if self.death.starts_with("trick") || self.death.starts_with("the ") {
                ""
            } else if self.death.starts_with(['a', 'e', 'i', 'o', 'u']) {
                "an "
            } else {
                "a "
            };
            let _ = write!(line, " by {article}{}", self.death);
        }
        line.push('.');

        if self.maxhp != 0 {
            let hp = if self.hp > 0 {
                self.hp.to_string()
            } else {
                "-".to_string()
            };
            let hppos = COLNO.saturating_sub(7 + hp.len());
            if line.chars().count() <= hppos {
                pad_to(&mut line, hppos);
                let _ = write!(line, "{hp} [{}]", self.maxhp);
            }
        }
        line
    }
}

fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn pad_to(line: &mut String, width: usize) {
    let len = line.chars().count();
    if len < width {
        line.extend(std::iter::repeat_n(' ', width - len));
    }
}

fn next_token<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let s = rest.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    let (token, tail) = s.split_at(end);
    *rest = tail;
    Some(token)
}

/// Column header of the listing
pub fn outheader() -> String {
    let mut line = String::from("Number Points  Name");
    pad_to(&mut line, COLNO - 9);
    line.push_str("Hp [max]");
    line
}

/// English ordinal suffix: 1st, 2nd, 3rd, 11th...
pub fn ordin(n: usize) -> &'static str {
    let d = n % 10;
    if d == 0 || d > 3 || n / 10 == 1 {
        "th"
    } else if d == 1 {
        "st"
    } else if d == 2 {
        "nd"
    } else {
        "rd"
    }
}

/// `yymmdd` for the record file
pub fn getdatestr(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// Where a finished game landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Entered the list at this rank
    Ranked(usize),
    /// An earlier entry of the same player at `rank` scored `previous`
    NotBeaten { rank: usize, previous: i64 },
    /// Not good enough for the list
    Unranked,
}

/// Result of merging one entry into the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub placement: Placement,
    /// The file needs rewriting
    pub changed: bool,
    /// Rank the listing is centred on
    pub anchor: usize,
}

/// The ranked entries of the record file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopTen {
    pub entries: Vec<ScoreEntry>,
}

impl TopTen {
    /// Parse the record file text.
    ///
    /// A malformed line counts as a zero-score entry: it ranks below
    /// everything and is not written back.
    pub fn parse(text: &str) -> TopTen {
        let mut entries = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match ScoreEntry::parse(line) {
                Some(entry) if entry.points >= POINTSMIN => entries.push(entry),
                Some(_) => {}
                None => warn!(line = lineno + 1, "malformed score line ignored"),
            }
        }
        entries.truncate(ENTRYMAX);
        TopTen { entries }
    }

    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.to_line() + "\n")
            .collect()
    }

    pub fn load(path: &Path) -> Result<TopTen, TopTenError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(TopTen::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(TopTen::default()),
            Err(source) => Err(TopTenError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write through a temporary file in the same directory
    pub fn store(&self, path: &Path) -> Result<(), TopTenError> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let io_err = |source| TopTenError::Io {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&tmp, self.to_text()).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            io_err(e)
        })
    }

    /// Merge `t0` into the list.
    ///
    /// It goes before the first entry scoring strictly less. Each uid and
    /// class keeps at most [`PERSMAX`] entries; surplus older entries are
    /// dropped, and if an older entry already beats `t0` it stays put.
    pub fn insert(&mut self, t0: &ScoreEntry) -> Insertion {
        let old = std::mem::take(&mut self.entries);
        let mut list: Vec<ScoreEntry> = Vec::with_capacity(old.len() + 1);
        let mut rank0: Option<usize> = None;
        let mut not_beaten: Option<(usize, i64)> = None;
        let mut occ = PERSMAX;
        let mut changed = false;
        let mut rank = 1;

        let sentinel = ScoreEntry {
            points: 0,
            ..t0.clone()
        };
        for t1 in old.into_iter().chain(std::iter::once(sentinel)) {
            if rank0.is_none() && not_beaten.is_none() && t1.points < t0.points {
                rank0 = Some(rank);
                rank += 1;
                list.push(t0.clone());
                occ -= 1;
                changed = true;
            }
            if t1.points == 0 {
                break;
            }
            if t1.same_player(t0) {
                occ -= 1;
                if occ <= 0 {
                    if rank0.is_none() && not_beaten.is_none() {
                        not_beaten = Some((rank, t1.points));
                    }
                    if occ < 0 {
                        changed = true;
                        continue;
                    }
                }
            }
            if rank <= ENTRYMAX {
                list.push(t1);
                rank += 1;
            }
            if rank > ENTRYMAX {
                break;
            }
        }
        self.entries = list;

        let (placement, anchor) = match (rank0, not_beaten) {
            (Some(r), _) => (Placement::Ranked(r), r),
            (None, Some((r, previous))) => (Placement::NotBeaten { rank: r, previous }, r),
            (None, None) => (Placement::Unranked, rank),
        };
        Insertion {
            placement,
            changed,
            anchor,
        }
    }

    /// The listing shown after a game: the top `end_top`, `end_around`
    /// entries either side of the player, and optionally all their own.
    pub fn display_lines(&self, t0: &ScoreEntry, ins: &Insertion, flags: &Flags) -> Vec<String> {
        let end_top = flags.end_top as usize;
        let end_around = flags.end_around as usize;
        let rank0 = ins.anchor;
        let own_old = matches!(ins.placement, Placement::NotBeaten { .. });

        let mut lines = vec![outheader()];
        for (i, t1) in self.entries.iter().enumerate() {
            let rank = i + 1;
            let near = rank + end_around >= rank0 && rank <= rank0 + end_around;
            if rank > end_top && !near && (!flags.end_own || t1.uid != t0.uid) {
                continue;
            }
            if rank + end_around == rank0 && rank0 > end_top + end_around + 1 && !flags.end_own {
                lines.push(String::new());
            }
            if rank != rank0 || !own_old {
                lines.push(t1.describe(Some(rank)));
            } else {
                let mine = t0.describe(None);
                let mut theirs = t1.describe(Some(rank));
                let width = mine.chars().count().max(theirs.chars().count());
                pad_to(&mut theirs, width);
                let mut mine = mine;
                pad_to(&mut mine, width);
                lines.push(theirs);
                lines.push(mine);
            }
        }
        if rank0 > self.entries.len() {
            lines.push(t0.describe(None));
        }
        lines
    }

    /// Entries matching `players` for the score listing option.
    ///
    /// Each selector is `all`, a player name, `-C` for a class letter, or a
    /// number meaning "ranks up to". With no selectors, the entries of `uid`.
    pub fn select(&self, uid: u32, players: &[String]) -> Vec<(usize, &ScoreEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i + 1, e))
            .filter(|(rank, e)| {
                if players.is_empty() {
                    return e.uid == uid;
                }
                players.iter().any(|p| {
                    let class = p.strip_prefix('-').and_then(|c| {
                        let mut chars = c.chars();
                        chars.next().filter(|_| chars.next().is_none())
                    });
                    p == "all"
                        || clip(p, NAMSZ) == e.name
                        || class == Some(e.plchar)
                        || p.parse::<usize>().is_ok_and(|n| *rank <= n)
                })
            })
            .collect()
    }
}

/// What a finished game prints about the score list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub placement: Placement,
    pub lines: Vec<String>,
}

/// Record a finished game in `<dir>/record` and build the listing.
///
/// The record lock is held for the whole read-merge-write cycle. When it
/// cannot be had, nothing is written.
pub fn record_score(
    dir: &Path,
    entry: ScoreEntry,
    backend: LockBackend,
    flags: &Flags,
) -> Result<ScoreReport, TopTenError> {
    let t0 = entry.normalized();
    let _lock = acquire(
        &dir.join(RECORD_LOCK),
        backend,
        LockPolicy::RECORD,
        "update the record file",
    )?;
    let path = dir.join(RECORD);
    let mut list = TopTen::load(&path)?;
    let ins = list.insert(&t0);

    let mut lines = Vec::new();
    if let Placement::NotBeaten { previous, .. } = ins.placement {
        lines.push(format!(
            "You didn't beat your previous score of {previous} points."
        ));
        lines.push(String::new());
    }
    if ins.changed {
        list.store(&path)?;
        info!(points = t0.points, placement = ?ins.placement, "score recorded");
        if let Placement::Ranked(rank) = ins.placement {
            if rank <= 10 {
                lines.push("You made the top ten list!".to_string());
            } else {
                lines.push(format!(
                    "You reached the {rank}{} place on the top {ENTRYMAX} list.",
                    ordin(rank)
                ));
            }
            lines.push(String::new());
        }
    }
    lines.extend(list.display_lines(&t0, &ins, flags));
    Ok(ScoreReport {
        placement: ins.placement,
        lines,
    })
}

/// The score listing for `players` (see [`TopTen::select`])
pub fn list_scores(dir: &Path, uid: u32, players: &[String]) -> Result<Vec<String>, TopTenError> {
    let list = TopTen::load(&dir.join(RECORD))?;
    let chosen = list.select(uid, players);
    if chosen.is_empty() {
        let who = match players {
            [] => "you.".to_string(),
            [one] => format!("{one}."),
            many => format!("any of {}.", many.join(", ")),
        };
        return Ok(vec![format!("Cannot find any entries for {who}")]);
    }
    let mut lines = vec![outheader()];
    lines.extend(chosen.into_iter().map(|(rank, e)| e.describe(Some(rank))));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(uid: u32, plchar: char, points: i64) -> ScoreEntry {
        ScoreEntry {
            date: "240314".into(),
            uid,
            level: 3,
            maxlvl: 5,
            hp: 0,
            maxhp: 20,
            points,
            plchar,
            sex: 'M',
            name: format!("p{uid}"),
            death: "jackal".into(),
        }
    }

    fn list_of(points: &[(u32, i64)]) -> TopTen {
        TopTen {
            entries: points.iter().map(|&(uid, p)| entry(uid, 'F', p)).collect(),
        }
    }

    fn points(list: &TopTen) -> Vec<i64> {
        list.entries.iter().map(|e| e.points).collect()
    }

    #[test]
    fn test_parse_line() {
        let e = ScoreEntry::parse("240314 1000 3 5 0 20 1234 FM Alice,killed by a jackal").unwrap();
        assert_eq!(e.date, "240314");
        assert_eq!(e.uid, 1000);
        assert_eq!((e.level, e.maxlvl, e.hp, e.maxhp), (3, 5, 0, 20));
        assert_eq!(e.points, 1234);
        assert_eq!((e.plchar, e.sex), ('F', 'M'));
        assert_eq!(e.name, "Alice");
        assert_eq!(e.death, "killed by a jackal");
        assert_eq!(ScoreEntry::parse(&e.to_line()), Some(e));
    }

    #[test]
    fn test_malformed_lines_rank_last_and_are_dropped() {
        let text = "240314 1 1 1 5 5 300 FM a,jackal\n\
                    garbage here\n\
                    240314 2 1 1 5 5 100 FM b,jackal\n\
                    240314 3 1 1 5 5 0 FM c,jackal\n\
                    240314 4 1 1 5 5 200 FM d\n";
        let list = TopTen::parse(text);
        assert_eq!(points(&list), vec![300, 100]);
        assert_eq!(list.to_text().lines().count(), 2);
    }

    #[test]
    fn test_insert_before_first_lower() {
        let mut list = list_of(&[(1, 500), (2, 300), (3, 300), (4, 100)]);
        let ins = list.insert(&entry(9, 'F', 300));
        assert_eq!(ins.placement, Placement::Ranked(4));
        assert!(ins.changed);
        assert_eq!(points(&list), vec![500, 300, 300, 300, 100]);
        assert_eq!(list.entries[3].uid, 9);
    }

    #[test]
    fn test_insert_at_end_and_into_empty() {
        let mut list = list_of(&[(1, 500)]);
        assert_eq!(list.insert(&entry(9, 'F', 10)).placement, Placement::Ranked(2));
        let mut empty = TopTen::default();
        assert_eq!(empty.insert(&entry(9, 'F', 10)).placement, Placement::Ranked(1));
        assert_eq!(empty.entries.len(), 1);
    }

    #[test]
    fn test_previous_score_not_beaten() {
        let mut list = list_of(&[(1, 500), (9, 400), (2, 100)]);
        let before = list.clone();
        let ins = list.insert(&entry(9, 'F', 200));
        assert_eq!(
            ins.placement,
            Placement::NotBeaten {
                rank: 2,
                previous: 400
            }
        );
        assert!(!ins.changed);
        assert_eq!(list, before);
    }

    #[test]
    fn test_better_score_replaces_own_entry() {
        let mut list = list_of(&[(1, 500), (9, 100), (2, 50)]);
        let ins = list.insert(&entry(9, 'F', 600));
        assert_eq!(ins.placement, Placement::Ranked(1));
        assert!(ins.changed);
        assert_eq!(points(&list), vec![600, 500, 50]);
    }

    #[test]
    fn test_other_class_is_another_player() {
        let mut list = list_of(&[(9, 500)]);
        let ins = list.insert(&entry(9, 'W', 100));
        assert_eq!(ins.placement, Placement::Ranked(2));
        assert_eq!(list.entries.len(), 2);
    }

    #[test]
    fn test_zero_points_never_recorded() {
        let mut list = list_of(&[(1, 5)]);
        let ins = list.insert(&entry(9, 'F', 0).normalized());
        assert_eq!(ins.placement, Placement::Unranked);
        assert!(!ins.changed);
        assert_eq!(ins.anchor, 2);
    }

    #[test]
    fn test_list_capped_at_entrymax() {
        let full: Vec<(u32, i64)> = (0..ENTRYMAX as u32).map(|i| (i + 100, 1000 - i as i64)).collect();
        let mut list = list_of(&full);
        let ins = list.insert(&entry(9, 'F', 2000));
        assert_eq!(ins.placement, Placement::Ranked(1));
        assert_eq!(list.entries.len(), ENTRYMAX);
        assert_eq!(list.entries.last().map(|e| e.points), Some(1000 - 98));

        let mut list = list_of(&full);
        let ins = list.insert(&entry(9, 'F', 1));
        assert_eq!(ins.placement, Placement::Unranked);
        assert_eq!(list.entries.len(), ENTRYMAX);
    }

    #[test]
    fn test_ordin() {
        let got: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 100, 101]
            .iter()
            .map(|&n| format!("{n}{}", ordin(n)))
            .collect();
        assert_eq!(
            got,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "100th", "101st"]
        );
    }

    #[test]
    fn test_describe_killed() {
        let e = entry(1, 'F', 1234);
        let line = e.describe(Some(1));
        assert!(line.starts_with("  1   1234       p1-F was killed on level 3 [max 5] by a jackal."));
        assert!(line.ends_with("- [20]"));
        assert_eq!(line.chars().count(), COLNO - 7 - 1 + " [20]".len() + 1);
    }

    #[test]
    fn test_describe_variants() {
        let mut e = entry(1, 'X', 50);
        e.maxhp = 0;
        e.death = "escaped (with amulet)".into();
        assert!(e.describe(None).ends_with("p1 escaped the dungeon with amulet."));
        e.death = "escaped".into();
        assert!(e.describe(None).ends_with("escaped the dungeon [max level 5]."));
        e.death = "quit".into();
        e.hp = 10;
        e.maxhp = 12;
        e.maxlvl = 3;
        assert!(e.describe(None).contains("cravenly gave up on dungeon level 3."));
        e.death = "choked".into();
        e.sex = 'F';
        assert!(e.describe(None).contains("choked on her food on dungeon level 3."));
        e.death = "starvation".into();
        assert!(e.describe(None).contains("starved to death on level 3."));
        e.death = "orc".into();
        assert!(e.describe(None).contains("by an orc."));
        e.death = "the wizard".into();
        assert!(e.describe(None).contains("by the wizard."));
    }

    #[test]
    fn test_header_layout() {
        let header = outheader();
        assert!(header.starts_with("Number Points  Name"));
        assert_eq!(header.find("Hp [max]"), Some(COLNO - 9));
    }

    #[test]
    fn test_listing_window() {
        let scores: Vec<(u32, i64)> = (0..30u32).map(|i| (i + 100, 3000 - 10 * i as i64)).collect();
        let mut list = list_of(&scores);
        let t0 = entry(9, 'F', 2795);
        let ins = list.insert(&t0);
        assert_eq!(ins.placement, Placement::Ranked(22));
        let flags = Flags::default();
        let lines = list.display_lines(&t0, &ins, &flags);
        // header, top 5, blank, 9 around
        assert_eq!(lines.len(), 1 + 5 + 1 + 9);
        assert!(lines[6].is_empty());
        assert!(lines[7].starts_with(" 18 "));
        assert!(lines[15].starts_with(" 26 "));
    }

    #[test]
    fn test_unranked_entry_listed_last() {
        let mut list = list_of(&[(1, 500)]);
        let t0 = entry(9, 'F', 0).normalized();
        let ins = list.insert(&t0);
        let lines = list.display_lines(&t0, &ins, &Flags::default());
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with(&format!("{}0 ", " ".repeat(9))));
    }

    #[test]
    fn test_record_score_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let flags = Flags::default();
        let report =
            record_score(dir.path(), entry(9, 'F', 100), LockBackend::Flock, &flags).unwrap();
        assert_eq!(report.placement, Placement::Ranked(1));
        assert!(report.lines.iter().any(|l| l == "You made the top ten list!"));

        let report =
            record_score(dir.path(), entry(9, 'F', 50), LockBackend::Flock, &flags).unwrap();
        assert!(report
            .lines
            .iter()
            .any(|l| l == "You didn't beat your previous score of 100 points."));
        let text = fs::read_to_string(dir.path().join(RECORD)).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_record_lock_timeout_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let quick = LockPolicy {
            attempts: 1,
            interval: std::time::Duration::from_millis(1),
        };
        let _held = acquire(&dir.path().join(RECORD_LOCK), LockBackend::Link, quick, "hold").unwrap();
        let err = record_score(dir.path(), entry(9, 'F', 100), LockBackend::Link, &Flags::default());
        assert!(matches!(err, Err(TopTenError::Lock(LockError::Timeout { .. }))));
        assert!(!dir.path().join(RECORD).exists());
    }

    #[test]
    fn test_list_scores_selectors() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = list_of(&[(1, 500), (2, 300)]);
        list.entries[1].plchar = 'W';
        list.store(&dir.path().join(RECORD)).unwrap();

        let mine = list_scores(dir.path(), 2, &[]).unwrap();
        assert_eq!(mine.len(), 2);
        let wizards = list_scores(dir.path(), 0, &["-W".to_string()]).unwrap();
        assert_eq!(wizards.len(), 2);
        assert!(wizards[1].starts_with("  2 "));
        let top = list_scores(dir.path(), 0, &["1".to_string()]).unwrap();
        assert!(top[1].starts_with("  1 "));
        let none = list_scores(dir.path(), 0, &["bob".to_string(), "eve".to_string()]).unwrap();
        assert_eq!(none, vec!["Cannot find any entries for any of bob, eve.".to_string()]);
    }
}
