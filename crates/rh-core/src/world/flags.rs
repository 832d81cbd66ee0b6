//! Global option and mode flags (flag.h)
//!
//! The save file never dumps this struct raw. [`Flags::pack`] places every
//! field at a fixed bit position:
//!
//! | word | bits            | field            |
//! |------|-----------------|------------------|
//! | 0    | all             | id counter       |
//! | 1    | `0x1`           | debug            |
//! | 1    | `0x6`           | toplin (2 bits)  |
//! | 1    | `0x8`           | cbreak           |
//! | 1    | `0x10`          | standout         |
//! | 1    | `0x20`          | nonull           |
//! | 1    | `0x40`          | time             |
//! | 1    | `0x80`          | nonews           |
//! | 1    | `0x100`         | notombstone      |
//! | 1    | `0x200`         | end_own          |
//! | 1    | `0x400`         | no_rest_on_space |
//! | 1    | `0x800`         | beginner         |
//! | 1    | `0x1000`        | female           |
//! | 1    | `0x2000`        | invlet_constant  |
//! | 1    | `0x4000`        | move             |
//! | 1    | `0x8000`        | mv               |
//! | 1    | `0x70000`       | run (3 bits)     |
//! | 1    | `0x80000`       | nopick           |
//! | 1    | `0x100000`      | echo             |
//! | 1    | `0x200000`      | botl             |
//! | 1    | `0x400000`      | botlx            |
//! | 1    | `0x800000`      | nscrinh          |
//! | 1    | `0x1000000`     | made_amulet      |
//! | 1    | `0x6000000`     | no_of_wizards    |
//! | 1    | `0x38000000`    | moonphase        |
//! | 2    | all             | end_top          |
//! | 3    | all             | end_around       |

use chrono::{Datelike, NaiveDate};

/// Moon phase value meaning "full"
pub const FULL_MOON: u8 = 4;
pub const NEW_MOON: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flags {
    pub debug: bool,
    /// Top line state: 0 empty, 1 has text, 2 needs --More--
    pub toplin: u8,
    pub cbreak: bool,
    pub standout: bool,
    pub nonull: bool,
    pub time: bool,
    pub nonews: bool,
    pub notombstone: bool,
    pub end_own: bool,
    pub no_rest_on_space: bool,
    pub beginner: bool,
    pub female: bool,
    pub invlet_constant: bool,
    /// Last command took time
    pub moved: bool,
    pub mv: bool,
    pub run: u8,
    pub nopick: bool,
    pub echo: bool,
    pub botl: bool,
    pub botlx: bool,
    pub nscrinh: bool,
    pub made_amulet: bool,
    pub no_of_wizards: u8,
    pub moonphase: u8,
    pub end_top: u32,
    pub end_around: u32,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            debug: false,
            toplin: 0,
            cbreak: false,
            standout: false,
            nonull: false,
            time: false,
            nonews: false,
            notombstone: false,
            end_own: false,
            no_rest_on_space: true,
            beginner: false,
            female: false,
            invlet_constant: true,
            moved: false,
            mv: false,
            run: 0,
            nopick: false,
            echo: false,
            botl: false,
            botlx: false,
            nscrinh: false,
            made_amulet: false,
            no_of_wizards: 0,
            moonphase: NEW_MOON,
            end_top: 5,
            end_around: 4,
        }
    }
}

const fn bit(on: bool, mask: u32) -> u32 {
    if on { mask } else { 0 }
}

impl Flags {
    /// Pack into four words, the first carrying the id counter
    pub fn pack(&self, ident: u32) -> [u32; 4] {
        let packed = bit(self.debug, 0x1)
            | ((self.toplin as u32 & 3) << 1)
            | bit(self.cbreak, 0x8)
            | bit(self.standout, 0x10)
            | bit(self.nonull, 0x20)
            | bit(self.time, 0x40)
            | bit(self.nonews, 0x80)
            | bit(self.notombstone, 0x100)
            | bit(self.end_own, 0x200)
            | bit(self.no_rest_on_space, 0x400)
            | bit(self.beginner, 0x800)
            | bit(self.female, 0x1000)
            | bit(self.invlet_constant, 0x2000)
            | bit(self.moved, 0x4000)
            | bit(self.mv, 0x8000)
            | ((self.run as u32 & 7) << 16)
            | bit(self.nopick, 0x80000)
            | bit(self.echo, 0x100000)
            | bit(self.botl, 0x200000)
            | bit(self.botlx, 0x400000)
            | bit(self.nscrinh, 0x800000)
            | bit(self.made_amulet, 0x1000000)
            | ((self.no_of_wizards as u32 & 3) << 25)
            | ((self.moonphase as u32 & 7) << 27);
        [ident, packed, self.end_top, self.end_around]
    }

    /// Inverse of [`Flags::pack`]; returns the flags and the id counter
    pub fn unpack(words: [u32; 4]) -> (Flags, u32) {
        let [ident, p, end_top, end_around] = words;
        let on = |mask: u32| p & mask != 0;
        let flags = Flags {
            debug: on(0x1),
            toplin: ((p >> 1) & 3) as u8,
            cbreak: on(0x8),
            standout: on(0x10),
            nonull: on(0x20),
            time: on(0x40),
            nonews: on(0x80),
            notombstone: on(0x100),
            end_own: on(0x200),
            no_rest_on_space: on(0x400),
            beginner: on(0x800),
            female: on(0x1000),
            invlet_constant: on(0x2000),
            moved: on(0x4000),
            mv: on(0x8000),
            run: ((p >> 16) & 7) as u8,
            nopick: on(0x80000),
            echo: on(0x100000),
            botl: on(0x200000),
            botlx: on(0x400000),
            nscrinh: on(0x800000),
            made_amulet: on(0x1000000),
            no_of_wizards: ((p >> 25) & 3) as u8,
            moonphase: ((p >> 27) & 7) as u8,
            end_top,
            end_around,
        };
        (flags, ident)
    }

    /// The current settings in option syntax (the `O` command with no input)
    pub fn option_string(&self) -> String {
        let mut opts = vec![if self.female { "female" } else { "male" }.to_string()];
        for (on, name) in [
            (self.standout, "standout"),
            (self.nonull, "nonull"),
            (self.nonews, "nonews"),
            (self.time, "time"),
            (self.notombstone, "notombstone"),
            (!self.no_rest_on_space, "rest_on_space"),
        ] {
            if on {
                opts.push(name.to_string());
            }
        }
        opts.push(format!(
            "endgame: {} topscores/{} {} around me",
            self.end_top,
            self.end_around,
            if self.end_own { "own scores/" } else { "" }
        ));
        opts.join(",")
    }
}

/// Phase of the moon for a date, 0 (new) to 7; 4 is full
pub fn phase_of_the_moon(date: NaiveDate) -> u8 {
    let diy = date.ordinal0() as i32;
    let golden = (date.year() - 1900).rem_euclid(19) + 1;
    let mut epact = (11 * golden + 18) % 30;
    if (epact == 25 && golden > 11) || epact == 24 {
        epact += 1;
    }
    ((((((diy + epact) * 6) + 11) % 177) / 22) & 7) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let flags = Flags::default();
        assert_eq!(flags.end_top, 5);
        assert_eq!(flags.end_around, 4);
        assert!(flags.no_rest_on_space);
        assert!(flags.invlet_constant);
    }

    #[test]
    fn test_bit_positions() {
        let mut flags = Flags {
            no_rest_on_space: false,
            invlet_constant: false,
            ..Flags::default()
        };
        assert_eq!(flags.pack(0)[1], 0);
        flags.female = true;
        assert_eq!(flags.pack(0)[1], 0x1000);
        flags.female = false;
        flags.run = 5;
        assert_eq!(flags.pack(0)[1], 5 << 16);
        flags.run = 0;
        flags.moonphase = FULL_MOON;
        assert_eq!(flags.pack(0)[1], 4 << 27);
        flags.moonphase = 0;
        flags.toplin = 2;
        assert_eq!(flags.pack(0)[1], 0x4);
    }

    #[test]
    fn test_pack_unpack() {
        let flags = Flags {
            debug: true,
            toplin: 3,
            female: true,
            run: 7,
            no_of_wizards: 2,
            moonphase: 6,
            end_top: 12,
            end_around: 1,
            end_own: true,
            ..Flags::default()
        };
        let words = flags.pack(777);
        assert_eq!(words[0], 777);
        assert_eq!(words[2], 12);
        assert_eq!(Flags::unpack(words), (flags, 777));
    }

    #[test]
    fn test_moon_phase_range() {
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut full = 0;
        for _ in 0..366 {
            let phase = phase_of_the_moon(date);
            assert!(phase < 8);
            if phase == FULL_MOON {
                full += 1;
            }
            date = date.succ_opt().unwrap();
        }
        assert!(full > 0);
    }
}
