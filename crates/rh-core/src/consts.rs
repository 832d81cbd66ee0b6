//! Core game constants (hack.h, config.h)

/// Map dimensions
pub const COLNO: usize = 80;
pub const ROWNO: usize = 22;

/// Deepest dungeon level
pub const MAXLEVEL: u8 = 40;

/// Player name and class buffer sizes
pub const PL_NSIZ: usize = 32;
pub const PL_CSIZ: usize = 20;

/// Size of a typed input line, terminator included
pub const BUFSZ: usize = 256;

/// Longest variable-length payload (names, engraving text)
pub const PAYLOAD_MAX: usize = 32767;

/// Map symbols
pub const STAIRS_UP_SYM: char = '<';
pub const STAIRS_DOWN_SYM: char = '>';
pub const GOLD_SYM: char = '$';
pub const TRAP_SYM: char = '^';
pub const WORM_TAIL_SYM: char = '~';
pub const PLAYER_SYM: char = '@';

/// Hunger thresholds (eat.c)
pub const SATIATED_AT: i32 = 1000;
pub const NOT_HUNGRY_AT: i32 = 150;
pub const HUNGRY_AT: i32 = 50;
pub const INITIAL_NUTRITION: i32 = 900;
