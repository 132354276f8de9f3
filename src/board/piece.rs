use std::fmt;
use std::ops::Not;

/// Piece color. The ordering (Red < Yellow < Green < Blue) is part of the
/// piece encoding and must not change.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {
    // all 4 colors in encoding order
    pub const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

    #[inline]
    pub fn to_index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Color {
        Color::ALL[i]
    }

    /// single-letter token used in piece notation ("R1", "B3", ...).
    #[inline]
    pub fn letter(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Yellow => 'Y',
            Color::Green => 'G',
            Color::Blue => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "Red",
            Color::Yellow => "Yellow",
            Color::Green => "Green",
            Color::Blue => "Blue",
        };
        write!(f, "{}", name)
    }
}

/// Piece size. Discriminants are the pip counts printed on the pyramids.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Size {
    Small = 1,
    Medium = 2,
    Large = 3,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Medium, Size::Large];

    #[inline]
    pub fn to_index(self) -> usize {
        self as usize - 1
    }

    #[inline]
    pub fn from_index(i: usize) -> Size {
        Size::ALL[i]
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        };
        write!(f, "{}", name)
    }
}

/// One of the 12 piece kinds, packed as `color * 3 + size - 1`.
///
/// The index doubles as the bit-field position inside a [`super::Bank`],
/// so the encoding is load-bearing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Piece(u8);

impl Piece {
    /// number of distinct piece kinds.
    pub const COUNT: usize = 12;

    #[inline]
    pub fn new(color: Color, size: Size) -> Piece {
        Piece((color.to_index() * 3 + size.to_index()) as u8)
    }

    #[inline]
    pub fn from_index(i: usize) -> Piece {
        debug_assert!(i < Piece::COUNT);
        Piece(i as u8)
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn color(self) -> Color {
        Color::from_index(self.0 as usize / 3)
    }

    #[inline]
    pub fn size(self) -> Size {
        Size::from_index(self.0 as usize % 3)
    }

    /// iterate all 12 kinds in encoding order.
    pub fn all() -> impl Iterator<Item = Piece> {
        (0..Piece::COUNT).map(Piece::from_index)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color().letter(), self.size() as u8)
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({})", self)
    }
}

/// A player. North moves first and owns the homeworld at star index 0;
/// South owns index 1.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Player {
    North,
    South,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::North, Player::South];

    #[inline]
    pub fn to_index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Player {
        Player::ALL[i]
    }
}

impl Not for Player {
    type Output = Player;

    #[inline]
    fn not(self) -> Player {
        match self {
            Player::North => Player::South,
            Player::South => Player::North,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Player::North => "North",
            Player::South => "South",
        };
        write!(f, "{}", name)
    }
}

/// Set of colors as a 4-bit mask (bit = `Color::to_index`).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct ColorSet(pub u8);

impl ColorSet {
    pub const EMPTY: ColorSet = ColorSet(0);

    #[inline]
    pub fn contains(self, c: Color) -> bool {
        self.0 & (1 << c.to_index()) != 0
    }

    #[inline]
    pub fn insert(&mut self, c: Color) {
        self.0 |= 1 << c.to_index();
    }

    #[inline]
    pub fn union(self, other: ColorSet) -> ColorSet {
        ColorSet(self.0 | other.0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Set of sizes as a 3-bit mask (bit = `Size::to_index`). Two stars connect
/// iff their size sets are disjoint.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct SizeSet(pub u8);

impl SizeSet {
    pub const EMPTY: SizeSet = SizeSet(0);

    #[inline]
    pub fn contains(self, s: Size) -> bool {
        self.0 & (1 << s.to_index()) != 0
    }

    #[inline]
    pub fn insert(&mut self, s: Size) {
        self.0 |= 1 << s.to_index();
    }

    #[inline]
    pub fn disjoint(self, other: SizeSet) -> bool {
        self.0 & other.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_encoding() {
        // R1 = 0, R3 = 2, Y1 = 3, B3 = 11
        assert_eq!(Piece::new(Color::Red, Size::Small).to_index(), 0);
        assert_eq!(Piece::new(Color::Red, Size::Large).to_index(), 2);
        assert_eq!(Piece::new(Color::Yellow, Size::Small).to_index(), 3);
        assert_eq!(Piece::new(Color::Blue, Size::Large).to_index(), 11);
    }

    #[test]
    fn test_piece_roundtrip() {
        for p in Piece::all() {
            assert_eq!(Piece::new(p.color(), p.size()), p);
            assert_eq!(Piece::from_index(p.to_index()), p);
        }
    }

    #[test]
    fn test_piece_display() {
        assert_eq!(Piece::new(Color::Red, Size::Small).to_string(), "R1");
        assert_eq!(Piece::new(Color::Green, Size::Medium).to_string(), "G2");
        assert_eq!(Piece::new(Color::Blue, Size::Large).to_string(), "B3");
    }

    #[test]
    fn test_player_flip() {
        assert_eq!(!Player::North, Player::South);
        assert_eq!(!Player::South, Player::North);
    }

    #[test]
    fn test_color_set() {
        let mut set = ColorSet::EMPTY;
        assert!(set.is_empty());
        set.insert(Color::Green);
        set.insert(Color::Red);
        assert!(set.contains(Color::Green));
        assert!(set.contains(Color::Red));
        assert!(!set.contains(Color::Blue));
    }

    #[test]
    fn test_size_set_disjoint() {
        let mut a = SizeSet::EMPTY;
        a.insert(Size::Small);
        a.insert(Size::Medium);
        let mut b = SizeSet::EMPTY;
        b.insert(Size::Large);
        assert!(a.disjoint(b));
        b.insert(Size::Medium);
        assert!(!a.disjoint(b));
    }
}

// Size discriminants double as the printed pip count, so `size as u8` is the
// display digit and `to_index` is the bank bit-field offset. Sticking to one
// packed index for Piece keeps Bank shifts branch-free.
