use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// The five base attributes.
///
/// Also used as a signed delta by attribute modifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Attributes {
    pub str: i64,
    pub con: i64,
    pub dex: i64,
    pub int: i64,
    pub wis: i64,
}

impl Attributes {
    pub const ZERO: Self = Self::new(0, 0, 0, 0, 0);

    pub const fn new(str: i64, con: i64, dex: i64, int: i64, wis: i64) -> Self {
        Self {
            str,
            con,
            dex,
            int,
            wis,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for Attributes {
    type Output = Attributes;

    fn add(self, rhs: Attributes) -> Attributes {
        Attributes::new(
            self.str + rhs.str,
            self.con + rhs.con,
            self.dex + rhs.dex,
            self.int + rhs.int,
            self.wis + rhs.wis,
        )
    }
}

impl Sub for Attributes {
    type Output = Attributes;

    fn sub(self, rhs: Attributes) -> Attributes {
        self + (-rhs)
    }
}

impl Neg for Attributes {
    type Output = Attributes;

    fn neg(self) -> Attributes {
        Attributes::new(-self.str, -self.con, -self.dex, -self.int, -self.wis)
    }
}

impl AddAssign for Attributes {
    fn add_assign(&mut self, rhs: Attributes) {
        *self = *self + rhs;
    }
}

impl SubAssign for Attributes {
    fn sub_assign(&mut self, rhs: Attributes) {
        *self = *self - rhs;
    }
}
