//! Field masks for partial record updates.
//!
//! A `FieldMask` names the attributes that differ between two versions of the
//! same record, so a presentation layer can patch only those parts of an item.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// A set of record attributes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldMask(u16);

impl FieldMask {
    pub const USERNAME: FieldMask = FieldMask(1 << 0);
    pub const HANDLE: FieldMask = FieldMask(1 << 1);
    pub const AVATAR: FieldMask = FieldMask(1 << 2);
    pub const VIP: FieldMask = FieldMask(1 << 3);
    pub const FOLLOWED: FieldMask = FieldMask(1 << 4);
    pub const SPECIAL_FOLLOW: FieldMask = FieldMask(1 << 5);
    pub const REMARK: FieldMask = FieldMask(1 << 6);
    pub const SIGNATURE: FieldMask = FieldMask(1 << 7);
    pub const FOLLOWED_BACK: FieldMask = FieldMask(1 << 8);
    pub const SORT_KEY: FieldMask = FieldMask(1 << 9);

    const NAMED: [(FieldMask, &'static str); 10] = [
        (Self::USERNAME, "username"),
        (Self::HANDLE, "handle"),
        (Self::AVATAR, "avatar"),
        (Self::VIP, "is_vip"),
        (Self::FOLLOWED, "is_followed"),
        (Self::SPECIAL_FOLLOW, "is_special_follow"),
        (Self::REMARK, "remark"),
        (Self::SIGNATURE, "signature"),
        (Self::FOLLOWED_BACK, "is_followed_back"),
        (Self::SORT_KEY, "sort_key"),
    ];

    /// Returns an empty mask.
    #[inline]
    pub const fn empty() -> Self {
        FieldMask(0)
    }

    /// Returns a mask with every attribute set.
    pub const fn all() -> Self {
        FieldMask((1 << 10) - 1)
    }

    /// Returns the raw bits.
    #[inline]
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Returns true if no attribute is set.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if every attribute in `other` is also set in `self`.
    #[inline]
    pub const fn contains(&self, other: FieldMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Adds the attributes in `other`.
    #[inline]
    pub fn insert(&mut self, other: FieldMask) {
        self.0 |= other.0;
    }

    /// Adds `flag` when `changed` is true.
    #[inline]
    pub fn set_if(&mut self, flag: FieldMask, changed: bool) {
        if changed {
            self.insert(flag);
        }
    }

    /// Returns the number of attributes set.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates over the names of the attributes in this mask.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        Self::NAMED
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }
}

impl BitOr for FieldMask {
    type Output = FieldMask;

    fn bitor(self, rhs: FieldMask) -> FieldMask {
        FieldMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for FieldMask {
    fn bitor_assign(&mut self, rhs: FieldMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for FieldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
