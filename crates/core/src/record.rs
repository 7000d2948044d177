//! Record structure for Roster.
//!
//! This module defines the `Record` struct which represents a single entry of
//! the follow list, together with its mutable `Attributes`.

use crate::field_mask::FieldMask;
use serde::{Deserialize, Serialize};

/// Unique identifier for a record.
pub type RecordId = u64;

/// The mutable attributes of a follow-list entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Account display name.
    pub username: String,
    /// Public account handle.
    pub handle: String,
    /// Avatar resource identifier.
    pub avatar: u32,
    pub is_vip: bool,
    pub is_followed: bool,
    pub is_special_follow: bool,
    /// User-assigned remark, shown instead of the username when non-empty.
    pub remark: String,
    pub signature: Option<String>,
    pub is_followed_back: bool,
}

impl Attributes {
    /// Creates attributes for a followed account with the given name and handle.
    pub fn new(username: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            handle: handle.into(),
            is_followed: true,
            ..Self::default()
        }
    }

    /// Sets the remark.
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    /// Sets the VIP flag.
    pub fn with_vip(mut self, is_vip: bool) -> Self {
        self.is_vip = is_vip;
        self
    }

    /// Sets the avatar resource.
    pub fn with_avatar(mut self, avatar: u32) -> Self {
        self.avatar = avatar;
        self
    }

    /// Returns the set of attributes that differ from `other`.
    pub fn changed_fields(&self, other: &Attributes) -> FieldMask {
        let mut mask = FieldMask::empty();
        mask.set_if(FieldMask::USERNAME, self.username != other.username);
        mask.set_if(FieldMask::HANDLE, self.handle != other.handle);
        mask.set_if(FieldMask::AVATAR, self.avatar != other.avatar);
        mask.set_if(FieldMask::VIP, self.is_vip != other.is_vip);
        mask.set_if(FieldMask::FOLLOWED, self.is_followed != other.is_followed);
        mask.set_if(
            FieldMask::SPECIAL_FOLLOW,
            self.is_special_follow != other.is_special_follow,
        );
        mask.set_if(FieldMask::REMARK, self.remark != other.remark);
        mask.set_if(FieldMask::SIGNATURE, self.signature != other.signature);
        mask.set_if(
            FieldMask::FOLLOWED_BACK,
            self.is_followed_back != other.is_followed_back,
        );
        mask
    }
}

fn initial_version() -> u64 {
    1
}

/// A single entry of the collection.
///
/// `id` is the sole identity of a record and never changes. `sort_key` and the
/// attributes may change over the record's lifetime; `version` is bumped by the
/// collection store each time they do.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    /// Follow time in milliseconds since the Unix epoch.
    sort_key: i64,
    #[serde(flatten)]
    attributes: Attributes,
    #[serde(default = "initial_version")]
    version: u64,
}

impl Record {
    /// Creates a new record. Version defaults to 1.
    pub fn new(id: RecordId, sort_key: i64, attributes: Attributes) -> Self {
        Self {
            id,
            sort_key,
            attributes,
            version: initial_version(),
        }
    }

    /// Returns the record ID.
    #[inline]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the sort key.
    #[inline]
    pub fn sort_key(&self) -> i64 {
        self.sort_key
    }

    /// Sets the sort key.
    #[inline]
    pub fn set_sort_key(&mut self, sort_key: i64) {
        self.sort_key = sort_key;
    }

    /// Returns the attributes.
    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns a mutable reference to the attributes.
    #[inline]
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Returns the version number.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Increments the version number and returns the new value.
    #[inline]
    pub fn increment_version(&mut self) -> u64 {
        self.version = self.version.wrapping_add(1);
        self.version
    }

    /// The label shown for this record: the remark if set, the username otherwise.
    pub fn display_key(&self) -> &str {
        if self.attributes.remark.is_empty() {
            &self.attributes.username
        } else {
            &self.attributes.remark
        }
    }

    /// The fields a filter text is matched against, in match order.
    pub fn searchable_fields(&self) -> [&str; 3] {
        [
            &self.attributes.username,
            &self.attributes.remark,
            &self.attributes.handle,
        ]
    }

    /// Returns the set of mutable fields (sort key included) that differ from `other`.
    pub fn changed_fields(&self, other: &Record) -> FieldMask {
        let mut mask = self.attributes.changed_fields(&other.attributes);
        mask.set_if(FieldMask::SORT_KEY, self.sort_key != other.sort_key);
        mask
    }

    /// Copies the mutable fields of `other` into this record.
    ///
    /// The version is bumped only when something actually changed, so assigning
    /// identical content twice leaves the record untouched.
    pub fn assign_from(&mut self, other: &Record) -> FieldMask {
        let mask = self.changed_fields(other);
        if !mask.is_empty() {
            self.sort_key = other.sort_key;
            self.attributes = other.attributes.clone();
            self.increment_version();
        }
        mask
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.sort_key == other.sort_key && self.attributes == other.attributes
    }
}

impl Eq for Record {}
