//! Intrusive one-to-many relation lists embedded in component columns.
//!
//! The owner carries a [`RelationList`] component (head/tail) and every
//! member carries a [`RelationLink`] component (prev/next). No separate
//! container exists; append and remove are O(1) writes to at most three
//! entities. Zero-initialized rows read back as empty lists and unlinked
//! members, because [`Handle::NONE`] is the all-zero bit pattern.
//!
//! List invariants: `head` is none iff `tail` is none; walking `head`
//! through `next` reaches `tail` and only `tail` has `next == NONE`;
//! symmetrically for `prev`.

use bytemuck::{Pod, Zeroable};

use drawbench_foundation::{ComponentKind, Error, ErrorKind, Handle, Result};

use crate::store::Store;

/// Owner-side endpoints of one relation list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RelationList {
    /// First member, or [`Handle::NONE`] when the list is empty.
    pub head: Handle,
    /// Last member, or [`Handle::NONE`] when the list is empty.
    pub tail: Handle,
}

impl RelationList {
    /// Column element size for schema registration.
    pub const SIZE: usize = size_of::<Self>();

    /// Returns true if the list has no members.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.head.is_none()
    }
}

/// Member-side links of one relation list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RelationLink {
    /// Previous member, or [`Handle::NONE`] at the head.
    pub prev: Handle,
    /// Next member, or [`Handle::NONE`] at the tail.
    pub next: Handle,
}

impl RelationLink {
    /// Column element size for schema registration.
    pub const SIZE: usize = size_of::<Self>();

    /// Returns true if this member carries no link pointers.
    ///
    /// Note that the sole member of a list also has no pointers; linkage
    /// is decided against the owner's list, not against this alone.
    #[must_use]
    pub const fn is_detached(self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }
}

impl Store {
    /// Appends `member` to the tail of `owner`'s relation list.
    ///
    /// `list` is the owner's [`RelationList`] component and `link` the
    /// member's [`RelationLink`] component. O(1).
    ///
    /// # Errors
    ///
    /// Returns an error if either handle is not live, either component is
    /// not declared, or the member already carries link state in `link`.
    pub fn relation_append(
        &mut self,
        owner: Handle,
        member: Handle,
        list: ComponentKind,
        link: ComponentKind,
    ) -> Result<()> {
        let mut endpoints: RelationList = self.get(owner, list)?;
        let member_link: RelationLink = self.get(member, link)?;

        if !member_link.is_detached() || endpoints.head == member {
            return Err(Error::new(ErrorKind::AlreadyLinked { member }));
        }

        if endpoints.is_empty() {
            endpoints.head = member;
            endpoints.tail = member;
            self.set(member, link, RelationLink::default())?;
        } else {
            let old_tail = endpoints.tail;
            let mut tail_link: RelationLink = self.get(old_tail, link)?;
            tail_link.next = member;
            self.set(old_tail, link, tail_link)?;
            self.set(
                member,
                link,
                RelationLink {
                    prev: old_tail,
                    next: Handle::NONE,
                },
            )?;
            endpoints.tail = member;
        }

        self.set(owner, list, endpoints)
    }

    /// Unlinks `member` from `owner`'s relation list.
    ///
    /// O(1): patches the member's neighbours and the owner's endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if either handle is not live, either component is
    /// not declared, or the member is not linked under this owner.
    pub fn relation_remove(
        &mut self,
        owner: Handle,
        member: Handle,
        list: ComponentKind,
        link: ComponentKind,
    ) -> Result<()> {
        let mut endpoints: RelationList = self.get(owner, list)?;
        let member_link: RelationLink = self.get(member, link)?;

        // A member with no prev pointer must be the head; a member with no
        // next pointer must be the tail. Anything else means it belongs to
        // a different owner (or to nothing at all).
        if member_link.prev.is_none() && endpoints.head != member {
            return Err(Error::new(ErrorKind::NotLinked { owner, member }));
        }
        if member_link.next.is_none() && endpoints.tail != member {
            return Err(Error::new(ErrorKind::NotLinked { owner, member }));
        }

        if member_link.prev.is_some() {
            let mut prev_link: RelationLink = self.get(member_link.prev, link)?;
            prev_link.next = member_link.next;
            self.set(member_link.prev, link, prev_link)?;
        } else {
            endpoints.head = member_link.next;
        }

        if member_link.next.is_some() {
            let mut next_link: RelationLink = self.get(member_link.next, link)?;
            next_link.prev = member_link.prev;
            self.set(member_link.next, link, next_link)?;
        } else {
            endpoints.tail = member_link.prev;
        }

        self.set(member, link, RelationLink::default())?;
        self.set(owner, list, endpoints)
    }

    /// Walks `owner`'s relation list head to tail.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner is not live or `list` is not
    /// declared for its kind.
    pub fn relation_iter(
        &self,
        owner: Handle,
        list: ComponentKind,
        link: ComponentKind,
    ) -> Result<RelationIter<'_>> {
        let endpoints: RelationList = self.get(owner, list)?;
        Ok(RelationIter {
            store: self,
            current: endpoints.head,
            link,
            forward: true,
        })
    }

    /// Walks `owner`'s relation list tail to head.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner is not live or `list` is not
    /// declared for its kind.
    pub fn relation_iter_rev(
        &self,
        owner: Handle,
        list: ComponentKind,
        link: ComponentKind,
    ) -> Result<RelationIter<'_>> {
        let endpoints: RelationList = self.get(owner, list)?;
        Ok(RelationIter {
            store: self,
            current: endpoints.tail,
            link,
            forward: false,
        })
    }
}

/// Lazy walk over one relation list.
pub struct RelationIter<'a> {
    store: &'a Store,
    current: Handle,
    link: ComponentKind,
    forward: bool,
}

impl Iterator for RelationIter<'_> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        if self.current.is_none() {
            return None;
        }
        let item = self.current;
        self.current = self
            .store
            .get::<RelationLink>(item, self.link)
            .map_or(Handle::NONE, |l| if self.forward { l.next } else { l.prev });
        Some(item)
    }
}
