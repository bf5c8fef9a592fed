//! Read-only point aggregation.
//!
//! Totals are derived from committed records only. School totals sum the
//! per-user totals of the school's members as listed by a
//! [`SchoolDirectory`].

use crate::error::LedgerError;
use crate::filter::{AllRecords, UserFilter};
use crate::page::{paginate, RecordPage};
use crate::traits::LedgerReader;
use qrmark_canonical::{Points, SchoolId, UserId};
use std::collections::HashMap;

/// Source of user-to-school membership.
pub trait SchoolDirectory: Send + Sync {
    /// School the user belongs to, if any.
    fn school_of(&self, user: UserId) -> Option<SchoolId>;

    /// Members of `school`. Unknown schools have no members.
    fn members(&self, school: SchoolId) -> Vec<UserId>;
}

/// Fixed membership table, typically loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticSchoolDirectory {
    by_user: HashMap<UserId, SchoolId>,
}

impl StaticSchoolDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `user` to `school`, returning the previous school if the
    /// user moved.
    pub fn assign(&mut self, user: UserId, school: SchoolId) -> Option<SchoolId> {
        self.by_user.insert(user, school)
    }

    /// Number of users with a school.
    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    /// Whether no user has a school.
    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

impl FromIterator<(SchoolId, Vec<UserId>)> for StaticSchoolDirectory {
    fn from_iter<I: IntoIterator<Item = (SchoolId, Vec<UserId>)>>(iter: I) -> Self {
        let mut directory = Self::new();
        for (school, members) in iter {
            for user in members {
                directory.assign(user, school);
            }
        }
        directory
    }
}

impl SchoolDirectory for StaticSchoolDirectory {
    fn school_of(&self, user: UserId) -> Option<SchoolId> {
        self.by_user.get(&user).copied()
    }

    fn members(&self, school: SchoolId) -> Vec<UserId> {
        let mut members: Vec<UserId> = self
            .by_user
            .iter()
            .filter(|(_, s)| **s == school)
            .map(|(user, _)| *user)
            .collect();
        members.sort();
        members
    }
}

/// Read-only queries over a ledger.
pub struct AggregationQuery<'a> {
    reader: &'a dyn LedgerReader,
    directory: &'a dyn SchoolDirectory,
}

impl<'a> AggregationQuery<'a> {
    /// Creates a query view over `reader` with school membership from `directory`.
    pub fn new(reader: &'a dyn LedgerReader, directory: &'a dyn SchoolDirectory) -> Self {
        Self { reader, directory }
    }

    /// Sum of points over the user's committed redemptions.
    pub fn total_points_for_user(&self, user: UserId) -> Result<Points, LedgerError> {
        self.reader.user_total(user)
    }

    /// Sum of points over all members of `school`. Zero for an unknown school.
    pub fn total_points_for_school(&self, school: SchoolId) -> Result<Points, LedgerError> {
        let members = self.directory.members(school);
        if members.is_empty() {
            return Ok(Points::ZERO);
        }
        self.reader.users_total(&members)
    }

    /// Newest-first page of records, optionally restricted to one user.
    pub fn list(
        &self,
        user: Option<UserId>,
        page: u32,
        page_size: usize,
    ) -> Result<RecordPage, LedgerError> {
        if page == 0 || page_size == 0 {
            return Err(LedgerError::InvalidPage { page, page_size });
        }
        let records = match user {
            Some(user_id) => self.reader.scan(&UserFilter { user_id })?,
            None => self.reader.scan(&AllRecords)?,
        };
        paginate(records, page, page_size)
    }
}
