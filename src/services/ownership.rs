//! Owner-scoped access policy.
//!
//! An owner-scoped mutation is the identifier filter AND the principal's
//! email filter. A non-owner's request therefore matches nothing and is
//! reported exactly like a missing document.

use crate::{
    models::principal::Principal,
    services::store::{Filter, OwnedField},
};
use uuid::Uuid;

#[derive(Clone, Copy, Debug)]
pub struct OwnerScope<'a> {
    principal: &'a Principal,
}

impl<'a> OwnerScope<'a> {
    pub fn new(principal: &'a Principal) -> Self {
        Self { principal }
    }

    /// Filter matching document `id` only if the principal owns it.
    pub fn one<F: OwnedField>(&self, id: Uuid) -> Filter<F> {
        Filter::all()
            .eq(F::ID, id)
            .eq(F::OWNER, self.principal.email.as_str())
    }

    /// Filter matching every document the principal owns.
    pub fn all<F: OwnedField>(&self) -> Filter<F> {
        Filter::all().eq(F::OWNER, self.principal.email.as_str())
    }
}
