//! Fixed directory of alert recipients

use std::collections::HashSet;

use crate::error::{GlofError, GlofResult};
use crate::models::{Contact, UserType};

/// Recipients known to the system, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    contacts: Vec<Contact>,
}

impl ContactDirectory {
    /// Build the directory, rejecting duplicate ids and contacts that can
    /// not be reached on any channel.
    pub fn new(contacts: Vec<Contact>) -> GlofResult<Self> {
        let mut seen = HashSet::new();
        for contact in &contacts {
            if !seen.insert(contact.id.as_str()) {
                return Err(GlofError::DuplicateContact(contact.id.clone()));
            }
            if !contact.has_phone() && !contact.has_email() {
                return Err(GlofError::UnreachableContact(contact.id.clone()));
            }
        }
        Ok(Self { contacts })
    }

    /// Active contacts covering `lake` whose role is in `user_types`.
    /// An empty `user_types` slice matches every role.
    pub fn for_lake(&self, lake: &str, user_types: &[UserType]) -> Vec<Contact> {
        self.contacts
            .iter()
            .filter(|c| c.active)
            .filter(|c| c.covers(lake))
            .filter(|c| user_types.is_empty() || user_types.contains(&c.user_type))
            .cloned()
            .collect()
    }

    pub fn all_active(&self) -> Vec<Contact> {
        self.contacts.iter().filter(|c| c.active).cloned().collect()
    }

    /// Lookup by id, including inactive contacts
    pub fn by_id(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
