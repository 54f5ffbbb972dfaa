use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use parlor_types::models::Group;

use crate::error::Result;
use crate::{Store, keys};

impl Store {
    /// The owner is always the first member. Other members keep the order
    /// given; duplicates among them are the caller's responsibility.
    pub fn create_group(&self, name: &str, owner_id: Uuid, members: &[Uuid]) -> Result<Group> {
        let mut groups: Vec<Group> = self.load(keys::GROUPS)?;
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_id,
            members: with_owner_first(owner_id, members),
            created_at: Utc::now(),
        };

        groups.push(group.clone());
        self.write(keys::GROUPS, &groups)?;

        info!(group_id = %group.id, %owner_id, members = group.members.len(), "Group created");
        Ok(group)
    }

    pub fn get_group(&self, id: Uuid) -> Option<Group> {
        self.list_groups().into_iter().find(|g| g.id == id)
    }

    /// Groups `user_id` belongs to.
    pub fn get_groups(&self, user_id: Uuid) -> Vec<Group> {
        self.list_groups()
            .into_iter()
            .filter(|g| g.is_member(user_id))
            .collect()
    }

    /// Replace the member list. Owner only; the owner stays first.
    pub fn update_members(&self, group_id: Uuid, acting_user: Uuid, members: &[Uuid]) -> Result<bool> {
        self.mutate_owned_group(group_id, acting_user, |group| {
            group.members = with_owner_first(group.owner_id, members);
            true
        })
    }

    /// Owner only. Adding someone already in the group succeeds without a write.
    pub fn add_member(&self, group_id: Uuid, acting_user: Uuid, member_id: Uuid) -> Result<bool> {
        let groups: Vec<Group> = self.load(keys::GROUPS)?;
        let Some(group) = groups.iter().find(|g| g.id == group_id) else {
            return Ok(false);
        };
        if group.owner_id == acting_user && group.is_member(member_id) {
            return Ok(true);
        }

        self.mutate_owned_group(group_id, acting_user, |group| {
            group.members.push(member_id);
            true
        })
    }

    /// Owner only. The owner cannot be removed, and removing a non-member
    /// fails; both leave the group untouched.
    pub fn remove_member(&self, group_id: Uuid, acting_user: Uuid, member_id: Uuid) -> Result<bool> {
        self.mutate_owned_group(group_id, acting_user, |group| {
            if member_id == group.owner_id || !group.is_member(member_id) {
                return false;
            }
            group.members.retain(|m| *m != member_id);
            true
        })
    }

    fn list_groups(&self) -> Vec<Group> {
        self.read(keys::GROUPS)
    }

    /// Apply `change` if `acting_user` owns the group. The collection is
    /// only written when `change` reports that it changed something.
    fn mutate_owned_group<F>(&self, group_id: Uuid, acting_user: Uuid, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Group) -> bool,
    {
        let mut groups: Vec<Group> = self.load(keys::GROUPS)?;
        let Some(group) = groups.iter_mut().find(|g| g.id == group_id) else {
            return Ok(false);
        };

        if group.owner_id != acting_user {
            warn!(%group_id, %acting_user, "Group change refused: not the owner");
            return Ok(false);
        }

        if !change(group) {
            return Ok(false);
        }

        self.write(keys::GROUPS, &groups)?;
        Ok(true)
    }
}

fn with_owner_first(owner_id: Uuid, members: &[Uuid]) -> Vec<Uuid> {
    std::iter::once(owner_id)
        .chain(members.iter().copied().filter(|m| *m != owner_id))
        .collect()
}
