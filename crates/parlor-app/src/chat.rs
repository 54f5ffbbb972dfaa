use uuid::Uuid;

use parlor_types::api::{CreateGroupRequest, SendMessageRequest};
use parlor_types::models::{Account, Group, Message};

use crate::{App, Notice, require_text};

const NOT_GROUP_OWNER: &str = "Only the group owner can change members";
const GROUP_NOT_FOUND: &str = "Group not found";
const OWNER_STAYS: &str = "The group owner cannot be removed";
const NOT_A_MEMBER: &str = "That person is not in the group";

impl App {
    pub fn send_message(&self, req: SendMessageRequest) -> Result<Message, Notice> {
        let user = self.require_user()?;
        require_text(&req.content, "Message cannot be empty")?;

        Ok(self.store.create_message(user.id, &req.content, req.recipient())?)
    }

    /// Messages for the open conversation; see `Store::get_messages` for
    /// how the two targets are resolved.
    pub fn conversation(
        &self,
        receiver_id: Option<Uuid>,
        group_id: Option<Uuid>,
    ) -> Result<Vec<Message>, Notice> {
        let user = self.require_user()?;
        Ok(self.store.get_messages(user.id, receiver_id, group_id))
    }

    /// Other accounts whose username contains `query`.
    pub fn find_people(&self, query: &str) -> Result<Vec<Account>, Notice> {
        let user = self.require_user()?;
        Ok(self
            .store
            .search_accounts(query)
            .into_iter()
            .filter(|a| a.id != user.id)
            .collect())
    }

    pub fn create_group(&self, req: CreateGroupRequest) -> Result<Group, Notice> {
        let user = self.require_user()?;
        require_text(&req.name, "Group name cannot be empty")?;
        if !req.members.iter().any(|m| *m != user.id) {
            return Err(Notice::Invalid("Pick at least one member"));
        }

        Ok(self.store.create_group(req.name.trim(), user.id, &req.members)?)
    }

    pub fn my_groups(&self) -> Result<Vec<Group>, Notice> {
        let user = self.require_user()?;
        Ok(self.store.get_groups(user.id))
    }

    pub fn add_group_member(&self, group_id: Uuid, member_id: Uuid) -> Result<(), Notice> {
        let user = self.require_user()?;
        if self.store.add_member(group_id, user.id, member_id)? {
            Ok(())
        } else {
            Err(Notice::Rejected(NOT_GROUP_OWNER))
        }
    }

    pub fn remove_group_member(&self, group_id: Uuid, member_id: Uuid) -> Result<(), Notice> {
        let user = self.require_user()?;
        if self.store.remove_member(group_id, user.id, member_id)? {
            return Ok(());
        }

        // work out which rule refused the change
        let reason = match self.store.get_group(group_id) {
            None => GROUP_NOT_FOUND,
            Some(group) if group.owner_id != user.id => NOT_GROUP_OWNER,
            Some(group) if group.owner_id == member_id => OWNER_STAYS,
            Some(_) => NOT_A_MEMBER,
        };
        Err(Notice::Rejected(reason))
    }

    pub fn set_group_members(&self, group_id: Uuid, members: &[Uuid]) -> Result<(), Notice> {
        let user = self.require_user()?;
        if self.store.update_members(group_id, user.id, members)? {
            Ok(())
        } else {
            Err(Notice::Rejected(NOT_GROUP_OWNER))
        }
    }
}
