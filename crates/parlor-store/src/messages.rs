use chrono::Utc;
use uuid::Uuid;

use parlor_types::models::{Message, Recipient};

use crate::error::Result;
use crate::{Store, keys};

impl Store {
    pub fn create_message(
        &self,
        sender_id: Uuid,
        content: &str,
        recipient: Option<Recipient>,
    ) -> Result<Message> {
        let (receiver_id, group_id) = match recipient {
            Some(Recipient::Direct(id)) => (Some(id), None),
            Some(Recipient::Group(id)) => (None, Some(id)),
            None => (None, None),
        };

        let mut messages: Vec<Message> = self.load(keys::MESSAGES)?;
        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            group_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        messages.push(message.clone());
        self.write(keys::MESSAGES, &messages)?;
        Ok(message)
    }

    /// Messages visible to `user_id`, resolved in this order:
    /// 1. `group_id` given: every message of that group, from any sender.
    /// 2. `receiver_id` given: the conversation between the two accounts,
    ///    both directions.
    /// 3. neither: every message `user_id` sent or directly received.
    pub fn get_messages(
        &self,
        user_id: Uuid,
        receiver_id: Option<Uuid>,
        group_id: Option<Uuid>,
    ) -> Vec<Message> {
        let messages: Vec<Message> = self.read(keys::MESSAGES);

        if let Some(group_id) = group_id {
            return messages
                .into_iter()
                .filter(|m| m.group_id == Some(group_id))
                .collect();
        }

        if let Some(receiver_id) = receiver_id {
            return messages
                .into_iter()
                .filter(|m| {
                    (m.sender_id == user_id && m.receiver_id == Some(receiver_id))
                        || (m.sender_id == receiver_id && m.receiver_id == Some(user_id))
                })
                .collect();
        }

        messages.into_iter().filter(|m| m.involves(user_id)).collect()
    }
}
