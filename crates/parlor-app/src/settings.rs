use parlor_types::api::UpdateProfileRequest;
use parlor_types::models::Account;

use crate::{App, Notice};

impl App {
    /// Store a new profile image URL for the signed-in account.
    ///
    /// The in-memory session picks up the change; the persisted session
    /// snapshot keeps its original expiry and is not rewritten.
    pub fn update_profile_image(&self, req: UpdateProfileRequest) -> Result<Account, Notice> {
        let user = self.require_user()?;

        let updated = self
            .store
            .update_profile_image(user.id, req.profile_image.trim())?
            .ok_or(Notice::Rejected("Account no longer exists"))?;

        self.session.set_user(Some(updated.clone()));
        Ok(updated)
    }
}
