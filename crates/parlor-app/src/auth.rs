use tracing::info;

use parlor_types::api::{SignInRequest, SignUpRequest};
use parlor_types::models::Account;

use crate::{App, Notice};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;

impl App {
    /// Register and sign in.
    pub async fn sign_up(&self, req: SignUpRequest) -> Result<Account, Notice> {
        let username_len = req.username.chars().count();
        if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
            return Err(Notice::Invalid("Username must be 3 to 32 characters"));
        }
        if !req.email.contains('@') {
            return Err(Notice::Invalid("Enter a valid email address"));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Notice::Invalid("Password must be at least 6 characters"));
        }

        let account = self
            .store
            .create_account(&req.username, &req.email, &req.password)
            .await?
            .ok_or(Notice::Rejected("Username or email already exists"))?;

        self.session.persist(&account)?;
        Ok(account)
    }

    pub async fn sign_in(&self, req: SignInRequest) -> Result<Account, Notice> {
        let account = self
            .store
            .validate_account(&req.email, &req.password)
            .await?
            .ok_or(Notice::Rejected("Invalid email or password"))?;

        self.session.persist(&account)?;
        info!(user_id = %account.id, "Signed in");
        Ok(account)
    }

    pub fn sign_out(&self) -> Result<(), Notice> {
        self.session.clear()?;
        Ok(())
    }
}
