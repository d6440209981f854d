use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Session,
    password::{hash_in_background, validate_password, verify_in_background},
    users,
    util::parse_uuid,
};

use super::{Engine, with_tx};

fn normalize_email(email: &str) -> ResultEngine<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(EngineError::InvalidName("email must not be empty".to_string()));
    }
    Ok(email)
}

fn wrong_credentials() -> EngineError {
    EngineError::InvalidCredentials("wrong email or password".to_string())
}

impl Engine {
    /// Create a user with email/password credentials.
    pub async fn register_user(&self, email: &str, password: &str) -> ResultEngine<Session> {
        let email = normalize_email(email)?;
        validate_password(password)?;
        let password_hash = hash_in_background(password.to_string()).await?;

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                Err(EngineError::ExistingKey(email.clone()))
            } else {
                let user_id = Uuid::new_v4();
                users::ActiveModel {
                    id: ActiveValue::Set(user_id.to_string()),
                    email: ActiveValue::Set(email.clone()),
                    password_hash: ActiveValue::Set(password_hash),
                }
                .insert(&db_tx)
                .await?;
                tracing::info!(%user_id, "user registered");
                Ok(Session {
                    user_id,
                    email: email.clone(),
                })
            }
        })
    }

    /// Check credentials and return the matching session.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<Session> {
        let email = normalize_email(email)?;
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(wrong_credentials)?;

        if !verify_in_background(password.to_string(), user.password_hash).await? {
            return Err(wrong_credentials());
        }
        Ok(Session {
            user_id: parse_uuid(&user.id, "user")?,
            email: user.email,
        })
    }

    /// `Ok(true)` if `user_id` still exists.
    pub async fn user_exists(&self, user_id: Uuid) -> ResultEngine<bool> {
        Ok(users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .is_some())
    }

    /// Replace the password of an already re-authenticated session.
    pub async fn set_password(&self, session: &Session, new_password: &str) -> ResultEngine<()> {
        validate_password(new_password)?;
        let password_hash = hash_in_background(new_password.to_string()).await?;

        let result = users::Entity::update_many()
            .col_expr(
                users::Column::PasswordHash,
                sea_orm::sea_query::Expr::value(password_hash),
            )
            .filter(users::Column::Id.eq(session.user_id.to_string()))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        tracing::info!(user_id = %session.user_id, "password updated");
        Ok(())
    }
}
