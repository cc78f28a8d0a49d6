//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Email, User, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let invalid = |err: crate::domain::UserValidationError| {
        UserRepositoryError::query(format!("stored user is invalid: {err}"))
    };
    let id = UserId::new(row.user_id).map_err(invalid)?;
    let email = row.email.map(Email::new).transpose().map_err(invalid)?;
    Ok(User::new(id, email))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn ensure(&self, user: &User) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            user_id: user.id().as_ref(),
            email: user.email().map(AsRef::as_ref),
        };
        let inserted = diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::user_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::user_id.eq(id.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("ada@example.com"), true)]
    #[case(None, false)]
    fn rows_convert_to_users(#[case] email: Option<&str>, #[case] has_email: bool) {
        let user = row_to_user(UserRow {
            user_id: "sub-1".to_owned(),
            email: email.map(str::to_owned),
            created_at: Utc::now(),
        })
        .expect("valid row");
        assert_eq!(user.id().as_ref(), "sub-1");
        assert_eq!(user.email().is_some(), has_email);
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }
}
