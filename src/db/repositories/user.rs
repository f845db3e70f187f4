use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::{BTreeSet, HashMap};

use crate::entities::{prelude::*, user_authorities, users};
use crate::models::user::User;

/// Row data for a user that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewUserRow {
    pub login: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub lang_key: String,
    pub activation_key: Option<String>,
    pub authorities: BTreeSet<String>,
}

/// User store. Works on a pooled connection or inside a transaction.
///
/// Every `User` returned here carries its complete authority set.
pub struct UserRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    async fn with_authorities(&self, model: users::Model) -> Result<User, DbErr> {
        let roles = model
            .find_related(Authorities)
            .all(self.conn)
            .await?
            .into_iter()
            .map(|a| a.name)
            .collect();

        Ok(User::from_model(model, roles))
    }

    async fn with_authorities_batch(&self, models: Vec<users::Model>) -> Result<Vec<User>, DbErr> {
        if models.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let links = UserAuthorities::find()
            .filter(user_authorities::Column::UserId.is_in(ids))
            .all(self.conn)
            .await?;

        let mut by_user: HashMap<i32, BTreeSet<String>> = HashMap::new();
        for link in links {
            by_user
                .entry(link.user_id)
                .or_default()
                .insert(link.authority_name);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let roles = by_user.remove(&m.id).unwrap_or_default();
                User::from_model(m, roles)
            })
            .collect())
    }

    async fn find_one_by(
        &self,
        filter: impl sea_orm::sea_query::IntoCondition,
    ) -> Result<Option<User>, DbErr> {
        let model = Users::find().filter(filter).one(self.conn).await?;

        match model {
            Some(model) => Ok(Some(self.with_authorities(model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, DbErr> {
        self.find_one_by(users::Column::Id.eq(id)).await
    }

    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>, DbErr> {
        self.find_one_by(users::Column::Login.eq(login)).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbErr> {
        self.find_one_by(users::Column::Email.eq(email)).await
    }

    pub async fn find_by_activation_key(&self, key: &str) -> Result<Option<User>, DbErr> {
        self.find_one_by(users::Column::ActivationKey.eq(key)).await
    }

    pub async fn find_by_reset_key(&self, key: &str) -> Result<Option<User>, DbErr> {
        self.find_one_by(users::Column::ResetKey.eq(key)).await
    }

    pub async fn find_all_unactivated_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<User>, DbErr> {
        let models = Users::find()
            .filter(users::Column::Activated.eq(false))
            .filter(users::Column::CreatedDate.lt(cutoff))
            .order_by_asc(users::Column::Id)
            .all(self.conn)
            .await?;

        self.with_authorities_batch(models).await
    }

    /// Insert a user and link its authorities. An unknown authority name fails
    /// with `DbErr::RecordNotFound`.
    pub async fn insert(&self, row: NewUserRow) -> Result<User, DbErr> {
        let now = Utc::now();

        let model = users::ActiveModel {
            login: Set(row.login),
            password_hash: Set(row.password_hash),
            first_name: Set(row.first_name),
            last_name: Set(row.last_name),
            email: Set(row.email),
            activated: Set(false),
            lang_key: Set(row.lang_key),
            activation_key: Set(row.activation_key),
            reset_key: Set(None),
            reset_date: Set(None),
            created_date: Set(now),
            last_modified_date: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        for name in &row.authorities {
            let exists = Authorities::find_by_id(name.clone()).one(self.conn).await?;
            if exists.is_none() {
                return Err(DbErr::RecordNotFound(format!("authority {name}")));
            }

            user_authorities::ActiveModel {
                user_id: Set(model.id),
                authority_name: Set(name.clone()),
            }
            .insert(self.conn)
            .await?;
        }

        Ok(User::from_model(model, row.authorities))
    }

    /// Persist every mutable column of `user`. Authorities and `created_date`
    /// are left untouched.
    pub async fn save(&self, user: &User) -> Result<User, DbErr> {
        let model = users::ActiveModel {
            id: Set(user.id),
            login: Set(user.login.clone()),
            password_hash: Set(user.password_hash.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            email: Set(user.email.clone()),
            activated: Set(user.activated),
            lang_key: Set(user.lang_key.clone()),
            activation_key: Set(user.activation_key.clone()),
            reset_key: Set(user.reset_key.clone()),
            reset_date: Set(user.reset_date),
            last_modified_date: Set(Utc::now()),
            ..Default::default()
        }
        .update(self.conn)
        .await?;

        Ok(User::from_model(model, user.authorities.clone()))
    }

    pub async fn delete(&self, user: &User) -> Result<bool, DbErr> {
        UserAuthorities::delete_many()
            .filter(user_authorities::Column::UserId.eq(user.id))
            .exec(self.conn)
            .await?;

        let result = Users::delete_by_id(user.id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
