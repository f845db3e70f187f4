use crate::constants::roles;
use crate::entities::{authorities, prelude::*, user_authorities, users};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Built-in accounts: (id, login, password, email, roles)
const SEED_ACCOUNTS: &[(i32, &str, &str, &str, &[&str])] = &[
    (
        1,
        "admin",
        "admin",
        "admin@localhost",
        &[roles::ADMIN, roles::USER],
    ),
    (2, "user", "user", "user@localhost", &[roles::USER]),
];

fn hash_seed_password(password: &str) -> Result<String, DbErr> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbErr::Custom(format!("Failed to hash seed password: {e}")))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let insert_roles = Query::insert()
            .into_table(Authorities)
            .columns([authorities::Column::Name])
            .values_panic([roles::ADMIN.into()])
            .values_panic([roles::USER.into()])
            .to_owned();
        manager.exec_stmt(insert_roles).await?;

        let now = chrono::Utc::now();

        for (id, login, password, email, account_roles) in SEED_ACCOUNTS {
            let password_hash = hash_seed_password(password)?;

            let insert_user = Query::insert()
                .into_table(Users)
                .columns([
                    users::Column::Id,
                    users::Column::Login,
                    users::Column::PasswordHash,
                    users::Column::Email,
                    users::Column::Activated,
                    users::Column::LangKey,
                    users::Column::CreatedDate,
                    users::Column::LastModifiedDate,
                ])
                .values_panic([
                    (*id).into(),
                    (*login).into(),
                    password_hash.into(),
                    (*email).into(),
                    true.into(),
                    "en".into(),
                    now.into(),
                    now.into(),
                ])
                .to_owned();
            manager.exec_stmt(insert_user).await?;

            for role in *account_roles {
                let link = Query::insert()
                    .into_table(UserAuthorities)
                    .columns([
                        user_authorities::Column::UserId,
                        user_authorities::Column::AuthorityName,
                    ])
                    .values_panic([(*id).into(), (*role).into()])
                    .to_owned();
                manager.exec_stmt(link).await?;
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let ids: Vec<i32> = SEED_ACCOUNTS.iter().map(|(id, ..)| *id).collect();

        manager
            .exec_stmt(
                Query::delete()
                    .from_table(UserAuthorities)
                    .and_where(Expr::col(user_authorities::Column::UserId).is_in(ids.clone()))
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Users)
                    .and_where(Expr::col(users::Column::Id).is_in(ids))
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Authorities).to_owned())
            .await?;

        Ok(())
    }
}
