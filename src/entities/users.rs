use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub login: String,

    /// Argon2id password hash (PHC string)
    pub password_hash: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    #[sea_orm(unique)]
    pub email: String,

    pub activated: bool,

    pub lang_key: String,

    /// Present only while the account is not activated.
    pub activation_key: Option<String>,

    /// Set together with `reset_date`.
    pub reset_key: Option<String>,

    pub reset_date: Option<DateTimeUtc>,

    pub created_date: DateTimeUtc,

    pub last_modified_date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_authorities::Entity")]
    UserAuthorities,
}

impl Related<super::user_authorities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserAuthorities.def()
    }
}

impl Related<super::authorities::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_authorities::Relation::Authorities.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_authorities::Relation::Users.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
