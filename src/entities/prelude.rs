pub use super::authorities::Entity as Authorities;
pub use super::authors::Entity as Authors;
pub use super::books::Entity as Books;
pub use super::user_authorities::Entity as UserAuthorities;
pub use super::users::Entity as Users;
