pub mod prelude;

pub mod authorities;
pub mod authors;
pub mod books;
pub mod user_authorities;
pub mod users;
