pub mod auth;
pub mod categories;
pub mod expenses;
pub mod ledger;
pub mod password;
pub mod tokens;
pub mod users;
