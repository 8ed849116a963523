pub mod db;

pub use db::{DbError, SelectorError};
