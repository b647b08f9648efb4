pub mod links;
pub mod rank;
pub mod search;
