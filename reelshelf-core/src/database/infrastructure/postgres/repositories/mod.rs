pub mod imports;
pub mod lists;
mod rows;
pub mod shares;
pub mod stats;
pub mod users;
