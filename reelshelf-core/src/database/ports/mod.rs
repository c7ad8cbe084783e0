pub mod imports;
pub mod lists;
pub mod shares;
pub mod stats;
pub mod users;
