// Integration with the local League client.

pub mod client;
pub mod favourites;
pub mod sync;
pub mod types;
