pub mod clash;
pub mod pick;
pub mod selection;
pub mod state;
