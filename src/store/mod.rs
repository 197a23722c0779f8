//! Storage components. Nothing in here checks who is asking; room-scoped
//! access goes through [`crate::gateway::Gateway`].

pub mod codes;
pub(crate) mod members;
pub(crate) mod messages;
pub(crate) mod rooms;
pub(crate) mod users;
