//! Client-side session state: auth tokens and the engagement flags of the
//! signed-in user. Owned by the host per session, never global.

mod engagement;
mod session;

pub use engagement::{EngagementKey, EngagementStore, Optimistic};
pub use session::{AuthSession, ClientSession, TokenPair};
