pub mod aggregate;
pub mod controller;
pub mod filter;
pub mod moderation;
pub mod normalize;
pub mod pipeline;
pub mod play_link;
pub mod providers;
pub mod rank;
pub mod session;

pub use controller::SearchController;
pub use moderation::Blocklist;
pub use providers::{HttpSearchProvider, SearchProvider};
pub use session::{QueryOrigin, SearchPhase, SearchView};
