//! Blog page: paginated post listing with infinite scroll.

pub mod adapter;
pub mod controller;
pub mod cursor;
pub mod error;
pub mod source;
pub mod token;
pub mod view;
pub mod watcher;

pub use adapter::{PostCard, cards_from, post_to_card};
pub use controller::{BlogController, LoadOutcome, Messages, Phase, load};
pub use cursor::Cursor;
pub use error::FetchError;
pub use source::{PostsPage, PostsSource, parse_total};
pub use token::{CancelSignal, LoadMode, RequestSlot, Ticket};
pub use view::{ResultsModel, ResultsView, Status};
pub use watcher::{MemoryWatcher, ViewportWatcher};
