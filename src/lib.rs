pub mod assistant;
pub mod carousel;
pub mod catalog;
pub mod chat;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod error;
pub mod session;
pub mod view;
pub mod web_server;

pub use assistant::{Assistant, FallbackResponder, Reply, ReplyOrigin};
pub use carousel::{Carousel, Direction, NavKey};
pub use catalog::{Catalog, PortfolioItem};
pub use completion::{CompletionBackend, CompletionRequest, ContextEntry, HostedCompletion, Role};
pub use config::Settings;
pub use conversation::{ChatSession, PendingReply, TranscriptEntry};
pub use error::{CatalogError, CompletionError, SessionError};
pub use session::{ClientEvent, ServerEvent, Session, SessionSnapshot};
pub use view::ViewModel;
