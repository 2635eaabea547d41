pub mod commands;
pub mod context;
pub mod flows;
pub mod handlers;
pub mod reply;
pub mod router;
pub mod session;
pub mod state;

pub type HandlerResult = anyhow::Result<()>;

pub use commands::Command;
pub use context::AppContext;
pub use context::BotSettings;
pub use handlers::build_schema;
pub use session::SessionStore;
