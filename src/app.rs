use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::dptree;
use teloxide::prelude::*;

use crate::bot;
use crate::bot::AppContext;

pub struct App {
  bot: Bot,
  context: Arc<AppContext>,
  handler: UpdateHandler<anyhow::Error>,
}

impl App {
  pub fn new(bot: Bot, context: AppContext) -> Self {
    let handler = bot::build_schema();
    Self {
      bot,
      context: Arc::new(context),
      handler,
    }
  }

  pub async fn run(self) -> anyhow::Result<()> {
    let me = self.bot.get_me().await?;
    tracing::info!(bot = %me.username(), "dispatcher starting");

    Dispatcher::builder(self.bot.clone(), self.handler)
      .dependencies(dptree::deps![self.context.clone(), me])
      .enable_ctrlc_handler()
      .build()
      .dispatch()
      .await;

    Ok(())
  }
}
