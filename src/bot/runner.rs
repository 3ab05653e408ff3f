use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::backend::ResourceApi;
use super::conversation::Conversation;
use super::platform::{ChatPlatform, PlatformError};
use super::telegram::Update;

/// Pause before polling again after a failed `getUpdates`.
const POLL_BACKOFF: Duration = Duration::from_secs(5);

/// Where updates come from, usually Telegram long polling.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, PlatformError>;
}

/// Receives updates until Ctrl-C and feeds them to `conversation` one at a
/// time, in delivery order.
pub async fn run_polling<S, P, A>(source: S, conversation: Conversation<P, A>)
where
    S: UpdateSource,
    P: ChatPlatform,
    A: ResourceApi,
{
    run_until(source, conversation, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Polls until `shutdown` resolves. Shutdown is honoured while waiting for
/// updates, while backing off after a failure, and while handling an update.
pub async fn run_until<S, P, A, F>(source: S, mut conversation: Conversation<P, A>, shutdown: F)
where
    S: UpdateSource,
    P: ChatPlatform,
    A: ResourceApi,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut offset: i64 = 0;
    info!("polling for updates");

    loop {
        let updates = tokio::select! {
            _ = &mut shutdown => break,
            updates = source.get_updates(offset) => updates,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(err) => {
                warn!(error = %err, "polling for updates failed");
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(POLL_BACKOFF) => continue,
                }
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some((chat_id, event)) = update.into_event() else {
                continue;
            };
            let handled = tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down");
                    return;
                }
                handled = conversation.handle(chat_id, event) => handled,
            };
            if let Err(err) = handled {
                warn!(chat_id, error = %err, "failed to reply");
            }
        }
    }

    info!("shutting down");
}
