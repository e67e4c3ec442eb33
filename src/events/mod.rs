//! Message classification pipeline.
//!
//! Every update funnels into [`Pipeline::process`], which serializes
//! messages per (chat, user) and walks the stages in a fixed order:
//! membership greetings, cooldown, commands, moderation (spam rate,
//! bad words, links), keyword auto-replies and finally the media
//! fallback. The first stage that claims a message wins.

pub mod cooldown;
pub mod filter;
pub mod queue;
pub mod serializer;
pub mod spam;
pub mod support;
pub mod welcome;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Local;
use teloxide::types::{ChatId, MessageId};
use tracing::{debug, error, warn};

use crate::config::Thresholds;
use crate::permissions::Permissions;
use crate::plugins::{self, CommandContext, Parsed};
use crate::tables::{BadWordSet, ReplyTable};
use crate::telegram::{ChatActions, IncomingMessage, Sender};
use crate::utils::{apply_reply_fillings, format_duration, html_escape};

pub use cooldown::CooldownGate;
pub use filter::ContentFilter;
pub use queue::SentLog;
pub use serializer::KeySerializer;
pub use spam::{Decision, SpamDetector};
pub use welcome::{Greeter, Greeting};

use support::{Clock, Delay, RandomSelector, ReplySelector, SystemClock, TokioDelay};

/// Sweep the bookkeeping maps every this many processed messages.
const SWEEP_INTERVAL: u64 = 256;

/// Why a message was dropped without any visible effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSender,
    BotSender,
    Blocked,
    Cooldown,
    ForeignCommand,
}

/// Which filter removed a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    BadWord,
    Link,
}

/// What the pipeline did with one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Membership,
    Command,
    Muted,
    Deleted(DeleteReason),
    Replied,
    MediaAck,
    Unhandled,
}

/// Swappable time and randomness sources.
pub struct PipelineSeams {
    pub clock: Arc<dyn Clock>,
    pub delay: Arc<dyn Delay>,
    pub selector: Arc<dyn ReplySelector>,
}

impl Default for PipelineSeams {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            delay: Arc::new(TokioDelay),
            selector: Arc::new(RandomSelector),
        }
    }
}

pub struct Pipeline {
    actions: Arc<dyn ChatActions>,
    permissions: Permissions,
    commands: CommandContext,
    clock: Arc<dyn Clock>,
    delay: Arc<dyn Delay>,
    selector: Arc<dyn ReplySelector>,
    cooldown: CooldownGate,
    spam: SpamDetector,
    filter: ContentFilter,
    replies: ReplyTable,
    greeter: Greeter,
    sent: SentLog,
    serializer: KeySerializer,
    blocked: HashSet<u64>,
    bot_username: Option<String>,
    mute_duration: Duration,
    processed: AtomicU64,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        actions: Arc<dyn ChatActions>,
        permissions: Permissions,
        commands: CommandContext,
        replies: ReplyTable,
        bad_words: BadWordSet,
        greeter: Greeter,
        thresholds: &Thresholds,
        blocked: HashSet<u64>,
        bot_username: Option<String>,
        seams: PipelineSeams,
    ) -> Self {
        Self {
            actions,
            permissions,
            commands,
            clock: seams.clock,
            delay: seams.delay,
            selector: seams.selector,
            cooldown: CooldownGate::new(thresholds.cooldown),
            spam: SpamDetector::new(thresholds),
            filter: ContentFilter::new(bad_words),
            replies,
            greeter,
            sent: SentLog::new(thresholds.history_capacity),
            serializer: KeySerializer::new(),
            blocked,
            bot_username,
            mute_duration: thresholds.mute_duration,
            processed: AtomicU64::new(0),
        }
    }

    /// Classify one message and perform its side effects.
    ///
    /// Messages from the same sender in the same chat are processed in
    /// arrival order; everything else runs concurrently.
    pub async fn process(&self, msg: &IncomingMessage) -> anyhow::Result<Outcome> {
        // The bot's own join arrives as a service message whose sender
        // is often another bot; it must survive the guards below.
        if self.greeter.is_self_join(msg) {
            return self.handle_membership(msg).await;
        }

        if let Some(sender) = &msg.sender {
            if sender.is_bot {
                return Ok(Outcome::Skipped(SkipReason::BotSender));
            }
            if self.blocked.contains(&sender.id.0) {
                debug!("ignoring blocked user {}", sender.id);
                return Ok(Outcome::Skipped(SkipReason::Blocked));
            }
        }

        // Service messages carry no content to moderate.
        if !msg.joined.is_empty() || msg.left.is_some() {
            return self.handle_membership(msg).await;
        }

        let Some(sender) = msg.sender.clone() else {
            return Ok(Outcome::Skipped(SkipReason::NoSender));
        };

        let _guard = self.serializer.acquire(msg.chat_id, sender.id).await;
        let outcome = self.handle(msg, &sender).await;
        self.maybe_sweep();
        outcome
    }

    async fn handle(&self, msg: &IncomingMessage, sender: &Sender) -> anyhow::Result<Outcome> {
        let now = self.clock.now();

        if !self.cooldown.check(msg.chat_id, sender.id, now) {
            return Ok(Outcome::Skipped(SkipReason::Cooldown));
        }

        if let Some(text) = msg.text.as_deref() {
            match plugins::parse(text, self.bot_username.as_deref()) {
                Some(Parsed::Foreign) => {
                    return Ok(Outcome::Skipped(SkipReason::ForeignCommand));
                }
                Some(Parsed::Unknown(name)) => {
                    let hint = plugins::unknown_command(name);
                    self.send_tracked(msg.chat_id, &hint, Some(msg.id)).await?;
                    return Ok(Outcome::Command);
                }
                Some(Parsed::Known(cmd, args)) => {
                    debug!("command {cmd:?} from {} in {}", sender.id, msg.chat_id);
                    self.commands.stats.commands.fetch_add(1, Ordering::Relaxed);
                    let sent = plugins::handle(&self.commands, msg, sender, cmd, args).await?;
                    for id in sent {
                        self.track(msg.chat_id, id).await;
                    }
                    return Ok(Outcome::Command);
                }
                None => {}
            }
        }

        if msg.is_group {
            if let Decision::Spam = self.spam.record(sender.id, msg.chat_id, now) {
                self.punish_spammer(msg, sender).await;
                return Ok(Outcome::Muted);
            }

            if let Some(text) = msg.text.as_deref() {
                if let Some(word) = self.filter.find_bad_word(text) {
                    debug!("removing message from {}: bad word '{word}'", sender.id);
                    self.remove_message(msg).await;
                    let warning = format!(
                        "⚠️ {}, please mind your language.",
                        html_escape(&sender.first_name)
                    );
                    if let Err(e) = self.send_tracked(msg.chat_id, &warning, None).await {
                        warn!("failed to send language warning in {}: {e}", msg.chat_id);
                    }
                    return Ok(Outcome::Deleted(DeleteReason::BadWord));
                }

                if self.filter.contains_url(text)
                    && !self.permissions.is_admin(msg.chat_id, sender.id).await
                {
                    debug!("removing link from {} in {}", sender.id, msg.chat_id);
                    self.remove_message(msg).await;
                    let notice = format!(
                        "🔗 {}, only admins may share links here.",
                        html_escape(&sender.first_name)
                    );
                    if let Err(e) = self.send_tracked(msg.chat_id, &notice, None).await {
                        warn!("failed to send link notice in {}: {e}", msg.chat_id);
                    }
                    return Ok(Outcome::Deleted(DeleteReason::Link));
                }
            }
        }

        if let Some(text) = msg.text.as_deref() {
            if let Some(pattern) = self.replies.find(text) {
                let responses = pattern.responses();
                let template = &responses[self.selector.pick(responses.len())];
                let reply = apply_reply_fillings(template, sender, Local::now());

                if let Err(e) = self.actions.typing(msg.chat_id).await {
                    debug!("typing indicator failed in {}: {e}", msg.chat_id);
                }
                self.delay.sleep(self.selector.typing_delay()).await;

                self.send_tracked(msg.chat_id, &reply, Some(msg.id)).await?;
                return Ok(Outcome::Replied);
            }
        }

        if let Some(media) = msg.media {
            if msg.text.is_none() {
                self.send_tracked(msg.chat_id, media.acknowledgment(), Some(msg.id))
                    .await?;
                return Ok(Outcome::MediaAck);
            }
        }

        Ok(Outcome::Unhandled)
    }

    async fn handle_membership(&self, msg: &IncomingMessage) -> anyhow::Result<Outcome> {
        for greeting in self.greeter.greetings(msg, &*self.selector) {
            let text = match greeting {
                Greeting::Introduction => {
                    let admins = match self.permissions.admins(msg.chat_id).await {
                        Ok(list) => list,
                        Err(e) => {
                            debug!("admin list unavailable for introduction: {e}");
                            Arc::new(Vec::new())
                        }
                    };
                    self.greeter.introduction(msg.title(), &admins)
                }
                Greeting::Text(text) => text,
            };

            if let Err(e) = self.send_tracked(msg.chat_id, &text, None).await {
                warn!("failed to send greeting in {}: {e}", msg.chat_id);
            }
        }
        Ok(Outcome::Membership)
    }

    /// Mute a flooding sender and announce it. The two side effects
    /// fail independently: a failed restrict still gets announced so
    /// admins can act by hand.
    async fn punish_spammer(&self, msg: &IncomingMessage, sender: &Sender) {
        warn!("muting {} in {} for flooding", sender.id, msg.chat_id);

        if let Err(e) = self
            .actions
            .restrict_member(msg.chat_id, sender.id, self.mute_duration)
            .await
        {
            error!("failed to mute {} in {}: {e}", sender.id, msg.chat_id);
        }

        let announcement = format!(
            "🚫 {} has been muted for {} for flooding.",
            html_escape(&sender.first_name),
            format_duration(self.mute_duration.as_secs()),
        );
        if let Err(e) = self.send_tracked(msg.chat_id, &announcement, Some(msg.id)).await {
            warn!("failed to announce mute in {}: {e}", msg.chat_id);
        }
    }

    async fn remove_message(&self, msg: &IncomingMessage) {
        if let Err(e) = self.actions.delete_message(msg.chat_id, msg.id).await {
            warn!(
                "failed to delete message {} in {}: {e}",
                msg.id.0, msg.chat_id
            );
        }
    }

    /// Send a message and record it in the per-chat history, deleting
    /// the oldest own message once the history overflows.
    async fn send_tracked(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> anyhow::Result<MessageId> {
        let id = self.actions.send_text(chat_id, text, reply_to).await?;
        self.track(chat_id, id).await;
        Ok(id)
    }

    async fn track(&self, chat_id: ChatId, id: MessageId) {
        if let Some(evicted) = self.sent.push(chat_id, id) {
            if let Err(e) = self.actions.delete_message(chat_id, evicted).await {
                debug!(
                    "failed to delete evicted message {} in {chat_id}: {e}",
                    evicted.0
                );
            }
        }
    }

    /// Best-effort apology when processing errored out entirely.
    pub async fn notify_failure(&self, chat_id: ChatId) {
        if let Err(e) = self
            .send_tracked(chat_id, "😕 Something went wrong. Please try again.", None)
            .await
        {
            debug!("failure notice undeliverable in {chat_id}: {e}");
        }
    }

    fn maybe_sweep(&self) {
        let n = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if n % SWEEP_INTERVAL == 0 {
            let now = self.clock.now();
            self.cooldown.sweep(now);
            self.spam.sweep(now);
            self.serializer.sweep();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicI32;
    use std::time::Instant;

    use parking_lot::Mutex;
    use teloxide::types::UserId;

    use crate::plugins::{Stats, WarnRegistry};
    use crate::tables::WelcomeTemplates;
    use crate::telegram::{AdminEntry, MediaKind, ReplyRef};

    use super::*;

    const CHAT: ChatId = ChatId(-100);
    const BOT_ID: UserId = UserId(999);
    const ADMIN_ID: UserId = UserId(50);

    // -- test doubles ----------------------------------------------------

    #[derive(Default)]
    struct MockActions {
        sent: Mutex<Vec<(ChatId, String, Option<MessageId>)>>,
        deleted: Mutex<Vec<(ChatId, MessageId)>>,
        restricted: Mutex<Vec<(ChatId, UserId, Duration)>>,
        banned: Mutex<Vec<(ChatId, UserId)>>,
        unbanned: Mutex<Vec<(ChatId, UserId)>>,
        pinned: Mutex<Vec<(ChatId, MessageId)>>,
        typing: Mutex<Vec<ChatId>>,
        next_id: AtomicI32,
    }

    impl MockActions {
        fn sent_texts(&self) -> Vec<String> {
            self.sent.lock().iter().map(|(_, t, _)| t.clone()).collect()
        }
    }

    #[async_trait::async_trait]
    impl ChatActions for MockActions {
        async fn send_text(
            &self,
            chat_id: ChatId,
            text: &str,
            reply_to: Option<MessageId>,
        ) -> anyhow::Result<MessageId> {
            let id = MessageId(1000 + self.next_id.fetch_add(1, Ordering::Relaxed));
            self.sent.lock().push((chat_id, text.to_string(), reply_to));
            Ok(id)
        }

        async fn delete_message(
            &self,
            chat_id: ChatId,
            message_id: MessageId,
        ) -> anyhow::Result<()> {
            self.deleted.lock().push((chat_id, message_id));
            Ok(())
        }

        async fn restrict_member(
            &self,
            chat_id: ChatId,
            user_id: UserId,
            duration: Duration,
        ) -> anyhow::Result<()> {
            self.restricted.lock().push((chat_id, user_id, duration));
            Ok(())
        }

        async fn ban_member(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<()> {
            self.banned.lock().push((chat_id, user_id));
            Ok(())
        }

        async fn unban_member(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<()> {
            self.unbanned.lock().push((chat_id, user_id));
            Ok(())
        }

        async fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> anyhow::Result<()> {
            self.pinned.lock().push((chat_id, message_id));
            Ok(())
        }

        async fn fetch_admins(&self, _chat_id: ChatId) -> anyhow::Result<Vec<AdminEntry>> {
            Ok(vec![AdminEntry {
                id: ADMIN_ID,
                first_name: "Alex".to_string(),
                username: Some("alexadmin".to_string()),
                is_bot: false,
            }])
        }

        async fn typing(&self, chat_id: ChatId) -> anyhow::Result<()> {
            self.typing.lock().push(chat_id);
            Ok(())
        }
    }

    struct ManualClock {
        base: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock()
        }
    }

    struct NoopDelay;

    #[async_trait::async_trait]
    impl Delay for NoopDelay {
        async fn sleep(&self, _duration: Duration) {}
    }

    struct FirstPick;

    impl ReplySelector for FirstPick {
        fn pick(&self, _len: usize) -> usize {
            0
        }

        fn typing_delay(&self) -> Duration {
            Duration::ZERO
        }
    }

    // -- harness ---------------------------------------------------------

    struct Harness {
        pipeline: Pipeline,
        actions: Arc<MockActions>,
        clock: Arc<ManualClock>,
    }

    fn harness() -> Harness {
        let actions = Arc::new(MockActions::default());
        let clock = Arc::new(ManualClock::new());
        let permissions = Permissions::new(actions.clone());
        let selector: Arc<dyn ReplySelector> = Arc::new(FirstPick);
        let thresholds = Thresholds::default();

        let templates = WelcomeTemplates {
            group: vec!["Welcome {name} to {group}!".to_string()],
            private: vec![],
            goodbye: vec!["Goodbye, {name}.".to_string()],
        };

        let commands = CommandContext {
            actions: actions.clone(),
            permissions: permissions.clone(),
            stats: Arc::new(Stats::new()),
            selector: selector.clone(),
            welcome: templates.clone(),
            warns: Arc::new(WarnRegistry::new()),
            bot_name: "Groupwarden".to_string(),
            thresholds: thresholds.clone(),
        };

        let replies = ReplyTable::from_entries([
            ("hi|hello", vec!["Hi {name}!".to_string()]),
        ]);
        let bad_words = BadWordSet::from_words(vec!["scam".to_string()]);
        let greeter = Greeter::new(templates, BOT_ID, "Groupwarden".to_string());

        let pipeline = Pipeline::new(
            actions.clone(),
            permissions,
            commands,
            replies,
            bad_words,
            greeter,
            &thresholds,
            HashSet::from([666]),
            Some("groupwarden_bot".to_string()),
            PipelineSeams {
                clock: clock.clone(),
                delay: Arc::new(NoopDelay),
                selector,
            },
        );

        Harness {
            pipeline,
            actions,
            clock,
        }
    }

    fn member(id: u64, name: &str) -> Sender {
        Sender {
            id: UserId(id),
            first_name: name.to_string(),
            username: None,
            is_bot: false,
        }
    }

    fn group_message(id: i32, user: u64, text: &str) -> IncomingMessage {
        IncomingMessage {
            id: MessageId(id),
            chat_id: CHAT,
            is_group: true,
            chat_title: Some("Rustaceans".to_string()),
            sender: Some(member(user, "Sam")),
            text: Some(text.to_string()),
            media: None,
            reply_to: None,
            joined: vec![],
            left: None,
        }
    }

    /// A command message replying to another user's message.
    fn reply_command(id: i32, user: u64, text: &str, target_msg: i32, target_user: u64) -> IncomingMessage {
        let mut msg = group_message(id, user, text);
        msg.reply_to = Some(ReplyRef {
            id: MessageId(target_msg),
            sender: Some(member(target_user, "Tess")),
        });
        msg
    }

    fn join_message(id: i32, user: u64, name: &str) -> IncomingMessage {
        IncomingMessage {
            id: MessageId(id),
            chat_id: CHAT,
            is_group: true,
            chat_title: Some("Rustaceans".to_string()),
            sender: Some(member(user, name)),
            text: None,
            media: None,
            reply_to: None,
            joined: vec![member(user, name)],
            left: None,
        }
    }

    // -- scenarios -------------------------------------------------------

    #[tokio::test]
    async fn flooding_sender_is_muted_once() {
        let h = harness();

        // Ten messages 500 ms apart: all clear the cooldown, all land
        // inside the 5 s spam window.
        for i in 0..9 {
            let outcome = h
                .pipeline
                .process(&group_message(i, 7, &format!("msg {i}")))
                .await
                .unwrap();
            assert_eq!(outcome, Outcome::Unhandled, "message {i}");
            h.clock.advance(Duration::from_millis(500));
        }

        let outcome = h.pipeline.process(&group_message(9, 7, "msg 9")).await.unwrap();
        assert_eq!(outcome, Outcome::Muted);

        let restricted = h.actions.restricted.lock().clone();
        assert_eq!(restricted, vec![(CHAT, UserId(7), Duration::from_secs(120))]);
        assert!(h.actions.sent_texts()[0].contains("muted for 2 minutes"));

        // The flood record was cleared; the next message is ordinary.
        h.clock.advance(Duration::from_millis(500));
        let outcome = h.pipeline.process(&group_message(10, 7, "sorry")).await.unwrap();
        assert_eq!(outcome, Outcome::Unhandled);
    }

    #[tokio::test]
    async fn bad_words_and_links_are_removed() {
        let h = harness();

        // "hello" matches the reply table; the bad word must win and
        // the auto-reply stage must never run.
        let outcome = h
            .pipeline
            .process(&group_message(1, 7, "hello scam"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Deleted(DeleteReason::BadWord));
        assert!(h.actions.deleted.lock().contains(&(CHAT, MessageId(1))));
        let texts = h.actions.sent_texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("mind your language"));
        assert!(h.actions.typing.lock().is_empty());

        h.clock.advance(Duration::from_secs(1));
        let outcome = h
            .pipeline
            .process(&group_message(2, 7, "join https://spam.example now"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Deleted(DeleteReason::Link));
        assert!(h.actions.deleted.lock().contains(&(CHAT, MessageId(2))));
    }

    #[tokio::test]
    async fn admins_may_post_links() {
        let h = harness();

        let outcome = h
            .pipeline
            .process(&group_message(1, ADMIN_ID.0, "see https://docs.example"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Unhandled);
        assert!(h.actions.deleted.lock().is_empty());
    }

    #[tokio::test]
    async fn auto_reply_respects_the_cooldown() {
        let h = harness();

        let outcome = h.pipeline.process(&group_message(1, 7, "hello there")).await.unwrap();
        assert_eq!(outcome, Outcome::Replied);

        let sent = h.actions.sent.lock().clone();
        assert_eq!(sent, vec![(CHAT, "Hi Sam!".to_string(), Some(MessageId(1)))]);
        assert_eq!(h.actions.typing.lock().as_slice(), &[CHAT]);

        // A second trigger 100 ms later is debounced silently.
        h.clock.advance(Duration::from_millis(100));
        let outcome = h.pipeline.process(&group_message(2, 7, "hello again")).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Cooldown));
        assert_eq!(h.actions.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn own_messages_are_capped_per_chat() {
        let h = harness();

        // Eleven joins produce eleven welcomes; the eleventh evicts
        // and deletes the first bot message.
        for i in 0..11 {
            let outcome = h
                .pipeline
                .process(&join_message(i, 100 + i as u64, "New"))
                .await
                .unwrap();
            assert_eq!(outcome, Outcome::Membership);
        }

        let first_sent = MessageId(1000);
        let deleted = h.actions.deleted.lock().clone();
        assert_eq!(deleted, vec![(CHAT, first_sent)]);
    }

    #[tokio::test]
    async fn commands_are_dispatched() {
        let h = harness();

        let outcome = h.pipeline.process(&group_message(1, 7, "/help")).await.unwrap();
        assert_eq!(outcome, Outcome::Command);
        assert!(h.actions.sent_texts()[0].contains("/report"));
        assert_eq!(
            h.pipeline.commands.stats.commands.load(Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn unknown_commands_get_a_hint() {
        let h = harness();

        let outcome = h.pipeline.process(&group_message(1, 7, "/helo")).await.unwrap();
        assert_eq!(outcome, Outcome::Command);
        assert!(h.actions.sent_texts()[0].contains("Unknown command"));
    }

    #[tokio::test]
    async fn foreign_commands_are_ignored() {
        let h = harness();

        let outcome = h
            .pipeline
            .process(&group_message(1, 7, "/help@other_bot"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::ForeignCommand));
        assert!(h.actions.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn blocked_and_bot_senders_are_skipped() {
        let h = harness();

        let outcome = h.pipeline.process(&group_message(1, 666, "hello")).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Blocked));

        let mut msg = group_message(2, 7, "hello");
        msg.sender.as_mut().unwrap().is_bot = true;
        let outcome = h.pipeline.process(&msg).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::BotSender));

        assert!(h.actions.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn captionless_media_gets_acknowledged() {
        let h = harness();

        let mut msg = group_message(1, 7, "");
        msg.text = None;
        msg.media = Some(MediaKind::Photo);

        let outcome = h.pipeline.process(&msg).await.unwrap();
        assert_eq!(outcome, Outcome::MediaAck);
        assert_eq!(h.actions.sent_texts(), vec!["📸 Nice photo!".to_string()]);
    }

    #[tokio::test]
    async fn blocked_user_join_is_dropped_silently() {
        let h = harness();

        let outcome = h
            .pipeline
            .process(&join_message(1, 666, "Blocked"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Blocked));
        assert!(h.actions.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn member_added_by_a_bot_is_not_welcomed() {
        let h = harness();

        let mut msg = join_message(1, 7, "Sam");
        // The service message's sender is the adding bot.
        msg.sender = Some(Sender {
            id: UserId(444),
            first_name: "AdderBot".to_string(),
            username: None,
            is_bot: true,
        });

        let outcome = h.pipeline.process(&msg).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::BotSender));
        assert!(h.actions.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn moderation_commands_require_admin() {
        let h = harness();

        let outcome = h
            .pipeline
            .process(&reply_command(1, 7, "/ban", 5, 8))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Command);
        assert!(h.actions.banned.lock().is_empty());
        assert!(h.actions.sent_texts()[0].contains("for admins"));

        // Admins cannot be targeted either.
        h.clock.advance(Duration::from_secs(1));
        let outcome = h
            .pipeline
            .process(&reply_command(2, ADMIN_ID.0, "/ban", 5, ADMIN_ID.0))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Command);
        assert!(h.actions.banned.lock().is_empty());
        assert!(h.actions.sent_texts()[1].contains("not act against an admin"));
    }

    #[tokio::test]
    async fn admin_can_mute_with_duration() {
        let h = harness();

        let outcome = h
            .pipeline
            .process(&reply_command(1, ADMIN_ID.0, "/mute 10m", 5, 8))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Command);
        assert_eq!(
            h.actions.restricted.lock().clone(),
            vec![(CHAT, UserId(8), Duration::from_secs(600))]
        );
        assert!(h.actions.sent_texts()[0].contains("muted for 10 minutes"));
    }

    #[tokio::test]
    async fn warnings_escalate_to_a_mute() {
        let h = harness();

        for i in 1..=2 {
            let outcome = h
                .pipeline
                .process(&reply_command(i, ADMIN_ID.0, "/warn spamming", 5, 8))
                .await
                .unwrap();
            assert_eq!(outcome, Outcome::Command);
            assert!(h.actions.restricted.lock().is_empty());
            h.clock.advance(Duration::from_secs(1));
        }
        assert!(h.actions.sent_texts()[1].contains("(2/3)"));

        let outcome = h
            .pipeline
            .process(&reply_command(3, ADMIN_ID.0, "/warn spamming", 5, 8))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Command);
        assert_eq!(
            h.actions.restricted.lock().clone(),
            vec![(CHAT, UserId(8), Duration::from_secs(120))]
        );
        assert!(h.actions.sent_texts()[2].contains("reached 3 warnings"));

        // The count starts over after the escalation.
        h.clock.advance(Duration::from_secs(1));
        h.pipeline
            .process(&reply_command(4, ADMIN_ID.0, "/warn again", 5, 8))
            .await
            .unwrap();
        assert!(h.actions.sent_texts()[3].contains("(1/3)"));
    }

    #[tokio::test]
    async fn kick_is_ban_then_unban() {
        let h = harness();

        let outcome = h
            .pipeline
            .process(&reply_command(1, ADMIN_ID.0, "/kick", 5, 8))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Command);
        assert_eq!(h.actions.banned.lock().clone(), vec![(CHAT, UserId(8))]);
        assert_eq!(h.actions.unbanned.lock().clone(), vec![(CHAT, UserId(8))]);
    }

    #[tokio::test]
    async fn pin_and_delete_act_on_the_reply() {
        let h = harness();

        let outcome = h
            .pipeline
            .process(&reply_command(1, ADMIN_ID.0, "/pin", 5, 8))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Command);
        assert_eq!(h.actions.pinned.lock().clone(), vec![(CHAT, MessageId(5))]);

        h.clock.advance(Duration::from_secs(1));
        let outcome = h
            .pipeline
            .process(&reply_command(2, ADMIN_ID.0, "/delete", 6, 8))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Command);
        let deleted = h.actions.deleted.lock().clone();
        assert!(deleted.contains(&(CHAT, MessageId(6))));
        assert!(deleted.contains(&(CHAT, MessageId(2))));
    }

    #[tokio::test]
    async fn goodbye_is_sent_for_leavers() {
        let h = harness();

        let mut msg = join_message(1, 7, "Sam");
        msg.joined = vec![];
        msg.left = Some(member(7, "Sam"));

        let outcome = h.pipeline.process(&msg).await.unwrap();
        assert_eq!(outcome, Outcome::Membership);
        assert_eq!(h.actions.sent_texts(), vec!["Goodbye, Sam.".to_string()]);
    }

    #[tokio::test]
    async fn own_join_introduces_the_bot_with_admins() {
        let h = harness();

        let mut msg = join_message(1, BOT_ID.0, "Groupwarden");
        msg.joined[0].is_bot = true;
        // Often the bot is added by another bot; the self-join must
        // still get past the bot-sender guard.
        msg.sender.as_mut().unwrap().is_bot = true;

        let outcome = h.pipeline.process(&msg).await.unwrap();
        assert_eq!(outcome, Outcome::Membership);
        let texts = h.actions.sent_texts();
        assert!(texts[0].contains("Groupwarden"));
        assert!(texts[0].contains("@alexadmin"));
    }
}
