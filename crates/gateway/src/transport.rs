use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use crate::protocol::{Reply, Request, TranslatedSegment};
use crate::provider::TranslationProvider;
use quicklingo_settings::LanguageEntry;

/// 跨執行環境往返時可能發生的錯誤。 / Errors a cross-context round trip can produce.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to spawn background worker: {0}")]
    Spawn(io::Error),
    #[error("message channel closed")]
    ChannelClosed,
    #[error("timed out waiting for reply")]
    Timeout,
    #[error("translation service error: {0}")]
    Upstream(String),
    #[error("translation failed")]
    TranslationFailed,
    #[error("unexpected reply kind")]
    UnexpectedReply,
}

/// 單一請求與其回覆通道。 / One request paired with its private reply channel.
struct Envelope {
    request: Request,
    reply_tx: Sender<Reply>,
}

/// 前景端的閘道：送出請求並取得待決回覆。 / Foreground half of the gateway: sends requests, hands back pending replies.
///
/// Cloning is cheap; every clone feeds the same background worker. Each
/// call owns a private reply channel, so replies can never be attributed
/// to the wrong request regardless of ordering between calls.
#[derive(Clone)]
pub struct ForegroundGateway {
    tx: Sender<Envelope>,
}

impl ForegroundGateway {
    /// 要求支援語言清單。 / Requests the supported-language list.
    pub fn request_languages(&self) -> PendingLanguages {
        PendingLanguages {
            inner: self.send(Request::GetLanguages),
        }
    }

    /// 要求將文字翻譯為目標語言。 / Requests a translation of `text` into `target_lang`.
    pub fn request_translation(
        &self,
        text: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> PendingTranslation {
        PendingTranslation {
            inner: self.send(Request::TranslateText {
                text: text.into(),
                target_lang: target_lang.into(),
            }),
        }
    }

    fn send(&self, request: Request) -> PendingReply {
        let (reply_tx, reply_rx) = mpsc::channel();
        let delivered = self.tx.send(Envelope { request, reply_tx }).is_ok();
        PendingReply { reply_rx, delivered }
    }
}

/// A reply that has not arrived yet.
struct PendingReply {
    reply_rx: Receiver<Reply>,
    delivered: bool,
}

impl PendingReply {
    fn poll(&self) -> Option<Result<Reply, GatewayError>> {
        if !self.delivered {
            return Some(Err(GatewayError::ChannelClosed));
        }
        match self.reply_rx.try_recv() {
            Ok(reply) => Some(Ok(reply)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(GatewayError::ChannelClosed)),
        }
    }

    fn wait(&self, timeout: Duration) -> Result<Reply, GatewayError> {
        if !self.delivered {
            return Err(GatewayError::ChannelClosed);
        }
        match self.reply_rx.recv_timeout(timeout) {
            Ok(reply) => Ok(reply),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(GatewayError::Timeout),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(GatewayError::ChannelClosed),
        }
    }
}

/// 語言清單請求的待決回覆。 / Pending reply of a language-list request.
pub struct PendingLanguages {
    inner: PendingReply,
}

impl PendingLanguages {
    /// Non-blocking: `None` while the reply is still on its way.
    pub fn poll(&self) -> Option<Result<Vec<LanguageEntry>, GatewayError>> {
        self.inner.poll().map(|reply| reply.and_then(into_languages))
    }

    /// Blocks up to `timeout` for the reply.
    pub fn wait(&self, timeout: Duration) -> Result<Vec<LanguageEntry>, GatewayError> {
        self.inner.wait(timeout).and_then(into_languages)
    }
}

/// 翻譯請求的待決回覆。 / Pending reply of a translation request.
pub struct PendingTranslation {
    inner: PendingReply,
}

impl PendingTranslation {
    /// Non-blocking: `None` while the reply is still on its way.
    pub fn poll(&self) -> Option<Result<Vec<TranslatedSegment>, GatewayError>> {
        self.inner.poll().map(|reply| reply.and_then(into_translation))
    }

    /// Blocks up to `timeout` for the reply.
    pub fn wait(&self, timeout: Duration) -> Result<Vec<TranslatedSegment>, GatewayError> {
        self.inner.wait(timeout).and_then(into_translation)
    }
}

fn into_languages(reply: Reply) -> Result<Vec<LanguageEntry>, GatewayError> {
    match reply {
        Reply::Languages { languages } => Ok(languages),
        Reply::Error { error } => Err(GatewayError::Upstream(error)),
        Reply::Translated { .. } => Err(GatewayError::UnexpectedReply),
    }
}

fn into_translation(reply: Reply) -> Result<Vec<TranslatedSegment>, GatewayError> {
    match reply {
        // a translated reply without a usable first segment counts as a
        // failure, same as an explicit error from the other side
        Reply::Translated { translated } => match translated.first() {
            Some(first) if !first.text.is_empty() => Ok(translated),
            _ => Err(GatewayError::TranslationFailed),
        },
        Reply::Error { error } => Err(GatewayError::Upstream(error)),
        Reply::Languages { .. } => Err(GatewayError::UnexpectedReply),
    }
}

/// 背景執行環境：在工作執行緒上服務請求。 / The background context: serves requests on a worker thread.
///
/// Each request maps 1:1 onto a provider call, and the reply channel is
/// held open across that call, so the reply is delivered only once the
/// provider has settled. The worker exits when every gateway clone has
/// been dropped.
pub struct BackgroundService {
    handle: JoinHandle<()>,
}

impl BackgroundService {
    /// 啟動背景工作執行緒並回傳對應的前景閘道。 / Spawns the worker thread and returns the matching foreground gateway.
    pub fn spawn(
        provider: impl TranslationProvider + 'static,
    ) -> Result<(ForegroundGateway, BackgroundService), GatewayError> {
        let (tx, rx) = mpsc::channel::<Envelope>();
        let handle = thread::Builder::new()
            .name("quicklingo-background".into())
            .spawn(move || serve(rx, provider))
            .map_err(GatewayError::Spawn)?;
        Ok((ForegroundGateway { tx }, BackgroundService { handle }))
    }

    /// 等待工作執行緒結束。 / Blocks until the worker exits (all gateways dropped).
    pub fn join(self) {
        let _ = self.handle.join();
    }
}

fn serve(rx: Receiver<Envelope>, provider: impl TranslationProvider) {
    while let Ok(Envelope { request, reply_tx }) = rx.recv() {
        let reply = match request {
            Request::GetLanguages => Reply::Languages {
                languages: provider.list_languages(),
            },
            Request::TranslateText { text, target_lang } => Reply::Translated {
                translated: provider.translate(&text, &target_lang),
            },
        };
        // the requester may have gone away while the provider ran
        let _ = reply_tx.send(reply);
    }
}
