use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::FutureExt;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio_util::io::ReaderStream;

use crate::common::detection::MAX_WINDOW_LENGTH;

/// 包装异步读取器，使其开头字节可被查看而不丢失
///
/// [`PeekReader::peek`] 取出的字节会被缓存，并优先交给后续的每次读取，
/// 因此从包装器读取的消费者能看到完整的原始字节序列。
/// 后续读取必须继续使用该包装器；丢弃包装器会同时丢弃尚未消费的预读字节。
#[derive(Debug)]
pub struct PeekReader<R> {
    inner: R,
    head: BytesMut,
    eof: bool,
    /// 预读阶段在已取得数据后遇到的错误，留给下一次读取返回
    pending_error: Option<io::Error>,
}

/// 可无损查看开头字节的流
#[async_trait::async_trait]
pub trait PeekStream: Send {
    /// 返回至多 `len` 个开头字节，空结果表示流未产生任何字节即结束
    async fn peek_head(&mut self, len: usize) -> io::Result<Bytes>;
}

impl<R> PeekReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            head: BytesMut::new(),
            eof: false,
            pending_error: None,
        }
    }

    /// 已预读但尚未消费的字节
    pub fn peeked(&self) -> &[u8] {
        &self.head
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// 拆分为待消费的预读字节与底层读取器
    pub fn into_parts(self) -> (Bytes, R) {
        (self.head.freeze(), self.inner)
    }
}

impl<R: AsyncRead + Unpin> PeekReader<R> {
    /// 预读至多 `len` 个开头字节
    ///
    /// 等待第一次读取完成，之后只取底层读取器无需再次等待即可交付的数据。
    /// 只有第一次读取的错误会返回；已取得数据后的错误延后到下一次读取。
    pub async fn peek(&mut self, len: usize) -> io::Result<&[u8]> {
        if self.head.len() < len && self.can_fill() {
            if let Err(err) = self.fill(len).await {
                self.defer(err)?;
            }
            while self.head.len() < len && self.can_fill() {
                match self.fill(len).now_or_never() {
                    Some(Ok(())) => {}
                    Some(Err(err)) => self.defer(err)?,
                    None => break,
                }
            }
        }
        let available = self.head.len().min(len);
        Ok(&self.head[..available])
    }

    /// 转换为以预读字节开头的 `Stream`
    pub fn into_byte_stream(self) -> ReaderStream<Self> {
        ReaderStream::new(self)
    }

    /// 尚无数据时直接返回错误，否则暂存到下一次读取
    fn defer(&mut self, err: io::Error) -> io::Result<()> {
        if self.head.is_empty() {
            return Err(err);
        }
        tracing::debug!("[Stream] Deferring read error after peek: {}", err);
        self.pending_error = Some(err);
        Ok(())
    }

    fn can_fill(&self) -> bool {
        !self.eof && self.pending_error.is_none()
    }

    async fn fill(&mut self, len: usize) -> io::Result<()> {
        let wanted = (len - self.head.len()).min(MAX_WINDOW_LENGTH);
        let mut buf = vec![0u8; wanted];
        let read = self.inner.read(&mut buf).await?;
        if read == 0 {
            self.eof = true;
        } else {
            self.head.extend_from_slice(&buf[..read]);
        }
        Ok(())
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for PeekReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if !this.head.is_empty() {
            let n = this.head.len().min(buf.remaining());
            buf.put_slice(&this.head.split_to(n));
            return Poll::Ready(Ok(()));
        }
        if let Some(err) = this.pending_error.take() {
            return Poll::Ready(Err(err));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

#[async_trait::async_trait]
impl<R> PeekStream for PeekReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn peek_head(&mut self, len: usize) -> io::Result<Bytes> {
        let head = self.peek(len).await?;
        Ok(Bytes::copy_from_slice(head))
    }
}
