//! 将调用方输入归类为探测器可处理的封闭集合
//! 归类过程不访问文件系统，也不消费流中的字节

use std::fs::File;

use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::stream::{FileStream, LocalStream, PeekReader, PeekStream};

/// 同步探测器的输入
#[derive(Clone, Copy)]
pub enum Input<'a> {
    /// 文件路径、扩展名（可带点）或 MIME 字符串
    Path(&'a str),
    Bytes(&'a [u8]),
    /// 由本地文件支撑的流
    Stream(&'a (dyn LocalStream + 'a)),
    Absent,
}

/// 异步探测器的输入
pub enum AsyncInput<'a> {
    Path(&'a str),
    Bytes(&'a [u8]),
    /// 可无损预读开头字节的流
    Stream(&'a mut (dyn PeekStream + 'a)),
    Absent,
}

impl<'a> Input<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Bytes(_) => "bytes",
            Self::Stream(_) => "stream",
            Self::Absent => "absent",
        }
    }
}

impl<'a> AsyncInput<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Bytes(_) => "bytes",
            Self::Stream(_) => "stream",
            Self::Absent => "absent",
        }
    }
}

impl std::fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
            Self::Absent => f.write_str("Absent"),
        }
    }
}

impl std::fmt::Debug for AsyncInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
            Self::Absent => f.write_str("Absent"),
        }
    }
}

fn classify_str(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn classify_bytes(value: &[u8]) -> Option<&[u8]> {
    (!value.is_empty()).then_some(value)
}

macro_rules! impl_shared_from {
    ($target:ident) => {
        impl<'a> From<&'a str> for $target<'a> {
            fn from(value: &'a str) -> Self {
                classify_str(value).map_or(Self::Absent, Self::Path)
            }
        }

        impl<'a> From<&'a String> for $target<'a> {
            fn from(value: &'a String) -> Self {
                Self::from(value.as_str())
            }
        }

        impl<'a> From<&'a [u8]> for $target<'a> {
            fn from(value: &'a [u8]) -> Self {
                classify_bytes(value).map_or(Self::Absent, Self::Bytes)
            }
        }

        impl<'a, const N: usize> From<&'a [u8; N]> for $target<'a> {
            fn from(value: &'a [u8; N]) -> Self {
                Self::from(&value[..])
            }
        }

        impl<'a> From<&'a Vec<u8>> for $target<'a> {
            fn from(value: &'a Vec<u8>) -> Self {
                Self::from(value.as_slice())
            }
        }

        impl<'a> From<&'a Bytes> for $target<'a> {
            fn from(value: &'a Bytes) -> Self {
                Self::from(value.as_ref())
            }
        }

        impl<'a, T> From<Option<T>> for $target<'a>
        where
            T: Into<$target<'a>>,
        {
            fn from(value: Option<T>) -> Self {
                value.map_or(Self::Absent, Into::into)
            }
        }
    };
}

impl_shared_from!(Input);
impl_shared_from!(AsyncInput);

impl<'a> From<&'a File> for Input<'a> {
    fn from(value: &'a File) -> Self {
        Self::Stream(value)
    }
}

impl<'a> From<&'a FileStream> for Input<'a> {
    fn from(value: &'a FileStream) -> Self {
        Self::Stream(value)
    }
}

impl<'a, R> From<&'a mut PeekReader<R>> for AsyncInput<'a>
where
    R: AsyncRead + Unpin + Send + 'a,
{
    fn from(value: &'a mut PeekReader<R>) -> Self {
        Self::Stream(value)
    }
}
