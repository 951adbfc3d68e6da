use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tempfile::tempdir;
use tokio::io::{AsyncRead, ReadBuf};

use super::*;
use crate::stream::{FileStream, PeekReader};

const JPEG_HEAD: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

/// 只认识一种虚构类型的注册表
struct TinyRegistry;

impl Registry for TinyRegistry {
    fn mime_for_extension(&self, ext: &str) -> Option<String> {
        (ext.trim_start_matches('.') == "smpl").then(|| "application/x-smpl".to_string())
    }

    fn extension_for_mime(&self, mime: &str) -> Option<String> {
        (mime == "application/x-smpl").then(|| "smpl".to_string())
    }
}

/// 记录每次收到的窗口的嗅探器
#[derive(Clone, Default)]
struct CountingSniffer {
    calls: Arc<AtomicUsize>,
    widest: Arc<AtomicUsize>,
}

impl ContentSniffer for CountingSniffer {
    fn sniff(&self, bytes: &[u8]) -> Option<DetectionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.widest.fetch_max(bytes.len(), Ordering::SeqCst);
        bytes
            .starts_with(b"SMPL")
            .then(|| DetectionResult::new("smpl", "application/x-smpl"))
    }
}

struct Broken;

impl AsyncRead for Broken {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")))
    }
}

/// 第一次读取交付 JPEG 文件头，之后每次读取都失败
struct LateFailure {
    delivered: bool,
}

impl AsyncRead for LateFailure {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.delivered {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "late failure")));
        }
        this.delivered = true;
        buf.put_slice(JPEG_HEAD);
        Poll::Ready(Ok(()))
    }
}

fn bin_default() -> DefaultSpec {
    DefaultSpec::from("bin")
}

#[test]
fn absent_input_uses_the_default() {
    let detector = Detector::new();
    assert_eq!(detector.detect(Input::Absent, None).unwrap(), None);
    assert_eq!(
        detector.detect(None::<&str>, Some(&bin_default())).unwrap(),
        Some(DetectionResult::new("bin", "application/octet-stream"))
    );
}

#[test]
fn registry_hits_skip_the_filesystem() {
    let sniffer = CountingSniffer::default();
    let detector = Detector::new().with_sniffer(sniffer.clone());

    let result = detector.detect("/does/not/exist/photo.jpg", None).unwrap();
    assert_eq!(result, Some(DetectionResult::new("jpg", "image/jpeg")));
    assert_eq!(sniffer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn custom_collaborators_are_consulted() {
    let detector = Detector::new()
        .with_registry(TinyRegistry)
        .with_sniffer(CountingSniffer::default());

    assert_eq!(
        detector.detect(".smpl", None).unwrap(),
        Some(DetectionResult::new("smpl", "application/x-smpl"))
    );
    assert_eq!(
        detector.detect(b"SMPL\x01payload", None).unwrap(),
        Some(DetectionResult::new("smpl", "application/x-smpl"))
    );
    // 这两个替身都不认识 jpg
    assert_eq!(detector.detect(JPEG_HEAD, None).unwrap(), None);
    assert_eq!(
        detector.detect("jpg", Some(&DefaultSpec::from("smpl"))).unwrap(),
        Some(DetectionResult::new("smpl", "application/x-smpl"))
    );
}

#[test]
fn buffers_are_sniffed_through_the_leading_window() {
    let sniffer = CountingSniffer::default();
    let detector = Detector::new().with_sniffer(sniffer.clone());

    let mut buffer = b"SMPL".to_vec();
    buffer.resize(4096, 0);
    assert!(detector.detect(&buffer, None).unwrap().is_some());
    assert_eq!(sniffer.widest.load(Ordering::SeqCst), SNIFF_WINDOW_LENGTH);
}

#[test]
fn zero_window_never_sniffs() {
    let sniffer = CountingSniffer::default();
    let detector = Detector::new()
        .with_sniffer(sniffer.clone())
        .with_window_length(0);

    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("fixture");
    std::fs::write(&path, b"SMPL").unwrap();

    assert_eq!(detector.detect(b"SMPL", None).unwrap(), None);
    assert_eq!(detector.detect(path.to_str().unwrap(), None).unwrap(), None);
    assert_eq!(
        detector.detect(b"SMPL", Some(&bin_default())).unwrap(),
        Some(DetectionResult::new("bin", "application/octet-stream"))
    );
    assert_eq!(sniffer.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unreadable_paths_follow_the_policy() {
    let temp_dir = tempdir().unwrap();
    // 目录存在，但不能按文件读取
    let dir = temp_dir.path().join("folder");
    std::fs::create_dir(&dir).unwrap();
    let token = dir.to_str().unwrap();

    let lenient = Detector::new();
    assert_eq!(
        lenient.detect(token, Some(&bin_default())).unwrap(),
        Some(DetectionResult::new("bin", "application/octet-stream"))
    );

    let strict = Detector::new().with_policy(ErrorPolicy::Strict);
    assert!(strict.detect(token, Some(&bin_default())).is_err());
}

#[test]
fn missing_paths_fall_through_under_both_policies() {
    for policy in [ErrorPolicy::Lenient, ErrorPolicy::Strict] {
        let detector = Detector::new().with_policy(policy);
        assert_eq!(detector.detect("/no/such/fixture", None).unwrap(), None);
    }
}

#[test]
fn blocking_streams_follow_the_policy() {
    let stream = FileStream::lazy("fake.path");

    let lenient = Detector::new();
    assert_eq!(lenient.detect(&stream, None).unwrap(), None);

    let strict = Detector::new().with_policy(ErrorPolicy::Strict);
    let err = strict.detect(&stream, None).unwrap_err();
    assert!(err.is_not_local());
    assert_eq!(err.to_string(), "the file must be local and exist: fake.path");
}

#[test]
fn settings_configure_the_detector() {
    let mut settings = Settings::default();
    settings.sniff.window_length = 16;
    settings.sniff.error_policy = ErrorPolicy::Strict;

    let detector = Detector::from_settings(&settings);
    assert_eq!(detector.window_length(), 16);
    assert_eq!(detector.policy(), ErrorPolicy::Strict);
}

#[test]
fn policy_deserializes_from_lowercase_names() {
    let policy: ErrorPolicy = serde_json::from_str("\"strict\"").unwrap();
    assert_eq!(policy, ErrorPolicy::Strict);
    assert!(serde_json::from_str::<ErrorPolicy>("\"Strict\"").is_err());
}

#[tokio::test]
async fn async_stream_errors_always_propagate() {
    let detector = Detector::new();
    let mut reader = PeekReader::new(Broken);
    let err = detector
        .detect_async(&mut reader, Some(&bin_default()))
        .await
        .unwrap_err();
    assert!(err.is_stream_error());
}

#[tokio::test]
async fn async_stream_is_left_intact() {
    let detector = Detector::new().with_sniffer(CountingSniffer::default());
    let mut data = b"SMPL".to_vec();
    data.extend(std::iter::repeat(7u8).take(600));
    let mut reader = PeekReader::new(Cursor::new(data.clone()));

    let result = detector.detect_async(&mut reader, None).await.unwrap();
    assert_eq!(result, Some(DetectionResult::new("smpl", "application/x-smpl")));

    let mut out = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut out)
        .await
        .unwrap();
    assert_eq!(out, data);
}

#[tokio::test]
async fn async_paths_match_blocking_paths() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("fixture");
    std::fs::write(&path, JPEG_HEAD).unwrap();
    let token = path.to_str().unwrap();

    let detector = Detector::new();
    let blocking = detector.detect(token, None).unwrap();
    let non_blocking = detector.detect_async(token, None).await.unwrap();
    assert_eq!(blocking, non_blocking);
    assert_eq!(blocking, Some(DetectionResult::new("jpg", "image/jpeg")));
}

#[tokio::test]
async fn async_stream_error_after_first_read_still_sniffs() {
    let detector = Detector::new();
    let mut reader = PeekReader::new(LateFailure { delivered: false });
    let result = detector.detect_async(&mut reader, None).await.unwrap();
    assert_eq!(result, Some(DetectionResult::new("jpg", "image/jpeg")));

    // 错误留给流的消费者
    let mut head = vec![0u8; JPEG_HEAD.len()];
    tokio::io::AsyncReadExt::read_exact(&mut reader, &mut head)
        .await
        .unwrap();
    assert_eq!(head, JPEG_HEAD);
    let err = tokio::io::AsyncReadExt::read(&mut reader, &mut head)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
}

#[tokio::test]
async fn unreadable_paths_follow_the_policy_async() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path().join("folder");
    std::fs::create_dir(&dir).unwrap();
    let token = dir.to_str().unwrap();

    let lenient = Detector::new();
    assert_eq!(
        lenient.detect_async(token, Some(&bin_default())).await.unwrap(),
        Some(DetectionResult::new("bin", "application/octet-stream"))
    );

    let strict = Detector::new().with_policy(ErrorPolicy::Strict);
    let err = strict
        .detect_async(token, Some(&bin_default()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DetectError::Read { .. } | DetectError::NotLocalOrMissing { .. }
    ));
}

#[test]
fn oversized_window_is_capped() {
    let detector = Detector::new().with_window_length(usize::MAX);
    assert_eq!(detector.window_length(), MAX_WINDOW_LENGTH);

    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("fixture");
    std::fs::write(&path, JPEG_HEAD).unwrap();
    assert_eq!(
        detector.detect(path.to_str().unwrap(), None).unwrap(),
        Some(DetectionResult::new("jpg", "image/jpeg"))
    );
}
