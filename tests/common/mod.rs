#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

/// JFIF 文件头加填充，足够用于签名匹配
pub fn jpeg_bytes() -> Vec<u8> {
    let mut bytes = vec![
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
        0x01, 0x00, 0x01, 0x00, 0x00,
    ];
    bytes.resize(1024, 0);
    bytes
}

pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R']);
    bytes.resize(512, 0);
    bytes
}

/// ID3v2 标签头，后接 MPEG 帧同步
pub fn mp3_bytes() -> Vec<u8> {
    let mut bytes = b"ID3".to_vec();
    bytes.extend_from_slice(&[0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    bytes.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
    bytes.resize(512, 0);
    bytes
}

/// Opus 流的第一个 Ogg 页：27 字节页头、单项分段表，然后是 `OpusHead` 标识包
pub fn opus_bytes() -> Vec<u8> {
    let mut bytes = b"OggS".to_vec();
    bytes.push(0x00); // 版本
    bytes.push(0x02); // 流起始页
    bytes.extend_from_slice(&[0; 8]); // granule 位置
    bytes.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]); // 序列号
    bytes.extend_from_slice(&[0; 4]); // 页序号
    bytes.extend_from_slice(&[0; 4]); // 校验和
    bytes.push(0x01);
    bytes.push(0x13);
    bytes.extend_from_slice(b"OpusHead");
    bytes.push(0x01); // 版本
    bytes.push(0x02); // 声道数
    bytes.extend_from_slice(&[0x38, 0x01]); // 预跳过样本数
    bytes.extend_from_slice(&48_000u32.to_le_bytes());
    bytes.extend_from_slice(&[0x00, 0x00, 0x00]);
    bytes.resize(512, 0);
    bytes
}

/// 以无扩展名的文件名写入 `dir`，只能靠内容识别
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

pub fn token(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
