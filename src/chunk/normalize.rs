use std::path::{Component, Path, PathBuf};

/// 词法规范化路径：消解 `.` 与 `..`，合并重复分隔符
///
/// 相对路径开头的 `..` 会被保留；根目录下的 `..` 直接丢弃。不访问文件系统。
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => continue,
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(comp),
            },
            _ => parts.push(comp),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}
