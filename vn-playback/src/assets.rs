//! # 资源路径模块
//!
//! AssetReference 是不透明的字符串标识，引擎只负责按固定的资源根目录约定
//! 把它拼成可加载的路径，并在比较时做逻辑路径规范化（用于幂等判断）。
//! 资源是否真实存在由宿主在加载时观察。

/// 资源引用：由路径约定解析的不透明标识
pub type AssetRef = String;

/// 默认资源根目录
pub const DEFAULT_ASSET_ROOT: &str = "assets";

/// 规范化逻辑路径
///
/// - 统一使用 `/` 分隔符
/// - 移除 `.` 组件和空组件
/// - 处理 `..` 组件（向上级目录）
///
/// # 示例
///
/// ```text
/// "./bg/night.png"      -> "bg/night.png"
/// "bg//night.png"       -> "bg/night.png"
/// "bg/../cg/night.png"  -> "cg/night.png"
/// ```
pub fn normalize_logical_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");

    let mut components: Vec<&str> = Vec::new();
    for component in normalized.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            _ => components.push(component),
        }
    }

    components.join("/")
}

/// 将资源引用解析为可加载路径
///
/// 约定：`<asset_root>/<规范化后的引用>`。
pub fn resolve_asset_path(asset_root: &str, reference: &str) -> String {
    let normalized = normalize_logical_path(reference);
    if asset_root.is_empty() {
        normalized
    } else {
        format!("{}/{}", asset_root.trim_end_matches('/'), normalized)
    }
}
