//! 翻译管道模块
//!
//! 文本节点遍历与批次去重

pub mod batch;
pub mod walker;

// 重新导出主要类型
pub use batch::Batch;
pub use walker::{apply_translation, TextNodeCandidate, TextNodeWalker, WalkStats};
