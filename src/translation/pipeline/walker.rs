//! DOM文本遍历器
//!
//! 按文档顺序惰性产出可翻译的文本节点。遍历期间不修改DOM，
//! 写回由调用方在遍历结束后通过 [`apply_translation`] 完成。

use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::parsers::html::{get_body, get_node_attr, get_text_content, set_text_content};
use crate::translation::config::constants;

/// 待翻译文本节点
#[derive(Debug, Clone)]
pub struct TextNodeCandidate {
    /// DOM文本节点
    pub node: Handle,
    /// 去除首尾空白后的原文
    pub original: String,
}

/// 遍历统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub nodes_visited: usize,
    pub subtrees_skipped: usize,
    pub candidates: usize,
}

type SkipPredicate<'a> = Box<dyn Fn(&Handle) -> bool + 'a>;

/// 文本节点遍历器
///
/// 一次性迭代器：每次翻译流程都重新创建。
pub struct TextNodeWalker<'a> {
    stack: Vec<Handle>,
    skip: Option<SkipPredicate<'a>>,
    stats: WalkStats,
}

impl<'a> TextNodeWalker<'a> {
    /// 从 `<body>` 开始遍历，没有 `<body>` 时从文档根开始
    pub fn new(dom: &RcDom) -> Self {
        let root = get_body(dom).unwrap_or_else(|| dom.document.clone());
        Self::from_node(root)
    }

    /// 从任意节点开始遍历
    pub fn from_node(root: Handle) -> Self {
        Self {
            stack: vec![root],
            skip: None,
            stats: WalkStats::default(),
        }
    }

    /// 额外跳过谓词返回 `true` 的文本节点
    pub fn with_skip<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Handle) -> bool + 'a,
    {
        self.skip = Some(Box::new(predicate));
        self
    }

    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    fn push_children(&mut self, node: &Handle) {
        // 逆序入栈以保持文档顺序
        for child in node.children.borrow().iter().rev() {
            self.stack.push(child.clone());
        }
    }
}

impl Iterator for TextNodeWalker<'_> {
    type Item = TextNodeCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            self.stats.nodes_visited += 1;

            match node.data {
                NodeData::Text { ref contents } => {
                    let original = contents.borrow().trim().to_string();
                    if original.is_empty() {
                        continue;
                    }
                    if let Some(skip) = &self.skip {
                        if skip(&node) {
                            continue;
                        }
                    }

                    self.stats.candidates += 1;
                    return Some(TextNodeCandidate {
                        node: node.clone(),
                        original,
                    });
                }
                NodeData::Element { ref name, .. } => {
                    if is_excluded_element(&node, name.local.as_ref()) {
                        self.stats.subtrees_skipped += 1;
                        continue;
                    }
                    self.push_children(&node);
                }
                _ => self.push_children(&node),
            }
        }

        None
    }
}

/// 判断元素子树是否整体排除
pub fn is_excluded_element(node: &Handle, tag_name: &str) -> bool {
    if constants::SKIP_ELEMENTS.contains(&tag_name) || constants::EDITABLE_ELEMENTS.contains(&tag_name) {
        return true;
    }

    if get_node_attr(node, constants::OPT_OUT_ATTR).is_some() {
        return true;
    }

    if let Some(value) = get_node_attr(node, "translate") {
        if value.trim().eq_ignore_ascii_case("no") {
            return true;
        }
    }

    match get_node_attr(node, "contenteditable") {
        Some(value) => !value.trim().eq_ignore_ascii_case("false"),
        None => false,
    }
}

/// 将译文写回文本节点，保留原有的首尾空白
///
/// 空白取自写入前节点的当前内容。返回节点文本是否发生变化。
pub fn apply_translation(node: &Handle, translated: &str) -> bool {
    let current = match get_text_content(node) {
        Some(text) => text,
        None => return false,
    };

    let updated = preserve_whitespace(&current, translated);
    if updated == current {
        return false;
    }

    set_text_content(node, &updated)
}

/// `leading_ws + translated + trailing_ws`
pub fn preserve_whitespace(original: &str, translated: &str) -> String {
    let leading_len = original.len() - original.trim_start().len();
    let trailing_start = original.trim_end().len().max(leading_len);

    let mut result = String::with_capacity(original.len() + translated.len());
    result.push_str(&original[..leading_len]);
    result.push_str(translated);
    result.push_str(&original[trailing_start..]);
    result
}
