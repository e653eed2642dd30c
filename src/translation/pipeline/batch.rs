//! 翻译批次
//!
//! 将一组待翻译文本去重，保留首次出现的顺序，并记录每个输入位置
//! 对应的唯一文本下标，便于把结果还原为与输入平行的列表。

use std::collections::HashMap;

/// 去重后的翻译批次
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// 唯一文本，按首次出现排序
    unique: Vec<String>,
    /// 输入位置 -> `unique` 下标
    positions: Vec<usize>,
}

impl Batch {
    /// 规划批次
    pub fn plan<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut unique = Vec::new();
        let mut positions = Vec::new();

        for text in texts {
            let text = text.as_ref();
            let slot = match index.get(text) {
                Some(&slot) => slot,
                None => {
                    let slot = unique.len();
                    index.insert(text.to_string(), slot);
                    unique.push(text.to_string());
                    slot
                }
            };
            positions.push(slot);
        }

        Self { unique, positions }
    }

    /// 唯一文本
    pub fn unique(&self) -> &[String] {
        &self.unique
    }

    pub fn into_unique(self) -> Vec<String> {
        self.unique
    }

    /// 输入条目数（含重复）
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// 重复条目数
    pub fn duplicates(&self) -> usize {
        self.positions.len() - self.unique.len()
    }

    /// 输入位置对应的唯一文本下标
    pub fn slot_of(&self, position: usize) -> Option<usize> {
        self.positions.get(position).copied()
    }

    /// 将按唯一文本给出的结果展开为与输入平行的列表
    ///
    /// `results` 短于唯一文本时，缺失位置为 `None`。
    pub fn expand<T: Clone>(&self, results: &[T]) -> Vec<Option<T>> {
        self.positions
            .iter()
            .map(|&slot| results.get(slot).cloned())
            .collect()
    }
}
