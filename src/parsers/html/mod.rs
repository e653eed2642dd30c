//! HTML解析和处理模块
//!
//! - `dom`: 解析与基础DOM操作
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;

pub use dom::{
    get_body, get_child_node_by_name, get_node_attr, get_node_name, get_text_content, html_to_dom,
    set_document_language, set_node_attr, set_text_content,
};
pub use serializer::serialize_document;
