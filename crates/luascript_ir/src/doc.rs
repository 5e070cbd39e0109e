//! Comment attachment carried on every IR node's `doc` field.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    #[serde(default)]
    pub leading_comments: Vec<Comment>,
    #[serde(default)]
    pub trailing_comments: Vec<Comment>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub block: bool,
}
