// File: ./src/client/types.rs
// Wire types for the board service (Trello REST v1).
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardLabel {
    pub id: String,
    // Colour-only labels have an empty name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMember {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Body of `POST /cards`. Id lists are comma-separated, as the API documents them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub name: String,
    pub desc: String,
    pub id_list: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id_labels: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id_members: String,
    pub pos: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCard {
    pub id: String,
    #[serde(default)]
    pub short_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Checklist {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttachmentInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A local file read into memory for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub contents: Bytes,
}
