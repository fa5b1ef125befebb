// File: ./src/client/mod.rs
pub mod auth;
pub mod core;
pub mod middleware;
pub mod multipart;
pub mod retry;
pub mod types;

use crate::error::ApiError;
use async_trait::async_trait;

pub use crate::client::core::{BoardClient, ClientSettings, DEFAULT_API_BASE_URL};
pub use crate::client::retry::RetryPolicy;
pub use crate::client::types::{
    AttachmentInfo, Board, BoardLabel, BoardList, BoardMember, Checklist, CreatedCard,
    FileUpload, NewCard,
};

/// Operations the tool needs from the board service.
///
/// [`BoardClient`] talks to the real API; tests substitute an in-memory board.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Fetches a board by id or short link. Doubles as the credential check.
    async fn get_board(&self, board_ref: &str) -> Result<Board, ApiError>;
    async fn get_lists(&self, board_id: &str) -> Result<Vec<BoardList>, ApiError>;
    async fn get_labels(&self, board_id: &str) -> Result<Vec<BoardLabel>, ApiError>;
    async fn get_members(&self, board_id: &str) -> Result<Vec<BoardMember>, ApiError>;

    async fn create_card(&self, card: &NewCard) -> Result<CreatedCard, ApiError>;
    async fn create_checklist(&self, card_id: &str, name: &str) -> Result<Checklist, ApiError>;
    async fn add_checklist_item(&self, checklist_id: &str, name: &str) -> Result<(), ApiError>;

    /// Attaches a URL by reference; `set_cover` makes it the card cover.
    async fn attach_url(
        &self,
        card_id: &str,
        url: &str,
        set_cover: bool,
    ) -> Result<AttachmentInfo, ApiError>;

    async fn upload_file(
        &self,
        card_id: &str,
        file: FileUpload,
        set_cover: bool,
    ) -> Result<AttachmentInfo, ApiError>;
}
