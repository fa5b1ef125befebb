// In-memory board used by the submitter and controller tests.
#![allow(dead_code)]
use async_trait::async_trait;
use docboard::client::{
    AttachmentInfo, Board, BoardApi, BoardLabel, BoardList, BoardMember, Checklist, CreatedCard,
    FileUpload, NewCard,
};
use docboard::error::ApiError;
use docboard::submitter::CancelFlag;
use std::collections::HashSet;
use std::sync::Mutex;

pub const SHORT_LINK: &str = "AbCd1234";
pub const BOARD_URL: &str = "https://trello.com/b/AbCd1234/sprint-board";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateCard(NewCard),
    CreateChecklist { card_id: String, name: String },
    AddItem { checklist_id: String, name: String },
    AttachUrl { card_id: String, url: String, set_cover: bool },
    Upload { card_id: String, file_name: String, contents: Vec<u8>, set_cover: bool },
}

pub struct FakeBoard {
    pub board: Board,
    pub lists: Vec<BoardList>,
    pub labels: Vec<BoardLabel>,
    pub members: Vec<BoardMember>,
    /// Card titles whose creation fails with a server error.
    pub failing_titles: HashSet<String>,
    pub fail_checklists: bool,
    pub deny_access: bool,
    /// Raised once this many cards have been created.
    pub cancel_after: Option<(usize, CancelFlag)>,
    pub calls: Mutex<Vec<Call>>,
}

fn list(id: &str, name: &str) -> BoardList {
    BoardList {
        id: id.to_string(),
        name: name.to_string(),
        closed: false,
    }
}

fn label(id: &str, name: &str) -> BoardLabel {
    BoardLabel {
        id: id.to_string(),
        name: name.to_string(),
        color: Some("green".to_string()),
    }
}

fn member(id: &str, username: &str) -> BoardMember {
    BoardMember {
        id: id.to_string(),
        username: username.to_string(),
        full_name: None,
    }
}

impl FakeBoard {
    /// Lists "To Do" and "Backlog", labels "Marketing" and "Urgent", member "username1".
    pub fn sample() -> Self {
        Self {
            board: Board {
                id: "board-1".to_string(),
                name: "Sprint Board".to_string(),
                short_url: Some(BOARD_URL.to_string()),
                closed: false,
            },
            lists: vec![list("list-todo", "To Do"), list("list-backlog", "Backlog")],
            labels: vec![label("label-mkt", "Marketing"), label("label-urgent", "Urgent")],
            members: vec![member("member-1", "username1")],
            failing_titles: HashSet::new(),
            fail_checklists: false,
            deny_access: false,
            cancel_after: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_cards(&self) -> Vec<NewCard> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateCard(card) => Some(card),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }

    fn check_board(&self, board_ref: &str) -> Result<(), ApiError> {
        if self.deny_access {
            return Err(ApiError::from_status(401, "invalid token".to_string(), None));
        }
        if board_ref != SHORT_LINK && board_ref != self.board.id {
            return Err(ApiError::NotFound("board not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BoardApi for FakeBoard {
    async fn get_board(&self, board_ref: &str) -> Result<Board, ApiError> {
        self.check_board(board_ref)?;
        Ok(self.board.clone())
    }

    async fn get_lists(&self, board_id: &str) -> Result<Vec<BoardList>, ApiError> {
        self.check_board(board_id)?;
        Ok(self.lists.clone())
    }

    async fn get_labels(&self, board_id: &str) -> Result<Vec<BoardLabel>, ApiError> {
        self.check_board(board_id)?;
        Ok(self.labels.clone())
    }

    async fn get_members(&self, board_id: &str) -> Result<Vec<BoardMember>, ApiError> {
        self.check_board(board_id)?;
        Ok(self.members.clone())
    }

    async fn create_card(&self, card: &NewCard) -> Result<CreatedCard, ApiError> {
        if self.failing_titles.contains(&card.name) {
            return Err(ApiError::Server {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        self.record(Call::CreateCard(card.clone()));
        let created = self.created_cards().len();
        if let Some((after, flag)) = &self.cancel_after
            && created >= *after
        {
            flag.cancel();
        }
        Ok(CreatedCard {
            id: format!("card-{}", created),
            short_url: Some(format!("https://trello.com/c/card{}", created)),
        })
    }

    async fn create_checklist(&self, card_id: &str, name: &str) -> Result<Checklist, ApiError> {
        if self.fail_checklists {
            return Err(ApiError::Rejected {
                status: 400,
                body: "invalid value for name".to_string(),
            });
        }
        let n = self.record(Call::CreateChecklist {
            card_id: card_id.to_string(),
            name: name.to_string(),
        });
        Ok(Checklist {
            id: format!("checklist-{}", n),
        })
    }

    async fn add_checklist_item(&self, checklist_id: &str, name: &str) -> Result<(), ApiError> {
        self.record(Call::AddItem {
            checklist_id: checklist_id.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    async fn attach_url(
        &self,
        card_id: &str,
        url: &str,
        set_cover: bool,
    ) -> Result<AttachmentInfo, ApiError> {
        let n = self.record(Call::AttachUrl {
            card_id: card_id.to_string(),
            url: url.to_string(),
            set_cover,
        });
        Ok(AttachmentInfo {
            id: format!("att-{}", n),
            name: None,
        })
    }

    async fn upload_file(
        &self,
        card_id: &str,
        file: FileUpload,
        set_cover: bool,
    ) -> Result<AttachmentInfo, ApiError> {
        let n = self.record(Call::Upload {
            card_id: card_id.to_string(),
            file_name: file.file_name.clone(),
            contents: file.contents.to_vec(),
            set_cover,
        });
        Ok(AttachmentInfo {
            id: format!("att-{}", n),
            name: Some(file.file_name),
        })
    }
}
